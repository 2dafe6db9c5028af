use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Scraping error: {0}")]
    Scraping(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Quality evaluation error: {0}")]
    Scoring(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Rendering error: {0}")]
    Rendering(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

/// Coarse classification used to decide how a failure surfaces to a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Client-caused; the generation loop never starts.
    Input,
    Generation,
    Scoring,
    Config,
    Internal,
}

impl Error {
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::InvalidInput(_) | Error::InvalidUrl(_) | Error::Scraping(_) | Error::Pdf(_) => {
                FailureKind::Input
            }
            Error::Generation(_) => FailureKind::Generation,
            Error::Scoring(_) => FailureKind::Scoring,
            Error::Config(_) => FailureKind::Config,
            Error::Translation(_)
            | Error::Rendering(_)
            | Error::Io(_)
            | Error::Serialization(_)
            | Error::Http(_)
            | Error::External(_) => FailureKind::Internal,
        }
    }

    pub fn is_input(&self) -> bool {
        self.kind() == FailureKind::Input
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Result of a best-effort stage. A `Degraded` stage never aborts the
/// request; the caller drops the stage's contribution and keeps going.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Complete(T),
    Degraded(String),
}

impl<T> Outcome<T> {
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(value) => Outcome::Complete(value),
            Err(e) => Outcome::Degraded(e.to_string()),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Outcome::Complete(_))
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Outcome::Complete(value) => Some(value),
            Outcome::Degraded(_) => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Outcome::Complete(_) => None,
            Outcome::Degraded(reason) => Some(reason),
        }
    }
}
