use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Outcome;
use crate::types::{
    ArticleAnalysis, Draft, GenerationContext, QualityFeedback, QualityStamp, QualitySummary,
    Translation,
};
use crate::{Error, Result};

/// Which generation backend drafts the article. Chosen once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Chat completion in JSON mode; malformed replies are errors.
    #[default]
    OpenAi,
    /// Free-form completion; non-JSON replies are taken as markdown.
    Together,
    /// Offline deterministic drafts.
    Dummy,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::OpenAi => "openai",
            ModelKind::Together => "together",
            ModelKind::Dummy => "dummy",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "gpt" | "gpt-4.1-mini" | "finetuned" | "fine-tuned" => Ok(ModelKind::OpenAi),
            "together" | "deepseek" | "lenient" => Ok(ModelKind::Together),
            "dummy" => Ok(ModelKind::Dummy),
            other => Err(Error::InvalidInput(format!("Unknown model: {}", other))),
        }
    }
}

#[async_trait]
pub trait ArticleModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Draft an article. `feedback` is the critique of the previous attempt.
    async fn generate(&self, context: &GenerationContext, feedback: Option<&str>) -> Result<Draft>;

    /// Strengths and weaknesses of an accepted draft.
    async fn analyze(&self, content: &str, context: &GenerationContext) -> Result<ArticleAnalysis>;
}

#[async_trait]
pub trait QualityScorer: Send + Sync {
    async fn score(&self, content: &str, summary: &QualitySummary) -> Result<QualityFeedback>;
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, draft: &Draft) -> Outcome<Translation>;
}

#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// Render markdown into a standalone document, returned base64 encoded.
    async fn render(&self, markdown: &str, stamp: Option<QualityStamp>) -> Result<String>;
}
