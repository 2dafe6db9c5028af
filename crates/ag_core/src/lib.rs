pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod sources;
pub mod types;
pub mod utils;

pub use config::Settings;
pub use error::{Error, FailureKind, Outcome, Result};
pub use models::{ArticleModel, DocumentRenderer, ModelKind, QualityScorer, Translator};
pub use sources::{PdfExtractor, SourceScraper, TextRecognizer};
pub use types::*;

pub mod prelude {
    pub use super::{
        ArticleModel, Draft, Error, GenerationContext, Layout, ModelKind, Outcome,
        QualityFeedback, QualityScorer, Result, Settings,
    };
}
