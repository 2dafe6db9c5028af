//! Model backends, the quality scorer and the generate-score-retry loop.

pub mod client;
pub mod models;
pub mod ocr;
pub mod orchestrator;
pub mod prompts;
pub mod quality;
pub mod render;
pub mod response;
pub mod service;
pub mod translation;

pub use models::{create_models, ModelSet};
pub use orchestrator::{format_feedback, GenerationLoop, Verdict};
pub use service::{ArticleOutput, ArticleService, GenerateOptions};

pub mod prelude {
    pub use super::models::{create_models, ModelSet};
    pub use super::ocr::ChatTextRecognizer;
    pub use super::orchestrator::GenerationLoop;
    pub use super::service::{ArticleOutput, ArticleService, GenerateOptions};
    pub use ag_core::{Error, GenerationContext, ModelKind, Outcome, Result};
}
