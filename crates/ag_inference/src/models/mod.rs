use std::collections::HashMap;
use std::sync::Arc;

use ag_core::{ArticleModel, Error, ModelKind, Result, Settings};
use tracing::{debug, warn};

pub mod dummy;
pub mod openai;
pub mod together;

pub use dummy::{DummyModel, DummyScorer};
pub use openai::OpenAiModel;
pub use together::TogetherModel;

pub(crate) const ANALYSIS_MAX_TOKENS: u32 = 1000;
pub(crate) const ANALYSIS_TEMPERATURE: f32 = 0.3;

/// The generation backends available to a process, keyed by tag. Lookup
/// happens once per request; the loop then talks to one `ArticleModel`.
#[derive(Debug, Clone, Default)]
pub struct ModelSet {
    models: HashMap<ModelKind, Arc<dyn ArticleModel>>,
    default_kind: ModelKind,
}

impl ModelSet {
    pub fn new(default_kind: ModelKind) -> Self {
        Self {
            models: HashMap::new(),
            default_kind,
        }
    }

    pub fn register(&mut self, kind: ModelKind, model: Arc<dyn ArticleModel>) {
        debug!(kind = %kind, name = model.name(), "Registered model");
        self.models.insert(kind, model);
    }

    pub fn with(mut self, kind: ModelKind, model: Arc<dyn ArticleModel>) -> Self {
        self.register(kind, model);
        self
    }

    pub fn default_kind(&self) -> ModelKind {
        self.default_kind
    }

    pub fn contains(&self, kind: ModelKind) -> bool {
        self.models.contains_key(&kind)
    }

    /// The model for `kind`, or the default one when `kind` is `None`.
    pub fn get(&self, kind: Option<ModelKind>) -> Result<(ModelKind, Arc<dyn ArticleModel>)> {
        let kind = kind.unwrap_or(self.default_kind);
        self.models
            .get(&kind)
            .cloned()
            .map(|model| (kind, model))
            .ok_or_else(|| Error::Config(format!("Model '{}' is not configured", kind)))
    }
}

/// Build every backend the settings have credentials for. A backend without
/// an API key is skipped with a warning rather than failing startup.
pub fn create_models(settings: &Settings) -> Result<ModelSet> {
    let mut set = ModelSet::new(settings.default_model);

    match OpenAiModel::new(&settings.openai, settings.model_timeout) {
        Ok(model) => set.register(ModelKind::OpenAi, Arc::new(model)),
        Err(Error::Config(reason)) => warn!("OpenAI backend disabled: {}", reason),
        Err(e) => return Err(e),
    }
    match TogetherModel::new(&settings.together, settings.model_timeout) {
        Ok(model) => set.register(ModelKind::Together, Arc::new(model)),
        Err(Error::Config(reason)) => warn!("Together backend disabled: {}", reason),
        Err(e) => return Err(e),
    }
    set.register(ModelKind::Dummy, Arc::new(DummyModel::new()));

    if !set.contains(set.default_kind()) {
        warn!(
            "Default model '{}' is not configured, requests without a model tag will fail",
            set.default_kind()
        );
    }
    Ok(set)
}
