use std::fmt;
use std::sync::Arc;

use ag_core::{
    ArticleAnalysis, DocumentRenderer, Draft, Error, GenerationContext, GenerationResult, ModelKind,
    Outcome, QualityScorer, QualityStamp, Result, Settings, Translation, Translator,
};
use tracing::{info, warn};

use crate::models::{create_models, DummyModel, DummyScorer, ModelSet};
use crate::orchestrator::GenerationLoop;
use crate::quality::ChatQualityScorer;
use crate::render::ChatRenderer;
use crate::translation::ChatTranslator;

/// Per-request knobs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerateOptions {
    /// `None` uses the configured default backend.
    pub model: Option<ModelKind>,
    pub analyze: bool,
    pub translate: bool,
}

#[derive(Debug, Clone)]
pub struct ArticleOutput {
    pub result: GenerationResult,
    pub model: ModelKind,
    /// `None` when not requested or when analysis failed.
    pub analysis: Option<ArticleAnalysis>,
    /// `None` when not requested.
    pub translation: Option<Outcome<Translation>>,
}

/// Everything a request needs, constructed once at startup and shared.
#[derive(Clone)]
pub struct ArticleService {
    models: ModelSet,
    scorer: Arc<dyn QualityScorer>,
    translator: Option<Arc<dyn Translator>>,
    renderer: Option<Arc<dyn DocumentRenderer>>,
    generation: GenerationLoop,
}

impl fmt::Debug for ArticleService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArticleService")
            .field("models", &self.models)
            .field("translator", &self.translator.is_some())
            .field("renderer", &self.renderer.is_some())
            .field("generation", &self.generation)
            .finish()
    }
}

impl ArticleService {
    pub fn new(models: ModelSet, scorer: Arc<dyn QualityScorer>, generation: GenerationLoop) -> Self {
        Self {
            models,
            scorer,
            translator: None,
            renderer: None,
            generation,
        }
    }

    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn DocumentRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Production wiring. Scoring, translation and rendering all go through
    /// the OpenAI backend, so its key is required.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let timeout = settings.model_timeout;
        let scorer = ChatQualityScorer::new(&settings.openai, timeout)?;
        let translator = ChatTranslator::new(&settings.openai, timeout)?;
        let renderer = ChatRenderer::new(&settings.openai, timeout)?;

        Ok(Self::new(
            create_models(settings)?,
            Arc::new(scorer),
            GenerationLoop::new(settings.generation),
        )
        .with_translator(Arc::new(translator))
        .with_renderer(Arc::new(renderer)))
    }

    /// No network: dummy drafts scored by length. Translation and rendering
    /// are unavailable.
    pub fn offline(settings: &Settings) -> Self {
        let models =
            ModelSet::new(ModelKind::Dummy).with(ModelKind::Dummy, Arc::new(DummyModel::new()));
        Self::new(
            models,
            Arc::new(DummyScorer::default()),
            GenerationLoop::new(settings.generation),
        )
    }

    pub fn models(&self) -> &ModelSet {
        &self.models
    }

    pub async fn generate(
        &self,
        context: &GenerationContext,
        options: GenerateOptions,
    ) -> Result<ArticleOutput> {
        let (kind, model) = self.models.get(options.model)?;
        info!("🚀 Generating article with {} backend", kind);

        let result = self
            .generation
            .run(model.as_ref(), self.scorer.as_ref(), context)
            .await?;

        let analysis = if options.analyze {
            match model.analyze(&result.draft.content, context).await {
                Ok(analysis) => Some(analysis),
                Err(e) => {
                    warn!("Analysis failed, continuing without it: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let translation = if options.translate {
            Some(self.translate(&result.draft).await)
        } else {
            None
        };

        Ok(ArticleOutput {
            result,
            model: kind,
            analysis,
            translation,
        })
    }

    /// Best-effort: a missing translator is reported as degraded.
    pub async fn translate(&self, draft: &Draft) -> Outcome<Translation> {
        match &self.translator {
            Some(translator) => translator.translate(draft).await,
            None => Outcome::Degraded("Translation service is not configured".to_string()),
        }
    }

    pub async fn render(&self, markdown: &str, stamp: Option<QualityStamp>) -> Result<String> {
        match &self.renderer {
            Some(renderer) => renderer.render(markdown, stamp).await,
            None => Err(Error::Config("Document rendering is not configured".to_string())),
        }
    }
}
