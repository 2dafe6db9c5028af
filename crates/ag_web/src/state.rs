use std::sync::Arc;

use ag_core::config::ScrapeSettings;
use ag_core::{Result, Settings};
use ag_inference::ocr::ChatTextRecognizer;
use ag_inference::ArticleService;
use ag_scrapers::{ContextBuilder, PdfTextExtractor, WebScraper};

/// Shared by every request; nothing in here is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    pub service: ArticleService,
    pub context: ContextBuilder,
}

impl AppState {
    pub fn new(service: ArticleService, context: ContextBuilder) -> Self {
        Self { service, context }
    }

    /// Full production wiring from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let service = ArticleService::from_settings(settings)?;
        let recognizer = ChatTextRecognizer::new(&settings.openai, settings.model_timeout)?;
        let pdf = PdfTextExtractor::with_recognizer(Arc::new(recognizer));
        Ok(Self::new(service, web_context(&settings.scrape, pdf)?))
    }

    /// Dummy model and scorer, real scraping, PDF text layer only.
    pub fn offline(settings: &Settings) -> Result<Self> {
        let service = ArticleService::offline(settings);
        Ok(Self::new(
            service,
            web_context(&settings.scrape, PdfTextExtractor::new())?,
        ))
    }
}

fn web_context(scrape: &ScrapeSettings, pdf: PdfTextExtractor) -> Result<ContextBuilder> {
    Ok(ContextBuilder::new(
        Arc::new(WebScraper::new(scrape)?),
        Arc::new(pdf),
        scrape.max_urls,
    ))
}
