use async_trait::async_trait;

use crate::types::ScrapedSource;
use crate::Result;

#[async_trait]
pub trait SourceScraper: Send + Sync {
    /// Fetch a page and return its cleaned title and text.
    async fn scrape(&self, url: &str) -> Result<ScrapedSource>;
}

#[async_trait]
pub trait PdfExtractor: Send + Sync {
    /// Extract plain text from a base64 encoded PDF.
    async fn extract_base64(&self, pdf_base64: &str) -> Result<String>;
}

/// Reads text out of a document the direct extractor could not handle,
/// such as a scanned PDF.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize_pdf(&self, pdf_base64: &str) -> Result<String>;
}
