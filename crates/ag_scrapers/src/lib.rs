//! Request-time collaborators: web scraping, PDF text extraction and the
//! context builder that ties them together.

pub mod cli;
pub mod context;
pub mod pdf;
pub mod scrapers;

pub use cli::{handle_pdf, handle_scrape, PdfArgs, ScrapeArgs};
pub use context::{ArticleRequest, ContextBuilder};
pub use pdf::PdfTextExtractor;
pub use scrapers::WebScraper;

pub mod prelude {
    pub use super::context::{ArticleRequest, ContextBuilder};
    pub use super::pdf::PdfTextExtractor;
    pub use super::scrapers::WebScraper;
    pub use ag_core::{Error, GenerationContext, Result, ScrapedSource};
}
