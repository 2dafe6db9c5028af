use std::path::PathBuf;

use ag_core::config::ScrapeSettings;
use ag_core::utils::{dedup_urls, truncate_text};
use ag_core::{Error, PdfExtractor, Result, SourceScraper};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::Args;
use tracing::error;

use crate::pdf::PdfTextExtractor;
use crate::scrapers::WebScraper;

const PREVIEW_CHARS: usize = 500;

#[derive(Args, Debug)]
pub struct ScrapeArgs {
    /// Pages to fetch, in order
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// Print the full scraped sources as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct PdfArgs {
    /// PDF file to read
    pub file: PathBuf,
}

pub async fn handle_scrape(args: ScrapeArgs, settings: &ScrapeSettings) -> Result<()> {
    let scraper = WebScraper::new(settings)?;
    let urls = dedup_urls(args.urls, settings.max_urls);

    let mut sources = Vec::with_capacity(urls.len());
    for url in urls {
        match scraper.scrape(&url).await {
            Ok(source) => {
                if !args.json {
                    println!("📰 {} - {}", source.title, source.url);
                    println!("{}\n", truncate_text(&source.content, PREVIEW_CHARS));
                }
                sources.push(source);
            }
            Err(e) => error!("Failed to scrape {}: {}", url, e),
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&sources)?);
    }
    Ok(())
}

pub async fn handle_pdf(args: PdfArgs, extractor: &PdfTextExtractor) -> Result<()> {
    let bytes = tokio::fs::read(&args.file)
        .await
        .map_err(|e| Error::Pdf(format!("Cannot read {}: {}", args.file.display(), e)))?;
    let text = extractor.extract_base64(&STANDARD.encode(bytes)).await?;
    println!("{}", text);
    Ok(())
}
