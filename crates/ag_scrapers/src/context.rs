use std::sync::Arc;

use ag_core::utils::{dedup_urls, parse_seo_keywords, validate_url};
use ag_core::{
    GenerationContext, ModelKind, PdfExtractor, Result, SourceScraper, UrlContentInstruction,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Article generation request as clients send it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleRequest {
    pub topic_category: Option<String>,
    pub industry: Option<String>,
    pub target_audience: Option<String>,
    /// Single-source form, kept for older clients. Goes first when merged.
    pub source_url: Option<String>,
    pub source_urls: Vec<String>,
    pub url_instructions: Vec<UrlContentInstruction>,
    pub pdf_base64: Option<String>,
    /// Comma separated.
    pub seo_keywords: Option<String>,
    pub custom_prompt: Option<String>,
    pub selected_model: Option<String>,
    pub include_analysis: bool,
    pub translate_to_thai: bool,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl ArticleRequest {
    /// `None` when the client did not pick a backend.
    pub fn model_kind(&self) -> Result<Option<ModelKind>> {
        non_blank(&self.selected_model)
            .map(|tag| tag.parse())
            .transpose()
    }

    fn legacy_only(&self) -> bool {
        non_blank(&self.source_url).is_some() && self.source_urls.iter().all(|u| u.trim().is_empty())
    }
}

/// Turns a request into a `GenerationContext`, scraping and extracting as
/// needed. Any collaborator failure aborts the build.
#[derive(Clone)]
pub struct ContextBuilder {
    scraper: Arc<dyn SourceScraper>,
    pdf: Arc<dyn PdfExtractor>,
    max_urls: usize,
}

impl ContextBuilder {
    pub fn new(scraper: Arc<dyn SourceScraper>, pdf: Arc<dyn PdfExtractor>, max_urls: usize) -> Self {
        Self {
            scraper,
            pdf,
            max_urls,
        }
    }

    /// Legacy URL first, then the list. Every URL is validated, then
    /// duplicates are dropped and the rest capped.
    pub fn collect_urls(&self, request: &ArticleRequest) -> Result<Vec<String>> {
        let merged: Vec<String> = non_blank(&request.source_url)
            .into_iter()
            .chain(
                request
                    .source_urls
                    .iter()
                    .map(|u| u.trim().to_string())
                    .filter(|u| !u.is_empty()),
            )
            .collect();
        for url in &merged {
            validate_url(url)?;
        }
        let urls = dedup_urls(merged, self.max_urls);
        Ok(urls)
    }

    pub async fn build(&self, request: &ArticleRequest) -> Result<GenerationContext> {
        let urls = self.collect_urls(request)?;

        let mut context = GenerationContext {
            topic_category: non_blank(&request.topic_category),
            industry: non_blank(&request.industry),
            target_audience: non_blank(&request.target_audience),
            seo_keywords: parse_seo_keywords(request.seo_keywords.as_deref()),
            custom_prompt: non_blank(&request.custom_prompt),
            url_instructions: request.url_instructions.clone(),
            ..GenerationContext::default()
        };

        let mut sources = Vec::with_capacity(urls.len());
        for url in &urls {
            sources.push(self.scraper.scrape(url).await?);
        }
        if !sources.is_empty() {
            info!("🔗 Scraped {} source(s)", sources.len());
        }
        if request.legacy_only() {
            context.scraped_content = sources.pop().map(|source| source.content);
        } else {
            context.scraped_sources = sources;
        }

        if let Some(pdf) = non_blank(&request.pdf_base64) {
            context.pdf_content = Some(self.pdf.extract_base64(&pdf).await?);
        }

        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ag_core::{Error, ScrapedSource};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingScraper {
        seen: Mutex<Vec<String>>,
        fail_on: Option<String>,
    }

    #[async_trait]
    impl SourceScraper for RecordingScraper {
        async fn scrape(&self, url: &str) -> Result<ScrapedSource> {
            self.seen.lock().unwrap().push(url.to_string());
            if self.fail_on.as_deref() == Some(url) {
                return Err(Error::Scraping(format!("Error fetching URL: {}", url)));
            }
            Ok(ScrapedSource {
                url: url.to_string(),
                title: format!("Title of {}", url),
                content: format!("Content of {}", url),
            })
        }
    }

    struct StubPdf;

    #[async_trait]
    impl PdfExtractor for StubPdf {
        async fn extract_base64(&self, pdf_base64: &str) -> Result<String> {
            if pdf_base64 == "bad" {
                return Err(Error::Pdf("Invalid base64 PDF data".to_string()));
            }
            Ok("PDF text".to_string())
        }
    }

    fn builder(scraper: Arc<RecordingScraper>) -> ContextBuilder {
        ContextBuilder::new(scraper, Arc::new(StubPdf), 5)
    }

    fn url(n: usize) -> String {
        format!("https://site{}.example.com/story", n)
    }

    #[tokio::test]
    async fn test_seven_urls_capped_to_five_in_order() {
        let scraper = Arc::new(RecordingScraper::default());
        let request = ArticleRequest {
            source_urls: (1..=7).map(url).collect(),
            ..ArticleRequest::default()
        };

        let context = builder(scraper.clone()).build(&request).await.unwrap();
        let expected: Vec<String> = (1..=5).map(url).collect();
        assert_eq!(*scraper.seen.lock().unwrap(), expected);
        assert_eq!(context.scraped_sources.len(), 5);
        assert_eq!(context.scraped_sources[0].url, url(1));
        assert!(context.scraped_content.is_none());
    }

    #[tokio::test]
    async fn test_duplicates_removed_before_cap() {
        let scraper = Arc::new(RecordingScraper::default());
        let request = ArticleRequest {
            source_url: Some(url(3)),
            source_urls: vec![url(1), url(3), url(1), url(2), url(4), url(5), url(6)],
            ..ArticleRequest::default()
        };

        builder(scraper.clone()).build(&request).await.unwrap();
        assert_eq!(
            *scraper.seen.lock().unwrap(),
            vec![url(3), url(1), url(2), url(4), url(5)]
        );
    }

    #[tokio::test]
    async fn test_legacy_url_fills_scraped_content() {
        let scraper = Arc::new(RecordingScraper::default());
        let request = ArticleRequest {
            source_url: Some(url(1)),
            ..ArticleRequest::default()
        };

        let context = builder(scraper).build(&request).await.unwrap();
        assert_eq!(context.scraped_content.as_deref(), Some(format!("Content of {}", url(1)).as_str()));
        assert!(context.scraped_sources.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_url_fails_before_scraping() {
        let scraper = Arc::new(RecordingScraper::default());
        let request = ArticleRequest {
            source_urls: vec![url(1), "ftp://files.example.com/x".to_string()],
            ..ArticleRequest::default()
        };

        let err = builder(scraper.clone()).build(&request).await.unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
        assert!(scraper.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scrape_failure_aborts_build() {
        let scraper = Arc::new(RecordingScraper {
            fail_on: Some(url(2)),
            ..RecordingScraper::default()
        });
        let request = ArticleRequest {
            source_urls: vec![url(1), url(2), url(3)],
            ..ArticleRequest::default()
        };

        let err = builder(scraper.clone()).build(&request).await.unwrap_err();
        assert!(err.is_input());
        assert_eq!(scraper.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fields_keywords_and_pdf() {
        let request = ArticleRequest {
            topic_category: Some(" Digital Transformation ".to_string()),
            industry: Some("  ".to_string()),
            seo_keywords: Some("retail, ai,, retail".to_string()),
            custom_prompt: Some("Focus on practice".to_string()),
            pdf_base64: Some("JVBERi0=".to_string()),
            ..ArticleRequest::default()
        };

        let context = builder(Arc::new(RecordingScraper::default()))
            .build(&request)
            .await
            .unwrap();
        assert_eq!(context.topic_category.as_deref(), Some("Digital Transformation"));
        assert!(context.industry.is_none());
        assert_eq!(context.seo_keywords, vec!["retail", "ai"]);
        assert_eq!(context.custom_prompt.as_deref(), Some("Focus on practice"));
        assert_eq!(context.pdf_content.as_deref(), Some("PDF text"));
    }

    #[tokio::test]
    async fn test_bad_pdf_is_input_error() {
        let request = ArticleRequest {
            pdf_base64: Some("bad".to_string()),
            ..ArticleRequest::default()
        };
        let err = builder(Arc::new(RecordingScraper::default()))
            .build(&request)
            .await
            .unwrap_err();
        assert!(err.is_input());
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let request: ArticleRequest = serde_json::from_str(
            r#"{"topic_category": "AI", "selected_model": "together", "url_instructions": [
                {"url": "https://a.example.com", "content_focus": "stats", "usage_instruction": "intro",
                 "section_target": "introduction"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(request.model_kind().unwrap(), Some(ModelKind::Together));
        assert!(request.source_urls.is_empty());
        assert!(!request.include_analysis);
        assert_eq!(request.url_instructions[0].extraction_type, None);

        let unknown = ArticleRequest {
            selected_model: Some("llama".to_string()),
            ..ArticleRequest::default()
        };
        assert!(unknown.model_kind().unwrap_err().is_input());
        assert_eq!(ArticleRequest::default().model_kind().unwrap(), None);
    }
}
