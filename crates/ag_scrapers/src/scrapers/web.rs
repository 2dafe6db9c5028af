use std::time::Duration;

use ag_core::config::ScrapeSettings;
use ag_core::utils::{collapse_whitespace, validate_url};
use ag_core::{Error, Result, ScrapedSource, SourceScraper};
use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use tracing::{debug, info, warn};

use super::{utils, CONTENT_SELECTORS};

const MIN_SENTENCE_CHARS: usize = 20;
const MAX_CONTENT_CHARS: usize = 5000;
const MAX_SENTENCES: usize = 50;

/// Generic article scraper: any http(s) page, main text by selector
/// priority with page chrome stripped.
#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
}

impl WebScraper {
    pub fn new(settings: &ScrapeSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .user_agent(settings.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Self::new(&ScrapeSettings {
            request_timeout: timeout,
            ..ScrapeSettings::default()
        })
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::Scraping(format!("Error fetching URL: {}", e)))?;
        response
            .text()
            .await
            .map_err(|e| Error::Scraping(format!("Error reading response: {}", e)))
    }
}

#[async_trait]
impl SourceScraper for WebScraper {
    async fn scrape(&self, url: &str) -> Result<ScrapedSource> {
        let parsed = validate_url(url)?;
        info!("🌐 Scraping {}", parsed);

        let html = self.fetch(parsed.as_str()).await?;
        let page = parse_page(&html)?;
        if page.content.is_empty() {
            warn!("No readable content found at {}", parsed);
        }
        debug!(url = %parsed, title = %page.title.as_deref().unwrap_or(""), length = page.content.len(), "Scraped page");

        Ok(ScrapedSource {
            url: parsed.to_string(),
            title: page
                .title
                .unwrap_or_else(|| parsed.host_str().unwrap_or("Untitled").to_string()),
            content: page.content,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub title: Option<String>,
    pub content: String,
}

/// Title and cleaned main text of an HTML document.
pub fn parse_page(html: &str) -> Result<Page> {
    let document = Html::parse_document(html);
    Ok(Page {
        title: extract_title(&document)?,
        content: clean_page_text(&extract_main_text(&document)?),
    })
}

fn extract_title(document: &Html) -> Result<Option<String>> {
    if let Some(title) = utils::extract_attr(document, "meta[property=\"og:title\"]", "content")? {
        return Ok(Some(title));
    }
    if let Some(title) = utils::extract_text(document, "title")? {
        return Ok(Some(title));
    }
    utils::extract_text(document, "h1")
}

fn extract_main_text(document: &Html) -> Result<String> {
    for selector in CONTENT_SELECTORS {
        let selector = utils::selector(selector)?;
        let found = document
            .select(&selector)
            .filter(|element| !utils::inside_unwanted(element))
            .map(utils::visible_text)
            .find(|text| !text.trim().is_empty());
        if let Some(text) = found {
            return Ok(text);
        }
    }

    let body = utils::selector("body")?;
    Ok(match document.select(&body).next() {
        Some(body) => utils::visible_text(body),
        None => utils::visible_text(document.root_element()),
    })
}

/// Drop sentence fragments of 20 characters or fewer and cap long pages to
/// their first 50 sentences.
pub fn clean_page_text(text: &str) -> String {
    let text = collapse_whitespace(text);
    let sentences: Vec<&str> = text
        .split('.')
        .map(str::trim)
        .filter(|sentence| sentence.chars().count() > MIN_SENTENCE_CHARS)
        .collect();
    let cleaned = sentences.join(". ");

    if cleaned.chars().count() > MAX_CONTENT_CHARS {
        let truncated: Vec<&str> = cleaned.split(". ").take(MAX_SENTENCES).collect();
        return format!("{}...", truncated.join(". "));
    }
    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"
        <html>
          <head>
            <title>Page Title</title>
            <meta property="og:title" content="Open Graph Title">
          </head>
          <body>
            <nav>Home About Contact and a long navigation label here</nav>
            <div class="ad-slot">Buy now, this advertisement is long enough to count</div>
            <article>
              <h1>Headline</h1>
              <p>Retail leaders are investing heavily in artificial intelligence.</p>
              <p>Short bit.</p>
              <p>Customer data platforms are becoming the backbone of personalization.</p>
            </article>
            <footer>Copyright notice that is definitely long enough</footer>
          </body>
        </html>
    "#;

    #[test]
    fn test_parse_page_prefers_og_title_and_article() {
        let page = parse_page(PAGE).unwrap();
        assert_eq!(page.title.as_deref(), Some("Open Graph Title"));
        assert!(page.content.contains("Retail leaders are investing heavily"));
        assert!(page.content.contains("Customer data platforms"));
        assert!(!page.content.contains("Short bit"));
        assert!(!page.content.contains("navigation"));
        assert!(!page.content.contains("advertisement"));
        assert!(!page.content.contains("Copyright"));
    }

    #[test]
    fn test_title_falls_back_to_h1() {
        let page = parse_page("<body><h1>Only Heading</h1><main>Nothing long enough here at all to keep.</main></body>").unwrap();
        assert_eq!(page.title.as_deref(), Some("Only Heading"));
    }

    #[test]
    fn test_content_falls_back_to_body() {
        let page = parse_page("<body><p>Plain body text without any article container at all.</p></body>").unwrap();
        assert_eq!(page.content, "Plain body text without any article container at all");
    }

    #[test]
    fn test_clean_page_text_caps_long_pages() {
        let sentence = "This sentence is comfortably longer than twenty characters";
        let text = vec![sentence; 200].join(". ");
        let cleaned = clean_page_text(&text);
        assert!(cleaned.ends_with("..."));
        assert_eq!(cleaned.trim_end_matches("...").split(". ").count(), 50);
    }

    #[tokio::test]
    async fn test_scrape_fetches_with_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/story"))
            .and(header("user-agent", "ag-test/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .expect(1)
            .mount(&server)
            .await;

        let settings = ScrapeSettings {
            user_agent: "ag-test/1.0".to_string(),
            ..ScrapeSettings::default()
        };
        let scraper = WebScraper::new(&settings).unwrap();
        let url = format!("{}/story", server.uri());
        let source = scraper.scrape(&url).await.unwrap();
        assert_eq!(source.title, "Open Graph Title");
        assert_eq!(source.url, url);
        assert!(source.content.contains("artificial intelligence"));
    }

    #[tokio::test]
    async fn test_scrape_http_error_is_input_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let scraper = WebScraper::with_timeout(Duration::from_secs(2)).unwrap();
        let err = scraper
            .scrape(&format!("{}/missing", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Scraping(_)));
        assert!(err.is_input());
    }

    #[tokio::test]
    async fn test_scrape_rejects_invalid_url() {
        let scraper = WebScraper::with_timeout(Duration::from_secs(2)).unwrap();
        let err = scraper.scrape("notaurl").await.unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }
}
