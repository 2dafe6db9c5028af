use ag_core::{Error, Result};
use scraper::{ElementRef, Html, Node, Selector};

pub mod web;

pub use web::WebScraper;

/// Elements whose whole subtree never counts as article text.
pub(crate) const UNWANTED_TAGS: &[&str] = &[
    "script", "style", "nav", "header", "footer", "aside", "menu", "form", "button", "input",
    "iframe", "embed", "object", "applet", "noscript",
];

/// Class fragments marking page chrome. "ad" is matched as a whole token,
/// the rest as substrings.
pub(crate) const UNWANTED_CLASS_FRAGMENTS: &[&str] = &[
    "advertisement",
    "sidebar",
    "menu",
    "navigation",
    "footer",
    "header",
];

/// Tried in order; the first match with text is the article body.
pub(crate) const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "[class*=\"content\"]",
    "[class*=\"article\"]",
    "[class*=\"post\"]",
    "[class*=\"entry\"]",
    "main",
    ".main-content",
    "#content",
    "#main",
];

pub(crate) mod utils {
    use super::*;

    pub fn selector(selector: &str) -> Result<Selector> {
        Selector::parse(selector).map_err(|e| Error::Scraping(format!("Invalid selector: {}", e)))
    }

    pub fn extract_text(document: &Html, selector: &str) -> Result<Option<String>> {
        let selector = self::selector(selector)?;
        Ok(document
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|text| !text.is_empty()))
    }

    pub fn extract_attr(document: &Html, selector: &str, attr: &str) -> Result<Option<String>> {
        let selector = self::selector(selector)?;
        Ok(document
            .select(&selector)
            .next()
            .and_then(|el| el.value().attr(attr))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty()))
    }

    fn is_ad_token(token: &str) -> bool {
        token
            .split(|c: char| c == '-' || c == '_')
            .any(|part| matches!(part, "ad" | "ads" | "adsense" | "adslot") || part.starts_with("advert"))
    }

    pub fn is_unwanted(element: &ElementRef<'_>) -> bool {
        let value = element.value();
        if UNWANTED_TAGS.contains(&value.name()) {
            return true;
        }
        let class = value.attr("class").unwrap_or_default().to_lowercase();
        if UNWANTED_CLASS_FRAGMENTS.iter().any(|fragment| class.contains(fragment)) {
            return true;
        }
        let id = value.id().unwrap_or_default().to_lowercase();
        class.split_whitespace().any(is_ad_token) || is_ad_token(&id)
    }

    /// True when the element or any ancestor is page chrome.
    pub fn inside_unwanted(element: &ElementRef<'_>) -> bool {
        is_unwanted(element) || element.ancestors().filter_map(ElementRef::wrap).any(|a| is_unwanted(&a))
    }

    /// Text of the subtree, skipping unwanted descendants, joined by spaces.
    pub fn visible_text(element: ElementRef<'_>) -> String {
        let mut parts = Vec::new();
        collect_text(element, &mut parts);
        parts.join(" ")
    }

    fn collect_text(element: ElementRef<'_>, parts: &mut Vec<String>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        parts.push(text.to_string());
                    }
                }
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        if !is_unwanted(&child) {
                            collect_text(child, parts);
                        }
                    }
                }
                _ => {}
            }
        }
    }
}
