use url::{Host, Url};

use crate::{Error, Result};

/// Split a comma separated keyword string, dropping blanks and repeats while
/// keeping first-seen order.
pub fn parse_seo_keywords(keywords: Option<&str>) -> Vec<String> {
    let mut parsed: Vec<String> = Vec::new();
    for keyword in keywords.unwrap_or_default().split(',') {
        let keyword = keyword.trim();
        if !keyword.is_empty() && !parsed.iter().any(|k| k == keyword) {
            parsed.push(keyword.to_string());
        }
    }
    parsed
}

/// Accepts absolute http(s) URLs whose host is a dotted domain, localhost or
/// an IP address.
pub fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url.trim()).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::InvalidUrl(format!("{}: unsupported scheme", url)));
    }
    match parsed.host() {
        Some(Host::Domain(domain)) if domain == "localhost" || domain.contains('.') => Ok(parsed),
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => Ok(parsed),
        _ => Err(Error::InvalidUrl(format!("{}: missing or invalid host", url))),
    }
}

/// Remove duplicates (first occurrence wins) and keep at most `max` URLs.
pub fn dedup_urls(urls: impl IntoIterator<Item = String>, max: usize) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for url in urls {
        let url = url.trim().to_string();
        if url.is_empty() || unique.contains(&url) {
            continue;
        }
        unique.push(url);
    }
    unique.truncate(max);
    unique
}

/// Keep at most `max_chars` characters. Counts chars, not bytes, so Thai and
/// other multibyte text gets the same budget as ASCII.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Truncate at the last sentence end when that keeps at least 80% of the
/// budget, otherwise cut hard and append an ellipsis.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    let truncated = truncate_chars(text, max_chars);
    if truncated.len() == text.len() {
        return text.to_string();
    }
    match truncated.rfind('.') {
        Some(period) if truncated[..period].chars().count() as f64 > max_chars as f64 * 0.8 => {
            truncated[..=period].to_string()
        }
        _ => format!("{}...", truncated),
    }
}

/// Strip markdown code fences wrapped around a model reply.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Collapse every whitespace run into a single space.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
