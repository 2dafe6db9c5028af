use std::sync::Arc;

use ag_core::utils::truncate_chars;
use ag_core::{Error, PdfExtractor, Result, TextRecognizer};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, info, warn};

/// Below this many characters the text layer is considered missing.
pub const MIN_DIRECT_TEXT_CHARS: usize = 100;
pub const MAX_PDF_TEXT_CHARS: usize = 5000;

/// Text layer extraction with an optional OCR fallback for scanned files.
#[derive(Clone, Default)]
pub struct PdfTextExtractor {
    recognizer: Option<Arc<dyn TextRecognizer>>,
}

impl std::fmt::Debug for PdfTextExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfTextExtractor")
            .field("ocr", &self.recognizer.is_some())
            .finish()
    }
}

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recognizer(recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self {
            recognizer: Some(recognizer),
        }
    }

    pub fn has_ocr(&self) -> bool {
        self.recognizer.is_some()
    }
}

#[async_trait]
impl PdfExtractor for PdfTextExtractor {
    async fn extract_base64(&self, pdf_base64: &str) -> Result<String> {
        let encoded = strip_data_url(pdf_base64);
        let bytes = decode_pdf(encoded)?;
        debug!(bytes = bytes.len(), "Decoded PDF");

        let mut text = extract_text_layer(bytes).await;
        if text.trim().chars().count() < MIN_DIRECT_TEXT_CHARS {
            if let Some(recognizer) = &self.recognizer {
                info!("Text layer too thin ({} chars), falling back to OCR", text.trim().len());
                match recognizer.recognize_pdf(encoded).await {
                    Ok(recognized) => text = recognized,
                    Err(e) => warn!("OCR fallback failed: {}", e),
                }
            }
        }

        let cleaned = clean_pdf_text(&text);
        if cleaned.is_empty() {
            return Err(Error::Pdf("No text could be extracted from the PDF".to_string()));
        }
        info!("📄 Extracted {} characters from PDF", cleaned.len());
        Ok(cleaned)
    }
}

fn strip_data_url(input: &str) -> &str {
    let input = input.trim();
    match input.split_once("base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => input,
    }
}

fn decode_pdf(encoded: &str) -> Result<Vec<u8>> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| Error::Pdf(format!("Invalid base64 PDF data: {}", e)))?;
    if bytes.is_empty() {
        return Err(Error::Pdf("PDF data is empty".to_string()));
    }
    Ok(bytes)
}

/// pdf-extract is synchronous and may panic on malformed files, so it runs on
/// the blocking pool and any failure reads as "no text layer".
async fn extract_text_layer(bytes: Vec<u8>) -> String {
    match tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes)).await {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            warn!("PDF text extraction failed: {}", e);
            String::new()
        }
        Err(e) => {
            warn!("PDF text extraction aborted: {}", e);
            String::new()
        }
    }
}

fn is_artifact(line: &str) -> bool {
    if line.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    if line.chars().all(|c| c == '.' || c.is_whitespace()) {
        return true;
    }
    // "Page 3 of 12"
    let words: Vec<&str> = line.split_whitespace().collect();
    matches!(
        words.as_slice(),
        ["Page", n, "of", m] if n.chars().all(|c| c.is_ascii_digit()) && m.chars().all(|c| c.is_ascii_digit())
    )
}

/// Collapse whitespace inside lines, drop page-number artifacts and lines of
/// three characters or fewer, cap the result.
pub fn clean_pdf_text(text: &str) -> String {
    let lines: Vec<String> = text
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| line.chars().count() > 3 && !is_artifact(line))
        .collect();
    let cleaned = lines.join("\n");

    if cleaned.chars().count() > MAX_PDF_TEXT_CHARS {
        return format!("{}...", truncate_chars(&cleaned, MAX_PDF_TEXT_CHARS));
    }
    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubRecognizer {
        text: Option<String>,
        calls: AtomicUsize,
    }

    impl StubRecognizer {
        fn returning(text: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                text: text.map(str::to_string),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TextRecognizer for StubRecognizer {
        async fn recognize_pdf(&self, _pdf_base64: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.text
                .clone()
                .ok_or_else(|| Error::Pdf("OCR failed: unavailable".to_string()))
        }
    }

    fn not_a_pdf() -> String {
        STANDARD.encode(b"this is definitely not a pdf file")
    }

    #[test]
    fn test_clean_pdf_text() {
        let raw = "Quarterly   Report\n12\nPage 3 of 12\n . . \nok\nRevenue grew   18% year over year.";
        assert_eq!(
            clean_pdf_text(raw),
            "Quarterly Report\nRevenue grew 18% year over year."
        );
    }

    #[test]
    fn test_clean_pdf_text_caps_length() {
        let raw = "A line with enough characters to keep.\n".repeat(500);
        let cleaned = clean_pdf_text(&raw);
        assert!(cleaned.ends_with("..."));
        assert!(cleaned.chars().count() <= MAX_PDF_TEXT_CHARS + 3);
    }

    #[test]
    fn test_clean_pdf_text_counts_thai_characters() {
        let line = "รายงานผลประกอบการไตรมาสที่สาม";
        let raw = vec![line; 100].join("\n");
        let cleaned = clean_pdf_text(&raw);
        assert!(raw.len() > MAX_PDF_TEXT_CHARS);
        assert!(raw.chars().count() < MAX_PDF_TEXT_CHARS);
        assert_eq!(cleaned, raw);

        let long = vec![line; 300].join("\n");
        let cleaned = clean_pdf_text(&long);
        assert!(cleaned.ends_with("..."));
        assert_eq!(cleaned.chars().count(), MAX_PDF_TEXT_CHARS + 3);
    }

    #[test]
    fn test_strip_data_url() {
        assert_eq!(strip_data_url("data:application/pdf;base64,QUJD"), "QUJD");
        assert_eq!(strip_data_url(" QUJD "), "QUJD");
    }

    #[tokio::test]
    async fn test_invalid_base64_is_input_error() {
        let err = PdfTextExtractor::new()
            .extract_base64("@@not base64@@")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Pdf(_)));
        assert!(err.is_input());
    }

    #[tokio::test]
    async fn test_thin_text_layer_uses_ocr() {
        let recognizer = StubRecognizer::returning(Some("Scanned annual report text from OCR"));
        let extractor = PdfTextExtractor::with_recognizer(recognizer.clone());

        let text = extractor.extract_base64(&not_a_pdf()).await.unwrap();
        assert_eq!(text, "Scanned annual report text from OCR");
        assert_eq!(recognizer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_text_anywhere_is_error() {
        let recognizer = StubRecognizer::returning(None);
        let extractor = PdfTextExtractor::with_recognizer(recognizer.clone());

        let err = extractor.extract_base64(&not_a_pdf()).await.unwrap_err();
        assert!(err.is_input());
        assert_eq!(recognizer.calls.load(Ordering::SeqCst), 1);

        let err = PdfTextExtractor::new()
            .extract_base64(&not_a_pdf())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Pdf(_)));
    }
}
