use std::fmt;
use std::time::Duration;

use ag_core::config::BackendSettings;
use ag_core::{Error, Result, TextRecognizer};
use async_trait::async_trait;
use tracing::info;

use crate::client::{ChatClient, ChatMessage, ChatOptions, ContentPart, ImageUrl};
use crate::prompts::OCR_PROMPT;

pub const OCR_MODEL: &str = "gpt-4o";
const OCR_MAX_TOKENS: u32 = 4000;

/// Reads scanned PDFs with a vision-capable chat model.
pub struct ChatTextRecognizer {
    client: ChatClient,
}

impl fmt::Debug for ChatTextRecognizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatTextRecognizer")
            .field("model", &self.client.model())
            .finish()
    }
}

impl ChatTextRecognizer {
    pub fn new(settings: &BackendSettings, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: ChatClient::new(settings, timeout)?.with_model(OCR_MODEL),
        })
    }
}

#[async_trait]
impl TextRecognizer for ChatTextRecognizer {
    async fn recognize_pdf(&self, pdf_base64: &str) -> Result<String> {
        let message = ChatMessage::user_parts(vec![
            ContentPart::Text {
                text: OCR_PROMPT.to_string(),
            },
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: format!("data:application/pdf;base64,{}", pdf_base64),
                },
            },
        ]);
        let options = ChatOptions {
            max_tokens: OCR_MAX_TOKENS,
            temperature: 0.1,
            json_mode: false,
        };
        let text = self
            .client
            .send(vec![message], options)
            .await
            .map_err(|e| Error::Pdf(format!("OCR failed: {}", e)))?;
        info!("🔍 OCR recovered {} characters", text.len());
        Ok(text)
    }
}
