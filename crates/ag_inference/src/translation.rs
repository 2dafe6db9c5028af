use std::fmt;
use std::time::Duration;

use ag_core::config::BackendSettings;
use ag_core::{Draft, Outcome, Result, Translation, Translator};
use async_trait::async_trait;
use tracing::{info, warn};

use crate::client::{ChatClient, ChatOptions};
use crate::prompts;
use crate::response;

const TRANSLATION_MAX_TOKENS: u32 = 8000;
const TRANSLATION_TEMPERATURE: f32 = 0.2;

/// English to Thai translation of a finished draft. Never fails the request:
/// every problem comes back as `Outcome::Degraded`.
pub struct ChatTranslator {
    client: ChatClient,
}

impl fmt::Debug for ChatTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatTranslator")
            .field("model", &self.client.model())
            .finish()
    }
}

impl ChatTranslator {
    pub fn new(settings: &BackendSettings, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: ChatClient::new(settings, timeout)?,
        })
    }

    async fn request(&self, draft: &Draft) -> std::result::Result<Translation, String> {
        let user = prompts::translation_user_prompt(draft).map_err(|e| e.to_string())?;
        let options = ChatOptions {
            max_tokens: TRANSLATION_MAX_TOKENS,
            temperature: TRANSLATION_TEMPERATURE,
            json_mode: true,
        };
        let reply = self
            .client
            .chat(&prompts::translation_system_prompt(), &user, options)
            .await
            .map_err(|e| e.to_string())?;
        response::parse_translation(&reply, draft).map_err(|e| e.to_string())
    }
}

#[async_trait]
impl Translator for ChatTranslator {
    async fn translate(&self, draft: &Draft) -> Outcome<Translation> {
        if draft.content.trim().is_empty() {
            return Outcome::Degraded("No content provided for translation".to_string());
        }
        match self.request(draft).await {
            Ok(translation) => {
                info!("🌏 Translation complete ({} chars)", translation.content.len());
                Outcome::Complete(translation)
            }
            Err(reason) => {
                warn!("Translation failed: {}", reason);
                Outcome::Degraded(format!("Translation failed: {}", reason))
            }
        }
    }
}
