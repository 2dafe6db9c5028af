use std::fmt;
use std::time::Duration;

use ag_core::config::BackendSettings;
use ag_core::{Error, QualityFeedback, QualityScorer, QualitySummary, Result};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::client::{ChatClient, ChatOptions};
use crate::prompts;
use crate::response;

const SCORER_MAX_TOKENS: u32 = 1000;
const SCORER_TEMPERATURE: f32 = 0.2;

/// Rubric-based scorer: one JSON-mode call per draft, no retries.
pub struct ChatQualityScorer {
    client: ChatClient,
}

impl fmt::Debug for ChatQualityScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatQualityScorer")
            .field("model", &self.client.model())
            .finish()
    }
}

impl ChatQualityScorer {
    pub fn new(settings: &BackendSettings, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: ChatClient::new(settings, timeout)?,
        })
    }
}

#[async_trait]
impl QualityScorer for ChatQualityScorer {
    async fn score(&self, content: &str, summary: &QualitySummary) -> Result<QualityFeedback> {
        let options = ChatOptions {
            max_tokens: SCORER_MAX_TOKENS,
            temperature: SCORER_TEMPERATURE,
            json_mode: true,
        };
        let reply = self
            .client
            .chat(
                &prompts::quality_system_prompt(),
                &prompts::quality_user_prompt(content, summary),
                options,
            )
            .await
            .map_err(|e| Error::Scoring(e.to_string()))?;

        let quality = response::parse_quality(&reply).map_err(|e| Error::Scoring(e.to_string()))?;
        if !(0.0..=1.0).contains(&quality.score) {
            debug!(score = quality.score, "Scorer returned a score outside [0, 1]");
        }
        info!(score = quality.score, suggestions = quality.suggestions.len(), "Scored draft");
        Ok(quality)
    }
}
