use std::fmt;
use std::time::Duration;

use ag_core::config::BackendSettings;
use ag_core::{ArticleAnalysis, ArticleModel, Draft, Error, GenerationContext, Result};
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

use super::{ANALYSIS_MAX_TOKENS, ANALYSIS_TEMPERATURE};
use crate::client::{ChatClient, ChatOptions};
use crate::prompts::{self, ReplyFormat};
use crate::response::{self, ReplyError};

/// Free-form completion backend for the fine-tuned model. JSON is used when
/// the model produces it; anything else is taken as the markdown article.
pub struct TogetherModel {
    client: ChatClient,
    max_tokens: u32,
    temperature: f32,
}

impl fmt::Debug for TogetherModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TogetherModel")
            .field("model", &self.client.model())
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl TogetherModel {
    pub fn new(settings: &BackendSettings, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: ChatClient::new(settings, timeout)?,
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        })
    }
}

#[async_trait]
impl ArticleModel for TogetherModel {
    fn name(&self) -> &str {
        "Together"
    }

    async fn generate(&self, context: &GenerationContext, feedback: Option<&str>) -> Result<Draft> {
        let system = prompts::generation_system_prompt(ReplyFormat::JsonOrMarkdown);
        let user = prompts::generation_user_prompt(
            context,
            feedback,
            ReplyFormat::JsonOrMarkdown,
            Some(Utc::now()),
        );

        info!(
            model = %self.client.model(),
            topic = ?context.topic_category,
            has_feedback = feedback.is_some(),
            "Generating article"
        );

        let options = ChatOptions {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            json_mode: false,
        };
        let reply = self
            .client
            .chat(&system, &user, options)
            .await
            .map_err(|e| Error::Generation(format!("Error generating article: {}", e)))?;

        let draft = response::parse_lenient_draft(&reply)
            .map_err(|e| Error::Generation(format!("Error generating article: {}", e)))?;
        debug!(
            length = draft.content.len(),
            structured = !draft.layout.is_empty(),
            "Parsed draft"
        );
        Ok(draft)
    }

    async fn analyze(&self, content: &str, context: &GenerationContext) -> Result<ArticleAnalysis> {
        let options = ChatOptions {
            max_tokens: ANALYSIS_MAX_TOKENS,
            temperature: ANALYSIS_TEMPERATURE,
            json_mode: false,
        };
        let reply = self
            .client
            .chat(
                &prompts::analysis_system_prompt(),
                &prompts::analysis_user_prompt(content, context),
                options,
            )
            .await
            .map_err(|e| Error::Generation(format!("Error analyzing article: {}", e)))?;

        match response::parse_analysis(&reply) {
            Ok(analysis) => Ok(analysis),
            Err(ReplyError::NotJson(_)) => {
                debug!("Analysis reply is not JSON, using unstructured summary");
                Ok(response::unstructured_analysis(&reply))
            }
            Err(e) => Err(Error::Generation(format!("Error analyzing article: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::{backend, reply_with};
    use wiremock::MockServer;

    fn model(server: &MockServer) -> TogetherModel {
        TogetherModel::new(&backend(server), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_generate_accepts_plain_markdown() {
        let server = MockServer::start().await;
        reply_with(&server, "# Future of Logistics\n\nAutonomous fleets are coming.").await;

        let draft = model(&server)
            .generate(&GenerationContext::default(), None)
            .await
            .unwrap();
        assert!(draft.content.starts_with("# Future of Logistics"));
        assert!(draft.layout.sections.is_empty());
        assert!(draft.layout.image_slots.is_empty());
    }

    #[tokio::test]
    async fn test_generate_prefers_json_when_present() {
        let server = MockServer::start().await;
        reply_with(
            &server,
            r##"{"content": "# Structured", "layout": {"sections": ["A", "B"]}}"##,
        )
        .await;

        let draft = model(&server)
            .generate(&GenerationContext::default(), None)
            .await
            .unwrap();
        assert_eq!(draft.content, "# Structured");
        assert_eq!(draft.layout.sections, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_generate_empty_reply_is_an_error() {
        let server = MockServer::start().await;
        reply_with(&server, "  ").await;

        let err = model(&server)
            .generate(&GenerationContext::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }

    #[tokio::test]
    async fn test_analyze_degrades_to_unstructured() {
        let server = MockServer::start().await;
        reply_with(&server, "Pretty good overall, could use more numbers.").await;

        let analysis = model(&server)
            .analyze("# Article", &GenerationContext::default())
            .await
            .unwrap();
        assert_eq!(analysis.strengths, vec!["Content generated successfully"]);
        assert!(analysis.summary.contains("could use more numbers"));
    }
}
