use std::fmt;
use std::time::Duration;

use ag_core::config::BackendSettings;
use ag_core::{ArticleAnalysis, ArticleModel, Draft, Error, GenerationContext, Result};
use async_trait::async_trait;
use tracing::{debug, info};

use super::{ANALYSIS_MAX_TOKENS, ANALYSIS_TEMPERATURE};
use crate::client::{ChatClient, ChatOptions};
use crate::prompts::{self, ReplyFormat};
use crate::response;

/// Chat completion backend in JSON mode. A reply that does not parse into a
/// draft is a failed attempt.
pub struct OpenAiModel {
    client: ChatClient,
    max_tokens: u32,
    temperature: f32,
}

impl fmt::Debug for OpenAiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiModel")
            .field("model", &self.client.model())
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl OpenAiModel {
    pub fn new(settings: &BackendSettings, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: ChatClient::new(settings, timeout)?,
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        })
    }
}

#[async_trait]
impl ArticleModel for OpenAiModel {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn generate(&self, context: &GenerationContext, feedback: Option<&str>) -> Result<Draft> {
        let system = prompts::generation_system_prompt(ReplyFormat::JsonOnly);
        let user = prompts::generation_user_prompt(context, feedback, ReplyFormat::JsonOnly, None);

        info!(
            model = %self.client.model(),
            topic = ?context.topic_category,
            has_feedback = feedback.is_some(),
            "Generating article"
        );
        debug!(system_len = system.len(), user_len = user.len(), "Prompt sizes");

        let options = ChatOptions {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            json_mode: true,
        };
        let reply = self
            .client
            .chat(&system, &user, options)
            .await
            .map_err(|e| Error::Generation(format!("Error generating article: {}", e)))?;

        response::parse_strict_draft(&reply)
            .map_err(|e| Error::Generation(format!("Error generating article: {}", e)))
    }

    async fn analyze(&self, content: &str, context: &GenerationContext) -> Result<ArticleAnalysis> {
        let options = ChatOptions {
            max_tokens: ANALYSIS_MAX_TOKENS,
            temperature: ANALYSIS_TEMPERATURE,
            json_mode: true,
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

        response::parse_analysis(&reply)
            .map_err(|e| Error::Generation(format!("Error analyzing article: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::{backend, completion, reply_with};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn model(server: &MockServer) -> OpenAiModel {
        OpenAiModel::new(&backend(server), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_generate_parses_json_draft() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({ "response_format": { "type": "json_object" } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(
                r##"{"content": "# AI in Retail", "layout": {"sections": ["Intro"], "image_slots": []}}"##,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let draft = model(&server)
            .generate(&GenerationContext::default(), None)
            .await
            .unwrap();
        assert_eq!(draft.content, "# AI in Retail");
        assert_eq!(draft.layout.sections, vec!["Intro"]);
    }

    #[tokio::test]
    async fn test_generate_malformed_json_is_a_generation_error() {
        let server = MockServer::start().await;
        reply_with(&server, "# Not JSON at all").await;

        let err = model(&server)
            .generate(&GenerationContext::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation(_)), "{:?}", err);
    }

    #[tokio::test]
    async fn test_generate_empty_reply_is_a_generation_error() {
        let server = MockServer::start().await;
        reply_with(&server, "").await;

        let err = model(&server)
            .generate(&GenerationContext::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }

    #[tokio::test]
    async fn test_generate_upstream_failure_is_a_generation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let err = model(&server)
            .generate(&GenerationContext::default(), Some("Quality score: 0.40. Weak."))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_analyze_parses_json() {
        let server = MockServer::start().await;
        reply_with(
            &server,
            r#"{"strengths": ["clear"], "weaknesses": [], "recommendations": ["add data"], "summary": "Solid."}"#,
        )
        .await;

        let analysis = model(&server)
            .analyze("# Article", &GenerationContext::default())
            .await
            .unwrap();
        assert_eq!(analysis.strengths, vec!["clear"]);
        assert_eq!(analysis.summary, "Solid.");
    }
}
