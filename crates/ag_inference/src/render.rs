use std::fmt;
use std::time::Duration;

use ag_core::config::BackendSettings;
use ag_core::{DocumentRenderer, Error, QualityStamp, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::info;

use crate::client::{ChatClient, ChatOptions};
use crate::prompts;
use crate::response;

const RENDER_TEMPERATURE: f32 = 0.1;

/// Markdown to print-ready HTML via the chat model. The document comes back
/// base64 encoded so it can travel inside JSON.
pub struct ChatRenderer {
    client: ChatClient,
    max_tokens: u32,
}

impl fmt::Debug for ChatRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatRenderer")
            .field("model", &self.client.model())
            .finish()
    }
}

impl ChatRenderer {
    pub fn new(settings: &BackendSettings, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: ChatClient::new(settings, timeout)?,
            max_tokens: settings.max_tokens,
        })
    }
}

#[async_trait]
impl DocumentRenderer for ChatRenderer {
    async fn render(&self, markdown: &str, stamp: Option<QualityStamp>) -> Result<String> {
        if markdown.trim().is_empty() {
            return Err(Error::InvalidInput("Markdown content is required".to_string()));
        }
        let options = ChatOptions {
            max_tokens: self.max_tokens,
            temperature: RENDER_TEMPERATURE,
            json_mode: true,
        };
        let reply = self
            .client
            .chat(
                &prompts::render_system_prompt(),
                &prompts::render_user_prompt(markdown, stamp),
                options,
            )
            .await
            .map_err(|e| Error::Rendering(e.to_string()))?;

        let html = response::parse_rendered_html(&reply).map_err(|e| Error::Rendering(e.to_string()))?;
        info!("📄 Rendered document ({} bytes of HTML)", html.len());
        Ok(STANDARD.encode(html.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::{backend, completion, reply_with};
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn renderer(server: &MockServer) -> ChatRenderer {
        ChatRenderer::new(&backend(server), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_render_returns_base64_html() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("Article Quality Score: 91.0%"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(
                r#"{"html_content": "<!DOCTYPE html><h1>Hi</h1>"}"#,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let stamp = QualityStamp {
            quality_score: 0.91,
            iterations: 2,
        };
        let encoded = renderer(&server).render("# Hi", Some(stamp)).await.unwrap();
        let html = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
        assert_eq!(html, "<!DOCTYPE html><h1>Hi</h1>");
    }

    #[tokio::test]
    async fn test_render_rejects_empty_markdown() {
        let server = MockServer::start().await;
        let err = renderer(&server).render(" ", None).await.unwrap_err();
        assert!(err.is_input());
    }

    #[tokio::test]
    async fn test_render_missing_html_is_rendering_error() {
        let server = MockServer::start().await;
        reply_with(&server, r#"{"html": "wrong key"}"#).await;
        let err = renderer(&server).render("# Hi", None).await.unwrap_err();
        assert!(matches!(err, Error::Rendering(_)));
    }
}
