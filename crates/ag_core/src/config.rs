use std::fmt;
use std::time::Duration;

use crate::models::ModelKind;
use crate::{Error, Result};

pub const QUALITY_THRESHOLD: f64 = 0.85;
pub const MAX_QUALITY_ITERATIONS: u32 = 3;
pub const MAX_URLS: usize = 5;
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
pub const MODEL_TIMEOUT_SECS: u64 = 120;
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const OPENAI_MODEL: &str = "gpt-4.1-mini";
pub const TOGETHER_BASE_URL: &str = "https://api.together.xyz/v1";
pub const TOGETHER_MODEL: &str = "deepseek-ai/DeepSeek-R1-Distill-Qwen-14B";

/// Connection and sampling settings for one chat-completion provider.
#[derive(Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl fmt::Debug for BackendSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl BackendSettings {
    pub fn openai() -> Self {
        Self {
            base_url: OPENAI_BASE_URL.to_string(),
            api_key: None,
            model: OPENAI_MODEL.to_string(),
            max_tokens: 8000,
            temperature: 0.7,
        }
    }

    pub fn together() -> Self {
        Self {
            base_url: TOGETHER_BASE_URL.to_string(),
            api_key: None,
            model: TOGETHER_MODEL.to_string(),
            max_tokens: 4000,
            temperature: 0.7,
        }
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::Config(format!("API key is required for {}", self.base_url)))
    }
}

/// Knobs of the generate-score-retry loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopSettings {
    pub quality_threshold: f64,
    pub max_iterations: u32,
    /// Overall budget for the loop. `None` waits as long as the providers do.
    pub deadline: Option<Duration>,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            quality_threshold: QUALITY_THRESHOLD,
            max_iterations: MAX_QUALITY_ITERATIONS,
            deadline: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    pub request_timeout: Duration,
    pub user_agent: String,
    pub max_urls: usize,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            user_agent: USER_AGENT.to_string(),
            max_urls: MAX_URLS,
        }
    }
}

/// Process-wide configuration, built once at startup and injected.
#[derive(Debug, Clone)]
pub struct Settings {
    pub openai: BackendSettings,
    pub together: BackendSettings,
    pub default_model: ModelKind,
    pub model_timeout: Duration,
    pub generation: LoopSettings,
    pub scrape: ScrapeSettings,
    pub bind: String,
    pub cors_origins: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            openai: BackendSettings::openai(),
            together: BackendSettings::together(),
            default_model: ModelKind::default(),
            model_timeout: Duration::from_secs(MODEL_TIMEOUT_SECS),
            generation: LoopSettings::default(),
            scrape: ScrapeSettings::default(),
            bind: "0.0.0.0:8000".to_string(),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        let threshold = self.generation.quality_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(Error::Config(format!(
                "quality threshold must be within [0, 1], got {}",
                threshold
            )));
        }
        if self.generation.max_iterations == 0 {
            return Err(Error::Config("max iterations must be at least 1".to_string()));
        }
        if self.scrape.max_urls == 0 {
            return Err(Error::Config("max URLs must be at least 1".to_string()));
        }
        Ok(())
    }
}
