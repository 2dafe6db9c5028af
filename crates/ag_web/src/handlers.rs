use std::sync::Arc;

use ag_core::{
    ArticleAnalysis, Draft, Layout, ModelKind, Outcome, QualityStamp, SourceUsageDetail,
    Translation,
};
use ag_inference::{ArticleOutput, GenerateOptions};
use ag_scrapers::ArticleRequest;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleResponse {
    pub content: String,
    pub layout: Layout,
    pub quality_score: f64,
    pub iterations: u32,
    pub source_usage_details: Vec<SourceUsageDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ArticleAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thai_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thai_layout: Option<Layout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thai_source_usage_details: Option<Vec<SourceUsageDetail>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation_success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation_error: Option<String>,
    pub model_used: ModelKind,
}

impl From<ArticleOutput> for ArticleResponse {
    fn from(output: ArticleOutput) -> Self {
        let ArticleOutput {
            result,
            model,
            analysis,
            translation,
        } = output;

        let mut response = Self {
            content: result.draft.content,
            layout: result.draft.layout,
            quality_score: result.quality.score,
            iterations: result.iterations,
            source_usage_details: result.draft.source_usage_details,
            analysis,
            thai_content: None,
            thai_layout: None,
            thai_source_usage_details: None,
            translation_success: None,
            translation_error: None,
            model_used: model,
        };
        match translation {
            Some(Outcome::Complete(translation)) => {
                response.thai_content = Some(translation.content);
                response.thai_layout = Some(translation.layout);
                response.thai_source_usage_details = Some(translation.source_usage_details);
                response.translation_success = Some(true);
            }
            Some(Outcome::Degraded(reason)) => {
                response.translation_success = Some(false);
                response.translation_error = Some(reason);
            }
            None => {}
        }
        response
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TranslateRequest {
    #[serde(alias = "content")]
    pub markdown_content: String,
    pub layout: Layout,
    pub source_usage_details: Vec<SourceUsageDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub thai_content: String,
    pub layout: Option<Layout>,
    pub source_usage_details: Vec<SourceUsageDetail>,
    pub translation_notes: Vec<String>,
    pub translation_success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Outcome<Translation>> for TranslateResponse {
    fn from(outcome: Outcome<Translation>) -> Self {
        match outcome {
            Outcome::Complete(translation) => Self {
                thai_content: translation.content,
                layout: Some(translation.layout),
                source_usage_details: translation.source_usage_details,
                translation_notes: translation.notes,
                translation_success: true,
                error: None,
            },
            Outcome::Degraded(reason) => Self {
                thai_content: String::new(),
                layout: None,
                source_usage_details: Vec::new(),
                translation_notes: Vec::new(),
                translation_success: false,
                error: Some(reason),
            },
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct PdfRequest {
    #[serde(alias = "content")]
    pub markdown_content: String,
    #[serde(default = "default_true")]
    pub include_quality_info: bool,
    #[serde(default)]
    pub quality_score: Option<f64>,
    #[serde(default)]
    pub iterations: Option<u32>,
}

impl PdfRequest {
    fn stamp(&self) -> Option<QualityStamp> {
        self.include_quality_info.then(|| QualityStamp {
            quality_score: self.quality_score.unwrap_or(0.0),
            iterations: self.iterations.unwrap_or(1),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfResponse {
    pub html_base64: String,
    pub content_type: String,
}

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Jenosize Article Generator API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "generate_article": "/api/generate-article",
            "translate": "/api/translate",
            "generate_pdf": "/api/generate-pdf",
            "health": "/api/health"
        }
    }))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let models = state.service.models();
    let available: Vec<&str> = [ModelKind::OpenAi, ModelKind::Together, ModelKind::Dummy]
        .into_iter()
        .filter(|kind| models.contains(*kind))
        .map(|kind| kind.as_str())
        .collect();
    Json(json!({
        "status": "healthy",
        "service": "article-generator",
        "default_model": models.default_kind(),
        "models": available,
    }))
}

pub async fn generate_article(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ArticleRequest>,
) -> Result<Json<ArticleResponse>, ApiError> {
    const ACTION: &str = "generating article";

    let model = request
        .model_kind()
        .map_err(|e| ApiError::from_error(ACTION, e))?;
    let context = state
        .context
        .build(&request)
        .await
        .map_err(|e| ApiError::from_error(ACTION, e))?;

    let options = GenerateOptions {
        model,
        analyze: request.include_analysis,
        translate: request.translate_to_thai,
    };
    let output = state
        .service
        .generate(&context, options)
        .await
        .map_err(|e| ApiError::from_error(ACTION, e))?;

    info!(
        model = %output.model,
        iterations = output.result.iterations,
        score = output.result.quality.score,
        accepted = output.result.accepted,
        "Article generated"
    );
    Ok(Json(output.into()))
}

pub async fn translate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TranslateRequest>,
) -> Json<TranslateResponse> {
    let draft = Draft {
        content: request.markdown_content,
        layout: request.layout,
        source_usage_details: request.source_usage_details,
    };
    Json(state.service.translate(&draft).await.into())
}

pub async fn generate_pdf(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PdfRequest>,
) -> Result<Json<PdfResponse>, ApiError> {
    let html_base64 = state
        .service
        .render(&request.markdown_content, request.stamp())
        .await
        .map_err(|e| ApiError::from_error("generating PDF", e))?;
    Ok(Json(PdfResponse {
        html_base64,
        content_type: "text/html".to_string(),
    }))
}
