use serde::{Deserialize, Serialize};

/// Cleaned text of one reference page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedSource {
    pub url: String,
    pub title: String,
    pub content: String,
}

/// How the caller wants a given reference URL used in the article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlContentInstruction {
    pub url: String,
    #[serde(default)]
    pub content_focus: Option<String>,
    #[serde(default)]
    pub usage_instruction: Option<String>,
    #[serde(default)]
    pub section_target: Option<String>,
    #[serde(default)]
    pub extraction_type: Option<String>,
}

/// Everything the model needs to draft one article. Built once per request
/// and only ever shared by reference afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationContext {
    pub topic_category: Option<String>,
    pub industry: Option<String>,
    pub target_audience: Option<String>,
    pub seo_keywords: Vec<String>,
    pub custom_prompt: Option<String>,
    /// Legacy single-URL path.
    pub scraped_content: Option<String>,
    pub scraped_sources: Vec<ScrapedSource>,
    pub url_instructions: Vec<UrlContentInstruction>,
    pub pdf_content: Option<String>,
}

impl GenerationContext {
    /// True when the model has something besides its own knowledge to go on.
    pub fn has_direction(&self) -> bool {
        self.topic_category.is_some()
            || self.industry.is_some()
            || self.scraped_content.is_some()
            || !self.scraped_sources.is_empty()
            || self.pdf_content.is_some()
    }

    pub fn joined_keywords(&self) -> Option<String> {
        if self.seo_keywords.is_empty() {
            None
        } else {
            Some(self.seo_keywords.join(", "))
        }
    }

    pub fn quality_summary(&self) -> QualitySummary {
        QualitySummary {
            topic_category: self.topic_category.clone(),
            industry: self.industry.clone(),
            target_audience: self.target_audience.clone(),
            seo_keywords: self.joined_keywords(),
        }
    }
}

/// The slice of a context the quality scorer sees.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualitySummary {
    pub topic_category: Option<String>,
    pub industry: Option<String>,
    pub target_audience: Option<String>,
    pub seo_keywords: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSlot {
    /// Matches the `![id](placeholder)` marker in the content.
    pub id: String,
    pub description: String,
    pub position: String,
    pub suggested_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement_rationale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_guidance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Section titles in article order.
    #[serde(default)]
    pub sections: Vec<String>,
    #[serde(default)]
    pub image_slots: Vec<ImageSlot>,
}

impl Layout {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.image_slots.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceUsageDetail {
    #[serde(default)]
    pub source_title: String,
    #[serde(default)]
    pub source_url: String,
    #[serde(default)]
    pub content_used: String,
    #[serde(default)]
    pub usage_location: String,
    #[serde(default)]
    pub usage_purpose: String,
    #[serde(default)]
    pub transformation: String,
    #[serde(default)]
    pub instruction_compliance: String,
    #[serde(default)]
    pub extraction_type_used: String,
}

/// One generated candidate article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub content: String,
    pub layout: Layout,
    pub source_usage_details: Vec<SourceUsageDetail>,
}

impl Draft {
    pub fn markdown(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            layout: Layout::default(),
            source_usage_details: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityFeedback {
    pub score: f64,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// One pass of the refine loop.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationAttempt {
    /// 1-based.
    pub iteration: u32,
    pub feedback_in: Option<String>,
    pub draft: Draft,
    pub quality: QualityFeedback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub draft: Draft,
    pub quality: QualityFeedback,
    pub iterations: u32,
    /// False when the loop ran out of iterations below the threshold.
    pub accepted: bool,
}

impl From<(GenerationAttempt, bool)> for GenerationResult {
    fn from((attempt, accepted): (GenerationAttempt, bool)) -> Self {
        Self {
            draft: attempt.draft,
            quality: attempt.quality,
            iterations: attempt.iteration,
            accepted,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleAnalysis {
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub content: String,
    pub layout: Layout,
    pub source_usage_details: Vec<SourceUsageDetail>,
    #[serde(default)]
    pub notes: Vec<String>,
}

/// Quality header shown at the top of a rendered document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityStamp {
    pub quality_score: f64,
    pub iterations: u32,
}
