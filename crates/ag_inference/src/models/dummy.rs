use std::fmt;

use ag_core::{
    ArticleAnalysis, ArticleModel, Draft, GenerationContext, ImageSlot, Layout, QualityFeedback,
    QualityScorer, QualitySummary, Result,
};
use async_trait::async_trait;

/// Offline article model. Output is derived from the context only, and a
/// retry with feedback writes a longer draft.
#[derive(Default)]
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ArticleModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn generate(&self, context: &GenerationContext, feedback: Option<&str>) -> Result<Draft> {
        let topic = context
            .topic_category
            .as_deref()
            .unwrap_or("Emerging Business Trends");
        let industry = context.industry.as_deref().unwrap_or("business");
        let audience = context
            .target_audience
            .as_deref()
            .unwrap_or("business leaders");

        let sections = vec![
            "Introduction".to_string(),
            "Key Trends".to_string(),
            "What It Means for Leaders".to_string(),
            "Conclusion".to_string(),
        ];
        let paragraphs = if feedback.is_some() { 6 } else { 2 };

        let mut content = format!("# {} in {}\n\n", topic, industry);
        for section in &sections {
            content.push_str(&format!("## {}\n\n", section));
            for _ in 0..paragraphs {
                content.push_str(&format!(
                    "{} teams serving {} are rethinking how {} shapes their next move. ",
                    industry, audience, topic
                ));
            }
            content.push_str("\n\n");
        }
        if let Some(keywords) = context.joined_keywords() {
            content.push_str(&format!("Keywords: {}\n", keywords));
        }
        for source in &context.scraped_sources {
            content.push_str(&format!("\nSource: [{}]({})\n", source.title, source.url));
        }

        Ok(Draft {
            content,
            layout: Layout {
                sections,
                image_slots: vec![ImageSlot {
                    id: "img_0".to_string(),
                    description: format!("Hero image for {}", topic),
                    position: "after_title".to_string(),
                    suggested_type: "photo".to_string(),
                    ..ImageSlot::default()
                }],
            },
            source_usage_details: Vec::new(),
        })
    }

    async fn analyze(&self, content: &str, _context: &GenerationContext) -> Result<ArticleAnalysis> {
        let words = content.split_whitespace().count();
        Ok(ArticleAnalysis {
            strengths: vec![format!("{} words across clear sections", words)],
            weaknesses: Vec::new(),
            recommendations: vec!["Add concrete figures from current sources".to_string()],
            summary: "Offline analysis".to_string(),
        })
    }
}

/// Offline scorer: longer drafts score higher, saturating at 1.0.
#[derive(Debug, Clone, Copy)]
pub struct DummyScorer {
    pub target_words: usize,
}

impl Default for DummyScorer {
    fn default() -> Self {
        Self { target_words: 400 }
    }
}

#[async_trait]
impl QualityScorer for DummyScorer {
    async fn score(&self, content: &str, _summary: &QualitySummary) -> Result<QualityFeedback> {
        let words = content.split_whitespace().count();
        let score = (words as f64 / self.target_words.max(1) as f64).min(1.0);
        let (feedback, suggestions) = if words >= self.target_words {
            ("Article meets the length target.".to_string(), Vec::new())
        } else {
            (
                format!("Article has {} words, expected about {}.", words, self.target_words),
                vec!["Expand each section with more detail".to_string()],
            )
        };
        Ok(QualityFeedback {
            score,
            feedback,
            suggestions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dummy_model_uses_context() {
        let model = DummyModel::new();
        let context = GenerationContext {
            topic_category: Some("Retail AI".to_string()),
            industry: Some("Retail".to_string()),
            seo_keywords: vec!["ai".to_string(), "retail".to_string()],
            ..GenerationContext::default()
        };
        let draft = model.generate(&context, None).await.unwrap();
        assert!(draft.content.starts_with("# Retail AI in Retail"));
        assert!(draft.content.contains("Keywords: ai, retail"));
        assert_eq!(draft.layout.sections.len(), 4);
        assert_eq!(draft.layout.image_slots[0].id, "img_0");
    }

    #[tokio::test]
    async fn test_feedback_produces_longer_draft() {
        let model = DummyModel::new();
        let context = GenerationContext::default();
        let first = model.generate(&context, None).await.unwrap();
        let retry = model.generate(&context, Some("Quality score: 0.30. Too short.")).await.unwrap();
        assert!(retry.content.len() > first.content.len());
    }

    #[tokio::test]
    async fn test_dummy_scorer_saturates() {
        let scorer = DummyScorer { target_words: 4 };
        let summary = QualitySummary::default();
        let short = scorer.score("one two", &summary).await.unwrap();
        assert_eq!(short.score, 0.5);
        assert_eq!(short.suggestions.len(), 1);
        let long = scorer.score("one two three four five", &summary).await.unwrap();
        assert_eq!(long.score, 1.0);
        assert!(long.suggestions.is_empty());
    }
}
