//! Validation of raw model replies into typed values.

use ag_core::utils::{strip_code_blocks, truncate_chars};
use ag_core::{ArticleAnalysis, Draft, ImageSlot, Layout, QualityFeedback, SourceUsageDetail, Translation};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("model returned an empty reply")]
    Empty,
    #[error("reply is not a JSON object: {0}")]
    NotJson(String),
    #[error("reply is missing the `{0}` field")]
    MissingField(&'static str),
}

/// Drop a leading `<think>...</think>` block emitted by reasoning models.
pub fn strip_reasoning(reply: &str) -> &str {
    let trimmed = reply.trim_start();
    if trimmed.starts_with("<think>") {
        if let Some(end) = trimmed.find("</think>") {
            return trimmed[end + "</think>".len()..].trim_start();
        }
    }
    reply
}

fn parse_object(reply: &str) -> Result<Map<String, Value>, ReplyError> {
    let cleaned = strip_code_blocks(strip_reasoning(reply));
    if cleaned.is_empty() {
        return Err(ReplyError::Empty);
    }
    match serde_json::from_str::<Value>(cleaned) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ReplyError::NotJson(format!("expected an object, got {}", kind_of(&other)))),
        Err(e) => Err(ReplyError::NotJson(e.to_string())),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Build a layout from whatever the model sent, filling gaps with defaults.
pub fn parse_layout(value: Option<&Value>) -> Layout {
    let Some(Value::Object(map)) = value else {
        return Layout::default();
    };

    let sections = string_list(map.get("sections"));
    let mut image_slots = Vec::new();
    for slot in map.get("image_slots").and_then(Value::as_array).into_iter().flatten() {
        let Value::Object(slot) = slot else { continue };
        let id = string_field(slot, "id")
            .filter(|id| !image_slots.iter().any(|s: &ImageSlot| &s.id == id))
            .unwrap_or_else(|| unused_slot_id(&image_slots));
        image_slots.push(ImageSlot {
            id,
            description: string_field(slot, "description").unwrap_or_else(|| "Image placeholder".to_string()),
            position: string_field(slot, "position").unwrap_or_else(|| "article".to_string()),
            suggested_type: string_field(slot, "suggested_type").unwrap_or_else(|| "photo".to_string()),
            placement_rationale: string_field(slot, "placement_rationale"),
            content_guidance: string_field(slot, "content_guidance"),
            dimensions: string_field(slot, "dimensions"),
            aspect_ratio: string_field(slot, "aspect_ratio"),
            alternatives: string_field(slot, "alternatives"),
        });
    }

    Layout {
        sections,
        image_slots,
    }
}

fn unused_slot_id(slots: &[ImageSlot]) -> String {
    (slots.len()..)
        .map(|n| format!("img_{}", n))
        .find(|candidate| !slots.iter().any(|s| &s.id == candidate))
        .unwrap_or_default()
}

pub fn parse_source_usage(value: Option<&Value>) -> Vec<SourceUsageDetail> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|item| item.is_object())
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// A reply that must be a JSON draft with non-empty `content`.
pub fn parse_strict_draft(reply: &str) -> Result<Draft, ReplyError> {
    let map = parse_object(reply)?;
    draft_from_map(&map)
}

/// JSON when the model produced JSON; otherwise the whole reply is the
/// markdown article with an empty layout.
pub fn parse_lenient_draft(reply: &str) -> Result<Draft, ReplyError> {
    match parse_object(reply) {
        Ok(map) => draft_from_map(&map),
        Err(ReplyError::NotJson(_)) => Ok(Draft::markdown(strip_reasoning(reply).trim())),
        Err(e) => Err(e),
    }
}

fn draft_from_map(map: &Map<String, Value>) -> Result<Draft, ReplyError> {
    let content = string_field(map, "content")
        .or_else(|| string_field(map, "markdown_content"))
        .filter(|content| !content.trim().is_empty())
        .ok_or(ReplyError::MissingField("content"))?;

    Ok(Draft {
        content,
        layout: parse_layout(map.get("layout")),
        source_usage_details: parse_source_usage(map.get("source_usage_details")),
    })
}

/// The scorer does not clamp: whatever number the model sent is the score.
pub fn parse_quality(reply: &str) -> Result<QualityFeedback, ReplyError> {
    let map = parse_object(reply)?;
    let score = match map.get("score") {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().map_err(|_| ReplyError::MissingField("score"))?,
        None | Some(Value::Null) => 0.0,
        Some(_) => return Err(ReplyError::MissingField("score")),
    };
    Ok(QualityFeedback {
        score,
        feedback: string_field(&map, "feedback").unwrap_or_default(),
        suggestions: string_list(map.get("suggestions")),
    })
}

pub fn parse_analysis(reply: &str) -> Result<ArticleAnalysis, ReplyError> {
    let map = parse_object(reply)?;
    Ok(ArticleAnalysis {
        strengths: string_list(map.get("strengths")),
        weaknesses: string_list(map.get("weaknesses")),
        recommendations: string_list(map.get("recommendations")),
        summary: string_field(&map, "summary").unwrap_or_default(),
    })
}

/// Stand-in analysis for a reply that was not JSON.
pub fn unstructured_analysis(reply: &str) -> ArticleAnalysis {
    ArticleAnalysis {
        strengths: vec!["Content generated successfully".to_string()],
        weaknesses: vec!["Analysis could not be parsed as structured feedback".to_string()],
        recommendations: vec!["Review content manually for quality".to_string()],
        summary: format!(
            "Analysis completed. Raw feedback: {}...",
            truncate_chars(reply.trim(), 200)
        ),
    }
}

/// Translation reply. Missing layout or source usage fall back to the
/// untranslated originals.
pub fn parse_translation(reply: &str, original: &Draft) -> Result<Translation, ReplyError> {
    let map = parse_object(reply)?;
    let content = string_field(&map, "thai_content")
        .filter(|content| !content.trim().is_empty())
        .ok_or(ReplyError::MissingField("thai_content"))?;

    let layout = match map.get("layout") {
        Some(value @ Value::Object(_)) => parse_layout(Some(value)),
        _ => original.layout.clone(),
    };
    let source_usage_details = match map.get("source_usage_details") {
        Some(value @ Value::Array(_)) => parse_source_usage(Some(value)),
        _ => original.source_usage_details.clone(),
    };

    Ok(Translation {
        content,
        layout,
        source_usage_details,
        notes: string_list(map.get("translation_notes")),
    })
}

pub fn parse_rendered_html(reply: &str) -> Result<String, ReplyError> {
    let map = parse_object(reply)?;
    string_field(&map, "html_content")
        .filter(|html| !html.trim().is_empty())
        .ok_or(ReplyError::MissingField("html_content"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_DRAFT: &str = r##"{
        "content": "# Title\n\n![img_1](placeholder)\n\nBody",
        "layout": {
            "sections": ["Introduction", "Outlook", 42],
            "image_slots": [
                {"id": "img_1", "description": "Growth chart", "position": "introduction",
                 "suggested_type": "chart", "aspect_ratio": "16:9"},
                {"description": "no id"},
                "not a slot"
            ]
        },
        "source_usage_details": [
            {"source_title": "Alpha", "source_url": "https://a.example.com"},
            7
        ]
    }"##;

    #[test]
    fn test_strict_draft_parses_structure() {
        let draft = parse_strict_draft(FULL_DRAFT).unwrap();
        assert!(draft.content.starts_with("# Title"));
        assert_eq!(draft.layout.sections, vec!["Introduction", "Outlook"]);
        assert_eq!(draft.layout.image_slots.len(), 2);
        assert_eq!(draft.layout.image_slots[0].aspect_ratio.as_deref(), Some("16:9"));
        assert_eq!(draft.layout.image_slots[1].id, "img_2");
        assert_eq!(draft.layout.image_slots[1].position, "article");
        assert_eq!(draft.layout.image_slots[1].suggested_type, "photo");
        assert_eq!(draft.source_usage_details.len(), 1);
        assert_eq!(draft.source_usage_details[0].source_title, "Alpha");
    }

    #[test]
    fn test_strict_draft_rejects_malformed_or_empty() {
        assert!(matches!(parse_strict_draft("# Just markdown"), Err(ReplyError::NotJson(_))));
        assert!(matches!(parse_strict_draft(r#"{"content": ""}"#), Err(ReplyError::MissingField("content"))));
        assert!(matches!(parse_strict_draft("[1, 2]"), Err(ReplyError::NotJson(_))));
        assert!(matches!(parse_strict_draft("   "), Err(ReplyError::Empty)));
    }

    #[test]
    fn test_lenient_draft_falls_back_to_markdown() {
        let draft = parse_lenient_draft("# Plain article\n\nText").unwrap();
        assert_eq!(draft.content, "# Plain article\n\nText");
        assert!(draft.layout.is_empty());
        assert!(draft.source_usage_details.is_empty());
    }

    #[test]
    fn test_lenient_draft_reads_fenced_json_after_reasoning() {
        let reply = "<think>planning the piece</think>\n```json\n{\"content\": \"# From JSON\"}\n```";
        let draft = parse_lenient_draft(reply).unwrap();
        assert_eq!(draft.content, "# From JSON");
    }

    #[test]
    fn test_lenient_draft_json_without_content_is_an_error() {
        assert!(matches!(
            parse_lenient_draft(r#"{"layout": {}}"#),
            Err(ReplyError::MissingField("content"))
        ));
    }

    #[test]
    fn test_quality_score_is_not_clamped() {
        let feedback = parse_quality(r#"{"score": 1.7, "feedback": "odd", "suggestions": ["a"]}"#).unwrap();
        assert_eq!(feedback.score, 1.7);
        let feedback = parse_quality(r#"{"score": "0.8"}"#).unwrap();
        assert_eq!(feedback.score, 0.8);
        assert!(feedback.suggestions.is_empty());
        assert!(parse_quality("great article!").is_err());
        assert!(parse_quality(r#"{"score": [1]}"#).is_err());
    }

    #[test]
    fn test_unstructured_analysis_quotes_reply() {
        let analysis = unstructured_analysis(&"word ".repeat(100));
        assert!(analysis.summary.starts_with("Analysis completed. Raw feedback: word"));
        assert!(analysis.summary.len() <= "Analysis completed. Raw feedback: ...".len() + 200);

        let analysis = unstructured_analysis(&"ดี".repeat(150));
        assert!(analysis.summary.contains(&"ดี".repeat(100)));
        assert!(!analysis.summary.contains(&"ดี".repeat(101)));
    }

    #[test]
    fn test_translation_keeps_original_layout_when_missing() {
        let original = parse_strict_draft(FULL_DRAFT).unwrap();
        let translation = parse_translation(r#"{"thai_content": "สวัสดี", "translation_notes": ["n"]}"#, &original).unwrap();
        assert_eq!(translation.content, "สวัสดี");
        assert_eq!(translation.layout, original.layout);
        assert_eq!(translation.notes, vec!["n"]);
        assert!(parse_translation(r#"{"thai_content": ""}"#, &original).is_err());
    }

    #[test]
    fn test_rendered_html_requires_content() {
        assert_eq!(parse_rendered_html(r#"{"html_content": "<html></html>"}"#).unwrap(), "<html></html>");
        assert!(parse_rendered_html(r#"{"html_content": ""}"#).is_err());
    }
}
