//! Prompt text for every model call the service makes.

use ag_core::utils::truncate_chars;
use ag_core::{Draft, GenerationContext, QualityStamp, QualitySummary};
use chrono::{DateTime, Utc};

pub const BRAND: &str = "Jenosize";

const SINGLE_SOURCE_CHARS: usize = 2000;
const MULTI_SOURCE_CHARS: usize = 1500;
const ANALYSIS_CONTENT_CHARS: usize = 3000;

/// How strongly a backend is told to answer in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyFormat {
    JsonOnly,
    JsonOrMarkdown,
}

const DRAFT_SCHEMA: &str = r#"{
  "content": "Full article in Markdown with headings and image placeholders",
  "layout": {
    "sections": ["section titles in article order"],
    "image_slots": [
      {
        "id": "unique_id",
        "description": "What the image shows",
        "position": "section_name_or_introduction",
        "suggested_type": "chart/photo/infographic/illustration",
        "placement_rationale": "Why the image belongs here",
        "content_guidance": "Visual elements, data or concepts to include",
        "dimensions": "e.g. 800x400px",
        "aspect_ratio": "e.g. 16:9",
        "alternatives": "Fallback image ideas"
      }
    ]
  },
  "source_usage_details": [
    {
      "source_title": "Title of the source",
      "source_url": "URL of the source",
      "content_used": "Data, quotes or ideas taken from it",
      "usage_location": "Section and paragraph where it appears",
      "usage_purpose": "What it supports in the argument",
      "transformation": "How it was adapted",
      "instruction_compliance": "How the caller's URL instructions were followed",
      "extraction_type_used": "statistics/case_study/methodology/quotes/..."
    }
  ]
}"#;

pub fn generation_system_prompt(format: ReplyFormat) -> String {
    let mut prompt = format!(
        "You write thought-leadership articles for {brand}, a digital transformation \
consultancy, for executives and business leaders.

VOICE:
- Professional yet approachable, forward-looking, data-driven
- Actionable advice with concrete examples and implementation steps
- Balanced between opportunity and risk

STRUCTURE:
- 2000-3500 words: executive summary, introduction, 4-6 analysis sections, \
strategic recommendations, future outlook, conclusion
- Markdown headings (# ## ###), tables for comparisons, blockquotes for key insights
- 3-5 image placeholders written as ![image_id](placeholder), each matching an image slot id

SOURCES:
- Cite reference material, integrate it in {brand}'s voice, never copy it verbatim
- Follow per-URL instructions: content focus, usage, target section, extraction type
- Record every use of a source in source_usage_details

",
        brand = BRAND
    );

    match format {
        ReplyFormat::JsonOnly => {
            prompt.push_str("RESPONSE FORMAT:\nReturn a single JSON object:\n");
            prompt.push_str(DRAFT_SCHEMA);
            prompt.push_str("\n\nRespond with valid JSON only.");
        }
        ReplyFormat::JsonOrMarkdown => {
            prompt.push_str(
                "RESPONSE FORMAT:\nPrefer a JSON object with this shape, or reply with the \
Markdown article alone:\n",
            );
            prompt.push_str(DRAFT_SCHEMA);
        }
    }
    prompt
}

/// User prompt for one generation attempt. `feedback` goes first so the
/// model sees what to fix before the brief.
pub fn generation_user_prompt(
    context: &GenerationContext,
    feedback: Option<&str>,
    format: ReplyFormat,
    today: Option<DateTime<Utc>>,
) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(feedback) = feedback {
        parts.push(format!("PREVIOUS FEEDBACK TO IMPROVE: {}\n", feedback));
    }

    if let Some(today) = today {
        parts.push(format!("CURRENT DATE: {}", today.format("%B %d, %Y")));
        parts.push("Make sure the article reflects information current as of this date.\n".to_string());
    }

    parts.push("Generate a comprehensive article with the following specifications:\n".to_string());

    if let Some(topic) = &context.topic_category {
        parts.push(format!("Topic Category: {}", topic));
    }
    if let Some(industry) = &context.industry {
        parts.push(format!("Industry Focus: {}", industry));
    }
    if let Some(audience) = &context.target_audience {
        parts.push(format!("Target Audience: {}", audience));
    }
    if let Some(keywords) = context.joined_keywords() {
        parts.push(format!("SEO Keywords to incorporate: {}", keywords));
    }
    if let Some(custom) = &context.custom_prompt {
        parts.push(format!("\nCUSTOM USER INSTRUCTIONS: {}", custom));
    }

    if let Some(scraped) = &context.scraped_content {
        parts.push(format!(
            "\nReference Content from provided source:\n{}...",
            truncate_chars(scraped, SINGLE_SOURCE_CHARS)
        ));
    }

    if !context.scraped_sources.is_empty() {
        parts.push("\nMultiple Reference Sources:".to_string());
        for (i, source) in context.scraped_sources.iter().enumerate() {
            parts.push(format!("\nSource {} - {}", i + 1, source.title));
            parts.push(format!("URL: {}", source.url));
            parts.push(format!(
                "Content: {}...",
                truncate_chars(&source.content, MULTI_SOURCE_CHARS)
            ));
        }
        parts.push(
            "\nUse the source titles exactly as given above and map which article sections \
reference which sources."
                .to_string(),
        );
    }

    if !context.url_instructions.is_empty() {
        parts.push("\n=== SPECIFIC URL CONTENT INSTRUCTIONS ===".to_string());
        for (i, instruction) in context.url_instructions.iter().enumerate() {
            parts.push(format!("\nURL {} Instructions:", i + 1));
            parts.push(format!("- URL: {}", instruction.url));
            if let Some(focus) = &instruction.content_focus {
                parts.push(format!("- Content Focus: {}", focus));
            }
            if let Some(usage) = &instruction.usage_instruction {
                parts.push(format!("- Usage Instructions: {}", usage));
            }
            if let Some(section) = &instruction.section_target {
                parts.push(format!("- Target Section: {}", section));
            }
            if let Some(extraction) = &instruction.extraction_type {
                parts.push(format!("- Extraction Type: {}", extraction));
            }
        }
        parts.push(
            "\nFollow these URL instructions precisely and document compliance in \
source_usage_details."
                .to_string(),
        );
    }

    if let Some(pdf) = &context.pdf_content {
        parts.push(format!(
            "\nReference Content from uploaded document:\n{}...",
            truncate_chars(pdf, SINGLE_SOURCE_CHARS)
        ));
    }

    if !context.has_direction() {
        parts.push("Generate an article about emerging business trends and future opportunities.".to_string());
    }

    parts.push(match format {
        ReplyFormat::JsonOnly => "\nReturn your response as a JSON object with the specified format.".to_string(),
        ReplyFormat::JsonOrMarkdown => {
            "\nProvide your response as either structured JSON or pure Markdown content.".to_string()
        }
    });

    parts.join("\n")
}

pub fn quality_system_prompt() -> String {
    format!(
        "You evaluate {brand} business articles and give actionable feedback.

CRITERIA (equal weight, each scored 0-1):
1. Brand alignment: professional yet approachable, forward-thinking, business focused
2. Content quality: depth of insight, practical actionability, logical flow
3. Engagement: compelling introduction, clear value, examples, strong call to action
4. Technical excellence: structure, SEO use of the keywords, 1500-2500 words, clean grammar

SCALE:
- 0.90-1.00 exceptional, publish ready
- 0.85-0.89 high quality, minor fixes
- 0.75-0.84 good, moderate revision
- below 0.75 significant revision

Respond with JSON only:
{{\"score\": 0.0-1.0, \"feedback\": \"strengths and weaknesses\", \"suggestions\": [\"specific improvements\"]}}",
        brand = BRAND
    )
}

pub fn quality_user_prompt(content: &str, summary: &QualitySummary) -> String {
    let mut parts = vec![
        format!("Evaluate the following article for {}:\n", BRAND),
        format!("ARTICLE CONTENT:\n{}\n", content),
        "CONTEXT:".to_string(),
    ];
    if let Some(topic) = &summary.topic_category {
        parts.push(format!("- Topic: {}", topic));
    }
    if let Some(industry) = &summary.industry {
        parts.push(format!("- Industry: {}", industry));
    }
    if let Some(audience) = &summary.target_audience {
        parts.push(format!("- Audience: {}", audience));
    }
    if let Some(keywords) = &summary.seo_keywords {
        parts.push(format!("- SEO Keywords: {}", keywords));
    }
    parts.push("\nReturn the overall score, detailed feedback and specific suggestions as a JSON object.".to_string());
    parts.join("\n")
}

pub fn analysis_system_prompt() -> String {
    format!(
        "You are a content analyst for {brand}. Review a generated article for business \
relevance, structure, use of sources and actionability.

Return a JSON object:
{{\"strengths\": [\"...\"], \"weaknesses\": [\"...\"], \"recommendations\": [\"...\"], \
\"summary\": \"2-3 sentence overall assessment\"}}",
        brand = BRAND
    )
}

pub fn analysis_user_prompt(content: &str, context: &GenerationContext) -> String {
    let mut parts = vec![
        "Analyze the following article and provide detailed feedback:".to_string(),
        format!(
            "\nTarget Audience: {}",
            context.target_audience.as_deref().unwrap_or("General business leaders")
        ),
        format!("Industry: {}", context.industry.as_deref().unwrap_or("General business")),
        format!(
            "Topic Category: {}",
            context.topic_category.as_deref().unwrap_or("Business trends")
        ),
    ];
    if let Some(keywords) = context.joined_keywords() {
        parts.push(format!("SEO Keywords: {}", keywords));
    }
    parts.push(format!(
        "\nARTICLE CONTENT:\n{}...",
        truncate_chars(content, ANALYSIS_CONTENT_CHARS)
    ));
    parts.push("\nProvide the analysis as JSON with strengths, weaknesses, recommendations and summary.".to_string());
    parts.join("\n")
}

pub fn translation_system_prompt() -> String {
    "You translate English business articles into natural, formal Thai for executives.

RULES:
- Keep every Markdown element: headings, lists, tables, emphasis, blockquotes, code blocks
- Keep image placeholders ![image_id](placeholder) and URLs unchanged
- Keep widely used English terms (AI, CEO, ROI) where Thai readers expect them
- Translate section titles and the descriptive fields of image slots and source usage;
  keep ids, positions, URLs, dimensions and aspect ratios unchanged

Return a JSON object:
{\"thai_content\": \"...\", \"layout\": {\"sections\": [], \"image_slots\": []}, \
\"source_usage_details\": [], \"translation_notes\": []}"
        .to_string()
}

pub fn translation_user_prompt(draft: &Draft) -> Result<String, serde_json::Error> {
    let mut parts = vec![
        "Translate the following English business article to professional Thai:".to_string(),
        String::new(),
        "ENGLISH CONTENT TO TRANSLATE:".to_string(),
        draft.content.clone(),
    ];
    if !draft.layout.is_empty() {
        parts.push(String::new());
        parts.push("LAYOUT DATA TO PRESERVE AND TRANSLATE:".to_string());
        parts.push(serde_json::to_string_pretty(&draft.layout)?);
    }
    if !draft.source_usage_details.is_empty() {
        parts.push(String::new());
        parts.push("SOURCE USAGE DETAILS TO TRANSLATE:".to_string());
        parts.push(serde_json::to_string_pretty(&draft.source_usage_details)?);
    }
    parts.push(String::new());
    parts.push("Return the complete translation in the specified JSON format.".to_string());
    Ok(parts.join("\n"))
}

pub fn render_system_prompt() -> String {
    "You convert Markdown business articles into a complete, print-ready HTML document.

- Emit a full document with DOCTYPE and inline CSS suitable for PDF printing
- Render every Markdown element, tables and blockquotes included
- Turn image placeholders into captioned, dashed-border boxes describing the image
- Use a clean report typography with clear heading hierarchy

Return a JSON object: {\"html_content\": \"<!DOCTYPE html>...\"}"
        .to_string()
}

pub fn render_user_prompt(markdown: &str, stamp: Option<QualityStamp>) -> String {
    let mut parts = Vec::new();
    if let Some(stamp) = stamp {
        let plural = if stamp.iterations == 1 { "" } else { "s" };
        parts.push(format!(
            "QUALITY INFORMATION:\n- Article Quality Score: {:.1}%\n- Generated in {} iteration{}\n\
Show this in a discreet header section.\n",
            stamp.quality_score * 100.0,
            stamp.iterations,
            plural
        ));
    }
    parts.push(format!("MARKDOWN CONTENT TO CONVERT:\n{}", markdown));
    parts.push("\nReturn the HTML document in the html_content field of a JSON object.".to_string());
    parts.join("\n")
}

pub const OCR_PROMPT: &str = "Extract and return all the text content from this PDF document. \
Return only the extracted text without commentary or formatting.";
