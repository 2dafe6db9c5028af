//! The generate, score, retry loop.
//!
//! Each iteration makes exactly one generation call and at most one scoring
//! call. A score at or above the threshold accepts the draft; a lower score
//! feeds a critique into the next attempt until the iteration budget runs
//! out, at which point the *last* attempt is returned, not the best one.
//! Any failed call aborts the loop.

use ag_core::config::LoopSettings;
use ag_core::{
    ArticleModel, Error, GenerationAttempt, GenerationContext, GenerationResult, QualityFeedback,
    QualityScorer, Result,
};
use tracing::{debug, info, warn};

/// What to do after scoring one attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Accepted,
    /// Try again with this feedback threaded into the prompt.
    Retry(String),
    Exhausted,
}

/// `"Quality score: 0.62. {feedback} Suggestions: a; b"`
pub fn format_feedback(quality: &QualityFeedback) -> String {
    format!(
        "Quality score: {:.2}. {} Suggestions: {}",
        quality.score,
        quality.feedback,
        quality.suggestions.join("; ")
    )
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GenerationLoop {
    settings: LoopSettings,
}

impl GenerationLoop {
    /// A budget of zero iterations is raised to one; the loop always makes
    /// at least one attempt.
    pub fn new(mut settings: LoopSettings) -> Self {
        settings.max_iterations = settings.max_iterations.max(1);
        Self { settings }
    }

    pub fn settings(&self) -> &LoopSettings {
        &self.settings
    }

    /// NaN never reaches the threshold, so it is treated like a low score.
    pub fn judge(&self, iteration: u32, quality: &QualityFeedback) -> Verdict {
        if quality.score >= self.settings.quality_threshold {
            Verdict::Accepted
        } else if iteration < self.settings.max_iterations {
            Verdict::Retry(format_feedback(quality))
        } else {
            Verdict::Exhausted
        }
    }

    /// Run the loop against one backend. The backend is fixed for every
    /// iteration.
    pub async fn run(
        &self,
        model: &dyn ArticleModel,
        scorer: &dyn QualityScorer,
        context: &GenerationContext,
    ) -> Result<GenerationResult> {
        match self.settings.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.iterate(model, scorer, context))
                .await
                .map_err(|_| {
                    Error::Generation(format!(
                        "Article generation did not finish within {}s",
                        deadline.as_secs()
                    ))
                })?,
            None => self.iterate(model, scorer, context).await,
        }
    }

    async fn iterate(
        &self,
        model: &dyn ArticleModel,
        scorer: &dyn QualityScorer,
        context: &GenerationContext,
    ) -> Result<GenerationResult> {
        let summary = context.quality_summary();
        let mut feedback: Option<String> = None;
        let mut iteration = 0;

        loop {
            iteration += 1;
            debug!(iteration, model = model.name(), "Generating draft");

            let draft = model.generate(context, feedback.as_deref()).await?;
            if draft.content.is_empty() {
                return Err(Error::Generation("Model returned empty content".to_string()));
            }

            let quality = scorer.score(&draft.content, &summary).await?;
            info!(
                "📊 Iteration {}: quality score {:.2} (threshold {:.2})",
                iteration, quality.score, self.settings.quality_threshold
            );

            let attempt = GenerationAttempt {
                iteration,
                feedback_in: feedback.take(),
                draft,
                quality,
            };

            match self.judge(iteration, &attempt.quality) {
                Verdict::Accepted => {
                    info!("✅ Draft accepted after {} iteration(s)", iteration);
                    return Ok((attempt, true).into());
                }
                Verdict::Exhausted => {
                    warn!(
                        "Quality threshold not reached after {} iterations, returning last draft",
                        iteration
                    );
                    return Ok((attempt, false).into());
                }
                Verdict::Retry(next) => feedback = Some(next),
            }
        }
    }
}
