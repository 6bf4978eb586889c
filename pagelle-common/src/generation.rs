//! Text generation seam and the commentary prompt
//!
//! The hosted model is an external collaborator reached through
//! [`TextGenerator`]. Its failures stop at [`request_commentary`] and come
//! back as a [`CommentaryOutcome`], never as an error.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::voting::SubjectMeans;
use crate::Result;

/// Prompt used when the configuration does not provide one
pub const DEFAULT_PROMPT_TEMPLATE: &str = "Sei un comico ironico. Scrivi una battuta fulminante \
(max 20 parole) per un amico con questi voti medi: {scores}. Sii molto scherzoso.";

/// One-shot prompt in, text out
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier for logs
    fn model(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Render `Category: mean` pairs in roster order, one decimal place
pub fn format_scores(means: &SubjectMeans) -> String {
    means
        .categories
        .iter()
        .map(|c| format!("{}: {:.1}", c.category, c.mean))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Fill `{scores}` and `{subject}` in the template
pub fn build_prompt(template: &str, means: &SubjectMeans) -> String {
    template
        .replace("{scores}", &format_scores(means))
        .replace("{subject}", &means.subject)
}

/// Result of asking the model for a comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum CommentaryOutcome {
    /// Model reply, verbatim
    Generated { text: String },
    /// Feature off or nothing to comment on
    Unavailable { message: String },
    /// The call failed; gate and chart are unaffected
    Failed { message: String },
}

/// Ask the generator for a joke about the subject's averages
pub async fn request_commentary(
    generator: Option<&dyn TextGenerator>,
    template: &str,
    means: &SubjectMeans,
) -> CommentaryOutcome {
    let Some(generator) = generator else {
        return CommentaryOutcome::Unavailable {
            message: "AI commentary is disabled: no generation key configured".to_string(),
        };
    };

    if !means.has_data() {
        return CommentaryOutcome::Unavailable {
            message: format!("No ratings for {} in the current window", means.subject),
        };
    }

    let prompt = build_prompt(template, means);

    match generator.generate(&prompt).await {
        Ok(text) => {
            info!(subject = %means.subject, model = generator.model(), "Commentary generated");
            CommentaryOutcome::Generated { text }
        }
        Err(e) => {
            warn!(subject = %means.subject, model = generator.model(), "Commentary failed: {}", e);
            CommentaryOutcome::Failed {
                message: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voting::CategoryMean;
    use crate::Error;
    use std::sync::Mutex;

    struct ScriptedGenerator {
        reply: std::result::Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        fn model(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(Error::Generation)
        }
    }

    fn marco_means() -> SubjectMeans {
        SubjectMeans {
            subject: "Marco".to_string(),
            categories: vec![
                CategoryMean {
                    category: "Romantico".to_string(),
                    mean: 7.0,
                    observations: 2,
                },
                CategoryMean {
                    category: "Pazzo".to_string(),
                    mean: 0.0,
                    observations: 0,
                },
            ],
            total_ratings: 2,
        }
    }

    #[test]
    fn test_format_scores_in_category_order() {
        assert_eq!(format_scores(&marco_means()), "Romantico: 7.0, Pazzo: 0.0");
    }

    #[test]
    fn test_default_prompt_is_deterministic() {
        let prompt = build_prompt(DEFAULT_PROMPT_TEMPLATE, &marco_means());
        assert_eq!(prompt, build_prompt(DEFAULT_PROMPT_TEMPLATE, &marco_means()));
        assert!(prompt.contains("voti medi: Romantico: 7.0, Pazzo: 0.0."));
        assert!(!prompt.contains("{scores}"));
    }

    #[test]
    fn test_template_subject_placeholder() {
        let prompt = build_prompt("Roast {subject}: {scores}", &marco_means());
        assert_eq!(prompt, "Roast Marco: Romantico: 7.0, Pazzo: 0.0");
    }

    #[tokio::test]
    async fn test_commentary_returns_reply_verbatim() {
        let generator = ScriptedGenerator {
            reply: Ok("  Marco, romantico a metà!  ".to_string()),
            prompts: Mutex::new(Vec::new()),
        };

        let outcome = request_commentary(
            Some(&generator as &dyn TextGenerator),
            DEFAULT_PROMPT_TEMPLATE,
            &marco_means(),
        )
        .await;
        assert_eq!(
            outcome,
            CommentaryOutcome::Generated {
                text: "  Marco, romantico a metà!  ".to_string()
            }
        );
        assert_eq!(generator.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_commentary_failure_degrades() {
        let generator = ScriptedGenerator {
            reply: Err("quota exceeded".to_string()),
            prompts: Mutex::new(Vec::new()),
        };

        let outcome = request_commentary(
            Some(&generator as &dyn TextGenerator),
            DEFAULT_PROMPT_TEMPLATE,
            &marco_means(),
        )
        .await;
        match outcome {
            CommentaryOutcome::Failed { message } => assert!(message.contains("quota exceeded")),
            other => panic!("expected failure outcome, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_commentary_unavailable_without_generator_or_data() {
        let outcome = request_commentary(None, DEFAULT_PROMPT_TEMPLATE, &marco_means()).await;
        assert!(matches!(outcome, CommentaryOutcome::Unavailable { .. }));

        let generator = ScriptedGenerator {
            reply: Ok("unused".to_string()),
            prompts: Mutex::new(Vec::new()),
        };
        let mut empty = marco_means();
        empty.total_ratings = 0;
        let outcome = request_commentary(
            Some(&generator as &dyn TextGenerator),
            DEFAULT_PROMPT_TEMPLATE,
            &empty,
        )
        .await;
        assert!(matches!(outcome, CommentaryOutcome::Unavailable { .. }));
        assert!(generator.prompts.lock().unwrap().is_empty());
    }
}
