//! AI-written energy saving recommendations.

pub mod gemini;
pub mod prompt;

pub use gemini::*;
pub use prompt::*;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("AI service is not configured (missing API key)")]
    NotConfigured,

    #[error("AI request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("AI service returned HTTP {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("AI service returned no suggestion{}", blocked_suffix(.block_reason))]
    EmptyResponse { block_reason: Option<String> },
}

fn blocked_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(" (blocked: {r})"))
        .unwrap_or_default()
}

/// Text generation backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Recommender: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, RecommendError>;

    /// Whether calls can succeed at all (e.g. an API key is present).
    fn is_configured(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionSource {
    Ai,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub text: String,
    pub source: SuggestionSource,
}

impl Suggestion {
    pub fn from_ai(text: String) -> Self {
        Self {
            text,
            source: SuggestionSource::Ai,
        }
    }

    pub fn fallback(error: &RecommendError) -> Self {
        Self {
            text: fallback_suggestion(error),
            source: SuggestionSource::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == SuggestionSource::Fallback
    }
}
