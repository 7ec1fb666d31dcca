//! Estimated token usage for a model call.

use serde::{Deserialize, Serialize};

/// Token usage statistics for a single model call.
///
/// The backend does not report exact counts, so both sides are estimated
/// from character length with [`estimate_tokens`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, derive_getters::Getters,
)]
pub struct Usage {
    /// Tokens in the prompt.
    prompt_tokens: u64,
    /// Tokens in the response.
    completion_tokens: u64,
    /// Prompt plus completion.
    total_tokens: u64,
}

impl Usage {
    /// Create a usage record from prompt and completion token counts.
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }

    /// Estimate usage from the prompt and response texts.
    pub fn estimate(prompt: &str, completion: &str) -> Self {
        Self::new(estimate_tokens(prompt), estimate_tokens(completion))
    }
}

/// Estimate token count from text (rough approximation: chars / 4, rounded up).
pub fn estimate_tokens(text: &str) -> u64 {
    (text.chars().count() as u64).div_ceil(4)
}
