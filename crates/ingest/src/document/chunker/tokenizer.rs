//! Token counting for chunk budgeting.
//!
//! `TiktokenTokenizer` counts with the target model's BPE and is exact.
//! `WordEstimateTokenizer` is a dependency-free approximation; because the
//! packer's budget guarantee relies on counts never being low, it shrinks the
//! budget by a safety margin.

use std::sync::Arc;

use tiktoken_rs::CoreBPE;

pub trait Tokenizer: Send + Sync {
    fn count_tokens(&self, text: &str) -> usize;

    fn name(&self) -> &str;

    /// Budget the packer should enforce when asked for `max_tokens`.
    fn budget(&self, max_tokens: usize) -> usize {
        max_tokens
    }
}

/// Exact counts with the BPE the model uses.
pub struct TiktokenTokenizer {
    bpe: CoreBPE,
    model: String,
}

impl TiktokenTokenizer {
    /// Load the BPE for `model` (e.g. `gpt-4o` → `o200k_base`).
    pub fn for_model(model: &str) -> Option<Self> {
        tiktoken_rs::get_bpe_from_model(model).ok().map(|bpe| Self {
            bpe,
            model: model.to_string(),
        })
    }
}

impl Tokenizer for TiktokenTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        self.bpe.encode_with_special_tokens(text).len()
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Approximation: 4 tokens per 3 whitespace-separated words, rounded up.
pub struct WordEstimateTokenizer {
    safety_margin: f64,
}

impl WordEstimateTokenizer {
    pub const DEFAULT_SAFETY_MARGIN: f64 = 0.8;

    pub fn new() -> Self {
        Self::with_margin(Self::DEFAULT_SAFETY_MARGIN)
    }

    /// `margin` is clamped to `(0, 1]`.
    pub fn with_margin(margin: f64) -> Self {
        let safety_margin = if margin > 0.0 && margin <= 1.0 { margin } else { 1.0 };
        Self { safety_margin }
    }
}

impl Default for WordEstimateTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for WordEstimateTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        let words = text.split_whitespace().count();
        (words * 4).div_ceil(3)
    }

    fn name(&self) -> &str {
        "word-estimate"
    }

    fn budget(&self, max_tokens: usize) -> usize {
        ((max_tokens as f64) * self.safety_margin).floor().max(1.0) as usize
    }
}

/// Tokenizer for `model`: tiktoken when the model is known, otherwise the
/// word estimate with its safety margin.
pub fn tokenizer_for_model(model: &str) -> Arc<dyn Tokenizer> {
    match TiktokenTokenizer::for_model(model) {
        Some(tokenizer) => Arc::new(tokenizer),
        None => {
            tracing::warn!(
                "No BPE known for model '{}', using approximate word-based token counts",
                model
            );
            Arc::new(WordEstimateTokenizer::new())
        }
    }
}

/// Count the tokens `text` consumes for `model_id`.
pub fn count_tokens(text: &str, model_id: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    tokenizer_for_model(model_id).count_tokens(text)
}
