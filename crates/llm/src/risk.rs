use std::sync::Arc;

use async_trait::async_trait;
use radar_core::config::LlmConfig;
use radar_core::{Language, RiskReport};
use tracing::{debug, info, warn};

use crate::prompt::{build_user_prompt, SYSTEM_PROMPT};
use crate::provider::{LlmError, LlmProvider, Message};

#[derive(Debug, thiserror::Error)]
pub enum RiskError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    #[error("model response is not a valid risk report: {reason}")]
    InvalidJson {
        reason: String,
        raw_response: String,
    },
}

/// Maps a piece of document text to a structured risk report.
///
/// Implementations make exactly one attempt per call; retries are the
/// caller's concern.
#[async_trait]
pub trait RiskExtraction: Send + Sync {
    async fn extract_risks(
        &self,
        text: &str,
        context: &str,
        lang: Language,
    ) -> Result<RiskReport, RiskError>;
}

/// Risk extraction backed by an LLM provider.
pub struct RiskExtractor {
    provider: Arc<dyn LlmProvider>,
    temperature: f32,
    max_tokens: u32,
    /// Characters of document text embedded in one prompt.
    max_input_chars: usize,
}

impl RiskExtractor {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        temperature: f32,
        max_tokens: u32,
        max_input_chars: usize,
    ) -> Self {
        Self {
            provider,
            temperature,
            max_tokens,
            max_input_chars,
        }
    }

    /// Build from config, creating the appropriate provider.
    pub fn from_config(llm_config: &LlmConfig, max_input_chars: usize) -> Result<Self, LlmError> {
        let provider = crate::providers::create_provider(llm_config)?;
        Ok(Self::new(
            provider,
            llm_config.temperature,
            llm_config.max_tokens,
            max_input_chars,
        ))
    }
}

#[async_trait]
impl RiskExtraction for RiskExtractor {
    async fn extract_risks(
        &self,
        text: &str,
        context: &str,
        lang: Language,
    ) -> Result<RiskReport, RiskError> {
        let input_chars = text.chars().count();
        if input_chars > self.max_input_chars {
            warn!(
                "Input of {} chars truncated to {} for the prompt",
                input_chars, self.max_input_chars
            );
        }

        let messages = vec![
            Message::system(SYSTEM_PROMPT),
            Message::user(build_user_prompt(text, context, lang, self.max_input_chars)),
        ];

        info!(
            "Extracting risks via {} ({} chars, lang={})",
            self.provider.name(),
            input_chars.min(self.max_input_chars),
            lang
        );

        let response = self
            .provider
            .complete(messages, self.temperature, self.max_tokens)
            .await?;

        debug!("LLM response: {}", response);

        let report = parse_report(&response)?;
        info!("Model returned {} risks", report.risk_count());
        Ok(report)
    }
}

/// Parse a model reply into a report, tolerating Markdown fences and prose
/// around the JSON object.
pub fn parse_report(response: &str) -> Result<RiskReport, RiskError> {
    let json_str = extract_json(response);
    serde_json::from_str(json_str).map_err(|e| {
        warn!("Unparseable model response: {}", response);
        RiskError::InvalidJson {
            reason: e.to_string(),
            raw_response: response.to_string(),
        }
    })
}

/// Extract JSON from an LLM response, handling markdown code blocks.
fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();

    // Handle ```json ... ``` blocks
    if let Some(start) = trimmed.find("```json") {
        let json_start = start + 7;
        if let Some(end) = trimmed[json_start..].find("```") {
            return trimmed[json_start..json_start + end].trim();
        }
    }

    // Handle ``` ... ``` blocks
    if let Some(start) = trimmed.find("```") {
        let json_start = start + 3;
        // Skip past any language identifier on the same line
        let after_tick = &trimmed[json_start..];
        let content_start = after_tick.find('\n').map_or(0, |n| n + 1);
        if let Some(end) = after_tick[content_start..].find("```") {
            return after_tick[content_start..content_start + end].trim();
        }
    }

    // Raw JSON object, possibly with prose around it
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return &trimmed[start..=end];
        }
    }

    trimmed
}
