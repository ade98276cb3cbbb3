//! Offline provider returning a fixed report, for demos and local runs
//! without API credentials.

use async_trait::async_trait;
use serde_json::json;

use crate::provider::{LlmError, LlmProvider, Message};

pub struct MockProvider;

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(
        &self,
        _messages: Vec<Message>,
        _temperature: f32,
        _max_tokens: u32,
    ) -> Result<String, LlmError> {
        let report = json!({
            "intuitive_risks": [{
                "risk": "Schedule delay caused by adverse weather",
                "justification": "Earthworks and track laying are weather-sensitive.",
                "countermeasure": "Plan weather buffers and a contingency sequence.",
                "page": 1,
                "evidence": "Weather conditions at the construction site"
            }],
            "counterintuitive_risks": [{
                "risk": "Budget overrun driven by premature cost savings",
                "justification": "Cutting early design effort shifts cost into change orders.",
                "countermeasure": "Independent review of savings measures.",
                "page": 2,
                "evidence": "Financial reports"
            }]
        });
        Ok(report.to_string())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
