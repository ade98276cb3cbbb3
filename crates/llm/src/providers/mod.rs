pub mod mock;
pub mod ollama;
pub mod openai;

use std::sync::Arc;

use radar_core::config::LlmConfig;

use crate::provider::{LlmError, LlmProvider};

/// Create the appropriate LLM provider based on config.
pub fn create_provider(llm_config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    match llm_config.provider.as_str() {
        "openai" => {
            let api_key = llm_config
                .openai_api_key
                .as_ref()
                .ok_or_else(|| LlmError::NotConfigured("OPENAI_API_KEY not set".into()))?;
            Ok(Arc::new(openai::OpenAiProvider::new(
                api_key.clone(),
                llm_config.openai_model.clone(),
                llm_config.openai_base_url.trim_end_matches('/').to_string(),
            )))
        }
        "ollama" => Ok(Arc::new(ollama::OllamaProvider::new(
            llm_config.ollama_url.trim_end_matches('/').to_string(),
            llm_config.ollama_model.clone(),
        ))),
        "mock" => Ok(Arc::new(mock::MockProvider)),
        other => Err(LlmError::NotConfigured(format!(
            "unknown LLM provider: '{}'",
            other
        ))),
    }
}
