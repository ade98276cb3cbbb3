use std::env;

use serde::{Deserialize, Serialize};

use crate::error::RadarError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Key lookup used while building a config. `from_env` passes the process
/// environment; tests pass a map.
type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled key: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_opt(get: Lookup, profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = get(&prefixed).filter(|s| !s.is_empty()) {
            return Some(v);
        }
    }
    get(key).filter(|s| !s.is_empty())
}

fn profiled_or(get: Lookup, profile: &str, key: &str, default: &str) -> String {
    profiled_opt(get, profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_parse<T: std::str::FromStr>(get: Lookup, profile: &str, key: &str, default: T) -> T {
    profiled_opt(get, profile, key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

/// Process-wide configuration. Built once at startup and handed to the
/// components that need it; nothing reads the environment after that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub analysis: AnalysisConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `RADAR_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        Self::from_lookup(&env_opt)
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup(get: Lookup) -> Self {
        let profile = get("RADAR_PROFILE").unwrap_or_default().to_uppercase();
        let p = profile.as_str();
        Self {
            profile: profile.clone(),
            server: ServerConfig::from_lookup(get, p),
            llm: LlmConfig::from_lookup(get, p),
            analysis: AnalysisConfig::from_lookup(get, p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Reject configurations the server cannot run with.
    pub fn validate(&self) -> Result<(), RadarError> {
        if !self.llm.is_configured() {
            return Err(RadarError::Config(format!(
                "LLM provider '{}' is not configured (missing credentials or unknown provider)",
                self.llm.provider
            )));
        }
        if self.analysis.chunk_max_tokens == 0 {
            return Err(RadarError::Config("CHUNK_MAX_TOKENS must be positive".into()));
        }
        if self.analysis.chunk_concurrency == 0 {
            return Err(RadarError::Config("CHUNK_CONCURRENCY must be at least 1".into()));
        }
        Ok(())
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:    {}:{}, cors={}", self.server.host, self.server.port, self.server.cors_origin);
        tracing::info!("  llm:       provider={}, model={}", self.llm.provider, self.llm.model_name());
        tracing::info!(
            "  analysis:  chunk_max_tokens={}, tokenizer={}, concurrency={}",
            self.analysis.chunk_max_tokens,
            self.analysis.tokenizer_model,
            self.analysis.chunk_concurrency
        );
    }

    /// Return a redacted view safe for API responses (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "server": { "host": self.server.host, "port": self.server.port },
            "llm": {
                "provider": self.llm.provider,
                "model": self.llm.model_name(),
                "configured": self.llm.is_configured(),
            },
            "analysis": self.analysis,
        })
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
    pub max_upload_mb: usize,
}

impl ServerConfig {
    fn from_lookup(get: Lookup, p: &str) -> Self {
        Self {
            host: profiled_or(get, p, "HOST", "0.0.0.0"),
            port: profiled_parse(get, p, "PORT", 8000),
            cors_origin: profiled_or(get, p, "CORS_ORIGIN", "*"),
            max_upload_mb: profiled_parse(get, p, "MAX_UPLOAD_MB", 25),
        }
    }
}

// ── LLM ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "openai", "ollama", "mock"
    pub provider: String,
    #[serde(skip_serializing)]
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmConfig {
    fn from_lookup(get: Lookup, p: &str) -> Self {
        Self {
            provider: profiled_or(get, p, "LLM_PROVIDER", "openai").to_lowercase(),
            openai_api_key: profiled_opt(get, p, "OPENAI_API_KEY"),
            openai_model: profiled_or(get, p, "OPENAI_MODEL", "gpt-4o-mini"),
            openai_base_url: profiled_or(get, p, "OPENAI_BASE_URL", "https://api.openai.com"),
            ollama_url: profiled_or(get, p, "OLLAMA_URL", "http://localhost:11434"),
            ollama_model: profiled_or(get, p, "OLLAMA_MODEL", "llama3.2"),
            temperature: profiled_parse(get, p, "LLM_TEMPERATURE", 0.3),
            max_tokens: profiled_parse(get, p, "LLM_MAX_TOKENS", 6000),
        }
    }

    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "openai" => self.openai_api_key.is_some(),
            "ollama" | "mock" => true,
            _ => false,
        }
    }

    /// Model name of the active provider.
    pub fn model_name(&self) -> &str {
        match self.provider.as_str() {
            "ollama" => &self.ollama_model,
            "mock" => "mock",
            _ => &self.openai_model,
        }
    }
}

// ── Analysis pipeline ─────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Token budget per chunk in longdoc mode.
    pub chunk_max_tokens: usize,
    /// Model whose tokenizer is used for chunk budgeting.
    pub tokenizer_model: String,
    /// Extracted text shorter than this (in characters) is rejected.
    pub min_text_chars: usize,
    /// Character cap on the document text embedded in one prompt.
    pub prompt_max_chars: usize,
    pub pdf_max_pages: usize,
    /// Extraction calls in flight per request; 1 means strictly sequential.
    pub chunk_concurrency: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            chunk_max_tokens: 3000,
            tokenizer_model: "gpt-4o".to_string(),
            min_text_chars: 100,
            prompt_max_chars: 16_000,
            pdf_max_pages: 100,
            chunk_concurrency: 1,
        }
    }
}

impl AnalysisConfig {
    fn from_lookup(get: Lookup, p: &str) -> Self {
        let d = Self::default();
        Self {
            chunk_max_tokens: profiled_parse(get, p, "CHUNK_MAX_TOKENS", d.chunk_max_tokens),
            tokenizer_model: profiled_or(get, p, "TOKENIZER_MODEL", &d.tokenizer_model),
            min_text_chars: profiled_parse(get, p, "MIN_TEXT_CHARS", d.min_text_chars),
            prompt_max_chars: profiled_parse(get, p, "PROMPT_MAX_CHARS", d.prompt_max_chars),
            pdf_max_pages: profiled_parse(get, p, "PDF_MAX_PAGES", d.pdf_max_pages),
            chunk_concurrency: profiled_parse(get, p, "CHUNK_CONCURRENCY", d.chunk_concurrency),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(&move |key: &str| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = config_from(&[]);
        assert_eq!(config.profile_label(), "default");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.openai_model, "gpt-4o-mini");
        assert_eq!(config.analysis.chunk_max_tokens, 3000);
        assert_eq!(config.analysis.min_text_chars, 100);
        assert_eq!(config.analysis.chunk_concurrency, 1);
    }

    #[test]
    fn profile_prefix_wins_over_plain_key() {
        let config = config_from(&[
            ("RADAR_PROFILE", "prod"),
            ("PORT", "9000"),
            ("PROD_PORT", "9100"),
            ("OPENAI_MODEL", "gpt-4o"),
        ]);
        assert_eq!(config.profile_label(), "PROD");
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.llm.openai_model, "gpt-4o");
    }

    #[test]
    fn unparseable_numbers_fall_back_to_default() {
        let config = config_from(&[("CHUNK_MAX_TOKENS", "lots"), ("LLM_TEMPERATURE", "warm")]);
        assert_eq!(config.analysis.chunk_max_tokens, 3000);
        assert!((config.llm.temperature - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn openai_requires_key() {
        let config = config_from(&[]);
        assert!(config.validate().is_err());

        let config = config_from(&[("OPENAI_API_KEY", "sk-test")]);
        assert!(config.validate().is_ok());

        let config = config_from(&[("LLM_PROVIDER", "mock")]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let config = config_from(&[("LLM_PROVIDER", "mock"), ("CHUNK_CONCURRENCY", "0")]);
        assert!(matches!(config.validate(), Err(RadarError::Config(_))));
    }

    #[test]
    fn redacted_summary_hides_api_key() {
        let config = config_from(&[("OPENAI_API_KEY", "sk-secret")]);
        let summary = config.redacted_summary().to_string();
        assert!(!summary.contains("sk-secret"));
        assert!(summary.contains("\"configured\":true"));
    }
}
