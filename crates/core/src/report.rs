//! Risk report data model shared by the extractor, the aggregator and the
//! HTTP layer.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Page reference the model attaches to a risk. Models answer with a number
/// (`3`), a range or section label (`"3-4"`), or nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageRef {
    Number(serde_json::Number),
    Text(String),
}

/// Models write `null` where they have nothing to say; treat it like an
/// absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One risk found in a piece of document text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub risk: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub justification: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub countermeasure: String,
    #[serde(default)]
    pub page: Option<PageRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub evidence: String,
}

/// Result of one extraction call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    #[serde(default, deserialize_with = "null_as_default")]
    pub intuitive_risks: Vec<RiskItem>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub counterintuitive_risks: Vec<RiskItem>,
}

impl RiskReport {
    pub fn risk_count(&self) -> usize {
        self.intuitive_risks.len() + self.counterintuitive_risks.len()
    }
}

/// A per-chunk report with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkReport {
    /// 1-based position of the chunk in the document.
    pub chunk_id: usize,
    /// Length of the chunk's source text in characters.
    pub chunk_chars: usize,
    #[serde(flatten)]
    pub report: RiskReport,
}

/// Whole-document result: one report, or one per chunk in document order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AggregatedReport {
    Single(RiskReport),
    Chunked { chunks: Vec<ChunkReport> },
}

impl AggregatedReport {
    pub fn mode(&self) -> AnalysisMode {
        match self {
            AggregatedReport::Single(_) => AnalysisMode::Single,
            AggregatedReport::Chunked { .. } => AnalysisMode::Chunked,
        }
    }

    pub fn risk_count(&self) -> usize {
        match self {
            AggregatedReport::Single(report) => report.risk_count(),
            AggregatedReport::Chunked { chunks } => {
                chunks.iter().map(|c| c.report.risk_count()).sum()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    Single,
    Chunked,
}

/// Diagnostic metadata attached to every successful response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugInfo {
    pub filename: String,
    /// Characters in the joined document text.
    pub chars: usize,
    pub mode: AnalysisMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_count: Option<usize>,
    pub lang: Language,
}

/// Response envelope for `/analyze`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResponse {
    #[serde(flatten)]
    pub report: AggregatedReport,
    #[serde(rename = "_debug")]
    pub debug: DebugInfo,
}

/// Output language for the risk report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Es,
    En,
    De,
}

impl Language {
    /// Parse a language code. Unknown codes fall back to Spanish.
    pub fn parse_or_default(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "es" => Language::Es,
            "en" => Language::En,
            "de" => Language::De,
            other => {
                tracing::warn!("Language '{}' not recognized, defaulting to 'es'", other);
                Language::default()
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::Es => "es",
            Language::En => "en",
            Language::De => "de",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
