use std::sync::Arc;

use radar_core::config::{AnalysisConfig, Config};
use radar_core::{AggregatedReport, AnalysisResponse, DebugInfo, Language};
use radar_ingest::document::chunker::{tokenizer_for_model, ChunkPacker, Tokenizer};
use radar_ingest::{extract_document, DocumentFormat};
use radar_llm::{LlmError, RiskExtraction, RiskExtractor};
use tracing::info;

use super::aggregator::aggregate;
use super::error::AnalyzeError;

/// One uploaded document and its analysis options.
#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub context: String,
    pub lang: Language,
    /// Chunk the document and analyze each chunk separately.
    pub longdoc: bool,
}

/// Entry point of the analysis pipeline. Holds no per-request state, so a
/// single instance serves all requests.
pub struct Orchestrator {
    extractor: Arc<dyn RiskExtraction>,
    packer: Arc<ChunkPacker>,
    settings: AnalysisConfig,
}

impl Orchestrator {
    pub fn new(
        extractor: Arc<dyn RiskExtraction>,
        tokenizer: Arc<dyn Tokenizer>,
        settings: AnalysisConfig,
    ) -> Self {
        let packer = Arc::new(ChunkPacker::new(tokenizer, settings.chunk_max_tokens));
        Self {
            extractor,
            packer,
            settings,
        }
    }

    /// Wire the LLM-backed extractor and the model tokenizer from config.
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        let extractor = RiskExtractor::from_config(&config.llm, config.analysis.prompt_max_chars)?;
        let tokenizer = tokenizer_for_model(&config.analysis.tokenizer_model);
        info!(
            "Chunk budget: {} tokens ({} counting)",
            config.analysis.chunk_max_tokens,
            tokenizer.name()
        );
        Ok(Self::new(Arc::new(extractor), tokenizer, config.analysis.clone()))
    }

    pub async fn analyze(&self, request: AnalyzeRequest) -> Result<AnalysisResponse, AnalyzeError> {
        let AnalyzeRequest {
            bytes,
            filename,
            context,
            lang,
            longdoc,
        } = request;
        let filename = filename.to_lowercase();

        // Reject unknown formats before touching the bytes.
        let format = DocumentFormat::from_filename(&filename)?;

        let text = self.extract_text(bytes, filename.clone()).await?;
        let chars = text.chars().count();
        info!("Extracted {} chars from '{}' ({})", chars, filename, format.as_str());

        if chars < self.settings.min_text_chars || text.trim().is_empty() {
            return Err(AnalyzeError::EmptyOrTooShort {
                chars,
                min: self.settings.min_text_chars,
            });
        }

        let report = if longdoc {
            let chunks = self.pack(text).await?;
            info!("Long-document mode: {} chunks", chunks.len());
            aggregate(
                Arc::clone(&self.extractor),
                chunks,
                &context,
                lang,
                self.settings.chunk_concurrency,
            )
            .await?
        } else {
            let report = self.extractor.extract_risks(&text, &context, lang).await?;
            AggregatedReport::Single(report)
        };

        let chunk_count = match &report {
            AggregatedReport::Single(_) => None,
            AggregatedReport::Chunked { chunks } => Some(chunks.len()),
        };
        info!("Analysis of '{}' found {} risks", filename, report.risk_count());

        Ok(AnalysisResponse {
            debug: DebugInfo {
                filename,
                chars,
                mode: report.mode(),
                chunk_count,
                lang,
            },
            report,
        })
    }

    /// Format readers are CPU-bound, so they run on the blocking pool.
    async fn extract_text(&self, bytes: Vec<u8>, filename: String) -> Result<String, AnalyzeError> {
        let max_pages = self.settings.pdf_max_pages;
        let document = tokio::task::spawn_blocking(move || {
            extract_document(&bytes, &filename, max_pages)
        })
        .await
        .map_err(|e| AnalyzeError::Internal(format!("extraction task failed: {e}")))??;
        Ok(document.joined_text())
    }

    async fn pack(&self, text: String) -> Result<Vec<String>, AnalyzeError> {
        let packer = Arc::clone(&self.packer);
        tokio::task::spawn_blocking(move || packer.pack(&text))
            .await
            .map_err(|e| AnalyzeError::Internal(format!("chunking task failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use radar_core::{AnalysisMode, RiskItem, RiskReport};
    use radar_ingest::document::chunker::WordEstimateTokenizer;
    use radar_llm::{LlmError, RiskError};

    use super::*;

    /// Records every text it is asked about and returns one risk per call.
    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(String, String, Language)>>,
        fail: bool,
    }

    #[async_trait]
    impl RiskExtraction for Recorder {
        async fn extract_risks(
            &self,
            text: &str,
            context: &str,
            lang: Language,
        ) -> Result<RiskReport, RiskError> {
            self.seen
                .lock()
                .unwrap()
                .push((text.to_string(), context.to_string(), lang));
            if self.fail {
                return Err(RiskError::Llm(LlmError::ApiError {
                    status: 500,
                    body: "upstream down".into(),
                }));
            }
            Ok(RiskReport {
                intuitive_risks: vec![RiskItem {
                    risk: format!("risk {}", self.seen.lock().unwrap().len()),
                    ..Default::default()
                }],
                counterintuitive_risks: vec![],
            })
        }
    }

    fn orchestrator(recorder: Arc<Recorder>, chunk_max_tokens: usize) -> Orchestrator {
        let settings = AnalysisConfig {
            chunk_max_tokens,
            ..AnalysisConfig::default()
        };
        Orchestrator::new(recorder, Arc::new(WordEstimateTokenizer::with_margin(1.0)), settings)
    }

    fn request(filename: &str, body: &str, longdoc: bool) -> AnalyzeRequest {
        AnalyzeRequest {
            bytes: body.as_bytes().to_vec(),
            filename: filename.to_string(),
            context: "Stuttgart 21".to_string(),
            lang: Language::En,
            longdoc,
        }
    }

    /// Three paragraphs of 30 words (40 estimated tokens) each.
    fn long_text() -> String {
        (0..3)
            .map(|p| (0..30).map(|w| format!("p{p}w{w}")).collect::<Vec<_>>().join(" "))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    #[tokio::test]
    async fn unsupported_format_is_rejected_without_extraction() {
        let recorder = Arc::new(Recorder::default());
        let err = orchestrator(recorder.clone(), 3000)
            .analyze(request("report.xlsx", &long_text(), false))
            .await
            .unwrap_err();

        assert!(matches!(err, AnalyzeError::UnsupportedFormat(ref ext) if ext == "xlsx"));
        assert!(recorder.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn short_text_is_rejected() {
        let recorder = Arc::new(Recorder::default());
        let err = orchestrator(recorder.clone(), 3000)
            .analyze(request("notes.txt", &"x".repeat(50), false))
            .await
            .unwrap_err();

        match err {
            AnalyzeError::EmptyOrTooShort { chars, min } => {
                assert_eq!(chars, 50);
                assert_eq!(min, 100);
            }
            other => panic!("expected EmptyOrTooShort, got {other:?}"),
        }
        assert!(recorder.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn whitespace_only_text_is_rejected() {
        let recorder = Arc::new(Recorder::default());
        let err = orchestrator(recorder.clone(), 3000)
            .analyze(request("blank.txt", &" \n".repeat(100), false))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "empty_or_too_short");
        assert!(recorder.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn length_gate_is_inclusive_and_counts_raw_text() {
        let recorder = Arc::new(Recorder::default());
        // 99 letters plus a trailing newline is exactly the minimum.
        let body = format!("{}\n", "y".repeat(99));
        let response = orchestrator(recorder.clone(), 3000)
            .analyze(request("edge.txt", &body, false))
            .await
            .unwrap();
        assert_eq!(response.debug.chars, 100);
        assert_eq!(recorder.seen.lock().unwrap().len(), 1);

        let err = orchestrator(recorder, 3000)
            .analyze(request("edge.txt", &"y".repeat(99), false))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "empty_or_too_short");
    }

    #[tokio::test]
    async fn single_mode_calls_extractor_once_with_full_text() {
        let recorder = Arc::new(Recorder::default());
        let text = long_text();
        let response = orchestrator(recorder.clone(), 50)
            .analyze(request("Plan.TXT", &text, false))
            .await
            .unwrap();

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], (text.clone(), "Stuttgart 21".to_string(), Language::En));

        assert!(matches!(response.report, AggregatedReport::Single(_)));
        assert_eq!(response.debug.filename, "plan.txt");
        assert_eq!(response.debug.chars, text.chars().count());
        assert_eq!(response.debug.mode, AnalysisMode::Single);
        assert_eq!(response.debug.chunk_count, None);
    }

    #[tokio::test]
    async fn longdoc_mode_analyzes_each_chunk_in_order() {
        let recorder = Arc::new(Recorder::default());
        let text = long_text();
        // 40 tokens per paragraph, two fit in 80.
        let response = orchestrator(recorder.clone(), 80)
            .analyze(request("plan.txt", &text, true))
            .await
            .unwrap();

        let chunks = match &response.report {
            AggregatedReport::Chunked { chunks } => chunks,
            other => panic!("expected chunked report, got {other:?}"),
        };
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chunk_id, 1);
        assert_eq!(chunks[1].chunk_id, 2);
        assert_eq!(chunks[0].report.intuitive_risks[0].risk, "risk 1");

        let seen = recorder.seen.lock().unwrap();
        let paragraphs: Vec<&str> = text.split("\n\n").collect();
        assert_eq!(seen[0].0, format!("{}\n\n{}", paragraphs[0], paragraphs[1]));
        assert_eq!(seen[1].0, paragraphs[2]);
        assert_eq!(chunks[1].chunk_chars, paragraphs[2].chars().count());

        assert_eq!(response.debug.mode, AnalysisMode::Chunked);
        assert_eq!(response.debug.chunk_count, Some(2));
    }

    #[tokio::test]
    async fn extraction_failure_propagates() {
        let recorder = Arc::new(Recorder { fail: true, ..Default::default() });
        let err = orchestrator(recorder.clone(), 80)
            .analyze(request("plan.txt", &long_text(), true))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "risk_extraction_failed");
        assert!(err.public_message().contains("upstream down"));
        assert_eq!(recorder.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn malformed_pdf_is_an_extraction_error() {
        let err = orchestrator(Arc::new(Recorder::default()), 3000)
            .analyze(request("broken.pdf", "not really a pdf", false))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "extraction_failed");
    }
}
