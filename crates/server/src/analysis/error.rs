use radar_ingest::ExtractionError;
use radar_llm::RiskError;
use thiserror::Error;

/// Every way a single analysis request can fail.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("Unsupported format '{0}' (use .txt, .pdf or .docx)")]
    UnsupportedFormat(String),

    #[error(
        "The file was read as empty or too short ({chars} characters, minimum {min}). \
         Check the parser or try another file."
    )]
    EmptyOrTooShort { chars: usize, min: usize },

    #[error("Text extraction failed: {0}")]
    Extraction(ExtractionError),

    #[error("Risk extraction failed: {0}")]
    RiskExtraction(#[from] RiskError),

    #[error("{0}")]
    BadRequest(String),

    #[error("Upload exceeds the {0} MB limit")]
    PayloadTooLarge(usize),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ExtractionError> for AnalyzeError {
    fn from(e: ExtractionError) -> Self {
        match e {
            ExtractionError::UnsupportedType(ext) => AnalyzeError::UnsupportedFormat(ext),
            other => AnalyzeError::Extraction(other),
        }
    }
}

impl AnalyzeError {
    /// Stable machine-readable code for the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            AnalyzeError::UnsupportedFormat(_) => "unsupported_format",
            AnalyzeError::EmptyOrTooShort { .. } => "empty_or_too_short",
            AnalyzeError::Extraction(_) => "extraction_failed",
            AnalyzeError::RiskExtraction(_) => "risk_extraction_failed",
            AnalyzeError::BadRequest(_) => "invalid_request",
            AnalyzeError::PayloadTooLarge(_) => "payload_too_large",
            AnalyzeError::Internal(_) => "internal_error",
        }
    }

    /// Whether the caller can fix this by sending something else.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AnalyzeError::UnsupportedFormat(_)
                | AnalyzeError::EmptyOrTooShort { .. }
                | AnalyzeError::BadRequest(_)
                | AnalyzeError::PayloadTooLarge(_)
        )
    }

    /// Message safe to return to clients. Internal faults are reported
    /// generically; their detail stays in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AnalyzeError::Internal(_) => "Internal error while analyzing the document".to_string(),
            other => other.to_string(),
        }
    }
}
