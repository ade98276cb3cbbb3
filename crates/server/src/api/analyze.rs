//! `POST /analyze`: multipart upload in, risk report out.

use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use radar_core::{AnalysisResponse, Language};
use serde::Serialize;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::analysis::{AnalyzeError, AnalyzeRequest};
use crate::state::AppState;

/// Error envelope returned for every failed analysis.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub error_code: &'static str,
    pub message: String,
}

impl IntoResponse for AnalyzeError {
    fn into_response(self) -> Response {
        let status = match &self {
            AnalyzeError::UnsupportedFormat(_) | AnalyzeError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AnalyzeError::EmptyOrTooShort { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AnalyzeError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AnalyzeError::Extraction(_)
            | AnalyzeError::RiskExtraction(_)
            | AnalyzeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if self.is_client_error() {
            warn!(error_code = self.code(), "Analysis rejected: {}", self);
        } else {
            error!(error_code = self.code(), "Analysis failed: {}", self);
        }

        let body = ErrorBody {
            error_code: self.code(),
            message: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Analyze an uploaded document for planning risks
///
/// Accepts multipart/form-data with a `file` field (.txt, .pdf or .docx)
/// and optional `context`, `lang` (es, en, de) and `longdoc` fields. With
/// `longdoc` the document is split into token-bounded chunks and the
/// response carries one report per chunk.
#[utoipa::path(
    post,
    path = "/analyze",
    tag = "Analysis",
    request_body(content_type = "multipart/form-data", description = "Document upload with analysis options"),
    responses(
        (status = 200, description = "Risk report (single or per chunk) with a _debug block"),
        (status = 400, description = "Unsupported format or malformed request", body = ErrorBody),
        (status = 413, description = "Upload exceeds the configured limit", body = ErrorBody),
        (status = 422, description = "Document text empty or too short", body = ErrorBody),
        (status = 500, description = "Extraction or model failure", body = ErrorBody)
    )
)]
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<AnalysisResponse>, AnalyzeError> {
    let span = info_span!("analyze", request_id = %Uuid::new_v4());
    async move {
        let request = read_form(multipart, state.config.server.max_upload_mb).await?;
        info!(
            "Received '{}' ({} bytes, lang={}, longdoc={})",
            request.filename,
            request.bytes.len(),
            request.lang,
            request.longdoc
        );
        let response = state.orchestrator.analyze(request).await?;
        Ok(Json(response))
    }
    .instrument(span)
    .await
}

/// Collect the form fields. Unknown fields are skipped.
async fn read_form(
    mut multipart: Multipart,
    max_upload_mb: usize,
) -> Result<AnalyzeRequest, AnalyzeError> {
    let form_error = |e: MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AnalyzeError::PayloadTooLarge(max_upload_mb)
        } else {
            AnalyzeError::BadRequest(format!("Multipart error: {}", e.body_text()))
        }
    };

    let mut file: Option<(String, Vec<u8>)> = None;
    let mut context = String::new();
    let mut lang = Language::default();
    let mut longdoc = false;

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(form_error)?;
                file = Some((filename, bytes.to_vec()));
            }
            "context" => context = field.text().await.map_err(form_error)?,
            "lang" => {
                lang = Language::parse_or_default(&field.text().await.map_err(form_error)?)
            }
            "longdoc" => longdoc = parse_flag(&field.text().await.map_err(form_error)?)?,
            _ => {}
        }
    }

    let (filename, bytes) =
        file.ok_or_else(|| AnalyzeError::BadRequest("Missing 'file' field".to_string()))?;

    Ok(AnalyzeRequest {
        bytes,
        filename,
        context,
        lang,
        longdoc,
    })
}

/// Parse a form boolean. An empty value means false.
fn parse_flag(value: &str) -> Result<bool, AnalyzeError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => Err(AnalyzeError::BadRequest(format!(
            "Invalid value for 'longdoc': '{other}'"
        ))),
    }
}
