//! HTTP router construction.
//!
//! Assembles the Axum routes, middleware, and OpenAPI docs into a single `Router`.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::api;
use crate::state::AppState;

/// Build the complete application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let upload_limit = upload_limit_bytes(state.config.server.max_upload_mb);
    let cors = cors_layer(&state.config.server.cors_origin);

    Router::new()
        .route("/", get(api::root))
        .route("/health", get(api::health))
        .route(
            "/analyze",
            post(api::analyze).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .layer(cors)
        .with_state(state)
        .merge(Scalar::with_url("/docs", api::doc::ApiDoc::openapi()))
}

fn upload_limit_bytes(max_upload_mb: usize) -> usize {
    max_upload_mb.saturating_mul(1024 * 1024)
}

/// `*` allows any origin; otherwise a comma-separated origin list.
fn cors_layer(origin: &str) -> CorsLayer {
    if origin.trim() == "*" {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = origin
        .split(',')
        .filter_map(|o| {
            let o = o.trim();
            match o.parse() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin '{}'", o);
                    None
                }
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use radar_core::Config;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::analysis::Orchestrator;

    const BOUNDARY: &str = "radar-test-boundary";

    fn app_with(overrides: &[(&str, &str)]) -> Router {
        let mut vars: HashMap<String, String> = HashMap::new();
        vars.insert("LLM_PROVIDER".into(), "mock".into());
        for (k, v) in overrides {
            vars.insert(k.to_string(), v.to_string());
        }
        let config = Config::from_lookup(&|key: &str| vars.get(key).cloned());
        let orchestrator = Orchestrator::from_config(&config).unwrap();
        build_router(Arc::new(AppState { config, orchestrator }))
    }

    fn app() -> Router {
        app_with(&[])
    }

    /// Multipart body from (name, optional filename, content) parts.
    fn form(parts: &[(&str, Option<&str>, &[u8])]) -> Body {
        let mut body = Vec::new();
        for (name, filename, content) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match filename {
                Some(f) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Body::from(body)
    }

    fn analyze_request(body: Body) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/analyze")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(body)
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn project_text() -> String {
        let paragraph = "The tunnel section crosses anhydrite layers. Groundwater \
                         management requires approval from the water authority.";
        vec![paragraph; 6].join("\n\n")
    }

    #[tokio::test]
    async fn root_banner() {
        let request = Request::get("/").body(Body::empty()).unwrap();
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "AI Risk Radar API is running");
    }

    #[tokio::test]
    async fn health_is_ok() {
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "ok": true }));
    }

    #[tokio::test]
    async fn unsupported_format_is_400() {
        let text = project_text();
        let body = form(&[("file", Some("budget.xlsx"), text.as_bytes())]);
        let (status, body) = send(app(), analyze_request(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "unsupported_format");
        assert!(body["message"].as_str().unwrap().contains("xlsx"));
    }

    #[tokio::test]
    async fn short_document_is_422() {
        let body = form(&[("file", Some("memo.txt"), "x".repeat(50).as_bytes())]);
        let (status, body) = send(app(), analyze_request(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error_code"], "empty_or_too_short");
    }

    #[tokio::test]
    async fn missing_file_is_400() {
        let body = form(&[("context", None, "only context".as_bytes())]);
        let (status, body) = send(app(), analyze_request(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "invalid_request");
    }

    #[tokio::test]
    async fn invalid_longdoc_flag_is_400() {
        let text = project_text();
        let body = form(&[
            ("file", Some("plan.txt"), text.as_bytes()),
            ("longdoc", None, "sometimes".as_bytes()),
        ]);
        let (status, body) = send(app(), analyze_request(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "invalid_request");
    }

    #[tokio::test]
    async fn single_mode_report() {
        let text = project_text();
        let body = form(&[
            ("file", Some("Plan.TXT"), text.as_bytes()),
            ("context", None, "Stuttgart 21".as_bytes()),
            ("lang", None, "en".as_bytes()),
            ("extra", None, "ignored".as_bytes()),
        ]);
        let (status, body) = send(app(), analyze_request(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["intuitive_risks"].as_array().unwrap().len(), 1);
        assert_eq!(body["counterintuitive_risks"].as_array().unwrap().len(), 1);
        assert!(body.get("chunks").is_none());
        assert_eq!(body["_debug"]["filename"], "plan.txt");
        assert_eq!(body["_debug"]["mode"], "single");
        assert_eq!(body["_debug"]["lang"], "en");
        assert_eq!(body["_debug"]["chars"], text.chars().count());
        assert!(body["_debug"].get("chunk_count").is_none());
    }

    #[tokio::test]
    async fn longdoc_mode_report() {
        let text = project_text();
        let body = form(&[
            ("file", Some("plan.txt"), text.as_bytes()),
            ("longdoc", None, "true".as_bytes()),
        ]);
        let (status, body) = send(app_with(&[("CHUNK_MAX_TOKENS", "40")]), analyze_request(body)).await;
        assert_eq!(status, StatusCode::OK);

        let chunks = body["chunks"].as_array().unwrap();
        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk["chunk_id"], i + 1);
            assert!(chunk["chunk_chars"].as_u64().unwrap() > 0);
            assert!(chunk["intuitive_risks"].is_array());
        }
        assert_eq!(body["_debug"]["mode"], "chunked");
        assert_eq!(body["_debug"]["chunk_count"], chunks.len());
        assert_eq!(body["_debug"]["lang"], "es");
    }

    #[tokio::test]
    async fn oversized_upload_is_413() {
        let big = vec![b'a'; 2 * 1024 * 1024];
        let body = form(&[("file", Some("huge.txt"), big.as_slice())]);
        let (status, body) = send(app_with(&[("MAX_UPLOAD_MB", "1")]), analyze_request(body)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error_code"], "payload_too_large");
    }

    #[test]
    fn upload_limit_saturates() {
        assert_eq!(upload_limit_bytes(25), 25 * 1024 * 1024);
        assert_eq!(upload_limit_bytes(usize::MAX), usize::MAX);
    }

    #[tokio::test]
    async fn huge_upload_limit_still_serves() {
        let limit = usize::MAX.to_string();
        let app = app_with(&[("MAX_UPLOAD_MB", limit.as_str())]);
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (status, _) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[test]
    fn cors_origin_list_skips_invalid_entries() {
        // Builds without panicking on a malformed entry.
        let _ = cors_layer("https://radar.example, bad\norigin");
    }
}
