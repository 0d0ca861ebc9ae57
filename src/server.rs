//! HTTP server: static site plus the contact relay endpoint.
//!
//! ```text
//! POST {contact.endpoint}   validate → sanitize → honeypot → EmailRelay
//! GET  /home                308 → /
//! GET  /*                   files from the built site directory
//! ```
//!
//! Every response carries the security headers from [`security_headers`],
//! including a Content-Security-Policy that admits the page's inline script
//! by hash and nothing else.

use crate::config::SiteConfig;
use crate::generate::script_csp_source;
use crate::relay::{EmailRelay, Web3FormsRelay};
use crate::submission::RelayResponse;
use crate::validation::{
    ContactFormData, is_form_valid, messages, sanitize_form_data, validate_contact_form,
};
use axum::extract::{FromRequest, Request, State};
use axum::http::header::{self, HeaderName, HeaderValue};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// Shared handler state. `relay` is `None` when no access key is configured.
#[derive(Clone, Default)]
pub struct AppState {
    pub relay: Option<Arc<dyn EmailRelay>>,
}

impl AppState {
    pub fn with_relay(relay: Arc<dyn EmailRelay>) -> Self {
        Self { relay: Some(relay) }
    }
}

/// `(name, value)` pairs stamped onto every response.
pub fn security_headers() -> Vec<(HeaderName, HeaderValue)> {
    let csp = format!(
        "default-src 'self'; script-src 'self' {}; style-src 'self' 'unsafe-inline'; \
         img-src 'self' data: https:; font-src 'self' data:; connect-src 'self'; \
         frame-ancestors 'none'; base-uri 'self'; form-action 'self'",
        script_csp_source()
    );
    // Base64 and ASCII only; the fallback never triggers in practice.
    let csp = HeaderValue::from_str(&csp).unwrap_or_else(|_| HeaderValue::from_static("default-src 'self'"));

    vec![
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
        (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        (
            header::REFERRER_POLICY,
            HeaderValue::from_static("origin-when-cross-origin"),
        ),
        (
            HeaderName::from_static("permissions-policy"),
            HeaderValue::from_static("camera=(), microphone=(), geolocation=()"),
        ),
        (header::CONTENT_SECURITY_POLICY, csp),
    ]
}

pub fn router(state: AppState, site_dir: &Path, endpoint: &str) -> Router {
    let mut app = Router::new()
        .route(endpoint, post(contact))
        .route("/home", get(|| async { Redirect::permanent("/") }))
        .fallback_service(ServeDir::new(site_dir))
        .with_state(state);

    for (name, value) in security_headers() {
        app = app.layer(SetResponseHeaderLayer::overriding(name, value));
    }
    app.layer(TraceLayer::new_for_http())
}

fn reply(status: StatusCode, body: RelayResponse) -> Response {
    (status, Json(body)).into_response()
}

/// Read the submission as JSON, or as a urlencoded form when the page
/// script didn't run.
async fn read_submission(req: Request) -> Result<ContactFormData, String> {
    let is_form = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

    if is_form {
        Form::<ContactFormData>::from_request(req, &())
            .await
            .map(|Form(data)| data)
            .map_err(|e| e.body_text())
    } else {
        Json::<ContactFormData>::from_request(req, &())
            .await
            .map(|Json(data)| data)
            .map_err(|e| e.body_text())
    }
}

async fn contact(State(state): State<AppState>, req: Request) -> Response {
    let data = match read_submission(req).await {
        Ok(data) => data,
        Err(reason) => {
            tracing::debug!(%reason, "unreadable contact submission");
            return reply(
                StatusCode::BAD_REQUEST,
                RelayResponse::failed("Invalid request body"),
            );
        }
    };

    // Checked after cleaning: markup-only fields sanitize to empty strings.
    let clean = sanitize_form_data(&data);
    let validation = validate_contact_form(&clean);
    if !is_form_valid(&validation) {
        let message = validation
            .first_errors()
            .into_iter()
            .next()
            .map(|(_, message)| message)
            .unwrap_or_else(|| messages::SUBMIT_FAILED.to_string());
        return reply(StatusCode::BAD_REQUEST, RelayResponse::failed(message));
    }

    if data.is_spam() {
        tracing::info!("contact submission rejected by honeypot");
        return reply(
            StatusCode::BAD_REQUEST,
            RelayResponse::failed(messages::SUBMIT_FAILED),
        );
    }

    let Some(relay) = state.relay.as_ref() else {
        tracing::warn!("contact submission refused: no email relay configured");
        return reply(
            StatusCode::SERVICE_UNAVAILABLE,
            RelayResponse::failed(messages::SUBMIT_FAILED),
        );
    };

    match relay.deliver(&clean.to_payload()).await {
        Ok(_) => {
            tracing::info!("contact message relayed");
            reply(StatusCode::OK, RelayResponse::ok(messages::SUBMIT_SUCCEEDED))
        }
        Err(e) => {
            tracing::error!(error = %e, "contact relay failed");
            reply(
                StatusCode::BAD_GATEWAY,
                RelayResponse::failed(messages::SUBMIT_FAILED),
            )
        }
    }
}

/// Serve `site_dir` and the contact endpoint until Ctrl-C.
pub async fn serve(config: &SiteConfig, site_dir: PathBuf) -> Result<(), ServerError> {
    if !site_dir.join("index.html").exists() {
        tracing::warn!(dir = %site_dir.display(), "no index.html in site directory; run `folio build` first");
    }

    let relay: Option<Arc<dyn EmailRelay>> = match Web3FormsRelay::from_config(&config.server) {
        Ok(relay) => {
            tracing::info!(url = relay.url(), "email relay configured");
            Some(Arc::new(relay))
        }
        Err(e) => {
            tracing::warn!(error = %e, "contact submissions will be refused");
            None
        }
    };

    let app = router(AppState { relay }, &site_dir, &config.contact.endpoint);
    let addr = config.server.bind.clone();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    tracing::info!(addr = %listener.local_addr()?, "serving {}", site_dir.display());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn site() -> TempDir {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("index.html"), "<!DOCTYPE html><p>hi</p>").unwrap();
        tmp
    }

    #[tokio::test]
    async fn serves_built_index() {
        let tmp = site();
        let app = router(AppState::default(), tmp.path(), "/api/contact");
        let res = app
            .oneshot(HttpRequest::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn home_redirects_permanently() {
        let tmp = site();
        let app = router(AppState::default(), tmp.path(), "/api/contact");
        let res = app
            .oneshot(HttpRequest::builder().uri("/home").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(res.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn every_response_has_security_headers() {
        let tmp = site();
        let app = router(AppState::default(), tmp.path(), "/api/contact");
        let res = app
            .oneshot(HttpRequest::builder().uri("/missing.txt").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let headers = res.headers();
        assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[header::REFERRER_POLICY], "origin-when-cross-origin");
        assert!(headers.contains_key("permissions-policy"));
        let csp = headers[header::CONTENT_SECURITY_POLICY].to_str().unwrap();
        assert!(csp.contains(&script_csp_source()));
        assert!(csp.contains("frame-ancestors 'none'"));
    }

    #[test]
    fn csp_never_allows_unsafe_inline_scripts() {
        let (_, csp) = security_headers()
            .into_iter()
            .find(|(name, _)| *name == header::CONTENT_SECURITY_POLICY)
            .unwrap();
        let csp = csp.to_str().unwrap();
        let script_src = csp.split(';').find(|d| d.trim().starts_with("script-src")).unwrap();
        assert!(!script_src.contains("unsafe-inline"));
    }

    #[tokio::test]
    async fn unconfigured_relay_is_unavailable() {
        let tmp = site();
        let app = router(AppState::default(), tmp.path(), "/api/contact");
        let body = serde_json::json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "subject": "Hi",
            "message": "Hello there, interested in working together.",
        });
        let res = app
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/api/contact")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let tmp = site();
        let app = router(AppState::default(), tmp.path(), "/api/contact");
        let res = app
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/api/contact")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
