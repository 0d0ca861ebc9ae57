//! Contact endpoint tests: drive the router with `oneshot` and a recording
//! relay, so nothing leaves the process.

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use folio::relay::{EmailRelay, RelayError};
use folio::server::{AppState, router};
use folio::submission::RelayResponse;
use folio::validation::{ContactPayload, messages};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;

const ENDPOINT: &str = "/api/contact";

/// Records every delivered payload; fails when told to.
#[derive(Default)]
struct RecordingRelay {
    fail: bool,
    delivered: Mutex<Vec<ContactPayload>>,
}

impl RecordingRelay {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn delivered(&self) -> Vec<ContactPayload> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailRelay for RecordingRelay {
    async fn deliver(&self, payload: &ContactPayload) -> Result<String, RelayError> {
        self.delivered.lock().unwrap().push(payload.clone());
        if self.fail {
            Err(RelayError::Rejected("quota exceeded".to_string()))
        } else {
            Ok("Email sent".to_string())
        }
    }
}

fn valid_body() -> serde_json::Value {
    serde_json::json!({
        "name": "Jane Doe",
        "email": "jane@example.com",
        "subject": "Hi",
        "message": "Hello there, interested in working together.",
    })
}

async fn post_json(state: AppState, body: serde_json::Value) -> (StatusCode, RelayResponse) {
    let site = TempDir::new().unwrap();
    let app = router(state, site.path(), ENDPOINT);
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(ENDPOINT)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn valid_message_is_forwarded_once() {
    let relay = Arc::new(RecordingRelay::default());
    let (status, body) = post_json(AppState::with_relay(relay.clone()), valid_body()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, RelayResponse::ok(messages::SUBMIT_SUCCEEDED));
    let delivered = relay.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].email, "jane@example.com");
}

#[tokio::test]
async fn forwarded_message_is_sanitized() {
    let relay = Arc::new(RecordingRelay::default());
    let mut body = valid_body();
    body["name"] = "  Jane <b>Doe</b>  ".into();
    body["message"] = "Hello <script>there</script>,\r\nlet's talk.".into();

    let (status, _) = post_json(AppState::with_relay(relay.clone()), body).await;

    assert_eq!(status, StatusCode::OK);
    let delivered = relay.delivered();
    assert_eq!(delivered[0].name, "Jane bDoe/b");
    assert_eq!(delivered[0].message, "Hello scriptthere/script,\nlet's talk.");
}

#[tokio::test]
async fn invalid_message_is_rejected_with_first_error() {
    let relay = Arc::new(RecordingRelay::default());
    let body = serde_json::json!({"name": "", "email": "bad", "message": "hi"});

    let (status, response) = post_json(AppState::with_relay(relay.clone()), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!response.success);
    assert_eq!(response.message.as_deref(), Some(messages::NAME_REQUIRED));
    assert!(relay.delivered().is_empty());
}

#[tokio::test]
async fn markup_only_fields_are_rejected_after_sanitizing() {
    let relay = Arc::new(RecordingRelay::default());
    let body = serde_json::json!({
        "name": "<<>>",
        "email": "jane@example.com",
        "message": "<<<<<<<<<<>>>>>>>>>>",
    });

    let (status, response) = post_json(AppState::with_relay(relay.clone()), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, RelayResponse::failed(messages::NAME_REQUIRED));
    assert!(relay.delivered().is_empty());
}

#[tokio::test]
async fn header_injection_in_email_is_rejected() {
    let relay = Arc::new(RecordingRelay::default());
    let mut body = valid_body();
    body["email"] = "jane@example.com\r\nBcc: everyone@example.com".into();

    let (status, response) = post_json(AppState::with_relay(relay.clone()), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message.as_deref(), Some(messages::EMAIL_INVALID));
    assert!(relay.delivered().is_empty());
}

#[tokio::test]
async fn honeypot_is_rejected_without_forwarding() {
    let relay = Arc::new(RecordingRelay::default());
    let mut body = valid_body();
    body["honeypot"] = "http://spam.example".into();

    let (status, response) = post_json(AppState::with_relay(relay.clone()), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, RelayResponse::failed(messages::SUBMIT_FAILED));
    assert!(relay.delivered().is_empty());
}

#[tokio::test]
async fn unconfigured_relay_is_service_unavailable() {
    let (status, response) = post_json(AppState::default(), valid_body()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(!response.success);
}

#[tokio::test]
async fn provider_failure_is_bad_gateway() {
    let relay = Arc::new(RecordingRelay::failing());
    let (status, response) = post_json(AppState::with_relay(relay.clone()), valid_body()).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(response, RelayResponse::failed(messages::SUBMIT_FAILED));
    assert_eq!(relay.delivered().len(), 1);
}

#[tokio::test]
async fn form_encoded_post_is_accepted() {
    let relay = Arc::new(RecordingRelay::default());
    let site = TempDir::new().unwrap();
    let app = router(AppState::with_relay(relay.clone()), site.path(), ENDPOINT);
    let form = "name=Jane+Doe&email=jane%40example.com&subject=&message=Hello+there%2C+let%27s+talk.&honeypot=";

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(ENDPOINT)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(relay.delivered()[0].name, "Jane Doe");
    assert_eq!(relay.delivered()[0].subject, "");
}

#[tokio::test]
async fn get_on_endpoint_is_not_allowed() {
    let site = TempDir::new().unwrap();
    let app = router(AppState::default(), site.path(), ENDPOINT);
    let response = app
        .oneshot(Request::builder().uri(ENDPOINT).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
