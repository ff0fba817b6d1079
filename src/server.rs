//! HTTP surface of the orchestrator.

use crate::app::App;
use crate::models::{ChatRequest, ChatResponse, ErrorBody};
use crate::{Error, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub const LIVENESS_MESSAGE: &str = "Chatbot Server is running!";

const CHAT_FAILURE: &str = "Sorry, something went wrong while processing your message";
const IMAGE_FAILURE: &str = "Could not start the image generation";
const STATUS_FAILURE: &str = "Could not check the image status";

pub fn router(app: Arc<App>) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/chat", post(chat))
        .route("/generate-image", post(generate_image))
        .route("/get-image/{id}", get(get_image))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app)
}

pub async fn serve(listener: TcpListener, app: Arc<App>) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Server is running on: http://{}", addr);
    }
    axum::serve(listener, router(app)).await?;
    Ok(())
}

async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}

async fn chat(
    State(app): State<Arc<App>>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(rejection),
    };

    match app.converse(request.prompt.as_deref().unwrap_or_default()).await {
        Ok(text) => Json(ChatResponse { text }).into_response(),
        Err(e) => error_response(e, CHAT_FAILURE),
    }
}

async fn generate_image(
    State(app): State<Arc<App>>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(rejection),
    };

    match app
        .start_image_job(request.prompt.as_deref().unwrap_or_default())
        .await
    {
        Ok(accepted) => Json(accepted).into_response(),
        Err(e) => error_response(e, IMAGE_FAILURE),
    }
}

async fn get_image(State(app): State<Arc<App>>, Path(id): Path<String>) -> Response {
    match app.get_job_status(&id).await {
        Ok(status) => Json(status).into_response(),
        Err(e) => error_response(e, STATUS_FAILURE),
    }
}

/// Invalid input is a 400 carrying its own message; everything else is a 500
/// pairing `friendly` with the raw cause.
fn error_response(err: Error, friendly: &str) -> Response {
    match err {
        Error::InvalidInput(message) => {
            warn!("Rejected request: {}", message);
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: message,
                    details: None,
                }),
            )
                .into_response()
        }
        other => {
            error!("{}: {}", friendly, other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: friendly.to_string(),
                    details: Some(other.to_string()),
                }),
            )
                .into_response()
        }
    }
}

fn rejection_response(rejection: JsonRejection) -> Response {
    warn!("Malformed request body: {}", rejection.body_text());
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: rejection.body_text(),
            details: None,
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{MockChatClient, MockImageJobClient};
    use crate::app::AppServices;
    use axum::body::{to_bytes, Body};
    use axum::http::{header::CONTENT_TYPE, Request};
    use tower::ServiceExt;

    fn test_router(chat: MockChatClient, images: MockImageJobClient) -> Router {
        router(Arc::new(App::with_services(AppServices::new(
            Box::new(chat),
            Box::new(images),
        ))))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_liveness() {
        let app = test_router(MockChatClient::new(), MockImageJobClient::new());
        let response = app.oneshot(get("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(bytes, LIVENESS_MESSAGE.as_bytes());
    }

    #[tokio::test]
    async fn test_chat_returns_text() {
        let app = test_router(
            MockChatClient::new().with_response("Try a matte glaze.".to_string()),
            MockImageJobClient::new(),
        );

        let response = app
            .oneshot(post_json("/chat", r#"{"prompt":"Which finish?"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            serde_json::json!({ "text": "Try a matte glaze." })
        );
    }

    #[tokio::test]
    async fn test_chat_missing_prompt_is_bad_request() {
        let chat = MockChatClient::new();
        let app = test_router(chat.clone(), MockImageJobClient::new());

        for body in [r#"{}"#, r#"{"prompt":""}"#, r#"{"prompt":"   "}"#] {
            let response = app.clone().oneshot(post_json("/chat", body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body = json_body(response).await;
            assert!(body["error"].is_string());
            assert!(body.get("details").is_none());
        }
        assert_eq!(chat.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_chat_malformed_json_is_bad_request() {
        let app = test_router(MockChatClient::new(), MockImageJobClient::new());
        let response = app.oneshot(post_json("/chat", "{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_chat_upstream_failure_carries_details() {
        let app = test_router(
            MockChatClient::new().failing("Gemini API error (status 503)"),
            MockImageJobClient::new(),
        );

        let response = app
            .oneshot(post_json("/chat", r#"{"prompt":"hello"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], CHAT_FAILURE);
        assert!(body["details"]
            .as_str()
            .unwrap()
            .contains("Gemini API error (status 503)"));
    }

    #[tokio::test]
    async fn test_generate_image_returns_generation_id() {
        let app = test_router(
            MockChatClient::new(),
            MockImageJobClient::new().with_generation_id("abc123"),
        );

        let response = app
            .oneshot(post_json("/generate-image", r#"{"prompt":"blue pattern"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["generationId"], "abc123");
        assert!(!body["message"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generate_image_without_id_is_server_error() {
        let app = test_router(MockChatClient::new(), MockImageJobClient::new());

        let response = app
            .oneshot(post_json("/generate-image", r#"{"prompt":"blue pattern"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["error"], IMAGE_FAILURE);
    }

    #[tokio::test]
    async fn test_get_image_reports_status() {
        let images = MockImageJobClient::new();
        let app = test_router(MockChatClient::new(), images.clone());

        let response = app.clone().oneshot(get("/get-image/abc123")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            serde_json::json!({ "status": "PENDING" })
        );

        images.set_images(&["https://x/first.png", "https://x/second.png"]);
        let response = app.oneshot(get("/get-image/abc123")).await.unwrap();
        assert_eq!(
            json_body(response).await,
            serde_json::json!({ "status": "COMPLETE", "url": "https://x/first.png" })
        );
    }

    #[tokio::test]
    async fn test_get_image_upstream_failure() {
        let app = test_router(
            MockChatClient::new(),
            MockImageJobClient::new().failing("timed out"),
        );

        let response = app.oneshot(get("/get-image/abc123")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], STATUS_FAILURE);
        assert!(body["details"].as_str().unwrap().contains("timed out"));
    }
}
