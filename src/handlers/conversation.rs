//! Mock conversation-session endpoints.
//!
//! These preserve the request/response shapes of the session API without any
//! session model behind them: no registry, no persistence, no transport to
//! Speechmatics. A session id is fabricated per start request and never
//! retained, so `end` and `status` acknowledge whatever id they are given.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth;
use crate::error::AppResult;
use crate::state::AppState;
use crate::token::{DEFAULT_TOKEN_TYPE, DEFAULT_TTL_SECS};

/// Conversation template selection, forwarded verbatim once a real
/// transport exists.
#[derive(Debug, Deserialize)]
pub struct ConversationConfig {
    pub template_id: String,
    #[serde(default)]
    pub template_variables: serde_json::Map<String, serde_json::Value>,
}

/// Request body for `POST /api/v1/conversation/start`.
#[derive(Debug, Deserialize)]
pub struct StartConversationRequest {
    pub config: ConversationConfig,
    #[serde(default)]
    pub audio_format: Option<serde_json::Value>,
}

/// POST /api/v1/conversation/start
///
/// Gated. Signs a flow credential up front — the same failure mode a real
/// session setup would hit — then acknowledges with a fresh opaque id.
pub async fn start_conversation(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<StartConversationRequest>,
) -> AppResult<HttpResponse> {
    auth::require_caller(&req, &state.config.auth)?;

    // The credential is not forwarded anywhere yet; issuing it still
    // surfaces signing problems at start time instead of mid-session.
    let _issued = state.issuer.issue(DEFAULT_TOKEN_TYPE, DEFAULT_TTL_SECS)?;

    let session_id = format!("session_{}", Uuid::new_v4().simple());

    tracing::info!(
        session_id = %session_id,
        template_id = %body.config.template_id,
        template_variables = body.config.template_variables.len(),
        has_audio_format = body.audio_format.is_some(),
        "Conversation started"
    );

    Ok(HttpResponse::Ok().json(json!({
        "session_id": session_id,
        "status": "started",
        "message": "Conversation started successfully"
    })))
}

/// POST /api/v1/conversation/{session_id}/end
pub async fn end_conversation(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    auth::require_caller(&req, &state.config.auth)?;

    let session_id = path.into_inner();
    tracing::info!(session_id = %session_id, "Conversation ended");

    Ok(HttpResponse::Ok().json(json!({
        "session_id": session_id,
        "status": "ended",
        "message": "Conversation ended successfully"
    })))
}

/// GET /api/v1/conversation/{session_id}/status
pub async fn conversation_status(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    auth::require_caller(&req, &state.config.auth)?;

    Ok(HttpResponse::Ok().json(json!({
        "session_id": path.into_inner(),
        "status": "active",
        "connected": true,
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use actix_web::{http::StatusCode, test, App};

    fn test_state() -> AppState {
        let mut config = AppConfig::default();
        config.auth.speechmatics_api_key = "sm-test-key".to_string();
        config.auth.backend_api_key = "abc123".to_string();
        AppState::new(config)
    }

    fn test_app(
        state: AppState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new().app_data(web::Data::new(state)).service(
            web::scope("/api/v1")
                .route("/conversation/start", web::post().to(start_conversation))
                .route(
                    "/conversation/{session_id}/end",
                    web::post().to(end_conversation),
                )
                .route(
                    "/conversation/{session_id}/status",
                    web::get().to(conversation_status),
                ),
        )
    }

    fn start_body() -> serde_json::Value {
        serde_json::json!({
            "config": {
                "template_id": "default",
                "template_variables": {"persona": "assistant"}
            },
            "audio_format": {"type": "raw", "encoding": "pcm_s16le", "sample_rate": 16000}
        })
    }

    #[actix_web::test]
    async fn start_returns_fresh_session_id() {
        let app = test::init_service(test_app(test_state())).await;

        let mut ids = Vec::new();
        for _ in 0..2 {
            let req = test::TestRequest::post()
                .uri("/api/v1/conversation/start")
                .insert_header(("Authorization", "Bearer abc123"))
                .set_json(start_body())
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);

            let body: serde_json::Value = test::read_body_json(resp).await;
            assert_eq!(body["status"], "started");
            let id = body["session_id"].as_str().unwrap().to_string();
            assert!(id.starts_with("session_"));
            ids.push(id);
        }

        // Ids are fabricated per request and must not repeat
        assert_ne!(ids[0], ids[1]);
    }

    #[actix_web::test]
    async fn start_without_template_variables_is_accepted() {
        let app = test::init_service(test_app(test_state())).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/conversation/start")
            .insert_header(("Authorization", "Bearer abc123"))
            .set_json(serde_json::json!({"config": {"template_id": "default"}}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn end_acknowledges_any_session() {
        let app = test::init_service(test_app(test_state())).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/conversation/session_12345/end")
            .insert_header(("Authorization", "Bearer abc123"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["session_id"], "session_12345");
        assert_eq!(body["status"], "ended");
    }

    #[actix_web::test]
    async fn status_reports_active() {
        let app = test::init_service(test_app(test_state())).await;

        let req = test::TestRequest::get()
            .uri("/api/v1/conversation/session_12345/status")
            .insert_header(("Authorization", "Bearer abc123"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["session_id"], "session_12345");
        assert_eq!(body["status"], "active");
        assert_eq!(body["connected"], true);
        assert!(body["timestamp"].is_string());
    }

    #[actix_web::test]
    async fn all_session_endpoints_are_gated() {
        let app = test::init_service(test_app(test_state())).await;

        let start = test::TestRequest::post()
            .uri("/api/v1/conversation/start")
            .set_json(start_body())
            .to_request();
        assert_eq!(
            test::call_service(&app, start).await.status(),
            StatusCode::UNAUTHORIZED
        );

        let end = test::TestRequest::post()
            .uri("/api/v1/conversation/s1/end")
            .insert_header(("Authorization", "Bearer wrong"))
            .to_request();
        assert_eq!(
            test::call_service(&app, end).await.status(),
            StatusCode::UNAUTHORIZED
        );

        let status = test::TestRequest::get()
            .uri("/api/v1/conversation/s1/status")
            .to_request();
        assert_eq!(
            test::call_service(&app, status).await.status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
