//! # Error Handling
//!
//! Custom error types and their mapping to HTTP responses.
//!
//! ## Error taxonomy
//! - **Config**: configuration problems. In practice these are fatal at
//!   startup (a missing Speechmatics API key aborts before the server binds)
//!   and only reach a response if something is miswired at runtime.
//! - **Unauthorized**: the caller's bearer key did not match. Mapped to 401
//!   with a deliberately generic message.
//! - **Signing**: building or signing a credential failed. Mapped to 500;
//!   the underlying cause is logged, never returned, and the API key is
//!   never part of any message.
//! - **BadRequest**: malformed JSON bodies or invalid token parameters.
//! - **Internal**: anything else (anyhow fallthrough).
//!
//! Nothing here retries. All operations are synchronous and safe for the
//! caller to retry at their own discretion.
//!
//! ## JSON response format
//! All errors share one envelope so clients can handle them uniformly:
//! ```json
//! {
//!   "error": {
//!     "type": "unauthorized",
//!     "message": "Invalid API key",
//!     "timestamp": "2025-01-01T12:00:00Z"
//!   }
//! }
//! ```

use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;

/// Application error type returned by handlers and core components.
#[derive(Debug)]
pub enum AppError {
    /// Configuration file or environment variable problems
    Config(String),

    /// Caller failed the bearer-key gate
    Unauthorized(String),

    /// Credential construction or signing failed
    Signing(String),

    /// Client sent invalid or malformed data
    BadRequest(String),

    /// Anything else that went wrong server-side
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Signing(msg) => write!(f, "Signing error: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

/// Maps each error variant to an HTTP status code and the shared JSON
/// error envelope.
///
/// Status mapping:
/// - Config/Signing/Internal → 500
/// - Unauthorized → 401
/// - BadRequest → 400
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status, error_type, message) = match self {
            AppError::Config(msg) => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "config_error",
                msg.clone(),
            ),
            AppError::Unauthorized(msg) => (
                actix_web::http::StatusCode::UNAUTHORIZED,
                "unauthorized",
                msg.clone(),
            ),
            AppError::Signing(msg) => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "signing_error",
                msg.clone(),
            ),
            AppError::BadRequest(msg) => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "bad_request",
                msg.clone(),
            ),
            AppError::Internal(msg) => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                msg.clone(),
            ),
        };

        HttpResponse::build(status).json(json!({
            "error": {
                "type": error_type,
                "message": message,
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        }))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// JSON parsing problems are the client's fault, not ours.
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(format!("JSON parsing error: {}", err))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

/// Shorthand for `Result<T, AppError>`.
pub type AppResult<T> = Result<T, AppError>;
