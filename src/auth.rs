//! # Request Gate
//!
//! Every operation except the health and service-info endpoints requires the
//! caller to present the backend API key as a bearer token:
//!
//! ```text
//! Authorization: Bearer <backend api key>
//! ```
//!
//! The check is an exact string comparison against the one key configured at
//! startup. There is deliberately no rate limiting, lockout, or audit trail
//! here: the gate is a pure predicate of the request and the configuration.

use actix_web::HttpRequest;

use crate::config::AuthConfig;
use crate::error::AppError;

/// Extract the token from an `Authorization: Bearer <token>` header value.
///
/// Returns `None` for a missing header, a non-Bearer scheme, or an empty
/// token.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let token = header?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Check a presented Authorization header value against the configured
/// backend API key.
///
/// Any mismatch — wrong key, empty key, malformed or missing header — fails
/// with [`AppError::Unauthorized`] carrying a generic message.
pub fn authorize(auth: &AuthConfig, authorization: Option<&str>) -> Result<(), AppError> {
    match bearer_token(authorization) {
        Some(presented) if presented == auth.backend_api_key => Ok(()),
        _ => Err(AppError::Unauthorized("Invalid API key".to_string())),
    }
}

/// Handler-side convenience: pull the Authorization header off the request
/// and run it through [`authorize`].
pub fn require_caller(req: &HttpRequest, auth: &AuthConfig) -> Result<(), AppError> {
    let header = req
        .headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    authorize(auth, header)
}
