//! Credential issuance endpoint.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::auth;
use crate::error::AppResult;
use crate::state::AppState;
use crate::token::{DEFAULT_TOKEN_TYPE, DEFAULT_TTL_SECS};

/// Request body for `POST /api/v1/credential`.
#[derive(Debug, Deserialize)]
pub struct CredentialRequest {
    /// Purpose tag for the credential. Defaults to "flow".
    #[serde(rename = "type", default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    DEFAULT_TOKEN_TYPE.to_string()
}

/// POST /api/v1/credential
///
/// Gated. Signs a short-lived Speechmatics credential for the requested
/// purpose tag. The ttl is fixed server-side; callers that need a new token
/// simply ask again.
pub async fn issue_credential(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CredentialRequest>,
) -> AppResult<HttpResponse> {
    auth::require_caller(&req, &state.config.auth)?;

    let issued = state.issuer.issue(&body.token_type, DEFAULT_TTL_SECS)?;
    state.record_token_issued();

    tracing::debug!(token_type = %body.token_type, expires_in = issued.expires_in, "Credential issued");

    Ok(HttpResponse::Ok().json(issued))
}
