//! # Speechmatics Credential Issuer
//!
//! Builds the short-lived JWTs the browser client uses to talk to the
//! Speechmatics realtime APIs directly. The token is signed with the
//! Speechmatics API key (HS256), so the key itself never leaves this
//! backend — clients only ever see a credential that dies after its ttl.
//!
//! ## Claim set
//! - `iss` / `aud`: fixed to `"speechmatics"` (what the Flow endpoint expects)
//! - `iat`: issue time, unix seconds
//! - `exp`: `iat + ttl`
//! - `type`: purpose tag chosen by the caller (`"flow"` for conversational
//!   sessions, `"rt"` for plain realtime transcription)
//!
//! The issuer holds no mutable state; every call computes a fresh token.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Fixed `iss` claim expected by the Speechmatics temporary-key scheme.
pub const SPEECHMATICS_ISSUER: &str = "speechmatics";

/// Fixed `aud` claim, same scheme.
pub const SPEECHMATICS_AUDIENCE: &str = "speechmatics";

/// Purpose tag used when the caller does not ask for anything else.
pub const DEFAULT_TOKEN_TYPE: &str = "flow";

/// Credential lifetime handed out by the HTTP layer.
pub const DEFAULT_TTL_SECS: u64 = 60;

/// Claim set encoded into every issued credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub aud: String,
    /// Issued at (unix seconds)
    pub iat: u64,
    /// Expiry (unix seconds), always `iat + ttl`
    pub exp: u64,
    /// Purpose tag, e.g. "flow"
    #[serde(rename = "type")]
    pub token_type: String,
}

/// A freshly signed credential plus the ttl it was signed with.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: u64,
}

/// Signs and verifies Speechmatics credentials with the shared API key.
///
/// Constructed once at startup from validated configuration (an empty key is
/// rejected before the server binds, see [`crate::config::AppConfig::validate`]),
/// then shared read-only through [`crate::state::AppState`].
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Sign a credential for the given purpose tag and ttl.
    ///
    /// Rejects an empty purpose tag and a zero ttl (a token that is born
    /// expired is always a caller bug). Signing failures are reported
    /// generically; the API key never appears in an error message.
    pub fn issue(&self, token_type: &str, ttl_secs: u64) -> Result<IssuedToken, AppError> {
        if token_type.is_empty() {
            return Err(AppError::BadRequest(
                "Token type must not be empty".to_string(),
            ));
        }
        if ttl_secs == 0 {
            return Err(AppError::BadRequest(
                "Token ttl must be greater than 0".to_string(),
            ));
        }

        let now = chrono::Utc::now().timestamp() as u64;
        let claims = Claims {
            iss: SPEECHMATICS_ISSUER.to_string(),
            aud: SPEECHMATICS_AUDIENCE.to_string(),
            iat: now,
            exp: now + ttl_secs,
            token_type: token_type.to_string(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "JWT signing failed");
            AppError::Signing("Failed to sign credential".to_string())
        })?;

        Ok(IssuedToken {
            token,
            expires_in: ttl_secs,
        })
    }

    /// Verify a credential's signature, issuer, audience, and expiry.
    ///
    /// Production verification happens downstream at Speechmatics; this is
    /// here so the signing contract stays checkable locally.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[SPEECHMATICS_ISSUER]);
        validation.set_audience(&[SPEECHMATICS_AUDIENCE]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Signing(format!("Credential verification failed: {}", e)))?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_issuer() -> TokenIssuer {
        TokenIssuer::new("test-speechmatics-api-key")
    }

    #[test]
    fn issued_token_verifies() {
        let issuer = test_issuer();
        let issued = issuer.issue("flow", 60).unwrap();
        assert!(!issued.token.is_empty());
        assert_eq!(issued.expires_in, 60);

        let claims = issuer.verify(&issued.token).unwrap();
        assert_eq!(claims.iss, SPEECHMATICS_ISSUER);
        assert_eq!(claims.aud, SPEECHMATICS_AUDIENCE);
        assert_eq!(claims.token_type, "flow");
    }

    #[test]
    fn expiry_matches_ttl() {
        let issuer = test_issuer();
        for ttl in [1u64, 60, 300, 3600] {
            let issued = issuer.issue("flow", ttl).unwrap();
            let claims = issuer.verify(&issued.token).unwrap();
            assert_eq!(claims.exp - claims.iat, ttl);
        }
    }

    #[test]
    fn purpose_tag_is_preserved() {
        let issuer = test_issuer();
        let issued = issuer.issue("rt", 60).unwrap();
        let claims = issuer.verify(&issued.token).unwrap();
        assert_eq!(claims.token_type, "rt");
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let issuer = test_issuer();
        let other = TokenIssuer::new("a-completely-different-key");

        let issued = issuer.issue("flow", 60).unwrap();
        assert!(other.verify(&issued.token).is_err());
        // Sanity: the right key still accepts it
        assert!(issuer.verify(&issued.token).is_ok());
    }

    #[test]
    fn empty_type_rejected() {
        let issuer = test_issuer();
        let err = issuer.issue("", 60).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn zero_ttl_rejected() {
        let issuer = test_issuer();
        let err = issuer.issue("flow", 0).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn garbage_token_rejected() {
        let issuer = test_issuer();
        assert!(issuer.verify("not-a-jwt").is_err());
    }

    #[test]
    fn token_has_three_parts() {
        let issuer = test_issuer();
        let issued = issuer.issue("flow", 60).unwrap();
        assert_eq!(issued.token.split('.').count(), 3);
    }
}
