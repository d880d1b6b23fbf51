//! Protocol error types.
//!
//! All errors are value-like and inspectable: validation failures map to an
//! OAuth-style error response at the HTTP boundary, never to a crash.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use op_crypto::SignatureError;

/// Token validation failures.
///
/// Always recoverable at the caller; each kind carries at most the minimal
/// diagnostic context needed to build an error response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The token is not three base64url JSON segments.
    #[error("malformed token")]
    Malformed,

    /// The header declares an algorithm the caller does not trust.
    ///
    /// The caller's allow-list, not the token, decides which algorithms are
    /// acceptable; this kind also covers unknown names and `"none"`.
    #[error("token algorithm '{0}' is not allowed")]
    AlgorithmNotAllowed(String),

    /// The signature does not verify against the provider's key.
    #[error("token signature is invalid")]
    SignatureInvalid,

    /// The current time is at or after the token's `exp` claim.
    #[error("token has expired")]
    Expired,

    /// The current time is before the token's `nbf` claim.
    #[error("token is not yet valid")]
    NotYetValid,
}

/// Cryptographic failure during token issuance.
///
/// Fatal for that issuance call; no partial token is returned.
#[derive(Debug, Error)]
#[error("token signing failed: {0}")]
pub struct SigningError(pub String);

impl From<SignatureError> for SigningError {
    fn from(err: SignatureError) -> Self {
        Self(err.to_string())
    }
}

impl From<serde_json::Error> for SigningError {
    fn from(err: serde_json::Error) -> Self {
        Self(format!("claim serialization failed: {err}"))
    }
}

/// Provider-level protocol errors.
#[derive(Debug, Error)]
pub enum OidcError {
    /// The presented redirect URI is not registered for the client.
    ///
    /// Deliberately carries the client id only: the rejected URI must not
    /// leak back into a redirect or an error response.
    #[error("redirect URI is not registered for client '{0}'")]
    InvalidRedirect(String),

    /// Unknown or disabled client.
    #[error("invalid_client: {0}")]
    InvalidClient(String),

    /// Token issuance failed.
    #[error(transparent)]
    Signing(#[from] SigningError),

    /// Token validation failed.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl OidcError {
    /// Returns the OAuth 2.0 error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRedirect(_) => "invalid_request_uri",
            Self::InvalidClient(_) => "invalid_client",
            Self::Token(_) => "invalid_grant",
            Self::Signing(_) | Self::Internal(_) => "server_error",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidRedirect(_) | Self::Token(_) => 400,
            Self::InvalidClient(_) => 401,
            Self::Signing(_) | Self::Internal(_) => 500,
        }
    }

    /// Creates an OAuth 2.0 error response body.
    #[must_use]
    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.error_code().to_string(),
            error_description: Some(self.to_string()),
        }
    }
}

/// OAuth 2.0 error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code.
    pub error: String,

    /// Human-readable error description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

/// Result type for provider operations.
pub type OidcResult<T> = Result<T, OidcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_redirect_does_not_leak_the_uri() {
        let error = OidcError::InvalidRedirect("my-client".to_string());
        assert!(!error.to_string().contains("http"));
        assert_eq!(error.error_code(), "invalid_request_uri");
        assert_eq!(error.http_status(), 400);
    }

    #[test]
    fn token_errors_map_to_invalid_grant() {
        let error = OidcError::from(TokenError::Expired);
        assert_eq!(error.error_code(), "invalid_grant");
        assert_eq!(error.http_status(), 400);
    }

    #[test]
    fn signing_errors_are_server_side() {
        let error = OidcError::from(SigningError("rng failure".to_string()));
        assert_eq!(error.error_code(), "server_error");
        assert_eq!(error.http_status(), 500);
    }
}
