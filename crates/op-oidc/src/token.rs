//! Token codec: issuing and validating signed identity/access tokens.
//!
//! Tokens are three base64url segments joined by `.`:
//! `b64url(header JSON).b64url(claims JSON).b64url(signature)`. The header
//! carries `typ` (always `"JWT"`), `alg` (JWA name, or `"none"` for the
//! unsigned path) and `kid` (the signing key's identifier). The claims are
//! the caller's payload merged with generated `jti`/`nbf`/`iat`/`exp`;
//! generated claims always win on a name collision.
//!
//! Validation is driven by the caller's algorithm allow-list, never by the
//! token itself, which defends against algorithm-confusion and downgrade
//! attacks.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use op_crypto::{random_base64url, KeyMaterial, SignatureAlgorithm};

use crate::error::{SigningError, TokenError};

/// Token claims: a JSON object keyed by claim name.
pub type Claims = serde_json::Map<String, Value>;

/// Token header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenHeader {
    /// Token type, always `"JWT"`.
    pub typ: String,

    /// JWA algorithm name, or `"none"` for unsigned tokens.
    pub alg: String,

    /// Identifier of the signing key; absent on unsigned tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

/// Options controlling the generated claims of an issued token.
#[derive(Debug, Clone)]
pub struct IssueOptions {
    /// Validity duration; `exp` becomes issuance time plus this.
    pub lifetime: Option<Duration>,

    /// Explicit expiry, used when no `lifetime` is given. With neither,
    /// `exp` is omitted.
    pub expires: Option<DateTime<Utc>>,

    /// Valid-from time for the `nbf` claim. Defaults to issuance time.
    pub not_before: Option<DateTime<Utc>>,

    /// Size in bytes of the random `jti` replay identifier. `0` omits the
    /// claim entirely.
    pub jti_size: usize,
}

impl Default for IssueOptions {
    fn default() -> Self {
        Self {
            lifetime: None,
            expires: None,
            not_before: None,
            jti_size: 16,
        }
    }
}

impl IssueOptions {
    /// Creates the default options: no expiry, `nbf` at issuance time, a
    /// 16-byte `jti`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the validity duration.
    #[must_use]
    pub const fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    /// Sets an explicit expiry timestamp.
    #[must_use]
    pub const fn with_expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Sets the valid-from time.
    #[must_use]
    pub const fn with_not_before(mut self, not_before: DateTime<Utc>) -> Self {
        self.not_before = Some(not_before);
        self
    }

    /// Sets the `jti` size in bytes; `0` omits the claim.
    #[must_use]
    pub const fn with_jti_size(mut self, jti_size: usize) -> Self {
        self.jti_size = jti_size;
        self
    }
}

/// Codec issuing and validating tokens with the provider's active key.
///
/// The key is injected at construction and immutable afterwards; rotation
/// means building a new codec around the new key snapshot.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    key: Arc<KeyMaterial>,
}

impl TokenCodec {
    /// Creates a codec around the active signing key.
    #[must_use]
    pub fn new(key: Arc<KeyMaterial>) -> Self {
        Self { key }
    }

    /// Returns the signing key.
    #[must_use]
    pub fn key(&self) -> &KeyMaterial {
        &self.key
    }

    /// Issues a signed token over the caller's claims.
    ///
    /// The header names the key's algorithm and key id. Generated claims
    /// (`jti`, `nbf`, `iat`, and `exp` when an expiry was configured)
    /// overwrite caller claims of the same name.
    ///
    /// # Errors
    ///
    /// Fails only if the underlying cryptographic signature operation (or
    /// the serialization feeding it) fails; no partial token is returned.
    pub fn issue(&self, claims: &Claims, options: &IssueOptions) -> Result<String, SigningError> {
        let header = TokenHeader {
            typ: "JWT".to_string(),
            alg: self.key.algorithm().jwa_name().to_string(),
            kid: Some(self.key.key_id().to_string()),
        };

        let claims = finalize_claims(claims, options);
        let signing_input = encode_signing_input(&header, &claims)?;
        let signature = self.key.sign(signing_input.as_bytes())?;

        Ok(format!(
            "{signing_input}.{}",
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    /// Validates a presented token and returns its full claims map.
    ///
    /// The declared algorithm must be in `allowed`; the signature is then
    /// verified against the key's public half, and the optional `nbf`/`exp`
    /// claims are checked against the current time. A token whose `exp`
    /// equals the current second is already expired.
    ///
    /// # Errors
    ///
    /// Returns the specific [`TokenError`] kind for each failure mode.
    pub fn validate(
        &self,
        token: &str,
        allowed: &[SignatureAlgorithm],
    ) -> Result<Claims, TokenError> {
        let (signing_input, signature_b64) =
            token.rsplit_once('.').ok_or(TokenError::Malformed)?;
        let (header_b64, claims_b64) =
            signing_input.split_once('.').ok_or(TokenError::Malformed)?;

        let header_json = URL_SAFE_NO_PAD
            .decode(header_b64)
            .map_err(|_| TokenError::Malformed)?;
        let header: TokenHeader =
            serde_json::from_slice(&header_json).map_err(|_| TokenError::Malformed)?;

        // The allow-list is typed and cannot contain "none", so unsigned
        // tokens and unknown names fail here together with disallowed ones.
        let algorithm = SignatureAlgorithm::from_jwa(&header.alg)
            .ok()
            .filter(|alg| allowed.contains(alg))
            .ok_or_else(|| TokenError::AlgorithmNotAllowed(header.alg.clone()))?;

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::Malformed)?;
        self.key
            .verify(algorithm, signing_input.as_bytes(), &signature)
            .map_err(|_| TokenError::SignatureInvalid)?;

        let claims_json = URL_SAFE_NO_PAD
            .decode(claims_b64)
            .map_err(|_| TokenError::Malformed)?;
        let claims: Claims =
            serde_json::from_slice(&claims_json).map_err(|_| TokenError::Malformed)?;

        let now = Utc::now().timestamp();

        if let Some(nbf) = claims.get("nbf") {
            let nbf = nbf.as_i64().ok_or(TokenError::Malformed)?;
            if now < nbf {
                return Err(TokenError::NotYetValid);
            }
        }

        if let Some(exp) = claims.get("exp") {
            let exp = exp.as_i64().ok_or(TokenError::Malformed)?;
            if now >= exp {
                return Err(TokenError::Expired);
            }
        }

        Ok(claims)
    }
}

/// Issues an UNSIGNED token (`alg = "none"`, empty signature segment).
///
/// This exists for interoperability and testing only. It is deliberately a
/// separate entry point rather than a mode of [`TokenCodec::issue`]: a
/// strict authorization server must never select it, and tokens issued here
/// can never pass [`TokenCodec::validate`], whose typed allow-list cannot
/// express `"none"`.
///
/// # Errors
///
/// Fails only if claim serialization fails.
pub fn issue_unsigned(claims: &Claims, options: &IssueOptions) -> Result<String, SigningError> {
    let header = TokenHeader {
        typ: "JWT".to_string(),
        alg: "none".to_string(),
        kid: None,
    };

    let claims = finalize_claims(claims, options);
    let signing_input = encode_signing_input(&header, &claims)?;

    Ok(format!("{signing_input}."))
}

/// Merges the generated timing/identity claims into the caller's claims.
fn finalize_claims(claims: &Claims, options: &IssueOptions) -> Claims {
    let mut claims = claims.clone();
    let now = Utc::now();

    if options.jti_size > 0 {
        claims.insert(
            "jti".to_string(),
            Value::from(random_base64url(options.jti_size)),
        );
    }

    let not_before = options.not_before.unwrap_or(now);
    claims.insert("nbf".to_string(), Value::from(not_before.timestamp()));
    claims.insert("iat".to_string(), Value::from(now.timestamp()));

    if let Some(lifetime) = options.lifetime {
        claims.insert("exp".to_string(), Value::from((now + lifetime).timestamp()));
    } else if let Some(expires) = options.expires {
        claims.insert("exp".to_string(), Value::from(expires.timestamp()));
    }

    claims
}

/// Encodes the first two token segments, the input the signature covers.
fn encode_signing_input(header: &TokenHeader, claims: &Claims) -> Result<String, SigningError> {
    let header_json = serde_json::to_vec(header)?;
    let claims_json = serde_json::to_vec(claims)?;

    Ok(format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(claims_json)
    ))
}
