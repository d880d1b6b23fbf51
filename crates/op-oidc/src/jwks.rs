//! JSON Web Key Set exposure.
//!
//! The provider publishes the public half of its active signing key as a
//! JWKS document (RFC 7517), keyed by the same `kid` stamped into issued
//! token headers so verifiers can match tokens to keys.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use op_crypto::{KeyMaterial, SignatureError};

/// JSON Web Key Set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonWebKeySet {
    /// Array of JSON Web Keys.
    pub keys: Vec<JsonWebKey>,
}

impl JsonWebKeySet {
    /// Creates a new empty JWKS.
    #[must_use]
    pub const fn new() -> Self {
        Self { keys: Vec::new() }
    }

    /// Creates a JWKS with the given keys.
    #[must_use]
    pub const fn with_keys(keys: Vec<JsonWebKey>) -> Self {
        Self { keys }
    }

    /// Finds a key by its ID.
    #[must_use]
    pub fn find_key(&self, kid: &str) -> Option<&JsonWebKey> {
        self.keys.iter().find(|k| k.kid.as_deref() == Some(kid))
    }
}

impl Default for JsonWebKeySet {
    fn default() -> Self {
        Self::new()
    }
}

/// A public key descriptor in JWK format.
///
/// Only the publishable members this provider produces are modeled; private
/// key parameters are never part of this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonWebKey {
    /// Key type (e.g., "RSA", "EC").
    pub kty: KeyType,

    /// Public key use ("sig" for signature keys).
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,

    /// Algorithm intended for use with the key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,

    /// Key ID; matches the `kid` of issued token headers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,

    // === RSA parameters ===
    /// RSA modulus (base64url encoded).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,

    /// RSA exponent (base64url encoded).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,

    // === EC parameters ===
    /// EC curve name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crv: Option<EcCurve>,

    /// EC x coordinate (base64url encoded).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,

    /// EC y coordinate (base64url encoded).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}

impl JsonWebKey {
    /// Returns the key ID if present.
    #[must_use]
    pub fn key_id(&self) -> Option<&str> {
        self.kid.as_deref()
    }

    /// Returns the algorithm if present.
    #[must_use]
    pub fn algorithm(&self) -> Option<&str> {
        self.alg.as_deref()
    }

    /// Checks if this key is for signing.
    #[must_use]
    pub fn is_signing_key(&self) -> bool {
        self.key_use.as_deref() == Some("sig") || self.key_use.is_none()
    }
}

/// Key type for JWK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    /// RSA key.
    #[serde(rename = "RSA")]
    Rsa,

    /// Elliptic Curve key.
    #[serde(rename = "EC")]
    Ec,
}

/// Elliptic curve names for JWK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EcCurve {
    /// NIST P-256 curve.
    #[serde(rename = "P-256")]
    P256,

    /// NIST P-384 curve.
    #[serde(rename = "P-384")]
    P384,

    /// NIST P-521 curve.
    #[serde(rename = "P-521")]
    P521,
}

/// Publishes the provider's public key set.
///
/// Pure and read-only: the result reflects whatever key material is
/// currently active, and the descriptor's `kid` always equals the `kid`
/// used in issued tokens.
#[derive(Debug, Clone)]
pub struct KeySetPublisher {
    key: Arc<KeyMaterial>,
}

impl KeySetPublisher {
    /// Creates a publisher over the active key material.
    #[must_use]
    pub fn new(key: Arc<KeyMaterial>) -> Self {
        Self { key }
    }

    /// Returns the publishable key set for the discovery endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the public key cannot be serialized.
    pub fn public_key_set(&self) -> Result<JsonWebKeySet, SignatureError> {
        let jwk: JsonWebKey = serde_json::from_value(self.key.public_key_jwk()?)
            .map_err(|e| SignatureError::InvalidKey(format!("unpublishable key: {e}")))?;

        Ok(JsonWebKeySet::with_keys(vec![jwk]))
    }
}
