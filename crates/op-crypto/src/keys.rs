//! Signing key material and key identifiers.
//!
//! A provider instance holds exactly one active [`KeyMaterial`] at a time.
//! The key identifier is the RFC 7638 JWK thumbprint of the public half:
//! the same key always produces the same `kid` across process restarts, and
//! rotating the key changes the `kid` automatically.

use aws_lc_rs::{
    rand::SystemRandom,
    signature::{
        self, EcdsaKeyPair, KeyPair, RsaKeyPair, ECDSA_P256_SHA256_FIXED_SIGNING,
        ECDSA_P384_SHA384_FIXED_SIGNING, ECDSA_P521_SHA512_FIXED_SIGNING,
    },
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::algorithm::SignatureAlgorithm;
use crate::signature::{KeyProvider, SignatureError, SignatureProvider};

/// RSA key pair for signing and verification.
///
/// Supports PKCS#1 v1.5 and PSS padding schemes.
pub struct RsaSigningKey {
    key_pair: RsaKeyPair,
    key_id: String,
    algorithm: SignatureAlgorithm,
}

impl RsaSigningKey {
    /// Creates a new RSA signing key from a PKCS#8 DER-encoded private key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid, too small, or the algorithm
    /// is not RSA-based.
    pub fn from_pkcs8(
        pkcs8_der: &[u8],
        algorithm: SignatureAlgorithm,
    ) -> Result<Self, SignatureError> {
        let key_pair = RsaKeyPair::from_pkcs8(pkcs8_der)
            .map_err(|e| SignatureError::InvalidKey(format!("invalid RSA PKCS#8 key: {e}")))?;
        Self::from_key_pair(key_pair, algorithm)
    }

    /// Creates a new RSA signing key from a DER-encoded `RSAPrivateKey`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid, too small, or the algorithm
    /// is not RSA-based.
    pub fn from_der(der: &[u8], algorithm: SignatureAlgorithm) -> Result<Self, SignatureError> {
        let key_pair = RsaKeyPair::from_der(der)
            .map_err(|e| SignatureError::InvalidKey(format!("invalid RSA DER key: {e}")))?;
        Self::from_key_pair(key_pair, algorithm)
    }

    fn from_key_pair(
        key_pair: RsaKeyPair,
        algorithm: SignatureAlgorithm,
    ) -> Result<Self, SignatureError> {
        if !algorithm.is_rsa() {
            return Err(SignatureError::UnsupportedAlgorithm(format!(
                "{} is not an RSA algorithm",
                algorithm.jwa_name()
            )));
        }

        #[allow(clippy::cast_possible_truncation)]
        let key_bits = (key_pair.public_modulus_len() * 8) as u32;
        SignatureAlgorithm::validate_rsa_key_size(key_bits)
            .map_err(|e| SignatureError::InvalidKey(e.to_string()))?;

        let (n, e) = parse_rsa_public_key(key_pair.public_key().as_ref())?;
        let key_id = rsa_thumbprint(&n, &e);

        Ok(Self {
            key_pair,
            key_id,
            algorithm,
        })
    }

    /// Returns the key ID.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Returns the signature algorithm.
    #[must_use]
    pub const fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    /// Signs the given data.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails.
    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>, SignatureError> {
        let rng = SystemRandom::new();
        let mut sig = vec![0u8; self.key_pair.public_modulus_len()];

        let padding: &'static dyn signature::RsaEncoding = match self.algorithm {
            SignatureAlgorithm::Rs256 => &signature::RSA_PKCS1_SHA256,
            SignatureAlgorithm::Rs384 => &signature::RSA_PKCS1_SHA384,
            SignatureAlgorithm::Rs512 => &signature::RSA_PKCS1_SHA512,
            SignatureAlgorithm::Ps256 => &signature::RSA_PSS_SHA256,
            SignatureAlgorithm::Ps384 => &signature::RSA_PSS_SHA384,
            SignatureAlgorithm::Ps512 => &signature::RSA_PSS_SHA512,
            _ => {
                return Err(SignatureError::UnsupportedAlgorithm(format!(
                    "{} not supported for RSA signing",
                    self.algorithm.jwa_name()
                )));
            }
        };

        self.key_pair
            .sign(padding, &rng, data, &mut sig)
            .map_err(|e| SignatureError::Signing(format!("RSA signing failed: {e}")))?;

        Ok(sig)
    }

    /// Verifies a signature against the public half of this key.
    ///
    /// The algorithm is the one declared by the presented token, which the
    /// caller has already checked against its allow-list.
    ///
    /// # Errors
    ///
    /// Returns an error if the signature does not verify.
    pub fn verify(
        &self,
        algorithm: SignatureAlgorithm,
        data: &[u8],
        sig: &[u8],
    ) -> Result<(), SignatureError> {
        let params: &'static dyn signature::VerificationAlgorithm = match algorithm {
            SignatureAlgorithm::Rs256 => &signature::RSA_PKCS1_2048_8192_SHA256,
            SignatureAlgorithm::Rs384 => &signature::RSA_PKCS1_2048_8192_SHA384,
            SignatureAlgorithm::Rs512 => &signature::RSA_PKCS1_2048_8192_SHA512,
            SignatureAlgorithm::Ps256 => &signature::RSA_PSS_2048_8192_SHA256,
            SignatureAlgorithm::Ps384 => &signature::RSA_PSS_2048_8192_SHA384,
            SignatureAlgorithm::Ps512 => &signature::RSA_PSS_2048_8192_SHA512,
            _ => {
                return Err(SignatureError::UnsupportedAlgorithm(format!(
                    "{} does not fit an RSA key",
                    algorithm.jwa_name()
                )));
            }
        };

        signature::UnparsedPublicKey::new(params, self.key_pair.public_key().as_ref())
            .verify(data, sig)
            .map_err(|_| SignatureError::Verification)
    }

    /// Returns the public key in JWK format.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be serialized.
    pub fn public_key_jwk(&self) -> Result<serde_json::Value, SignatureError> {
        let (n, e) = parse_rsa_public_key(self.key_pair.public_key().as_ref())?;

        Ok(serde_json::json!({
            "kty": "RSA",
            "kid": self.key_id,
            "use": "sig",
            "alg": self.algorithm.jwa_name(),
            "n": URL_SAFE_NO_PAD.encode(&n),
            "e": URL_SAFE_NO_PAD.encode(&e),
        }))
    }
}

impl std::fmt::Debug for RsaSigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaSigningKey")
            .field("key_id", &self.key_id)
            .field("algorithm", &self.algorithm)
            .field("key_pair", &"[REDACTED]")
            .finish()
    }
}

/// ECDSA key pair for signing and verification.
///
/// Signatures use the fixed-width (r || s) form required by JWS.
pub struct EcdsaSigningKey {
    key_pair: EcdsaKeyPair,
    key_id: String,
    algorithm: SignatureAlgorithm,
}

impl EcdsaSigningKey {
    /// Creates a new ECDSA signing key from a PKCS#8 DER-encoded private key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the algorithm is not
    /// ECDSA-based.
    pub fn from_pkcs8(
        pkcs8_der: &[u8],
        algorithm: SignatureAlgorithm,
    ) -> Result<Self, SignatureError> {
        let signing_alg = ecdsa_signing_params(algorithm)?;

        let key_pair = EcdsaKeyPair::from_pkcs8(signing_alg, pkcs8_der)
            .map_err(|e| SignatureError::InvalidKey(format!("invalid ECDSA PKCS#8 key: {e}")))?;

        let (x, y, crv) = parse_ec_public_point(key_pair.public_key().as_ref(), algorithm)?;
        let key_id = ec_thumbprint(crv, &x, &y);

        Ok(Self {
            key_pair,
            key_id,
            algorithm,
        })
    }

    /// Generates a fresh ECDSA signing key.
    ///
    /// # Errors
    ///
    /// Returns an error if key generation fails or the algorithm is not
    /// ECDSA-based.
    pub fn generate(algorithm: SignatureAlgorithm) -> Result<Self, SignatureError> {
        let signing_alg = ecdsa_signing_params(algorithm)?;
        let rng = SystemRandom::new();

        let document = EcdsaKeyPair::generate_pkcs8(signing_alg, &rng)
            .map_err(|e| SignatureError::KeyGeneration(format!("ECDSA generation failed: {e}")))?;

        Self::from_pkcs8(document.as_ref(), algorithm)
    }

    /// Returns the key ID.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Returns the signature algorithm.
    #[must_use]
    pub const fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    /// Signs the given data.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails.
    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>, SignatureError> {
        let rng = SystemRandom::new();

        let sig = self
            .key_pair
            .sign(&rng, data)
            .map_err(|e| SignatureError::Signing(format!("ECDSA signing failed: {e}")))?;

        Ok(sig.as_ref().to_vec())
    }

    /// Verifies a signature against the public half of this key.
    ///
    /// # Errors
    ///
    /// Returns an error if the signature does not verify.
    pub fn verify(
        &self,
        algorithm: SignatureAlgorithm,
        data: &[u8],
        sig: &[u8],
    ) -> Result<(), SignatureError> {
        let params: &'static dyn signature::VerificationAlgorithm = match algorithm {
            SignatureAlgorithm::Es256 => &signature::ECDSA_P256_SHA256_FIXED,
            SignatureAlgorithm::Es384 => &signature::ECDSA_P384_SHA384_FIXED,
            SignatureAlgorithm::Es512 => &signature::ECDSA_P521_SHA512_FIXED,
            _ => {
                return Err(SignatureError::UnsupportedAlgorithm(format!(
                    "{} does not fit an ECDSA key",
                    algorithm.jwa_name()
                )));
            }
        };

        signature::UnparsedPublicKey::new(params, self.key_pair.public_key().as_ref())
            .verify(data, sig)
            .map_err(|_| SignatureError::Verification)
    }

    /// Returns the public key in JWK format.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be serialized.
    pub fn public_key_jwk(&self) -> Result<serde_json::Value, SignatureError> {
        let (x, y, crv) = parse_ec_public_point(self.key_pair.public_key().as_ref(), self.algorithm)?;

        Ok(serde_json::json!({
            "kty": "EC",
            "kid": self.key_id,
            "use": "sig",
            "alg": self.algorithm.jwa_name(),
            "crv": crv,
            "x": URL_SAFE_NO_PAD.encode(&x),
            "y": URL_SAFE_NO_PAD.encode(&y),
        }))
    }
}

impl std::fmt::Debug for EcdsaSigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcdsaSigningKey")
            .field("key_id", &self.key_id)
            .field("algorithm", &self.algorithm)
            .field("key_pair", &"[REDACTED]")
            .finish()
    }
}

/// The provider's active signing key.
///
/// Read-only after load; rotation swaps the whole value behind an `Arc`
/// rather than mutating it in place.
#[derive(Debug)]
pub enum KeyMaterial {
    /// RSA key pair.
    Rsa(RsaSigningKey),
    /// ECDSA key pair.
    Ecdsa(EcdsaSigningKey),
}

impl KeyMaterial {
    /// Returns the key ID.
    #[must_use]
    pub fn key_id(&self) -> &str {
        match self {
            Self::Rsa(key) => key.key_id(),
            Self::Ecdsa(key) => key.key_id(),
        }
    }

    /// Returns the signature algorithm the key signs with.
    #[must_use]
    pub const fn algorithm(&self) -> SignatureAlgorithm {
        match self {
            Self::Rsa(key) => key.algorithm(),
            Self::Ecdsa(key) => key.algorithm(),
        }
    }

    /// Signs the given data with the key's own algorithm.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails.
    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>, SignatureError> {
        match self {
            Self::Rsa(key) => key.sign(data),
            Self::Ecdsa(key) => key.sign(data),
        }
    }

    /// Verifies a signature using the declared algorithm.
    ///
    /// # Errors
    ///
    /// Returns an error if the signature does not verify or the algorithm
    /// does not fit the key.
    pub fn verify(
        &self,
        algorithm: SignatureAlgorithm,
        data: &[u8],
        sig: &[u8],
    ) -> Result<(), SignatureError> {
        match self {
            Self::Rsa(key) => key.verify(algorithm, data, sig),
            Self::Ecdsa(key) => key.verify(algorithm, data, sig),
        }
    }

    /// Returns the public key in JWK format.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be serialized.
    pub fn public_key_jwk(&self) -> Result<serde_json::Value, SignatureError> {
        match self {
            Self::Rsa(key) => key.public_key_jwk(),
            Self::Ecdsa(key) => key.public_key_jwk(),
        }
    }
}

impl From<RsaSigningKey> for KeyMaterial {
    fn from(key: RsaSigningKey) -> Self {
        Self::Rsa(key)
    }
}

impl From<EcdsaSigningKey> for KeyMaterial {
    fn from(key: EcdsaSigningKey) -> Self {
        Self::Ecdsa(key)
    }
}

impl SignatureProvider for KeyMaterial {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, SignatureError> {
        Self::sign(self, data)
    }

    fn verify(
        &self,
        algorithm: SignatureAlgorithm,
        data: &[u8],
        signature: &[u8],
    ) -> Result<(), SignatureError> {
        Self::verify(self, algorithm, data, signature)
    }

    fn algorithm(&self) -> SignatureAlgorithm {
        Self::algorithm(self)
    }
}

impl KeyProvider for KeyMaterial {
    fn key_id(&self) -> &str {
        Self::key_id(self)
    }

    fn algorithm(&self) -> SignatureAlgorithm {
        Self::algorithm(self)
    }

    fn public_key_jwk(&self) -> Result<serde_json::Value, SignatureError> {
        Self::public_key_jwk(self)
    }
}

fn ecdsa_signing_params(
    algorithm: SignatureAlgorithm,
) -> Result<&'static signature::EcdsaSigningAlgorithm, SignatureError> {
    match algorithm {
        SignatureAlgorithm::Es256 => Ok(&ECDSA_P256_SHA256_FIXED_SIGNING),
        SignatureAlgorithm::Es384 => Ok(&ECDSA_P384_SHA384_FIXED_SIGNING),
        SignatureAlgorithm::Es512 => Ok(&ECDSA_P521_SHA512_FIXED_SIGNING),
        _ => Err(SignatureError::UnsupportedAlgorithm(format!(
            "{} is not an ECDSA algorithm",
            algorithm.jwa_name()
        ))),
    }
}

/// Computes the RFC 7638 thumbprint of an RSA public key.
///
/// The required members (`e`, `kty`, `n`) are serialized in lexicographic
/// order with no whitespace, hashed with SHA-256, and base64url encoded.
fn rsa_thumbprint(n: &[u8], e: &[u8]) -> String {
    let canonical = format!(
        r#"{{"e":"{}","kty":"RSA","n":"{}"}}"#,
        URL_SAFE_NO_PAD.encode(e),
        URL_SAFE_NO_PAD.encode(n),
    );
    URL_SAFE_NO_PAD.encode(crate::sha256(canonical.as_bytes()))
}

/// Computes the RFC 7638 thumbprint of an EC public key.
fn ec_thumbprint(crv: &str, x: &[u8], y: &[u8]) -> String {
    let canonical = format!(
        r#"{{"crv":"{crv}","kty":"EC","x":"{}","y":"{}"}}"#,
        URL_SAFE_NO_PAD.encode(x),
        URL_SAFE_NO_PAD.encode(y),
    );
    URL_SAFE_NO_PAD.encode(crate::sha256(canonical.as_bytes()))
}

/// Parses modulus (n) and exponent (e) out of a DER-encoded `RSAPublicKey`.
///
/// `RSAPublicKey ::= SEQUENCE { modulus INTEGER, publicExponent INTEGER }`
fn parse_rsa_public_key(der: &[u8]) -> Result<(Vec<u8>, Vec<u8>), SignatureError> {
    let mut pos = 0;

    if der.get(pos) != Some(&0x30) {
        return Err(SignatureError::InvalidKey(
            "invalid RSAPublicKey: expected SEQUENCE".to_string(),
        ));
    }
    pos += 1;
    pos = skip_length(der, pos)?;

    let (n, next) = read_integer(der, pos)?;
    let (e, _) = read_integer(der, next)?;

    Ok((n, e))
}

/// Reads an ASN.1 INTEGER at `pos`, stripping the sign padding byte.
///
/// Returns the integer bytes and the position after the value.
fn read_integer(der: &[u8], mut pos: usize) -> Result<(Vec<u8>, usize), SignatureError> {
    if der.get(pos) != Some(&0x02) {
        return Err(SignatureError::InvalidKey(
            "invalid RSAPublicKey: expected INTEGER".to_string(),
        ));
    }
    pos += 1;
    let len = read_length(der, pos)?;
    pos = skip_length(der, pos)?;

    let end = pos + len;
    if der.len() < end {
        return Err(SignatureError::InvalidKey(
            "invalid RSAPublicKey: truncated INTEGER".to_string(),
        ));
    }

    let mut value = der[pos..end].to_vec();
    if value.first() == Some(&0) {
        value.remove(0);
    }

    Ok((value, end))
}

/// Splits an uncompressed EC point (`0x04 || x || y`) into coordinates.
fn parse_ec_public_point(
    point: &[u8],
    algorithm: SignatureAlgorithm,
) -> Result<(Vec<u8>, Vec<u8>, &'static str), SignatureError> {
    let (coord_size, crv) = match algorithm {
        SignatureAlgorithm::Es256 => (32, "P-256"),
        SignatureAlgorithm::Es384 => (48, "P-384"),
        SignatureAlgorithm::Es512 => (66, "P-521"),
        _ => {
            return Err(SignatureError::UnsupportedAlgorithm(format!(
                "{} is not an ECDSA algorithm",
                algorithm.jwa_name()
            )));
        }
    };

    if point.first() != Some(&0x04) || point.len() != 1 + coord_size * 2 {
        return Err(SignatureError::InvalidKey(
            "EC public key is not an uncompressed point".to_string(),
        ));
    }

    let x = point[1..=coord_size].to_vec();
    let y = point[1 + coord_size..].to_vec();

    Ok((x, y, crv))
}

/// Reads an ASN.1 length field and returns the length value.
fn read_length(data: &[u8], pos: usize) -> Result<usize, SignatureError> {
    let first = *data
        .get(pos)
        .ok_or_else(|| SignatureError::InvalidKey("unexpected end of data".to_string()))?;

    if first < 0x80 {
        Ok(first as usize)
    } else {
        let num_bytes = (first & 0x7F) as usize;
        if num_bytes > 4 {
            return Err(SignatureError::InvalidKey("length too large".to_string()));
        }
        let mut len = 0usize;
        for i in 0..num_bytes {
            let byte = *data
                .get(pos + 1 + i)
                .ok_or_else(|| SignatureError::InvalidKey("unexpected end of length".to_string()))?;
            len = (len << 8) | (byte as usize);
        }
        Ok(len)
    }
}

/// Skips an ASN.1 length field and returns the new position.
fn skip_length(data: &[u8], pos: usize) -> Result<usize, SignatureError> {
    let first = *data
        .get(pos)
        .ok_or_else(|| SignatureError::InvalidKey("unexpected end of data".to_string()))?;

    if first < 0x80 {
        Ok(pos + 1)
    } else {
        let num_bytes = (first & 0x7F) as usize;
        Ok(pos + 1 + num_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_key_signs_and_verifies() {
        let key = EcdsaSigningKey::generate(SignatureAlgorithm::Es256).unwrap();
        let sig = key.sign(b"payload").unwrap();
        assert!(key.verify(SignatureAlgorithm::Es256, b"payload", &sig).is_ok());
    }

    #[test]
    fn tampered_data_fails_verification() {
        let key = EcdsaSigningKey::generate(SignatureAlgorithm::Es256).unwrap();
        let sig = key.sign(b"payload").unwrap();
        let result = key.verify(SignatureAlgorithm::Es256, b"payload2", &sig);
        assert!(matches!(result, Err(SignatureError::Verification)));
    }

    #[test]
    fn key_id_is_stable_for_the_same_key() {
        let signing_alg = &ECDSA_P256_SHA256_FIXED_SIGNING;
        let rng = SystemRandom::new();
        let document = EcdsaKeyPair::generate_pkcs8(signing_alg, &rng).unwrap();

        let a = EcdsaSigningKey::from_pkcs8(document.as_ref(), SignatureAlgorithm::Es256).unwrap();
        let b = EcdsaSigningKey::from_pkcs8(document.as_ref(), SignatureAlgorithm::Es256).unwrap();
        assert_eq!(a.key_id(), b.key_id());
        assert!(!a.key_id().is_empty());
    }

    #[test]
    fn different_keys_get_different_ids() {
        let a = EcdsaSigningKey::generate(SignatureAlgorithm::Es256).unwrap();
        let b = EcdsaSigningKey::generate(SignatureAlgorithm::Es256).unwrap();
        assert_ne!(a.key_id(), b.key_id());
    }

    #[test]
    fn public_key_jwk_carries_kid_and_curve() {
        let key = EcdsaSigningKey::generate(SignatureAlgorithm::Es384).unwrap();
        let jwk = key.public_key_jwk().unwrap();
        assert_eq!(jwk["kty"], "EC");
        assert_eq!(jwk["crv"], "P-384");
        assert_eq!(jwk["alg"], "ES384");
        assert_eq!(jwk["kid"], key.key_id());
        assert!(jwk["x"].is_string());
        assert!(jwk["y"].is_string());
    }

    #[test]
    fn rsa_key_rejects_ecdsa_algorithm() {
        let result = RsaSigningKey::from_pkcs8(&[], SignatureAlgorithm::Es384);
        assert!(result.is_err());
    }

    #[test]
    fn ecdsa_key_rejects_rsa_algorithm() {
        let result = EcdsaSigningKey::from_pkcs8(&[], SignatureAlgorithm::Rs256);
        assert!(matches!(
            result,
            Err(SignatureError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn verify_with_wrong_family_is_rejected() {
        let key = KeyMaterial::from(EcdsaSigningKey::generate(SignatureAlgorithm::Es256).unwrap());
        let sig = key.sign(b"payload").unwrap();
        let result = key.verify(SignatureAlgorithm::Rs256, b"payload", &sig);
        assert!(matches!(
            result,
            Err(SignatureError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn rsa_public_key_parser_reads_n_and_e() {
        // Minimal RSAPublicKey: SEQUENCE { INTEGER 0x00BC, INTEGER 0x010001 }
        let der = [
            0x30, 0x09, 0x02, 0x02, 0x00, 0xBC, 0x02, 0x03, 0x01, 0x00, 0x01,
        ];
        let (n, e) = parse_rsa_public_key(&der).unwrap();
        assert_eq!(n, vec![0xBC]);
        assert_eq!(e, vec![0x01, 0x00, 0x01]);
    }
}
