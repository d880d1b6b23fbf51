//! # op-crypto
//!
//! Cryptographic operations for the OpenID provider, built on aws-lc-rs.
//!
//! This crate owns the provider's signing key material: loading asymmetric
//! key pairs, deriving the stable key identifier published alongside issued
//! tokens, signing token payloads, and verifying presented signatures.
//!
//! ## Supported algorithms
//!
//! - RSA PKCS#1 v1.5: RS256, RS384, RS512
//! - RSA-PSS: PS256, PS384, PS512
//! - ECDSA: ES256 (P-256), ES384 (P-384), ES512 (P-521)
//!
//! RSA keys below 2048 bits are rejected.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod algorithm;
pub mod hash;
pub mod keys;
pub mod random;
pub mod signature;

pub use algorithm::{AlgorithmError, HashAlgorithm, SignatureAlgorithm};
pub use hash::{sha256, sha384, sha512};
pub use keys::{EcdsaSigningKey, KeyMaterial, RsaSigningKey};
pub use random::{random_base64url, random_bytes};
pub use signature::{KeyProvider, SignatureError, SignatureProvider};
