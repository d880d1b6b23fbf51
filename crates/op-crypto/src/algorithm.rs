//! Signature and hash algorithm definitions.
//!
//! Algorithms are named by their JWA identifiers (RFC 7518). The unsigned
//! `"none"` pseudo-algorithm is deliberately not representable here; the
//! token layer models it separately so it can never enter an allow-list.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for algorithm operations.
#[derive(Debug, Error)]
pub enum AlgorithmError {
    /// Unknown algorithm name.
    #[error("unknown algorithm: {0}")]
    Unknown(String),

    /// Key size too small.
    #[error("key size {0} bits is below the minimum of {1} bits")]
    KeySizeTooSmall(u32, u32),
}

/// Hash algorithms used by the supported signature schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    /// SHA-256.
    #[serde(rename = "SHA256")]
    Sha256,

    /// SHA-384.
    #[serde(rename = "SHA384")]
    Sha384,

    /// SHA-512.
    #[serde(rename = "SHA512")]
    Sha512,
}

impl HashAlgorithm {
    /// Returns the output length in bytes.
    #[must_use]
    pub const fn output_len(self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Returns the algorithm name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
        }
    }
}

/// Asymmetric signature algorithms supported for token signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureAlgorithm {
    // RSA PKCS#1 v1.5 signatures
    /// RSA PKCS#1 v1.5 with SHA-256.
    #[serde(rename = "RS256")]
    Rs256,

    /// RSA PKCS#1 v1.5 with SHA-384.
    #[serde(rename = "RS384")]
    Rs384,

    /// RSA PKCS#1 v1.5 with SHA-512.
    #[serde(rename = "RS512")]
    Rs512,

    // RSA-PSS signatures
    /// RSA-PSS with SHA-256.
    #[serde(rename = "PS256")]
    Ps256,

    /// RSA-PSS with SHA-384.
    #[serde(rename = "PS384")]
    Ps384,

    /// RSA-PSS with SHA-512.
    #[serde(rename = "PS512")]
    Ps512,

    // ECDSA signatures
    /// ECDSA using P-256 curve and SHA-256 hash.
    #[serde(rename = "ES256")]
    Es256,

    /// ECDSA using P-384 curve and SHA-384 hash.
    #[serde(rename = "ES384")]
    Es384,

    /// ECDSA using P-521 curve and SHA-512 hash.
    #[serde(rename = "ES512")]
    Es512,
}

impl SignatureAlgorithm {
    /// Returns the JWA algorithm name.
    #[must_use]
    pub const fn jwa_name(self) -> &'static str {
        match self {
            Self::Rs256 => "RS256",
            Self::Rs384 => "RS384",
            Self::Rs512 => "RS512",
            Self::Ps256 => "PS256",
            Self::Ps384 => "PS384",
            Self::Ps512 => "PS512",
            Self::Es256 => "ES256",
            Self::Es384 => "ES384",
            Self::Es512 => "ES512",
        }
    }

    /// Returns the hash algorithm used by this signature algorithm.
    #[must_use]
    pub const fn hash_algorithm(self) -> HashAlgorithm {
        match self {
            Self::Rs256 | Self::Ps256 | Self::Es256 => HashAlgorithm::Sha256,
            Self::Rs384 | Self::Ps384 | Self::Es384 => HashAlgorithm::Sha384,
            Self::Rs512 | Self::Ps512 | Self::Es512 => HashAlgorithm::Sha512,
        }
    }

    /// Returns whether this is an RSA algorithm.
    #[must_use]
    pub const fn is_rsa(self) -> bool {
        matches!(
            self,
            Self::Rs256 | Self::Rs384 | Self::Rs512 | Self::Ps256 | Self::Ps384 | Self::Ps512
        )
    }

    /// Returns whether this is an ECDSA algorithm.
    #[must_use]
    pub const fn is_ecdsa(self) -> bool {
        matches!(self, Self::Es256 | Self::Es384 | Self::Es512)
    }

    /// Parses a JWA algorithm name.
    ///
    /// `"none"` is not an algorithm and is rejected like any other unknown
    /// name.
    ///
    /// ## Errors
    ///
    /// Returns an error if the name is unknown.
    pub fn from_jwa(name: &str) -> Result<Self, AlgorithmError> {
        match name {
            "RS256" => Ok(Self::Rs256),
            "RS384" => Ok(Self::Rs384),
            "RS512" => Ok(Self::Rs512),
            "PS256" => Ok(Self::Ps256),
            "PS384" => Ok(Self::Ps384),
            "PS512" => Ok(Self::Ps512),
            "ES256" => Ok(Self::Es256),
            "ES384" => Ok(Self::Es384),
            "ES512" => Ok(Self::Es512),
            _ => Err(AlgorithmError::Unknown(name.to_string())),
        }
    }

    /// Validates that an RSA key size meets the RFC 7518 minimum.
    ///
    /// ## Errors
    ///
    /// Returns an error if the key size is below 2048 bits.
    pub const fn validate_rsa_key_size(bits: u32) -> Result<(), AlgorithmError> {
        const MIN_RSA_BITS: u32 = 2048;

        if bits < MIN_RSA_BITS {
            return Err(AlgorithmError::KeySizeTooSmall(bits, MIN_RSA_BITS));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jwa_names_round_trip() {
        for alg in [
            SignatureAlgorithm::Rs256,
            SignatureAlgorithm::Rs384,
            SignatureAlgorithm::Rs512,
            SignatureAlgorithm::Ps256,
            SignatureAlgorithm::Ps384,
            SignatureAlgorithm::Ps512,
            SignatureAlgorithm::Es256,
            SignatureAlgorithm::Es384,
            SignatureAlgorithm::Es512,
        ] {
            assert_eq!(SignatureAlgorithm::from_jwa(alg.jwa_name()).unwrap(), alg);
        }
    }

    #[test]
    fn none_is_not_an_algorithm() {
        let result = SignatureAlgorithm::from_jwa("none");
        assert!(matches!(result, Err(AlgorithmError::Unknown(_))));
    }

    #[test]
    fn unknown_algorithm_is_rejected() {
        let result = SignatureAlgorithm::from_jwa("HS256");
        assert!(matches!(result, Err(AlgorithmError::Unknown(_))));
    }

    #[test]
    fn hash_algorithm_mapping() {
        assert_eq!(
            SignatureAlgorithm::Rs256.hash_algorithm(),
            HashAlgorithm::Sha256
        );
        assert_eq!(
            SignatureAlgorithm::Ps384.hash_algorithm(),
            HashAlgorithm::Sha384
        );
        assert_eq!(
            SignatureAlgorithm::Es512.hash_algorithm(),
            HashAlgorithm::Sha512
        );
    }

    #[test]
    fn rsa_1024_is_rejected() {
        let result = SignatureAlgorithm::validate_rsa_key_size(1024);
        assert!(matches!(
            result,
            Err(AlgorithmError::KeySizeTooSmall(1024, 2048))
        ));
    }

    #[test]
    fn rsa_2048_is_accepted() {
        assert!(SignatureAlgorithm::validate_rsa_key_size(2048).is_ok());
    }

    #[test]
    fn family_predicates() {
        assert!(SignatureAlgorithm::Ps512.is_rsa());
        assert!(!SignatureAlgorithm::Ps512.is_ecdsa());
        assert!(SignatureAlgorithm::Es256.is_ecdsa());
        assert!(!SignatureAlgorithm::Es256.is_rsa());
    }
}
