//! # op-oidc
//!
//! `OpenID` Connect provider core.
//!
//! This crate holds the security-sensitive logic of the provider: issuing
//! and validating signed identity/access tokens, exposing the public key
//! set verifiers need, and the contract describing how authorization
//! answers travel back to clients. HTTP routing, sessions, consent UI and
//! persistence live outside; they hand a [`op_model::Client`] and the
//! active [`op_crypto::KeyMaterial`] into a [`ProviderContext`] and consume
//! the decisions and tokens it produces.
//!
//! ## Modules
//!
//! - [`answer`] - redirect-or-JSON delivery contract for response params
//! - [`discovery`] - `OpenID` Provider Metadata for the `.well-known` endpoint
//! - [`error`] - typed protocol and token errors
//! - [`jwks`] - JSON Web Key Set types and the key publisher
//! - [`provider`] - the explicitly constructed provider context
//! - [`token`] - token codec (issuance and validation)

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod answer;
pub mod discovery;
pub mod error;
pub mod jwks;
pub mod provider;
pub mod token;

pub use answer::{oauth_answer, OAuthAnswer};
pub use discovery::{ProviderMetadata, ProviderMetadataBuilder};
pub use error::{ErrorResponse, OidcError, OidcResult, SigningError, TokenError};
pub use jwks::{EcCurve, JsonWebKey, JsonWebKeySet, KeySetPublisher, KeyType};
pub use provider::{ProviderConfig, ProviderContext};
pub use token::{issue_unsigned, Claims, IssueOptions, TokenCodec, TokenHeader};
