//! Provider context: explicitly constructed, explicitly passed.
//!
//! Key material and the client table are built once at process start and
//! injected here; everything that needs them receives this context (or the
//! specific collaborator) through its call signature. There is no ambient
//! singleton and no lazy lookup.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;

use op_crypto::{KeyMaterial, SignatureAlgorithm};
use op_model::Client;

use crate::discovery::{ProviderMetadata, ProviderMetadataBuilder};
use crate::error::{OidcError, OidcResult};
use crate::jwks::{JsonWebKeySet, KeySetPublisher};
use crate::token::{Claims, IssueOptions, TokenCodec};

/// Provider configuration.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Issuer URL published in discovery metadata.
    pub issuer: String,

    /// Access token lifetime in seconds. ID tokens expire together with
    /// the access token they accompany.
    pub access_token_lifetime: i64,

    /// Refresh token lifetime in seconds.
    pub refresh_token_lifetime: i64,

    /// Algorithms accepted when validating presented tokens. When left
    /// empty, the active key's own algorithm is used.
    pub allowed_algorithms: Vec<SignatureAlgorithm>,
}

impl ProviderConfig {
    /// Creates a configuration with the default token lifetimes
    /// (access: 1 hour, refresh: 10 hours).
    #[must_use]
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            access_token_lifetime: 3_600,
            refresh_token_lifetime: 36_000,
            allowed_algorithms: Vec::new(),
        }
    }

    /// Sets the access token lifetime in seconds.
    #[must_use]
    pub const fn with_access_token_lifetime(mut self, seconds: i64) -> Self {
        self.access_token_lifetime = seconds;
        self
    }

    /// Sets the refresh token lifetime in seconds.
    #[must_use]
    pub const fn with_refresh_token_lifetime(mut self, seconds: i64) -> Self {
        self.refresh_token_lifetime = seconds;
        self
    }
}

/// The assembled provider core.
///
/// Holds the immutable key snapshot, the client table, and the token codec
/// and key publisher built around the same key. All operations are
/// synchronous; concurrent calls need no coordination because nothing here
/// mutates after construction. Rotating the key means building a new
/// context around the new `Arc<KeyMaterial>` snapshot.
#[derive(Debug)]
pub struct ProviderContext {
    config: ProviderConfig,
    key: Arc<KeyMaterial>,
    clients: HashMap<String, Client>,
    codec: TokenCodec,
    publisher: KeySetPublisher,
}

impl ProviderContext {
    /// Assembles the provider from its collaborators.
    #[must_use]
    pub fn new(
        mut config: ProviderConfig,
        key: Arc<KeyMaterial>,
        clients: impl IntoIterator<Item = Client>,
    ) -> Self {
        if config.allowed_algorithms.is_empty() {
            config.allowed_algorithms.push(key.algorithm());
        }

        let clients = clients
            .into_iter()
            .map(|client| (client.client_id.clone(), client))
            .collect();

        Self {
            config,
            codec: TokenCodec::new(Arc::clone(&key)),
            publisher: KeySetPublisher::new(Arc::clone(&key)),
            key,
            clients,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Returns the active key material.
    #[must_use]
    pub fn key(&self) -> &KeyMaterial {
        &self.key
    }

    /// Returns the token codec.
    #[must_use]
    pub const fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Looks up a client by its id.
    #[must_use]
    pub fn client(&self, client_id: &str) -> Option<&Client> {
        self.clients.get(client_id)
    }

    /// Checks that the presented redirect URI is registered for the client.
    ///
    /// # Errors
    ///
    /// Returns `InvalidClient` for unknown or disabled clients and
    /// `InvalidRedirect` when the URI fails the redirect policy. The caller
    /// must not redirect to the rejected URI, and the error never carries
    /// it.
    pub fn authorize_redirect(&self, client_id: &str, redirect_uri: &str) -> OidcResult<()> {
        let client = self
            .client(client_id)
            .ok_or_else(|| OidcError::InvalidClient(format!("unknown client '{client_id}'")))?;

        if !client.enabled {
            return Err(OidcError::InvalidClient(format!(
                "client '{client_id}' is disabled"
            )));
        }

        if client.check_redirect_uri(redirect_uri) {
            Ok(())
        } else {
            tracing::debug!(client_id, "rejected unregistered redirect URI");
            Err(OidcError::InvalidRedirect(client_id.to_string()))
        }
    }

    /// Issues an access token with the configured lifetime.
    ///
    /// # Errors
    ///
    /// Fails only if signing fails.
    pub fn issue_access_token(&self, claims: &Claims) -> OidcResult<String> {
        let options =
            IssueOptions::new().with_lifetime(Duration::seconds(self.config.access_token_lifetime));
        Ok(self.codec.issue(claims, &options)?)
    }

    /// Issues a refresh token with the configured lifetime.
    ///
    /// # Errors
    ///
    /// Fails only if signing fails.
    pub fn issue_refresh_token(&self, claims: &Claims) -> OidcResult<String> {
        let options = IssueOptions::new()
            .with_lifetime(Duration::seconds(self.config.refresh_token_lifetime));
        Ok(self.codec.issue(claims, &options)?)
    }

    /// Issues an ID token expiring together with its access token.
    ///
    /// # Errors
    ///
    /// Fails only if signing fails.
    pub fn issue_id_token(&self, claims: &Claims) -> OidcResult<String> {
        let options =
            IssueOptions::new().with_lifetime(Duration::seconds(self.config.access_token_lifetime));
        Ok(self.codec.issue(claims, &options)?)
    }

    /// Validates a presented token against the configured allow-list.
    ///
    /// # Errors
    ///
    /// Returns the specific validation failure, wrapped for the protocol
    /// layer.
    pub fn validate_token(&self, token: &str) -> OidcResult<Claims> {
        Ok(self
            .codec
            .validate(token, &self.config.allowed_algorithms)?)
    }

    /// Returns the publishable key set.
    ///
    /// # Errors
    ///
    /// Returns an error if the public key cannot be serialized.
    pub fn public_key_set(&self) -> OidcResult<JsonWebKeySet> {
        self.publisher
            .public_key_set()
            .map_err(|e| OidcError::Internal(e.to_string()))
    }

    /// Builds the discovery metadata document.
    #[must_use]
    pub fn metadata(&self) -> ProviderMetadata {
        ProviderMetadataBuilder::new(&self.config.issuer, self.key.algorithm()).build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use op_crypto::EcdsaSigningKey;

    fn test_context() -> ProviderContext {
        let key = KeyMaterial::from(EcdsaSigningKey::generate(SignatureAlgorithm::Es256).unwrap());
        let client = Client::new("web-app")
            .with_redirect_uri("https://app.example/cb")
            .with_redirect_uri("https://app.example/alt?scope=");

        ProviderContext::new(
            ProviderConfig::new("https://op.example"),
            Arc::new(key),
            [client],
        )
    }

    #[test]
    fn config_defaults() {
        let config = ProviderConfig::new("https://op.example");
        assert_eq!(config.access_token_lifetime, 3_600);
        assert_eq!(config.refresh_token_lifetime, 36_000);
    }

    #[test]
    fn allowed_algorithms_default_to_the_active_key() {
        let context = test_context();
        assert_eq!(
            context.config().allowed_algorithms,
            vec![SignatureAlgorithm::Es256]
        );
    }

    #[test]
    fn registered_redirect_is_authorized() {
        let context = test_context();
        assert!(context
            .authorize_redirect("web-app", "https://app.example/cb")
            .is_ok());
    }

    #[test]
    fn unregistered_redirect_is_rejected_without_leaking_it() {
        let context = test_context();
        let err = context
            .authorize_redirect("web-app", "https://evil.example/cb")
            .unwrap_err();
        assert!(matches!(err, OidcError::InvalidRedirect(_)));
        assert!(!err.to_string().contains("evil.example"));
    }

    #[test]
    fn unknown_client_is_rejected() {
        let context = test_context();
        let err = context
            .authorize_redirect("nobody", "https://app.example/cb")
            .unwrap_err();
        assert!(matches!(err, OidcError::InvalidClient(_)));
    }

    #[test]
    fn disabled_client_is_rejected() {
        let key = KeyMaterial::from(EcdsaSigningKey::generate(SignatureAlgorithm::Es256).unwrap());
        let mut client = Client::new("web-app").with_redirect_uri("https://app.example/cb");
        client.enabled = false;

        let context = ProviderContext::new(
            ProviderConfig::new("https://op.example"),
            Arc::new(key),
            [client],
        );

        let err = context
            .authorize_redirect("web-app", "https://app.example/cb")
            .unwrap_err();
        assert!(matches!(err, OidcError::InvalidClient(_)));
    }

    #[test]
    fn issued_access_token_validates_with_configured_lifetime() {
        let context = test_context();
        let mut claims = Claims::new();
        claims.insert("sub".to_string(), serde_json::Value::from("alice"));

        let token = context.issue_access_token(&claims).unwrap();
        let validated = context.validate_token(&token).unwrap();

        let iat = validated["iat"].as_i64().unwrap();
        let exp = validated["exp"].as_i64().unwrap();
        assert_eq!(exp - iat, 3_600);
    }

    #[test]
    fn jwks_kid_matches_the_signing_key() {
        let context = test_context();
        let jwks = context.public_key_set().unwrap();
        assert!(jwks.find_key(context.key().key_id()).is_some());
    }

    #[test]
    fn metadata_points_at_the_issuer() {
        let context = test_context();
        let metadata = context.metadata();
        assert_eq!(metadata.issuer, "https://op.example");
        assert_eq!(metadata.jwks_uri, "https://op.example/openid/jwks");
    }
}
