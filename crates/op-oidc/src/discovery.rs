//! Provider discovery metadata.
//!
//! The `.well-known/openid-configuration` document: endpoint locations and
//! capability lists, including the `jwks_uri` that points verifiers at the
//! published key set.

use serde::{Deserialize, Serialize};

use op_crypto::SignatureAlgorithm;

/// `OpenID` Provider Metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderMetadata {
    /// URL of the authorization server's issuer identifier.
    pub issuer: String,

    /// URL of the authorization endpoint.
    pub authorization_endpoint: String,

    /// URL of the token endpoint.
    pub token_endpoint: String,

    /// URL of the JSON Web Key Set document.
    pub jwks_uri: String,

    /// URL of the `UserInfo` endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub userinfo_endpoint: Option<String>,

    /// URL of the dynamic client registration endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_endpoint: Option<String>,

    /// List of supported scopes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scopes_supported: Option<Vec<String>>,

    /// List of supported response types.
    pub response_types_supported: Vec<String>,

    /// List of supported subject identifier types.
    pub subject_types_supported: Vec<String>,

    /// Signing algorithms supported for ID tokens.
    pub id_token_signing_alg_values_supported: Vec<String>,

    /// Signing algorithms supported for `UserInfo` responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub userinfo_signing_alg_values_supported: Option<Vec<String>>,

    /// Client authentication methods supported at the token endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_endpoint_auth_methods_supported: Option<Vec<String>>,

    /// Supported display values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_values_supported: Option<Vec<String>>,

    /// Supported claim types.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_types_supported: Option<Vec<String>>,

    /// Supported claims.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claims_supported: Option<Vec<String>>,

    /// Whether the `claims` request parameter is supported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claims_parameter_supported: Option<bool>,

    /// Supported UI locales.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui_locales_supported: Option<Vec<String>>,
}

/// Builder deriving the metadata document from the issuer URL.
///
/// Endpoints follow the provider's URL layout: `/openid/authorize`,
/// `/openid/token`, `/openid/userinfo`, `/openid/register` and
/// `/openid/jwks` under the issuer.
#[derive(Debug)]
pub struct ProviderMetadataBuilder {
    issuer: String,
    signing_algorithm: SignatureAlgorithm,
    scopes: Vec<String>,
    claims: Vec<String>,
    registration: bool,
}

impl ProviderMetadataBuilder {
    /// Creates a builder for the given issuer and token signing algorithm.
    #[must_use]
    pub fn new(issuer: &str, signing_algorithm: SignatureAlgorithm) -> Self {
        Self {
            issuer: issuer.trim_end_matches('/').to_string(),
            signing_algorithm,
            scopes: vec!["openid".to_string()],
            claims: vec![
                "iss".to_string(),
                "sub".to_string(),
                "aud".to_string(),
                "exp".to_string(),
                "iat".to_string(),
            ],
            registration: false,
        }
    }

    /// Adds supported scopes beyond `openid`.
    #[must_use]
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes.extend(scopes.into_iter().map(Into::into));
        self
    }

    /// Adds supported claims beyond the standard timing/identity set.
    #[must_use]
    pub fn with_claims<I, S>(mut self, claims: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.claims.extend(claims.into_iter().map(Into::into));
        self
    }

    /// Advertises the dynamic client registration endpoint.
    #[must_use]
    pub const fn with_registration(mut self) -> Self {
        self.registration = true;
        self
    }

    /// Builds the metadata document.
    #[must_use]
    pub fn build(self) -> ProviderMetadata {
        let endpoint = |path: &str| format!("{}/openid/{path}", self.issuer);
        let alg = self.signing_algorithm.jwa_name().to_string();

        ProviderMetadata {
            authorization_endpoint: endpoint("authorize"),
            token_endpoint: endpoint("token"),
            jwks_uri: endpoint("jwks"),
            userinfo_endpoint: Some(endpoint("userinfo")),
            registration_endpoint: self.registration.then(|| endpoint("register")),
            issuer: self.issuer,
            scopes_supported: Some(self.scopes),
            response_types_supported: vec!["code".to_string()],
            subject_types_supported: vec!["public".to_string(), "pairwise".to_string()],
            id_token_signing_alg_values_supported: vec![alg.clone()],
            userinfo_signing_alg_values_supported: Some(vec![alg]),
            token_endpoint_auth_methods_supported: Some(vec!["client_secret_basic".to_string()]),
            display_values_supported: Some(vec!["page".to_string()]),
            claim_types_supported: Some(vec!["normal".to_string()]),
            claims_supported: Some(self.claims),
            claims_parameter_supported: Some(false),
            ui_locales_supported: Some(vec!["en-US".to_string()]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_hang_off_the_issuer() {
        let metadata =
            ProviderMetadataBuilder::new("https://op.example/", SignatureAlgorithm::Rs256).build();

        assert_eq!(metadata.issuer, "https://op.example");
        assert_eq!(
            metadata.authorization_endpoint,
            "https://op.example/openid/authorize"
        );
        assert_eq!(metadata.token_endpoint, "https://op.example/openid/token");
        assert_eq!(metadata.jwks_uri, "https://op.example/openid/jwks");
        assert_eq!(metadata.registration_endpoint, None);
    }

    #[test]
    fn signing_algorithm_is_advertised() {
        let metadata =
            ProviderMetadataBuilder::new("https://op.example", SignatureAlgorithm::Es384).build();

        assert_eq!(
            metadata.id_token_signing_alg_values_supported,
            vec!["ES384"]
        );
    }

    #[test]
    fn scopes_and_registration_are_extensible() {
        let metadata = ProviderMetadataBuilder::new("https://op.example", SignatureAlgorithm::Rs256)
            .with_scopes(["profile", "email"])
            .with_registration()
            .build();

        let scopes = metadata.scopes_supported.unwrap();
        assert!(scopes.contains(&"openid".to_string()));
        assert!(scopes.contains(&"email".to_string()));
        assert_eq!(
            metadata.registration_endpoint.as_deref(),
            Some("https://op.example/openid/register")
        );
    }

    #[test]
    fn optional_members_are_omitted_from_json_when_absent() {
        let mut metadata =
            ProviderMetadataBuilder::new("https://op.example", SignatureAlgorithm::Rs256).build();
        metadata.userinfo_endpoint = None;

        let json = serde_json::to_string(&metadata).unwrap();
        assert!(!json.contains("userinfo_endpoint"));
        assert!(json.contains("\"response_types_supported\":[\"code\"]"));
    }
}
