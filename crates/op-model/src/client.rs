//! Client domain model.
//!
//! A client is an application that requests authentication from the
//! provider (an OAuth 2.0 / OIDC relying party). The core keeps only what
//! the authorization decision needs: the opaque client id and the ordered
//! list of registered redirect URIs.

use serde::{Deserialize, Serialize};

use crate::redirect;

/// An OIDC client record.
///
/// Authorization can only succeed for a client with at least one
/// registered redirect URI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// Unique client identifier (OAuth `client_id`).
    pub client_id: String,

    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Whether the client is enabled.
    pub enabled: bool,

    /// Registered redirect URIs, in registration order.
    pub redirect_uris: Vec<String>,
}

impl Client {
    /// Creates a new client with the given client ID.
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            name: None,
            enabled: true,
            redirect_uris: Vec::new(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Registers a redirect URI.
    #[must_use]
    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uris.push(uri.into());
        self
    }

    /// Registers redirect URIs from the whitespace-separated form used by
    /// admin tooling.
    #[must_use]
    pub fn with_redirect_uris_str(mut self, uris: &str) -> Self {
        self.redirect_uris
            .extend(uris.split_whitespace().map(ToString::to_string));
        self
    }

    /// Checks whether the presented redirect URI is registered for this
    /// client, per the policy in [`redirect::is_authorized`].
    #[must_use]
    pub fn check_redirect_uri(&self, uri: &str) -> bool {
        redirect::is_authorized(&self.redirect_uris, uri)
    }
}
