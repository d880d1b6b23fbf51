//! # op-model
//!
//! Domain model for the OpenID provider core: the [`Client`] record
//! (client id plus registered redirect URIs) and the redirect URI
//! authorization policy.
//!
//! The redirect policy decides whether a redirect target presented in a
//! live authorization request is one the client pre-registered. The base
//! of the URI must match exactly; query parameters are compared by a
//! two-directional subset rule with blank-value wildcards. See
//! [`redirect::is_authorized`].

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod client;
pub mod redirect;

pub use client::Client;
pub use redirect::is_authorized;
