//! OAuth answer contract.
//!
//! Decides how the HTTP layer should deliver a set of response parameters:
//! as a redirect to an approved target with the parameters appended to its
//! query string, or as a JSON body when no redirect target may be used.
//! This module produces values only; rendering them as actual HTTP
//! responses is the transport layer's job.

use serde_json::{Map, Value};

/// How a set of response parameters should be delivered.
#[derive(Debug, Clone, PartialEq)]
pub enum OAuthAnswer {
    /// HTTP redirect to the given URL (already carrying the parameters).
    Redirect(String),

    /// JSON body with the given status code.
    Json {
        /// HTTP status: 400 when the parameters carry an `error`, else 200.
        status: u16,
        /// Response parameters as a JSON object.
        body: Map<String, Value>,
    },
}

/// Builds the answer for a set of response parameters.
///
/// `redirect_uri` must already have passed the redirect policy; this
/// function never decides whether a target is trustworthy, only how to use
/// it. An optional `state` from the request is echoed back
/// unchanged. With a target, parameters are appended to its query string
/// (`&` if it already has one, `?` otherwise); without one, a JSON answer
/// is produced with status 400 iff an `error` parameter is present.
#[must_use]
pub fn oauth_answer(
    redirect_uri: Option<&str>,
    params: &[(&str, &str)],
    state: Option<&str>,
) -> OAuthAnswer {
    let mut all: Vec<(&str, &str)> = params.to_vec();
    if let Some(state) = state {
        all.push(("state", state));
    }

    match redirect_uri {
        Some(target) => {
            let encoded = all
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect::<Vec<_>>()
                .join("&");

            let separator = if target.contains('?') { "&" } else { "?" };
            OAuthAnswer::Redirect(format!("{target}{separator}{encoded}"))
        }
        None => {
            let status = if all.iter().any(|(k, _)| *k == "error") {
                400
            } else {
                200
            };

            let body = all
                .into_iter()
                .map(|(k, v)| (k.to_string(), Value::from(v)))
                .collect();

            OAuthAnswer::Json { status, body }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_starts_query_string_when_target_has_none() {
        let answer = oauth_answer(
            Some("https://a.example/cb"),
            &[("code", "abc123")],
            None,
        );
        assert_eq!(
            answer,
            OAuthAnswer::Redirect("https://a.example/cb?code=abc123".to_string())
        );
    }

    #[test]
    fn redirect_extends_an_existing_query_string() {
        let answer = oauth_answer(
            Some("https://a.example/cb?app=1"),
            &[("code", "abc123")],
            None,
        );
        assert_eq!(
            answer,
            OAuthAnswer::Redirect("https://a.example/cb?app=1&code=abc123".to_string())
        );
    }

    #[test]
    fn state_is_echoed_unchanged() {
        let answer = oauth_answer(
            Some("https://a.example/cb"),
            &[("code", "abc123")],
            Some("xyzzy"),
        );
        assert_eq!(
            answer,
            OAuthAnswer::Redirect("https://a.example/cb?code=abc123&state=xyzzy".to_string())
        );
    }

    #[test]
    fn parameters_are_url_encoded() {
        let answer = oauth_answer(
            Some("https://a.example/cb"),
            &[("error_description", "no such grant")],
            None,
        );
        assert_eq!(
            answer,
            OAuthAnswer::Redirect(
                "https://a.example/cb?error_description=no%20such%20grant".to_string()
            )
        );
    }

    #[test]
    fn json_answer_without_error_is_200() {
        let answer = oauth_answer(None, &[("access_token", "tok")], Some("s"));
        let OAuthAnswer::Json { status, body } = answer else {
            panic!("expected JSON answer");
        };
        assert_eq!(status, 200);
        assert_eq!(body["access_token"], "tok");
        assert_eq!(body["state"], "s");
    }

    #[test]
    fn json_answer_with_error_is_400() {
        let answer = oauth_answer(None, &[("error", "invalid_grant")], None);
        let OAuthAnswer::Json { status, body } = answer else {
            panic!("expected JSON answer");
        };
        assert_eq!(status, 400);
        assert_eq!(body["error"], "invalid_grant");
    }
}
