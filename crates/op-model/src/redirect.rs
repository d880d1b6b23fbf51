//! Redirect URI authorization policy.
//!
//! A candidate redirect target is authorized when some registered URI has
//! the exact same base (everything before `?`) and the two query strings
//! satisfy a two-directional subset rule:
//!
//! - every registered query key must be present on the candidate, and every
//!   non-blank registered value must appear among the candidate's values
//!   for that key (a registered key with only blank values means "key must
//!   exist, any value accepted");
//! - every candidate key and value must be registered, with a blank
//!   registered value acting as a wildcard for that key.
//!
//! Parameter order is irrelevant; duplicate keys are compared as sets of
//! values per key. Fragments are request-local navigation state and are
//! never compared: a candidate carrying one is rejected outright.

use std::collections::HashMap;

use url::form_urlencoded;

/// Query string as a per-key multimap. Blank values are preserved; an
/// absent query string and an empty one are both the empty map.
type QueryMap = HashMap<String, Vec<String>>;

/// Decides whether `candidate` is one of the registered redirect URIs.
///
/// Registered entries are scanned in order; the first match wins.
#[must_use]
pub fn is_authorized<S: AsRef<str>>(configured: &[S], candidate: &str) -> bool {
    if candidate.contains('#') {
        tracing::debug!(uri = candidate, "redirect target must not carry a fragment");
        return false;
    }

    let (candidate_base, candidate_query) = split_base_query(candidate);

    for entry in configured {
        let (registered_base, registered_query) = split_base_query(entry.as_ref());

        // The base of the URI must match exactly.
        if candidate_base != registered_base {
            continue;
        }

        if queries_match(&registered_query, &candidate_query) {
            return true;
        }
    }

    tracing::debug!(
        uri = candidate,
        "redirect target does not match any registered URI"
    );
    false
}

/// Splits a URI at the first `?` and parses the query into a multimap.
fn split_base_query(uri: &str) -> (&str, QueryMap) {
    match uri.split_once('?') {
        Some((base, query)) => {
            let mut map = QueryMap::new();
            for (key, value) in form_urlencoded::parse(query.as_bytes()) {
                map.entry(key.into_owned())
                    .or_default()
                    .push(value.into_owned());
            }
            (base, map)
        }
        None => (uri, QueryMap::new()),
    }
}

/// The two-directional subset check between a registered query and the
/// candidate's query. Plain boolean control flow: a failed comparison means
/// "this registered entry didn't match", not an error.
fn queries_match(registered: &QueryMap, candidate: &QueryMap) -> bool {
    // Every registered key must exist on the candidate, and every
    // non-blank registered value must appear among the candidate's values.
    for (key, values) in registered {
        let Some(presented) = candidate.get(key) else {
            return false;
        };
        for value in values {
            if !value.is_empty() && !presented.contains(value) {
                return false;
            }
        }
    }

    // And vice versa: every candidate key and value must be registered.
    // A blank registered value accepts any presented value for its key.
    for (key, values) in candidate {
        let Some(allowed) = registered.get(key) else {
            return false;
        };
        for value in values {
            if !allowed.contains(value) && !allowed.iter().any(String::is_empty) {
                return false;
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_is_rejected_regardless_of_base() {
        let configured = ["https://a.example/cb"];
        assert!(!is_authorized(&configured, "https://a.example/cb#top"));
        assert!(!is_authorized(&configured, "https://a.example/cb?x=1#frag"));
    }

    #[test]
    fn base_mismatch_is_rejected() {
        let configured = ["https://a.example/cb"];
        assert!(!is_authorized(&configured, "https://b.example/cb"));
        assert!(!is_authorized(&configured, "https://a.example/other"));
    }

    #[test]
    fn exact_match_without_query() {
        let configured = ["https://a.example/cb"];
        assert!(is_authorized(&configured, "https://a.example/cb"));
    }

    #[test]
    fn empty_query_on_both_sides_matches() {
        let configured = ["https://a.example/cb?"];
        assert!(is_authorized(&configured, "https://a.example/cb"));
        assert!(is_authorized(&configured, "https://a.example/cb?"));
    }

    #[test]
    fn unregistered_extra_key_is_rejected() {
        let configured = ["https://a.example/cb?scope=x"];
        assert!(!is_authorized(
            &configured,
            "https://a.example/cb?scope=x&extra=1"
        ));
    }

    #[test]
    fn registered_uri_without_query_only_matches_bare_candidates() {
        let configured = ["https://a.example/cb"];
        assert!(!is_authorized(&configured, "https://a.example/cb?x=1"));
    }

    #[test]
    fn candidate_missing_registered_key_is_rejected() {
        let configured = ["https://a.example/cb?scope=x"];
        assert!(!is_authorized(&configured, "https://a.example/cb"));
    }

    #[test]
    fn blank_registered_value_acts_as_wildcard() {
        let configured = ["https://a.example/cb?scope="];
        assert!(is_authorized(
            &configured,
            "https://a.example/cb?scope=anything"
        ));
        assert!(is_authorized(&configured, "https://a.example/cb?scope="));
        // The key itself must still be present.
        assert!(!is_authorized(&configured, "https://a.example/cb"));
    }

    #[test]
    fn registered_value_must_appear_among_candidate_values() {
        let configured = ["https://a.example/cb?scope=x"];
        assert!(!is_authorized(&configured, "https://a.example/cb?scope=y"));
        assert!(is_authorized(
            &configured,
            "https://a.example/cb?scope=x&scope=y"
        ));
    }

    #[test]
    fn parameter_order_is_irrelevant() {
        let configured = ["https://a.example/cb?a=1&b=2"];
        assert!(is_authorized(&configured, "https://a.example/cb?b=2&a=1"));
    }

    #[test]
    fn first_matching_entry_wins_across_the_list() {
        let configured = [
            "https://a.example/cb?scope=x",
            "https://a.example/cb",
            "https://b.example/cb",
        ];
        assert!(is_authorized(&configured, "https://a.example/cb"));
        assert!(is_authorized(&configured, "https://b.example/cb"));
    }

    #[test]
    fn empty_registration_list_rejects_everything() {
        let configured: [&str; 0] = [];
        assert!(!is_authorized(&configured, "https://a.example/cb"));
    }

    #[test]
    fn percent_encoded_values_are_compared_decoded() {
        let configured = ["https://a.example/cb?next=/home page"];
        assert!(is_authorized(
            &configured,
            "https://a.example/cb?next=%2Fhome%20page"
        ));
    }
}
