//! Deterministic cache keys for catalog requests

use base64::prelude::{Engine as _, BASE64_URL_SAFE_NO_PAD};
use std::fmt::Write;

/// Maps a resource path and its query parameters to an opaque cache key
///
/// Every field is written length-prefixed so no two distinct inputs share a
/// serialization, then base64 (URL-safe, unpadded) makes the result usable
/// as a file name. Parameter order is significant: `a=1&b=2` and `b=2&a=1`
/// produce different keys.
pub fn fingerprint(resource_path: &str, query_params: &[(String, String)]) -> String {
    let mut raw = String::new();
    push_field(&mut raw, resource_path);
    let _ = write!(raw, "{}#", query_params.len());
    for (name, value) in query_params {
        push_field(&mut raw, name);
        push_field(&mut raw, value);
    }
    BASE64_URL_SAFE_NO_PAD.encode(raw.as_bytes())
}

fn push_field(buf: &mut String, field: &str) {
    let _ = write!(buf, "{}:{}", field.len(), field);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let p = params(&[("limit", "4"), ("zone_id", "")]);
        assert_eq!(fingerprint("products", &p), fingerprint("products", &p));
    }

    #[test]
    fn test_fingerprint_is_stable_across_runs() {
        // Pinned value: keys written by a previous process must still hit
        assert_eq!(fingerprint("zones", &[]), "NTp6b25lczAj");
    }

    #[test]
    fn test_fingerprint_differs_by_path() {
        let p = params(&[("limit", "4")]);
        assert_ne!(fingerprint("products", &p), fingerprint("zones", &p));
    }

    #[test]
    fn test_fingerprint_differs_by_value() {
        assert_ne!(
            fingerprint("products", &params(&[("limit", "4")])),
            fingerprint("products", &params(&[("limit", "5")]))
        );
    }

    #[test]
    fn test_fingerprint_is_order_sensitive() {
        assert_ne!(
            fingerprint("products", &params(&[("limit", "4"), ("lang", "en")])),
            fingerprint("products", &params(&[("lang", "en"), ("limit", "4")]))
        );
    }

    #[test]
    fn test_fingerprint_avoids_concatenation_ambiguity() {
        // Naive "path?k=v" joining would make these identical
        assert_ne!(
            fingerprint("products", &params(&[("a", "b&c=d")])),
            fingerprint("products", &params(&[("a", "b"), ("c", "d")]))
        );
        assert_ne!(
            fingerprint("ab", &params(&[("c", "")])),
            fingerprint("a", &params(&[("bc", "")]))
        );
    }

    #[test]
    fn test_fingerprint_is_filename_safe() {
        let key = fingerprint("products/12?x", &params(&[("q", "a/b+c==")]));
        assert!(key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
