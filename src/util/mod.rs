//
//  bitbucket-server-driver
//  util/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Utility Module
//!
//! Small string helpers shared by the endpoint builder, the driver and the
//! metadata cache.
//!
//! ## Categories
//!
//! - **URL Utilities**: [`encode_path_segment`], [`encode_query_value`], [`strip_url_credentials`]
//! - **Cache Utilities**: [`escape_path_component`]
//!
//! ## Example
//!
//! ```rust
//! use bitbucket_server_driver::util::{encode_path_segment, escape_path_component};
//!
//! assert_eq!(encode_path_segment("feature/login"), "feature%2Flogin");
//! assert_eq!(escape_path_component("feature/login"), "feature%2Flogin");
//! ```

use url::{form_urlencoded, Url};

/// Percent-encodes a single URL path segment.
///
/// Slashes are encoded, so a branch name like `feature/x` stays one segment.
/// Spaces become `%20` rather than the form-encoding `+`.
///
/// # Example
///
/// ```rust
/// use bitbucket_server_driver::util::encode_path_segment;
///
/// assert_eq!(encode_path_segment("read me.md"), "read%20me.md");
/// assert_eq!(encode_path_segment("v1.0"), "v1.0");
/// ```
pub fn encode_path_segment(segment: &str) -> String {
    form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Percent-encodes a query-string value.
pub fn encode_query_value(value: &str) -> String {
    encode_path_segment(value)
}

/// Removes any `user:password@` part from a URL.
///
/// Strings that do not parse as URLs are returned unchanged.
///
/// # Example
///
/// ```rust
/// use bitbucket_server_driver::util::strip_url_credentials;
///
/// assert_eq!(
///     strip_url_credentials("https://admin:pw@bb.example.com/scm/proj/app.git"),
///     "https://bb.example.com/scm/proj/app.git"
/// );
/// ```
pub fn strip_url_credentials(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return raw.to_string();
    };

    if url.username().is_empty() && url.password().is_none() {
        return raw.to_string();
    }

    // Both setters only fail for cannot-be-a-base URLs, which carry no credentials.
    let _ = url.set_username("");
    let _ = url.set_password(None);
    url.to_string()
}

/// Turns an arbitrary string into a single file name.
///
/// Uses the same percent-encoding as [`encode_path_segment`], so `/` and `%`
/// are escaped and distinct inputs never share a file name. The relative
/// components `.` and `..` are escaped as well.
///
/// # Example
///
/// ```rust
/// use bitbucket_server_driver::util::escape_path_component;
///
/// assert_eq!(escape_path_component("feature/login"), "feature%2Flogin");
/// assert_eq!(escape_path_component("feature-login"), "feature-login");
/// assert_eq!(escape_path_component("v1.0_rc"), "v1.0_rc");
/// assert_eq!(escape_path_component(".."), "%2E%2E");
/// ```
pub fn escape_path_component(component: &str) -> String {
    match component {
        "." => "%2E".to_string(),
        ".." => "%2E%2E".to_string(),
        _ => encode_path_segment(component),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_path_segment() {
        assert_eq!(encode_path_segment("refs/tags/v1.0"), "refs%2Ftags%2Fv1.0");
        assert_eq!(encode_path_segment("a+b"), "a%2Bb");
        assert_eq!(encode_path_segment("abc123"), "abc123");
    }

    #[test]
    fn test_strip_url_credentials() {
        assert_eq!(
            strip_url_credentials("https://admin@bb.example.com/scm/p/r.git"),
            "https://bb.example.com/scm/p/r.git"
        );
        assert_eq!(
            strip_url_credentials("https://bb.example.com:8443/scm/p/r.git"),
            "https://bb.example.com:8443/scm/p/r.git"
        );
        assert_eq!(strip_url_credentials("not a url"), "not a url");
    }

    #[test]
    fn test_escape_path_component_keeps_names_apart() {
        let names = ["a_app", "a-app", "a app", "a/app", "a%2Fapp", "a+app", "a.app"];
        let escaped: Vec<_> = names.iter().map(|n| escape_path_component(n)).collect();

        for (i, left) in escaped.iter().enumerate() {
            assert!(!left.contains('/'), "{left} is not a single component");
            for right in &escaped[i + 1..] {
                assert_ne!(left, right);
            }
        }
    }

    #[test]
    fn test_escape_path_component_host_with_port() {
        assert_eq!(escape_path_component("bb.example.com:7990"), "bb.example.com%3A7990");
        assert_eq!(escape_path_component("."), "%2E");
        assert_eq!(escape_path_component("%2E"), "%252E");
    }
}
