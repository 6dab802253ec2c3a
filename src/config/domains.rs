//
//  bitbucket-server-driver
//  config/domains.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Domain Allow-List Utilities
//!
//! Entries of `bitbucket-server-domains` are written by hand and tend to arrive
//! as `https://Bitbucket.Example.com/`, `bitbucket.example.com:7990` or
//! `bitbucket.example.com/bitbucket`. This module brings them into the form the
//! origin resolver compares against.
//!
//! ## Usage
//!
//! ```rust
//! use bitbucket_server_driver::config::normalize_domain;
//!
//! assert_eq!(normalize_domain("https://BB.Example.com/"), "bb.example.com");
//! assert_eq!(normalize_domain("bb.example.com:7990/Tools"), "bb.example.com:7990/Tools");
//! ```

/// Normalizes one allow-list entry.
///
/// # Examples
///
/// ```rust
/// use bitbucket_server_driver::config::normalize_domain;
///
/// // Remove scheme prefix
/// assert_eq!(normalize_domain("http://bb.example.com"), "bb.example.com");
///
/// // Remove trailing slashes
/// assert_eq!(normalize_domain("bb.example.com//"), "bb.example.com");
///
/// // Combined
/// assert_eq!(normalize_domain("  HTTPS://BB.Example.Com/scm/  "), "bb.example.com/scm");
/// ```
///
/// # Notes
///
/// - Only the host part is lower-cased; path prefixes are compared verbatim
///   against URL path segments
/// - Ports are kept
/// - Schemes are matched without regard to case
/// - The order of operations is: trim -> remove https -> remove http -> remove trailing slashes -> lowercase host
pub fn normalize_domain(domain: &str) -> String {
    let domain = strip_scheme(domain.trim(), "https://");
    let domain = strip_scheme(domain, "http://");
    let domain = domain.trim_end_matches('/');

    match domain.split_once('/') {
        Some((host, prefix)) => format!("{}/{}", host.to_lowercase(), prefix),
        None => domain.to_lowercase(),
    }
}

/// Strips `scheme` from the front of `domain`, ignoring ASCII case.
fn strip_scheme<'a>(domain: &'a str, scheme: &str) -> &'a str {
    match domain.get(..scheme.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(scheme) => &domain[scheme.len()..],
        _ => domain,
    }
}

/// Normalizes a whole allow-list, dropping empty entries and duplicates.
pub fn normalize_domains<S: AsRef<str>>(domains: &[S]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(domains.len());
    for domain in domains {
        let domain = normalize_domain(domain.as_ref());
        if !domain.is_empty() && !normalized.contains(&domain) {
            normalized.push(domain);
        }
    }
    normalized
}
