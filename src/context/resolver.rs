//
//  bitbucket-server-driver
//  context/resolver.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Origin Resolver
//!
//! This module parses repository URLs and matches them against the configured
//! allow-list of Bitbucket Server domains.
//!
//! ## Supported URL Formats
//!
//! - `https://server/scm/PROJECT/repo.git`
//! - `https://user@server:8443/scm/PROJECT/repo.git`
//! - `https://server/bitbucket/scm/PROJECT/repo` (reverse-proxy prefix)
//! - `http://server/PROJECT/repo/`
//!
//! ## Resolution
//!
//! The same server is often reachable as `host`, `host:port` or
//! `host/prefix` depending on the proxy in front of it, and administrators
//! allow-list exactly the forms they use. [`resolve_origin`] therefore tries
//! the bare domain first and then grows the candidate one path segment at a
//! time.
//!
//! ## Example
//!
//! ```rust
//! use bitbucket_server_driver::context::resolve_origin;
//!
//! let domains = vec!["bb.example.com/bitbucket".to_string()];
//! assert_eq!(
//!     resolve_origin(&domains, "BB.example.com", &["bitbucket", "scm"], None),
//!     Some("bb.example.com/bitbucket".to_string())
//! );
//! assert_eq!(resolve_origin(&domains, "other.example.com", &["scm"], None), None);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::{RepositoryIdentity, Scheme};
use crate::driver::DriverError;

/// Regular expression for repository URLs.
///
/// # Capture Groups
/// - `scheme`: `http` or `https`
/// - `login`: optional `user[:password]` before `@`
/// - `domain`: host name
/// - `port`: optional port number
/// - `parts`: optional path segments before the owner
/// - `owner`: project key
/// - `repo`: repository slug, `.git` and trailing slash removed
static REPOSITORY_URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<scheme>https?)://(?:(?P<login>[^@/]+)@)?(?P<domain>[^/:@]+)(?::(?P<port>\d+))?/(?:(?P<parts>.+)/)?(?P<owner>[^/]+)/(?P<repo>[^/]+?)(?:\.git|/)?$",
    )
    .unwrap()
});

/// Strips a `:port` suffix from a candidate origin.
static PORT_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r":\d+").unwrap());

/// Structural pieces of a repository URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    pub scheme: Scheme,
    pub login: Option<String>,
    pub domain: String,
    pub port: Option<String>,
    /// Path segments between the domain and the owner
    pub parts: Vec<String>,
    pub owner: String,
    pub repo: String,
}

/// Parses a repository URL.
///
/// # Errors
///
/// Returns [`DriverError::InvalidUrl`] when the URL does not have the
/// `scheme://[login@]domain[:port]/[parts/]owner/repo[.git]` shape.
///
/// # Example
///
/// ```rust
/// use bitbucket_server_driver::context::parse_repository_url;
///
/// let parsed = parse_repository_url("https://ci@bb.example.com:8443/scm/PROJ/app.git")?;
/// assert_eq!(parsed.domain, "bb.example.com");
/// assert_eq!(parsed.port.as_deref(), Some("8443"));
/// assert_eq!(parsed.parts, vec!["scm"]);
/// assert_eq!(parsed.owner, "PROJ");
/// assert_eq!(parsed.repo, "app");
/// # Ok::<(), bitbucket_server_driver::driver::DriverError>(())
/// ```
pub fn parse_repository_url(url: &str) -> Result<ParsedUrl, DriverError> {
    let caps = REPOSITORY_URL_PATTERN
        .captures(url)
        .ok_or_else(|| DriverError::InvalidUrl {
            url: url.to_string(),
        })?;

    let scheme = match &caps["scheme"] {
        "https" => Scheme::Https,
        _ => Scheme::Http,
    };

    let parts = caps
        .name("parts")
        .map(|m| {
            m.as_str()
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(ParsedUrl {
        scheme,
        login: caps.name("login").map(|m| m.as_str().to_string()),
        domain: caps["domain"].to_string(),
        port: caps.name("port").map(|m| m.as_str().to_string()),
        parts,
        owner: caps["owner"].to_string(),
        repo: caps["repo"].to_string(),
    })
}

/// Matches a parsed domain against the allow-list.
///
/// 1. The lower-cased domain, or `domain:port`, is looked up directly. The
///    port-qualified form is returned whenever a port was given.
/// 2. Otherwise the port is appended and leading path segments are added one
///    at a time (`domain:port/a`, `domain:port/a/b`, ...). Each candidate is
///    looked up as-is and with its port stripped.
///
/// Returns `None` when nothing matches; the URL is then not handled by this
/// driver.
pub fn resolve_origin<S: AsRef<str>>(
    configured: &[String],
    domain: &str,
    parts: &[S],
    port: Option<&str>,
) -> Option<String> {
    let is_configured = |candidate: &str| configured.iter().any(|d| d == candidate);

    let mut candidate = domain.to_lowercase();
    let with_port = port.map(|p| format!("{candidate}:{p}"));

    if is_configured(&candidate) || with_port.as_deref().is_some_and(|c| is_configured(c)) {
        return Some(with_port.unwrap_or(candidate));
    }

    if let Some(with_port) = with_port {
        candidate = with_port;
    }

    for part in parts {
        candidate.push('/');
        candidate.push_str(part.as_ref());

        if is_configured(&candidate)
            || (port.is_some() && is_configured(&*PORT_PATTERN.replace(&candidate, "")))
        {
            return Some(candidate);
        }
    }

    None
}

impl RepositoryIdentity {
    /// Parses `url` and resolves its origin against `configured`.
    ///
    /// # Errors
    ///
    /// - [`DriverError::InvalidUrl`] if the URL cannot be parsed
    /// - [`DriverError::UnsupportedOrigin`] if no allow-listed domain matches
    pub fn resolve(configured: &[String], url: &str) -> Result<Self, DriverError> {
        let parsed = parse_repository_url(url)?;

        let origin = resolve_origin(
            configured,
            &parsed.domain,
            &parsed.parts,
            parsed.port.as_deref(),
        )
        .ok_or_else(|| DriverError::UnsupportedOrigin {
            url: url.to_string(),
        })?;

        debug!(url, origin = %origin, "resolved repository origin");

        Ok(Self {
            origin,
            owner: parsed.owner,
            slug: parsed.repo,
            scheme: parsed.scheme,
        })
    }
}
