//
//  bitbucket-server-driver
//  context/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Repository Context Module
//!
//! This module turns a repository URL into the identity of a repository on a
//! self-hosted Bitbucket Server instance.
//!
//! ## Overview
//!
//! The context module is responsible for:
//! - Parsing repository URLs into scheme, domain, port, path prefix, owner and slug
//! - Matching the domain (plus any reverse-proxy prefix) against the allow-list
//! - Deriving every URL the driver needs from the resolved identity
//!
//! ## Architecture
//!
//! - [`resolver`]: URL parsing and origin resolution
//! - [`RepositoryIdentity`]: The resolved, immutable repository information
//!
//! ## Example
//!
//! ```rust
//! use bitbucket_server_driver::context::RepositoryIdentity;
//!
//! let domains = vec!["bitbucket.mycompany.com".to_string()];
//! let identity = RepositoryIdentity::resolve(
//!     &domains,
//!     "https://bitbucket.mycompany.com/scm/project/repo.git",
//! )?;
//!
//! assert_eq!(identity.origin, "bitbucket.mycompany.com");
//! assert_eq!(identity.owner, "project");
//! assert_eq!(identity.slug, "repo");
//! # Ok::<(), bitbucket_server_driver::driver::DriverError>(())
//! ```

mod resolver;

pub use resolver::*;

use std::fmt;

use crate::api::server::Endpoints;

/// URL scheme of the repository URL.
///
/// Only HTTP(S) URLs name a REST-capable origin; SSH URLs are left to other
/// drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }

    /// Whether the scheme requires TLS.
    pub fn is_secure(&self) -> bool {
        matches!(self, Self::Https)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a repository on a Bitbucket Server instance.
///
/// Derived once from the input URL and never mutated afterwards.
///
/// # Fields
///
/// * `origin` - The allow-listed server identity: host, optional port and
///   optional reverse-proxy path prefix (e.g. `bb.example.com:7990/bitbucket`)
/// * `owner` - The project key
/// * `slug` - The repository slug, without `.git`
/// * `scheme` - `http` or `https`, as given in the input URL
///
/// # Example
///
/// ```rust
/// use bitbucket_server_driver::context::{RepositoryIdentity, Scheme};
///
/// let identity = RepositoryIdentity {
///     origin: "bb.example.com/bitbucket".to_string(),
///     owner: "PROJ".to_string(),
///     slug: "app".to_string(),
///     scheme: Scheme::Https,
/// };
///
/// assert_eq!(identity.base_url(), "https://bb.example.com/bitbucket");
/// assert_eq!(identity.ssh_url(), "git@bb.example.com/bitbucket/PROJ/app.git");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryIdentity {
    /// Allow-listed server identity
    pub origin: String,
    /// Project key
    pub owner: String,
    /// Repository slug
    pub slug: String,
    /// Scheme of the input URL
    pub scheme: Scheme,
}

impl RepositoryIdentity {
    /// Returns the repository path in the format "owner/slug".
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.slug)
    }

    /// `scheme://origin`, the prefix of every REST and web URL.
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.origin)
    }

    /// Endpoint builder for this repository.
    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(self.base_url(), &self.owner, &self.slug)
    }

    /// SSH URL handed to the clone-based fallback driver.
    ///
    /// Built as `git@{origin}/{owner}/{slug}.git`; the origin is used verbatim,
    /// port and path prefix included.
    pub fn ssh_url(&self) -> String {
        format!("git@{}/{}/{}.git", self.origin, self.owner, self.slug)
    }

    /// HTTP clone URL used before the server has reported its own clone links.
    pub fn scm_clone_url(&self) -> String {
        format!("{}/scm/{}/{}.git", self.base_url(), self.owner, self.slug)
    }

    /// Cache namespace, `origin/owner/slug`.
    pub fn cache_namespace(&self) -> String {
        format!("{}/{}/{}", self.origin, self.owner, self.slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> RepositoryIdentity {
        RepositoryIdentity {
            origin: "bb.example.com:7990".to_string(),
            owner: "PROJ".to_string(),
            slug: "app".to_string(),
            scheme: Scheme::Http,
        }
    }

    #[test]
    fn test_derived_urls() {
        let id = identity();
        assert_eq!(id.full_name(), "PROJ/app");
        assert_eq!(id.base_url(), "http://bb.example.com:7990");
        assert_eq!(id.scm_clone_url(), "http://bb.example.com:7990/scm/PROJ/app.git");
        assert_eq!(id.ssh_url(), "git@bb.example.com:7990/PROJ/app.git");
        assert_eq!(id.cache_namespace(), "bb.example.com:7990/PROJ/app");
        assert_eq!(
            id.endpoints().repository(),
            "http://bb.example.com:7990/rest/api/1.0/projects/PROJ/repos/app"
        );
    }
}
