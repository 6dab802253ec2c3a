//
//  bitbucket-server-driver
//  api/server/repositories.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Server/DC Repository API
//!
//! Types for the repository metadata endpoint. The driver reads three things
//! from it: the SCM kind, the clone links and the web UI link.
//!
//! ## Repository Structure
//!
//! In Bitbucket Server/DC, repositories:
//! - Belong to exactly one project (identified by project key)
//! - Have a unique slug within their project
//! - Support Git as the primary SCM (older installs may report `hg`)
//!
//! ## API Endpoint
//!
//! ```text
//! GET /rest/api/1.0/projects/{projectKey}/repos/{repoSlug}
//! ```

use serde::{Deserialize, Serialize};

/// Represents a repository in Bitbucket Server/Data Center.
///
/// Only the fields the driver relies on are required; everything else
/// defaults so that older server versions still decode.
///
/// # Example
///
/// ```rust
/// use bitbucket_server_driver::api::server::Repository;
///
/// let json = r#"{
///     "slug": "app",
///     "name": "App",
///     "scmId": "git",
///     "links": {
///         "clone": [
///             {"href": "ssh://git@bb.example.com:7999/proj/app.git", "name": "ssh"},
///             {"href": "https://admin@bb.example.com/scm/proj/app.git", "name": "http"}
///         ],
///         "self": [{"href": "https://bb.example.com/projects/PROJ/repos/app/browse"}]
///     }
/// }"#;
///
/// let repo: Repository = serde_json::from_str(json).unwrap();
/// assert_eq!(repo.http_clone_link(), Some("https://admin@bb.example.com/scm/proj/app.git"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    /// Unique numeric identifier assigned by Bitbucket Server.
    #[serde(default)]
    pub id: Option<u64>,

    /// URL-safe identifier used in API endpoints and clone URLs.
    pub slug: String,

    /// Human-readable display name of the repository.
    #[serde(default)]
    pub name: String,

    /// Optional description explaining the repository's purpose.
    #[serde(default)]
    pub description: Option<String>,

    /// Reference to the project that contains this repository.
    #[serde(default)]
    pub project: Option<ProjectRef>,

    /// Source control management identifier ("git", or "hg" on legacy installs).
    #[serde(rename = "scmId")]
    pub scm_id: String,

    /// Current state of the repository, e.g. "AVAILABLE".
    #[serde(default)]
    pub state: Option<String>,

    /// Whether the repository is publicly accessible.
    #[serde(rename = "public")]
    #[serde(default)]
    pub is_public: bool,

    /// Collection of links for accessing the repository.
    #[serde(default)]
    pub links: RepositoryLinks,
}

impl Repository {
    /// Returns the clone link named `http`, if the server advertises one.
    ///
    /// The link may still carry the requesting user's name
    /// (`https://user@host/scm/...`); see [`crate::util::strip_url_credentials`].
    pub fn http_clone_link(&self) -> Option<&str> {
        self.links
            .clone
            .iter()
            .find(|link| link.name == "http")
            .map(|link| link.href.as_str())
    }

    /// Returns the first self link, which points at the repository in the web UI.
    pub fn self_href(&self) -> Option<&str> {
        self.links.self_link.first().map(|link| link.href.as_str())
    }
}

/// Reference to a project within a repository context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRef {
    /// Short uppercase key used in URLs and API paths.
    /// Example: "PROJ", "DEV", "INFRA".
    pub key: String,

    /// Human-readable display name of the project.
    #[serde(default)]
    pub name: String,
}

/// Collection of links associated with a repository.
///
/// The Bitbucket Server API returns links as arrays to support multiple
/// protocols (SSH, HTTPS).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryLinks {
    /// List of clone URLs for the repository.
    /// Typically contains entries for "ssh" and "http" protocols.
    #[serde(default)]
    pub clone: Vec<CloneLink>,

    /// Self-referential links to the repository in the web UI.
    #[serde(default, rename = "self")]
    pub self_link: Vec<SelfLink>,
}

/// Represents a clone URL for a repository.
///
/// # Notes
///
/// - SSH URLs typically start with `ssh://` or use `git@` format
/// - The `http` link is used whatever its actual scheme is
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloneLink {
    /// The full clone URL for this protocol.
    /// Example: "ssh://git@bitbucket.example.com:7999/proj/repo.git"
    pub href: String,

    /// Protocol identifier for this clone URL.
    /// Common values: "ssh", "http".
    pub name: String,
}

/// Self-referential link to a resource in the web UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelfLink {
    /// The full URL to view this resource in the web UI.
    pub href: String,
}
