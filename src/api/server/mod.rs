//
//  bitbucket-server-driver
//  api/server/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Server/Data Center API v1.0
//!
//! This module provides the endpoint shapes and response types for the parts of
//! the Bitbucket Server REST API that a package manager needs: repository
//! metadata, refs, commits, raw files and archives.
//!
//! ## Module Organization
//!
//! - [`repositories`] - Repository metadata and clone links
//! - [`refs`] - Tags, branches, the default branch and commits
//!
//! ## Endpoint Shapes
//!
//! All paths are relative to the resolved origin, which may carry a path
//! prefix when the server sits behind a reverse proxy
//! (`https://host/bitbucket/rest/api/1.0/...`).
//!
//! | Purpose | Path |
//! |---------|------|
//! | Repository | `/rest/api/1.0/projects/{owner}/repos/{slug}` |
//! | Tags | `.../tags?orderBy=MODIFICATION` |
//! | Branches | `.../branches?orderBy=MODIFICATION` |
//! | Default branch | `.../branches/default` |
//! | Commit | `.../commits/{revision}` |
//! | Raw file | `/projects/{owner}/repos/{slug}/raw/{path}?at={revision}` |
//! | Archive | `/rest/api/latest/projects/{owner}/repos/{slug}/archive?at={revision}&format=zip` |
//!
//! ## Notes
//!
//! - Timestamps are Unix milliseconds instead of ISO 8601 strings
//! - Optional fields use `Option<T>` and default to `None` during deserialization

pub mod refs;
pub mod repositories;

pub use refs::{Commit, DefaultBranch, RefEntry};
pub use repositories::{CloneLink, ProjectRef, Repository, RepositoryLinks};

use crate::util::{encode_path_segment, encode_query_value};

/// URL builder for one repository's endpoints.
///
/// # Example
///
/// ```rust
/// use bitbucket_server_driver::api::server::Endpoints;
///
/// let endpoints = Endpoints::new("https://bb.example.com/bitbucket", "PROJ", "app");
/// assert_eq!(
///     endpoints.repository(),
///     "https://bb.example.com/bitbucket/rest/api/1.0/projects/PROJ/repos/app"
/// );
/// assert_eq!(
///     endpoints.raw_file("composer.json", "feature/x"),
///     "https://bb.example.com/bitbucket/projects/PROJ/repos/app/raw/composer.json?at=feature%2Fx"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: String,
    owner: String,
    slug: String,
}

impl Endpoints {
    /// Creates a builder from `scheme://origin`, the project key and the repository slug.
    pub fn new(base: impl Into<String>, owner: impl Into<String>, slug: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
            owner: owner.into(),
            slug: slug.into(),
        }
    }

    /// `scheme://origin` this builder was created with.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Project/repository metadata.
    pub fn repository(&self) -> String {
        format!(
            "{}/rest/api/1.0/projects/{}/repos/{}",
            self.base, self.owner, self.slug
        )
    }

    /// Tags collection, most recently modified first.
    pub fn tags(&self) -> String {
        format!("{}/tags?orderBy=MODIFICATION", self.repository())
    }

    /// Branches collection, most recently modified first.
    pub fn branches(&self) -> String {
        format!("{}/branches?orderBy=MODIFICATION", self.repository())
    }

    pub fn default_branch(&self) -> String {
        format!("{}/branches/default", self.repository())
    }

    /// Commit metadata at a revision.
    pub fn commit(&self, revision: &str) -> String {
        format!(
            "{}/commits/{}",
            self.repository(),
            encode_path_segment(revision)
        )
    }

    /// Raw file content at a revision.
    ///
    /// Directory separators in `path` are preserved; each segment is encoded.
    pub fn raw_file(&self, path: &str, revision: &str) -> String {
        let path = path
            .trim_start_matches('/')
            .split('/')
            .map(encode_path_segment)
            .collect::<Vec<_>>()
            .join("/");

        format!(
            "{}/raw/{}?at={}",
            self.web(),
            path,
            encode_query_value(revision)
        )
    }

    /// Zip archive of the tree at a revision.
    pub fn archive(&self, revision: &str) -> String {
        format!(
            "{}/rest/api/latest/projects/{}/repos/{}/archive?at={}&format=zip",
            self.base,
            self.owner,
            self.slug,
            encode_query_value(revision)
        )
    }

    /// Browse page, optionally pinned to a ref with `?at=`.
    pub fn browse(&self, at: Option<&str>) -> String {
        match at {
            Some(at) => format!("{}/browse?at={}", self.web(), encode_query_value(at)),
            None => format!("{}/browse", self.web()),
        }
    }

    /// Repository home page in the web UI.
    pub fn web(&self) -> String {
        format!("{}/projects/{}/repos/{}", self.base, self.owner, self.slug)
    }
}
