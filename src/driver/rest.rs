//
//  bitbucket-server-driver
//  driver/rest.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/16.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Repository Metadata Client
//!
//! [`RestClient`] answers every driver question through the Bitbucket Server
//! REST API. It owns the memoised state of one repository: repository data,
//! root identifier, tag and branch maps and the per-revision descriptors.
//!
//! Tags, branches and the root identifier live in compute-once cells and are
//! never refetched for the lifetime of the client.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::error::{DriverError, Result};
use crate::api::common::{fetch_ref_map, RefMap};
use crate::api::server::{Commit, DefaultBranch, Endpoints, Repository};
use crate::api::{ApiError, ContentFetcher};
use crate::cache::{should_cache, MetadataCache};
use crate::context::RepositoryIdentity;
use crate::package::{enrich, DistReference, EnrichContext, PackageDescriptor, SourceReference};
use crate::util::strip_url_credentials;

/// Manifest file read at each revision.
pub const COMPOSER_FILE: &str = "composer.json";

/// Root identifier used when the server reports no default branch.
const DEFAULT_ROOT_IDENTIFIER: &str = "master";

/// Version control system reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsKind {
    Git,
    Hg,
    Other(String),
}

impl VcsKind {
    pub fn from_scm_id(scm_id: &str) -> Self {
        match scm_id.to_ascii_lowercase().as_str() {
            "git" => Self::Git,
            "hg" => Self::Hg,
            _ => Self::Other(scm_id.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Git => "git",
            Self::Hg => "hg",
            Self::Other(kind) => kind,
        }
    }
}

impl fmt::Display for VcsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the repository endpoint told us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoData {
    pub vcs: VcsKind,
    /// `http` clone link without credentials
    pub clone_url: Option<String>,
    /// Repository page in the web UI
    pub home_url: String,
    /// Bitbucket Server exposes no issue tracker, so this is always `false`.
    pub has_issues: bool,
}

impl RepoData {
    fn from_repository(repository: &Repository, endpoints: &Endpoints) -> Self {
        Self {
            vcs: VcsKind::from_scm_id(&repository.scm_id),
            clone_url: repository.http_clone_link().map(strip_url_credentials),
            home_url: repository
                .self_href()
                .map(str::to_string)
                .unwrap_or_else(|| endpoints.web()),
            has_issues: false,
        }
    }
}

/// REST-backed metadata client for one repository.
pub struct RestClient {
    identity: RepositoryIdentity,
    endpoints: Endpoints,
    fetcher: Arc<dyn ContentFetcher>,
    cache: MetadataCache,
    website: Option<String>,
    page_limit: u32,
    repo_data: Option<RepoData>,
    root_identifier: OnceCell<String>,
    tags: OnceCell<RefMap>,
    branches: OnceCell<RefMap>,
    descriptors: HashMap<String, Option<PackageDescriptor>>,
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("identity", &self.identity)
            .field("repo_data", &self.repo_data)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl RestClient {
    pub fn new(
        identity: RepositoryIdentity,
        fetcher: Arc<dyn ContentFetcher>,
        cache: MetadataCache,
        website: Option<String>,
        page_limit: u32,
    ) -> Self {
        let endpoints = identity.endpoints();
        Self {
            identity,
            endpoints,
            fetcher,
            cache,
            website,
            page_limit: page_limit.max(1),
            repo_data: None,
            root_identifier: OnceCell::new(),
            tags: OnceCell::new(),
            branches: OnceCell::new(),
            descriptors: HashMap::new(),
        }
    }

    pub fn identity(&self) -> &RepositoryIdentity {
        &self.identity
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Repository data, once [`RestClient::fetch_repo_data`] succeeded.
    pub fn repo_data(&self) -> Option<&RepoData> {
        self.repo_data.as_ref()
    }

    /// Loads the repository endpoint.
    ///
    /// Succeeds immediately when the data is already known. A failure here
    /// means the REST API is unusable for this repository.
    pub async fn fetch_repo_data(&mut self) -> Result<(), ApiError> {
        if self.repo_data.is_some() {
            return Ok(());
        }

        let repository: Repository = self
            .fetcher
            .fetch(&self.endpoints.repository())
            .await?
            .decode_json()?;

        let data = RepoData::from_repository(&repository, &self.endpoints);
        debug!(
            repository = %self.identity.full_name(),
            vcs = %data.vcs,
            clone_url = ?data.clone_url,
            "loaded repository data"
        );
        self.repo_data = Some(data);
        Ok(())
    }

    /// Clone URL of the repository.
    pub fn url(&self) -> String {
        self.repo_data
            .as_ref()
            .and_then(|data| data.clone_url.clone())
            .unwrap_or_else(|| self.identity.scm_clone_url())
    }

    /// Default branch name, or `master` when the server reports none.
    ///
    /// # Errors
    ///
    /// [`DriverError::UnsupportedVcsKind`] for anything but git repositories.
    pub async fn root_identifier(&mut self) -> Result<&str> {
        self.fetch_repo_data().await?;

        if let Some(data) = &self.repo_data {
            if data.vcs != VcsKind::Git {
                return Err(DriverError::UnsupportedVcsKind {
                    url: self.endpoints.web(),
                    kind: data.vcs.to_string(),
                    clone_url: self.url(),
                });
            }
        }

        let url = self.endpoints.default_branch();
        let fetcher = &self.fetcher;
        let identifier = self
            .root_identifier
            .get_or_try_init(|| async move {
                let content = fetcher.fetch(&url).await?;
                // Repositories without commits answer with an empty body.
                let branch: DefaultBranch = if content.body.is_empty() {
                    DefaultBranch::default()
                } else {
                    content.decode_json()?
                };
                Ok::<_, ApiError>(
                    branch
                        .display_id
                        .unwrap_or_else(|| DEFAULT_ROOT_IDENTIFIER.to_string()),
                )
            })
            .await?;

        Ok(identifier.as_str())
    }

    /// All tags, name to commit hash.
    pub async fn tags(&self) -> Result<&RefMap, ApiError> {
        self.ref_map(&self.tags, self.endpoints.tags(), "tags").await
    }

    /// All branches, name to commit hash.
    pub async fn branches(&self) -> Result<&RefMap, ApiError> {
        self.ref_map(&self.branches, self.endpoints.branches(), "branches")
            .await
    }

    async fn ref_map<'a>(
        &'a self,
        cell: &'a OnceCell<RefMap>,
        resource: String,
        kind: &'static str,
    ) -> Result<&'a RefMap, ApiError> {
        if let Some(refs) = cell.get() {
            debug!(kind, "using memoized refs");
            return Ok(refs);
        }

        cell.get_or_try_init(|| async {
            let refs = fetch_ref_map(self.fetcher.as_ref(), &resource, self.page_limit).await?;
            debug!(kind, count = refs.len(), "loaded refs");
            Ok::<_, ApiError>(refs)
        })
        .await
    }

    /// Replaces a branch name containing `/` by the commit it points at.
    async fn resolve_branch(&self, revision: &str) -> Result<String, ApiError> {
        if revision.contains('/') {
            if let Some(hash) = self.branches().await?.get(revision) {
                return Ok(hash.clone());
            }
        }
        Ok(revision.to_string())
    }

    /// Raw content of `path` at `revision`; `None` if the file does not exist.
    pub async fn file_content(&self, path: &str, revision: &str) -> Result<Option<String>, ApiError> {
        let revision = self.resolve_branch(revision).await?;
        match self.fetcher.fetch(&self.endpoints.raw_file(path, &revision)).await {
            Ok(content) => Ok(Some(content.text())),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Author date of the commit at `revision`.
    pub async fn change_date(&self, revision: &str) -> Result<Option<DateTime<Utc>>, ApiError> {
        let revision = self.resolve_branch(revision).await?;
        let commit: Commit = self
            .fetcher
            .fetch(&self.endpoints.commit(&revision))
            .await?
            .decode_json()?;
        Ok(commit.authored_at())
    }

    /// Zip archive reference; no request is made.
    pub fn dist(&self, revision: &str) -> DistReference {
        DistReference::zip(self.endpoints.archive(revision), revision)
    }

    /// Clone reference; no request is made.
    pub fn source(&self, revision: &str) -> SourceReference {
        let kind = self
            .repo_data
            .as_ref()
            .map(|data| data.vcs.to_string())
            .unwrap_or_else(|| VcsKind::Git.to_string());

        SourceReference {
            kind,
            url: self.url(),
            reference: revision.to_string(),
        }
    }

    /// Enriched manifest at `revision`.
    ///
    /// Looked up in order: the in-memory memo, the metadata cache, then the
    /// server. Only a freshly fetched manifest is enriched; cached entries are
    /// already enriched. Absent manifests are memoised but never cached.
    pub async fn composer_information(&mut self, revision: &str) -> Result<Option<PackageDescriptor>> {
        if let Some(memo) = self.descriptors.get(revision) {
            return Ok(memo.clone());
        }

        self.fetch_repo_data().await?;

        let cacheable = should_cache(revision);
        let cached = if cacheable {
            self.cache.read(revision)
        } else {
            None
        };

        let descriptor = match cached {
            Some(descriptor) => Some(descriptor),
            None => {
                let descriptor = match self.base_composer_information(revision).await? {
                    Some(base) => Some(self.enrich(base, revision).await?),
                    None => None,
                };
                if let Some(descriptor) = descriptor.as_ref().filter(|_| cacheable) {
                    self.cache.write(revision, descriptor);
                }
                descriptor
            }
        };

        self.descriptors
            .insert(revision.to_string(), descriptor.clone());
        Ok(descriptor)
    }

    /// Reads and parses the manifest, adding `time` when it has none.
    async fn base_composer_information(&self, revision: &str) -> Result<Option<PackageDescriptor>> {
        let Some(content) = self.file_content(COMPOSER_FILE, revision).await? else {
            return Ok(None);
        };

        let mut descriptor = match PackageDescriptor::from_slice(content.as_bytes()) {
            Ok(Some(descriptor)) => descriptor,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!(
                    repository = %self.identity.full_name(),
                    revision,
                    error = %e,
                    "could not parse {}", COMPOSER_FILE
                );
                return Ok(None);
            }
        };

        if descriptor.time.is_none() {
            if let Some(date) = self.change_date(revision).await? {
                descriptor.time = Some(date.to_rfc3339_opts(SecondsFormat::Secs, false));
            }
        }

        Ok(Some(descriptor))
    }

    async fn enrich(&self, descriptor: PackageDescriptor, revision: &str) -> Result<PackageDescriptor> {
        let tags = self.tags().await?;
        let branches = self.branches().await?;

        let issues_url = self
            .repo_data
            .as_ref()
            .filter(|data| data.has_issues)
            .map(|_| format!("{}/issues", self.endpoints.web()));
        let homepage = self
            .website
            .clone()
            .or_else(|| self.repo_data.as_ref().map(|data| data.home_url.clone()));

        let ctx = EnrichContext {
            revision,
            tags,
            branches,
            endpoints: &self.endpoints,
            issues_url: issues_url.as_deref(),
            homepage: homepage.as_deref(),
        };

        Ok(enrich(descriptor, &ctx))
    }
}
