//
//  bitbucket-server-driver
//  driver/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/16.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Server Driver
//!
//! The driver a package manager uses to read repository metadata from a
//! self-hosted Bitbucket Server instance.
//!
//! ## Overview
//!
//! - [`supports`] decides, without network access, whether a URL belongs to an
//!   allow-listed server
//! - [`BitbucketServerDriver`] answers the [`VcsDriver`] operations through the
//!   REST API, and through a clone-based driver once the REST API has proven
//!   unusable
//!
//! ## Operations
//!
//! | Operation | Network | Falls back |
//! |-----------|---------|------------|
//! | [`VcsDriver::initialize`] | repository endpoint | yes |
//! | [`VcsDriver::root_identifier`] | default branch | yes |
//! | [`VcsDriver::tags`] / [`VcsDriver::branches`] | paginated lists, once | yes |
//! | [`VcsDriver::composer_information`] | manifest, commit, refs | yes |
//! | [`VcsDriver::file_content`] / [`VcsDriver::change_date`] | raw file / commit | yes |
//! | [`VcsDriver::url`] / [`VcsDriver::source`] / [`VcsDriver::dist`] | none | delegated once fallen back |
//!
//! ## Concurrency
//!
//! Every operation takes `&mut self`: one driver serves one caller at a time.
//! Use one driver per worker.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bitbucket_server_driver::api::ServerClient;
//! use bitbucket_server_driver::config::{Config, RepositoryConfig};
//! use bitbucket_server_driver::driver::{BitbucketServerDriver, VcsDriver};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut config = Config::default();
//! config.add_domain("bitbucket.example.com");
//!
//! let repo = RepositoryConfig::new("https://bitbucket.example.com/scm/PROJ/app.git");
//! let mut driver = BitbucketServerDriver::new(&config, &repo, Arc::new(ServerClient::new()?))?;
//!
//! driver.initialize().await?;
//! let root = driver.root_identifier().await?.to_string();
//! if let Some(manifest) = driver.composer_information(&root).await? {
//!     println!("{:?}", manifest.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod fallback;
pub mod rest;


pub use error::{DriverError, Result};
pub use fallback::{DriverState, FallbackFactory, NoFallback};
pub use rest::{RepoData, RestClient, VcsKind};

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::api::common::RefMap;
use crate::api::ContentFetcher;
use crate::cache::{FileCache, MetadataCache};
use crate::config::{Config, RepositoryConfig};
use crate::context::RepositoryIdentity;
use crate::package::{DistReference, PackageDescriptor, SourceReference};

/// Operations a repository driver offers to a package manager.
///
/// The clone-based fallback implements the same trait, so delegation passes
/// arguments through unchanged and returns the delegate's results and errors
/// as they are.
#[async_trait]
pub trait VcsDriver: Send + Sync {
    /// Performs whatever setup the driver needs before answering queries.
    async fn initialize(&mut self) -> Result<()>;

    /// URL the repository is cloned from.
    async fn url(&mut self) -> Result<String>;

    /// Name of the default branch.
    async fn root_identifier(&mut self) -> Result<&str>;

    /// Package manifest at `revision`, or `None` if there is none.
    async fn composer_information(&mut self, revision: &str) -> Result<Option<PackageDescriptor>>;

    /// Content of `path` at `revision`, or `None` if the file does not exist.
    async fn file_content(&mut self, path: &str, revision: &str) -> Result<Option<String>>;

    /// Date of the commit at `revision`.
    async fn change_date(&mut self, revision: &str) -> Result<Option<DateTime<Utc>>>;

    async fn source(&mut self, revision: &str) -> Result<SourceReference>;

    async fn dist(&mut self, revision: &str) -> Result<Option<DistReference>>;

    async fn tags(&mut self) -> Result<&RefMap>;

    async fn branches(&mut self) -> Result<&RefMap>;

    /// Whether a manifest exists at `revision`.
    ///
    /// Transport failures count as "no manifest".
    async fn has_composer_file(&mut self, revision: &str) -> bool {
        match self.composer_information(revision).await {
            Ok(descriptor) => descriptor.is_some(),
            Err(e) => {
                debug!(revision, error = %e, "treating manifest lookup failure as missing");
                false
            }
        }
    }
}

/// Checks whether `url` points at an allow-listed Bitbucket Server.
///
/// Only parses the URL and resolves its origin; no request is made. TLS is
/// always compiled in, so `https` URLs need no further capability check.
///
/// # Example
///
/// ```rust
/// use bitbucket_server_driver::config::Config;
/// use bitbucket_server_driver::driver::supports;
///
/// let mut config = Config::default();
/// config.add_domain("bitbucket.example.com");
///
/// assert!(supports(&config, "https://bitbucket.example.com/scm/PROJ/app.git"));
/// assert!(!supports(&config, "https://github.com/acme/app.git"));
/// assert!(!supports(&config, "git@bitbucket.example.com:PROJ/app.git"));
/// ```
pub fn supports(config: &Config, url: &str) -> bool {
    RepositoryIdentity::resolve(&config.domains(), url).is_ok()
}

/// Driver for one repository on a Bitbucket Server instance.
pub struct BitbucketServerDriver {
    identity: RepositoryIdentity,
    state: DriverState,
    fallback: Box<dyn FallbackFactory>,
}

impl std::fmt::Debug for BitbucketServerDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitbucketServerDriver")
            .field("identity", &self.identity)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl BitbucketServerDriver {
    /// Creates a driver with a file-backed metadata cache and no fallback.
    ///
    /// # Errors
    ///
    /// - [`DriverError::InvalidUrl`] / [`DriverError::UnsupportedOrigin`] when the
    ///   URL is not handled by this driver
    /// - [`DriverError::Cache`] when no cache directory can be determined
    pub fn new(
        config: &Config,
        repo: &RepositoryConfig,
        fetcher: Arc<dyn ContentFetcher>,
    ) -> Result<Self> {
        let identity = RepositoryIdentity::resolve(&config.domains(), &repo.url)?;
        let cache_dir = config
            .cache_repo_dir()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()))?;
        let store = FileCache::new(&cache_dir, &identity.cache_namespace())
            .with_read_only(config.cache_read_only);

        Ok(Self::assemble(identity, config, repo, fetcher, MetadataCache::new(store)))
    }

    /// Creates a driver around an explicit metadata cache.
    pub fn with_cache(
        config: &Config,
        repo: &RepositoryConfig,
        fetcher: Arc<dyn ContentFetcher>,
        cache: MetadataCache,
    ) -> Result<Self> {
        let identity = RepositoryIdentity::resolve(&config.domains(), &repo.url)?;
        Ok(Self::assemble(identity, config, repo, fetcher, cache))
    }

    fn assemble(
        identity: RepositoryIdentity,
        config: &Config,
        repo: &RepositoryConfig,
        fetcher: Arc<dyn ContentFetcher>,
        cache: MetadataCache,
    ) -> Self {
        let client = RestClient::new(
            identity.clone(),
            fetcher,
            cache,
            repo.website.clone(),
            config.page_limit,
        );

        Self {
            identity,
            state: DriverState::Active(Box::new(client)),
            fallback: Box::new(NoFallback),
        }
    }

    /// Sets the factory used to build the clone-based fallback.
    pub fn with_fallback(mut self, factory: impl FallbackFactory + 'static) -> Self {
        self.fallback = Box::new(factory);
        self
    }

    pub fn identity(&self) -> &RepositoryIdentity {
        &self.identity
    }

    pub fn state(&self) -> &DriverState {
        &self.state
    }

    /// Makes sure repository data is loaded, falling back when it cannot be.
    ///
    /// On return the state is either `Active` with repository data, or
    /// `FellBack` with an initialised delegate.
    async fn ensure_repo_data(&mut self) -> Result<()> {
        let DriverState::Active(client) = &mut self.state else {
            return Ok(());
        };

        let cause = match client.fetch_repo_data().await {
            Ok(()) => return Ok(()),
            Err(cause) => cause,
        };

        let delegate =
            fallback::start_fallback(self.fallback.as_ref(), self.identity.ssh_url(), &cause)
                .await?;
        self.state = DriverState::FellBack(delegate);
        Ok(())
    }
}

#[async_trait]
impl VcsDriver for BitbucketServerDriver {
    async fn initialize(&mut self) -> Result<()> {
        self.ensure_repo_data().await
    }

    async fn url(&mut self) -> Result<String> {
        match &mut self.state {
            DriverState::Active(client) => Ok(client.url()),
            DriverState::FellBack(delegate) => delegate.url().await,
        }
    }

    async fn root_identifier(&mut self) -> Result<&str> {
        self.ensure_repo_data().await?;
        match &mut self.state {
            DriverState::Active(client) => client.root_identifier().await,
            DriverState::FellBack(delegate) => delegate.root_identifier().await,
        }
    }

    async fn composer_information(&mut self, revision: &str) -> Result<Option<PackageDescriptor>> {
        self.ensure_repo_data().await?;
        match &mut self.state {
            DriverState::Active(client) => client.composer_information(revision).await,
            DriverState::FellBack(delegate) => delegate.composer_information(revision).await,
        }
    }

    async fn file_content(&mut self, path: &str, revision: &str) -> Result<Option<String>> {
        self.ensure_repo_data().await?;
        match &mut self.state {
            DriverState::Active(client) => Ok(client.file_content(path, revision).await?),
            DriverState::FellBack(delegate) => delegate.file_content(path, revision).await,
        }
    }

    async fn change_date(&mut self, revision: &str) -> Result<Option<DateTime<Utc>>> {
        self.ensure_repo_data().await?;
        match &mut self.state {
            DriverState::Active(client) => Ok(client.change_date(revision).await?),
            DriverState::FellBack(delegate) => delegate.change_date(revision).await,
        }
    }

    async fn source(&mut self, revision: &str) -> Result<SourceReference> {
        match &mut self.state {
            DriverState::Active(client) => Ok(client.source(revision)),
            DriverState::FellBack(delegate) => delegate.source(revision).await,
        }
    }

    async fn dist(&mut self, revision: &str) -> Result<Option<DistReference>> {
        match &mut self.state {
            DriverState::Active(client) => Ok(Some(client.dist(revision))),
            DriverState::FellBack(delegate) => delegate.dist(revision).await,
        }
    }

    async fn tags(&mut self) -> Result<&RefMap> {
        self.ensure_repo_data().await?;
        match &mut self.state {
            DriverState::Active(client) => Ok(client.tags().await?),
            DriverState::FellBack(delegate) => delegate.tags().await,
        }
    }

    async fn branches(&mut self) -> Result<&RefMap> {
        self.ensure_repo_data().await?;
        match &mut self.state {
            DriverState::Active(client) => Ok(client.branches().await?),
            DriverState::FellBack(delegate) => delegate.branches().await,
        }
    }
}
