//
//  bitbucket-server-driver
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Server Driver Library
//!
//! A repository metadata driver for self-hosted Bitbucket Server/Data Center
//! instances, as used by a package manager to discover package versions.
//!
//! ## Overview
//!
//! Given a repository URL, the driver determines which allow-listed server it
//! belongs to, then reads repository data, tags, branches, files and commit
//! dates over the REST API and turns them into package descriptors plus
//! download/clone references. When the REST API refuses access the driver
//! switches to a clone-based driver for good.
//!
//! ## Features
//!
//! - **Origin Resolution**: Matches hosts, ports and reverse-proxy prefixes against an allow-list
//! - **Paginated Listing**: Walks tag and branch collections page by page
//! - **Metadata Cache**: Per-revision descriptor cache with a read-only mode
//! - **Manifest Enrichment**: Fills in `support.source` and `homepage` links
//! - **Fallback**: One-way switch to a clone-based driver
//!
//! ## Module Structure
//!
//! - [`driver`]: The [`VcsDriver`](driver::VcsDriver) trait, the driver and its fallback
//! - [`context`]: URL parsing and origin resolution
//! - [`api`]: HTTP transport, endpoint shapes and pagination
//! - [`cache`]: Metadata cache
//! - [`package`]: Package descriptors and enrichment
//! - [`config`]: Configuration file management
//! - [`auth`]: Transport credentials
//! - [`cli`]: The `bbs-driver` inspection commands
//! - [`util`]: Utility functions
//!
//! ## Example Usage
//!
//! ```rust
//! use bitbucket_server_driver::{supports, Config};
//!
//! let mut config = Config::default();
//! config.add_domain("bitbucket.mycompany.com");
//!
//! assert!(supports(&config, "https://bitbucket.mycompany.com/scm/project/repo.git"));
//! ```

/// Command-line interface definitions.
///
/// Contains the `bbs-driver` commands, defined using the clap derive API.
pub mod cli;

/// HTTP transport and Bitbucket Server REST API types.
///
/// The transport is behind the [`ContentFetcher`](api::ContentFetcher) trait so
/// the driver can be exercised without a server.
pub mod api;

/// Transport credentials (personal access tokens, basic auth).
pub mod auth;

/// Per-revision metadata cache.
pub mod cache;

/// Configuration file management.
///
/// Handles loading the domain allow-list and cache settings from
/// platform-specific locations (e.g., `~/.config/bbs-driver/config.toml` on Linux).
pub mod config;

/// Repository URL parsing and origin resolution.
pub mod context;

/// The repository driver and its fallback coordinator.
pub mod driver;

/// Package descriptors, enrichment and dist/source references.
pub mod package;

/// Utility functions for URL encoding and cache key handling.
pub mod util;

pub use config::{Config, RepositoryConfig};
pub use context::RepositoryIdentity;
pub use driver::{supports, BitbucketServerDriver, DriverError, VcsDriver};
pub use package::PackageDescriptor;

/// Application version constant.
///
/// Derived from Cargo.toml at compile time; also sent in the `User-Agent`
/// header.
///
/// # Example
///
/// ```rust
/// use bitbucket_server_driver::VERSION;
///
/// println!("bbs-driver version {}", VERSION);
/// ```
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes for the `bbs-driver` binary.
///
/// # Exit Code Ranges
///
/// - `0`: Success
/// - `1-3`: General errors, usage issues and unsupported URLs
/// - `4-7`: Authentication-related issues
/// - `8-15`: Resource-related issues
///
/// # Example
///
/// ```rust,no_run
/// use bitbucket_server_driver::exit_codes;
/// use std::process;
///
/// process::exit(exit_codes::UNSUPPORTED);
/// ```
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;

    /// General error.
    ///
    /// An unspecified error occurred during execution.
    /// Check stderr for details.
    pub const ERROR: i32 = 1;

    /// Invalid usage or arguments.
    pub const USAGE: i32 = 2;

    /// The URL is not handled by this driver.
    ///
    /// Either it is not a repository URL, or its origin is not in
    /// `bitbucket-server-domains`.
    pub const UNSUPPORTED: i32 = 3;

    /// Authentication required or failed.
    ///
    /// The REST API rejected the request and no clone-based fallback could be
    /// set up. Pass `--token` or configure SSH access.
    pub const AUTH_ERROR: i32 = 4;

    /// Resource not found.
    ///
    /// The repository, revision or file does not exist or is not visible to
    /// the configured credentials.
    pub const NOT_FOUND: i32 = 8;
}
