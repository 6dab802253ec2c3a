//
//  bitbucket-server-driver
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration Module
//!
//! This module provides the configuration the driver is constructed with. It
//! is loaded from a TOML file stored in a platform-specific directory and then
//! passed to the driver as an immutable value.
//!
//! ## Configuration File Location
//!
//! - **Linux**: `~/.config/bbs-driver/config.toml`
//! - **macOS**: `~/Library/Application Support/bbs-driver/config.toml`
//! - **Windows**: `C:\Users\<User>\AppData\Roaming\bbs-driver\config\config.toml`
//!
//! ## Example Configuration File
//!
//! ```toml
//! bitbucket-server-domains = ["bitbucket.example.com", "git.example.com/bitbucket"]
//! cache-repo-dir = "/var/cache/bbs-driver/repo"
//! cache-read-only = false
//! page-limit = 100
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bitbucket_server_driver::config::Config;
//!
//! let mut config = Config::load()?;
//! config.add_domain("https://bitbucket.example.com/");
//! config.save()?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Submodules
//!
//! - [`domains`]: Allow-list normalization

mod domains;

pub use domains::*;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Application name used for platform directories.
const APP_NAME: &str = "bbs-driver";

/// Page size for tags and branches requests.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Driver configuration.
///
/// Keys use kebab-case in the file to match the names package managers use for
/// the same settings.
///
/// # Fields
///
/// * `bitbucket_server_domains` - Allow-listed origins (`host`, `host:port` or `host/prefix`)
/// * `cache_repo_dir` - Root of the metadata cache; platform cache dir when unset
/// * `cache_read_only` - Read cached metadata but never write it
/// * `page_limit` - Page size for paginated list endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub bitbucket_server_domains: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_repo_dir: Option<PathBuf>,

    #[serde(default)]
    pub cache_read_only: bool,

    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

fn default_page_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bitbucket_server_domains: Vec::new(),
            cache_repo_dir: None,
            cache_read_only: false,
            page_limit: default_page_limit(),
        }
    }
}

impl Config {
    /// Loads the configuration from the default location.
    ///
    /// A missing file yields [`Config::default`].
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Loads the configuration from `path`, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Saves the configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", APP_NAME)
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Root directory of the metadata cache.
    ///
    /// Uses `cache-repo-dir` when set, otherwise `<platform cache dir>/repo`.
    pub fn cache_repo_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.cache_repo_dir {
            return Ok(dir.clone());
        }

        let dirs = ProjectDirs::from("", "", APP_NAME)
            .ok_or_else(|| anyhow::anyhow!("Could not determine cache directory"))?;
        Ok(dirs.cache_dir().join("repo"))
    }

    /// The normalized domain allow-list.
    pub fn domains(&self) -> Vec<String> {
        normalize_domains(&self.bitbucket_server_domains)
    }

    /// Adds a domain to the allow-list unless an equivalent entry exists.
    ///
    /// Returns `true` if the entry was added.
    pub fn add_domain(&mut self, domain: &str) -> bool {
        let domain = normalize_domain(domain);
        if domain.is_empty() || self.domains().contains(&domain) {
            return false;
        }
        self.bitbucket_server_domains.push(domain);
        true
    }
}

/// Per-repository inputs.
///
/// # Example
///
/// ```rust
/// use bitbucket_server_driver::config::RepositoryConfig;
///
/// let repo = RepositoryConfig::new("https://bb.example.com/scm/PROJ/app.git")
///     .with_website("https://app.example.com");
/// assert_eq!(repo.website.as_deref(), Some("https://app.example.com"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Repository URL
    pub url: String,

    /// Project website; used as `homepage` when the manifest has none
    #[serde(default)]
    pub website: Option<String>,
}

impl RepositoryConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            website: None,
        }
    }

    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.bitbucket_server_domains.is_empty());
        assert!(!config.cache_read_only);
        assert_eq!(config.page_limit, 100);
    }

    #[test]
    fn test_parse_kebab_case_keys() {
        let config: Config = toml::from_str(
            r#"
bitbucket-server-domains = ["HTTPS://BB.Example.com/", "git.example.com/bitbucket"]
cache-repo-dir = "/tmp/bbs"
cache-read-only = true
"#,
        )
        .unwrap();

        assert_eq!(config.domains(), vec!["bb.example.com", "git.example.com/bitbucket"]);
        assert_eq!(config.cache_repo_dir().unwrap(), PathBuf::from("/tmp/bbs"));
        assert!(config.cache_read_only);
        assert_eq!(config.page_limit, DEFAULT_PAGE_LIMIT);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        assert!(config.add_domain("bb.example.com"));
        assert!(!config.add_domain("https://BB.example.com/"));
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }
}
