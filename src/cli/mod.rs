//
//  bitbucket-server-driver
//  cli/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI command definitions using clap derive macros

mod inspect;

pub use inspect::{
    ArchiveCommand, BranchesCommand, DateCommand, FileCommand, InfoCommand, SupportsCommand,
    TagsCommand,
};

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::api::{ContentFetcher, ServerClient};
use crate::auth::AuthCredential;
use crate::config::{Config, RepositoryConfig};
use crate::driver::{BitbucketServerDriver, NoFallback, VcsDriver};

/// Bitbucket Server driver - Inspect repository metadata on self-hosted servers
#[derive(Parser, Debug)]
#[command(
    name = "bbs-driver",
    version,
    about = "Inspect package metadata of Bitbucket Server repositories",
    long_about = "bbs-driver reads tags, branches, manifests and archive references \
                  from self-hosted Bitbucket Server/Data Center repositories.\n\n\
                  Only servers listed in bitbucket-server-domains (or passed with --domain) are handled.",
    propagate_version = true,
    after_help = "Use 'bbs-driver <command> --help' for more information about a command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Configuration file to read instead of the default location
    #[arg(long, global = true, env = "BBS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Additional allow-listed server domain (repeatable, comma separated)
    #[arg(
        long = "domain",
        global = true,
        env = "BBS_DOMAINS",
        value_delimiter = ','
    )]
    pub domains: Vec<String>,

    /// Directory for cached package metadata
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Read the metadata cache without writing to it
    #[arg(long, global = true)]
    pub cache_read_only: bool,

    /// Personal access token (or password when --username is set)
    #[arg(long, global = true, env = "BBS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Username for basic authentication
    #[arg(long, global = true, env = "BBS_USERNAME")]
    pub username: Option<String>,
}

impl GlobalOptions {
    /// Loads the configuration file and applies command-line overrides.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        for domain in &self.domains {
            config.add_domain(domain);
        }
        if let Some(dir) = &self.cache_dir {
            config.cache_repo_dir = Some(dir.clone());
        }
        if self.cache_read_only {
            config.cache_read_only = true;
        }

        Ok(config)
    }

    /// Builds the HTTP transport with whatever credentials were given.
    pub fn fetcher(&self) -> Result<Arc<dyn ContentFetcher>> {
        let mut client = ServerClient::new()?;
        if let Some(auth) =
            AuthCredential::from_parts(self.username.as_deref(), self.token.as_deref())
        {
            client = client.with_auth(auth);
        }
        Ok(Arc::new(client))
    }

    /// Creates and initializes a driver for `url`.
    ///
    /// No clone-based driver ships with the binary, so an unusable REST API
    /// surfaces as a fallback failure.
    pub async fn open_driver(
        &self,
        url: &str,
        website: Option<&str>,
    ) -> Result<BitbucketServerDriver> {
        let config = self.load_config()?;
        let mut repo = RepositoryConfig::new(url);
        if let Some(website) = website {
            repo = repo.with_website(website);
        }

        let mut driver =
            BitbucketServerDriver::new(&config, &repo, self.fetcher()?)?.with_fallback(NoFallback);
        driver.initialize().await?;
        Ok(driver)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check whether a URL belongs to an allow-listed server
    Supports(SupportsCommand),

    /// Show the enriched package manifest at a revision
    Info(InfoCommand),

    /// List tags and the commits they point at
    Tags(TagsCommand),

    /// List branches and their head commits
    Branches(BranchesCommand),

    /// Print a file at a revision
    File(FileCommand),

    /// Show the commit date of a revision
    Date(DateCommand),

    /// Show the archive and clone references for a revision
    Archive(ArchiveCommand),
}

/// Pretty-prints `value` as JSON on stdout.
pub(crate) fn write_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "bbs-driver",
            "tags",
            "https://bb.example.com/scm/PROJ/app.git",
            "--domain",
            "bb.example.com,git.example.com",
            "--cache-read-only",
        ])
        .unwrap();

        assert_eq!(cli.global.domains, vec!["bb.example.com", "git.example.com"]);
        assert!(cli.global.cache_read_only);
        assert!(matches!(cli.command, Commands::Tags(_)));
    }

    #[test]
    fn test_file_requires_revision() {
        let result = Cli::try_parse_from([
            "bbs-driver",
            "file",
            "https://bb.example.com/scm/PROJ/app.git",
            "composer.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_applies_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "bitbucket-server-domains = [\"bb.example.com\"]\n").unwrap();

        let global = GlobalOptions {
            config: Some(path),
            domains: vec!["https://git.example.com/".to_string()],
            cache_dir: Some(dir.path().join("cache")),
            cache_read_only: true,
            ..Default::default()
        };

        let config = global.load_config().unwrap();
        assert_eq!(config.domains(), vec!["bb.example.com", "git.example.com"]);
        assert_eq!(config.cache_repo_dir, Some(dir.path().join("cache")));
        assert!(config.cache_read_only);
    }
}
