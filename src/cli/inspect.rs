//
//  bitbucket-server-driver
//  cli/inspect.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/16.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Repository inspection commands
//!
//! Each command opens a driver for the given URL and prints what the driver
//! reports as JSON. Missing manifests, files and revisions fail with a
//! not-found error so scripts can tell them apart from transport failures.

use anyhow::Result;
use clap::Args;
use serde_json::json;

use crate::api::ApiError;
use crate::context::RepositoryIdentity;
use crate::driver::{DriverError, VcsDriver};

use super::{write_json, GlobalOptions};

fn not_found(what: String) -> anyhow::Error {
    DriverError::Transport(ApiError::NotFound(what)).into()
}

/// Check whether a URL is handled by the driver
#[derive(Args, Debug)]
pub struct SupportsCommand {
    /// Repository URL
    pub url: String,
}

impl SupportsCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let config = global.load_config()?;

        match RepositoryIdentity::resolve(&config.domains(), &self.url) {
            Ok(identity) => write_json(&json!({
                "url": self.url,
                "supported": true,
                "origin": identity.origin,
                "owner": identity.owner,
                "slug": identity.slug,
            })),
            Err(e) => {
                write_json(&json!({ "url": self.url, "supported": false }))?;
                Err(e.into())
            }
        }
    }
}

/// Show the package manifest at a revision
#[derive(Args, Debug)]
pub struct InfoCommand {
    /// Repository URL
    pub url: String,

    /// Tag, branch or commit (defaults to the default branch)
    pub revision: Option<String>,

    /// Homepage to use when the manifest has none
    #[arg(long)]
    pub website: Option<String>,
}

impl InfoCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let mut driver = global
            .open_driver(&self.url, self.website.as_deref())
            .await?;

        let revision = match &self.revision {
            Some(revision) => revision.clone(),
            None => driver.root_identifier().await?.to_string(),
        };

        match driver.composer_information(&revision).await? {
            Some(descriptor) => write_json(&descriptor),
            None => Err(not_found(format!("composer.json at {revision}"))),
        }
    }
}

/// List tags
#[derive(Args, Debug)]
pub struct TagsCommand {
    /// Repository URL
    pub url: String,
}

impl TagsCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let mut driver = global.open_driver(&self.url, None).await?;
        write_json(driver.tags().await?)
    }
}

/// List branches
#[derive(Args, Debug)]
pub struct BranchesCommand {
    /// Repository URL
    pub url: String,
}

impl BranchesCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let mut driver = global.open_driver(&self.url, None).await?;
        write_json(driver.branches().await?)
    }
}

/// Print a file at a revision
#[derive(Args, Debug)]
pub struct FileCommand {
    /// Repository URL
    pub url: String,

    /// Path of the file inside the repository
    pub path: String,

    /// Tag, branch or commit
    pub revision: String,
}

impl FileCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let mut driver = global.open_driver(&self.url, None).await?;

        match driver.file_content(&self.path, &self.revision).await? {
            Some(content) => {
                print!("{content}");
                Ok(())
            }
            None => Err(not_found(format!("{} at {}", self.path, self.revision))),
        }
    }
}

/// Show the commit date of a revision
#[derive(Args, Debug)]
pub struct DateCommand {
    /// Repository URL
    pub url: String,

    /// Tag, branch or commit
    pub revision: String,
}

impl DateCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let mut driver = global.open_driver(&self.url, None).await?;
        let date = driver.change_date(&self.revision).await?;

        write_json(&json!({
            "revision": self.revision,
            "date": date,
        }))
    }
}

/// Show the dist and source references of a revision
#[derive(Args, Debug)]
pub struct ArchiveCommand {
    /// Repository URL
    pub url: String,

    /// Tag, branch or commit
    pub revision: String,
}

impl ArchiveCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let mut driver = global.open_driver(&self.url, None).await?;
        let dist = driver.dist(&self.revision).await?;
        let source = driver.source(&self.revision).await?;

        write_json(&json!({
            "dist": dist,
            "source": source,
        }))
    }
}
