//
//  bitbucket-server-driver
//  api/server/refs.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/16.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Tags, branches and commits.
//!
//! ```text
//! GET /rest/api/1.0/projects/{projectKey}/repos/{repoSlug}/tags
//! GET /rest/api/1.0/projects/{projectKey}/repos/{repoSlug}/branches
//! GET /rest/api/1.0/projects/{projectKey}/repos/{repoSlug}/branches/default
//! GET /rest/api/1.0/projects/{projectKey}/repos/{repoSlug}/commits/{commitId}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of a tags or branches page.
///
/// `displayId` is the short name (`v1.0`, `feature/login`); `id` is the full
/// ref (`refs/tags/v1.0`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefEntry {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(rename = "displayId")]
    pub display_id: String,

    /// Commit the ref points at.
    #[serde(rename = "latestCommit")]
    pub latest_commit: String,

    #[serde(default, rename = "isDefault")]
    pub is_default: bool,
}

/// Response of the default-branch endpoint.
///
/// Every field is optional: repositories without commits answer with an
/// empty object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultBranch {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default, rename = "displayId")]
    pub display_id: Option<String>,

    #[serde(default, rename = "latestCommit")]
    pub latest_commit: Option<String>,
}

/// Commit metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    /// Full commit hash.
    pub id: String,

    #[serde(default, rename = "displayId")]
    pub display_id: Option<String>,

    /// Author timestamp in Unix milliseconds.
    #[serde(default, rename = "authorTimestamp")]
    pub author_timestamp: Option<i64>,

    #[serde(default)]
    pub message: Option<String>,
}

impl Commit {
    /// Converts the millisecond author timestamp to a UTC date.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bitbucket_server_driver::api::server::Commit;
    ///
    /// let commit: Commit =
    ///     serde_json::from_str(r#"{"id":"abc","authorTimestamp":1700000000123}"#).unwrap();
    /// assert_eq!(
    ///     commit.authored_at().unwrap().to_rfc3339(),
    ///     "2023-11-14T22:13:20.123+00:00"
    /// );
    /// ```
    pub fn authored_at(&self) -> Option<DateTime<Utc>> {
        self.author_timestamp
            .and_then(DateTime::<Utc>::from_timestamp_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_branch_tolerates_empty_body() {
        let branch: DefaultBranch = serde_json::from_str("{}").unwrap();
        assert!(branch.display_id.is_none());
    }

    #[test]
    fn test_commit_without_timestamp() {
        let commit: Commit = serde_json::from_str(r#"{"id":"abc"}"#).unwrap();
        assert!(commit.authored_at().is_none());
    }
}
