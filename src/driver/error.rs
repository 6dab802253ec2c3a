//
//  bitbucket-server-driver
//  driver/error.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/16.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Driver error types.

use thiserror::Error;

use crate::api::ApiError;

/// Errors surfaced by the driver.
///
/// # Variants
///
/// | Variant | Meaning |
/// |---------|---------|
/// | `InvalidUrl` | The URL is not a repository URL this driver understands |
/// | `UnsupportedOrigin` | No allow-listed domain matches the URL |
/// | `UnsupportedVcsKind` | The repository is not a Git repository |
/// | `Transport` | A REST request failed |
/// | `FallbackInitFailed` | The clone-based fallback could not be set up |
/// | `Cache` | The cache location could not be determined |
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Invalid repository URL: {url}")]
    InvalidUrl { url: String },

    #[error("No configured Bitbucket Server domain matches {url}")]
    UnsupportedOrigin { url: String },

    #[error(
        "Repository {url} uses {kind}, but only git repositories are supported. Clone it manually from {clone_url}"
    )]
    UnsupportedVcsKind {
        url: String,
        kind: String,
        clone_url: String,
    },

    #[error(transparent)]
    Transport(#[from] ApiError),

    #[error("Failed to set up a git driver for {ssh_url}; try running interactively so credentials can be entered")]
    FallbackInitFailed {
        ssh_url: String,
        #[source]
        source: Box<DriverError>,
    },

    #[error("Cache unavailable: {0}")]
    Cache(#[from] std::io::Error),

    /// Error raised by a fallback driver implementation.
    #[error("{0}")]
    Other(String),
}

impl DriverError {
    /// Whether the error means "this driver does not handle the URL".
    pub fn is_not_applicable(&self) -> bool {
        matches!(self, Self::InvalidUrl { .. } | Self::UnsupportedOrigin { .. })
    }
}

/// Result type for driver operations.
pub type Result<T, E = DriverError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_fallback_error_keeps_source() {
        let err = DriverError::FallbackInitFailed {
            ssh_url: "git@bb/PROJ/app.git".to_string(),
            source: Box::new(DriverError::Other("permission denied (publickey)".to_string())),
        };

        assert!(err.to_string().contains("try running interactively"));
        assert_eq!(
            err.source().map(|s| s.to_string()).as_deref(),
            Some("permission denied (publickey)")
        );
    }

    #[test]
    fn test_transport_is_transparent() {
        let err = DriverError::from(ApiError::AuthRequired);
        assert_eq!(err.to_string(), ApiError::AuthRequired.to_string());
        assert!(!err.is_not_applicable());
    }
}
