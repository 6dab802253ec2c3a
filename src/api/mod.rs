//
//  bitbucket-server-driver
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Client Layer
//!
//! This module provides everything the driver needs to talk to a Bitbucket
//! Server/Data Center instance over HTTP.
//!
//! ## Architecture
//!
//! - [`client`]: The [`ContentFetcher`] boundary and its `reqwest` implementation
//! - [`server`]: REST endpoint shapes and response types for Server/DC API v1.0
//! - [`common`]: Shared types (errors, pagination)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bitbucket_server_driver::api::{ContentFetcher, ServerClient};
//!
//! # async fn example() -> Result<(), bitbucket_server_driver::api::ApiError> {
//! let client = ServerClient::new()?;
//! let content = client
//!     .fetch("https://bitbucket.example.com/rest/api/1.0/projects/PROJ/repos/app")
//!     .await?;
//! println!("{}", content.text());
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! API errors are returned as [`ApiError`] variants, which map to common HTTP error scenarios:
//!
//! - `AuthRequired`: 401 Unauthorized
//! - `Forbidden`: 403 Forbidden
//! - `NotFound`: 404 Not Found
//! - `RateLimited`: 429 Too Many Requests
//! - `ServerError`: 5xx Server Errors

/// Transport boundary and the production HTTP client.
///
/// Provides the [`ContentFetcher`] trait consumed by the driver and
/// [`ServerClient`], which handles:
/// - User-Agent and authentication headers
/// - Status code mapping to [`ApiError`]
pub mod client;

/// Bitbucket Server/Data Center API v1.0 implementation.
///
/// Contains the endpoint builder and the response types the driver decodes:
/// - [`server::repositories`]: Repository metadata and clone links
/// - [`server::refs`]: Tags, branches and commits
pub mod server;

/// Common types shared by every request.
///
/// Includes:
/// - [`ApiError`]: Standardized error types
/// - [`ServerPaginatedResponse`](common::ServerPaginatedResponse): Server/DC pagination format
/// - [`fetch_ref_map`](common::fetch_ref_map): The paginated ref walker
pub mod common;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ContentFetcher, FetchedContent, ServerClient};

pub use common::ApiError;
