//
//  bitbucket-server-driver
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Common API Types for Bitbucket Server
//!
//! This module provides the shared transport-level types used by every REST call the
//! driver makes: the [`ApiError`] taxonomy and the pagination primitives re-exported
//! from the [`pagination`] submodule.
//!
//! # Overview
//!
//! - [`ApiError`] - Unified error type for all HTTP operations
//! - [`extract_error_message`] - Pulls the human readable message out of an error body
//! - Pagination types and the ref-list walker (re-exported from `pagination`)
//!
//! # Example
//!
//! ```rust
//! use bitbucket_server_driver::api::common::ApiError;
//!
//! fn handle_result<T>(result: Result<T, ApiError>) {
//!     match result {
//!         Ok(_) => println!("Success!"),
//!         Err(ApiError::AuthRequired) => println!("Please authenticate first"),
//!         Err(ApiError::NotFound(resource)) => println!("Resource not found: {}", resource),
//!         Err(e) => println!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Notes
//!
//! - No retries happen at this layer; every failure is returned to the caller as-is
//! - Status codes are mapped once, in [`ApiError::from_status`]

use reqwest::StatusCode;
use thiserror::Error;

mod pagination;

pub use pagination::*;

/// Unified error type for all Bitbucket Server HTTP operations.
///
/// `ApiError` covers every way a request against the REST API or the raw file
/// endpoints can fail. The driver treats all of them as transport failures; only
/// [`ApiError::NotFound`] is sometimes downgraded to "absent" by callers.
///
/// # Variants
///
/// | Variant | Description | HTTP Status |
/// |---------|-------------|-------------|
/// | `AuthRequired` | No or rejected credentials | 401 |
/// | `Forbidden` | Insufficient permissions | 403 |
/// | `NotFound` | Requested resource does not exist | 404 |
/// | `RateLimited` | Too many requests, retry later | 429 |
/// | `BadRequest` | Invalid request parameters | 400 |
/// | `ServerError` | Internal server error | 5xx |
/// | `Network` | Connectivity issues | N/A |
/// | `Decode` | Body was not the JSON we expected | N/A |
/// | `Unknown` | Anything else | N/A |
///
/// # Example
///
/// ```rust
/// use bitbucket_server_driver::api::common::ApiError;
///
/// let err = ApiError::NotFound("composer.json".to_string());
/// assert!(err.is_not_found());
/// ```
#[derive(Error, Debug)]
pub enum ApiError {
    /// Authentication credentials are required but missing or rejected.
    ///
    /// Self-hosted servers frequently answer anonymous REST calls with 401,
    /// which is what pushes the driver onto the clone-based fallback.
    #[error("Authentication required")]
    AuthRequired,

    /// Access to the resource is forbidden.
    ///
    /// # Parameters
    ///
    /// - `0` - Description of the forbidden action or resource
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// The requested resource was not found.
    ///
    /// # Parameters
    ///
    /// - `0` - Description of the resource that was not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// API rate limit has been exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The request was malformed or contained invalid parameters.
    ///
    /// # Parameters
    ///
    /// - `0` - Description of what was wrong with the request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal server error occurred on the Bitbucket server.
    ///
    /// # Parameters
    ///
    /// - `0` - Error message or details from the server
    #[error("Server error: {0}")]
    ServerError(String),

    /// A network-level error occurred during the request.
    ///
    /// This covers connection failures, timeouts, DNS resolution errors,
    /// TLS failures and other transport-layer issues.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body could not be decoded into the expected shape.
    #[error("Invalid response from {url}: {message}")]
    Decode {
        /// URL whose body failed to decode
        url: String,
        /// Decoder message
        message: String,
    },

    /// An unknown or unexpected error occurred.
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl ApiError {
    /// Maps a non-success HTTP status to an error variant.
    ///
    /// The message carried by the variant is extracted from the response body
    /// with [`extract_error_message`], falling back to the requested URL.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bitbucket_server_driver::api::common::ApiError;
    /// use reqwest::StatusCode;
    ///
    /// let body = r#"{"errors":[{"message":"Repository PROJ/repo does not exist."}]}"#;
    /// let err = ApiError::from_status(StatusCode::NOT_FOUND, "https://bb/rest", body);
    /// assert_eq!(err.to_string(), "Resource not found: Repository PROJ/repo does not exist.");
    /// ```
    pub fn from_status(status: StatusCode, url: &str, body: &str) -> Self {
        let message = extract_error_message(body).unwrap_or_else(|| url.to_string());

        match status {
            StatusCode::UNAUTHORIZED => Self::AuthRequired,
            StatusCode::FORBIDDEN => Self::Forbidden(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited,
            StatusCode::BAD_REQUEST => Self::BadRequest(message),
            s if s.is_server_error() => Self::ServerError(message),
            s => Self::Unknown(format!("HTTP {} for {}: {}", s.as_u16(), url, message)),
        }
    }

    /// Returns `true` for the 404-equivalent variant.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Extracts a user-friendly message from a Bitbucket error body.
///
/// Bitbucket Server returns errors in the format:
/// ```json
/// {"errors": [{"message": "Human readable message"}]}
/// ```
///
/// Proxies in front of a server sometimes answer with `{"message": "..."}`
/// instead, so that shape is accepted too.
///
/// # Returns
///
/// `None` if the body is not JSON or carries no recognisable message.
pub fn extract_error_message(body: &str) -> Option<String> {
    let json = serde_json::from_str::<serde_json::Value>(body).ok()?;

    // Server format: {"errors": [{"message": "..."}]}
    if let Some(message) = json
        .get("errors")
        .and_then(|e| e.as_array())
        .and_then(|arr| arr.first())
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
    {
        return Some(message.to_string());
    }

    json.get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_server_error_message() {
        let body = r#"{"errors":[{"context":null,"message":"Authentication failed","exceptionName":null}]}"#;
        assert_eq!(
            extract_error_message(body).as_deref(),
            Some("Authentication failed")
        );
        assert_eq!(
            extract_error_message(r#"{"message":"Bad gateway"}"#).as_deref(),
            Some("Bad gateway")
        );
        assert_eq!(extract_error_message("<html>502</html>"), None);
    }

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, "u", ""),
            ApiError::AuthRequired
        ));
        assert!(ApiError::from_status(StatusCode::NOT_FOUND, "u", "").is_not_found());
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "u", ""),
            ApiError::ServerError(_)
        ));

        let err = ApiError::from_status(StatusCode::FORBIDDEN, "https://bb/x", "");
        assert_eq!(err.to_string(), "Permission denied: https://bb/x");
    }
}
