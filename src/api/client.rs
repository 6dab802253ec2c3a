//
//  bitbucket-server-driver
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # HTTP Content Fetcher
//!
//! This module defines the boundary between the driver and the network. The
//! driver only ever asks for "the body at this URL"; everything about how the
//! request is made (TLS, credentials, proxies, retries) lives behind the
//! [`ContentFetcher`] trait.
//!
//! ## Features
//!
//! - [`ContentFetcher`]: object-safe async trait consumed by the driver
//! - [`FetchedContent`]: response body with JSON decoding helpers
//! - [`ServerClient`]: the `reqwest` implementation used in production
//!
//! ## Error Mapping
//!
//! Any non-2xx status is turned into an [`ApiError`] by
//! [`ApiError::from_status`], so callers can rely on `Ok` meaning "2xx with a
//! body".

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::common::ApiError;
use crate::auth::AuthCredential;

/// Body returned by a successful fetch.
///
/// # Example
///
/// ```rust
/// use bitbucket_server_driver::api::FetchedContent;
///
/// let content = FetchedContent::new("https://bb/rest", br#"{"slug":"repo"}"#.to_vec());
/// let value: serde_json::Value = content.decode_json().unwrap();
/// assert_eq!(value["slug"], "repo");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedContent {
    /// URL the body was fetched from
    pub url: String,
    /// Raw response body
    pub body: Vec<u8>,
}

impl FetchedContent {
    /// Wraps a response body.
    pub fn new(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            url: url.into(),
            body,
        }
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] naming the URL when the body does not
    /// match `T`.
    pub fn decode_json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body).map_err(|e| ApiError::Decode {
            url: self.url.clone(),
            message: e.to_string(),
        })
    }

    /// Returns the body as text, replacing invalid UTF-8 sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Fetches the body behind a URL.
///
/// Implementations must return `Err` for every non-2xx status and every
/// transport fault; the driver never retries.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Performs a GET request against an absolute URL.
    async fn fetch(&self, url: &str) -> Result<FetchedContent, ApiError>;
}

/// The `reqwest`-backed fetcher for Bitbucket Server/Data Center.
///
/// # Creating a Client
///
/// ```rust,no_run
/// use bitbucket_server_driver::api::ServerClient;
/// use bitbucket_server_driver::auth::AuthCredential;
///
/// let client = ServerClient::new()?
///     .with_auth(AuthCredential::bearer("your-personal-access-token"));
/// # Ok::<(), bitbucket_server_driver::api::ApiError>(())
/// ```
pub struct ServerClient {
    /// The underlying HTTP client
    http: Client,
    /// Optional authentication credentials
    auth: Option<AuthCredential>,
}

impl std::fmt::Debug for ServerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerClient")
            .field("authenticated", &self.auth.is_some())
            .finish()
    }
}

impl ServerClient {
    /// Creates an anonymous client with the crate's User-Agent.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, ApiError> {
        Ok(Self {
            http: Client::builder()
                .user_agent(format!("bbs-driver/{}", crate::VERSION))
                .build()?,
            auth: None,
        })
    }

    /// Sets the authentication credentials for this client.
    pub fn with_auth(mut self, auth: AuthCredential) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Checks whether credentials were configured.
    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }
}

#[async_trait]
impl ContentFetcher for ServerClient {
    async fn fetch(&self, url: &str) -> Result<FetchedContent, ApiError> {
        let mut request = self.http.get(url);

        if let Some(auth) = &self.auth {
            request = auth.apply_to_request(request);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            debug!(url, status = status.as_u16(), "request failed");
            return Err(ApiError::from_status(status, url, &text));
        }

        let body = response.bytes().await?;
        Ok(FetchedContent::new(url, body.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_returns_body_on_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/api/1.0/projects/PROJ/repos/repo")
            .with_status(200)
            .with_body(r#"{"slug":"repo","scmId":"git"}"#)
            .create_async()
            .await;

        let client = ServerClient::new().unwrap();
        let url = format!("{}/rest/api/1.0/projects/PROJ/repos/repo", server.url());
        let content = client.fetch(&url).await.unwrap();
        let value: serde_json::Value = content.decode_json().unwrap();

        assert_eq!(value["scmId"], "git");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_maps_status_codes() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/private")
            .with_status(401)
            .with_body(r#"{"errors":[{"message":"Authentication required"}]}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body(r#"{"errors":[{"message":"No such file"}]}"#)
            .create_async()
            .await;

        let client = ServerClient::new().unwrap();

        let err = client
            .fetch(&format!("{}/private", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::AuthRequired));

        let err = client
            .fetch(&format!("{}/missing", server.url()))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Resource not found: No such file");
    }

    #[tokio::test]
    async fn test_fetch_sends_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/secure")
            .match_header("authorization", "Bearer s3cret")
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;

        let client = ServerClient::new()
            .unwrap()
            .with_auth(AuthCredential::bearer("s3cret"));
        assert!(client.is_authenticated());

        let content = client
            .fetch(&format!("{}/secure", server.url()))
            .await
            .unwrap();
        assert_eq!(content.text(), "ok");
        mock.assert_async().await;
    }

    #[test]
    fn test_decode_error_names_url() {
        let content = FetchedContent::new("https://bb/x", b"not json".to_vec());
        let err = content.decode_json::<serde_json::Value>().unwrap_err();
        assert!(err.to_string().starts_with("Invalid response from https://bb/x"));
    }
}
