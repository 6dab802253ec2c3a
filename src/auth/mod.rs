//
//  bitbucket-server-driver
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Authentication Module
//!
//! Credentials for the REST transport. Bitbucket Server/Data Center accepts two
//! forms over HTTP:
//!
//! - **Personal Access Token (PAT)**: sent as a bearer token
//! - **Basic Authentication**: username plus password or token
//!
//! Interactive credential entry is deliberately not handled here. When anonymous
//! or token access is rejected the driver falls back to a clone-based driver,
//! which brings its own credential handling (SSH agent, git credential helpers).
//!
//! ## Example
//!
//! ```rust
//! use bitbucket_server_driver::auth::AuthCredential;
//!
//! let credential = AuthCredential::basic("jenkins", "app-token");
//! assert_eq!(credential.username(), Some("jenkins"));
//! ```

use reqwest::RequestBuilder;

/// Credentials applied to every outgoing request.
#[derive(Clone)]
pub enum AuthCredential {
    /// HTTP access token issued by the server
    PersonalAccessToken {
        /// Token value
        token: String,
    },
    /// Username and password (or token used as password)
    Basic {
        /// Account name
        username: String,
        /// Password or token
        password: String,
    },
}

impl std::fmt::Debug for AuthCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PersonalAccessToken { .. } => f
                .debug_struct("PersonalAccessToken")
                .field("token", &"<redacted>")
                .finish(),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

impl AuthCredential {
    /// Creates a bearer-token credential.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::PersonalAccessToken {
            token: token.into(),
        }
    }

    /// Creates a username/password credential.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Builds a credential from optional CLI/environment inputs.
    ///
    /// A username turns the token into Basic auth; a lone token is sent as a
    /// bearer token; no token means anonymous access.
    pub fn from_parts(username: Option<&str>, token: Option<&str>) -> Option<Self> {
        match (username, token) {
            (Some(user), Some(token)) => Some(Self::basic(user, token)),
            (None, Some(token)) => Some(Self::bearer(token)),
            _ => None,
        }
    }

    /// Returns the account name for Basic credentials.
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Basic { username, .. } => Some(username),
            Self::PersonalAccessToken { .. } => None,
        }
    }

    pub fn apply_to_request(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::PersonalAccessToken { token } => request.bearer_auth(token),
            Self::Basic { username, password } => request.basic_auth(username, Some(password)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts() {
        assert!(AuthCredential::from_parts(None, None).is_none());
        assert!(AuthCredential::from_parts(Some("ci"), None).is_none());
        assert!(matches!(
            AuthCredential::from_parts(None, Some("t")),
            Some(AuthCredential::PersonalAccessToken { .. })
        ));
        let basic = AuthCredential::from_parts(Some("ci"), Some("t")).unwrap();
        assert_eq!(basic.username(), Some("ci"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", AuthCredential::basic("ci", "hunter2"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("ci"));
    }
}
