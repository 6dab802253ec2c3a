//
//  bitbucket-server-driver
//  driver/fallback.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/16.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Fallback Coordinator
//!
//! Some servers refuse anonymous REST access while still allowing SSH clones.
//! When the repository endpoint cannot be read, the driver hands every further
//! operation to a clone-based driver for the rest of its lifetime.
//!
//! ```text
//!            repository endpoint fails
//!  Active ──────────────────────────────▶ FellBack
//!    │                                      │
//!    │ REST calls                           │ delegate calls only
//! ```
//!
//! The transition is one-way. A delegate is stored only after it was created
//! and initialised; if either step fails the operation fails with
//! [`DriverError::FallbackInitFailed`] and the state stays `Active`.

use async_trait::async_trait;
use tracing::{error, warn};

use super::error::{DriverError, Result};
use super::rest::RestClient;
use super::VcsDriver;
use crate::api::ApiError;

/// Which strategy answers driver operations.
pub enum DriverState {
    /// The REST API is in use.
    Active(Box<RestClient>),
    /// Every operation is delegated to a clone-based driver.
    FellBack(Box<dyn VcsDriver>),
}

impl DriverState {
    pub fn is_fell_back(&self) -> bool {
        matches!(self, Self::FellBack(_))
    }
}

impl std::fmt::Debug for DriverState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active(client) => f.debug_tuple("Active").field(client).finish(),
            Self::FellBack(_) => f.write_str("FellBack"),
        }
    }
}

/// Builds the clone-based driver used after the REST API proved unusable.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use bitbucket_server_driver::driver::{DriverError, FallbackFactory, VcsDriver};
///
/// struct GitCloneFactory;
///
/// #[async_trait]
/// impl FallbackFactory for GitCloneFactory {
///     async fn create(&self, ssh_url: &str) -> Result<Box<dyn VcsDriver>, DriverError> {
///         Err(DriverError::Other(format!("git is not installed, cannot clone {ssh_url}")))
///     }
/// }
/// ```
#[async_trait]
pub trait FallbackFactory: Send + Sync {
    /// Creates an uninitialised driver for `ssh_url`.
    async fn create(&self, ssh_url: &str) -> Result<Box<dyn VcsDriver>>;
}

/// Factory for environments without a clone-based driver.
///
/// Every fallback attempt fails, so REST failures surface as
/// [`DriverError::FallbackInitFailed`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFallback;

#[async_trait]
impl FallbackFactory for NoFallback {
    async fn create(&self, ssh_url: &str) -> Result<Box<dyn VcsDriver>> {
        Err(DriverError::Other(format!(
            "no clone-based driver is available for {ssh_url}"
        )))
    }
}

/// Creates and initialises the delegate for `ssh_url`.
pub(crate) async fn start_fallback(
    factory: &dyn FallbackFactory,
    ssh_url: String,
    cause: &ApiError,
) -> Result<Box<dyn VcsDriver>> {
    warn!(
        ssh_url = %ssh_url,
        cause = %cause,
        "REST API unusable, switching to git driver"
    );

    let attempt = async {
        let mut delegate = factory.create(&ssh_url).await?;
        delegate.initialize().await?;
        Ok::<_, DriverError>(delegate)
    };

    match attempt.await {
        Ok(delegate) => Ok(delegate),
        Err(source) => {
            error!(
                ssh_url = %ssh_url,
                error = %source,
                "Failed to clone the {} repository, try running in interactive mode so that you can enter your Bitbucket Server credentials",
                ssh_url
            );
            Err(DriverError::FallbackInitFailed {
                ssh_url,
                source: Box::new(source),
            })
        }
    }
}
