//
//  bitbucket-server-driver
//  api/testing.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/16.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! In-memory [`ContentFetcher`] for unit tests.
//!
//! Routes are exact URLs. Every request is recorded so tests can assert how many
//! times (and whether at all) the REST API was contacted.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::api::client::{ContentFetcher, FetchedContent};
use crate::api::common::ApiError;

#[derive(Debug, Default)]
pub(crate) struct FakeFetcher {
    routes: Mutex<HashMap<String, (u16, Vec<u8>)>>,
    calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn json(&self, url: &str, body: serde_json::Value) {
        self.status(url, 200, &body.to_string());
    }

    pub(crate) fn text(&self, url: &str, body: &str) {
        self.status(url, 200, body);
    }

    pub(crate) fn status(&self, url: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), (status, body.as_bytes().to_vec()));
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == url).count()
    }
}

#[async_trait]
impl ContentFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedContent, ApiError> {
        self.calls.lock().unwrap().push(url.to_string());

        let route = self.routes.lock().unwrap().get(url).cloned();
        match route {
            Some((200, body)) => Ok(FetchedContent::new(url, body)),
            Some((status, body)) => {
                let status = StatusCode::from_u16(status).unwrap();
                Err(ApiError::from_status(
                    status,
                    url,
                    &String::from_utf8_lossy(&body),
                ))
            }
            None => Err(ApiError::NotFound(url.to_string())),
        }
    }
}
