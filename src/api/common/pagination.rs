//
//  bitbucket-server-driver
//  api/common/pagination.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Pagination for Bitbucket Server List Endpoints
//!
//! Bitbucket Server uses offset-based pagination with explicit `start` and
//! `limit` query parameters. Each page reports whether it is the last one and,
//! when it is not, the `start` value of the next page.
//!
//! # Overview
//!
//! | Item | Purpose |
//! |------|---------|
//! | [`ServerPaginatedResponse`] | One page as returned by the server |
//! | [`RefMap`] | Ordered display id -> commit hash mapping |
//! | [`fetch_ref_map`] | Walks every page of a tags/branches collection |
//!
//! # Termination
//!
//! The walk stops when `isLastPage` is `true` **or absent**. Treating a missing
//! flag as "last page" keeps nonconforming servers and proxies from sending the
//! walker into an endless loop. A `nextPageStart` that does not move forward
//! also ends the walk.
//!
//! # Example
//!
//! ```rust
//! use bitbucket_server_driver::api::common::ServerPaginatedResponse;
//! use bitbucket_server_driver::api::server::RefEntry;
//!
//! let json = r#"{
//!     "values": [{"displayId": "v1.0", "latestCommit": "abc123"}],
//!     "size": 1,
//!     "limit": 25,
//!     "isLastPage": false,
//!     "nextPageStart": 25,
//!     "start": 0
//! }"#;
//!
//! let page: ServerPaginatedResponse<RefEntry> = serde_json::from_str(json).unwrap();
//! assert!(page.has_next());
//! assert_eq!(page.next_start(), Some(25));
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ApiError;
use crate::api::client::ContentFetcher;
use crate::api::server::RefEntry;

/// Ordered mapping from display id (tag or branch name) to latest commit hash.
///
/// Insertion order follows the order the server reported; a duplicate display
/// id keeps its first position and takes the later commit. Consumers look
/// entries up by key, never by position.
pub type RefMap = IndexMap<String, String>;

/// Paginated response from Bitbucket Server/Data Center API.
///
/// `ServerPaginatedResponse` represents a single page of results. Server uses
/// offset-based pagination with explicit `start` and `limit` parameters.
///
/// # Type Parameters
///
/// - `T` - The type of items contained in the `values` array
///
/// # Fields
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | `values` | `Vec<T>` | Array of items in the current page |
/// | `size` | `u32` | Number of items in the current page |
/// | `limit` | `u32` | Maximum items per page (requested) |
/// | `is_last_page` | `Option<bool>` | Whether this is the final page |
/// | `next_page_start` | `Option<u32>` | Start index for the next page |
/// | `start` | `u32` | Start index of the current page |
///
/// # Notes
///
/// - `is_last_page` is optional on purpose: an absent flag means "last page"
/// - `values` defaults to empty so a bare `{}` page is accepted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerPaginatedResponse<T> {
    /// Array of items in the current page.
    #[serde(default = "Vec::new")]
    pub values: Vec<T>,

    /// Number of items in the current page.
    #[serde(default)]
    pub size: u32,

    /// Maximum items per page (as requested).
    #[serde(default)]
    pub limit: u32,

    /// Indicates whether this is the last page of results.
    ///
    /// `None` when the server omitted the field.
    #[serde(default, rename = "isLastPage")]
    pub is_last_page: Option<bool>,

    /// Start index for the next page of results.
    ///
    /// Use this value as the `start` parameter in the next API request.
    /// Will be `None` when `is_last_page` is `true`.
    #[serde(default, rename = "nextPageStart")]
    pub next_page_start: Option<u32>,

    /// Start index of the current page (0-indexed).
    #[serde(default)]
    pub start: u32,
}

impl<T> ServerPaginatedResponse<T> {
    /// Checks if there are more pages of results available.
    ///
    /// Only an explicit `"isLastPage": false` counts as "more pages".
    ///
    /// # Example
    ///
    /// ```rust
    /// use bitbucket_server_driver::api::common::ServerPaginatedResponse;
    ///
    /// let page: ServerPaginatedResponse<String> =
    ///     serde_json::from_str(r#"{"values": ["a"]}"#).unwrap();
    /// assert!(!page.has_next());
    /// ```
    pub fn has_next(&self) -> bool {
        self.is_last_page == Some(false)
    }

    /// Returns the start index for the next page of results.
    ///
    /// - `Some(u32)` - The start index for the next page
    /// - `None` - No next page available (this is the last page)
    pub fn next_start(&self) -> Option<u32> {
        if self.has_next() {
            self.next_page_start
        } else {
            None
        }
    }
}

/// Appends `limit` and `start` to a collection URL.
///
/// # Example
///
/// ```rust
/// use bitbucket_server_driver::api::common::page_url;
///
/// assert_eq!(
///     page_url("https://bb/rest/api/1.0/projects/P/repos/r/tags?orderBy=MODIFICATION", 100, 0),
///     "https://bb/rest/api/1.0/projects/P/repos/r/tags?orderBy=MODIFICATION&limit=100&start=0"
/// );
/// ```
pub fn page_url(resource: &str, limit: u32, start: u32) -> String {
    let separator = if resource.contains('?') { '&' } else { '?' };
    format!("{resource}{separator}limit={limit}&start={start}")
}

/// Walks a cursor-paginated tags or branches collection into a [`RefMap`].
///
/// Pages are fetched one after another; there is no prefetching. Any failed
/// page aborts the walk and the error is returned unchanged.
///
/// # Parameters
///
/// * `fetcher` - Transport used for every page
/// * `resource` - Collection URL without `limit`/`start`
/// * `limit` - Page size requested from the server
pub async fn fetch_ref_map(
    fetcher: &dyn ContentFetcher,
    resource: &str,
    limit: u32,
) -> Result<RefMap, ApiError> {
    let mut refs = RefMap::new();
    let mut start = 0;

    loop {
        let url = page_url(resource, limit, start);
        let page: ServerPaginatedResponse<RefEntry> = fetcher.fetch(&url).await?.decode_json()?;
        debug!(url = %url, entries = page.values.len(), "fetched ref page");

        let next = page.next_start();
        for entry in page.values {
            refs.insert(entry.display_id, entry.latest_commit);
        }

        match next {
            Some(next) if next > start => start = next,
            Some(next) => {
                warn!(url = %url, next, "nextPageStart did not advance, stopping pagination");
                break;
            }
            None => break,
        }
    }

    Ok(refs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeFetcher;
    use serde_json::json;

    const TAGS: &str = "https://bb.example.com/rest/api/1.0/projects/PROJ/repos/repo/tags?orderBy=MODIFICATION";

    fn page(entries: &[(&str, &str)], last: Option<bool>, next: Option<u32>) -> serde_json::Value {
        let values: Vec<_> = entries
            .iter()
            .map(|(id, commit)| json!({"id": format!("refs/tags/{id}"), "displayId": id, "latestCommit": commit}))
            .collect();
        let mut body = json!({"values": values, "size": entries.len(), "limit": 2, "start": 0});
        if let Some(last) = last {
            body["isLastPage"] = json!(last);
        }
        if let Some(next) = next {
            body["nextPageStart"] = json!(next);
        }
        body
    }

    #[tokio::test]
    async fn test_walks_all_pages_in_server_order() {
        let fetcher = FakeFetcher::new();
        fetcher.json(
            &page_url(TAGS, 2, 0),
            page(&[("v3.0", "c3"), ("v2.1", "c21")], Some(false), Some(2)),
        );
        fetcher.json(
            &page_url(TAGS, 2, 2),
            page(&[("v2.0", "c2"), ("v1.1", "c11")], Some(false), Some(4)),
        );
        fetcher.json(
            &page_url(TAGS, 2, 4),
            page(&[("v1.0", "c1"), ("v0.1", "c01")], Some(true), None),
        );

        let refs = fetch_ref_map(&fetcher, TAGS, 2).await.unwrap();

        assert_eq!(refs.len(), 6);
        let names: Vec<_> = refs.keys().map(String::as_str).collect();
        assert_eq!(names, ["v3.0", "v2.1", "v2.0", "v1.1", "v1.0", "v0.1"]);
        assert_eq!(refs["v1.1"], "c11");
        assert_eq!(fetcher.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_missing_last_page_flag_stops_after_one_page() {
        let fetcher = FakeFetcher::new();
        fetcher.json(
            &page_url(TAGS, 2, 0),
            page(&[("v1.0", "c1"), ("v0.9", "c09")], None, Some(2)),
        );

        let refs = fetch_ref_map(&fetcher, TAGS, 2).await.unwrap();

        assert_eq!(refs.len(), 2);
        assert_eq!(fetcher.calls(), vec![page_url(TAGS, 2, 0)]);
    }

    #[tokio::test]
    async fn test_duplicate_display_id_keeps_latest_commit() {
        let fetcher = FakeFetcher::new();
        fetcher.json(
            &page_url(TAGS, 2, 0),
            page(&[("main", "old"), ("dev", "d1")], Some(false), Some(2)),
        );
        fetcher.json(&page_url(TAGS, 2, 2), page(&[("main", "new")], Some(true), None));

        let refs = fetch_ref_map(&fetcher, TAGS, 2).await.unwrap();

        assert_eq!(refs.len(), 2);
        assert_eq!(refs["main"], "new");
        assert_eq!(refs.get_index(0).map(|(k, _)| k.as_str()), Some("main"));
    }

    #[tokio::test]
    async fn test_stalled_cursor_stops() {
        let fetcher = FakeFetcher::new();
        fetcher.json(&page_url(TAGS, 2, 0), page(&[("a", "1")], Some(false), Some(0)));

        let refs = fetch_ref_map(&fetcher, TAGS, 2).await.unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(fetcher.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_page_failure_propagates() {
        let fetcher = FakeFetcher::new();
        fetcher.json(&page_url(TAGS, 2, 0), page(&[("a", "1")], Some(false), Some(2)));
        fetcher.status(&page_url(TAGS, 2, 2), 500, r#"{"errors":[{"message":"boom"}]}"#);

        let err = fetch_ref_map(&fetcher, TAGS, 2).await.unwrap_err();
        assert!(matches!(err, ApiError::ServerError(ref m) if m == "boom"));
    }
}
