//
//  bitbucket-server-driver
//  cache/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/16.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Metadata Cache
//!
//! Parsed package descriptors are cached per revision so that resolving the
//! same repository again does not refetch every manifest.
//!
//! ## Layout
//!
//! ```text
//! <cache-repo-dir>/
//! └── bb.example.com%3A7990/        # origin
//!     └── PROJ/                     # owner
//!         └── app/                  # slug
//!             ├── abc123def         # one file per revision
//!             ├── feature%2Flogin
//!             └── v1.0
//! ```
//!
//! Every level and every key is escaped with
//! [`escape_path_component`], which never maps two names to the same file
//! name. Each repository therefore owns exactly one directory and each
//! revision exactly one file in it.
//!
//! ## Failure Handling
//!
//! The cache is best-effort. Unreadable entries are misses and failed writes
//! are logged; neither fails the operation that consulted the cache.
//!
//! ## Example
//!
//! ```rust
//! use bitbucket_server_driver::cache::{FileCache, MetadataCache};
//! use bitbucket_server_driver::package::PackageDescriptor;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let cache = MetadataCache::new(FileCache::new(dir.path(), "bb.example.com/PROJ/app"));
//!
//! let descriptor = PackageDescriptor { name: Some("acme/app".into()), ..Default::default() };
//! assert!(cache.write("abc123", &descriptor));
//! assert_eq!(cache.read("abc123"), Some(descriptor));
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::package::PackageDescriptor;
use crate::util::escape_path_component;

/// Key-value byte store scoped to one repository.
pub trait CacheStore: Send + Sync {
    /// Returns the stored bytes, or `None` on a miss.
    fn read(&self, key: &str) -> Option<Vec<u8>>;

    /// Stores `contents` under `key`.
    ///
    /// Returns `true` if the entry was written. Always `false` for a
    /// read-only store.
    fn write(&self, key: &str, contents: &[u8]) -> bool;

    fn set_read_only(&mut self, read_only: bool);

    fn is_read_only(&self) -> bool;
}

/// Directory-backed [`CacheStore`].
#[derive(Debug, Clone)]
pub struct FileCache {
    root: PathBuf,
    read_only: bool,
}

impl FileCache {
    /// Creates a store for the `origin/owner/slug` namespace under `base`.
    ///
    /// Owner and slug never contain `/`, so the last two segments are split
    /// off and whatever precedes them is the origin, path prefix included.
    /// Nothing is created on disk until the first write.
    pub fn new(base: &Path, namespace: &str) -> Self {
        let mut segments: Vec<&str> = namespace.rsplitn(3, '/').collect();
        segments.reverse();

        let root = segments
            .iter()
            .fold(base.to_path_buf(), |dir, segment| dir.join(escape_path_component(segment)));

        Self {
            root,
            read_only: false,
        }
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Directory holding this store's entries.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(escape_path_component(key))
    }

    fn write_entry(&self, path: &Path, contents: &[u8]) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp = self
            .root
            .join(format!(".{}.{}.tmp", file_name, std::process::id()));

        std::fs::write(&tmp, contents)?;
        if let Err(e) = std::fs::rename(&tmp, path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e);
        }
        Ok(())
    }
}

impl CacheStore for FileCache {
    fn read(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.entry_path(key);
        match std::fs::read(&path) {
            Ok(contents) => Some(contents),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read cache entry");
                None
            }
        }
    }

    fn write(&self, key: &str, contents: &[u8]) -> bool {
        if self.read_only {
            return false;
        }

        let path = self.entry_path(key);
        match self.write_entry(&path, contents) {
            Ok(()) => true,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to write cache entry");
                false
            }
        }
    }

    fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }
}

/// Whether a descriptor read at `revision` may be cached.
///
/// Any non-empty revision qualifies, branch names included.
pub fn should_cache(revision: &str) -> bool {
    !revision.is_empty()
}

/// Per-revision cache of [`PackageDescriptor`]s.
pub struct MetadataCache {
    store: Box<dyn CacheStore>,
}

impl std::fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataCache")
            .field("read_only", &self.store.is_read_only())
            .finish()
    }
}

impl MetadataCache {
    pub fn new(store: impl CacheStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Returns the cached descriptor for `revision`.
    ///
    /// Entries that no longer decode are treated as misses.
    pub fn read(&self, revision: &str) -> Option<PackageDescriptor> {
        let bytes = self.store.read(revision)?;
        match serde_json::from_slice(&bytes) {
            Ok(descriptor) => {
                debug!(revision, "metadata cache hit");
                Some(descriptor)
            }
            Err(e) => {
                warn!(revision, error = %e, "ignoring corrupt metadata cache entry");
                None
            }
        }
    }

    /// Stores `descriptor` for `revision`; a no-op in read-only mode.
    pub fn write(&self, revision: &str, descriptor: &PackageDescriptor) -> bool {
        if self.store.is_read_only() {
            return false;
        }
        match serde_json::to_vec(descriptor) {
            Ok(bytes) => self.store.write(revision, &bytes),
            Err(e) => {
                warn!(revision, error = %e, "failed to serialize descriptor for cache");
                false
            }
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.store.is_read_only()
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.store.set_read_only(read_only);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor(name: &str) -> PackageDescriptor {
        PackageDescriptor::from_json(json!({"name": name, "require": {"php": "^8.2"}}))
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MetadataCache::new(FileCache::new(dir.path(), "bb.example.com/PROJ/app"));

        assert!(cache.read("abc123").is_none());
        assert!(cache.write("abc123", &descriptor("acme/app")));
        assert_eq!(cache.read("abc123"), Some(descriptor("acme/app")));
    }

    #[test]
    fn test_read_only_write_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCache::new(dir.path(), "bb.example.com/PROJ/app");
        let root = store.root().to_path_buf();

        let mut cache = MetadataCache::new(store);
        assert!(cache.write("v1.0", &descriptor("acme/old")));

        cache.set_read_only(true);
        assert!(!cache.write("v1.0", &descriptor("acme/new")));
        assert!(!cache.write("v2.0", &descriptor("acme/new")));

        assert_eq!(cache.read("v1.0"), Some(descriptor("acme/old")));
        assert!(cache.read("v2.0").is_none());
        assert!(!root.join("v2.0").exists());
    }

    #[test]
    fn test_repositories_do_not_share_entries() {
        let dir = tempfile::tempdir().unwrap();
        let first = MetadataCache::new(FileCache::new(dir.path(), "bb.example.com/PROJ/app"));
        let second = MetadataCache::new(FileCache::new(dir.path(), "bb.example.com/PROJ/lib"));

        first.write("main", &descriptor("acme/app"));
        assert!(second.read("main").is_none());
    }

    #[test]
    fn test_similar_slugs_do_not_share_entries() {
        let dir = tempfile::tempdir().unwrap();
        let underscore = MetadataCache::new(FileCache::new(dir.path(), "bb.example.com/PROJ/a_app"));
        let dash = MetadataCache::new(FileCache::new(dir.path(), "bb.example.com/PROJ/a-app"));

        assert!(underscore.write("v1.0", &descriptor("acme/a_app")));
        assert!(dash.read("v1.0").is_none());

        assert!(dash.write("v1.0", &descriptor("acme/a-app")));
        assert_eq!(underscore.read("v1.0"), Some(descriptor("acme/a_app")));
        assert_eq!(dash.read("v1.0"), Some(descriptor("acme/a-app")));
    }

    #[test]
    fn test_path_prefix_stays_in_origin_directory() {
        let dir = tempfile::tempdir().unwrap();
        let prefixed = FileCache::new(dir.path(), "bb.example.com/bitbucket/PROJ/app");
        let plain = FileCache::new(dir.path(), "bb.example.com/PROJ/app");

        assert_eq!(
            prefixed.root(),
            dir.path().join("bb.example.com%2Fbitbucket").join("PROJ").join("app")
        );
        assert_eq!(plain.root(), dir.path().join("bb.example.com").join("PROJ").join("app"));
    }

    #[test]
    fn test_similar_revisions_do_not_share_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCache::new(dir.path(), "bb.example.com:7990/PROJ/app");

        assert!(store.write("feature/login", b"{\"name\":\"slash\"}"));
        assert!(store.write("feature-login", b"{\"name\":\"dash\"}"));

        assert!(store.root().join("feature%2Flogin").exists());
        assert!(store.root().ends_with("bb.example.com%3A7990/PROJ/app"));
        assert_eq!(store.read("feature/login").unwrap(), b"{\"name\":\"slash\"}");
        assert_eq!(store.read("feature-login").unwrap(), b"{\"name\":\"dash\"}");
    }

    #[test]
    fn test_corrupt_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCache::new(dir.path(), "bb/PROJ/app");
        store.write("abc", b"not json");

        let cache = MetadataCache::new(store);
        assert!(cache.read("abc").is_none());
    }

    #[test]
    fn test_should_cache() {
        assert!(should_cache("abc123"));
        assert!(should_cache("main"));
        assert!(!should_cache(""));
    }
}
