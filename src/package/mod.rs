//
//  bitbucket-server-driver
//  package/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/16.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Package Descriptors
//!
//! The package manifest (`composer.json`) read at one revision, and the
//! download/source references a package manager installs from.
//!
//! A descriptor keeps the fields the driver may fill in (`homepage`, `time`,
//! `support.source`, `support.issues`) as explicit options; every other key of
//! the manifest is carried through untouched in `extra`.
//!
//! Enrichment is a pure function, [`enrich`]: it only adds values that are
//! absent and never overwrites what the manifest says.
//!
//! ## Example
//!
//! ```rust
//! use bitbucket_server_driver::package::PackageDescriptor;
//! use serde_json::json;
//!
//! let descriptor = PackageDescriptor::from_json(json!({
//!     "name": "acme/app",
//!     "require": {"php": ">=8.1"},
//!     "support": "not an object"
//! }))
//! .unwrap()
//! .unwrap();
//!
//! assert_eq!(descriptor.name.as_deref(), Some("acme/app"));
//! assert_eq!(descriptor.extra["require"]["php"], ">=8.1");
//! assert!(descriptor.support.unwrap().source.is_none());
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::common::RefMap;
use crate::api::server::Endpoints;

/// Parsed manifest of one revision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,

    /// Release date in RFC 3339 form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support: Option<Support>,

    /// Every other manifest key, unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The manifest's `support` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Support {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PackageDescriptor {
    /// Builds a descriptor from a decoded manifest.
    ///
    /// Returns `Ok(None)` when the document is not an object or is an empty
    /// object. A `support` entry that is not an object is replaced by an empty
    /// one.
    ///
    /// # Errors
    ///
    /// Fails when a known field has the wrong type, e.g. a numeric `homepage`.
    pub fn from_json(value: Value) -> Result<Option<Self>, serde_json::Error> {
        let Value::Object(mut map) = value else {
            return Ok(None);
        };
        if map.is_empty() {
            return Ok(None);
        }

        if map.get("support").is_some_and(|support| !support.is_object()) {
            map.insert("support".to_string(), Value::Object(Map::new()));
        }

        serde_json::from_value(Value::Object(map)).map(Some)
    }

    /// Parses manifest bytes; see [`PackageDescriptor::from_json`].
    pub fn from_slice(bytes: &[u8]) -> Result<Option<Self>, serde_json::Error> {
        Self::from_json(serde_json::from_slice(bytes)?)
    }

    fn support_mut(&mut self) -> &mut Support {
        self.support.get_or_insert_with(Support::default)
    }
}

/// Inputs for [`enrich`].
#[derive(Debug, Clone, Copy)]
pub struct EnrichContext<'a> {
    /// Revision the manifest was read at
    pub revision: &'a str,
    pub tags: &'a RefMap,
    pub branches: &'a RefMap,
    pub endpoints: &'a Endpoints,
    /// Issue tracker URL, `None` when the repository has no tracker
    pub issues_url: Option<&'a str>,
    /// Configured website, or the repository home page
    pub homepage: Option<&'a str>,
}

/// Finds the tag or branch name for a revision.
///
/// The revision is looked up as a commit hash among tags first, then branches.
/// When nothing points at it the revision itself is the label. The second
/// value is the commit the label names, if the label is a known tag or branch.
///
/// # Example
///
/// ```rust
/// use bitbucket_server_driver::api::common::RefMap;
/// use bitbucket_server_driver::package::resolve_label;
///
/// let mut tags = RefMap::new();
/// tags.insert("v1.0".to_string(), "abc123".to_string());
/// let branches = RefMap::new();
///
/// assert_eq!(resolve_label("abc123", &tags, &branches), ("v1.0".to_string(), Some("abc123")));
/// assert_eq!(resolve_label("v1.0", &tags, &branches), ("v1.0".to_string(), Some("abc123")));
/// assert_eq!(resolve_label("fff000", &tags, &branches), ("fff000".to_string(), None));
/// ```
pub fn resolve_label<'m>(
    revision: &str,
    tags: &'m RefMap,
    branches: &'m RefMap,
) -> (String, Option<&'m str>) {
    let label = tags
        .iter()
        .chain(branches.iter())
        .find(|(_, hash)| *hash == revision)
        .map(|(name, _)| name.clone())
        .unwrap_or_else(|| revision.to_string());

    let hash = tags
        .get(&label)
        .or_else(|| branches.get(&label))
        .map(String::as_str);

    (label, hash)
}

/// Fills in `support.source`, `support.issues` and `homepage` where absent.
///
/// `support.source` points at the browse page pinned to the resolved label
/// when the label is a known tag or branch, and at the unpinned browse page
/// otherwise.
pub fn enrich(mut descriptor: PackageDescriptor, ctx: &EnrichContext<'_>) -> PackageDescriptor {
    if descriptor.support.as_ref().and_then(|s| s.source.as_ref()).is_none() {
        let (label, hash) = resolve_label(ctx.revision, ctx.tags, ctx.branches);
        let source = match hash {
            Some(_) => ctx.endpoints.browse(Some(label.as_str())),
            None => ctx.endpoints.browse(None),
        };
        descriptor.support_mut().source = Some(source);
    }

    if let Some(issues) = ctx.issues_url {
        let support = descriptor.support_mut();
        if support.issues.is_none() {
            support.issues = Some(issues.to_string());
        }
    }

    if descriptor.homepage.is_none() {
        descriptor.homepage = ctx.homepage.map(str::to_string);
    }

    descriptor
}

/// Where to download a packaged archive of a revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistReference {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub reference: String,
    /// Archives are generated on demand, so no checksum is known.
    pub shasum: String,
}

impl DistReference {
    pub fn zip(url: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            kind: "zip".to_string(),
            url: url.into(),
            reference: reference.into(),
            shasum: String::new(),
        }
    }
}

/// Where to clone a revision from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReference {
    /// VCS kind, e.g. `git`
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub reference: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn refs(entries: &[(&str, &str)]) -> RefMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn endpoints() -> Endpoints {
        Endpoints::new("https://bb.example.com", "PROJ", "app")
    }

    #[test]
    fn test_from_json_rejects_empty_and_non_objects() {
        assert!(PackageDescriptor::from_json(json!({})).unwrap().is_none());
        assert!(PackageDescriptor::from_json(json!([1, 2])).unwrap().is_none());
        assert!(PackageDescriptor::from_json(json!("x")).unwrap().is_none());
        assert!(PackageDescriptor::from_json(json!({"homepage": 3})).is_err());
    }

    #[test]
    fn test_enrich_uses_tag_label_for_hash() {
        let tags = refs(&[("v1.0", "abc123")]);
        let branches = refs(&[("main", "def456")]);
        let e = endpoints();
        let ctx = EnrichContext {
            revision: "abc123",
            tags: &tags,
            branches: &branches,
            endpoints: &e,
            issues_url: None,
            homepage: Some("https://bb.example.com/projects/PROJ/repos/app"),
        };

        let enriched = enrich(PackageDescriptor::default(), &ctx);
        let support = enriched.support.unwrap();

        assert_eq!(
            support.source.as_deref(),
            Some("https://bb.example.com/projects/PROJ/repos/app/browse?at=v1.0")
        );
        assert!(support.issues.is_none());
        assert_eq!(
            enriched.homepage.as_deref(),
            Some("https://bb.example.com/projects/PROJ/repos/app")
        );
    }

    #[test]
    fn test_enrich_branch_label_is_encoded() {
        let tags = RefMap::new();
        let branches = refs(&[("feature/login", "def456")]);
        let e = endpoints();
        let ctx = EnrichContext {
            revision: "def456",
            tags: &tags,
            branches: &branches,
            endpoints: &e,
            issues_url: None,
            homepage: None,
        };

        let enriched = enrich(PackageDescriptor::default(), &ctx);
        assert_eq!(
            enriched.support.unwrap().source.as_deref(),
            Some("https://bb.example.com/projects/PROJ/repos/app/browse?at=feature%2Flogin")
        );
        assert!(enriched.homepage.is_none());
    }

    #[test]
    fn test_enrich_unknown_revision_uses_plain_browse() {
        let tags = refs(&[("v1.0", "abc123")]);
        let branches = RefMap::new();
        let e = endpoints();
        let ctx = EnrichContext {
            revision: "0123456789abcdef",
            tags: &tags,
            branches: &branches,
            endpoints: &e,
            issues_url: None,
            homepage: None,
        };

        let enriched = enrich(PackageDescriptor::default(), &ctx);
        assert_eq!(
            enriched.support.unwrap().source.as_deref(),
            Some("https://bb.example.com/projects/PROJ/repos/app/browse")
        );
    }

    #[test]
    fn test_enrich_keeps_existing_values() {
        let descriptor = PackageDescriptor::from_json(json!({
            "homepage": "https://app.example.com",
            "support": {"source": "https://mirror.example.com/app", "email": "dev@example.com"}
        }))
        .unwrap()
        .unwrap();

        let tags = refs(&[("v1.0", "abc123")]);
        let branches = RefMap::new();
        let e = endpoints();
        let ctx = EnrichContext {
            revision: "abc123",
            tags: &tags,
            branches: &branches,
            endpoints: &e,
            issues_url: Some("https://bb.example.com/issues"),
            homepage: Some("https://ignored.example.com"),
        };

        let enriched = enrich(descriptor, &ctx);
        let support = enriched.support.as_ref().unwrap();

        assert_eq!(support.source.as_deref(), Some("https://mirror.example.com/app"));
        assert_eq!(support.issues.as_deref(), Some("https://bb.example.com/issues"));
        assert_eq!(support.extra["email"], "dev@example.com");
        assert_eq!(enriched.homepage.as_deref(), Some("https://app.example.com"));
    }

    #[test]
    fn test_dist_serializes_with_type_key() {
        let dist = DistReference::zip("https://bb/archive?at=abc&format=zip", "abc");
        assert_eq!(
            serde_json::to_value(&dist).unwrap(),
            json!({"type": "zip", "url": "https://bb/archive?at=abc&format=zip", "reference": "abc", "shasum": ""})
        );
    }
}
