//! Entity records
//!
//! An entity is one artifact in a job's provenance graph: a declared input,
//! a discovered output, or an external dataset reference. Identity is the
//! URI; everything else is descriptive metadata.

use chrono::{DateTime, Utc};
use url::Url;

/// A single provenance entity.
///
/// # Invariants
/// - Identity is the URI: two records with equal URIs describe the same
///   entity regardless of their metadata.
/// - Immutable after construction; the builder-style setters consume and
///   return the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRecord {
    uri: Url,
    /// Human-readable title (usually the file or dataset name)
    pub title: Option<String>,
    /// Free-text description
    pub description: Option<String>,
    /// Attribution reference (e.g. a `mailto:` address or server URI)
    pub attributed_to: Option<String>,
    /// Creation date, where the source system recorded one
    pub created: Option<DateTime<Utc>>,
    /// Rights / copyright reference
    pub rights: Option<String>,
    /// Location the artifact bytes can be retrieved from
    pub download_url: Option<Url>,
}

impl EntityRecord {
    /// Create a bare entity identified by `uri`
    #[inline]
    #[must_use]
    pub fn new(uri: Url) -> Self {
        Self {
            uri,
            title: None,
            description: None,
            attributed_to: None,
            created: None,
            rights: None,
            download_url: None,
        }
    }

    /// Entity identity
    #[inline]
    #[must_use]
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// With title
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// With attribution
    #[inline]
    #[must_use]
    pub fn with_attribution(mut self, attributed_to: impl Into<String>) -> Self {
        self.attributed_to = Some(attributed_to.into());
        self
    }

    /// With creation date
    #[inline]
    #[must_use]
    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    /// With rights reference
    #[inline]
    #[must_use]
    pub fn with_rights(mut self, rights: impl Into<String>) -> Self {
        self.rights = Some(rights.into());
        self
    }

    /// With download URL
    #[inline]
    #[must_use]
    pub fn with_download_url(mut self, download_url: Url) -> Self {
        self.download_url = Some(download_url);
        self
    }
}
