//! URI-deduplicated entity collections
//!
//! [`EntitySet`] is the shape both the used- and generated-entity sets take.
//! Deduplication is by URI, never by object identity, and iteration order is
//! the lexicographic order of the URIs. The ordering is what makes repeated
//! serialization of the same record byte-identical, which finalization
//! retries depend on.

use std::collections::BTreeMap;

use url::Url;

use crate::entity::EntityRecord;

/// A set of entities keyed by URI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntitySet {
    inner: BTreeMap<String, EntityRecord>,
}

impl EntitySet {
    /// Create an empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity.
    ///
    /// Returns `false` (and keeps the existing record) when an entity with
    /// the same URI is already present. First write wins: the declared form
    /// of an entity is the authoritative one.
    pub fn insert(&mut self, entity: EntityRecord) -> bool {
        let key = entity.uri().as_str().to_string();
        if self.inner.contains_key(&key) {
            return false;
        }
        self.inner.insert(key, entity);
        true
    }

    /// Whether an entity with this URI is present
    #[inline]
    #[must_use]
    pub fn contains_uri(&self, uri: &Url) -> bool {
        self.inner.contains_key(uri.as_str())
    }

    /// Look up an entity by URI
    #[inline]
    #[must_use]
    pub fn get(&self, uri: &Url) -> Option<&EntityRecord> {
        self.inner.get(uri.as_str())
    }

    /// Number of distinct entities
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the set is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate entities in URI order
    pub fn iter(&self) -> impl Iterator<Item = &EntityRecord> {
        self.inner.values()
    }

    /// Iterate entity URIs in order
    pub fn uris(&self) -> impl Iterator<Item = &Url> {
        self.inner.values().map(EntityRecord::uri)
    }

    /// Entities of `self` whose URIs do not appear in `other`.
    ///
    /// This is the finalization rule: candidates already recorded as used
    /// must never be reported as generated.
    #[must_use]
    pub fn difference(&self, other: &EntitySet) -> EntitySet {
        let inner = self
            .inner
            .iter()
            .filter(|(key, _)| !other.inner.contains_key(*key))
            .map(|(key, entity)| (key.clone(), entity.clone()))
            .collect();
        Self { inner }
    }
}

impl FromIterator<EntityRecord> for EntitySet {
    fn from_iter<I: IntoIterator<Item = EntityRecord>>(iter: I) -> Self {
        let mut set = Self::new();
        for entity in iter {
            set.insert(entity);
        }
        set
    }
}

impl<'a> IntoIterator for &'a EntitySet {
    type Item = &'a EntityRecord;
    type IntoIter = std::collections::btree_map::Values<'a, String, EntityRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(uri: &str) -> EntityRecord {
        EntityRecord::new(Url::parse(uri).unwrap())
    }

    #[test]
    fn deduplicates_by_uri() {
        let mut set = EntitySet::new();
        assert!(set.insert(entity("http://src/a").with_title("first")));
        assert!(!set.insert(entity("http://src/a").with_title("second")));
        assert_eq!(set.len(), 1);

        // First write wins
        let kept = set.get(&Url::parse("http://src/a").unwrap()).unwrap();
        assert_eq!(kept.title.as_deref(), Some("first"));
    }

    #[test]
    fn iteration_is_uri_ordered() {
        let set: EntitySet = [
            entity("http://src/c"),
            entity("http://src/a"),
            entity("http://src/b"),
        ]
        .into_iter()
        .collect();

        let uris: Vec<&str> = set.uris().map(Url::as_str).collect();
        assert_eq!(uris, vec!["http://src/a", "http://src/b", "http://src/c"]);
    }

    #[test]
    fn difference_removes_shared_uris() {
        let left: EntitySet = [entity("http://src/a"), entity("http://out/x")]
            .into_iter()
            .collect();
        let right: EntitySet = [entity("http://src/a")].into_iter().collect();

        let diff = left.difference(&right);
        assert_eq!(diff.len(), 1);
        assert!(diff.contains_uri(&Url::parse("http://out/x").unwrap()));
        assert!(!diff.contains_uri(&Url::parse("http://src/a").unwrap()));
    }

    #[test]
    fn difference_with_empty_is_identity() {
        let left: EntitySet = [entity("http://src/a")].into_iter().collect();
        let diff = left.difference(&EntitySet::new());
        assert_eq!(diff, left);
    }
}
