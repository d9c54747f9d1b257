//! Artifact classification
//!
//! Partitions a flat cloud-file listing into descriptor, declared inputs and
//! candidate outputs. Storage offers no flags to lean on; the only evidence
//! is file names. The partition is disjoint and exhaustive, comparison is
//! exact and case-sensitive, and the descriptor name wins over a declared
//! name when both match.

use crate::job::CloudFile;

/// Result of partitioning a storage listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// The persisted provenance descriptor, if present
    pub descriptor: Vec<CloudFile>,
    /// Files matching a declared-input name
    pub declared_inputs: Vec<CloudFile>,
    /// Everything else: potential outputs, or inputs that arrived undeclared
    pub candidates: Vec<CloudFile>,
}

impl Classification {
    /// Total number of classified files; equals the listing length
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptor.len() + self.declared_inputs.len() + self.candidates.len()
    }

    /// Whether the listing was empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partitions cloud-file listings
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactClassifier;

impl ArtifactClassifier {
    /// Classify every file in `files`.
    ///
    /// Priority order per file: descriptor name, then declared names, then
    /// candidate. A file matching both the descriptor name and a declared
    /// name is the descriptor; that collision is a product-policy decision,
    /// not an error.
    #[must_use]
    pub fn classify(
        files: &[CloudFile],
        declared_names: &[String],
        descriptor_name: &str,
    ) -> Classification {
        let mut classification = Classification::default();
        for file in files {
            if file.name == descriptor_name {
                classification.descriptor.push(file.clone());
            } else if declared_names.iter().any(|name| *name == file.name) {
                classification.declared_inputs.push(file.clone());
            } else {
                classification.candidates.push(file.clone());
            }
        }
        classification
    }
}
