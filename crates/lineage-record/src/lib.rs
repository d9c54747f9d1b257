//! Lineage Record - Provenance data model
//!
//! The in-memory shape of a single job's provenance record:
//! - [`EntityRecord`] for inputs, outputs and external references
//! - [`EntitySet`] for URI-deduplicated, deterministically ordered collections
//! - [`ActivityRecord`] for the job execution itself
//! - [`ProvenanceGraph`] and the [`GraphCodec`] seam over serialization
//!
//! The record is created once at job start, finalized exactly once at job
//! completion, and never mutated thereafter. All identity flows through URIs:
//! two entities are the same entity iff their URIs are equal.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod activity;
pub mod entity;
pub mod entity_set;
pub mod graph;
pub mod turtle;

// Re-exports for convenience
pub use activity::ActivityRecord;
pub use entity::EntityRecord;
pub use entity_set::EntitySet;
pub use graph::{CodecError, GraphCodec, ProvenanceGraph, DESCRIPTOR_FILE_NAME};
pub use turtle::TurtleCodec;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
