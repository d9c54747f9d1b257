//! Lineage Core - Provenance assembly pipeline
//!
//! Derives a stable provenance record for a cloud-executed job in two phases:
//!
//! 1. **Start**: declared inputs and staged uploads become entities, the
//!    activity record is built and persisted to the job's storage namespace.
//! 2. **Completion**: the persisted record is fetched, the storage listing is
//!    classified into descriptor / declared-input / candidate-output, and the
//!    record is finalized with its generated-entity set and end time.
//!
//! Finalization is idempotent and loss-tolerant: either phase can be retried
//! wholesale after a transient storage failure without corrupting the record.
//!
//! # Example
//!
//! ```rust,ignore
//! use lineage_core::{MemoryGraphStore, ProvenanceService, ServerIdentity};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let identity = ServerIdentity::new("http://host")?;
//! let service = ProvenanceService::new(identity, store, dispatcher, None);
//!
//! service.record_start(&job, None).await?;
//! // ... job executes ...
//! service.record_completion(&job, &listing).await?;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod adapters;
pub mod assembler;
pub mod builder;
pub mod classifier;
pub mod collector;
pub mod error;
pub mod identity;
pub mod job;
pub mod ports;
pub mod report;
pub mod service;
pub mod state;

// Re-exports for convenience
pub use adapters::http::HttpRegistryDispatcher;
pub use adapters::memory::MemoryGraphStore;
pub use assembler::GraphAssembler;
pub use builder::ActivityBuilder;
pub use classifier::{ArtifactClassifier, Classification};
pub use collector::EntityCollector;
pub use error::{DispatchError, ProvenanceError, StoreError};
pub use identity::ServerIdentity;
pub use job::{CloudFile, DeclaredInput, Job, JobId, StagedFile};
pub use ports::{GraphStore, ReportDispatcher};
pub use report::{ActivityView, ProvenanceReport};
pub use service::ProvenanceService;
pub use state::{allowed_transitions, validate_transition, ProvenanceState, TransitionError};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the provenance pipeline
    pub use crate::{
        CloudFile, DeclaredInput, GraphStore, Job, JobId, MemoryGraphStore, ProvenanceError,
        ProvenanceService, ProvenanceState, ReportDispatcher, ServerIdentity,
    };
    pub use lineage_record::{ActivityRecord, EntityRecord, EntitySet, ProvenanceGraph};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
