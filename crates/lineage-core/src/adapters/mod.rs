//! Collaborator adapters
//!
//! Concrete implementations of the [`crate::ports`] traits: an in-memory
//! graph store for tests and development, and an HTTP dispatcher for real
//! registry submission.

pub mod http;
pub mod memory;
