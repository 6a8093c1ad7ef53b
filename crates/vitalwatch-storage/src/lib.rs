//! In-memory, time-indexed storage for patient measurements.
//!
//! [`store::DataStore`] maps patient identifiers to a
//! [`timeline::PatientTimeline`] each. The registry lock is only held for
//! lookups and first-time inserts; every timeline carries its own lock, so
//! producers writing for different patients never wait on each other.

pub mod error;
pub mod store;
pub mod timeline;

#[cfg(test)]
mod tests;

pub use error::{Result, StorageError};
pub use store::DataStore;
pub use timeline::PatientTimeline;
