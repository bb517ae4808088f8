//! Domain logic for the MEAL report service.
//!
//! The `core` crate contains no database or HTTP dependencies. Entities are
//! loaded by a [`snapshot::SnapshotProvider`] implementation and passed in by
//! the caller.

pub mod aggregate;
pub mod beneficiary;
pub mod error;
pub mod filter;
pub mod logo;
pub mod report;
pub mod snapshot;
pub mod types;
pub mod validation;
