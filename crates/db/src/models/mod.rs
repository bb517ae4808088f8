//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//!
//! [`records`] holds read-only rows that only feed report snapshots.

pub mod branding;
pub mod complaint;
pub mod project;
pub mod records;
