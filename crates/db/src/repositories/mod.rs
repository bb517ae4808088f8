//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` (or, for snapshot reads, any executor) as the first argument.

pub mod branding_repo;
pub mod complaint_repo;
pub mod project_repo;
pub mod record_repo;

pub use branding_repo::BrandingRepo;
pub use complaint_repo::ComplaintRepo;
pub use project_repo::ProjectRepo;
pub use record_repo::RecordRepo;
