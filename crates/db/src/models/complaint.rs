//! Beneficiary complaint model and DTOs.

use meal_core::snapshot::{self, ComplaintStatus};
use meal_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `complaints` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Complaint {
    pub id: DbId,
    pub project_id: Option<DbId>,
    pub subject: String,
    pub description: Option<String>,
    pub complainant_name: Option<String>,
    pub channel: Option<String>,
    /// One of the [`ComplaintStatus`] storage values.
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Complaint {
    /// Convert to the domain record. Fails on an unknown status value.
    pub fn to_domain(&self) -> Result<snapshot::Complaint, meal_core::error::CoreError> {
        Ok(snapshot::Complaint {
            id: self.id.to_string(),
            project_id: self.project_id.map(|id| id.to_string()),
            subject: self.subject.clone(),
            status: ComplaintStatus::from_str_value(&self.status)?,
        })
    }
}

/// DTO for logging a new complaint.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateComplaint {
    pub project_id: Option<DbId>,
    pub subject: String,
    pub description: Option<String>,
    pub complainant_name: Option<String>,
    pub channel: Option<String>,
}

/// DTO for moving a complaint through its handling states.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateComplaintStatus {
    pub status: ComplaintStatus,
}
