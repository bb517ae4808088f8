//! Repository for the `complaints` table.

use meal_core::snapshot::ComplaintStatus;
use meal_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::complaint::{Complaint, CreateComplaint};

const COLUMNS: &str = "\
    id, project_id, subject, description, complainant_name, channel, \
    status, created_at, updated_at";

/// Provides create, read and status transitions for complaints.
pub struct ComplaintRepo;

impl ComplaintRepo {
    /// Log a new complaint in the `open` state.
    pub async fn create(pool: &PgPool, input: &CreateComplaint) -> Result<Complaint, sqlx::Error> {
        let query = format!(
            "INSERT INTO complaints (project_id, subject, description, complainant_name, channel, status)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Complaint>(&query)
            .bind(input.project_id)
            .bind(&input.subject)
            .bind(&input.description)
            .bind(&input.complainant_name)
            .bind(&input.channel)
            .bind(ComplaintStatus::Open.as_str())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Complaint>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM complaints WHERE id = $1");
        sqlx::query_as::<_, Complaint>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List complaints, newest first, optionally restricted to one status.
    pub async fn list<'e, E: PgExecutor<'e>>(
        executor: E,
        status: Option<ComplaintStatus>,
    ) -> Result<Vec<Complaint>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM complaints
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Complaint>(&query)
            .bind(status.map(|s| s.as_str()))
            .fetch_all(executor)
            .await
    }

    /// Set a complaint's status. Returns `None` if no row with `id` exists.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: ComplaintStatus,
    ) -> Result<Option<Complaint>, sqlx::Error> {
        let query = format!(
            "UPDATE complaints SET status = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Complaint>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }
}
