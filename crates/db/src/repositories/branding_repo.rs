//! Repository for the single-row `branding` table.

use sqlx::{PgExecutor, PgPool};

use crate::models::branding::{Branding, SaveBranding};

const COLUMNS: &str = "organization_name, logo_data_uri, updated_at";

/// Reads and replaces the organization's branding.
pub struct BrandingRepo;

impl BrandingRepo {
    /// Current branding, or `None` before it has ever been saved.
    pub async fn get<'e, E: PgExecutor<'e>>(executor: E) -> Result<Option<Branding>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM branding WHERE id = 1");
        sqlx::query_as::<_, Branding>(&query)
            .fetch_optional(executor)
            .await
    }

    /// Insert or replace the branding row.
    pub async fn upsert(pool: &PgPool, input: &SaveBranding) -> Result<Branding, sqlx::Error> {
        let query = format!(
            "INSERT INTO branding (id, organization_name, logo_data_uri)
             VALUES (1, $1, $2)
             ON CONFLICT (id) DO UPDATE SET
                organization_name = EXCLUDED.organization_name,
                logo_data_uri = EXCLUDED.logo_data_uri,
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Branding>(&query)
            .bind(&input.organization_name)
            .bind(&input.logo_data_uri)
            .fetch_one(pool)
            .await
    }
}
