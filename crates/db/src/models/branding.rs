//! Organization branding (single-row table).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use meal_core::types::Timestamp;

/// The row from the `branding` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Branding {
    pub organization_name: String,
    pub logo_data_uri: Option<String>,
    pub updated_at: Timestamp,
}

impl From<Branding> for meal_core::snapshot::Branding {
    fn from(row: Branding) -> Self {
        Self {
            organization_name: row.organization_name,
            logo_data_uri: row.logo_data_uri,
        }
    }
}

/// DTO for saving branding. Omitting `logo_data_uri` clears the logo.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveBranding {
    pub organization_name: String,
    pub logo_data_uri: Option<String>,
}
