//! Project entity model and DTOs.

use chrono::NaiveDate;
use meal_core::beneficiary::BeneficiaryBreakdown;
use meal_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub sector: String,
    pub donor: Option<String>,
    pub country: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<f64>,
    pub staff_count: Option<i32>,
    pub goal: Option<String>,
    pub objectives: Option<String>,
    pub achievements: Option<String>,
    pub provinces: Vec<String>,
    pub districts: Vec<String>,
    pub communities: Vec<String>,
    pub clusters: Vec<String>,
    pub standard_sectors: Vec<String>,
    /// Raw JSONB; normalized through [`BeneficiaryBreakdown`] on conversion.
    pub beneficiaries: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    /// Convert to the domain type used by filtering and reporting.
    pub fn to_domain(&self) -> Result<meal_core::snapshot::Project, serde_json::Error> {
        let beneficiaries: BeneficiaryBreakdown = if self.beneficiaries.is_null() {
            BeneficiaryBreakdown::default()
        } else {
            serde_json::from_value(self.beneficiaries.clone())?
        };
        Ok(meal_core::snapshot::Project {
            id: self.id.to_string(),
            code: self.code.clone(),
            name: self.name.clone(),
            sector: self.sector.clone(),
            donor: self.donor.clone(),
            country: self.country.clone(),
            start_date: self.start_date.map(|d| d.format("%Y-%m-%d").to_string()),
            end_date: self.end_date.map(|d| d.format("%Y-%m-%d").to_string()),
            budget: self.budget,
            staff_count: self.staff_count,
            goal: self.goal.clone(),
            objectives: self.objectives.clone(),
            achievements: self.achievements.clone(),
            provinces: self.provinces.clone(),
            districts: self.districts.clone(),
            communities: self.communities.clone(),
            clusters: self.clusters.clone(),
            standard_sectors: self.standard_sectors.clone(),
            beneficiaries,
        })
    }
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub sector: String,
    pub donor: Option<String>,
    pub country: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<f64>,
    pub staff_count: Option<i32>,
    pub goal: Option<String>,
    pub objectives: Option<String>,
    pub achievements: Option<String>,
    #[serde(default)]
    pub provinces: Vec<String>,
    #[serde(default)]
    pub districts: Vec<String>,
    #[serde(default)]
    pub communities: Vec<String>,
    #[serde(default)]
    pub clusters: Vec<String>,
    #[serde(default)]
    pub standard_sectors: Vec<String>,
    #[serde(default)]
    pub beneficiaries: BeneficiaryBreakdown,
}

/// DTO for updating an existing project. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    pub code: Option<String>,
    pub name: Option<String>,
    pub sector: Option<String>,
    pub donor: Option<String>,
    pub country: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<f64>,
    pub staff_count: Option<i32>,
    pub goal: Option<String>,
    pub objectives: Option<String>,
    pub achievements: Option<String>,
    pub provinces: Option<Vec<String>>,
    pub districts: Option<Vec<String>>,
    pub communities: Option<Vec<String>>,
    pub clusters: Option<Vec<String>>,
    pub standard_sectors: Option<Vec<String>>,
    pub beneficiaries: Option<BeneficiaryBreakdown>,
}
