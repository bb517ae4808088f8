//! Read-only MEAL record rows.
//!
//! These tables are maintained by data-entry workflows outside this
//! service; report generation only reads them. Each row converts into
//! its `meal_core::snapshot` counterpart, with ids rendered as strings.

use chrono::NaiveDate;
use meal_core::error::CoreError;
use meal_core::snapshot::{
    self, EvaluationType, FindingSeverity, FindingStatus, ReportStatus, SurveyStatus,
};
use meal_core::types::DbId;
use sqlx::FromRow;

fn project_ref(id: Option<DbId>) -> Option<String> {
    id.map(|id| id.to_string())
}

fn iso_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

// ---------------------------------------------------------------------------
// Monitoring
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow)]
pub struct BaselineSurveyRow {
    pub id: DbId,
    pub project_id: Option<DbId>,
    pub title: String,
    pub status: String,
}

impl BaselineSurveyRow {
    pub fn to_domain(&self) -> Result<snapshot::BaselineSurvey, CoreError> {
        Ok(snapshot::BaselineSurvey {
            id: self.id.to_string(),
            project_id: project_ref(self.project_id),
            title: self.title.clone(),
            status: SurveyStatus::from_str_value(&self.status)?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct MonthlyReportRow {
    pub id: DbId,
    pub project_id: Option<DbId>,
    pub period: String,
    pub status: String,
}

impl MonthlyReportRow {
    pub fn to_domain(&self) -> Result<snapshot::MonthlyReport, CoreError> {
        Ok(snapshot::MonthlyReport {
            id: self.id.to_string(),
            project_id: project_ref(self.project_id),
            period: self.period.clone(),
            status: ReportStatus::from_str_value(&self.status)?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct FieldVisitRow {
    pub id: DbId,
    pub project_id: Option<DbId>,
    pub visit_date: Option<NaiveDate>,
    pub location: Option<String>,
}

impl From<FieldVisitRow> for snapshot::FieldVisit {
    fn from(row: FieldVisitRow) -> Self {
        Self {
            id: row.id.to_string(),
            project_id: project_ref(row.project_id),
            visit_date: iso_date(row.visit_date),
            location: row.location,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct EnumeratorRow {
    pub id: DbId,
    pub project_id: Option<DbId>,
    pub name: String,
}

impl From<EnumeratorRow> for snapshot::Enumerator {
    fn from(row: EnumeratorRow) -> Self {
        Self {
            id: row.id.to_string(),
            project_id: project_ref(row.project_id),
            name: row.name,
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluation and learning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow)]
pub struct EvaluationRow {
    pub id: DbId,
    pub project_id: Option<DbId>,
    pub title: String,
    pub evaluation_type: String,
}

impl EvaluationRow {
    pub fn to_domain(&self) -> Result<snapshot::Evaluation, CoreError> {
        Ok(snapshot::Evaluation {
            id: self.id.to_string(),
            project_id: project_ref(self.project_id),
            title: self.title.clone(),
            evaluation_type: EvaluationType::from_str_value(&self.evaluation_type)?,
        })
    }
}

/// Shared shape of the title-only tables (`success_stories`,
/// `pdm_surveys`, `pdm_reports`).
#[derive(Debug, Clone, FromRow)]
pub struct TitledRow {
    pub id: DbId,
    pub project_id: Option<DbId>,
    pub title: String,
}

impl From<TitledRow> for snapshot::SuccessStory {
    fn from(row: TitledRow) -> Self {
        Self {
            id: row.id.to_string(),
            project_id: project_ref(row.project_id),
            title: row.title,
        }
    }
}

impl From<TitledRow> for snapshot::PdmSurvey {
    fn from(row: TitledRow) -> Self {
        Self {
            id: row.id.to_string(),
            project_id: project_ref(row.project_id),
            title: row.title,
        }
    }
}

impl From<TitledRow> for snapshot::PdmReport {
    fn from(row: TitledRow) -> Self {
        Self {
            id: row.id.to_string(),
            project_id: project_ref(row.project_id),
            title: row.title,
        }
    }
}

// ---------------------------------------------------------------------------
// Accountability
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow)]
pub struct FindingRow {
    pub id: DbId,
    pub project_id: Option<DbId>,
    pub title: String,
    pub status: String,
    pub severity: String,
}

impl FindingRow {
    pub fn to_domain(&self) -> Result<snapshot::Finding, CoreError> {
        Ok(snapshot::Finding {
            id: self.id.to_string(),
            project_id: project_ref(self.project_id),
            title: self.title.clone(),
            status: FindingStatus::from_str_value(&self.status)?,
            severity: FindingSeverity::from_str_value(&self.severity)?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CrmAwarenessRow {
    pub id: DbId,
    pub project_id: Option<DbId>,
    pub community: Option<String>,
    pub participants: i32,
}

impl From<CrmAwarenessRow> for snapshot::CrmAwareness {
    fn from(row: CrmAwarenessRow) -> Self {
        Self {
            id: row.id.to_string(),
            project_id: project_ref(row.project_id),
            community: row.community,
            // Column carries a non-negative check.
            participants: u32::try_from(row.participants).unwrap_or(0),
        }
    }
}

// ---------------------------------------------------------------------------
// Post-distribution monitoring
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow)]
pub struct DistributionRow {
    pub id: DbId,
    pub project_id: Option<DbId>,
    pub item: String,
    pub distribution_date: Option<NaiveDate>,
}

impl From<DistributionRow> for snapshot::Distribution {
    fn from(row: DistributionRow) -> Self {
        Self {
            id: row.id.to_string(),
            project_id: project_ref(row.project_id),
            item: row.item,
            distribution_date: iso_date(row.distribution_date),
        }
    }
}
