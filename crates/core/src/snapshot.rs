//! Read-only entity snapshot consumed by filtering, aggregation and
//! report compilation.
//!
//! A [`SnapshotProvider`] loads the full current state of every entity the
//! report touches. Callers receive an owned [`EntitySnapshot`]; the filter
//! engine and aggregator only ever borrow from it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::beneficiary::BeneficiaryBreakdown;
use crate::types::ProjectId;

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// A project in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub code: String,
    pub name: String,
    pub sector: String,
    pub donor: Option<String>,
    pub country: Option<String>,
    /// ISO date string, e.g. `2023-06-01`.
    pub start_date: Option<String>,
    pub end_date: Option<String>,
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

impl Project {
    /// A project with only identity fields set. Used by fixtures and
    /// form defaults.
    pub fn new(id: impl Into<ProjectId>, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            name: name.into(),
            sector: String::new(),
            donor: None,
            country: None,
            start_date: None,
            end_date: None,
            budget: None,
            staff_count: None,
            goal: None,
            objectives: None,
            achievements: None,
            provinces: Vec::new(),
            districts: Vec::new(),
            communities: Vec::new(),
            clusters: Vec::new(),
            standard_sectors: Vec::new(),
            beneficiaries: BeneficiaryBreakdown::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dependent records
// ---------------------------------------------------------------------------

/// Records that may be scoped to a single project.
///
/// `None` means the record is unscoped and survives any project filter.
pub trait ProjectScoped {
    fn project_id(&self) -> Option<&str>;
}

macro_rules! project_scoped {
    ($($ty:ty),* $(,)?) => {
        $(impl ProjectScoped for $ty {
            fn project_id(&self) -> Option<&str> {
                self.project_id.as_deref()
            }
        })*
    };
}

/// Defines a string-backed status enum with `as_str` and `label`.
macro_rules! status_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => ($key:literal, $label:literal)),* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),*
        }

        impl $name {
            /// All variants in display order.
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            /// Storage value.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $key),*
                }
            }

            /// Human-readable label.
            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),*
                }
            }

            /// Parse a storage value.
            pub fn from_str_value(s: &str) -> Result<Self, crate::error::CoreError> {
                match s {
                    $($key => Ok($name::$variant),)*
                    _ => Err(crate::error::CoreError::Validation(format!(
                        concat!("Invalid ", stringify!($name), " '{}'"),
                        s
                    ))),
                }
            }
        }
    };
}

status_enum! {
    /// Progress of a baseline survey.
    SurveyStatus {
        NotStarted => ("not_started", "Not started"),
        InProgress => ("in_progress", "In progress"),
        Completed => ("completed", "Completed"),
    }
}

status_enum! {
    /// Review state of a monthly monitoring report.
    ReportStatus {
        Draft => ("draft", "Draft"),
        Submitted => ("submitted", "Submitted"),
        Approved => ("approved", "Approved"),
        Rejected => ("rejected", "Rejected"),
    }
}

status_enum! {
    /// Kind of evaluation exercise.
    EvaluationType {
        Baseline => ("baseline", "Baseline"),
        Midterm => ("midterm", "Midterm"),
        Endline => ("endline", "Endline"),
        Final => ("final", "Final"),
        RealTime => ("real_time", "Real-time"),
        Other => ("other", "Other"),
    }
}

status_enum! {
    /// Follow-up state of a finding.
    FindingStatus {
        Open => ("open", "Open"),
        InProgress => ("in_progress", "In progress"),
        Resolved => ("resolved", "Resolved"),
        Closed => ("closed", "Closed"),
    }
}

status_enum! {
    FindingSeverity {
        Low => ("low", "Low"),
        Medium => ("medium", "Medium"),
        High => ("high", "High"),
        Critical => ("critical", "Critical"),
    }
}

status_enum! {
    /// Handling state of a beneficiary complaint.
    ComplaintStatus {
        Open => ("open", "Open"),
        UnderReview => ("under_review", "Under review"),
        Resolved => ("resolved", "Resolved"),
        Closed => ("closed", "Closed"),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineSurvey {
    pub id: String,
    pub project_id: Option<ProjectId>,
    pub title: String,
    pub status: SurveyStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub id: String,
    pub project_id: Option<ProjectId>,
    /// Reporting month as `YYYY-MM`.
    pub period: String,
    pub status: ReportStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldVisit {
    pub id: String,
    pub project_id: Option<ProjectId>,
    pub visit_date: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enumerator {
    pub id: String,
    pub project_id: Option<ProjectId>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: String,
    pub project_id: Option<ProjectId>,
    pub title: String,
    pub evaluation_type: EvaluationType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessStory {
    pub id: String,
    pub project_id: Option<ProjectId>,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub id: String,
    pub project_id: Option<ProjectId>,
    pub title: String,
    pub status: FindingStatus,
    pub severity: FindingSeverity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub id: String,
    pub project_id: Option<ProjectId>,
    pub item: String,
    pub distribution_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdmSurvey {
    pub id: String,
    pub project_id: Option<ProjectId>,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdmReport {
    pub id: String,
    pub project_id: Option<ProjectId>,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complaint {
    pub id: String,
    pub project_id: Option<ProjectId>,
    pub subject: String,
    pub status: ComplaintStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrmAwareness {
    pub id: String,
    pub project_id: Option<ProjectId>,
    pub community: Option<String>,
    pub participants: u32,
}

project_scoped!(
    BaselineSurvey,
    MonthlyReport,
    FieldVisit,
    Enumerator,
    Evaluation,
    SuccessStory,
    Finding,
    Distribution,
    PdmSurvey,
    PdmReport,
    Complaint,
    CrmAwareness,
);

// ---------------------------------------------------------------------------
// Grouped collections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitoringData {
    pub baseline_surveys: Vec<BaselineSurvey>,
    pub monthly_reports: Vec<MonthlyReport>,
    pub field_visits: Vec<FieldVisit>,
    pub enumerators: Vec<Enumerator>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationData {
    pub evaluations: Vec<Evaluation>,
    pub stories: Vec<SuccessStory>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PdmData {
    pub distributions: Vec<Distribution>,
    pub surveys: Vec<PdmSurvey>,
    pub reports: Vec<PdmReport>,
}

/// Organization branding shown in report headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branding {
    pub organization_name: String,
    /// `data:image/...;base64,...`
    pub logo_data_uri: Option<String>,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            organization_name: DEFAULT_ORGANIZATION_NAME.to_string(),
            logo_data_uri: None,
        }
    }
}

/// Shown when no branding row has been saved yet.
pub const DEFAULT_ORGANIZATION_NAME: &str = "MEAL Information System";

/// Everything a report needs, loaded in one go.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub projects: Vec<Project>,
    pub monitoring: MonitoringData,
    pub evaluation: EvaluationData,
    pub findings: Vec<Finding>,
    pub pdm: PdmData,
    pub branding: Branding,
    pub complaints: Vec<Complaint>,
    pub crm_awareness: Vec<CrmAwareness>,
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Error raised by a snapshot provider.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Snapshot source unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt snapshot data: {0}")]
    Corrupt(String),
}

/// Source of entity snapshots.
///
/// Injected into request handlers so report logic never reaches for a
/// global connection pool.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<EntitySnapshot, SnapshotError>;
}

/// Provider that hands out clones of a fixed snapshot.
#[derive(Debug, Clone, Default)]
pub struct StaticSnapshotProvider {
    snapshot: EntitySnapshot,
}

impl StaticSnapshotProvider {
    pub fn new(snapshot: EntitySnapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl SnapshotProvider for StaticSnapshotProvider {
    async fn fetch_snapshot(&self) -> Result<EntitySnapshot, SnapshotError> {
        Ok(self.snapshot.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_enums_round_trip_storage_values() {
        for s in ComplaintStatus::ALL {
            assert_eq!(ComplaintStatus::from_str_value(s.as_str()).unwrap(), *s);
        }
        for s in EvaluationType::ALL {
            assert_eq!(EvaluationType::from_str_value(s.as_str()).unwrap(), *s);
        }
    }

    #[test]
    fn status_enum_rejects_unknown_value() {
        let err = FindingStatus::from_str_value("pending").unwrap_err();
        assert!(err.to_string().contains("FindingStatus"));
    }

    #[test]
    fn serde_matches_storage_value() {
        let json = serde_json::to_string(&EvaluationType::RealTime).unwrap();
        assert_eq!(json, format!("\"{}\"", EvaluationType::RealTime.as_str()));
    }

    #[test]
    fn project_deserializes_with_missing_collections() {
        let json = serde_json::json!({
            "id": "7", "code": "AF-007", "name": "Clinics", "sector": "Health",
            "donor": null, "country": "Afghanistan",
            "start_date": "2023-01-01", "end_date": null,
            "budget": 1000.0, "staff_count": 4,
            "goal": null, "objectives": null, "achievements": null,
        });
        let p: Project = serde_json::from_value(json).unwrap();
        assert!(p.provinces.is_empty());
        assert_eq!(p.beneficiaries, BeneficiaryBreakdown::default());
    }

    #[test]
    fn scoped_records_expose_project_id() {
        let visit = FieldVisit {
            id: "v1".into(),
            project_id: Some("3".into()),
            visit_date: None,
            location: None,
        };
        assert_eq!(visit.project_id(), Some("3"));
    }

    #[tokio::test]
    async fn static_provider_returns_clone() {
        let mut snapshot = EntitySnapshot::default();
        snapshot.projects.push(Project::new("1", "P-1", "One"));
        let provider = StaticSnapshotProvider::new(snapshot.clone());
        assert_eq!(provider.fetch_snapshot().await.unwrap(), snapshot);
    }
}
