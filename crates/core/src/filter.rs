//! Report filter criteria and the project/record filter engine.
//!
//! Filters combine with AND across dimensions and OR within a dimension.
//! An empty dimension places no constraint. Dependent records are kept when
//! they are unscoped or reference a project that survived filtering.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::snapshot::{
    BaselineSurvey, Branding, Complaint, CrmAwareness, Distribution, EntitySnapshot, Enumerator,
    Evaluation, FieldVisit, Finding, MonthlyReport, PdmReport, PdmSurvey, Project, ProjectScoped,
    SuccessStory,
};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Earliest year accepted in a filter payload.
pub const MIN_FILTER_YEAR: i32 = 1900;

/// Latest year accepted in a filter payload.
pub const MAX_FILTER_YEAR: i32 = 2100;

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Query object for report generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilters {
    #[serde(default)]
    pub years: Vec<i32>,
    #[serde(default)]
    pub project_ids: Vec<String>,
    #[serde(default)]
    pub provinces: Vec<String>,
    #[serde(default)]
    pub sectors: Vec<String>,
    #[serde(default)]
    pub clusters: Vec<String>,
}

impl ReportFilters {
    /// Build filters from an untrusted JSON payload.
    ///
    /// Unknown fields are ignored. Within each array, entries of the wrong
    /// type are dropped: years must be integers (or integer strings) within
    /// [`MIN_FILTER_YEAR`]..=[`MAX_FILTER_YEAR`], every other dimension must
    /// be a non-blank string. A non-object payload yields empty filters.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let years = array_entries(obj.get("years"))
            .filter_map(parse_year)
            .collect::<Vec<_>>();

        Self {
            years: dedup_preserving_order(years),
            project_ids: string_entries(obj.get("projectIds")),
            provinces: string_entries(obj.get("provinces")),
            sectors: string_entries(obj.get("sectors")),
            clusters: string_entries(obj.get("clusters")),
        }
    }

    /// True when no dimension carries a constraint.
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
            && self.project_ids.is_empty()
            && self.provinces.is_empty()
            && self.sectors.is_empty()
            && self.clusters.is_empty()
    }
}

fn array_entries(value: Option<&serde_json::Value>) -> impl Iterator<Item = &serde_json::Value> {
    value
        .and_then(|v| v.as_array())
        .into_iter()
        .flat_map(|a| a.iter())
}

fn parse_year(value: &serde_json::Value) -> Option<i32> {
    let year = match value {
        serde_json::Value::Number(n) => n.as_i64()?,
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    let year = i32::try_from(year).ok()?;
    (MIN_FILTER_YEAR..=MAX_FILTER_YEAR)
        .contains(&year)
        .then_some(year)
}

fn string_entries(value: Option<&serde_json::Value>) -> Vec<String> {
    let entries = array_entries(value)
        .filter_map(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    dedup_preserving_order(entries)
}

fn dedup_preserving_order<T: Clone + Eq + std::hash::Hash>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// Year handling
// ---------------------------------------------------------------------------

/// Extract the calendar year from an ISO date or RFC 3339 timestamp.
///
/// Returns `None` for blank or unparseable input.
pub fn parse_date_year(raw: Option<&str>) -> Option<i32> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.year());
    }
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .ok()
        .map(|d| d.year())
}

/// Whether a project's active period covers `year`.
///
/// A missing bound is open-ended: a start date alone covers that year and
/// every later one, an end date alone covers that year and every earlier
/// one. A project with neither date is not constrained in time.
pub fn project_active_in_year(project: &Project, year: i32) -> bool {
    let start = parse_date_year(project.start_date.as_deref());
    let end = parse_date_year(project.end_date.as_deref());
    match (start, end) {
        (Some(s), Some(e)) => s <= year && year <= e,
        (Some(s), None) => year >= s,
        (None, Some(e)) => year <= e,
        (None, None) => true,
    }
}

// ---------------------------------------------------------------------------
// Project matching
// ---------------------------------------------------------------------------

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn any_eq_ignore_case(wanted: &[String], have: &[String]) -> bool {
    wanted
        .iter()
        .any(|w| have.iter().any(|h| eq_ignore_case(w, h)))
}

/// Whether a single project satisfies every non-empty filter dimension.
pub fn project_matches(project: &Project, filters: &ReportFilters) -> bool {
    if !filters.project_ids.is_empty() && !filters.project_ids.iter().any(|id| *id == project.id) {
        return false;
    }
    if !filters.sectors.is_empty()
        && !filters
            .sectors
            .iter()
            .any(|s| eq_ignore_case(s, &project.sector))
    {
        return false;
    }
    if !filters.clusters.is_empty() && !any_eq_ignore_case(&filters.clusters, &project.clusters) {
        return false;
    }
    if !filters.provinces.is_empty() && !any_eq_ignore_case(&filters.provinces, &project.provinces)
    {
        return false;
    }
    if !filters.years.is_empty()
        && !filters
            .years
            .iter()
            .any(|y| project_active_in_year(project, *y))
    {
        return false;
    }
    true
}

/// Projects matching `filters`, in input order.
pub fn filter_projects<'a>(projects: &'a [Project], filters: &ReportFilters) -> Vec<&'a Project> {
    if filters.is_empty() {
        return projects.iter().collect();
    }
    projects
        .iter()
        .filter(|p| project_matches(p, filters))
        .collect()
}

// ---------------------------------------------------------------------------
// Snapshot scoping
// ---------------------------------------------------------------------------

/// Borrowed view of a snapshot restricted to the matching projects.
#[derive(Debug, Clone)]
pub struct FilteredSnapshot<'a> {
    pub projects: Vec<&'a Project>,
    pub baseline_surveys: Vec<&'a BaselineSurvey>,
    pub monthly_reports: Vec<&'a MonthlyReport>,
    pub field_visits: Vec<&'a FieldVisit>,
    pub enumerators: Vec<&'a Enumerator>,
    pub evaluations: Vec<&'a Evaluation>,
    pub stories: Vec<&'a SuccessStory>,
    pub findings: Vec<&'a Finding>,
    pub distributions: Vec<&'a Distribution>,
    pub pdm_surveys: Vec<&'a PdmSurvey>,
    pub pdm_reports: Vec<&'a PdmReport>,
    pub complaints: Vec<&'a Complaint>,
    pub crm_awareness: Vec<&'a CrmAwareness>,
    pub branding: &'a Branding,
}

/// Keep records that are unscoped or reference an allowed project.
pub fn scope_records<'a, T: ProjectScoped>(
    records: &'a [T],
    allowed: &HashSet<&str>,
) -> Vec<&'a T> {
    records
        .iter()
        .filter(|r| r.project_id().map_or(true, |id| allowed.contains(id)))
        .collect()
}

/// Apply `filters` to a whole snapshot.
pub fn filter_snapshot<'a>(
    snapshot: &'a EntitySnapshot,
    filters: &ReportFilters,
) -> FilteredSnapshot<'a> {
    let projects = filter_projects(&snapshot.projects, filters);
    let allowed: HashSet<&str> = projects.iter().map(|p| p.id.as_str()).collect();

    FilteredSnapshot {
        baseline_surveys: scope_records(&snapshot.monitoring.baseline_surveys, &allowed),
        monthly_reports: scope_records(&snapshot.monitoring.monthly_reports, &allowed),
        field_visits: scope_records(&snapshot.monitoring.field_visits, &allowed),
        enumerators: scope_records(&snapshot.monitoring.enumerators, &allowed),
        evaluations: scope_records(&snapshot.evaluation.evaluations, &allowed),
        stories: scope_records(&snapshot.evaluation.stories, &allowed),
        findings: scope_records(&snapshot.findings, &allowed),
        distributions: scope_records(&snapshot.pdm.distributions, &allowed),
        pdm_surveys: scope_records(&snapshot.pdm.surveys, &allowed),
        pdm_reports: scope_records(&snapshot.pdm.reports, &allowed),
        complaints: scope_records(&snapshot.complaints, &allowed),
        crm_awareness: scope_records(&snapshot.crm_awareness, &allowed),
        branding: &snapshot.branding,
        projects,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
