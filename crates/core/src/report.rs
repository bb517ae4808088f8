//! Report content builder.
//!
//! Turns a snapshot and filters into an ordered list of [`Section`]
//! descriptors. No page geometry lives here; the PDF renderer walks the
//! sections and decides where they land on the page.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::aggregate::{aggregate, PortfolioSummary};
use crate::beneficiary::BeneficiaryCategory;
use crate::filter::{filter_snapshot, FilteredSnapshot, ReportFilters};
use crate::snapshot::{
    ComplaintStatus, EntitySnapshot, EvaluationType, FindingSeverity, FindingStatus, Project,
    ReportStatus, SurveyStatus,
};
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const REPORT_TITLE: &str = "MEAL Portfolio Report";

pub const REPORT_SUBTITLE: &str = "Monitoring, Evaluation, Accountability and Learning";

/// Project rows shown before the table is truncated.
pub const DEFAULT_ROW_LIMIT: usize = 15;

pub const NO_FILTERS_TEXT: &str = "No filters applied - full portfolio";
pub const NO_PROJECTS_TEXT: &str = "No projects match the selected filters.";
pub const NO_BENEFICIARY_TEXT: &str = "No beneficiary data recorded for the selected projects.";
pub const NO_EVALUATIONS_TEXT: &str = "No evaluations or success stories recorded for the selected scope.";
pub const NO_FINDINGS_TEXT: &str = "No findings recorded for the selected scope.";
pub const NO_COMPLAINTS_TEXT: &str = "No complaints recorded for the selected scope.";

pub const CLOSING_NARRATIVE: &str = "This report consolidates monitoring, evaluation, accountability \
and learning data for the selected portfolio. Figures reflect records available at the time of \
generation and should be read alongside project-level reports. Beneficiary counts are summed as \
reported by each project and may include overlap between categories and between projects \
operating in the same communities.";

/// Columns of the project portfolio table.
pub const PROJECT_TABLE_COLUMNS: [&str; 6] =
    ["Code", "Project", "Sector", "Provinces", "Period", "Direct / Indirect"];

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyValue {
    pub label: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// One row of the beneficiary bar chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarRow {
    pub label: String,
    pub direct: u64,
    pub indirect: u64,
}

/// A renderable block of report content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Section {
    Title {
        text: String,
        subtitle: Option<String>,
    },
    Heading { text: String },
    SubHeading { text: String },
    KeyValues { rows: Vec<KeyValue> },
    /// Bars are scaled against `max_value`, which is never zero.
    BarChart { rows: Vec<BarRow>, max_value: u64 },
    Table {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Notice { text: String },
    Placeholder { text: String },
    Paragraph { text: String },
    PageBreak,
}

/// The full content of one report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportDocument {
    pub organization_name: String,
    pub generated_at: Timestamp,
    pub sections: Vec<Section>,
}

/// Knobs for a single report build.
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub generated_at: Timestamp,
    pub row_limit: usize,
}

impl ReportOptions {
    pub fn new(generated_at: Timestamp) -> Self {
        Self {
            generated_at,
            row_limit: DEFAULT_ROW_LIMIT,
        }
    }
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Format a count with thousands separators, e.g. `12,345`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

fn project_period(project: &Project) -> String {
    let start = project.start_date.as_deref().map(date_prefix);
    let end = project.end_date.as_deref().map(date_prefix);
    match (start, end) {
        (Some(s), Some(e)) => format!("{s} to {e}"),
        (Some(s), None) => format!("from {s}"),
        (None, Some(e)) => format!("until {e}"),
        (None, None) => "-".to_string(),
    }
}

fn date_prefix(raw: &str) -> &str {
    raw.get(..10).unwrap_or(raw)
}

fn ratio(done: usize, total: usize) -> String {
    format!("{done} / {total}")
}

// ---------------------------------------------------------------------------
// Section builders
// ---------------------------------------------------------------------------

fn filter_scope_section(filters: &ReportFilters, snapshot: &EntitySnapshot) -> Section {
    if filters.is_empty() {
        return Section::Paragraph {
            text: NO_FILTERS_TEXT.to_string(),
        };
    }

    let mut rows = Vec::new();
    if !filters.years.is_empty() {
        let years: Vec<String> = filters.years.iter().map(|y| y.to_string()).collect();
        rows.push(KeyValue::new("Years", years.join(", ")));
    }
    if !filters.project_ids.is_empty() {
        // Show the project code when the id is known.
        let names: Vec<String> = filters
            .project_ids
            .iter()
            .map(|id| {
                snapshot
                    .projects
                    .iter()
                    .find(|p| p.id == *id)
                    .map(|p| p.code.clone())
                    .unwrap_or_else(|| id.clone())
            })
            .collect();
        rows.push(KeyValue::new("Projects", names.join(", ")));
    }
    if !filters.provinces.is_empty() {
        rows.push(KeyValue::new("Provinces", filters.provinces.join(", ")));
    }
    if !filters.sectors.is_empty() {
        rows.push(KeyValue::new("Sectors", filters.sectors.join(", ")));
    }
    if !filters.clusters.is_empty() {
        rows.push(KeyValue::new("Clusters", filters.clusters.join(", ")));
    }
    Section::KeyValues { rows }
}

fn overview_section(summary: &PortfolioSummary) -> Section {
    let reach = summary.total_reach();
    let sectors = summary.sorted_sectors();
    let clusters = summary.sorted_clusters();
    Section::KeyValues {
        rows: vec![
            KeyValue::new("Projects", summary.project_count.to_string()),
            KeyValue::new("Direct beneficiaries", format_count(reach.direct)),
            KeyValue::new("Indirect beneficiaries", format_count(reach.indirect)),
            KeyValue::new(
                format!("Provinces ({})", summary.provinces.len()),
                join_or_dash(&summary.provinces),
            ),
            KeyValue::new(format!("Sectors ({})", sectors.len()), join_or_dash(&sectors)),
            KeyValue::new(format!("Clusters ({})", clusters.len()), join_or_dash(&clusters)),
        ],
    }
}

fn beneficiary_section(summary: &PortfolioSummary) -> Section {
    let max_value = summary.peak_reach();
    if max_value == 0 {
        return Section::Placeholder {
            text: NO_BENEFICIARY_TEXT.to_string(),
        };
    }
    let rows = BeneficiaryCategory::ALL
        .into_iter()
        .map(|category| {
            let reach = summary
                .beneficiaries
                .get(&category)
                .copied()
                .unwrap_or_default();
            BarRow {
                label: category.label().to_string(),
                direct: reach.direct,
                indirect: reach.indirect,
            }
        })
        .collect();
    Section::BarChart { rows, max_value }
}

fn project_table_sections(projects: &[&Project], row_limit: usize) -> Vec<Section> {
    if projects.is_empty() {
        return vec![Section::Placeholder {
            text: NO_PROJECTS_TEXT.to_string(),
        }];
    }

    let rows = projects
        .iter()
        .take(row_limit)
        .map(|p| {
            let totals = p.beneficiaries.totals();
            vec![
                p.code.clone(),
                p.name.clone(),
                if p.sector.is_empty() { "-".to_string() } else { p.sector.clone() },
                join_or_dash(&p.provinces),
                project_period(p),
                format!("{} / {}", format_count(totals.direct), format_count(totals.indirect)),
            ]
        })
        .collect();

    let mut sections = vec![Section::Table {
        columns: PROJECT_TABLE_COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows,
    }];

    let hidden = projects.len().saturating_sub(row_limit);
    if hidden > 0 {
        sections.push(Section::Notice {
            text: format!("+{hidden} additional projects not shown"),
        });
    }
    sections
}

fn monitoring_section(scoped: &FilteredSnapshot<'_>) -> Section {
    let baselines_done = scoped
        .baseline_surveys
        .iter()
        .filter(|s| s.status == SurveyStatus::Completed)
        .count();
    let reports_approved = scoped
        .monthly_reports
        .iter()
        .filter(|r| r.status == ReportStatus::Approved)
        .count();
    let participants: u64 = scoped
        .crm_awareness
        .iter()
        .map(|s| u64::from(s.participants))
        .sum();

    Section::KeyValues {
        rows: vec![
            KeyValue::new(
                "Baseline surveys completed",
                ratio(baselines_done, scoped.baseline_surveys.len()),
            ),
            KeyValue::new(
                "Monthly reports approved",
                ratio(reports_approved, scoped.monthly_reports.len()),
            ),
            KeyValue::new("Field visits", scoped.field_visits.len().to_string()),
            KeyValue::new("Enumerators", scoped.enumerators.len().to_string()),
            KeyValue::new(
                "Community awareness sessions",
                format!(
                    "{} ({} participants)",
                    scoped.crm_awareness.len(),
                    format_count(participants)
                ),
            ),
        ],
    }
}

fn evaluation_section(scoped: &FilteredSnapshot<'_>) -> Section {
    if scoped.evaluations.is_empty() && scoped.stories.is_empty() {
        return Section::Placeholder {
            text: NO_EVALUATIONS_TEXT.to_string(),
        };
    }

    let mut by_type: BTreeMap<EvaluationType, usize> = BTreeMap::new();
    for e in &scoped.evaluations {
        *by_type.entry(e.evaluation_type).or_default() += 1;
    }

    let mut rows: Vec<KeyValue> = by_type
        .into_iter()
        .map(|(t, n)| KeyValue::new(format!("{} evaluations", t.label()), n.to_string()))
        .collect();
    rows.push(KeyValue::new("Success stories", scoped.stories.len().to_string()));
    Section::KeyValues { rows }
}

fn findings_sections(scoped: &FilteredSnapshot<'_>) -> Vec<Section> {
    let mut sections = Vec::new();

    if scoped.findings.is_empty() {
        sections.push(Section::Placeholder {
            text: NO_FINDINGS_TEXT.to_string(),
        });
    } else {
        let mut rows: Vec<KeyValue> = FindingStatus::ALL
            .iter()
            .map(|status| {
                let n = scoped.findings.iter().filter(|f| f.status == *status).count();
                KeyValue::new(format!("{} findings", status.label()), n.to_string())
            })
            .collect();
        let severe = scoped
            .findings
            .iter()
            .filter(|f| matches!(f.severity, FindingSeverity::High | FindingSeverity::Critical))
            .count();
        rows.push(KeyValue::new("High or critical severity", severe.to_string()));
        sections.push(Section::KeyValues { rows });
    }

    sections.push(Section::SubHeading {
        text: "Complaints and feedback".to_string(),
    });
    if scoped.complaints.is_empty() {
        sections.push(Section::Placeholder {
            text: NO_COMPLAINTS_TEXT.to_string(),
        });
    } else {
        let rows = ComplaintStatus::ALL
            .iter()
            .map(|status| {
                let n = scoped
                    .complaints
                    .iter()
                    .filter(|c| c.status == *status)
                    .count();
                KeyValue::new(format!("{} complaints", status.label()), n.to_string())
            })
            .collect();
        sections.push(Section::KeyValues { rows });
    }
    sections
}

fn pdm_section(scoped: &FilteredSnapshot<'_>) -> Section {
    Section::KeyValues {
        rows: vec![
            KeyValue::new("Distributions", scoped.distributions.len().to_string()),
            KeyValue::new("PDM surveys", scoped.pdm_surveys.len().to_string()),
            KeyValue::new("PDM reports", scoped.pdm_reports.len().to_string()),
        ],
    }
}

fn heading(text: &str) -> Section {
    Section::Heading {
        text: text.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Build report sections from an already filtered and aggregated snapshot.
pub fn build_report_from(
    snapshot: &EntitySnapshot,
    scoped: &FilteredSnapshot<'_>,
    summary: &PortfolioSummary,
    filters: &ReportFilters,
    options: &ReportOptions,
) -> ReportDocument {
    let mut sections = vec![
        Section::Title {
            text: REPORT_TITLE.to_string(),
            subtitle: Some(REPORT_SUBTITLE.to_string()),
        },
        heading("Report scope"),
        filter_scope_section(filters, snapshot),
        heading("1. Portfolio overview"),
        overview_section(summary),
        heading("2. Beneficiary reach"),
        beneficiary_section(summary),
        heading("3. Project portfolio"),
    ];
    sections.extend(project_table_sections(&scoped.projects, options.row_limit));
    sections.push(heading("4. Monitoring highlights"));
    sections.push(monitoring_section(scoped));

    sections.push(Section::PageBreak);

    sections.push(heading("5. Evaluation and learning"));
    sections.push(evaluation_section(scoped));
    sections.push(heading("6. Accountability and findings"));
    sections.extend(findings_sections(scoped));
    sections.push(heading("7. Post-distribution monitoring"));
    sections.push(pdm_section(scoped));
    sections.push(heading("Summary"));
    sections.push(Section::Paragraph {
        text: CLOSING_NARRATIVE.to_string(),
    });

    ReportDocument {
        organization_name: scoped.branding.organization_name.clone(),
        generated_at: options.generated_at,
        sections,
    }
}

/// Filter, aggregate and build report sections in one step.
pub fn build_report(
    snapshot: &EntitySnapshot,
    filters: &ReportFilters,
    options: &ReportOptions,
) -> ReportDocument {
    let scoped = filter_snapshot(snapshot, filters);
    let summary = aggregate(&scoped.projects);
    build_report_from(snapshot, &scoped, &summary, filters, options)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::snapshot::{Complaint, Evaluation, Finding, SuccessStory};

    fn fixed_time() -> Timestamp {
        chrono::Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
    }

    fn project(n: usize) -> Project {
        let mut p = Project::new(n.to_string(), format!("PRJ-{n:03}"), format!("Project {n}"));
        p.sector = "Health".into();
        p.provinces = vec!["Kabul".into()];
        p.start_date = Some("2023-01-01".into());
        p.end_date = Some("2023-12-31".into());
        p.beneficiaries = p
            .beneficiaries
            .with_reach(BeneficiaryCategory::AdultsWomen, 10, 20);
        p
    }

    fn snapshot_with(n: usize) -> EntitySnapshot {
        EntitySnapshot {
            projects: (1..=n).map(project).collect(),
            ..Default::default()
        }
    }

    fn find_table(doc: &ReportDocument) -> Option<&Vec<Vec<String>>> {
        doc.sections.iter().find_map(|s| match s {
            Section::Table { rows, .. } => Some(rows),
            _ => None,
        })
    }

    fn texts(doc: &ReportDocument) -> Vec<String> {
        doc.sections
            .iter()
            .filter_map(|s| match s {
                Section::Notice { text }
                | Section::Placeholder { text }
                | Section::Paragraph { text } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn format_count_inserts_separators() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn table_is_capped_with_overflow_notice() {
        let snapshot = snapshot_with(20);
        let doc = build_report(
            &snapshot,
            &ReportFilters::default(),
            &ReportOptions::new(fixed_time()),
        );
        assert_eq!(find_table(&doc).unwrap().len(), 15);
        assert!(texts(&doc).contains(&"+5 additional projects not shown".to_string()));
    }

    #[test]
    fn no_notice_when_all_rows_fit() {
        let snapshot = snapshot_with(15);
        let doc = build_report(
            &snapshot,
            &ReportFilters::default(),
            &ReportOptions::new(fixed_time()),
        );
        assert_eq!(find_table(&doc).unwrap().len(), 15);
        assert!(!texts(&doc).iter().any(|t| t.contains("additional projects")));
    }

    #[test]
    fn custom_row_limit_is_respected() {
        let snapshot = snapshot_with(5);
        let options = ReportOptions {
            row_limit: 2,
            ..ReportOptions::new(fixed_time())
        };
        let doc = build_report(&snapshot, &ReportFilters::default(), &options);
        assert_eq!(find_table(&doc).unwrap().len(), 2);
        assert!(texts(&doc).contains(&"+3 additional projects not shown".to_string()));
    }

    #[test]
    fn empty_match_uses_placeholders() {
        let snapshot = snapshot_with(3);
        let filters = ReportFilters {
            years: vec![1990],
            ..Default::default()
        };
        let doc = build_report(&snapshot, &filters, &ReportOptions::new(fixed_time()));

        assert!(find_table(&doc).is_none());
        let t = texts(&doc);
        assert!(t.contains(&NO_PROJECTS_TEXT.to_string()));
        assert!(t.contains(&NO_BENEFICIARY_TEXT.to_string()));
        assert!(t.contains(&NO_FINDINGS_TEXT.to_string()));
        assert!(t.contains(&NO_EVALUATIONS_TEXT.to_string()));
    }

    #[test]
    fn scope_line_when_no_filters() {
        let doc = build_report(
            &snapshot_with(1),
            &ReportFilters::default(),
            &ReportOptions::new(fixed_time()),
        );
        assert!(texts(&doc).contains(&NO_FILTERS_TEXT.to_string()));
    }

    #[test]
    fn scope_restates_active_filters_using_project_codes() {
        let filters = ReportFilters {
            project_ids: vec!["2".into(), "missing".into()],
            years: vec![2023],
            ..Default::default()
        };
        let doc = build_report(&snapshot_with(2), &filters, &ReportOptions::new(fixed_time()));
        let scope = doc
            .sections
            .iter()
            .find_map(|s| match s {
                Section::KeyValues { rows } if rows[0].label == "Years" => Some(rows.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(scope[0].value, "2023");
        assert_eq!(scope[1], KeyValue::new("Projects", "PRJ-002, missing"));
    }

    #[test]
    fn bar_chart_scaled_to_peak_value() {
        let doc = build_report(
            &snapshot_with(2),
            &ReportFilters::default(),
            &ReportOptions::new(fixed_time()),
        );
        let (rows, max) = doc
            .sections
            .iter()
            .find_map(|s| match s {
                Section::BarChart { rows, max_value } => Some((rows, *max_value)),
                _ => None,
            })
            .unwrap();
        assert_eq!(rows.len(), 8);
        assert_eq!(max, 40);
        let women = rows.iter().find(|r| r.label == "Women").unwrap();
        assert_eq!((women.direct, women.indirect), (20, 40));
    }

    #[test]
    fn second_page_starts_with_evaluation() {
        let doc = build_report(
            &snapshot_with(1),
            &ReportFilters::default(),
            &ReportOptions::new(fixed_time()),
        );
        let idx = doc.sections.iter().position(|s| *s == Section::PageBreak).unwrap();
        assert_eq!(
            doc.sections[idx + 1],
            Section::Heading {
                text: "5. Evaluation and learning".into()
            }
        );
        assert_eq!(doc.sections.iter().filter(|s| **s == Section::PageBreak).count(), 1);
    }

    #[test]
    fn evaluation_and_findings_are_counted() {
        let mut snapshot = snapshot_with(1);
        snapshot.evaluation.evaluations = vec![
            Evaluation {
                id: "e1".into(),
                project_id: Some("1".into()),
                title: "Mid".into(),
                evaluation_type: EvaluationType::Midterm,
            },
            Evaluation {
                id: "e2".into(),
                project_id: None,
                title: "Mid 2".into(),
                evaluation_type: EvaluationType::Midterm,
            },
        ];
        snapshot.evaluation.stories = vec![SuccessStory {
            id: "s".into(),
            project_id: None,
            title: "Story".into(),
        }];
        snapshot.findings = vec![Finding {
            id: "f".into(),
            project_id: None,
            title: "Gap".into(),
            status: FindingStatus::Open,
            severity: FindingSeverity::Critical,
        }];
        snapshot.complaints = vec![Complaint {
            id: "c".into(),
            project_id: Some("1".into()),
            subject: "Late".into(),
            status: ComplaintStatus::UnderReview,
        }];

        let doc = build_report(
            &snapshot,
            &ReportFilters::default(),
            &ReportOptions::new(fixed_time()),
        );
        let kv: Vec<KeyValue> = doc
            .sections
            .iter()
            .filter_map(|s| match s {
                Section::KeyValues { rows } => Some(rows.clone()),
                _ => None,
            })
            .flatten()
            .collect();

        assert!(kv.contains(&KeyValue::new("Midterm evaluations", "2")));
        assert!(kv.contains(&KeyValue::new("Success stories", "1")));
        assert!(kv.contains(&KeyValue::new("Open findings", "1")));
        assert!(kv.contains(&KeyValue::new("High or critical severity", "1")));
        assert!(kv.contains(&KeyValue::new("Under review complaints", "1")));
    }

    #[test]
    fn identical_inputs_build_identical_documents() {
        let snapshot = snapshot_with(4);
        let filters = ReportFilters {
            sectors: vec!["health".into()],
            ..Default::default()
        };
        let a = build_report(&snapshot, &filters, &ReportOptions::new(fixed_time()));
        let b = build_report(&snapshot, &filters, &ReportOptions::new(fixed_time()));
        assert_eq!(a, b);
    }

    #[test]
    fn document_serializes_with_section_kinds() {
        let doc = build_report(
            &snapshot_with(1),
            &ReportFilters::default(),
            &ReportOptions::new(fixed_time()),
        );
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["sections"][0]["kind"], "title");
        assert_eq!(json["sections"][0]["text"], REPORT_TITLE);
    }
}
