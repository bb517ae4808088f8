//! Input validation for registry writes (projects, complaints, branding).
//!
//! Pure functions; the API layer calls them before touching the database.

use chrono::NaiveDate;

use crate::error::CoreError;

/// Maximum length of names, codes and subjects.
pub const MAX_NAME_LENGTH: usize = 200;

fn require_text(field: &str, value: &str) -> Result<(), CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a project's code and name.
pub fn validate_project_identity(code: &str, name: &str) -> Result<(), CoreError> {
    require_text("Project code", code)?;
    require_text("Project name", name)
}

/// The end date, when both are set, must not precede the start date.
pub fn validate_project_period(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), CoreError> {
    match (start, end) {
        (Some(s), Some(e)) if e < s => Err(CoreError::Validation(format!(
            "Project end date {e} is before start date {s}"
        ))),
        _ => Ok(()),
    }
}

/// Budget and staff count, when present, must be non-negative.
pub fn validate_project_resources(
    budget: Option<f64>,
    staff_count: Option<i32>,
) -> Result<(), CoreError> {
    if let Some(b) = budget {
        if !b.is_finite() || b < 0.0 {
            return Err(CoreError::Validation(
                "Budget must be a non-negative number".to_string(),
            ));
        }
    }
    if staff_count.is_some_and(|n| n < 0) {
        return Err(CoreError::Validation(
            "Staff count must not be negative".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_complaint_subject(subject: &str) -> Result<(), CoreError> {
    require_text("Complaint subject", subject)
}

pub fn validate_organization_name(name: &str) -> Result<(), CoreError> {
    require_text("Organization name", name)
}

/// Trim labels, drop blanks and remove case-insensitive duplicates,
/// keeping the first spelling seen.
pub fn normalize_labels(labels: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    labels
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .filter(|l| seen.insert(l.to_lowercase()))
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn identity_requires_code_and_name() {
        assert!(validate_project_identity("AF-01", "Clinics").is_ok());
        assert_matches!(
            validate_project_identity("  ", "Clinics"),
            Err(CoreError::Validation(msg)) if msg.contains("code")
        );
        let long = "x".repeat(MAX_NAME_LENGTH + 1);
        assert!(validate_project_identity("AF-01", &long).is_err());
    }

    #[test]
    fn period_rejects_reversed_dates() {
        let (earlier, later) = (date("2023-01-01"), date("2024-01-01"));
        assert!(validate_project_period(Some(later), Some(earlier)).is_err());
        assert!(validate_project_period(Some(earlier), Some(earlier)).is_ok());
        assert!(validate_project_period(None, Some(date("2023-01-01"))).is_ok());
    }

    #[test]
    fn resources_must_be_non_negative() {
        assert!(validate_project_resources(Some(0.0), Some(0)).is_ok());
        assert!(validate_project_resources(Some(-1.0), None).is_err());
        assert!(validate_project_resources(Some(f64::NAN), None).is_err());
        assert!(validate_project_resources(None, Some(-3)).is_err());
    }

    #[test]
    fn labels_are_trimmed_and_deduplicated() {
        let labels = vec![" Kabul".to_string(), "kabul".into(), "".into(), "Balkh ".into()];
        assert_eq!(normalize_labels(&labels), vec!["Kabul", "Balkh"]);
    }
}
