//! Handlers for the `/projects` resource.
//!
//! Every response carries the project's beneficiary totals alongside the
//! stored row, computed with the same inclusion rules the report uses.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use meal_core::beneficiary::ReachTotals;
use meal_core::error::CoreError;
use meal_core::types::DbId;
use meal_core::validation::{
    normalize_labels, validate_project_identity, validate_project_period,
    validate_project_resources,
};
use meal_db::models::project::{CreateProject, Project, UpdateProject};
use meal_db::repositories::ProjectRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// A project row plus its beneficiary totals.
#[derive(Debug, Serialize)]
pub struct ProjectWithTotals {
    #[serde(flatten)]
    pub project: Project,
    pub totals: ReachTotals,
}

impl TryFrom<Project> for ProjectWithTotals {
    type Error = AppError;

    fn try_from(project: Project) -> Result<Self, Self::Error> {
        let domain = project.to_domain().map_err(|e| {
            AppError::InternalError(format!(
                "Project {} has unreadable beneficiaries: {e}",
                project.id
            ))
        })?;
        Ok(Self {
            totals: domain.beneficiaries.totals(),
            project,
        })
    }
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Project",
        id,
    })
}

/// Validate a create payload and normalize its label lists.
pub fn prepare_create(mut input: CreateProject) -> AppResult<CreateProject> {
    validate_project_identity(&input.code, &input.name)?;
    validate_project_period(input.start_date, input.end_date)?;
    validate_project_resources(input.budget, input.staff_count)?;

    input.code = input.code.trim().to_string();
    input.name = input.name.trim().to_string();
    input.sector = input.sector.trim().to_string();
    input.provinces = normalize_labels(&input.provinces);
    input.districts = normalize_labels(&input.districts);
    input.communities = normalize_labels(&input.communities);
    input.clusters = normalize_labels(&input.clusters);
    input.standard_sectors = normalize_labels(&input.standard_sectors);
    Ok(input)
}

/// Validate an update payload against the stored row.
pub fn prepare_update(existing: &Project, mut input: UpdateProject) -> AppResult<UpdateProject> {
    validate_project_identity(
        input.code.as_deref().unwrap_or(&existing.code),
        input.name.as_deref().unwrap_or(&existing.name),
    )?;
    validate_project_period(
        input.start_date.or(existing.start_date),
        input.end_date.or(existing.end_date),
    )?;
    validate_project_resources(input.budget, input.staff_count)?;

    let trim = |s: Option<String>| s.map(|s| s.trim().to_string());
    input.code = trim(input.code);
    input.name = trim(input.name);
    input.sector = trim(input.sector);
    for labels in [
        &mut input.provinces,
        &mut input.districts,
        &mut input.communities,
        &mut input.clusters,
        &mut input.standard_sectors,
    ] {
        if let Some(l) = labels.as_mut() {
            *l = normalize_labels(l);
        }
    }
    Ok(input)
}

/// POST /api/v1/projects
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<DataResponse<ProjectWithTotals>>)> {
    let input = prepare_create(input)?;
    let project = ProjectRepo::create(&state.pool, &input).await?;
    tracing::info!(project_id = project.id, code = %project.code, "Project created");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: project.try_into()?,
        }),
    ))
}

/// GET /api/v1/projects
pub async fn list(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ProjectWithTotals>>>> {
    let projects = ProjectRepo::list(&state.pool)
        .await?
        .into_iter()
        .map(ProjectWithTotals::try_from)
        .collect::<AppResult<Vec<_>>>()?;
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProjectWithTotals>>> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse {
        data: project.try_into()?,
    }))
}

/// PUT /api/v1/projects/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<DataResponse<ProjectWithTotals>>> {
    let existing = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let input = prepare_update(&existing, input)?;
    let project = ProjectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse {
        data: project.try_into()?,
    }))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    use super::*;

    fn create_input() -> CreateProject {
        serde_json::from_value(serde_json::json!({
            "code": " AF-01 ",
            "name": "Clinics",
            "provinces": ["Kabul", " kabul", "Balkh"],
        }))
        .unwrap()
    }

    fn stored() -> Project {
        Project {
            id: 3,
            code: "AF-01".into(),
            name: "Clinics".into(),
            sector: "Health".into(),
            donor: None,
            country: None,
            start_date: NaiveDate::from_ymd_opt(2023, 6, 1),
            end_date: None,
            budget: None,
            staff_count: None,
            goal: None,
            objectives: None,
            achievements: None,
            provinces: vec![],
            districts: vec![],
            communities: vec![],
            clusters: vec![],
            standard_sectors: vec![],
            beneficiaries: serde_json::json!({
                "adults_women": {"direct": 10, "indirect": 4},
                "households": {"direct": 50, "indirect": 0}
            }),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn create_trims_and_dedupes() {
        let input = prepare_create(create_input()).unwrap();
        assert_eq!(input.code, "AF-01");
        assert_eq!(input.provinces, vec!["Kabul", "Balkh"]);
    }

    #[test]
    fn create_rejects_reversed_period() {
        let mut input = create_input();
        input.start_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        input.end_date = NaiveDate::from_ymd_opt(2023, 1, 1);
        assert_matches!(
            prepare_create(input),
            Err(AppError::Core(CoreError::Validation(_)))
        );
    }

    #[test]
    fn update_checks_period_against_stored_start() {
        let input = UpdateProject {
            end_date: NaiveDate::from_ymd_opt(2023, 1, 1),
            ..Default::default()
        };
        assert!(prepare_update(&stored(), input).is_err());
    }

    #[test]
    fn totals_skip_households_by_default() {
        let with_totals = ProjectWithTotals::try_from(stored()).unwrap();
        assert_eq!(
            with_totals.totals,
            ReachTotals {
                direct: 10,
                indirect: 4
            }
        );
    }
}
