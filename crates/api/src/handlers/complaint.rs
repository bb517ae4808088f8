//! Handlers for the `/complaints` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use meal_core::error::CoreError;
use meal_core::snapshot::ComplaintStatus;
use meal_core::types::DbId;
use meal_core::validation::validate_complaint_subject;
use meal_db::models::complaint::{Complaint, CreateComplaint, UpdateComplaintStatus};
use meal_db::repositories::ComplaintRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ComplaintListParams {
    pub status: Option<ComplaintStatus>,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Complaint",
        id,
    })
}

/// POST /api/v1/complaints
pub async fn create(
    State(state): State<AppState>,
    Json(mut input): Json<CreateComplaint>,
) -> AppResult<(StatusCode, Json<DataResponse<Complaint>>)> {
    validate_complaint_subject(&input.subject)?;
    input.subject = input.subject.trim().to_string();

    let complaint = ComplaintRepo::create(&state.pool, &input).await?;
    tracing::info!(
        complaint_id = complaint.id,
        project_id = ?complaint.project_id,
        "Complaint logged"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: complaint })))
}

/// GET /api/v1/complaints?status=
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ComplaintListParams>,
) -> AppResult<Json<DataResponse<Vec<Complaint>>>> {
    let complaints = ComplaintRepo::list(&state.pool, params.status).await?;
    Ok(Json(DataResponse { data: complaints }))
}

/// GET /api/v1/complaints/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Complaint>>> {
    let complaint = ComplaintRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: complaint }))
}

/// PUT /api/v1/complaints/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateComplaintStatus>,
) -> AppResult<Json<DataResponse<Complaint>>> {
    let complaint = ComplaintRepo::update_status(&state.pool, id, input.status)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(complaint_id = id, status = input.status.as_str(), "Complaint status changed");
    Ok(Json(DataResponse { data: complaint }))
}
