//! Handlers for the `/branding` resource.

use axum::extract::State;
use axum::Json;
use meal_core::logo::decode_logo;
use meal_core::snapshot::Branding;
use meal_core::validation::validate_organization_name;
use meal_db::models::branding::SaveBranding;
use meal_db::repositories::BrandingRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/branding
///
/// Falls back to the default organization name when nothing is saved.
pub async fn get(State(state): State<AppState>) -> AppResult<Json<DataResponse<Branding>>> {
    let branding = BrandingRepo::get(&state.pool)
        .await?
        .map(Branding::from)
        .unwrap_or_default();
    Ok(Json(DataResponse { data: branding }))
}

/// PUT /api/v1/branding
///
/// The logo must decode as a supported image; a blank logo clears it.
pub async fn update(
    State(state): State<AppState>,
    Json(input): Json<SaveBranding>,
) -> AppResult<Json<DataResponse<Branding>>> {
    let input = normalize(input)?;
    let saved = BrandingRepo::upsert(&state.pool, &input).await?;
    tracing::info!(
        organization_name = %saved.organization_name,
        has_logo = saved.logo_data_uri.is_some(),
        "Branding updated",
    );
    Ok(Json(DataResponse {
        data: saved.into(),
    }))
}

/// Trim the name, drop a blank logo and check that a present logo decodes.
pub fn normalize(input: SaveBranding) -> AppResult<SaveBranding> {
    validate_organization_name(&input.organization_name)?;
    let logo_data_uri = input
        .logo_data_uri
        .map(|uri| uri.trim().to_string())
        .filter(|uri| !uri.is_empty());
    if let Some(uri) = &logo_data_uri {
        decode_logo(uri).map_err(|e| AppError::BadRequest(format!("Invalid logo: {e}")))?;
    }
    Ok(SaveBranding {
        organization_name: input.organization_name.trim().to_string(),
        logo_data_uri,
    })
}
