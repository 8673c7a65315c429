//! Static dataset endpoints

use axum::extract::{Path, State};
use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::{FarmRecord, SlaughterhouseRecord};
use shared::StaticDataset;

use crate::state::AppState;

/// GET /api/dataset
pub async fn get_dataset(State(state): State<AppState>) -> ApiResponse<StaticDataset> {
    ApiResponse::success(state.dataset.as_ref().clone())
}

/// GET /api/farms
pub async fn list_farms(State(state): State<AppState>) -> ApiResponse<Vec<FarmRecord>> {
    ApiResponse::success(state.dataset.farms.clone())
}

/// GET /api/farms/{id}
pub async fn get_farm(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<FarmRecord>> {
    let farm = state.dataset.farm(&id).cloned().ok_or_else(|| {
        AppError::with_message(ErrorCode::FarmNotFound, format!("Farm {id} not found"))
            .with_detail("farm_id", id.clone())
    })?;
    Ok(ApiResponse::success(farm))
}

/// GET /api/slaughterhouses
pub async fn list_slaughterhouses(
    State(state): State<AppState>,
) -> ApiResponse<Vec<SlaughterhouseRecord>> {
    ApiResponse::success(state.dataset.slaughterhouses.clone())
}

/// GET /api/slaughterhouses/{id}
pub async fn get_slaughterhouse(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<SlaughterhouseRecord>> {
    let slaughterhouse = state.dataset.slaughterhouse(&id).cloned().ok_or_else(|| {
        AppError::with_message(
            ErrorCode::SlaughterhouseNotFound,
            format!("Slaughterhouse {id} not found"),
        )
        .with_detail("slaughterhouse_id", id.clone())
    })?;
    Ok(ApiResponse::success(slaughterhouse))
}
