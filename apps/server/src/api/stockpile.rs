use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use stockpile_core::{
    allocation::{AllocationBatchResponse, AllocationRequest, StockpileAllocation},
    stockpile::{HistoryPage, HistoryQuery, StockpileOverview},
};

use super::ApiResponse;
use crate::{auth::AuthUser, error::ApiResult, main_lib::AppState};

#[derive(Deserialize)]
struct AllocateBody {
    allocations: Vec<AllocationRequest>,
}

async fn allocate(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<AllocateBody>, JsonRejection>,
) -> ApiResult<Json<AllocationBatchResponse>> {
    let Json(body) = payload?;
    let response = state
        .allocation_service
        .allocate(&user.user_id, body.allocations, Utc::now())
        .await?;
    Ok(Json(response))
}

async fn get_allocations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<ApiResponse<Vec<StockpileAllocation>>>> {
    let allocations = state.allocation_service.get_allocations(&user.user_id)?;
    Ok(ApiResponse::ok(allocations))
}

async fn get_summary(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<StockpileOverview>> {
    let overview = state.stockpile_service.get_overview(&user.user_id)?;
    Ok(Json(overview))
}

async fn get_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<HistoryPage>>> {
    let Query(query) = query?;
    let page = state.stockpile_service.get_history(&user.user_id, &query)?;
    Ok(ApiResponse::ok(page))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stockpile/allocate", post(allocate))
        .route("/stockpile/allocations", get(get_allocations))
        .route("/stockpile/summary", get(get_summary))
        .route("/stockpile/history", get(get_history))
}
