use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use stockpile_core::shipments::{Shipment, ShipmentRequest};

use super::ApiResponse;
use crate::{auth::AuthUser, error::ApiResult, main_lib::AppState};

async fn trigger_shipment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<ShipmentRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<Shipment>>> {
    let Json(request) = payload?;
    let shipment = state
        .shipment_service
        .request_shipment(&user.user_id, request, Utc::now())
        .await?;
    Ok(ApiResponse::ok(shipment))
}

async fn get_shipments(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<ApiResponse<Vec<Shipment>>>> {
    let shipments = state.shipment_service.get_shipments(&user.user_id)?;
    Ok(ApiResponse::ok(shipments))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stockpile/trigger-shipment", post(trigger_shipment))
        .route("/shipments", get(get_shipments))
}
