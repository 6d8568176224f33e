use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use stockpile_core::triggers::{ShipmentReadiness, ShipmentTrigger, TriggerInput};

use super::ApiResponse;
use crate::{auth::AuthUser, error::ApiResult, main_lib::AppState};

#[derive(Deserialize)]
struct DeleteTriggerQuery {
    id: Option<String>,
}

async fn get_triggers(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<ApiResponse<Vec<ShipmentTrigger>>>> {
    let triggers = state.trigger_service.get_triggers(&user.user_id)?;
    Ok(ApiResponse::ok(triggers))
}

async fn upsert_trigger(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<TriggerInput>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<ShipmentTrigger>>> {
    let Json(input) = payload?;
    let trigger = state
        .trigger_service
        .upsert_trigger(&user.user_id, input)
        .await?;
    Ok(ApiResponse::ok(trigger))
}

async fn delete_trigger(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<DeleteTriggerQuery>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<ShipmentTrigger>>> {
    let Query(query) = query?;
    let trigger = state
        .trigger_service
        .delete_trigger(&user.user_id, query.id.as_deref().unwrap_or_default())
        .await?;
    Ok(ApiResponse::ok(trigger))
}

async fn get_readiness(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<ApiResponse<ShipmentReadiness>>> {
    let readiness = state.trigger_service.evaluate_for_user(&user.user_id)?;
    Ok(ApiResponse::ok(readiness))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/stockpile/triggers",
            get(get_triggers).post(upsert_trigger).delete(delete_trigger),
        )
        .route("/stockpile/readiness", get(get_readiness))
}
