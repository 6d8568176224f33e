use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Extension, Json, Router,
};
use stockpile_core::subscriptions::{OnboardingRequest, OnboardingResult, Subscription};

use super::ApiResponse;
use crate::{auth::AuthUser, error::ApiResult, main_lib::AppState};

async fn complete_onboarding(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<OnboardingRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<OnboardingResult>>> {
    let Json(request) = payload?;
    let result = state
        .subscription_service
        .complete_onboarding(&user.user_id, request)
        .await?;
    Ok(ApiResponse::ok(result))
}

async fn get_subscription(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<ApiResponse<Subscription>>> {
    let subscription = state.subscription_service.get_subscription(&user.user_id)?;
    Ok(ApiResponse::ok(subscription))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/onboarding/complete", post(complete_onboarding))
        .route("/subscription", get(get_subscription))
}
