use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use stockpile_core::errors::{AllocationError, Error as CoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    code: &'static str,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String, Option<Value>) {
        match self {
            ApiError::Core(e) => match e {
                CoreError::Validation(_) => {
                    (StatusCode::BAD_REQUEST, "ValidationError", e.to_string(), None)
                }
                CoreError::Allocation(AllocationError::BudgetExceeded {
                    requested,
                    budget,
                    overage,
                }) => (
                    StatusCode::BAD_REQUEST,
                    "BudgetExceeded",
                    "Total allocation exceeds monthly budget".to_string(),
                    Some(json!({
                        "totalAllocation": requested,
                        "monthlyBudget": budget,
                        "remainingBudget": budget.saturating_sub(*requested),
                        "overage": overage,
                    })),
                ),
                CoreError::Allocation(AllocationError::NoSubscription) => {
                    (StatusCode::BAD_REQUEST, "NoSubscription", e.to_string(), None)
                }
                CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, "NotFound", msg.clone(), None),
                CoreError::Forbidden(msg) => {
                    (StatusCode::FORBIDDEN, "Forbidden", msg.clone(), None)
                }
                CoreError::ConstraintViolation(msg) => {
                    (StatusCode::CONFLICT, "ConstraintViolation", msg.clone(), None)
                }
                CoreError::Database(_) | CoreError::Unexpected(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "InternalError",
                    "Internal server error".to_string(),
                    Some(Value::String(e.to_string())),
                ),
            },
            ApiError::BadRequest(reason) => {
                (StatusCode::BAD_REQUEST, "ValidationError", reason.clone(), None)
            }
            ApiError::Unauthorized(reason) => {
                (StatusCode::UNAUTHORIZED, "Unauthorized", reason.clone(), None)
            }
            ApiError::Internal(reason) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalError",
                "Internal server error".to_string(),
                Some(Value::String(reason.clone())),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, error, details) = self.parts();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = Json(ErrorBody {
            success: false,
            code,
            error,
            details,
        });
        (status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
