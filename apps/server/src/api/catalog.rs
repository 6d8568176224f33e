use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use stockpile_core::catalog::{Product, ProductCategory};

use super::ApiResponse;
use crate::{error::ApiResult, main_lib::AppState};

#[derive(Deserialize)]
struct ProductQuery {
    category: Option<String>,
}

async fn list_products(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ProductQuery>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<Vec<Product>>>> {
    let Query(query) = query?;
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::parse::<ProductCategory>)
        .transpose()?;
    let products = state.catalog_service.list_products(category)?;
    Ok(ApiResponse::ok(products))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/products", get(list_products))
}
