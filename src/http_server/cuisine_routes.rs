//! Cuisine HTTP routes

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use futures_util::future::try_join_all;

use super::errors::ApiResult;
use super::responses::{success, ApiResponse};
use super::server::AppState;
use crate::keys;

/// Create cuisine routes
pub fn cuisine_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_cuisines))
        .route("/{cuisine}", get(restaurants_by_cuisine))
        .with_state(state)
}

async fn list_cuisines(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ApiResponse<Vec<String>>>> {
    let cuisines = state.store.smembers(&keys::cuisines()).await?;
    Ok(success(cuisines))
}

async fn restaurants_by_cuisine(
    State(state): State<Arc<AppState>>,
    Path(cuisine): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<Option<String>>>>> {
    let ids = state.store.smembers(&keys::cuisine(&cuisine)).await?;
    let store = &state.store;
    let names = try_join_all(ids.iter().map(|id| {
        let key = keys::restaurant(id);
        async move { store.hget(&key, "name").await }
    }))
    .await?;
    Ok(success(names))
}
