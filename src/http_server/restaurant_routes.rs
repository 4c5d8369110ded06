//! Restaurant HTTP routes
//!
//! Every handler translates directly into store commands; independent
//! commands for one request are issued concurrently.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get},
    Json, Router,
};
use chrono::Utc;
use futures_util::future::try_join_all;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::errors::{ApiError, ApiResult};
use super::responses::{success, success_with, ApiResponse};
use super::server::AppState;
use crate::keys;
use crate::schema::{parse_body, CreateRestaurant, CreateReview, RestaurantDetails};
use crate::search::SearchResults;

/// Create restaurant routes
pub fn restaurant_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_restaurants).post(create_restaurant))
        .route("/search", get(search_restaurants))
        .route("/{restaurant_id}", get(get_restaurant))
        .route(
            "/{restaurant_id}/details",
            get(get_restaurant_details).post(set_restaurant_details),
        )
        .route("/{restaurant_id}/weather", get(get_weather))
        .route(
            "/{restaurant_id}/reviews",
            get(list_reviews).post(add_review),
        )
        .route(
            "/{restaurant_id}/reviews/{review_id}",
            delete(delete_review),
        )
        .with_state(state)
}

// ==================
// Query types
// ==================

#[derive(Debug, Deserialize)]
struct PageQuery {
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

impl PageQuery {
    /// Inclusive `[start, stop]` window for list and sorted-set reads.
    fn window(&self) -> (usize, usize) {
        let limit = self.limit.max(1) as usize;
        let start = (self.page.max(1) as usize - 1) * limit;
        (start, start + limit - 1)
    }
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

// ==================
// Helpers
// ==================

/// Guard shared by every id-scoped route, mirroring the order the source
/// system applied it: before body validation.
async fn ensure_restaurant_exists(state: &AppState, restaurant_id: &str) -> ApiResult<()> {
    if state.store.exists(&keys::restaurant(restaurant_id)).await {
        Ok(())
    } else {
        Err(ApiError::RestaurantNotFound)
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ==================
// Restaurant handlers
// ==================

async fn list_restaurants(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<ApiResponse<Vec<HashMap<String, String>>>>> {
    let (start, stop) = page.window();
    let ids = state
        .store
        .zrevrange(&keys::restaurants_by_rating(), start, stop)
        .await?;
    let store = &state.store;
    let restaurants = try_join_all(ids.iter().map(|id| {
        let key = keys::restaurant(id);
        async move { store.hgetall(&key).await }
    }))
    .await?;
    Ok(success(restaurants))
}

async fn create_restaurant(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> ApiResult<Json<ApiResponse<Value>>> {
    let data: CreateRestaurant = parse_body(&body)?;

    let duplicate_probe = format!("{}:{}", data.name, data.location);
    let seen_before = state
        .store
        .bf_exists(&keys::restaurant_bloom(), &duplicate_probe)
        .await?;
    if seen_before {
        return Err(ApiError::DuplicateRestaurant);
    }

    let id = Uuid::new_v4().to_string();
    let id_ref = id.as_str();
    let store = &state.store;
    let restaurant_key = keys::restaurant(id_ref);
    let restaurant_fields = [
        ("id", id_ref),
        ("name", &data.name),
        ("location", &data.location),
    ];
    let by_rating_key = keys::restaurants_by_rating();
    let bloom_key = keys::restaurant_bloom();
    tokio::try_join!(
        store.hset(&restaurant_key, &restaurant_fields),
        store.zadd(&by_rating_key, 0.0, id_ref),
        store.bf_add(&bloom_key, &duplicate_probe),
        async {
            try_join_all(data.cuisines.iter().map(|cuisine| async move {
                let cuisines_key = keys::cuisines();
                let cuisine_key = keys::cuisine(cuisine);
                let restaurant_cuisines_key = keys::restaurant_cuisines(id_ref);
                tokio::try_join!(
                    store.sadd(&cuisines_key, cuisine),
                    store.sadd(&cuisine_key, id_ref),
                    store.sadd(&restaurant_cuisines_key, cuisine),
                )
            }))
            .await
            .map(|_| ())
        },
    )?;

    tracing::info!(%id, name = %data.name, "restaurant created");
    Ok(success_with(
        "Added new restaurant",
        json!({"id": id, "name": data.name, "location": data.location}),
    ))
}

async fn search_restaurants(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<ApiResponse<SearchResults>>> {
    let results = state
        .store
        .ft_search(&keys::restaurant_index(), &query.q)
        .await?;
    Ok(success(results))
}

async fn get_restaurant(
    State(state): State<Arc<AppState>>,
    Path(restaurant_id): Path<String>,
) -> ApiResult<Json<ApiResponse<Value>>> {
    ensure_restaurant_exists(&state, &restaurant_id).await?;

    let restaurant_key = keys::restaurant(&restaurant_id);
    let restaurant_cuisines_key = keys::restaurant_cuisines(&restaurant_id);
    let (restaurant, _view_count, cuisines) = tokio::try_join!(
        state.store.hgetall(&restaurant_key),
        state.store.hincrby(&restaurant_key, "viewCount", 1),
        state.store.smembers(&restaurant_cuisines_key),
    )?;

    let mut data = serde_json::Map::new();
    for (field, value) in restaurant {
        data.insert(field, Value::String(value));
    }
    data.insert("cuisines".to_string(), json!(cuisines));
    Ok(success(Value::Object(data)))
}

// ==================
// Details handlers
// ==================

async fn set_restaurant_details(
    State(state): State<Arc<AppState>>,
    Path(restaurant_id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Json<ApiResponse<Value>>> {
    ensure_restaurant_exists(&state, &restaurant_id).await?;
    let data: RestaurantDetails = parse_body(&body)?;

    state
        .store
        .json_set(
            &keys::restaurant_details(&restaurant_id),
            serde_json::to_value(&data)?,
        )
        .await?;
    Ok(success_with("Restaurant details added", json!({})))
}

async fn get_restaurant_details(
    State(state): State<Arc<AppState>>,
    Path(restaurant_id): Path<String>,
) -> ApiResult<Json<ApiResponse<Value>>> {
    ensure_restaurant_exists(&state, &restaurant_id).await?;
    let details = state
        .store
        .json_get(&keys::restaurant_details(&restaurant_id))
        .await?;
    Ok(success(details.unwrap_or(Value::Null)))
}

// ==================
// Weather handler
// ==================

async fn get_weather(
    State(state): State<Arc<AppState>>,
    Path(restaurant_id): Path<String>,
) -> ApiResult<Json<ApiResponse<Value>>> {
    ensure_restaurant_exists(&state, &restaurant_id).await?;

    let weather_key = keys::weather(&restaurant_id);
    if let Some(cached) = state.store.get(&weather_key).await? {
        let report: Value = serde_json::from_str(&cached)?;
        return Ok(success(report));
    }

    let coordinates = state
        .store
        .hget(&keys::restaurant(&restaurant_id), "location")
        .await?
        .ok_or(ApiError::CoordinatesNotFound)?;
    // stored as "lng,lat"
    let (lon, lat) = coordinates
        .split_once(',')
        .ok_or(ApiError::CoordinatesNotFound)?;

    let report = state.weather.fetch(lat.trim(), lon.trim()).await?;
    state
        .store
        .set_ex(
            &weather_key,
            &report.to_string(),
            Duration::from_secs(state.config.weather_cache_secs),
        )
        .await?;
    Ok(success(report))
}

// ==================
// Review handlers
// ==================

async fn add_review(
    State(state): State<Arc<AppState>>,
    Path(restaurant_id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Json<ApiResponse<Value>>> {
    ensure_restaurant_exists(&state, &restaurant_id).await?;
    let data: CreateReview = parse_body(&body)?;

    let review_id = Uuid::new_v4().to_string();
    let timestamp = Utc::now().timestamp_millis();
    let restaurant_key = keys::restaurant(&restaurant_id);
    let rating_repr = data.rating.to_string();
    let timestamp_repr = timestamp.to_string();

    let reviews_key = keys::reviews(&restaurant_id);
    let review_details_key = keys::review_details(&review_id);
    let review_fields = [
        ("id", review_id.as_str()),
        ("review", &data.review),
        ("rating", &rating_repr),
        ("timestamp", &timestamp_repr),
        ("restaurantId", &restaurant_id),
    ];
    let (review_count, _, total_stars) = tokio::try_join!(
        state.store.lpush(&reviews_key, &review_id),
        state.store.hset(&review_details_key, &review_fields),
        state
            .store
            .hincrbyfloat(&restaurant_key, "totalStars", data.rating),
    )?;

    // read-compute-write with no isolation; concurrent reviews can race
    let average = round_to_tenth(total_stars / review_count as f64);
    let average_repr = average.to_string();
    let by_rating_key = keys::restaurants_by_rating();
    let avg_fields = [("avgStars", average_repr.as_str())];
    tokio::try_join!(
        state.store.zadd(&by_rating_key, average, &restaurant_id),
        state.store.hset(&restaurant_key, &avg_fields),
    )?;

    Ok(success_with(
        "Review Added",
        json!({
            "id": review_id,
            "review": data.review,
            "rating": data.rating,
            "timestamp": timestamp,
            "restaurantId": restaurant_id,
        }),
    ))
}

async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Path(restaurant_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<ApiResponse<Vec<HashMap<String, String>>>>> {
    ensure_restaurant_exists(&state, &restaurant_id).await?;

    let (start, stop) = page.window();
    let review_ids = state
        .store
        .lrange(&keys::reviews(&restaurant_id), start, stop)
        .await?;
    let store = &state.store;
    let reviews = try_join_all(review_ids.iter().map(|id| {
        let key = keys::review_details(id);
        async move { store.hgetall(&key).await }
    }))
    .await?;
    Ok(success(reviews))
}

async fn delete_review(
    State(state): State<Arc<AppState>>,
    Path((restaurant_id, review_id)): Path<(String, String)>,
) -> ApiResult<Json<ApiResponse<Value>>> {
    ensure_restaurant_exists(&state, &restaurant_id).await?;

    let reviews_key = keys::reviews(&restaurant_id);
    let review_details_key = keys::review_details(&review_id);
    let (removed, _existed) = tokio::join!(
        state.store.lrem(&reviews_key, &review_id),
        state.store.del(&review_details_key),
    );
    removed?;

    Ok(success_with("Review deleted", json!(review_id)))
}
