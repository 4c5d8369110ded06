//! Weather endpoint tests
//!
//! The provider is a stub, so these tests observe the caching behavior
//! directly: one upstream call inside the cache window, a second one after
//! expiry. Time is driven by tokio's paused clock.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use bites::keys;
use common::{test_app_with_weather, StubWeather};

const CACHE_WINDOW: Duration = Duration::from_secs(60 * 60);

#[tokio::test(start_paused = true)]
async fn test_weather_is_fetched_then_served_from_cache() {
    let weather = StubWeather::sunny();
    let app = test_app_with_weather(weather.clone()).await;
    let id = app.create_restaurant("Taco Hut", "1,1", &[]).await;

    let (status, body) = app.get(&format!("/api/resturants/{id}/weather")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["weather"], "sunny");
    assert_eq!(weather.call_count(), 1);

    let (status, body) = app.get(&format!("/api/resturants/{id}/weather")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["weather"], "sunny");
    assert_eq!(weather.call_count(), 1, "second request must hit the cache");
}

#[tokio::test(start_paused = true)]
async fn test_weather_cache_expires_after_the_window() {
    let weather = StubWeather::sunny();
    let app = test_app_with_weather(weather.clone()).await;
    let id = app.create_restaurant("Taco Hut", "1,1", &[]).await;

    app.get(&format!("/api/resturants/{id}/weather")).await;
    tokio::time::advance(CACHE_WINDOW + Duration::from_secs(1)).await;

    let (status, _) = app.get(&format!("/api/resturants/{id}/weather")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(weather.call_count(), 2, "expired cache must re-fetch");
}

#[tokio::test]
async fn test_weather_without_coordinates_is_404() {
    let app = test_app_with_weather(StubWeather::sunny()).await;

    // a record written without a location field
    app.state
        .store
        .hset(&keys::restaurant("bare"), &[("id", "bare"), ("name", "No Where")])
        .await
        .unwrap();

    let (status, body) = app.get("/api/resturants/bare/weather").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Coordinates not found");
}

#[tokio::test]
async fn test_weather_provider_failure_is_500() {
    let app = test_app_with_weather(StubWeather::broken()).await;
    let id = app.create_restaurant("Taco Hut", "1,1", &[]).await;

    let (status, body) = app.get(&format!("/api/resturants/{id}/weather")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Could not fetch weather info");
}

#[tokio::test]
async fn test_weather_for_unknown_restaurant_is_404() {
    let app = test_app_with_weather(StubWeather::sunny()).await;
    let (status, _) = app.get("/api/resturants/no-such-id/weather").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test(start_paused = true)]
async fn test_weather_caches_per_restaurant() {
    let weather = StubWeather::sunny();
    let app = test_app_with_weather(weather.clone()).await;
    let first = app.create_restaurant("Taco Hut", "1,1", &[]).await;
    let second = app.create_restaurant("Cantina", "2,2", &[]).await;

    app.get(&format!("/api/resturants/{first}/weather")).await;
    app.get(&format!("/api/resturants/{second}/weather")).await;
    assert_eq!(weather.call_count(), 2);
}
