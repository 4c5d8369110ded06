//! Shared helpers for API integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use bites::config::AppConfig;
use bites::http_server::{build_router, AppState};
use bites::weather::{WeatherError, WeatherProvider};

/// Weather provider double: canned report, call counter, optional failure.
pub struct StubWeather {
    calls: AtomicUsize,
    report: Value,
    fail: bool,
}

impl StubWeather {
    pub fn sunny() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            report: json!({"weather": "sunny", "temp": 75}),
            fail: false,
        })
    }

    pub fn broken() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            report: Value::Null,
            fail: true,
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherProvider for StubWeather {
    async fn fetch(&self, _lat: &str, _lon: &str) -> Result<Value, WeatherError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(WeatherError::Upstream(503))
        } else {
            Ok(self.report.clone())
        }
    }
}

/// A bootstrapped router plus direct access to its state for assertions.
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
}

pub async fn test_app() -> TestApp {
    test_app_with_weather(StubWeather::sunny()).await
}

pub async fn test_app_with_weather(weather: Arc<StubWeather>) -> TestApp {
    let state = Arc::new(
        AppState::bootstrap(AppConfig::default(), weather)
            .await
            .unwrap(),
    );
    TestApp {
        router: build_router(state.clone()),
        state,
    }
}

impl TestApp {
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request("DELETE", uri, None).await
    }

    async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    /// Creates a restaurant and returns its generated id.
    pub async fn create_restaurant(&self, name: &str, location: &str, cuisines: &[&str]) -> String {
        let (status, body) = self
            .post(
                "/api/resturants",
                json!({"name": name, "location": location, "cuisines": cuisines}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create failed: {body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Posts a review and returns the created review record.
    pub async fn add_review(&self, restaurant_id: &str, rating: f64) -> Value {
        let (status, body) = self
            .post(
                &format!("/api/resturants/{restaurant_id}/reviews"),
                json!({"review": "tasty", "rating": rating}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "review failed: {body}");
        body["data"].clone()
    }
}
