//! HTTP server assembly
//!
//! Builds the shared application state, provisions the store, and combines
//! the endpoint routers into one axum server.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::cuisine_routes::cuisine_routes;
use super::restaurant_routes::restaurant_routes;
use crate::config::AppConfig;
use crate::keys;
use crate::store::{Store, StoreResult};
use crate::weather::WeatherProvider;

// Duplicate filter sizing, reserved once at startup.
const DUPLICATE_FILTER_ERROR_RATE: f64 = 0.0001;
const DUPLICATE_FILTER_CAPACITY: usize = 1_000_000;

/// Shared state behind every handler: the store, the weather provider,
/// and the loaded configuration.
pub struct AppState {
    pub store: Store,
    pub weather: Arc<dyn WeatherProvider>,
    pub config: AppConfig,
}

impl AppState {
    /// Builds the state and provisions the store so the duplicate filter
    /// and the restaurant search index exist before the first request.
    pub async fn bootstrap(
        config: AppConfig,
        weather: Arc<dyn WeatherProvider>,
    ) -> StoreResult<Self> {
        let store = Store::new();
        store
            .bf_reserve(
                &keys::restaurant_bloom(),
                DUPLICATE_FILTER_ERROR_RATE,
                DUPLICATE_FILTER_CAPACITY,
            )
            .await?;
        store
            .ft_create(
                &keys::restaurant_index(),
                &keys::restaurant_prefix(),
                "name",
            )
            .await?;
        Ok(Self {
            store,
            weather,
            config,
        })
    }
}

/// Combines all endpoint routers with the shared middleware stack.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/resturants", restaurant_routes(state.clone()))
        .nest("/api/cuisines", cuisine_routes(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// HTTP server for the restaurant directory
pub struct HttpServer {
    config: AppConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server from bootstrapped state
    pub fn new(state: Arc<AppState>) -> Self {
        let config = state.config.clone();
        let router = build_router(state);
        Self { config, router }
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start the HTTP server (async)
    pub async fn start(self) -> Result<(), io::Error> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        tracing::info!(%addr, "restaurant directory listening");

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}
