//! # HTTP API
//!
//! The public REST surface of the restaurant directory.
//!
//! # Endpoints
//!
//! - `/api/resturants` - listing, creation, search, details, weather, reviews
//! - `/api/cuisines` - cuisine listing and membership
//!
//! Path spelling is the published API surface and is kept as-is.

mod cuisine_routes;
mod restaurant_routes;

pub mod errors;
pub mod responses;
pub mod server;

pub use errors::{ApiError, ApiResult};
pub use responses::ApiResponse;
pub use server::{build_router, AppState, HttpServer};
