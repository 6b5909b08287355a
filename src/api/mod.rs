//! HTTP module: the dashboard pages, table controls, JSON snapshot, source
//! viewer, health and metrics endpoints.

pub mod handlers;
pub mod render;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
