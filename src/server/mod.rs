//! HTTP surface for the difference engine.
//!
//! # Endpoints
//!
//! - `GET  /health`   Liveness probe
//! - `GET  /styles`   The style menu
//! - `POST /run`      Run the full pipeline
//! - `POST /reformat` Restyle a previous result

pub mod routes;

pub use routes::{app_router, AppState};
