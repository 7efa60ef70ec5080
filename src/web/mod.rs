//! # Web Trigger Surface
//!
//! A two-route HTML surface for on-demand runs:
//!
//! - `GET /` serves a form with a single `path` field
//! - `POST /set-path` runs the pipeline into that directory and confirms
//!
//! No authentication and no JSON API.

pub mod handlers;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the router with request tracing
pub fn create_app(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::form::show_form))
        .route("/set-path", post(handlers::form::set_path))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
