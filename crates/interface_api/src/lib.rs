//! HTTP API Layer
//!
//! This crate provides the REST API for the hospital core system using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for billing, beds, and dashboards
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent `{error, message}` JSON responses
//!
//! Authentication is an external collaborator; callers arrive with their role
//! already established, and the dashboard endpoint takes the role explicitly.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(pool, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod dto;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{beds, billing, dashboard, health};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `pool` - Database connection pool
/// * `config` - API configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(pool: PgPool, config: ApiConfig) -> Router {
    let state = AppState { pool, config };

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let bill_routes = Router::new()
        .route("/", post(billing::create_bill))
        .route("/", get(billing::list_bills))
        .route("/:id", get(billing::get_bill))
        .route("/:id/mark_paid", post(billing::mark_paid))
        .route("/:id/cancel", post(billing::cancel_bill))
        .route("/:id/payments", post(billing::record_payment))
        .route("/:id/payments", get(billing::list_payments));

    let bed_routes = Router::new()
        .route("/", get(beds::list_beds))
        .route("/:id", get(beds::get_bed))
        .route("/:id/assign_patient", post(beds::assign_patient))
        .route("/:id/release_bed", post(beds::release_bed));

    let api_routes = Router::new()
        .nest("/bills", bill_routes)
        .nest("/beds", bed_routes)
        .route("/dashboard", get(dashboard::dashboard));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
