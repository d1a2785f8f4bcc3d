//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{credits, files, health, payments, profiles};
use crate::state::AppState;

// ============================================================================
// Concurrency Limiting Constants
// ============================================================================

/// Maximum concurrent requests for file endpoints.
/// Uploads buffer whole multipart batches in memory, so they get a tighter
/// limit than the rest of the API.
const FILES_MAX_CONCURRENT_REQUESTS: usize = 16;

/// Maximum concurrent requests for general API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Profiles
/// - `PUT /v1/profiles` - Create or update the caller's profile
/// - `GET /v1/profiles/me` - Get the caller's profile
/// - `DELETE /v1/profiles` - Delete the caller's profile
///
/// ## Credits
/// - `GET /v1/credits` - Current balance and plan
///
/// ## Files (concurrency-limited)
/// - `POST /v1/files` - Multipart upload batch
/// - `GET /v1/files` - List the caller's files
/// - `GET /v1/files/public/:id` - Public file metadata
/// - `GET /v1/files/:id/download` - Download file bytes
/// - `DELETE /v1/files/:id` - Delete a file (owner only)
/// - `PATCH /v1/files/:id/visibility` - Toggle visibility
///
/// ## Payments
/// - `POST /v1/payments/credits` - Add credits for a plan
/// - `POST /v1/payments/orders` - Create a gateway order
/// - `POST /v1/payments/verify` - Verify a payment and grant the plan
/// - `GET /v1/transactions` - Successful purchases, newest first
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    // Build CORS layer
    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    // File routes carry their own concurrency limit.
    let file_routes = Router::new()
        .route("/", post(files::upload_files).get(files::list_files))
        .route("/public/:id", get(files::get_public_file))
        .route("/:id/download", get(files::download_file))
        .route("/:id", delete(files::delete_file))
        .route("/:id/visibility", patch(files::toggle_visibility))
        .layer(ConcurrencyLimitLayer::new(FILES_MAX_CONCURRENT_REQUESTS));

    // Create concurrency-limited API routes
    let api_routes = Router::new()
        // Profiles
        .route(
            "/profiles",
            put(profiles::upsert_profile).delete(profiles::delete_profile),
        )
        .route("/profiles/me", get(profiles::get_profile))
        // Credits
        .route("/credits", get(credits::get_credits))
        // Payments
        .route("/payments/credits", post(payments::purchase_plan))
        .route("/payments/orders", post(payments::create_order))
        .route("/payments/verify", post(payments::verify_payment))
        .route("/transactions", get(payments::list_transactions))
        // File routes (with their own concurrency limit)
        .nest("/files", file_routes)
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        // API v1 routes (rate limited)
        .nest("/v1", api_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
