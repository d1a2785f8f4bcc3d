//! Stashbox HTTP API Service.
//!
//! This crate provides the HTTP API for stashbox, including:
//!
//! - Credit balance (1 credit = 1 file upload)
//! - Multipart file upload, listing, download, delete, visibility toggle
//! - Plan purchases and payment gateway order/verify flow
//! - User display profiles and transaction history
//!
//! # Authentication
//!
//! Requests carry a bearer token that is resolved against the configured
//! identity provider. Test tokens (`test-token:<uuid>`) are accepted only
//! when explicitly enabled in the configuration.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers over the synchronous store still need async signatures

pub mod auth;
pub mod blobs;
pub mod config;
pub mod crypto;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod routes;
pub mod state;

pub use blobs::BlobStore;
pub use config::ServiceConfig;
pub use error::ApiError;
pub use gateway::{GatewayClient, GatewayError, GatewayOrder};
pub use routes::create_router;
pub use state::AppState;
