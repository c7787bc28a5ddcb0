//! # learnhub-api
//!
//! HTTP API layer for LearnHub built on Axum.
//!
//! Provides the REST endpoints, the bearer-token and payload extractors,
//! middleware (CORS, request logging), the response envelope and the
//! mapping from `AppError` to HTTP status codes.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::{ApiError, ApiResult};
pub use router::build_router;
pub use state::AppState;
