//! Custom Axum extractors.

pub mod auth;
pub mod payload;

pub use auth::AuthUser;
pub use payload::Payload;
