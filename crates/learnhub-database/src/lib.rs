//! # learnhub-database
//!
//! PostgreSQL connection management, the store traits the service layer
//! depends on, their sqlx repository implementations and, behind the
//! `memory` feature, an in-process backend implementing the same traits.

pub mod connection;
#[cfg(feature = "memory")]
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{Stores, connect};
