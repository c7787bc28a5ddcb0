//! # learnhub-core
//!
//! Core crate for LearnHub. Contains the storage and clock traits,
//! configuration schemas, typed identifiers, pagination/sorting types,
//! lenient payload decoding helpers, and the unified error system.
//!
//! This crate has **no** internal dependencies on other LearnHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind, FieldErrors};
pub use result::AppResult;
