//! # learnhub-entity
//!
//! Domain entity models and enums for LearnHub. Row structs derive
//! `sqlx::FromRow`; enums map onto PostgreSQL enum types.

#[macro_use]
mod macros;

pub mod automation;
pub mod course;
pub mod document;
pub mod partner;
pub mod questionnaire;
pub mod quiz;
pub mod statistics;
pub mod user;
