//! Core type definitions used across the LearnHub workspace.

pub mod id;
pub mod lenient;
pub mod pagination;
pub mod sorting;

pub use id::{OrganizationId, UserId};
pub use pagination::{PageRequest, PageResponse};
pub use sorting::{SortColumn, SortDirection, SortField};
