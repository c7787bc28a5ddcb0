//! # learnhub-auth
//!
//! Authentication and authorization for LearnHub.
//!
//! ## Modules
//!
//! - `jwt`: bearer token claims, signing (for the CLI) and verification
//! - `rbac`: role to permission policies and their enforcement
//! - `tenant`: per-request resolution of the acting organization

pub mod jwt;
pub mod principal;
pub mod rbac;
pub mod tenant;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use principal::Principal;
pub use rbac::{Permission, RbacEnforcer, RbacPolicies};
pub use tenant::{ScopeResolver, TenantResolver, TenantScope};
