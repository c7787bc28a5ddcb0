//! Tenant resolution: which organization a request acts for.

pub mod resolver;
pub mod scope;

pub use resolver::{GuestScope, InstructorScope, MemberScope, OwnerScope, ScopeResolver, TenantResolver};
pub use scope::TenantScope;
