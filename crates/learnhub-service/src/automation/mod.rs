//! Automation rules (flow actions) attached to courses and sessions.

pub mod payload;
pub mod service;
mod validate;

pub use payload::RulePayload;
pub use service::{AutomationRuleDetails, AutomationService};
