//! Automation rules attached to courses and sessions.

pub mod kind;
pub mod model;
pub mod trigger;

pub use kind::{ChannelRequirements, DestinationType, Recipient, RefDate, RuleKind, TimeType};
pub use model::{
    AutomationRule, AutomationRuleFile, CreateAutomationRule, CreateRuleFile, FileSource, RuleOwner,
};
pub use trigger::{Destination, TRIGGER_INCONSISTENT, Trigger};
