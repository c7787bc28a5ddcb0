//! Typed trigger and destination descriptors.
//!
//! The database stores both as flat columns; these types only exist once
//! the columns have been checked for consistency, so code holding a
//! [`Trigger`] or [`Destination`] never sees `on` with a day offset or a
//! webhook without a URL.

use learnhub_core::AppError;

use super::kind::{DestinationType, RefDate, TimeType};

/// Field error code for an `n_days` value that contradicts `time_type`.
pub const TRIGGER_INCONSISTENT: &str = "trigger_inconsistent";

/// When a rule fires relative to its reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Fires on the reference date itself.
    On {
        /// Reference event.
        ref_date: RefDate,
    },
    /// Fires a positive number of days before the reference date.
    Before {
        /// Reference event.
        ref_date: RefDate,
        /// Day offset, always positive.
        n_days: u32,
    },
    /// Fires a positive number of days after the reference date.
    After {
        /// Reference event.
        ref_date: RefDate,
        /// Day offset, always positive.
        n_days: u32,
    },
}

impl Trigger {
    /// Build a trigger from its stored columns.
    ///
    /// `on` ignores the submitted offset and stores zero. `before` and
    /// `after` need a strictly positive offset; anything else is a field
    /// error on `n_days` with code [`TRIGGER_INCONSISTENT`].
    pub fn from_parts(ref_date: RefDate, time_type: TimeType, n_days: Option<i32>) -> Result<Self, AppError> {
        match time_type {
            TimeType::On => Ok(Self::On { ref_date }),
            TimeType::Before | TimeType::After => {
                let days = n_days
                    .filter(|d| *d > 0)
                    .and_then(|d| u32::try_from(d).ok())
                    .ok_or_else(|| {
                        AppError::field(
                            "n_days",
                            TRIGGER_INCONSISTENT,
                            format!(
                                "The n_days field must be greater than 0 when time_type is {time_type}"
                            ),
                        )
                    })?;
                Ok(if time_type == TimeType::Before {
                    Self::Before { ref_date, n_days: days }
                } else {
                    Self::After { ref_date, n_days: days }
                })
            }
        }
    }

    /// Reference event.
    pub fn ref_date(&self) -> RefDate {
        match self {
            Self::On { ref_date } | Self::Before { ref_date, .. } | Self::After { ref_date, .. } => *ref_date,
        }
    }

    /// Stored `time_type` column.
    pub fn time_type(&self) -> TimeType {
        match self {
            Self::On { .. } => TimeType::On,
            Self::Before { .. } => TimeType::Before,
            Self::After { .. } => TimeType::After,
        }
    }

    /// Stored `n_days` column (zero for `on`).
    pub fn n_days(&self) -> i32 {
        match self {
            Self::On { .. } => 0,
            Self::Before { n_days, .. } | Self::After { n_days, .. } => *n_days as i32,
        }
    }
}

/// Where a rule delivers its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Email transport.
    Email,
    /// In-app notification.
    Notification,
    /// HTTP callback.
    Webhook {
        /// Target URL.
        url: String,
    },
}

impl Destination {
    /// Build a destination from its stored columns.
    pub fn from_parts(dest_type: DestinationType, dest: Option<&str>) -> Result<Self, AppError> {
        match dest_type {
            DestinationType::Email => Ok(Self::Email),
            DestinationType::Notification => Ok(Self::Notification),
            DestinationType::Webhook => dest
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(|url| Self::Webhook { url: url.to_string() })
                .ok_or_else(|| {
                    AppError::field(
                        "dest",
                        "required",
                        "The dest field is required when dest_type is webhook",
                    )
                }),
        }
    }

    /// Stored `dest_type` column.
    pub fn dest_type(&self) -> DestinationType {
        match self {
            Self::Email => DestinationType::Email,
            Self::Notification => DestinationType::Notification,
            Self::Webhook { .. } => DestinationType::Webhook,
        }
    }

    /// Stored `dest` column.
    pub fn dest(&self) -> Option<&str> {
        match self {
            Self::Webhook { url } => Some(url),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_forces_zero_days() {
        let trigger = Trigger::from_parts(RefDate::Start, TimeType::On, Some(5)).unwrap();
        assert_eq!(trigger, Trigger::On { ref_date: RefDate::Start });
        assert_eq!(trigger.n_days(), 0);
    }

    #[test]
    fn test_offset_requires_positive_days() {
        for bad in [None, Some(0), Some(-3)] {
            let err = Trigger::from_parts(RefDate::Enrollment, TimeType::Before, bad).unwrap_err();
            let fields = err.fields.expect("field errors");
            assert_eq!(fields.get("n_days").unwrap()[0].code, TRIGGER_INCONSISTENT);
        }
    }

    #[test]
    fn test_offset_keeps_days() {
        let trigger = Trigger::from_parts(RefDate::Completion, TimeType::After, Some(7)).unwrap();
        assert_eq!(trigger.time_type(), TimeType::After);
        assert_eq!(trigger.n_days(), 7);
        assert_eq!(trigger.ref_date(), RefDate::Completion);
    }

    #[test]
    fn test_webhook_requires_dest() {
        assert!(Destination::from_parts(DestinationType::Webhook, None).is_err());
        assert!(Destination::from_parts(DestinationType::Webhook, Some("  ")).is_err());
        let dest = Destination::from_parts(DestinationType::Webhook, Some("https://x.test/hook")).unwrap();
        assert_eq!(dest.dest(), Some("https://x.test/hook"));
    }

    #[test]
    fn test_non_webhook_drops_dest() {
        let dest = Destination::from_parts(DestinationType::Email, Some("ignored")).unwrap();
        assert_eq!(dest, Destination::Email);
        assert_eq!(dest.dest(), None);
    }
}
