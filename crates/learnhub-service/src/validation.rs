//! Payload validation helpers shared by the services.
//!
//! Validation collects every problem into [`FieldErrors`] before anything
//! is written, so a rejected request never leaves partial state behind.

use std::str::FromStr;

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use learnhub_core::error::{AppError, FieldErrors};
use learnhub_core::result::AppResult;

/// Run the derived `validator` rules of `payload`.
pub fn validate<T: Validate>(payload: &T) -> AppResult<()> {
    payload.validate().map_err(AppError::from)
}

/// Run the derived rules of `payload`, adding problems to `fields`.
pub fn collect<T: Validate>(payload: &T, fields: &mut FieldErrors) {
    if let Err(errors) = payload.validate() {
        fields.extend(FieldErrors::from(errors));
    }
}

/// `value`, or a `required` problem on `field`.
pub fn required<T>(fields: &mut FieldErrors, field: &str, value: Option<T>) -> Option<T> {
    if value.is_none() {
        fields.add(field, "required", format!("The {field} field is required"));
    }
    value
}

/// Parse an enum field, recording an `in` problem when the value is unknown.
pub fn parse_enum<E>(fields: &mut FieldErrors, field: &str, value: Option<&str>) -> Option<E>
where
    E: FromStr<Err = AppError>,
{
    match value?.parse::<E>() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            fields.add(field, "in", e.message);
            None
        }
    }
}

/// Body of every reorder endpoint.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReorderRequest {
    /// Child ids in their new order.
    #[validate(length(min = 1, message = "The ids field must contain at least one id"))]
    pub ids: Vec<Uuid>,
}

/// Trim a string and treat blank as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use learnhub_entity::automation::TimeType;

    use super::*;

    #[test]
    fn test_parse_enum_records_unknown_value() {
        let mut fields = FieldErrors::new();
        let parsed: Option<TimeType> = parse_enum(&mut fields, "time_type", Some("later"));
        assert!(parsed.is_none());
        assert_eq!(fields.get("time_type").unwrap()[0].code, "in");

        let ok: Option<TimeType> = parse_enum(&mut fields, "other", Some("before"));
        assert_eq!(ok, Some(TimeType::Before));
        assert!(!fields.contains("other"));
    }

    #[test]
    fn test_required() {
        let mut fields = FieldErrors::new();
        assert_eq!(required::<i32>(&mut fields, "title", None), None);
        assert!(fields.contains("title"));
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some(" a ".into())).as_deref(), Some("a"));
    }
}
