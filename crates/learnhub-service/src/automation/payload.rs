//! Automation rule request payload.
//!
//! The same payload arrives as multipart form fields or as a JSON body, so
//! every field goes through the lenient decoders: `"1"` is a boolean, `"5"`
//! a number, and id lists may be JSON-encoded strings.

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use learnhub_core::types::lenient;

/// Fields of a create or update request. On update an absent or null field
/// means "not provided"; a field sent blank is a value and is validated.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RulePayload {
    /// Title.
    #[serde(default, deserialize_with = "lenient::opt_text")]
    #[validate(length(max = 255, message = "The title field may not be greater than 255 characters"))]
    pub title: Option<String>,
    /// Rule type.
    #[serde(default, rename = "type", deserialize_with = "lenient::opt_text")]
    pub kind: Option<String>,
    /// Recipient.
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub recipient: Option<String>,
    /// Destination channel.
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub dest_type: Option<String>,
    /// Webhook URL.
    #[serde(default, deserialize_with = "lenient::opt_text")]
    #[validate(length(max = 2048, message = "The dest field may not be greater than 2048 characters"))]
    pub dest: Option<String>,
    /// Reference date of the trigger.
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub ref_date: Option<String>,
    /// Trigger direction.
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub time_type: Option<String>,
    /// Day offset.
    #[serde(default, deserialize_with = "lenient::opt_i32")]
    #[validate(range(min = 0, message = "The n_days field must be at least 0"))]
    pub n_days: Option<i32>,
    /// Time of day, `HH:MM` or `HH:MM:SS`.
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub custom_time: Option<String>,
    /// Email template. `Some(None)` clears it on update.
    #[serde(default, deserialize_with = "lenient::patch_uuid")]
    pub email_id: Option<Option<Uuid>>,
    /// Active flag.
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub is_active: Option<bool>,
    /// Library documents to snapshot. Appended on update.
    #[serde(default, deserialize_with = "lenient::uuid_list")]
    pub document_ids: Option<Vec<Uuid>>,
    /// Questionnaires to link. Present on update means full replacement.
    #[serde(default, deserialize_with = "lenient::uuid_list")]
    pub questionnaire_ids: Option<Vec<Uuid>>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_multipart_encoding() {
        let doc = Uuid::new_v4();
        let payload: RulePayload = serde_json::from_value(json!({
            "title": "Welcome",
            "type": "email",
            "n_days": "3",
            "is_active": "0",
            "document_ids": format!("[\"{doc}\"]"),
            "questionnaire_ids": "",
        }))
        .unwrap();
        assert_eq!(payload.kind.as_deref(), Some("email"));
        assert_eq!(payload.n_days, Some(3));
        assert_eq!(payload.is_active, Some(false));
        assert_eq!(payload.document_ids, Some(vec![doc]));
        assert_eq!(payload.questionnaire_ids, Some(vec![]));
    }

    #[test]
    fn test_absent_lists_stay_none() {
        let payload: RulePayload = serde_json::from_value(json!({ "title": "x" })).unwrap();
        assert_eq!(payload.document_ids, None);
        assert_eq!(payload.questionnaire_ids, None);
    }

    #[test]
    fn test_negative_days_fail_shape_validation() {
        let payload = RulePayload {
            n_days: Some(-1),
            ..RulePayload::default()
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("n_days"));
    }
}
