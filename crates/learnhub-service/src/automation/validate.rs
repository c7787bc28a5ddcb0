//! Rule payload checks, run in a fixed order: field shape, then trigger
//! consistency, then channel consistency. A later stage only runs once the
//! earlier one passed.

use chrono::NaiveTime;
use uuid::Uuid;

use learnhub_core::error::{AppError, FieldErrors};
use learnhub_core::result::AppResult;
use learnhub_entity::automation::{
    AutomationRule, Destination, DestinationType, Recipient, RefDate, RuleKind, TimeType, Trigger,
};

use super::payload::RulePayload;
use crate::validation::{collect, non_blank, parse_enum, required};

/// A payload after shape validation; `None` means "not provided".
#[derive(Debug, Default)]
pub(crate) struct ParsedRule {
    pub title: Option<String>,
    pub kind: Option<RuleKind>,
    pub recipient: Option<Recipient>,
    pub dest_type: Option<DestinationType>,
    pub dest: Option<String>,
    pub ref_date: Option<RefDate>,
    pub time_type: Option<TimeType>,
    pub n_days: Option<i32>,
    pub custom_time: Option<NaiveTime>,
    pub email_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

/// Every rule column, consistent with itself.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ValidRule {
    pub title: String,
    pub kind: RuleKind,
    pub recipient: Recipient,
    pub destination: Destination,
    pub trigger: Trigger,
    pub custom_time: Option<NaiveTime>,
    pub email_id: Option<Uuid>,
    pub is_active: bool,
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

/// Stage one: types, enums and lengths.
pub(crate) fn parse(payload: &RulePayload, fields: &mut FieldErrors) -> ParsedRule {
    collect(payload, fields);

    let custom_time = non_blank(payload.custom_time.clone()).and_then(|raw| {
        let parsed = parse_time(&raw);
        if parsed.is_none() {
            fields.add(
                "custom_time",
                "date_format",
                "The custom_time field must match the format H:i",
            );
        }
        parsed
    });

    ParsedRule {
        title: non_blank(payload.title.clone()),
        kind: parse_enum(fields, "type", non_blank(payload.kind.clone()).as_deref()),
        recipient: parse_enum(fields, "recipient", non_blank(payload.recipient.clone()).as_deref()),
        dest_type: parse_enum(fields, "dest_type", non_blank(payload.dest_type.clone()).as_deref()),
        dest: non_blank(payload.dest.clone()),
        ref_date: parse_enum(fields, "ref_date", non_blank(payload.ref_date.clone()).as_deref()),
        time_type: parse_enum(fields, "time_type", non_blank(payload.time_type.clone()).as_deref()),
        n_days: payload.n_days,
        custom_time,
        email_id: payload.email_id.flatten(),
        is_active: payload.is_active,
    }
}

/// Validate a create payload.
pub(crate) fn for_create(payload: &RulePayload) -> AppResult<ValidRule> {
    let mut fields = FieldErrors::new();
    let parsed = parse(payload, &mut fields);

    let title = required(&mut fields, "title", parsed.title);
    let kind = required(&mut fields, "type", parsed.kind);
    let recipient = required(&mut fields, "recipient", parsed.recipient);
    let dest_type = required(&mut fields, "dest_type", parsed.dest_type);
    let ref_date = required(&mut fields, "ref_date", parsed.ref_date);
    let time_type = required(&mut fields, "time_type", parsed.time_type);
    fields.into_result()?;

    let (Some(title), Some(kind), Some(recipient), Some(dest_type), Some(ref_date), Some(time_type)) =
        (title, kind, recipient, dest_type, ref_date, time_type)
    else {
        return Err(AppError::validation("The given data was invalid"));
    };

    let trigger = Trigger::from_parts(ref_date, time_type, parsed.n_days)?;
    let destination = channel(kind, dest_type, parsed.dest.as_deref(), parsed.email_id)?;

    Ok(ValidRule {
        title,
        kind,
        recipient,
        destination,
        trigger,
        custom_time: parsed.custom_time,
        email_id: parsed.email_id,
        is_active: parsed.is_active.unwrap_or(true),
    })
}

/// Validate an update payload merged over the stored rule.
///
/// Provided fields must be valid on their own, and the merged rule must
/// pass the trigger and channel checks as a whole.
///
/// A required column sent blank is a `required` problem rather than "keep
/// the stored value". Blank `dest`, `custom_time` or `email_id` clear the
/// column, and the channel check decides whether that is allowed.
pub(crate) fn for_update(payload: &RulePayload, current: &AutomationRule) -> AppResult<ValidRule> {
    let mut fields = FieldErrors::new();
    let parsed = parse(payload, &mut fields);
    for (field, value) in [
        ("title", &payload.title),
        ("type", &payload.kind),
        ("recipient", &payload.recipient),
        ("dest_type", &payload.dest_type),
        ("ref_date", &payload.ref_date),
        ("time_type", &payload.time_type),
    ] {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            fields.add(field, "required", format!("The {field} field is required"));
        }
    }
    fields.into_result()?;

    let kind = parsed.kind.unwrap_or(current.kind);
    let dest_type = parsed.dest_type.unwrap_or(current.dest_type);
    let time_type = parsed.time_type.unwrap_or(current.time_type);
    let n_days = parsed.n_days.or(Some(current.n_days));
    let dest = match payload.dest {
        Some(_) => parsed.dest,
        None => current.dest.clone(),
    };
    let custom_time = match payload.custom_time {
        Some(_) => parsed.custom_time,
        None => current.custom_time,
    };
    let email_id = payload.email_id.unwrap_or(current.email_id);

    let trigger = Trigger::from_parts(parsed.ref_date.unwrap_or(current.ref_date), time_type, n_days)?;
    let destination = channel(kind, dest_type, dest.as_deref(), email_id)?;

    Ok(ValidRule {
        title: parsed.title.unwrap_or_else(|| current.title.clone()),
        kind,
        recipient: parsed.recipient.unwrap_or(current.recipient),
        destination,
        trigger,
        custom_time,
        email_id,
        is_active: parsed.is_active.unwrap_or(current.is_active),
    })
}

/// Stage three: the destination and the template the rule kind needs.
fn channel(
    kind: RuleKind,
    dest_type: DestinationType,
    dest: Option<&str>,
    email_id: Option<Uuid>,
) -> AppResult<Destination> {
    let mut fields = FieldErrors::new();

    let destination = match Destination::from_parts(dest_type, dest) {
        Ok(destination) => Some(destination),
        Err(e) => {
            fields.extend(e.fields.unwrap_or_default());
            None
        }
    };
    if let Some(Destination::Webhook { url }) = &destination
        && !(url.starts_with("http://") || url.starts_with("https://"))
    {
        fields.add("dest", "url", "The dest field must be a valid URL");
    }
    if kind.requirements().email_template && email_id.is_none() {
        fields.add(
            "email_id",
            "required",
            format!("The email_id field is required when type is {kind}"),
        );
    }

    fields.into_result()?;
    destination.ok_or_else(|| AppError::validation("The given data was invalid"))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use learnhub_entity::automation::TRIGGER_INCONSISTENT;

    use super::*;

    fn payload() -> RulePayload {
        RulePayload {
            title: Some("Welcome".into()),
            kind: Some("notification".into()),
            recipient: Some("learner".into()),
            dest_type: Some("notification".into()),
            ref_date: Some("enrollment".into()),
            time_type: Some("on".into()),
            ..RulePayload::default()
        }
    }

    fn codes(err: &AppError, field: &str) -> Vec<String> {
        err.fields
            .as_ref()
            .and_then(|f| f.get(field))
            .map(|errors| errors.iter().map(|e| e.code.clone()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_on_stores_zero_days() {
        let rule = for_create(&RulePayload {
            n_days: Some(5),
            ..payload()
        })
        .unwrap();
        assert_eq!(rule.trigger.n_days(), 0);
        assert!(rule.is_active);
    }

    #[test]
    fn test_shape_errors_come_before_trigger_errors() {
        let err = for_create(&RulePayload {
            time_type: Some("before".into()),
            recipient: Some("everyone".into()),
            ..payload()
        })
        .unwrap_err();
        assert_eq!(codes(&err, "recipient"), ["in"]);
        assert!(codes(&err, "n_days").is_empty());
    }

    #[test]
    fn test_before_without_days_is_inconsistent() {
        let err = for_create(&RulePayload {
            time_type: Some("before".into()),
            n_days: Some(0),
            ..payload()
        })
        .unwrap_err();
        assert_eq!(codes(&err, "n_days"), [TRIGGER_INCONSISTENT]);
    }

    #[test]
    fn test_channel_errors_are_reported_together() {
        let err = for_create(&RulePayload {
            kind: Some("email".into()),
            dest_type: Some("webhook".into()),
            ..payload()
        })
        .unwrap_err();
        assert_eq!(codes(&err, "dest"), ["required"]);
        assert_eq!(codes(&err, "email_id"), ["required"]);
    }

    #[test]
    fn test_webhook_url_scheme() {
        let err = for_create(&RulePayload {
            dest_type: Some("webhook".into()),
            dest: Some("ftp://hooks.test".into()),
            ..payload()
        })
        .unwrap_err();
        assert_eq!(codes(&err, "dest"), ["url"]);

        let rule = for_create(&RulePayload {
            dest_type: Some("webhook".into()),
            dest: Some("https://hooks.test/in".into()),
            ..payload()
        })
        .unwrap();
        assert_eq!(rule.destination.dest(), Some("https://hooks.test/in"));
    }

    #[test]
    fn test_missing_fields_are_required() {
        let err = for_create(&RulePayload::default()).unwrap_err();
        for field in ["title", "type", "recipient", "dest_type", "ref_date", "time_type"] {
            assert_eq!(codes(&err, field), ["required"], "{field}");
        }
    }

    #[test]
    fn test_custom_time_formats() {
        let rule = for_create(&RulePayload {
            custom_time: Some("09:30".into()),
            ..payload()
        })
        .unwrap();
        assert_eq!(rule.custom_time, NaiveTime::from_hms_opt(9, 30, 0));

        let err = for_create(&RulePayload {
            custom_time: Some("half past nine".into()),
            ..payload()
        })
        .unwrap_err();
        assert_eq!(codes(&err, "custom_time"), ["date_format"]);
    }

    fn stored(kind: RuleKind, dest_type: DestinationType) -> AutomationRule {
        let now = Utc::now();
        AutomationRule {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            course_id: Some(Uuid::new_v4()),
            session_id: None,
            title: "Reminder".into(),
            kind,
            recipient: Recipient::Learner,
            dest_type,
            dest: None,
            ref_date: RefDate::Start,
            time_type: TimeType::On,
            n_days: 0,
            custom_time: None,
            email_id: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_update_revalidates_the_merged_rule() {
        let current = stored(RuleKind::Reminder, DestinationType::Notification);

        let err = for_update(
            &RulePayload {
                time_type: Some("after".into()),
                ..RulePayload::default()
            },
            &current,
        )
        .unwrap_err();
        assert_eq!(codes(&err, "n_days"), [TRIGGER_INCONSISTENT]);

        let updated = for_update(
            &RulePayload {
                time_type: Some("after".into()),
                n_days: Some(2),
                is_active: Some(false),
                ..RulePayload::default()
            },
            &current,
        )
        .unwrap();
        assert_eq!(updated.trigger.n_days(), 2);
        assert_eq!(updated.title, "Reminder");
        assert!(!updated.is_active);
    }

    #[test]
    fn test_blank_required_field_on_update_is_rejected() {
        let current = stored(RuleKind::Reminder, DestinationType::Notification);

        let err = for_update(
            &RulePayload {
                title: Some(String::new()),
                time_type: Some("  ".into()),
                ..RulePayload::default()
            },
            &current,
        )
        .unwrap_err();
        assert_eq!(codes(&err, "title"), ["required"]);
        assert_eq!(codes(&err, "time_type"), ["required"]);

        let kept = for_update(&RulePayload::default(), &current).unwrap();
        assert_eq!(kept.title, "Reminder");
    }

    #[test]
    fn test_blank_channel_field_on_update_clears_it() {
        let mut current = stored(RuleKind::Email, DestinationType::Webhook);
        current.dest = Some("https://hooks.test/in".into());
        current.email_id = Some(Uuid::new_v4());

        let err = for_update(
            &RulePayload {
                dest: Some(String::new()),
                email_id: Some(None),
                ..RulePayload::default()
            },
            &current,
        )
        .unwrap_err();
        assert_eq!(codes(&err, "dest"), ["required"]);
        assert_eq!(codes(&err, "email_id"), ["required"]);

        let untouched = for_update(&RulePayload::default(), &current).unwrap();
        assert_eq!(untouched.destination.dest(), Some("https://hooks.test/in"));
        assert_eq!(untouched.email_id, current.email_id);
    }
}
