//! Automation rule (flow action / workflow action) entity models.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::kind::{DestinationType, Recipient, RefDate, RuleKind, TimeType};

/// The parent a rule is attached to. Exactly one of course or session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum RuleOwner {
    /// Rule defined on a course.
    Course(Uuid),
    /// Rule defined on a single session.
    Session(Uuid),
}

impl RuleOwner {
    /// The `course_id` column value.
    pub fn course_id(&self) -> Option<Uuid> {
        match self {
            Self::Course(id) => Some(*id),
            Self::Session(_) => None,
        }
    }

    /// The `session_id` column value.
    pub fn session_id(&self) -> Option<Uuid> {
        match self {
            Self::Session(id) => Some(*id),
            Self::Course(_) => None,
        }
    }

    /// Storage path prefix for this owner's rule attachments.
    pub fn storage_segment(&self) -> String {
        match self {
            Self::Course(id) => format!("courses/{id}"),
            Self::Session(id) => format!("sessions/{id}"),
        }
    }
}

/// A persisted automation rule.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AutomationRule {
    /// Unique rule identifier.
    pub id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// Parent course, when the rule is course-level.
    pub course_id: Option<Uuid>,
    /// Parent session, when the rule is session-level.
    pub session_id: Option<Uuid>,
    /// Display title.
    pub title: String,
    /// What the rule does.
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: RuleKind,
    /// Who receives it.
    pub recipient: Recipient,
    /// Delivery channel.
    pub dest_type: DestinationType,
    /// Webhook URL when `dest_type` is webhook.
    pub dest: Option<String>,
    /// Reference event of the trigger.
    pub ref_date: RefDate,
    /// Position relative to the reference event.
    pub time_type: TimeType,
    /// Day offset; zero when `time_type` is `on`.
    pub n_days: i32,
    /// Time of day the rule fires at.
    pub custom_time: Option<NaiveTime>,
    /// Email template reference.
    pub email_id: Option<Uuid>,
    /// Whether the dispatcher should consider this rule.
    pub is_active: bool,
    /// When the rule was created.
    pub created_at: DateTime<Utc>,
    /// When the rule was last updated.
    pub updated_at: DateTime<Utc>,
}

impl AutomationRule {
    /// The parent this rule belongs to.
    ///
    /// The table enforces that exactly one parent column is set; a row with
    /// only `session_id` is a session rule, anything else a course rule.
    pub fn owner(&self) -> RuleOwner {
        match (self.course_id, self.session_id) {
            (_, Some(session_id)) => RuleOwner::Session(session_id),
            (Some(course_id), None) => RuleOwner::Course(course_id),
            (None, None) => RuleOwner::Course(Uuid::nil()),
        }
    }
}

/// Data required to insert a rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAutomationRule {
    /// Pre-generated identifier (the storage path of uploads depends on it).
    pub id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// Course or session parent.
    pub owner: RuleOwner,
    /// Display title.
    pub title: String,
    /// What the rule does.
    pub kind: RuleKind,
    /// Who receives it.
    pub recipient: Recipient,
    /// Delivery channel.
    pub dest_type: DestinationType,
    /// Webhook URL.
    pub dest: Option<String>,
    /// Reference event.
    pub ref_date: RefDate,
    /// Position relative to the reference event.
    pub time_type: TimeType,
    /// Day offset.
    pub n_days: i32,
    /// Time of day.
    pub custom_time: Option<NaiveTime>,
    /// Email template reference.
    pub email_id: Option<Uuid>,
    /// Active flag.
    pub is_active: bool,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

text_enum! {
    /// How an attached file got onto a rule.
    #[sqlx(type_name = "rule_file_source")]
    pub enum FileSource {
        /// Uploaded directly with the rule payload.
        Upload => "upload",
        /// Snapshot of a library document taken at attach time.
        Document => "document",
    }
}

/// A file attached to a rule.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AutomationRuleFile {
    /// Attachment identifier.
    pub id: Uuid,
    /// The rule this file belongs to.
    pub rule_id: Uuid,
    /// Upload or document snapshot.
    pub source: FileSource,
    /// The library document the snapshot was taken from.
    pub source_document_id: Option<Uuid>,
    /// Original file name.
    pub name: String,
    /// Storage path.
    pub path: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// MIME type.
    pub mime_type: Option<String>,
    /// Lowercase extension without the dot.
    pub extension: Option<String>,
    /// When the file was attached.
    pub created_at: DateTime<Utc>,
}

/// Data required to attach a file to a rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRuleFile {
    /// Pre-generated identifier.
    pub id: Uuid,
    /// Upload or document snapshot.
    pub source: FileSource,
    /// Source library document.
    pub source_document_id: Option<Uuid>,
    /// File name.
    pub name: String,
    /// Storage path.
    pub path: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// MIME type.
    pub mime_type: Option<String>,
    /// Extension.
    pub extension: Option<String>,
    /// Attach instant.
    pub created_at: DateTime<Utc>,
}

impl CreateRuleFile {
    /// Materialize the row this attachment produces for `rule_id`.
    pub fn into_file(self, rule_id: Uuid) -> AutomationRuleFile {
        AutomationRuleFile {
            id: self.id,
            rule_id,
            source: self.source,
            source_document_id: self.source_document_id,
            name: self.name,
            path: self.path,
            size_bytes: self.size_bytes,
            mime_type: self.mime_type,
            extension: self.extension,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_columns_are_exclusive() {
        let id = Uuid::new_v4();
        let course = RuleOwner::Course(id);
        assert_eq!(course.course_id(), Some(id));
        assert_eq!(course.session_id(), None);

        let session = RuleOwner::Session(id);
        assert_eq!(session.course_id(), None);
        assert_eq!(session.session_id(), Some(id));
        assert_eq!(session.storage_segment(), format!("sessions/{id}"));
    }

    #[test]
    fn test_rule_serializes_kind_as_type() {
        let now = Utc::now();
        let rule = AutomationRule {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            course_id: Some(Uuid::new_v4()),
            session_id: None,
            title: "Welcome".into(),
            kind: RuleKind::Email,
            recipient: Recipient::Learner,
            dest_type: DestinationType::Email,
            dest: None,
            ref_date: RefDate::Enrollment,
            time_type: TimeType::On,
            n_days: 0,
            custom_time: NaiveTime::from_hms_opt(9, 30, 0),
            email_id: Some(Uuid::new_v4()),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["type"], "email");
        assert_eq!(json["custom_time"], "09:30:00");
        assert!(matches!(rule.owner(), RuleOwner::Course(_)));
    }
}
