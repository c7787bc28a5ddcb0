//! Questionnaire entity models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

use crate::document::AudienceType;

text_enum! {
    /// Answer shape of a questionnaire question.
    #[sqlx(type_name = "questionnaire_question_kind")]
    pub enum QuestionKind {
        /// Free text.
        Text => "text",
        /// Numeric rating.
        Rating => "rating",
        /// One option out of `options`.
        SingleChoice => "single_choice",
        /// Any number of `options`.
        MultipleChoice => "multiple_choice",
    }
}

impl QuestionKind {
    /// Whether the question needs a non-empty option list.
    pub fn requires_options(&self) -> bool {
        matches!(self, Self::SingleChoice | Self::MultipleChoice)
    }
}

/// A questionnaire owned by an organization, optionally scoped to a course.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Questionnaire {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// Course, or `None` for an organization-global questionnaire.
    pub course_id: Option<Uuid>,
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Intended audience.
    pub audience_type: AudienceType,
    /// Publication flag.
    pub is_published: bool,
    /// Creating user.
    pub created_by: Uuid,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Last update instant.
    pub updated_at: DateTime<Utc>,
}

impl Questionnaire {
    /// Whether an automation rule of `course_id` may link this questionnaire.
    pub fn is_linkable_from(&self, course_id: Uuid) -> bool {
        self.course_id.is_none_or(|own| own == course_id)
    }
}

/// A question of a questionnaire.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuestionnaireQuestion {
    /// Unique identifier.
    pub id: Uuid,
    /// Parent questionnaire.
    pub questionnaire_id: Uuid,
    /// Question text.
    pub text: String,
    /// Answer shape.
    pub kind: QuestionKind,
    /// Choices for choice kinds.
    pub options: Json<Vec<String>>,
    /// Whether an answer is mandatory.
    pub is_required: bool,
    /// Zero-based position.
    pub order_index: i32,
}

/// A question to insert; `order_index` is its position in the submitted list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuestionnaireQuestion {
    /// Question text.
    pub text: String,
    /// Answer shape.
    pub kind: QuestionKind,
    /// Choices.
    pub options: Vec<String>,
    /// Mandatory flag.
    pub is_required: bool,
}

impl NewQuestionnaireQuestion {
    /// Materialize the row for `questionnaire_id` at `order_index`.
    pub fn into_question(self, questionnaire_id: Uuid, order_index: i32) -> QuestionnaireQuestion {
        QuestionnaireQuestion {
            id: Uuid::new_v4(),
            questionnaire_id,
            text: self.text,
            kind: self.kind,
            options: Json(self.options),
            is_required: self.is_required,
            order_index,
        }
    }
}

/// Data required to create a questionnaire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQuestionnaire {
    /// Owning organization.
    pub organization_id: Uuid,
    /// Optional course.
    pub course_id: Option<Uuid>,
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Intended audience.
    pub audience_type: AudienceType,
    /// Publication flag.
    pub is_published: bool,
    /// Creating user.
    pub created_by: Uuid,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

/// A questionnaire with its ordered questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionnaireWithQuestions {
    /// Questionnaire row.
    #[serde(flatten)]
    pub questionnaire: Questionnaire,
    /// Questions sorted by `order_index`.
    pub questions: Vec<QuestionnaireQuestion>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_kinds_need_options() {
        assert!(QuestionKind::SingleChoice.requires_options());
        assert!(QuestionKind::MultipleChoice.requires_options());
        assert!(!QuestionKind::Text.requires_options());
        assert!(!QuestionKind::Rating.requires_options());
    }

    #[test]
    fn test_global_questionnaire_is_linkable_everywhere() {
        let now = Utc::now();
        let mut q = Questionnaire {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            course_id: None,
            title: "Satisfaction".into(),
            description: None,
            audience_type: AudienceType::Students,
            is_published: false,
            created_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        };
        let course = Uuid::new_v4();
        assert!(q.is_linkable_from(course));
        q.course_id = Some(Uuid::new_v4());
        assert!(!q.is_linkable_from(course));
    }
}
