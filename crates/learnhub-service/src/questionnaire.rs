//! Questionnaires: surveys with ordered questions, linkable from automation rules.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use learnhub_core::error::{AppError, FieldErrors};
use learnhub_core::result::AppResult;
use learnhub_core::traits::Clock;
use learnhub_core::types::{PageRequest, PageResponse, SortField, lenient};
use learnhub_database::store::{CourseStore, QuestionnaireFilter, QuestionnaireStore};
use learnhub_entity::document::AudienceType;
use learnhub_entity::questionnaire::{
    CreateQuestionnaire, NewQuestionnaireQuestion, QuestionKind, Questionnaire, QuestionnaireWithQuestions,
};

use crate::context::RequestContext;
use crate::validation::{ReorderRequest, collect, non_blank, parse_enum, required, validate};

/// One question as submitted.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionInput {
    /// Question text.
    #[serde(default)]
    pub text: Option<String>,
    /// Answer shape.
    #[serde(default, alias = "type")]
    pub kind: Option<String>,
    /// Choices for choice questions.
    #[serde(default)]
    pub options: Vec<String>,
    /// Mandatory flag.
    #[serde(default)]
    pub is_required: bool,
}

/// Create or update payload; on update absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct QuestionnairePayload {
    /// Title.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[validate(length(max = 255, message = "The title field may not be greater than 255 characters"))]
    pub title: Option<String>,
    /// Description.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
    /// Intended audience.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub audience_type: Option<String>,
    /// Owning course; absent for organization-wide questionnaires.
    #[serde(default, deserialize_with = "lenient::opt_uuid")]
    pub course_id: Option<Uuid>,
    /// Publication flag.
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub is_published: Option<bool>,
    /// Questions in display order. Present on update means full replacement.
    #[serde(default, deserialize_with = "lenient::embedded")]
    pub questions: Option<Vec<QuestionInput>>,
}

/// Check every question, reporting problems as `questions.{i}.{field}`.
fn parse_questions(inputs: Vec<QuestionInput>, fields: &mut FieldErrors) -> Vec<NewQuestionnaireQuestion> {
    let mut questions = Vec::with_capacity(inputs.len());
    for (i, input) in inputs.into_iter().enumerate() {
        let text = required(fields, &format!("questions.{i}.text"), non_blank(input.text));
        let kind_field = format!("questions.{i}.kind");
        let kind = match input.kind.as_deref() {
            Some(raw) => parse_enum::<QuestionKind>(fields, &kind_field, Some(raw)),
            None => required(fields, &kind_field, None),
        };
        let options: Vec<String> = input
            .options
            .into_iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
        if kind.is_some_and(|k| k.requires_options()) && options.is_empty() {
            fields.add(
                format!("questions.{i}.options"),
                "required",
                "Choice questions need at least one option",
            );
        }
        if let (Some(text), Some(kind)) = (text, kind) {
            questions.push(NewQuestionnaireQuestion {
                text,
                kind,
                options,
                is_required: input.is_required,
            });
        }
    }
    questions
}

/// Manages questionnaires.
#[derive(Debug, Clone)]
pub struct QuestionnaireService {
    questionnaires: Arc<dyn QuestionnaireStore>,
    courses: Arc<dyn CourseStore>,
    clock: Arc<dyn Clock>,
}

impl QuestionnaireService {
    /// Creates a new questionnaire service.
    pub fn new(questionnaires: Arc<dyn QuestionnaireStore>, courses: Arc<dyn CourseStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            questionnaires,
            courses,
            clock,
        }
    }

    /// Filtered, sorted, paginated questionnaires.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: &QuestionnaireFilter,
        sort: SortField,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Questionnaire>> {
        self.questionnaires.list_questionnaires(ctx.org(), filter, sort, page).await
    }

    /// A questionnaire with its ordered questions.
    pub async fn show(&self, ctx: &RequestContext, id: Uuid) -> AppResult<QuestionnaireWithQuestions> {
        let questionnaire = self.get(ctx, id).await?;
        self.with_questions(questionnaire).await
    }

    /// Create a questionnaire with its questions.
    pub async fn create(&self, ctx: &RequestContext, payload: QuestionnairePayload) -> AppResult<QuestionnaireWithQuestions> {
        let mut fields = FieldErrors::new();
        collect(&payload, &mut fields);
        let title = required(&mut fields, "title", non_blank(payload.title));
        let audience = parse_enum::<AudienceType>(&mut fields, "audience_type", payload.audience_type.as_deref());
        let questions = parse_questions(payload.questions.unwrap_or_default(), &mut fields);
        fields.into_result()?;
        let title = title.ok_or_else(|| AppError::field("title", "required", "The title field is required"))?;
        self.check_course(ctx, payload.course_id).await?;

        let data = CreateQuestionnaire {
            organization_id: ctx.org(),
            course_id: payload.course_id,
            title,
            description: non_blank(payload.description),
            audience_type: audience.unwrap_or_default(),
            is_published: payload.is_published.unwrap_or(false),
            created_by: ctx.user_id(),
            created_at: self.clock.now(),
        };
        let questionnaire = self.questionnaires.create_questionnaire(&data, questions).await?;

        info!(user_id = %ctx.user_id(), questionnaire_id = %questionnaire.id, "Questionnaire created");
        self.with_questions(questionnaire).await
    }

    /// Partial update; `questions`, when present, replaces every question.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        payload: QuestionnairePayload,
    ) -> AppResult<QuestionnaireWithQuestions> {
        let mut fields = FieldErrors::new();
        collect(&payload, &mut fields);
        let audience = parse_enum::<AudienceType>(&mut fields, "audience_type", payload.audience_type.as_deref());
        let questions = payload.questions.map(|q| parse_questions(q, &mut fields));
        fields.into_result()?;

        let mut questionnaire = self.get(ctx, id).await?;
        if payload.course_id.is_some() {
            self.check_course(ctx, payload.course_id).await?;
            questionnaire.course_id = payload.course_id;
        }
        if let Some(title) = non_blank(payload.title) {
            questionnaire.title = title;
        }
        if payload.description.is_some() {
            questionnaire.description = non_blank(payload.description);
        }
        if let Some(audience) = audience {
            questionnaire.audience_type = audience;
        }
        if let Some(published) = payload.is_published {
            questionnaire.is_published = published;
        }
        questionnaire.updated_at = self.clock.now();

        let questionnaire = self.questionnaires.update_questionnaire(&questionnaire, questions).await?;
        info!(questionnaire_id = %questionnaire.id, "Questionnaire updated");
        self.with_questions(questionnaire).await
    }

    /// Delete a questionnaire with its questions and rule links.
    pub async fn destroy(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let questionnaire = self.get(ctx, id).await?;
        if !self.questionnaires.delete_questionnaire(ctx.org(), questionnaire.id).await? {
            return Err(AppError::not_found("Questionnaire not found"));
        }
        info!(user_id = %ctx.user_id(), questionnaire_id = %questionnaire.id, "Questionnaire deleted");
        Ok(())
    }

    /// Set the publication flag.
    pub async fn set_published(&self, ctx: &RequestContext, id: Uuid, published: bool) -> AppResult<Questionnaire> {
        let mut questionnaire = self.get(ctx, id).await?;
        questionnaire.is_published = published;
        questionnaire.updated_at = self.clock.now();
        let questionnaire = self.questionnaires.update_questionnaire(&questionnaire, None).await?;
        info!(questionnaire_id = %questionnaire.id, published, "Questionnaire publication changed");
        Ok(questionnaire)
    }

    /// Copy a questionnaire and its questions as an unpublished draft.
    pub async fn duplicate(&self, ctx: &RequestContext, id: Uuid) -> AppResult<QuestionnaireWithQuestions> {
        let source = self.show(ctx, id).await?;
        let questions = source
            .questions
            .into_iter()
            .map(|q| NewQuestionnaireQuestion {
                text: q.text,
                kind: q.kind,
                options: q.options.0,
                is_required: q.is_required,
            })
            .collect();

        let data = CreateQuestionnaire {
            organization_id: ctx.org(),
            course_id: source.questionnaire.course_id,
            title: format!("{} (copy)", source.questionnaire.title),
            description: source.questionnaire.description,
            audience_type: source.questionnaire.audience_type,
            is_published: false,
            created_by: ctx.user_id(),
            created_at: self.clock.now(),
        };
        let copy = self.questionnaires.create_questionnaire(&data, questions).await?;

        info!(source_id = %id, questionnaire_id = %copy.id, "Questionnaire duplicated");
        self.with_questions(copy).await
    }

    /// Rewrite question positions to match `req.ids`.
    pub async fn reorder(&self, ctx: &RequestContext, id: Uuid, req: ReorderRequest) -> AppResult<QuestionnaireWithQuestions> {
        validate(&req)?;
        let questionnaire = self.get(ctx, id).await?;
        self.questionnaires
            .reorder_questionnaire_questions(questionnaire.id, &req.ids)
            .await?;
        self.with_questions(questionnaire).await
    }

    async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Questionnaire> {
        self.questionnaires
            .find_questionnaire(ctx.org(), id)
            .await?
            .ok_or_else(|| AppError::not_found("Questionnaire not found"))
    }

    async fn with_questions(&self, questionnaire: Questionnaire) -> AppResult<QuestionnaireWithQuestions> {
        let questions = self.questionnaires.questionnaire_questions(questionnaire.id).await?;
        Ok(QuestionnaireWithQuestions {
            questionnaire,
            questions,
        })
    }

    async fn check_course(&self, ctx: &RequestContext, course_id: Option<Uuid>) -> AppResult<()> {
        if let Some(course_id) = course_id {
            self.courses
                .find_course(ctx.org(), course_id)
                .await?
                .ok_or_else(|| AppError::field("course_id", "exists", "The selected course_id is invalid"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_problems_are_indexed() {
        let mut fields = FieldErrors::new();
        let parsed = parse_questions(
            vec![
                QuestionInput {
                    text: Some("How was it?".into()),
                    kind: Some("rating".into()),
                    options: vec![],
                    is_required: true,
                },
                QuestionInput {
                    text: Some("Pick one".into()),
                    kind: Some("single_choice".into()),
                    options: vec!["  ".into()],
                    is_required: false,
                },
                QuestionInput {
                    text: None,
                    kind: Some("essay".into()),
                    options: vec![],
                    is_required: false,
                },
            ],
            &mut fields,
        );
        assert_eq!(parsed.len(), 2);
        assert!(fields.contains("questions.1.options"));
        assert!(fields.contains("questions.2.text"));
        assert_eq!(fields.get("questions.2.kind").unwrap()[0].code, "in");
    }

    #[test]
    fn test_payload_accepts_embedded_questions() {
        let payload: QuestionnairePayload = serde_json::from_value(serde_json::json!({
            "title": "Feedback",
            "is_published": "1",
            "questions": "[{\"text\":\"Why?\",\"type\":\"text\"}]",
        }))
        .unwrap();
        let questions = payload.questions.unwrap();
        assert_eq!(questions[0].kind.as_deref(), Some("text"));
        assert_eq!(payload.is_published, Some(true));
    }
}
