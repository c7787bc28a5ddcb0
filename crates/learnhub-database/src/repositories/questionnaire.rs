//! Questionnaire repository.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use learnhub_core::error::AppError;
use learnhub_core::result::AppResult;
use learnhub_core::types::{PageRequest, PageResponse, SortField};
use learnhub_entity::questionnaire::{
    CreateQuestionnaire, NewQuestionnaireQuestion, Questionnaire, QuestionnaireQuestion,
};

use super::db_error;
use crate::store::filter::like_pattern;
use crate::store::{QuestionnaireFilter, QuestionnaireStore, reorder_rejected};

const QUESTIONNAIRE_FILTER: &str = "organization_id = $1 \
    AND ($2::uuid IS NULL OR course_id = $2) \
    AND ($3::audience_type IS NULL OR audience_type = $3) \
    AND ($4::boolean IS NULL OR is_published = $4) \
    AND ($5::text IS NULL OR title ILIKE $5)";

/// Repository for questionnaires and their questions.
#[derive(Debug, Clone)]
pub struct QuestionnaireRepository {
    pool: PgPool,
}

impl QuestionnaireRepository {
    /// Create a new questionnaire repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_questions(
        tx: &mut Transaction<'_, Postgres>,
        questionnaire_id: Uuid,
        questions: Vec<NewQuestionnaireQuestion>,
    ) -> AppResult<()> {
        for (index, question) in questions.into_iter().enumerate() {
            let row = question.into_question(questionnaire_id, index as i32);
            sqlx::query(
                "INSERT INTO questionnaire_questions \
                    (id, questionnaire_id, text, kind, options, is_required, order_index) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(row.id)
            .bind(row.questionnaire_id)
            .bind(&row.text)
            .bind(row.kind)
            .bind(&row.options)
            .bind(row.is_required)
            .bind(row.order_index)
            .execute(&mut **tx)
            .await
            .map_err(db_error("Failed to create questionnaire question"))?;
        }
        Ok(())
    }
}

#[async_trait]
impl QuestionnaireStore for QuestionnaireRepository {
    async fn list_questionnaires(
        &self,
        organization_id: Uuid,
        filter: &QuestionnaireFilter,
        sort: SortField,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Questionnaire>> {
        let pattern = like_pattern(filter.search.as_deref());

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM questionnaires WHERE {QUESTIONNAIRE_FILTER}"
        ))
        .bind(organization_id)
        .bind(filter.course_id)
        .bind(filter.audience_type)
        .bind(filter.is_published)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count questionnaires"))?;

        let questionnaires = sqlx::query_as::<_, Questionnaire>(&format!(
            "SELECT * FROM questionnaires WHERE {QUESTIONNAIRE_FILTER} {} LIMIT $6 OFFSET $7",
            sort.order_by("title")
        ))
        .bind(organization_id)
        .bind(filter.course_id)
        .bind(filter.audience_type)
        .bind(filter.is_published)
        .bind(&pattern)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list questionnaires"))?;

        Ok(PageResponse::new(questionnaires, page, total as u64))
    }

    async fn find_questionnaire(&self, organization_id: Uuid, id: Uuid) -> AppResult<Option<Questionnaire>> {
        sqlx::query_as::<_, Questionnaire>(
            "SELECT * FROM questionnaires WHERE id = $1 AND organization_id = $2",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find questionnaire"))
    }

    async fn find_questionnaires(&self, organization_id: Uuid, ids: &[Uuid]) -> AppResult<Vec<Questionnaire>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Questionnaire>(
            "SELECT * FROM questionnaires WHERE organization_id = $1 AND id = ANY($2)",
        )
        .bind(organization_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to resolve questionnaires"))
    }

    async fn questionnaire_questions(&self, questionnaire_id: Uuid) -> AppResult<Vec<QuestionnaireQuestion>> {
        sqlx::query_as::<_, QuestionnaireQuestion>(
            "SELECT * FROM questionnaire_questions WHERE questionnaire_id = $1 \
             ORDER BY order_index ASC, id ASC",
        )
        .bind(questionnaire_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list questionnaire questions"))
    }

    async fn create_questionnaire(
        &self,
        data: &CreateQuestionnaire,
        questions: Vec<NewQuestionnaireQuestion>,
    ) -> AppResult<Questionnaire> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        let questionnaire = sqlx::query_as::<_, Questionnaire>(
            "INSERT INTO questionnaires \
                (id, organization_id, course_id, title, description, audience_type, is_published, \
                 created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.organization_id)
        .bind(data.course_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.audience_type)
        .bind(data.is_published)
        .bind(data.created_by)
        .bind(data.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to create questionnaire"))?;

        Self::insert_questions(&mut tx, questionnaire.id, questions).await?;

        tx.commit().await.map_err(db_error("Failed to commit questionnaire"))?;
        Ok(questionnaire)
    }

    async fn update_questionnaire(
        &self,
        questionnaire: &Questionnaire,
        questions: Option<Vec<NewQuestionnaireQuestion>>,
    ) -> AppResult<Questionnaire> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        let updated = sqlx::query_as::<_, Questionnaire>(
            "UPDATE questionnaires SET course_id = $3, title = $4, description = $5, \
                audience_type = $6, is_published = $7, updated_at = $8 \
             WHERE id = $1 AND organization_id = $2 RETURNING *",
        )
        .bind(questionnaire.id)
        .bind(questionnaire.organization_id)
        .bind(questionnaire.course_id)
        .bind(&questionnaire.title)
        .bind(&questionnaire.description)
        .bind(questionnaire.audience_type)
        .bind(questionnaire.is_published)
        .bind(questionnaire.updated_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to update questionnaire"))?
        .ok_or_else(|| AppError::not_found(format!("Questionnaire {} not found", questionnaire.id)))?;

        if let Some(questions) = questions {
            sqlx::query("DELETE FROM questionnaire_questions WHERE questionnaire_id = $1")
                .bind(questionnaire.id)
                .execute(&mut *tx)
                .await
                .map_err(db_error("Failed to replace questionnaire questions"))?;
            Self::insert_questions(&mut tx, questionnaire.id, questions).await?;
        }

        tx.commit().await.map_err(db_error("Failed to commit questionnaire"))?;
        Ok(updated)
    }

    async fn delete_questionnaire(&self, organization_id: Uuid, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM questionnaires WHERE id = $1 AND organization_id = $2")
            .bind(id)
            .bind(organization_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete questionnaire"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn reorder_questionnaire_questions(&self, questionnaire_id: Uuid, question_ids: &[Uuid]) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        for (index, question_id) in question_ids.iter().enumerate() {
            let result = sqlx::query(
                "UPDATE questionnaire_questions SET order_index = $3 WHERE questionnaire_id = $1 AND id = $2",
            )
            .bind(questionnaire_id)
            .bind(question_id)
            .bind(index as i32)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to reorder questionnaire questions"))?;

            if result.rows_affected() == 0 {
                return Err(reorder_rejected(*question_id));
            }
        }

        tx.commit().await.map_err(db_error("Failed to commit questionnaire reorder"))?;
        Ok(())
    }
}
