//! Quiz repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use learnhub_core::error::AppError;
use learnhub_core::result::AppResult;
use learnhub_core::types::{PageRequest, PageResponse, SortField};
use learnhub_entity::quiz::{
    AttemptStatus, Quiz, QuizAttempt, QuizOption, QuizQuestion, QuizQuestionWithOptions,
};

use super::db_error;
use crate::store::filter::like_pattern;
use crate::store::{AttemptFilter, QuizFilter, QuizStore, reorder_rejected};

const QUIZ_FILTER: &str = "organization_id = $1 \
    AND ($2::uuid IS NULL OR course_id = $2) \
    AND ($3::text IS NULL OR category = $3) \
    AND ($4::boolean IS NULL OR is_published = $4) \
    AND ($5::text IS NULL OR title ILIKE $5)";

const ATTEMPT_FILTER: &str = "quiz_id = $1 \
    AND ($2::uuid IS NULL OR user_id = $2) \
    AND (NOT $3 OR status = 'graded')";

/// Repository for quizzes, questions, options and attempts.
#[derive(Debug, Clone)]
pub struct QuizRepository {
    pool: PgPool,
}

impl QuizRepository {
    /// Create a new quiz repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_question(
        tx: &mut Transaction<'_, Postgres>,
        question: &QuizQuestionWithOptions,
    ) -> AppResult<()> {
        let q = &question.question;
        sqlx::query(
            "INSERT INTO quiz_questions (id, quiz_id, text, kind, points, order_index) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(q.id)
        .bind(q.quiz_id)
        .bind(&q.text)
        .bind(q.kind)
        .bind(q.points)
        .bind(q.order_index)
        .execute(&mut **tx)
        .await
        .map_err(db_error("Failed to create quiz question"))?;

        Self::insert_options(tx, &question.options).await
    }

    async fn insert_options(tx: &mut Transaction<'_, Postgres>, options: &[QuizOption]) -> AppResult<()> {
        for option in options {
            sqlx::query(
                "INSERT INTO quiz_options (id, question_id, text, is_correct, order_index) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(option.id)
            .bind(option.question_id)
            .bind(&option.text)
            .bind(option.is_correct)
            .bind(option.order_index)
            .execute(&mut **tx)
            .await
            .map_err(db_error("Failed to create quiz option"))?;
        }
        Ok(())
    }

    /// Lock the quiz, recompute `progress` from its question count and return it.
    async fn refresh_progress(tx: &mut Transaction<'_, Postgres>, quiz_id: Uuid) -> AppResult<Quiz> {
        let quiz = sqlx::query_as::<_, Quiz>("SELECT * FROM quizzes WHERE id = $1 FOR UPDATE")
            .bind(quiz_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(db_error("Failed to lock quiz"))?
            .ok_or_else(|| AppError::not_found(format!("Quiz {quiz_id} not found")))?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quiz_questions WHERE quiz_id = $1")
            .bind(quiz_id)
            .fetch_one(&mut **tx)
            .await
            .map_err(db_error("Failed to count quiz questions"))?;

        sqlx::query_as::<_, Quiz>("UPDATE quizzes SET progress = $2 WHERE id = $1 RETURNING *")
            .bind(quiz_id)
            .bind(quiz.calculate_progress(count as usize))
            .fetch_one(&mut **tx)
            .await
            .map_err(db_error("Failed to update quiz progress"))
    }

    async fn load_questions(&self, quiz_id: Uuid) -> AppResult<Vec<QuizQuestionWithOptions>> {
        let questions = sqlx::query_as::<_, QuizQuestion>(
            "SELECT * FROM quiz_questions WHERE quiz_id = $1 ORDER BY order_index ASC, id ASC",
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list quiz questions"))?;

        let options = sqlx::query_as::<_, QuizOption>(
            "SELECT o.* FROM quiz_options o JOIN quiz_questions q ON q.id = o.question_id \
             WHERE q.quiz_id = $1 ORDER BY o.order_index ASC, o.id ASC",
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list quiz options"))?;

        Ok(questions
            .into_iter()
            .map(|question| {
                let options = options
                    .iter()
                    .filter(|o| o.question_id == question.id)
                    .cloned()
                    .collect();
                QuizQuestionWithOptions { question, options }
            })
            .collect())
    }

    async fn query_attempts(
        &self,
        quiz_id: Uuid,
        filter: &AttemptFilter,
        page: Option<&PageRequest>,
    ) -> AppResult<Vec<QuizAttempt>> {
        let (limit, offset) = page.map_or((None, 0), |p| (Some(p.limit() as i64), p.offset() as i64));
        sqlx::query_as::<_, QuizAttempt>(&format!(
            "SELECT * FROM quiz_attempts WHERE {ATTEMPT_FILTER} \
             ORDER BY started_at DESC, id ASC LIMIT $4 OFFSET $5"
        ))
        .bind(quiz_id)
        .bind(filter.user_id)
        .bind(filter.graded_only)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list quiz attempts"))
    }
}

#[async_trait]
impl QuizStore for QuizRepository {
    async fn list_quizzes(
        &self,
        organization_id: Uuid,
        filter: &QuizFilter,
        sort: SortField,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Quiz>> {
        let pattern = like_pattern(filter.search.as_deref());

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM quizzes WHERE {QUIZ_FILTER}"))
            .bind(organization_id)
            .bind(filter.course_id)
            .bind(&filter.category)
            .bind(filter.is_published)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count quizzes"))?;

        let quizzes = sqlx::query_as::<_, Quiz>(&format!(
            "SELECT * FROM quizzes WHERE {QUIZ_FILTER} {} LIMIT $6 OFFSET $7",
            sort.order_by("title")
        ))
        .bind(organization_id)
        .bind(filter.course_id)
        .bind(&filter.category)
        .bind(filter.is_published)
        .bind(&pattern)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list quizzes"))?;

        Ok(PageResponse::new(quizzes, page, total as u64))
    }

    async fn find_quiz(&self, organization_id: Uuid, id: Uuid) -> AppResult<Option<Quiz>> {
        sqlx::query_as::<_, Quiz>("SELECT * FROM quizzes WHERE id = $1 AND organization_id = $2")
            .bind(id)
            .bind(organization_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find quiz"))
    }

    async fn quiz_questions(&self, quiz_id: Uuid) -> AppResult<Vec<QuizQuestionWithOptions>> {
        self.load_questions(quiz_id).await
    }

    async fn create_quiz(&self, quiz: &Quiz, questions: &[QuizQuestionWithOptions]) -> AppResult<Quiz> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        sqlx::query(
            "INSERT INTO quizzes \
                (id, organization_id, course_id, title, description, thumbnail, category, duration_minutes, \
                 is_shuffle, is_remake, is_published, progress, created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 0, $12, $13, $14)",
        )
        .bind(quiz.id)
        .bind(quiz.organization_id)
        .bind(quiz.course_id)
        .bind(&quiz.title)
        .bind(&quiz.description)
        .bind(&quiz.thumbnail)
        .bind(&quiz.category)
        .bind(quiz.duration_minutes)
        .bind(quiz.is_shuffle)
        .bind(quiz.is_remake)
        .bind(quiz.is_published)
        .bind(quiz.created_by)
        .bind(quiz.created_at)
        .bind(quiz.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to create quiz"))?;

        for question in questions {
            Self::insert_question(&mut tx, question).await?;
        }
        let created = Self::refresh_progress(&mut tx, quiz.id).await?;

        tx.commit().await.map_err(db_error("Failed to commit quiz"))?;
        Ok(created)
    }

    async fn save_quiz(&self, quiz: &Quiz) -> AppResult<Quiz> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        let result = sqlx::query(
            "UPDATE quizzes SET course_id = $3, title = $4, description = $5, thumbnail = $6, \
                category = $7, duration_minutes = $8, is_shuffle = $9, is_remake = $10, \
                is_published = $11, updated_at = $12 \
             WHERE id = $1 AND organization_id = $2",
        )
        .bind(quiz.id)
        .bind(quiz.organization_id)
        .bind(quiz.course_id)
        .bind(&quiz.title)
        .bind(&quiz.description)
        .bind(&quiz.thumbnail)
        .bind(&quiz.category)
        .bind(quiz.duration_minutes)
        .bind(quiz.is_shuffle)
        .bind(quiz.is_remake)
        .bind(quiz.is_published)
        .bind(quiz.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to update quiz"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Quiz {} not found", quiz.id)));
        }
        let saved = Self::refresh_progress(&mut tx, quiz.id).await?;

        tx.commit().await.map_err(db_error("Failed to commit quiz"))?;
        Ok(saved)
    }

    async fn delete_quiz(&self, organization_id: Uuid, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM quizzes WHERE id = $1 AND organization_id = $2")
            .bind(id)
            .bind(organization_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete quiz"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_quiz_question(&self, quiz_id: Uuid, question: &QuizQuestionWithOptions) -> AppResult<Quiz> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        let next: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(order_index) + 1, 0) FROM quiz_questions WHERE quiz_id = $1",
        )
        .bind(quiz_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to compute question position"))?;

        let mut row = question.clone();
        row.question.quiz_id = quiz_id;
        row.question.order_index = next;
        Self::insert_question(&mut tx, &row).await?;
        let quiz = Self::refresh_progress(&mut tx, quiz_id).await?;

        tx.commit().await.map_err(db_error("Failed to commit quiz question"))?;
        Ok(quiz)
    }

    async fn replace_quiz_question(&self, quiz_id: Uuid, question: &QuizQuestionWithOptions) -> AppResult<Quiz> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        let q = &question.question;
        let result = sqlx::query(
            "UPDATE quiz_questions SET text = $3, kind = $4, points = $5 WHERE id = $1 AND quiz_id = $2",
        )
        .bind(q.id)
        .bind(quiz_id)
        .bind(&q.text)
        .bind(q.kind)
        .bind(q.points)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to update quiz question"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Question {} not found", q.id)));
        }

        sqlx::query("DELETE FROM quiz_options WHERE question_id = $1")
            .bind(q.id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to replace quiz options"))?;
        Self::insert_options(&mut tx, &question.options).await?;
        let quiz = Self::refresh_progress(&mut tx, quiz_id).await?;

        tx.commit().await.map_err(db_error("Failed to commit quiz question"))?;
        Ok(quiz)
    }

    async fn delete_quiz_question(&self, quiz_id: Uuid, question_id: Uuid) -> AppResult<Option<Quiz>> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        let result = sqlx::query("DELETE FROM quiz_questions WHERE id = $1 AND quiz_id = $2")
            .bind(question_id)
            .bind(quiz_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete quiz question"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        let quiz = Self::refresh_progress(&mut tx, quiz_id).await?;

        tx.commit().await.map_err(db_error("Failed to commit quiz question"))?;
        Ok(Some(quiz))
    }

    async fn reorder_quiz_questions(&self, quiz_id: Uuid, question_ids: &[Uuid]) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        for (index, question_id) in question_ids.iter().enumerate() {
            let result = sqlx::query(
                "UPDATE quiz_questions SET order_index = $3 WHERE quiz_id = $1 AND id = $2",
            )
            .bind(quiz_id)
            .bind(question_id)
            .bind(index as i32)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to reorder quiz questions"))?;

            if result.rows_affected() == 0 {
                return Err(reorder_rejected(*question_id));
            }
        }

        tx.commit().await.map_err(db_error("Failed to commit quiz reorder"))?;
        Ok(())
    }

    async fn start_attempt(&self, quiz_id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> AppResult<QuizAttempt> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        let quiz = sqlx::query_as::<_, Quiz>("SELECT * FROM quizzes WHERE id = $1 FOR UPDATE")
            .bind(quiz_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to lock quiz"))?
            .ok_or_else(|| AppError::not_found(format!("Quiz {quiz_id} not found")))?;

        if !quiz.is_remake {
            let previous: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM quiz_attempts WHERE quiz_id = $1 AND user_id = $2 AND status <> $3",
            )
            .bind(quiz_id)
            .bind(user_id)
            .bind(AttemptStatus::Abandoned)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("Failed to count previous attempts"))?;

            if previous > 0 {
                return Err(AppError::forbidden("This quiz cannot be taken again"));
            }
        }

        let attempt = QuizAttempt::start(quiz_id, user_id, now);
        let created = sqlx::query_as::<_, QuizAttempt>(
            "INSERT INTO quiz_attempts (id, quiz_id, user_id, status, answers, started_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(attempt.id)
        .bind(attempt.quiz_id)
        .bind(attempt.user_id)
        .bind(attempt.status)
        .bind(&attempt.answers)
        .bind(attempt.started_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to start quiz attempt"))?;

        tx.commit().await.map_err(db_error("Failed to commit quiz attempt"))?;
        Ok(created)
    }

    async fn find_attempt(&self, organization_id: Uuid, id: Uuid) -> AppResult<Option<QuizAttempt>> {
        sqlx::query_as::<_, QuizAttempt>(
            "SELECT a.* FROM quiz_attempts a JOIN quizzes q ON q.id = a.quiz_id \
             WHERE a.id = $1 AND q.organization_id = $2",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find quiz attempt"))
    }

    async fn list_attempts(
        &self,
        quiz_id: Uuid,
        filter: &AttemptFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<QuizAttempt>> {
        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM quiz_attempts WHERE {ATTEMPT_FILTER}"
        ))
        .bind(quiz_id)
        .bind(filter.user_id)
        .bind(filter.graded_only)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count quiz attempts"))?;

        let attempts = self.query_attempts(quiz_id, filter, Some(page)).await?;
        Ok(PageResponse::new(attempts, page, total as u64))
    }

    async fn all_attempts(&self, quiz_id: Uuid, filter: &AttemptFilter) -> AppResult<Vec<QuizAttempt>> {
        self.query_attempts(quiz_id, filter, None).await
    }

    async fn save_attempt(&self, attempt: &QuizAttempt) -> AppResult<QuizAttempt> {
        sqlx::query_as::<_, QuizAttempt>(
            "UPDATE quiz_attempts SET status = $2, answers = $3, score = $4, max_score = $5, \
                submitted_at = $6, graded_at = $7 \
             WHERE id = $1 RETURNING *",
        )
        .bind(attempt.id)
        .bind(attempt.status)
        .bind(&attempt.answers)
        .bind(attempt.score)
        .bind(attempt.max_score)
        .bind(attempt.submitted_at)
        .bind(attempt.graded_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update quiz attempt"))?
        .ok_or_else(|| AppError::not_found(format!("Attempt {} not found", attempt.id)))
    }
}
