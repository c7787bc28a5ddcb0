//! Quiz attempts: start, submit, grade, abandon.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use learnhub_auth::{Permission, RbacEnforcer};
use learnhub_core::error::{AppError, FieldErrors};
use learnhub_core::result::AppResult;
use learnhub_core::traits::Clock;
use learnhub_core::types::{PageRequest, PageResponse, lenient};
use learnhub_database::store::{AttemptFilter, QuizStore};
use learnhub_entity::quiz::{AttemptAnswers, AttemptStatus, Quiz, QuizAttempt, QuizQuestionWithOptions, grade};

use crate::context::RequestContext;

/// Answers submitted for an attempt: question id to chosen option ids.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitAttemptRequest {
    /// Chosen options per question.
    #[serde(default, deserialize_with = "lenient::embedded")]
    pub answers: Option<AttemptAnswers>,
}

/// Runs learner attempts.
#[derive(Debug, Clone)]
pub struct AttemptService {
    quizzes: Arc<dyn QuizStore>,
    rbac: Arc<RbacEnforcer>,
    clock: Arc<dyn Clock>,
}

impl AttemptService {
    /// Creates a new attempt service.
    pub fn new(quizzes: Arc<dyn QuizStore>, rbac: Arc<RbacEnforcer>, clock: Arc<dyn Clock>) -> Self {
        Self { quizzes, rbac, clock }
    }

    /// Start an attempt for the acting user. Refused when the quiz does not
    /// allow remakes and the user already has a live or finished attempt.
    pub async fn start(&self, ctx: &RequestContext, quiz_id: Uuid) -> AppResult<QuizAttempt> {
        let quiz = self.quiz(ctx, quiz_id).await?;
        if !quiz.is_published {
            return Err(AppError::forbidden("This quiz is not published"));
        }
        let attempt = self
            .quizzes
            .start_attempt(quiz.id, ctx.user_id(), self.clock.now())
            .await?;
        info!(user_id = %ctx.user_id(), quiz_id = %quiz.id, attempt_id = %attempt.id, "Quiz attempt started");
        Ok(attempt)
    }

    /// Record the answers of an in-progress attempt owned by the acting user.
    pub async fn submit(&self, ctx: &RequestContext, attempt_id: Uuid, req: SubmitAttemptRequest) -> AppResult<QuizAttempt> {
        let mut attempt = self.own_attempt(ctx, attempt_id).await?;
        if attempt.status != AttemptStatus::InProgress {
            return Err(AppError::business_rule("Only attempts in progress can be submitted"));
        }

        let answers = req.answers.unwrap_or_default();
        let questions = self.quizzes.quiz_questions(attempt.quiz_id).await?;
        check_answers(&questions, &answers)?;

        attempt.submit(answers, self.clock.now());

        let attempt = self.quizzes.save_attempt(&attempt).await?;
        info!(user_id = %ctx.user_id(), attempt_id = %attempt.id, "Quiz attempt submitted");
        Ok(attempt)
    }

    /// Score a submitted attempt against the current answer key.
    pub async fn grade(&self, ctx: &RequestContext, attempt_id: Uuid) -> AppResult<QuizAttempt> {
        let mut attempt = self.attempt(ctx, attempt_id).await?;
        if attempt.status != AttemptStatus::Submitted {
            return Err(AppError::business_rule("Only submitted attempts can be graded"));
        }

        let questions = self.quizzes.quiz_questions(attempt.quiz_id).await?;
        let (score, max_score) = grade(&questions, &attempt.answers.0);
        attempt.record_grade(score, max_score, self.clock.now());

        let attempt = self.quizzes.save_attempt(&attempt).await?;
        info!(grader_id = %ctx.user_id(), attempt_id = %attempt.id, score, max_score, "Quiz attempt graded");
        Ok(attempt)
    }

    /// Give up an in-progress attempt. An abandoned attempt does not count
    /// against the remake rule.
    pub async fn abandon(&self, ctx: &RequestContext, attempt_id: Uuid) -> AppResult<QuizAttempt> {
        let mut attempt = self.own_attempt(ctx, attempt_id).await?;
        if attempt.status != AttemptStatus::InProgress {
            return Err(AppError::business_rule("Only attempts in progress can be abandoned"));
        }
        attempt.status = AttemptStatus::Abandoned;
        let attempt = self.quizzes.save_attempt(&attempt).await?;
        info!(user_id = %ctx.user_id(), attempt_id = %attempt.id, "Quiz attempt abandoned");
        Ok(attempt)
    }

    /// Attempts of a quiz, newest first. Takers only see their own.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        quiz_id: Uuid,
        filter: &AttemptFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<QuizAttempt>> {
        let quiz = self.quiz(ctx, quiz_id).await?;
        let filter = self.visible(ctx, filter);
        self.quizzes.list_attempts(quiz.id, &filter, page).await
    }

    /// Every attempt of a quiz visible to the acting user, for exports.
    pub async fn all(&self, ctx: &RequestContext, quiz_id: Uuid, filter: &AttemptFilter) -> AppResult<(Quiz, Vec<QuizAttempt>)> {
        let quiz = self.quiz(ctx, quiz_id).await?;
        let filter = self.visible(ctx, filter);
        let attempts = self.quizzes.all_attempts(quiz.id, &filter).await?;
        Ok((quiz, attempts))
    }

    fn visible(&self, ctx: &RequestContext, filter: &AttemptFilter) -> AttemptFilter {
        let mut filter = filter.clone();
        if !self.rbac.has_permission(ctx.role(), Permission::QuizzesManage) {
            filter.user_id = Some(ctx.user_id());
        }
        filter
    }

    async fn quiz(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Quiz> {
        self.quizzes
            .find_quiz(ctx.org(), id)
            .await?
            .ok_or_else(|| AppError::not_found("Quiz not found"))
    }

    async fn attempt(&self, ctx: &RequestContext, id: Uuid) -> AppResult<QuizAttempt> {
        self.quizzes
            .find_attempt(ctx.org(), id)
            .await?
            .ok_or_else(|| AppError::not_found("Attempt not found"))
    }

    async fn own_attempt(&self, ctx: &RequestContext, id: Uuid) -> AppResult<QuizAttempt> {
        let attempt = self.attempt(ctx, id).await?;
        if attempt.user_id != ctx.user_id() {
            return Err(AppError::not_found("Attempt not found"));
        }
        Ok(attempt)
    }
}

/// Every answered question must belong to the quiz and every chosen
/// option to its question.
fn check_answers(questions: &[QuizQuestionWithOptions], answers: &AttemptAnswers) -> AppResult<()> {
    let mut fields = FieldErrors::new();
    for (question_id, chosen) in answers {
        let field = format!("answers.{question_id}");
        match questions.iter().find(|q| q.question.id == *question_id) {
            None => fields.add(&field, "not_a_child", "The question is not part of this quiz"),
            Some(question) => {
                if chosen.iter().any(|id| !question.options.iter().any(|o| o.id == *id)) {
                    fields.add(&field, "in", "An option does not belong to this question");
                }
            }
        }
    }
    fields.into_result()
}

#[cfg(test)]
mod tests {
    use learnhub_entity::quiz::{NewQuizOption, NewQuizQuestion, QuizQuestionKind};

    use super::*;

    fn question() -> QuizQuestionWithOptions {
        NewQuizQuestion {
            text: "Q".into(),
            kind: QuizQuestionKind::Single,
            points: 1,
            options: vec![
                NewQuizOption {
                    text: "a".into(),
                    is_correct: true,
                },
                NewQuizOption {
                    text: "b".into(),
                    is_correct: false,
                },
            ],
        }
        .into_rows(Uuid::new_v4(), 0)
    }

    #[test]
    fn test_answers_must_match_the_quiz() {
        let q = question();
        let mut answers = AttemptAnswers::new();
        answers.insert(q.question.id, vec![q.options[0].id]);
        assert!(check_answers(std::slice::from_ref(&q), &answers).is_ok());

        answers.insert(q.question.id, vec![Uuid::new_v4()]);
        assert!(check_answers(std::slice::from_ref(&q), &answers).is_err());

        let mut stray = AttemptAnswers::new();
        stray.insert(Uuid::new_v4(), vec![]);
        let err = check_answers(&[q], &stray).unwrap_err();
        assert!(err.fields.is_some());
    }
}
