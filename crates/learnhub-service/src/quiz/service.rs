//! Quiz authoring: quizzes, questions and options.

use std::sync::Arc;

use rand::seq::SliceRandom;
use tracing::info;
use uuid::Uuid;

use learnhub_auth::{Permission, RbacEnforcer};
use learnhub_core::error::{AppError, FieldErrors};
use learnhub_core::result::AppResult;
use learnhub_core::traits::Clock;
use learnhub_core::types::{PageRequest, PageResponse, SortField};
use learnhub_database::store::{CourseStore, QuizFilter, QuizStore};
use learnhub_entity::quiz::{CreateQuiz, NewQuizQuestion, Quiz, QuizQuestionWithOptions, QuizWithQuestions};

use super::payload::{QuizPayload, QuizQuestionInput, parse_question, parse_questions};
use crate::context::RequestContext;
use crate::validation::{ReorderRequest, collect, non_blank, required, validate};

/// Manages quizzes and their questions.
#[derive(Debug, Clone)]
pub struct QuizService {
    quizzes: Arc<dyn QuizStore>,
    courses: Arc<dyn CourseStore>,
    rbac: Arc<RbacEnforcer>,
    clock: Arc<dyn Clock>,
}

impl QuizService {
    /// Creates a new quiz service.
    pub fn new(
        quizzes: Arc<dyn QuizStore>,
        courses: Arc<dyn CourseStore>,
        rbac: Arc<RbacEnforcer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            quizzes,
            courses,
            rbac,
            clock,
        }
    }

    /// Filtered, sorted, paginated quizzes. Takers only see published ones.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: &QuizFilter,
        sort: SortField,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Quiz>> {
        let mut filter = filter.clone();
        if !self.is_author(ctx) {
            filter.is_published = Some(true);
        }
        self.quizzes.list_quizzes(ctx.org(), &filter, sort, page).await
    }

    /// A quiz with its questions. Takers get shuffled questions and options
    /// when the quiz asks for it.
    pub async fn show(&self, ctx: &RequestContext, id: Uuid) -> AppResult<QuizWithQuestions> {
        let quiz = self.get(ctx, id).await?;
        let author = self.is_author(ctx);
        if !author && !quiz.is_published {
            return Err(AppError::not_found("Quiz not found"));
        }

        let mut questions = self.quizzes.quiz_questions(quiz.id).await?;
        if quiz.is_shuffle && !author {
            shuffle(&mut questions);
        }
        Ok(QuizWithQuestions { quiz, questions })
    }

    /// Create a quiz with its questions.
    pub async fn create(&self, ctx: &RequestContext, payload: QuizPayload) -> AppResult<QuizWithQuestions> {
        let mut fields = FieldErrors::new();
        collect(&payload, &mut fields);
        let title = required(&mut fields, "title", non_blank(payload.title.clone()));
        let questions = parse_questions(payload.questions.clone().unwrap_or_default(), &mut fields);
        fields.into_result()?;
        let title = title.ok_or_else(|| AppError::field("title", "required", "The title field is required"))?;
        let is_published = payload.is_published.unwrap_or(false);
        ensure_publishable(is_published, questions.len())?;
        self.check_course(ctx, payload.course_id).await?;

        let id = Uuid::new_v4();
        let rows: Vec<QuizQuestionWithOptions> = questions
            .into_iter()
            .enumerate()
            .map(|(i, q)| q.into_rows(id, i as i32))
            .collect();
        let quiz = CreateQuiz {
            organization_id: ctx.org(),
            course_id: payload.course_id,
            title,
            description: non_blank(payload.description),
            thumbnail: non_blank(payload.thumbnail),
            category: non_blank(payload.category),
            duration_minutes: payload.duration_minutes,
            is_shuffle: payload.is_shuffle.unwrap_or(false),
            is_remake: payload.is_remake.unwrap_or(false),
            is_published,
            created_by: ctx.user_id(),
            created_at: self.clock.now(),
        }
        .into_quiz(id, rows.len());

        let quiz = self.quizzes.create_quiz(&quiz, &rows).await?;
        info!(user_id = %ctx.user_id(), quiz_id = %quiz.id, questions = rows.len(), "Quiz created");
        self.with_questions(quiz).await
    }

    /// Partial update of the quiz columns.
    pub async fn update(&self, ctx: &RequestContext, id: Uuid, payload: QuizPayload) -> AppResult<Quiz> {
        validate(&payload)?;
        let mut quiz = self.get(ctx, id).await?;

        if payload.course_id.is_some() {
            self.check_course(ctx, payload.course_id).await?;
            quiz.course_id = payload.course_id;
        }
        if let Some(title) = non_blank(payload.title) {
            quiz.title = title;
        }
        if payload.description.is_some() {
            quiz.description = non_blank(payload.description);
        }
        if payload.thumbnail.is_some() {
            quiz.thumbnail = non_blank(payload.thumbnail);
        }
        if payload.category.is_some() {
            quiz.category = non_blank(payload.category);
        }
        if payload.duration_minutes.is_some() {
            quiz.duration_minutes = payload.duration_minutes;
        }
        if let Some(shuffle) = payload.is_shuffle {
            quiz.is_shuffle = shuffle;
        }
        if let Some(remake) = payload.is_remake {
            quiz.is_remake = remake;
        }
        if let Some(published) = payload.is_published {
            if published && !quiz.is_published {
                ensure_publishable(true, self.quizzes.quiz_questions(quiz.id).await?.len())?;
            }
            quiz.is_published = published;
        }
        quiz.updated_at = self.clock.now();

        let quiz = self.quizzes.save_quiz(&quiz).await?;
        info!(quiz_id = %quiz.id, progress = quiz.progress, "Quiz updated");
        Ok(quiz)
    }

    /// Delete a quiz with its questions and attempts.
    pub async fn destroy(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let quiz = self.get(ctx, id).await?;
        if !self.quizzes.delete_quiz(ctx.org(), quiz.id).await? {
            return Err(AppError::not_found("Quiz not found"));
        }
        info!(user_id = %ctx.user_id(), quiz_id = %quiz.id, "Quiz deleted");
        Ok(())
    }

    /// Set the publication flag.
    pub async fn set_published(&self, ctx: &RequestContext, id: Uuid, published: bool) -> AppResult<Quiz> {
        let mut quiz = self.get(ctx, id).await?;
        if published {
            ensure_publishable(true, self.quizzes.quiz_questions(quiz.id).await?.len())?;
        }
        quiz.is_published = published;
        quiz.updated_at = self.clock.now();
        let quiz = self.quizzes.save_quiz(&quiz).await?;
        info!(quiz_id = %quiz.id, published, "Quiz publication changed");
        Ok(quiz)
    }

    /// Copy a quiz with its questions and options as an unpublished draft.
    pub async fn duplicate(&self, ctx: &RequestContext, id: Uuid) -> AppResult<QuizWithQuestions> {
        let source = self.get(ctx, id).await?;
        let questions = self.quizzes.quiz_questions(source.id).await?;

        let now = self.clock.now();
        let copy_id = Uuid::new_v4();
        let rows: Vec<QuizQuestionWithOptions> = questions.iter().map(|q| q.duplicate_into(copy_id)).collect();
        let copy = CreateQuiz {
            organization_id: ctx.org(),
            course_id: source.course_id,
            title: format!("{} (copy)", source.title),
            description: source.description,
            thumbnail: source.thumbnail,
            category: source.category,
            duration_minutes: source.duration_minutes,
            is_shuffle: source.is_shuffle,
            is_remake: source.is_remake,
            is_published: false,
            created_by: ctx.user_id(),
            created_at: now,
        }
        .into_quiz(copy_id, rows.len());

        let copy = self.quizzes.create_quiz(&copy, &rows).await?;
        info!(source_id = %id, quiz_id = %copy.id, "Quiz duplicated");
        self.with_questions(copy).await
    }

    /// Append a question.
    pub async fn add_question(&self, ctx: &RequestContext, quiz_id: Uuid, input: QuizQuestionInput) -> AppResult<QuizWithQuestions> {
        let quiz = self.get(ctx, quiz_id).await?;
        let question = checked_question(input)?;
        let quiz = self.quizzes.add_quiz_question(quiz.id, &question.into_rows(quiz.id, 0)).await?;
        info!(quiz_id = %quiz.id, "Quiz question added");
        self.with_questions(quiz).await
    }

    /// Overwrite a question and its options.
    pub async fn update_question(
        &self,
        ctx: &RequestContext,
        quiz_id: Uuid,
        question_id: Uuid,
        input: QuizQuestionInput,
    ) -> AppResult<QuizWithQuestions> {
        let quiz = self.get(ctx, quiz_id).await?;
        let current = self
            .quizzes
            .quiz_questions(quiz.id)
            .await?
            .into_iter()
            .find(|q| q.question.id == question_id)
            .ok_or_else(|| AppError::not_found("Question not found"))?;

        let mut rows = checked_question(input)?.into_rows(quiz.id, current.question.order_index);
        rows.question.id = current.question.id;
        for option in &mut rows.options {
            option.question_id = current.question.id;
        }

        let quiz = self.quizzes.replace_quiz_question(quiz.id, &rows).await?;
        info!(quiz_id = %quiz.id, question_id = %question_id, "Quiz question updated");
        self.with_questions(quiz).await
    }

    /// Remove a question. The last question of a published quiz stays;
    /// unpublish the quiz first.
    pub async fn delete_question(&self, ctx: &RequestContext, quiz_id: Uuid, question_id: Uuid) -> AppResult<Quiz> {
        let quiz = self.get(ctx, quiz_id).await?;
        if quiz.is_published {
            let remaining = self
                .quizzes
                .quiz_questions(quiz.id)
                .await?
                .iter()
                .filter(|q| q.question.id != question_id)
                .count();
            ensure_publishable(true, remaining)?;
        }
        let quiz = self
            .quizzes
            .delete_quiz_question(quiz.id, question_id)
            .await?
            .ok_or_else(|| AppError::not_found("Question not found"))?;
        info!(quiz_id = %quiz.id, question_id = %question_id, "Quiz question deleted");
        Ok(quiz)
    }

    /// Rewrite question positions to match `req.ids`.
    pub async fn reorder(&self, ctx: &RequestContext, quiz_id: Uuid, req: ReorderRequest) -> AppResult<QuizWithQuestions> {
        validate(&req)?;
        let quiz = self.get(ctx, quiz_id).await?;
        self.quizzes.reorder_quiz_questions(quiz.id, &req.ids).await?;
        self.with_questions(quiz).await
    }

    async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Quiz> {
        self.quizzes
            .find_quiz(ctx.org(), id)
            .await?
            .ok_or_else(|| AppError::not_found("Quiz not found"))
    }

    async fn with_questions(&self, quiz: Quiz) -> AppResult<QuizWithQuestions> {
        let questions = self.quizzes.quiz_questions(quiz.id).await?;
        Ok(QuizWithQuestions { quiz, questions })
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

    fn is_author(&self, ctx: &RequestContext) -> bool {
        self.rbac.has_permission(ctx.role(), Permission::QuizzesManage)
    }
}

/// A published quiz needs at least one question.
fn ensure_publishable(published: bool, questions: usize) -> AppResult<()> {
    if published && questions == 0 {
        return Err(AppError::business_rule("A quiz needs at least one question to be published"));
    }
    Ok(())
}

fn checked_question(input: QuizQuestionInput) -> AppResult<NewQuizQuestion> {
    let mut fields = FieldErrors::new();
    let question = parse_question(input, "", &mut fields);
    fields.into_result()?;
    question.ok_or_else(|| AppError::validation("The given data was invalid"))
}

fn shuffle(questions: &mut [QuizQuestionWithOptions]) {
    let mut rng = rand::rng();
    questions.shuffle(&mut rng);
    for question in questions.iter_mut() {
        question.options.shuffle(&mut rng);
    }
}
