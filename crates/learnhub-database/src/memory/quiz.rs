use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use learnhub_core::error::AppError;
use learnhub_core::result::AppResult;
use learnhub_core::types::{PageRequest, PageResponse, SortField};
use learnhub_entity::quiz::{AttemptStatus, Quiz, QuizAttempt, QuizQuestionWithOptions};

use super::{MemoryState, MemoryStore, sort_rows};
use crate::store::filter::matches_search;
use crate::store::{AttemptFilter, QuizFilter, QuizStore, reorder_rejected};

fn insert_question(state: &mut MemoryState, question: &QuizQuestionWithOptions) {
    state.quiz_questions.insert(question.question.id, question.question.clone());
    for option in &question.options {
        state.quiz_options.insert(option.id, option.clone());
    }
}

fn remove_options(state: &mut MemoryState, question_id: Uuid) {
    state.quiz_options.retain(|_, o| o.question_id != question_id);
}

fn refresh_progress(state: &mut MemoryState, quiz_id: Uuid) -> AppResult<Quiz> {
    let count = state.quiz_questions.values().filter(|q| q.quiz_id == quiz_id).count();
    let quiz = state
        .quizzes
        .get_mut(&quiz_id)
        .ok_or_else(|| AppError::not_found(format!("Quiz {quiz_id} not found")))?;
    quiz.progress = quiz.calculate_progress(count);
    Ok(quiz.clone())
}

fn matching_attempts(state: &MemoryState, quiz_id: Uuid, filter: &AttemptFilter) -> Vec<QuizAttempt> {
    let mut rows: Vec<QuizAttempt> = state
        .attempts
        .values()
        .filter(|a| a.quiz_id == quiz_id)
        .filter(|a| filter.user_id.is_none_or(|u| a.user_id == u))
        .filter(|a| !filter.graded_only || a.status == AttemptStatus::Graded)
        .cloned()
        .collect();
    rows.sort_by(|a, b| b.started_at.cmp(&a.started_at).then(a.id.cmp(&b.id)));
    rows
}

#[async_trait]
impl QuizStore for MemoryStore {
    async fn list_quizzes(
        &self,
        organization_id: Uuid,
        filter: &QuizFilter,
        sort: SortField,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Quiz>> {
        let state = self.state.read().await;
        let mut rows: Vec<Quiz> = state
            .quizzes
            .values()
            .filter(|q| q.organization_id == organization_id)
            .filter(|q| filter.course_id.is_none_or(|c| q.course_id == Some(c)))
            .filter(|q| filter.category.as_deref().is_none_or(|c| q.category.as_deref() == Some(c)))
            .filter(|q| filter.is_published.is_none_or(|p| q.is_published == p))
            .filter(|q| matches_search(filter.search.as_deref(), &[q.title.as_str()]))
            .cloned()
            .collect();
        sort_rows(&mut rows, sort);
        Ok(page.apply(rows))
    }

    async fn find_quiz(&self, organization_id: Uuid, id: Uuid) -> AppResult<Option<Quiz>> {
        let state = self.state.read().await;
        Ok(state.quizzes.get(&id).filter(|q| q.organization_id == organization_id).cloned())
    }

    async fn quiz_questions(&self, quiz_id: Uuid) -> AppResult<Vec<QuizQuestionWithOptions>> {
        let state = self.state.read().await;
        let mut questions: Vec<QuizQuestionWithOptions> = state
            .quiz_questions
            .values()
            .filter(|q| q.quiz_id == quiz_id)
            .map(|question| {
                let mut options: Vec<_> = state
                    .quiz_options
                    .values()
                    .filter(|o| o.question_id == question.id)
                    .cloned()
                    .collect();
                options.sort_by(|a, b| a.order_index.cmp(&b.order_index).then(a.id.cmp(&b.id)));
                QuizQuestionWithOptions { question: question.clone(), options }
            })
            .collect();
        questions.sort_by(|a, b| {
            a.question
                .order_index
                .cmp(&b.question.order_index)
                .then(a.question.id.cmp(&b.question.id))
        });
        Ok(questions)
    }

    async fn create_quiz(&self, quiz: &Quiz, questions: &[QuizQuestionWithOptions]) -> AppResult<Quiz> {
        let mut state = self.state.write().await;
        state.quizzes.insert(quiz.id, quiz.clone());
        for question in questions {
            insert_question(&mut state, question);
        }
        refresh_progress(&mut state, quiz.id)
    }

    async fn save_quiz(&self, quiz: &Quiz) -> AppResult<Quiz> {
        let mut state = self.state.write().await;
        match state.quizzes.get_mut(&quiz.id) {
            Some(row) if row.organization_id == quiz.organization_id => {
                let progress = row.progress;
                *row = quiz.clone();
                row.progress = progress;
            }
            _ => return Err(AppError::not_found(format!("Quiz {} not found", quiz.id))),
        }
        refresh_progress(&mut state, quiz.id)
    }

    async fn delete_quiz(&self, organization_id: Uuid, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if !state.quizzes.get(&id).is_some_and(|q| q.organization_id == organization_id) {
            return Ok(false);
        }
        state.quizzes.remove(&id);
        let question_ids: Vec<Uuid> = state
            .quiz_questions
            .values()
            .filter(|q| q.quiz_id == id)
            .map(|q| q.id)
            .collect();
        for question_id in question_ids {
            state.quiz_questions.remove(&question_id);
            remove_options(&mut state, question_id);
        }
        state.attempts.retain(|_, a| a.quiz_id != id);
        Ok(true)
    }

    async fn add_quiz_question(&self, quiz_id: Uuid, question: &QuizQuestionWithOptions) -> AppResult<Quiz> {
        let mut state = self.state.write().await;
        if !state.quizzes.contains_key(&quiz_id) {
            return Err(AppError::not_found(format!("Quiz {quiz_id} not found")));
        }
        let next = state
            .quiz_questions
            .values()
            .filter(|q| q.quiz_id == quiz_id)
            .map(|q| q.order_index + 1)
            .max()
            .unwrap_or(0);
        let mut row = question.clone();
        row.question.quiz_id = quiz_id;
        row.question.order_index = next;
        insert_question(&mut state, &row);
        refresh_progress(&mut state, quiz_id)
    }

    async fn replace_quiz_question(&self, quiz_id: Uuid, question: &QuizQuestionWithOptions) -> AppResult<Quiz> {
        let mut state = self.state.write().await;
        let id = question.question.id;
        match state.quiz_questions.get_mut(&id) {
            Some(row) if row.quiz_id == quiz_id => {
                row.text = question.question.text.clone();
                row.kind = question.question.kind;
                row.points = question.question.points;
            }
            _ => return Err(AppError::not_found(format!("Question {id} not found"))),
        }
        remove_options(&mut state, id);
        for option in &question.options {
            state.quiz_options.insert(option.id, option.clone());
        }
        refresh_progress(&mut state, quiz_id)
    }

    async fn delete_quiz_question(&self, quiz_id: Uuid, question_id: Uuid) -> AppResult<Option<Quiz>> {
        let mut state = self.state.write().await;
        if !state.quiz_questions.get(&question_id).is_some_and(|q| q.quiz_id == quiz_id) {
            return Ok(None);
        }
        state.quiz_questions.remove(&question_id);
        remove_options(&mut state, question_id);
        refresh_progress(&mut state, quiz_id).map(Some)
    }

    async fn reorder_quiz_questions(&self, quiz_id: Uuid, question_ids: &[Uuid]) -> AppResult<()> {
        let mut state = self.state.write().await;
        if let Some(foreign) = question_ids
            .iter()
            .find(|id| !state.quiz_questions.get(*id).is_some_and(|q| q.quiz_id == quiz_id))
        {
            return Err(reorder_rejected(*foreign));
        }
        for (index, id) in question_ids.iter().enumerate() {
            if let Some(question) = state.quiz_questions.get_mut(id) {
                question.order_index = index as i32;
            }
        }
        Ok(())
    }

    async fn start_attempt(&self, quiz_id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> AppResult<QuizAttempt> {
        let mut state = self.state.write().await;
        let quiz = state
            .quizzes
            .get(&quiz_id)
            .ok_or_else(|| AppError::not_found(format!("Quiz {quiz_id} not found")))?;

        if !quiz.is_remake {
            let taken = state.attempts.values().any(|a| {
                a.quiz_id == quiz_id && a.user_id == user_id && a.status != AttemptStatus::Abandoned
            });
            if taken {
                return Err(AppError::forbidden("This quiz cannot be taken again"));
            }
        }

        let attempt = QuizAttempt::start(quiz_id, user_id, now);
        state.attempts.insert(attempt.id, attempt.clone());
        Ok(attempt)
    }

    async fn find_attempt(&self, organization_id: Uuid, id: Uuid) -> AppResult<Option<QuizAttempt>> {
        let state = self.state.read().await;
        Ok(state
            .attempts
            .get(&id)
            .filter(|a| {
                state
                    .quizzes
                    .get(&a.quiz_id)
                    .is_some_and(|q| q.organization_id == organization_id)
            })
            .cloned())
    }

    async fn list_attempts(
        &self,
        quiz_id: Uuid,
        filter: &AttemptFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<QuizAttempt>> {
        let state = self.state.read().await;
        Ok(page.apply(matching_attempts(&state, quiz_id, filter)))
    }

    async fn all_attempts(&self, quiz_id: Uuid, filter: &AttemptFilter) -> AppResult<Vec<QuizAttempt>> {
        let state = self.state.read().await;
        Ok(matching_attempts(&state, quiz_id, filter))
    }

    async fn save_attempt(&self, attempt: &QuizAttempt) -> AppResult<QuizAttempt> {
        let mut state = self.state.write().await;
        match state.attempts.get_mut(&attempt.id) {
            Some(row) => {
                *row = attempt.clone();
                Ok(row.clone())
            }
            None => Err(AppError::not_found(format!("Attempt {} not found", attempt.id))),
        }
    }
}
