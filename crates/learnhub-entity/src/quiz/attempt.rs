//! Quiz attempts and grading.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

use super::question::QuizQuestionWithOptions;

text_enum! {
    /// Lifecycle state of an attempt.
    #[sqlx(type_name = "quiz_attempt_status")]
    pub enum AttemptStatus {
        /// Started, answers not yet submitted.
        InProgress => "in_progress",
        /// Answers submitted, awaiting grading.
        Submitted => "submitted",
        /// Scored.
        Graded => "graded",
        /// Given up before submission.
        Abandoned => "abandoned",
    }
}

/// Chosen option ids keyed by question id.
pub type AttemptAnswers = BTreeMap<Uuid, Vec<Uuid>>;

/// One learner's attempt at a quiz.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizAttempt {
    /// Unique identifier.
    pub id: Uuid,
    /// Quiz being attempted.
    pub quiz_id: Uuid,
    /// Learner's user id.
    pub user_id: Uuid,
    /// Lifecycle state.
    pub status: AttemptStatus,
    /// Submitted answers.
    pub answers: Json<AttemptAnswers>,
    /// Points earned, once graded.
    pub score: Option<i32>,
    /// Points available, once graded.
    pub max_score: Option<i32>,
    /// Start instant.
    pub started_at: DateTime<Utc>,
    /// Submission instant.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Grading instant.
    pub graded_at: Option<DateTime<Utc>>,
}

impl QuizAttempt {
    /// A fresh in-progress attempt.
    pub fn start(quiz_id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            quiz_id,
            user_id,
            status: AttemptStatus::InProgress,
            answers: Json(AttemptAnswers::new()),
            score: None,
            max_score: None,
            started_at: now,
            submitted_at: None,
            graded_at: None,
        }
    }

    /// Record the learner's answers and close the attempt for grading.
    pub fn submit(&mut self, answers: AttemptAnswers, now: DateTime<Utc>) {
        self.answers = Json(answers);
        self.status = AttemptStatus::Submitted;
        self.submitted_at = Some(now);
    }

    /// Store a score computed by [`grade`].
    pub fn record_grade(&mut self, score: i32, max_score: i32, now: DateTime<Utc>) {
        self.score = Some(score);
        self.max_score = Some(max_score);
        self.status = AttemptStatus::Graded;
        self.graded_at = Some(now);
    }

    /// Score as a percentage of `max_score`, once graded.
    pub fn percentage(&self) -> Option<f64> {
        match (self.score, self.max_score) {
            (Some(score), Some(max)) if max > 0 => Some(f64::from(score) * 100.0 / f64::from(max)),
            (Some(_), Some(_)) => Some(0.0),
            _ => None,
        }
    }
}

/// Score `answers` against `questions`; returns `(score, max_score)`.
///
/// A question earns its points only when the chosen set equals the set of
/// correct options exactly. Unknown question ids are ignored.
pub fn grade(questions: &[QuizQuestionWithOptions], answers: &AttemptAnswers) -> (i32, i32) {
    questions.iter().fold((0, 0), |(score, max), q| {
        let correct: BTreeSet<Uuid> =
            q.options.iter().filter(|o| o.is_correct).map(|o| o.id).collect();
        let chosen: BTreeSet<Uuid> = answers
            .get(&q.question.id)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default();
        let earned = if !correct.is_empty() && chosen == correct { q.question.points } else { 0 };
        (score + earned, max + q.question.points)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::question::{NewQuizOption, NewQuizQuestion, QuizQuestionKind};

    fn question(points: i32, correct: &[bool]) -> QuizQuestionWithOptions {
        NewQuizQuestion {
            text: "Q".into(),
            kind: QuizQuestionKind::Multiple,
            points,
            options: correct
                .iter()
                .map(|c| NewQuizOption { text: "o".into(), is_correct: *c })
                .collect(),
        }
        .into_rows(Uuid::new_v4(), 0)
    }

    #[test]
    fn test_grade_requires_exact_set() {
        let q1 = question(2, &[true, false, true]);
        let q2 = question(3, &[false, true]);
        let mut answers = AttemptAnswers::new();
        answers.insert(q1.question.id, vec![q1.options[0].id]);
        answers.insert(q2.question.id, vec![q2.options[1].id]);

        assert_eq!(grade(&[q1.clone(), q2.clone()], &answers), (3, 5));

        answers.insert(q1.question.id, vec![q1.options[2].id, q1.options[0].id]);
        assert_eq!(grade(&[q1, q2], &answers), (5, 5));
    }

    #[test]
    fn test_percentage() {
        let mut attempt = QuizAttempt::start(Uuid::new_v4(), Uuid::new_v4(), Utc::now());
        assert_eq!(attempt.percentage(), None);
        attempt.score = Some(3);
        attempt.max_score = Some(4);
        assert_eq!(attempt.percentage(), Some(75.0));
    }
}
