//! Quiz questions and answer options.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

text_enum! {
    /// How many options a learner may pick.
    #[sqlx(type_name = "quiz_question_kind")]
    pub enum QuizQuestionKind {
        /// Exactly one option.
        Single => "single",
        /// Any number of options.
        Multiple => "multiple",
    }
}

/// A question of a quiz.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizQuestion {
    /// Unique identifier.
    pub id: Uuid,
    /// Parent quiz.
    pub quiz_id: Uuid,
    /// Question text.
    pub text: String,
    /// Single or multiple choice.
    pub kind: QuizQuestionKind,
    /// Points awarded for a fully correct answer.
    pub points: i32,
    /// Zero-based position.
    pub order_index: i32,
}

/// An answer option.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizOption {
    /// Unique identifier.
    pub id: Uuid,
    /// Parent question.
    pub question_id: Uuid,
    /// Option text.
    pub text: String,
    /// Whether choosing this option is correct.
    pub is_correct: bool,
    /// Zero-based position.
    pub order_index: i32,
}

/// A question with its options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestionWithOptions {
    /// Question row.
    #[serde(flatten)]
    pub question: QuizQuestion,
    /// Options sorted by `order_index`.
    pub options: Vec<QuizOption>,
}

/// An option to insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuizOption {
    /// Option text.
    pub text: String,
    /// Correctness flag.
    pub is_correct: bool,
}

/// A question to insert together with its options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuizQuestion {
    /// Question text.
    pub text: String,
    /// Single or multiple choice.
    pub kind: QuizQuestionKind,
    /// Points.
    pub points: i32,
    /// Options in display order.
    pub options: Vec<NewQuizOption>,
}

impl NewQuizQuestion {
    /// Materialize the question and option rows for `quiz_id`.
    pub fn into_rows(self, quiz_id: Uuid, order_index: i32) -> QuizQuestionWithOptions {
        let question_id = Uuid::new_v4();
        let options = self
            .options
            .into_iter()
            .enumerate()
            .map(|(i, option)| QuizOption {
                id: Uuid::new_v4(),
                question_id,
                text: option.text,
                is_correct: option.is_correct,
                order_index: i as i32,
            })
            .collect();
        QuizQuestionWithOptions {
            question: QuizQuestion {
                id: question_id,
                quiz_id,
                text: self.text,
                kind: self.kind,
                points: self.points,
                order_index,
            },
            options,
        }
    }
}

impl QuizQuestionWithOptions {
    /// Copy this question and its options under `quiz_id` with fresh ids.
    pub fn duplicate_into(&self, quiz_id: Uuid) -> Self {
        NewQuizQuestion {
            text: self.question.text.clone(),
            kind: self.question.kind,
            points: self.question.points,
            options: self
                .options
                .iter()
                .map(|o| NewQuizOption { text: o.text.clone(), is_correct: o.is_correct })
                .collect(),
        }
        .into_rows(quiz_id, self.question.order_index)
    }
}
