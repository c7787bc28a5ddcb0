//! Quizzes, their questions and options, and learner attempts.

pub mod attempt;
pub mod model;
pub mod question;

pub use attempt::{AttemptAnswers, AttemptStatus, QuizAttempt, grade};
pub use model::{CreateQuiz, Quiz, QuizWithQuestions};
pub use question::{
    NewQuizOption, NewQuizQuestion, QuizOption, QuizQuestion, QuizQuestionKind,
    QuizQuestionWithOptions,
};
