//! Quizzes, their questions, and learner attempts.

pub mod attempt;
pub mod payload;
pub mod service;

pub use attempt::{AttemptService, SubmitAttemptRequest};
pub use payload::{QuizOptionInput, QuizPayload, QuizQuestionInput};
pub use service::QuizService;
