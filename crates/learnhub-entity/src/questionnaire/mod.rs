//! Questionnaires (feedback forms) and their questions.

pub mod model;

pub use model::{
    CreateQuestionnaire, NewQuestionnaireQuestion, Questionnaire, QuestionnaireQuestion,
    QuestionnaireWithQuestions, QuestionKind,
};
