//! PostgreSQL implementations of the store traits.

pub mod automation;
pub mod course;
pub mod document;
pub mod folder;
pub mod partner;
pub mod questionnaire;
pub mod quiz;
pub mod statistics;

pub use automation::AutomationRuleRepository;
pub use course::{CourseRepository, InstructorRepository};
pub use document::DocumentRepository;
pub use folder::FolderRepository;
pub use partner::PartnerRepository;
pub use questionnaire::QuestionnaireRepository;
pub use quiz::QuizRepository;
pub use statistics::StatisticsRepository;

use learnhub_core::error::{AppError, ErrorKind};

/// Map a sqlx error to a database `AppError` with `message`.
pub(crate) fn db_error(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, message, e)
}

/// Whether `err` is a violation of the named constraint.
pub(crate) fn violates(err: &sqlx::Error, constraint: &str) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.constraint() == Some(constraint))
}
