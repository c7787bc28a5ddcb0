//! Response envelope and query DTOs.

pub mod query;
pub mod response;

pub use query::{AttemptQuery, DocumentQuery, ExportQuery, FolderQuery, ListQuery, QuestionnaireQuery, QuizQuery};
pub use response::{ApiResponse, Created, created, ok, ok_message};
