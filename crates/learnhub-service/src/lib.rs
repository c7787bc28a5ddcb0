//! # learnhub-service
//!
//! Business logic for LearnHub. Every service receives its stores, the blob
//! storage port and the clock at construction time, and every operation
//! takes the [`RequestContext`] of the acting, tenant-resolved principal.

pub mod automation;
pub mod context;
pub mod course;
pub mod document;
pub mod export;
pub mod partner;
pub mod questionnaire;
pub mod quiz;
pub mod statistics;
pub mod upload;
pub mod validation;

mod services;

pub use automation::AutomationService;
pub use context::RequestContext;
pub use course::CourseService;
pub use document::{DocumentService, FolderService};
pub use export::{ExportFile, ExportFormat, ExportService};
pub use partner::PartnerService;
pub use questionnaire::QuestionnaireService;
pub use quiz::{AttemptService, QuizService};
pub use services::Services;
pub use statistics::StatisticsService;
pub use upload::{UploadLimits, UploadedFile};
