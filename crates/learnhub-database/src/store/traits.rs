//! Persistence ports consumed by the service layer.
//!
//! Every method taking an `organization_id` only sees rows of that tenant.
//! Multi-row writes are atomic: either every row lands or none does.

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use learnhub_core::result::AppResult;
use learnhub_core::types::{PageRequest, PageResponse, SortField};
use learnhub_entity::automation::{
    AutomationRule, AutomationRuleFile, CreateAutomationRule, CreateRuleFile, RuleOwner,
};
use learnhub_entity::course::{Course, CreateCourse, CreateSession, Session};
use learnhub_entity::document::{
    CourseDocument, CreateCourseDocument, CreateDocumentFolder, DocumentFolder, DocumentFolderItem,
    FolderItemView,
};
use learnhub_entity::partner::{Company, CompanyData, Funder, FunderData, PartnerRef};
use learnhub_entity::questionnaire::{
    CreateQuestionnaire, NewQuestionnaireQuestion, Questionnaire, QuestionnaireQuestion,
};
use learnhub_entity::quiz::{Quiz, QuizAttempt, QuizQuestionWithOptions};
use learnhub_entity::statistics::OrganizationOverview;
use learnhub_entity::user::InstructorProfile;

use super::filter::{
    AttemptFilter, DocumentFilter, FolderFilter, PartnerFilter, QuestionnaireFilter, QuizFilter,
};

/// Result of a guarded partner deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The row was removed.
    Deleted,
    /// No such row in the tenant.
    NotFound,
    /// Kept because this many active learners still reference it.
    HasActiveLearners(i64),
}

/// Courses and sessions.
#[async_trait]
pub trait CourseStore: Send + Sync + Debug {
    /// Paginated courses of a tenant.
    async fn list_courses(
        &self,
        organization_id: Uuid,
        search: Option<&str>,
        sort: SortField,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Course>>;

    /// One course of a tenant.
    async fn find_course(&self, organization_id: Uuid, id: Uuid) -> AppResult<Option<Course>>;

    /// Insert a course and its system folder together.
    async fn create_course(&self, data: &CreateCourse) -> AppResult<(Course, DocumentFolder)>;

    /// Persist title and description changes.
    async fn save_course(&self, course: &Course) -> AppResult<Course>;

    /// Sessions of a course, by start date.
    async fn list_sessions(&self, organization_id: Uuid, course_id: Uuid) -> AppResult<Vec<Session>>;

    /// One session of a tenant.
    async fn find_session(&self, organization_id: Uuid, id: Uuid) -> AppResult<Option<Session>>;

    /// Insert a session.
    async fn create_session(&self, data: &CreateSession) -> AppResult<Session>;
}

/// Instructor profiles, read by the tenant resolver.
#[async_trait]
pub trait InstructorStore: Send + Sync + Debug {
    /// Profile attached to a user account.
    async fn find_instructor_by_user(&self, user_id: Uuid) -> AppResult<Option<InstructorProfile>>;
}

/// Automation rules and their attachments.
#[async_trait]
pub trait AutomationRuleStore: Send + Sync + Debug {
    /// Rules of one course or session, newest first.
    async fn list_rules(&self, organization_id: Uuid, owner: RuleOwner) -> AppResult<Vec<AutomationRule>>;

    /// One rule of one course or session.
    async fn find_rule(
        &self,
        organization_id: Uuid,
        owner: RuleOwner,
        id: Uuid,
    ) -> AppResult<Option<AutomationRule>>;

    /// Attached files, oldest first.
    async fn rule_files(&self, rule_id: Uuid) -> AppResult<Vec<AutomationRuleFile>>;

    /// Linked questionnaire ids.
    async fn rule_questionnaire_ids(&self, rule_id: Uuid) -> AppResult<Vec<Uuid>>;

    /// Insert a rule with its files and questionnaire links.
    async fn create_rule(
        &self,
        data: &CreateAutomationRule,
        files: &[CreateRuleFile],
        questionnaire_ids: &[Uuid],
    ) -> AppResult<AutomationRule>;

    /// Persist rule columns, append `new_files`, and replace questionnaire
    /// links when `questionnaire_ids` is `Some`.
    async fn update_rule(
        &self,
        rule: &AutomationRule,
        new_files: &[CreateRuleFile],
        questionnaire_ids: Option<&[Uuid]>,
    ) -> AppResult<AutomationRule>;

    /// Delete a rule; returns the file rows removed with it.
    async fn delete_rule(&self, organization_id: Uuid, id: Uuid) -> AppResult<Vec<AutomationRuleFile>>;
}

/// Document library.
#[async_trait]
pub trait DocumentStore: Send + Sync + Debug {
    /// Filtered, sorted, paginated documents.
    async fn list_documents(
        &self,
        organization_id: Uuid,
        filter: &DocumentFilter,
        sort: SortField,
        page: &PageRequest,
    ) -> AppResult<PageResponse<CourseDocument>>;

    /// One document of a tenant.
    async fn find_document(&self, organization_id: Uuid, id: Uuid) -> AppResult<Option<CourseDocument>>;

    /// Every document of the tenant among `ids`; unknown ids are absent.
    async fn find_documents(&self, organization_id: Uuid, ids: &[Uuid]) -> AppResult<Vec<CourseDocument>>;

    /// Insert a document row.
    async fn create_document(&self, data: &CreateCourseDocument) -> AppResult<CourseDocument>;

    /// Persist metadata changes.
    async fn save_document(&self, document: &CourseDocument) -> AppResult<CourseDocument>;

    /// Delete a document and its folder memberships.
    async fn delete_document(&self, organization_id: Uuid, id: Uuid) -> AppResult<bool>;
}

/// Document folders and membership.
#[async_trait]
pub trait FolderStore: Send + Sync + Debug {
    /// Folders of a tenant, system folders first, then by name.
    async fn list_folders(
        &self,
        organization_id: Uuid,
        filter: &FolderFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<DocumentFolder>>;

    /// One folder of a tenant.
    async fn find_folder(&self, organization_id: Uuid, id: Uuid) -> AppResult<Option<DocumentFolder>>;

    /// Items of a folder joined with their documents, by `order_index`.
    async fn folder_items(&self, folder_id: Uuid) -> AppResult<Vec<FolderItemView>>;

    /// Insert a folder.
    async fn create_folder(&self, data: &CreateDocumentFolder) -> AppResult<DocumentFolder>;

    /// Return the course's system folder, creating it when missing.
    async fn ensure_system_folder(&self, course: &Course, now: DateTime<Utc>) -> AppResult<DocumentFolder>;

    /// Persist name, icon and color changes.
    async fn save_folder(&self, folder: &DocumentFolder) -> AppResult<DocumentFolder>;

    /// Delete a folder and its memberships.
    async fn delete_folder(&self, organization_id: Uuid, id: Uuid) -> AppResult<bool>;

    /// Append a document at the end of a folder. A second membership of the
    /// same document is a business-rule error.
    async fn add_folder_item(
        &self,
        folder_id: Uuid,
        document_id: Uuid,
        added_at: DateTime<Utc>,
    ) -> AppResult<DocumentFolderItem>;

    /// Remove a membership; the document is untouched.
    async fn remove_folder_item(&self, folder_id: Uuid, document_id: Uuid) -> AppResult<bool>;

    /// Assign `order_index` 0..N-1 to `document_ids`; rejects ids that are
    /// not items of the folder.
    async fn reorder_folder_items(&self, folder_id: Uuid, document_ids: &[Uuid]) -> AppResult<()>;
}

/// Questionnaires and their questions.
#[async_trait]
pub trait QuestionnaireStore: Send + Sync + Debug {
    /// Filtered, sorted, paginated questionnaires.
    async fn list_questionnaires(
        &self,
        organization_id: Uuid,
        filter: &QuestionnaireFilter,
        sort: SortField,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Questionnaire>>;

    /// One questionnaire of a tenant.
    async fn find_questionnaire(&self, organization_id: Uuid, id: Uuid) -> AppResult<Option<Questionnaire>>;

    /// Every questionnaire of the tenant among `ids`.
    async fn find_questionnaires(&self, organization_id: Uuid, ids: &[Uuid]) -> AppResult<Vec<Questionnaire>>;

    /// Questions by `order_index`.
    async fn questionnaire_questions(&self, questionnaire_id: Uuid) -> AppResult<Vec<QuestionnaireQuestion>>;

    /// Insert a questionnaire with its questions in list order.
    async fn create_questionnaire(
        &self,
        data: &CreateQuestionnaire,
        questions: Vec<NewQuestionnaireQuestion>,
    ) -> AppResult<Questionnaire>;

    /// Persist columns; replace every question when `questions` is `Some`.
    async fn update_questionnaire(
        &self,
        questionnaire: &Questionnaire,
        questions: Option<Vec<NewQuestionnaireQuestion>>,
    ) -> AppResult<Questionnaire>;

    /// Delete a questionnaire and its questions.
    async fn delete_questionnaire(&self, organization_id: Uuid, id: Uuid) -> AppResult<bool>;

    /// Assign `order_index` 0..N-1 to `question_ids`.
    async fn reorder_questionnaire_questions(&self, questionnaire_id: Uuid, question_ids: &[Uuid]) -> AppResult<()>;
}

/// Quizzes, questions, options and attempts.
///
/// Every write touching questions recomputes the quiz's `progress` in the
/// same transaction and returns the refreshed quiz.
#[async_trait]
pub trait QuizStore: Send + Sync + Debug {
    /// Filtered, sorted, paginated quizzes.
    async fn list_quizzes(
        &self,
        organization_id: Uuid,
        filter: &QuizFilter,
        sort: SortField,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Quiz>>;

    /// One quiz of a tenant.
    async fn find_quiz(&self, organization_id: Uuid, id: Uuid) -> AppResult<Option<Quiz>>;

    /// Questions with options, in stored order.
    async fn quiz_questions(&self, quiz_id: Uuid) -> AppResult<Vec<QuizQuestionWithOptions>>;

    /// Insert a quiz row with prebuilt question and option rows.
    async fn create_quiz(&self, quiz: &Quiz, questions: &[QuizQuestionWithOptions]) -> AppResult<Quiz>;

    /// Persist quiz columns.
    async fn save_quiz(&self, quiz: &Quiz) -> AppResult<Quiz>;

    /// Delete a quiz with questions, options and attempts.
    async fn delete_quiz(&self, organization_id: Uuid, id: Uuid) -> AppResult<bool>;

    /// Append a question with its options.
    async fn add_quiz_question(&self, quiz_id: Uuid, question: &QuizQuestionWithOptions) -> AppResult<Quiz>;

    /// Overwrite a question and replace its options.
    async fn replace_quiz_question(&self, quiz_id: Uuid, question: &QuizQuestionWithOptions) -> AppResult<Quiz>;

    /// Delete a question; `None` when it is not part of the quiz.
    async fn delete_quiz_question(&self, quiz_id: Uuid, question_id: Uuid) -> AppResult<Option<Quiz>>;

    /// Assign `order_index` 0..N-1 to `question_ids`.
    async fn reorder_quiz_questions(&self, quiz_id: Uuid, question_ids: &[Uuid]) -> AppResult<()>;

    /// Start an attempt while holding the quiz row lock. Fails with
    /// forbidden when the quiz disallows remakes and the user already has a
    /// non-abandoned attempt.
    async fn start_attempt(&self, quiz_id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> AppResult<QuizAttempt>;

    /// One attempt on a quiz of the tenant.
    async fn find_attempt(&self, organization_id: Uuid, id: Uuid) -> AppResult<Option<QuizAttempt>>;

    /// Attempts of a quiz, newest first.
    async fn list_attempts(
        &self,
        quiz_id: Uuid,
        filter: &AttemptFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<QuizAttempt>>;

    /// Every attempt of a quiz matching `filter`, newest first.
    async fn all_attempts(&self, quiz_id: Uuid, filter: &AttemptFilter) -> AppResult<Vec<QuizAttempt>>;

    /// Persist status, answers and scores.
    async fn save_attempt(&self, attempt: &QuizAttempt) -> AppResult<QuizAttempt>;
}

/// Companies and funders.
#[async_trait]
pub trait PartnerStore: Send + Sync + Debug {
    /// Filtered, sorted, paginated companies.
    async fn list_companies(
        &self,
        organization_id: Uuid,
        filter: &PartnerFilter,
        sort: SortField,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Company>>;

    /// Every company matching `filter`, for exports.
    async fn all_companies(&self, organization_id: Uuid, filter: &PartnerFilter, sort: SortField) -> AppResult<Vec<Company>>;

    /// One company.
    async fn find_company(&self, organization_id: Uuid, id: Uuid) -> AppResult<Option<Company>>;

    /// Insert a company; a duplicate SIRET is a field error on `siret`.
    async fn create_company(&self, organization_id: Uuid, data: &CompanyData, now: DateTime<Utc>) -> AppResult<Company>;

    /// Overwrite a company; a duplicate SIRET is a field error on `siret`.
    async fn update_company(
        &self,
        organization_id: Uuid,
        id: Uuid,
        data: &CompanyData,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Company>>;

    /// Filtered, sorted, paginated funders.
    async fn list_funders(
        &self,
        organization_id: Uuid,
        filter: &PartnerFilter,
        sort: SortField,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Funder>>;

    /// Every funder matching `filter`, for exports.
    async fn all_funders(&self, organization_id: Uuid, filter: &PartnerFilter, sort: SortField) -> AppResult<Vec<Funder>>;

    /// One funder.
    async fn find_funder(&self, organization_id: Uuid, id: Uuid) -> AppResult<Option<Funder>>;

    /// Insert a funder; a duplicate SIRET is a field error on `siret`.
    async fn create_funder(&self, organization_id: Uuid, data: &FunderData, now: DateTime<Utc>) -> AppResult<Funder>;

    /// Overwrite a funder; a duplicate SIRET is a field error on `siret`.
    async fn update_funder(
        &self,
        organization_id: Uuid,
        id: Uuid,
        data: &FunderData,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Funder>>;

    /// Delete a company or funder unless an active learner references it.
    async fn delete_partner(&self, organization_id: Uuid, partner: PartnerRef) -> AppResult<DeleteOutcome>;
}

/// Read-only aggregates.
#[async_trait]
pub trait StatisticsStore: Send + Sync + Debug {
    /// Counters for one organization.
    async fn overview(&self, organization_id: Uuid) -> AppResult<OrganizationOverview>;
}
