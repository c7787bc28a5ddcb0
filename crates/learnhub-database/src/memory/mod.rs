//! In-process backend implementing every store trait over one shared state.
//!
//! Each write takes the state's write lock for its whole duration, which
//! makes multi-row writes atomic and serializes attempt starts the same way
//! the row lock does in PostgreSQL. Uniqueness rules mirror the database
//! constraints.

mod automation;
mod course;
mod document;
mod partner;
mod questionnaire;
mod quiz;

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use learnhub_core::types::{SortColumn, SortDirection, SortField};
use learnhub_entity::automation::{AutomationRule, AutomationRuleFile};
use learnhub_entity::course::{Course, Session};
use learnhub_entity::document::{CourseDocument, DocumentFolder, DocumentFolderItem};
use learnhub_entity::partner::{Company, Funder, Learner};
use learnhub_entity::questionnaire::{Questionnaire, QuestionnaireQuestion};
use learnhub_entity::quiz::{Quiz, QuizAttempt, QuizOption, QuizQuestion};
use learnhub_entity::user::InstructorProfile;

/// Every table of the in-memory backend.
#[derive(Debug, Default)]
pub(crate) struct MemoryState {
    pub(crate) instructors: HashMap<Uuid, InstructorProfile>,
    pub(crate) courses: HashMap<Uuid, Course>,
    pub(crate) sessions: HashMap<Uuid, Session>,
    pub(crate) rules: HashMap<Uuid, AutomationRule>,
    pub(crate) rule_files: Vec<AutomationRuleFile>,
    pub(crate) rule_questionnaires: Vec<(Uuid, Uuid, DateTime<Utc>)>,
    pub(crate) documents: HashMap<Uuid, CourseDocument>,
    pub(crate) folders: HashMap<Uuid, DocumentFolder>,
    pub(crate) folder_items: BTreeMap<(Uuid, Uuid), DocumentFolderItem>,
    pub(crate) questionnaires: HashMap<Uuid, Questionnaire>,
    pub(crate) questionnaire_questions: HashMap<Uuid, QuestionnaireQuestion>,
    pub(crate) quizzes: HashMap<Uuid, Quiz>,
    pub(crate) quiz_questions: HashMap<Uuid, QuizQuestion>,
    pub(crate) quiz_options: HashMap<Uuid, QuizOption>,
    pub(crate) attempts: HashMap<Uuid, QuizAttempt>,
    pub(crate) companies: HashMap<Uuid, Company>,
    pub(crate) funders: HashMap<Uuid, Funder>,
    pub(crate) learners: HashMap<Uuid, Learner>,
}

/// Shared in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instructor profile, as the identity service would.
    pub async fn insert_instructor(&self, profile: InstructorProfile) {
        self.state.write().await.instructors.insert(profile.user_id, profile);
    }

    /// Register a learner, as the enrollment service would.
    pub async fn insert_learner(&self, learner: Learner) {
        self.state.write().await.learners.insert(learner.id, learner);
    }

    /// Change a learner's status.
    pub async fn set_learner_status(&self, learner_id: Uuid, status: i16) -> bool {
        match self.state.write().await.learners.get_mut(&learner_id) {
            Some(learner) => {
                learner.status = status;
                true
            }
            None => false,
        }
    }
}

/// Rows the in-memory backend can sort by a [`SortField`].
pub(crate) trait Sortable {
    fn id(&self) -> Uuid;
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;
    fn title(&self) -> &str;
}

/// Sort rows the same way `SortField::order_by` orders SQL results.
pub(crate) fn sort_rows<T: Sortable>(rows: &mut [T], sort: SortField) {
    rows.sort_by(|a, b| {
        let primary = match sort.column {
            SortColumn::CreatedAt => a.created_at().cmp(&b.created_at()),
            SortColumn::UpdatedAt => a.updated_at().cmp(&b.updated_at()),
            SortColumn::Title => a.title().cmp(b.title()),
        };
        let primary = match sort.direction {
            SortDirection::Asc => primary,
            SortDirection::Desc => primary.reverse(),
        };
        match primary {
            Ordering::Equal => a.id().cmp(&b.id()),
            other => other,
        }
    });
}

macro_rules! sortable {
    ($ty:ty, $title:ident) => {
        impl Sortable for $ty {
            fn id(&self) -> Uuid {
                self.id
            }
            fn created_at(&self) -> DateTime<Utc> {
                self.created_at
            }
            fn updated_at(&self) -> DateTime<Utc> {
                self.updated_at
            }
            fn title(&self) -> &str {
                &self.$title
            }
        }
    };
}

sortable!(Course, title);
sortable!(CourseDocument, title);
sortable!(Questionnaire, title);
sortable!(Quiz, title);
sortable!(Company, name);
sortable!(Funder, name);

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn course(title: &str, offset: i64) -> Course {
        let at = Utc::now() + Duration::seconds(offset);
        Course {
            id: Uuid::new_v4(),
            organization_id: Uuid::nil(),
            title: title.into(),
            description: None,
            created_by: Uuid::nil(),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_sort_rows_by_title_and_date() {
        let mut rows = vec![course("b", 0), course("a", 10), course("c", 5)];

        sort_rows(&mut rows, SortField::new(SortColumn::Title, SortDirection::Asc));
        let titles: Vec<_> = rows.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["a", "b", "c"]);

        sort_rows(&mut rows, SortField::default());
        let titles: Vec<_> = rows.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["a", "c", "b"]);
    }
}
