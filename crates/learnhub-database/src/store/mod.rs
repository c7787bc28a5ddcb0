//! Store traits and the backend bundle handed to the service layer.

pub mod filter;
pub mod traits;

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use learnhub_core::config::{DatabaseBackend, DatabaseConfig};
use learnhub_core::error::AppError;
use learnhub_core::result::AppResult;

use crate::connection::DatabasePool;
use crate::migration;
use crate::repositories::{
    AutomationRuleRepository, CourseRepository, DocumentRepository, FolderRepository,
    InstructorRepository, PartnerRepository, QuestionnaireRepository, QuizRepository,
    StatisticsRepository,
};

pub use filter::{
    AttemptFilter, DocumentFilter, FolderFilter, PartnerFilter, QuestionnaireFilter, QuizFilter,
};
pub use traits::{
    AutomationRuleStore, CourseStore, DeleteOutcome, DocumentStore, FolderStore, InstructorStore,
    PartnerStore, QuestionnaireStore, QuizStore, StatisticsStore,
};

/// Field error code for a reorder list naming a foreign id.
pub const NOT_A_CHILD: &str = "not_a_child";

/// Validation error for a reorder list containing `id`.
pub fn reorder_rejected(id: Uuid) -> AppError {
    AppError::field("ids", NOT_A_CHILD, format!("{id} is not part of this list"))
}

/// Field error for a SIRET already used in the organization.
pub fn duplicate_siret() -> AppError {
    AppError::field("siret", "unique", "The siret has already been taken")
}

/// Business-rule error for a document already in a folder.
pub fn duplicate_membership() -> AppError {
    AppError::business_rule("The document is already in this folder")
}

/// Every store the services need, behind trait objects.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Courses and sessions.
    pub courses: Arc<dyn CourseStore>,
    /// Instructor profiles.
    pub instructors: Arc<dyn InstructorStore>,
    /// Automation rules.
    pub rules: Arc<dyn AutomationRuleStore>,
    /// Document library.
    pub documents: Arc<dyn DocumentStore>,
    /// Document folders.
    pub folders: Arc<dyn FolderStore>,
    /// Questionnaires.
    pub questionnaires: Arc<dyn QuestionnaireStore>,
    /// Quizzes and attempts.
    pub quizzes: Arc<dyn QuizStore>,
    /// Companies and funders.
    pub partners: Arc<dyn PartnerStore>,
    /// Aggregates.
    pub statistics: Arc<dyn StatisticsStore>,
    pool: Option<DatabasePool>,
}

impl Stores {
    /// Repositories over a PostgreSQL pool.
    pub fn postgres(pool: DatabasePool) -> Self {
        let pg = pool.pool().clone();
        Self {
            courses: Arc::new(CourseRepository::new(pg.clone())),
            instructors: Arc::new(InstructorRepository::new(pg.clone())),
            rules: Arc::new(AutomationRuleRepository::new(pg.clone())),
            documents: Arc::new(DocumentRepository::new(pg.clone())),
            folders: Arc::new(FolderRepository::new(pg.clone())),
            questionnaires: Arc::new(QuestionnaireRepository::new(pg.clone())),
            quizzes: Arc::new(QuizRepository::new(pg.clone())),
            partners: Arc::new(PartnerRepository::new(pg.clone())),
            statistics: Arc::new(StatisticsRepository::new(pg)),
            pool: Some(pool),
        }
    }

    /// Every store backed by one shared in-memory state.
    #[cfg(feature = "memory")]
    pub fn memory(store: Arc<crate::memory::MemoryStore>) -> Self {
        Self {
            courses: store.clone(),
            instructors: store.clone(),
            rules: store.clone(),
            documents: store.clone(),
            folders: store.clone(),
            questionnaires: store.clone(),
            quizzes: store.clone(),
            partners: store.clone(),
            statistics: store,
            pool: None,
        }
    }

    /// The PostgreSQL pool, when this bundle is database backed.
    pub fn pool(&self) -> Option<&DatabasePool> {
        self.pool.as_ref()
    }

    /// Probe the backend.
    pub async fn health_check(&self) -> AppResult<()> {
        match &self.pool {
            Some(pool) => pool.health_check().await,
            None => Ok(()),
        }
    }
}

/// Build the store bundle selected by `config.backend`.
pub async fn connect(config: &DatabaseConfig) -> AppResult<Stores> {
    match config.backend {
        DatabaseBackend::Postgres => {
            info!("Using the PostgreSQL store backend");
            let pool = DatabasePool::connect(config).await?;
            if config.run_migrations {
                migration::run_migrations(pool.pool()).await?;
            }
            Ok(Stores::postgres(pool))
        }
        #[cfg(feature = "memory")]
        DatabaseBackend::Memory => {
            info!("Using the in-memory store backend");
            Ok(Stores::memory(Arc::new(crate::memory::MemoryStore::new())))
        }
        #[cfg(not(feature = "memory"))]
        DatabaseBackend::Memory => Err(AppError::configuration(
            "The memory backend requires the `memory` feature of learnhub-database",
        )),
    }
}
