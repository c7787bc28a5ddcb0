//! Wiring of every service over one store bundle.

use std::sync::Arc;

use learnhub_auth::{Permission, Principal, RbacEnforcer, TenantResolver};
use learnhub_core::result::AppResult;
use learnhub_core::traits::{Clock, StorageProvider};
use learnhub_database::store::Stores;

use crate::automation::AutomationService;
use crate::context::RequestContext;
use crate::course::CourseService;
use crate::document::{DocumentService, FolderService};
use crate::export::ExportService;
use crate::partner::PartnerService;
use crate::questionnaire::QuestionnaireService;
use crate::quiz::{AttemptService, QuizService};
use crate::statistics::StatisticsService;
use crate::upload::UploadLimits;

/// All business services, sharing stores, storage and clock.
#[derive(Debug, Clone)]
pub struct Services {
    /// Courses and sessions.
    pub courses: CourseService,
    /// Automation rules.
    pub automation: AutomationService,
    /// Document library.
    pub documents: DocumentService,
    /// Document folders.
    pub folders: FolderService,
    /// Questionnaires.
    pub questionnaires: QuestionnaireService,
    /// Quiz authoring.
    pub quizzes: QuizService,
    /// Quiz attempts.
    pub attempts: AttemptService,
    /// Companies and funders.
    pub partners: PartnerService,
    /// CSV downloads.
    pub exports: ExportService,
    /// Dashboard counters.
    pub statistics: StatisticsService,
    tenants: TenantResolver,
    rbac: Arc<RbacEnforcer>,
    clock: Arc<dyn Clock>,
}

impl Services {
    /// Build every service.
    pub fn new(
        stores: &Stores,
        storage: Arc<dyn StorageProvider>,
        clock: Arc<dyn Clock>,
        limits: UploadLimits,
    ) -> Self {
        let rbac = Arc::new(RbacEnforcer::new());
        let attempts = AttemptService::new(stores.quizzes.clone(), rbac.clone(), clock.clone());

        Self {
            courses: CourseService::new(stores.courses.clone(), clock.clone()),
            automation: AutomationService::new(
                stores.rules.clone(),
                stores.courses.clone(),
                stores.documents.clone(),
                stores.questionnaires.clone(),
                storage.clone(),
                clock.clone(),
                limits,
            ),
            documents: DocumentService::new(
                stores.documents.clone(),
                stores.folders.clone(),
                stores.courses.clone(),
                storage,
                clock.clone(),
                limits,
            ),
            folders: FolderService::new(
                stores.folders.clone(),
                stores.documents.clone(),
                stores.courses.clone(),
                clock.clone(),
            ),
            questionnaires: QuestionnaireService::new(
                stores.questionnaires.clone(),
                stores.courses.clone(),
                clock.clone(),
            ),
            quizzes: QuizService::new(stores.quizzes.clone(), stores.courses.clone(), rbac.clone(), clock.clone()),
            exports: ExportService::new(stores.partners.clone(), attempts.clone(), clock.clone()),
            attempts,
            partners: PartnerService::new(stores.partners.clone(), clock.clone()),
            statistics: StatisticsService::new(stores.statistics.clone()),
            tenants: TenantResolver::new(stores.instructors.clone()),
            rbac,
            clock,
        }
    }

    /// Resolve the principal's organization and open a request context.
    /// A principal without an organization gets tenant-not-found.
    pub async fn context(&self, principal: Principal) -> AppResult<RequestContext> {
        let scope = self.tenants.resolve(&principal).await?;
        RequestContext::new(principal, scope, self.clock.now())
    }

    /// Fail with an authorization error unless `ctx` holds `permission`.
    pub fn authorize(&self, ctx: &RequestContext, permission: Permission) -> AppResult<()> {
        self.rbac.require_permission(ctx.role(), permission)
    }

    /// The permission enforcer shared by the services.
    pub fn rbac(&self) -> &RbacEnforcer {
        &self.rbac
    }
}
