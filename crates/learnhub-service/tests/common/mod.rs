#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use learnhub_auth::Principal;
use learnhub_core::traits::{Clock, FixedClock};
use learnhub_database::memory::MemoryStore;
use learnhub_database::store::Stores;
use learnhub_entity::course::Course;
use learnhub_entity::user::Role;
use learnhub_service::course::CreateCourseRequest;
use learnhub_service::{RequestContext, Services, UploadLimits};
use learnhub_storage::MemoryStorageProvider;

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub storage: Arc<MemoryStorageProvider>,
    pub clock: Arc<FixedClock>,
    pub services: Services,
    pub organization_id: Uuid,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let storage = Arc::new(MemoryStorageProvider::new());
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap()));
        let services = Services::new(
            &Stores::memory(store.clone()),
            storage.clone(),
            clock.clone(),
            UploadLimits::default(),
        );
        Self {
            store,
            storage,
            clock,
            services,
            organization_id: Uuid::new_v4(),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub async fn as_role(&self, role: Role) -> RequestContext {
        self.in_org(self.organization_id, role).await
    }

    pub async fn in_org(&self, organization_id: Uuid, role: Role) -> RequestContext {
        self.services
            .context(Principal::new(Uuid::new_v4(), role, Some(organization_id)))
            .await
            .unwrap()
    }

    pub async fn owner(&self) -> RequestContext {
        self.as_role(Role::Organization).await
    }

    pub async fn course(&self, ctx: &RequestContext, title: &str) -> Course {
        let (course, _) = self
            .services
            .courses
            .create(
                ctx,
                CreateCourseRequest {
                    title: title.into(),
                    description: None,
                },
            )
            .await
            .unwrap();
        course
    }
}
