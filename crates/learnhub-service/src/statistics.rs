//! Organization dashboard counters.

use std::sync::Arc;

use learnhub_core::result::AppResult;
use learnhub_database::store::StatisticsStore;
use learnhub_entity::statistics::OrganizationOverview;

use crate::context::RequestContext;

/// Reads aggregates for the acting organization.
#[derive(Debug, Clone)]
pub struct StatisticsService {
    statistics: Arc<dyn StatisticsStore>,
}

impl StatisticsService {
    /// Creates a new statistics service.
    pub fn new(statistics: Arc<dyn StatisticsStore>) -> Self {
        Self { statistics }
    }

    /// Counters of the tenant.
    pub async fn overview(&self, ctx: &RequestContext) -> AppResult<OrganizationOverview> {
        self.statistics.overview(ctx.org()).await
    }
}
