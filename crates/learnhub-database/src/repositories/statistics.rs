//! Aggregate queries.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use learnhub_core::result::AppResult;
use learnhub_entity::statistics::OrganizationOverview;

use super::db_error;
use crate::store::StatisticsStore;

/// Repository for read-only statistics.
#[derive(Debug, Clone)]
pub struct StatisticsRepository {
    pool: PgPool,
}

impl StatisticsRepository {
    /// Create a new statistics repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct OverviewRow {
    courses: i64,
    sessions: i64,
    active_learners: i64,
    companies: i64,
    funders: i64,
    published_quizzes: i64,
    graded_attempts: i64,
    average_score_percent: Option<f64>,
}

#[async_trait]
impl StatisticsStore for StatisticsRepository {
    async fn overview(&self, organization_id: Uuid) -> AppResult<OrganizationOverview> {
        let row = sqlx::query_as::<_, OverviewRow>(
            "SELECT \
                (SELECT COUNT(*) FROM courses WHERE organization_id = $1) AS courses, \
                (SELECT COUNT(*) FROM sessions WHERE organization_id = $1) AS sessions, \
                (SELECT COUNT(*) FROM learners WHERE organization_id = $1 AND status = 1) AS active_learners, \
                (SELECT COUNT(*) FROM companies WHERE organization_id = $1) AS companies, \
                (SELECT COUNT(*) FROM funders WHERE organization_id = $1) AS funders, \
                (SELECT COUNT(*) FROM quizzes WHERE organization_id = $1 AND is_published) AS published_quizzes, \
                (SELECT COUNT(*) FROM quiz_attempts a JOIN quizzes q ON q.id = a.quiz_id \
                    WHERE q.organization_id = $1 AND a.status = 'graded') AS graded_attempts, \
                (SELECT ROUND(AVG(CASE WHEN a.max_score > 0 \
                            THEN a.score::numeric * 100 / a.max_score ELSE 0 END), 2)::float8 \
                    FROM quiz_attempts a JOIN quizzes q ON q.id = a.quiz_id \
                    WHERE q.organization_id = $1 AND a.status = 'graded') AS average_score_percent",
        )
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to compute statistics"))?;

        Ok(OrganizationOverview {
            courses: row.courses,
            sessions: row.sessions,
            active_learners: row.active_learners,
            companies: row.companies,
            funders: row.funders,
            published_quizzes: row.published_quizzes,
            graded_attempts: row.graded_attempts,
            average_score_percent: row.average_score_percent,
        })
    }
}
