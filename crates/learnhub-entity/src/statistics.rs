//! Read-only aggregate views.

use serde::{Deserialize, Serialize};

/// Organization-wide counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationOverview {
    /// Courses.
    pub courses: i64,
    /// Sessions across all courses.
    pub sessions: i64,
    /// Learners with status 1.
    pub active_learners: i64,
    /// Companies.
    pub companies: i64,
    /// Funders.
    pub funders: i64,
    /// Published quizzes.
    pub published_quizzes: i64,
    /// Graded quiz attempts.
    pub graded_attempts: i64,
    /// Mean score percentage over graded attempts, rounded to two decimals.
    pub average_score_percent: Option<f64>,
}
