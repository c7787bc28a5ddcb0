//! Courses and sessions: the tenant-scoped parents of rules, documents and quizzes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use learnhub_core::error::AppError;
use learnhub_core::result::AppResult;
use learnhub_core::traits::Clock;
use learnhub_core::types::{PageRequest, PageResponse, SortField};
use learnhub_database::store::CourseStore;
use learnhub_entity::course::{Course, CreateCourse, CreateSession, Session};
use learnhub_entity::document::DocumentFolder;

use crate::context::RequestContext;
use crate::validation::{non_blank, validate};

/// Payload creating a course.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCourseRequest {
    /// Title.
    #[validate(length(min = 1, max = 255, message = "The title field must be between 1 and 255 characters"))]
    pub title: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Payload updating a course; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCourseRequest {
    /// Title.
    #[validate(length(min = 1, max = 255, message = "The title field must be between 1 and 255 characters"))]
    pub title: Option<String>,
    /// Description.
    pub description: Option<String>,
}

/// Payload creating a session.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSessionRequest {
    /// Title.
    #[validate(length(min = 1, max = 255, message = "The title field must be between 1 and 255 characters"))]
    pub title: String,
    /// Start instant.
    pub starts_at: DateTime<Utc>,
    /// End instant, not before `starts_at`.
    pub ends_at: DateTime<Utc>,
}

/// Manages courses and their sessions.
#[derive(Debug, Clone)]
pub struct CourseService {
    courses: Arc<dyn CourseStore>,
    clock: Arc<dyn Clock>,
}

impl CourseService {
    /// Creates a new course service.
    pub fn new(courses: Arc<dyn CourseStore>, clock: Arc<dyn Clock>) -> Self {
        Self { courses, clock }
    }

    /// Paginated courses of the tenant.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        search: Option<&str>,
        sort: SortField,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Course>> {
        self.courses.list_courses(ctx.org(), search, sort, page).await
    }

    /// One course of the tenant.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Course> {
        self.courses
            .find_course(ctx.org(), id)
            .await?
            .ok_or_else(|| AppError::not_found("Course not found"))
    }

    /// Create a course together with its system document folder.
    pub async fn create(&self, ctx: &RequestContext, req: CreateCourseRequest) -> AppResult<(Course, DocumentFolder)> {
        validate(&req)?;
        let (course, folder) = self
            .courses
            .create_course(&CreateCourse {
                organization_id: ctx.org(),
                title: req.title.trim().to_string(),
                description: non_blank(req.description),
                created_by: ctx.user_id(),
                created_at: self.clock.now(),
            })
            .await?;

        info!(
            organization_id = %ctx.organization_id,
            course_id = %course.id,
            folder_id = %folder.id,
            "Course created"
        );
        Ok((course, folder))
    }

    /// Update title and description.
    pub async fn update(&self, ctx: &RequestContext, id: Uuid, req: UpdateCourseRequest) -> AppResult<Course> {
        validate(&req)?;
        let mut course = self.get(ctx, id).await?;
        if let Some(title) = req.title {
            course.title = title.trim().to_string();
        }
        if req.description.is_some() {
            course.description = non_blank(req.description);
        }
        course.updated_at = self.clock.now();
        let course = self.courses.save_course(&course).await?;
        info!(course_id = %course.id, "Course updated");
        Ok(course)
    }

    /// Sessions of a course.
    pub async fn sessions(&self, ctx: &RequestContext, course_id: Uuid) -> AppResult<Vec<Session>> {
        self.get(ctx, course_id).await?;
        self.courses.list_sessions(ctx.org(), course_id).await
    }

    /// One session of the tenant.
    pub async fn get_session(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Session> {
        self.courses
            .find_session(ctx.org(), id)
            .await?
            .ok_or_else(|| AppError::not_found("Session not found"))
    }

    /// Create a session under a course.
    pub async fn create_session(
        &self,
        ctx: &RequestContext,
        course_id: Uuid,
        req: CreateSessionRequest,
    ) -> AppResult<Session> {
        validate(&req)?;
        if req.ends_at < req.starts_at {
            return Err(AppError::field(
                "ends_at",
                "after_or_equal",
                "The ends_at field must be a date after or equal to starts_at",
            ));
        }
        self.get(ctx, course_id).await?;

        let session = self
            .courses
            .create_session(&CreateSession {
                organization_id: ctx.org(),
                course_id,
                title: req.title.trim().to_string(),
                starts_at: req.starts_at,
                ends_at: req.ends_at,
                created_at: self.clock.now(),
            })
            .await?;
        info!(course_id = %course_id, session_id = %session.id, "Session created");
        Ok(session)
    }
}
