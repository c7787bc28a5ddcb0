//! Course, session and instructor repositories.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use learnhub_core::error::AppError;
use learnhub_core::result::AppResult;
use learnhub_core::types::{PageRequest, PageResponse, SortField};
use learnhub_entity::course::{Course, CreateCourse, CreateSession, Session};
use learnhub_entity::document::{DocumentFolder, SYSTEM_FOLDER_COLOR, SYSTEM_FOLDER_ICON};
use learnhub_entity::user::InstructorProfile;

use super::db_error;
use crate::store::filter::like_pattern;
use crate::store::{CourseStore, InstructorStore};

const COURSE_FILTER: &str = "organization_id = $1 AND ($2::text IS NULL OR title ILIKE $2)";

/// Repository for courses and sessions.
#[derive(Debug, Clone)]
pub struct CourseRepository {
    pool: PgPool,
}

impl CourseRepository {
    /// Create a new course repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CourseStore for CourseRepository {
    async fn list_courses(
        &self,
        organization_id: Uuid,
        search: Option<&str>,
        sort: SortField,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Course>> {
        let pattern = like_pattern(search);

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM courses WHERE {COURSE_FILTER}"))
            .bind(organization_id)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count courses"))?;

        let courses = sqlx::query_as::<_, Course>(&format!(
            "SELECT * FROM courses WHERE {COURSE_FILTER} {} LIMIT $3 OFFSET $4",
            sort.order_by("title")
        ))
        .bind(organization_id)
        .bind(&pattern)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list courses"))?;

        Ok(PageResponse::new(courses, page, total as u64))
    }

    async fn find_course(&self, organization_id: Uuid, id: Uuid) -> AppResult<Option<Course>> {
        sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1 AND organization_id = $2")
            .bind(id)
            .bind(organization_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find course"))
    }

    async fn create_course(&self, data: &CreateCourse) -> AppResult<(Course, DocumentFolder)> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        let course = sqlx::query_as::<_, Course>(
            "INSERT INTO courses (id, organization_id, title, description, created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $6) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.organization_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.created_by)
        .bind(data.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to create course"))?;

        let folder = sqlx::query_as::<_, DocumentFolder>(
            "INSERT INTO document_folders \
                (id, organization_id, course_id, name, icon, color, is_system, created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7, $8, $8) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(course.organization_id)
        .bind(course.id)
        .bind(DocumentFolder::system_name(&course.title))
        .bind(SYSTEM_FOLDER_ICON)
        .bind(SYSTEM_FOLDER_COLOR)
        .bind(course.created_by)
        .bind(course.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to create system folder"))?;

        tx.commit().await.map_err(db_error("Failed to commit course"))?;
        Ok((course, folder))
    }

    async fn save_course(&self, course: &Course) -> AppResult<Course> {
        sqlx::query_as::<_, Course>(
            "UPDATE courses SET title = $3, description = $4, updated_at = $5 \
             WHERE id = $1 AND organization_id = $2 RETURNING *",
        )
        .bind(course.id)
        .bind(course.organization_id)
        .bind(&course.title)
        .bind(&course.description)
        .bind(course.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update course"))?
        .ok_or_else(|| AppError::not_found(format!("Course {} not found", course.id)))
    }

    async fn list_sessions(&self, organization_id: Uuid, course_id: Uuid) -> AppResult<Vec<Session>> {
        sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE organization_id = $1 AND course_id = $2 \
             ORDER BY starts_at ASC, id ASC",
        )
        .bind(organization_id)
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list sessions"))
    }

    async fn find_session(&self, organization_id: Uuid, id: Uuid) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1 AND organization_id = $2")
            .bind(id)
            .bind(organization_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find session"))
    }

    async fn create_session(&self, data: &CreateSession) -> AppResult<Session> {
        sqlx::query_as::<_, Session>(
            "INSERT INTO sessions (id, organization_id, course_id, title, starts_at, ends_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.organization_id)
        .bind(data.course_id)
        .bind(&data.title)
        .bind(data.starts_at)
        .bind(data.ends_at)
        .bind(data.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create session"))
    }
}

/// Repository for instructor profiles.
#[derive(Debug, Clone)]
pub struct InstructorRepository {
    pool: PgPool,
}

impl InstructorRepository {
    /// Create a new instructor repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InstructorStore for InstructorRepository {
    async fn find_instructor_by_user(&self, user_id: Uuid) -> AppResult<Option<InstructorProfile>> {
        sqlx::query_as::<_, InstructorProfile>("SELECT * FROM instructor_profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find instructor profile"))
    }
}
