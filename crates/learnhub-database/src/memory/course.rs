use async_trait::async_trait;
use uuid::Uuid;

use learnhub_core::error::AppError;
use learnhub_core::result::AppResult;
use learnhub_core::types::{PageRequest, PageResponse, SortField};
use learnhub_entity::course::{Course, CreateCourse, CreateSession, Session};
use learnhub_entity::document::DocumentFolder;
use learnhub_entity::user::InstructorProfile;

use super::document::system_folder;
use super::{MemoryStore, sort_rows};
use crate::store::filter::matches_search;
use crate::store::{CourseStore, InstructorStore};

#[async_trait]
impl CourseStore for MemoryStore {
    async fn list_courses(
        &self,
        organization_id: Uuid,
        search: Option<&str>,
        sort: SortField,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Course>> {
        let state = self.state.read().await;
        let mut rows: Vec<Course> = state
            .courses
            .values()
            .filter(|c| c.organization_id == organization_id && matches_search(search, &[c.title.as_str()]))
            .cloned()
            .collect();
        sort_rows(&mut rows, sort);
        Ok(page.apply(rows))
    }

    async fn find_course(&self, organization_id: Uuid, id: Uuid) -> AppResult<Option<Course>> {
        let state = self.state.read().await;
        Ok(state.courses.get(&id).filter(|c| c.organization_id == organization_id).cloned())
    }

    async fn create_course(&self, data: &CreateCourse) -> AppResult<(Course, DocumentFolder)> {
        let mut state = self.state.write().await;
        let course = Course {
            id: Uuid::new_v4(),
            organization_id: data.organization_id,
            title: data.title.clone(),
            description: data.description.clone(),
            created_by: data.created_by,
            created_at: data.created_at,
            updated_at: data.created_at,
        };
        let folder = system_folder(&course, data.created_at);
        state.courses.insert(course.id, course.clone());
        state.folders.insert(folder.id, folder.clone());
        Ok((course, folder))
    }

    async fn save_course(&self, course: &Course) -> AppResult<Course> {
        let mut state = self.state.write().await;
        match state.courses.get_mut(&course.id) {
            Some(row) if row.organization_id == course.organization_id => {
                row.title = course.title.clone();
                row.description = course.description.clone();
                row.updated_at = course.updated_at;
                Ok(row.clone())
            }
            _ => Err(AppError::not_found(format!("Course {} not found", course.id))),
        }
    }

    async fn list_sessions(&self, organization_id: Uuid, course_id: Uuid) -> AppResult<Vec<Session>> {
        let state = self.state.read().await;
        let mut rows: Vec<Session> = state
            .sessions
            .values()
            .filter(|s| s.organization_id == organization_id && s.course_id == course_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.starts_at.cmp(&b.starts_at).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn find_session(&self, organization_id: Uuid, id: Uuid) -> AppResult<Option<Session>> {
        let state = self.state.read().await;
        Ok(state.sessions.get(&id).filter(|s| s.organization_id == organization_id).cloned())
    }

    async fn create_session(&self, data: &CreateSession) -> AppResult<Session> {
        let mut state = self.state.write().await;
        if !state.courses.contains_key(&data.course_id) {
            return Err(AppError::not_found(format!("Course {} not found", data.course_id)));
        }
        let session = Session {
            id: Uuid::new_v4(),
            organization_id: data.organization_id,
            course_id: data.course_id,
            title: data.title.clone(),
            starts_at: data.starts_at,
            ends_at: data.ends_at,
            created_at: data.created_at,
            updated_at: data.created_at,
        };
        state.sessions.insert(session.id, session.clone());
        Ok(session)
    }
}

#[async_trait]
impl InstructorStore for MemoryStore {
    async fn find_instructor_by_user(&self, user_id: Uuid) -> AppResult<Option<InstructorProfile>> {
        Ok(self.state.read().await.instructors.get(&user_id).cloned())
    }
}
