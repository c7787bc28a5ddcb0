//! Query string parameters of list and export endpoints.

use serde::Deserialize;
use uuid::Uuid;

use learnhub_core::error::AppError;
use learnhub_core::types::pagination::DEFAULT_PAGE_SIZE;
use learnhub_core::types::{PageRequest, SortColumn, SortDirection, SortField, lenient};
use learnhub_database::store::{
    AttemptFilter, DocumentFilter, FolderFilter, PartnerFilter, QuestionnaireFilter, QuizFilter,
};
use learnhub_entity::document::AudienceType;
use learnhub_service::ExportFormat;

/// Paging, sorting and search shared by every list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// Page number (1-based, default: 1).
    #[serde(default)]
    pub page: Option<u64>,
    /// Items per page (default: 15, max: 100).
    #[serde(default)]
    pub per_page: Option<u64>,
    /// `created_at`, `updated_at`, `title` or `name`.
    #[serde(default)]
    pub sort_by: Option<String>,
    /// `asc` or `desc`.
    #[serde(default)]
    pub sort_dir: Option<String>,
    /// Free-text search.
    #[serde(default)]
    pub search: Option<String>,
}

impl ListQuery {
    /// Converts to a clamped `PageRequest`.
    pub fn page(&self) -> PageRequest {
        PageRequest::new(self.page.unwrap_or(1), self.per_page.unwrap_or(DEFAULT_PAGE_SIZE))
    }

    /// Converts to a `SortField` over the allowed columns.
    pub fn sort(&self) -> SortField {
        SortField::new(
            SortColumn::parse(self.sort_by.as_deref()),
            SortDirection::parse(self.sort_dir.as_deref()),
        )
    }

    /// Partner filters.
    pub fn partner_filter(&self) -> PartnerFilter {
        PartnerFilter {
            search: self.search.clone(),
        }
    }
}

fn audience(value: Option<&str>) -> Result<Option<AudienceType>, AppError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|e: AppError| AppError::field("audience_type", "in", e.message)),
    }
}

/// `GET /api/documents` filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentQuery {
    /// Audience filter.
    #[serde(default)]
    pub audience_type: Option<String>,
    /// Course filter.
    #[serde(default, deserialize_with = "lenient::opt_uuid")]
    pub course_id: Option<Uuid>,
}

impl DocumentQuery {
    /// Combine with the shared search term.
    pub fn filter(&self, list: &ListQuery) -> Result<DocumentFilter, AppError> {
        Ok(DocumentFilter {
            audience_type: audience(self.audience_type.as_deref())?,
            course_id: self.course_id,
            search: list.search.clone(),
        })
    }
}

/// `GET /api/document-folders` filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FolderQuery {
    /// Course filter.
    #[serde(default, deserialize_with = "lenient::opt_uuid")]
    pub course_id: Option<Uuid>,
}

impl FolderQuery {
    /// Combine with the shared search term.
    pub fn filter(&self, list: &ListQuery) -> FolderFilter {
        FolderFilter {
            course_id: self.course_id,
            search: list.search.clone(),
        }
    }
}

/// `GET /api/questionnaires` filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionnaireQuery {
    /// Course filter.
    #[serde(default, deserialize_with = "lenient::opt_uuid")]
    pub course_id: Option<Uuid>,
    /// Audience filter.
    #[serde(default)]
    pub audience_type: Option<String>,
    /// Publication filter.
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub is_published: Option<bool>,
}

impl QuestionnaireQuery {
    /// Combine with the shared search term.
    pub fn filter(&self, list: &ListQuery) -> Result<QuestionnaireFilter, AppError> {
        Ok(QuestionnaireFilter {
            course_id: self.course_id,
            audience_type: audience(self.audience_type.as_deref())?,
            is_published: self.is_published,
            search: list.search.clone(),
        })
    }
}

/// `GET /api/quizzes` filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuizQuery {
    /// Course filter.
    #[serde(default, deserialize_with = "lenient::opt_uuid")]
    pub course_id: Option<Uuid>,
    /// Category filter.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub category: Option<String>,
    /// Publication filter.
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub is_published: Option<bool>,
}

impl QuizQuery {
    /// Combine with the shared search term.
    pub fn filter(&self, list: &ListQuery) -> QuizFilter {
        QuizFilter {
            course_id: self.course_id,
            category: self.category.clone(),
            is_published: self.is_published,
            search: list.search.clone(),
        }
    }
}

/// `GET /api/quizzes/{id}/attempts` filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttemptQuery {
    /// Learner filter.
    #[serde(default, deserialize_with = "lenient::opt_uuid")]
    pub user_id: Option<Uuid>,
    /// Only graded attempts.
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub graded_only: Option<bool>,
}

impl AttemptQuery {
    /// Attempt filters.
    pub fn filter(&self) -> AttemptFilter {
        AttemptFilter {
            user_id: self.user_id,
            graded_only: self.graded_only.unwrap_or(false),
        }
    }
}

/// `format` parameter of export endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportQuery {
    /// `csv` (default) or `xlsx`.
    #[serde(default)]
    pub format: Option<String>,
}

impl ExportQuery {
    /// Parsed format.
    pub fn format(&self) -> Result<ExportFormat, AppError> {
        self.format.as_deref().unwrap_or_default().parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_is_clamped() {
        let query = ListQuery {
            page: Some(0),
            per_page: Some(10_000),
            ..ListQuery::default()
        };
        let page = query.page();
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 100);
    }

    #[test]
    fn test_sort_falls_back_to_created_at() {
        let query = ListQuery {
            sort_by: Some("password; DROP TABLE".into()),
            sort_dir: Some("ASC".into()),
            ..ListQuery::default()
        };
        let sort = query.sort();
        assert_eq!(sort.column, SortColumn::CreatedAt);
        assert_eq!(sort.direction, SortDirection::Asc);
    }

    #[test]
    fn test_unknown_audience_is_a_field_error() {
        let query = DocumentQuery {
            audience_type: Some("aliens".into()),
            course_id: None,
        };
        let err = query.filter(&ListQuery::default()).unwrap_err();
        assert!(err.fields.unwrap().contains("audience_type"));
    }
}
