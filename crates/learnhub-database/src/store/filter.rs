//! Filters accepted by list queries.

use uuid::Uuid;

use learnhub_entity::document::AudienceType;

/// Document library filters.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    /// Restrict to one audience.
    pub audience_type: Option<AudienceType>,
    /// Restrict to one course.
    pub course_id: Option<Uuid>,
    /// Case-insensitive match on title or file name.
    pub search: Option<String>,
}

/// Folder filters.
#[derive(Debug, Clone, Default)]
pub struct FolderFilter {
    /// Restrict to one course.
    pub course_id: Option<Uuid>,
    /// Case-insensitive match on the name.
    pub search: Option<String>,
}

/// Questionnaire filters.
#[derive(Debug, Clone, Default)]
pub struct QuestionnaireFilter {
    /// Restrict to one course.
    pub course_id: Option<Uuid>,
    /// Restrict to one audience.
    pub audience_type: Option<AudienceType>,
    /// Restrict by publication state.
    pub is_published: Option<bool>,
    /// Case-insensitive match on the title.
    pub search: Option<String>,
}

/// Quiz filters.
#[derive(Debug, Clone, Default)]
pub struct QuizFilter {
    /// Restrict to one course.
    pub course_id: Option<Uuid>,
    /// Restrict to one category.
    pub category: Option<String>,
    /// Restrict by publication state.
    pub is_published: Option<bool>,
    /// Case-insensitive match on the title.
    pub search: Option<String>,
}

/// Quiz attempt filters.
#[derive(Debug, Clone, Default)]
pub struct AttemptFilter {
    /// Restrict to one learner.
    pub user_id: Option<Uuid>,
    /// Restrict to graded attempts.
    pub graded_only: bool,
}

/// Company and funder filters.
#[derive(Debug, Clone, Default)]
pub struct PartnerFilter {
    /// Case-insensitive match on name, exact prefix on SIRET.
    pub search: Option<String>,
}

/// `%term%` for ILIKE, or `None` when the term is blank.
pub(crate) fn like_pattern(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")))
}

/// Case-insensitive containment used by the in-memory backend.
#[cfg_attr(not(feature = "memory"), allow(dead_code))]
pub(crate) fn matches_search(search: Option<&str>, haystacks: &[&str]) -> bool {
    match search.map(str::trim).filter(|s| !s.is_empty()) {
        None => true,
        Some(term) => {
            let term = term.to_lowercase();
            haystacks.iter().any(|h| h.to_lowercase().contains(&term))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(Some(" 50%_off ")), Some("%50\\%\\_off%".to_string()));
        assert_eq!(like_pattern(Some("   ")), None);
        assert_eq!(like_pattern(None), None);
    }

    #[test]
    fn test_matches_search() {
        assert!(matches_search(None, &["anything"]));
        assert!(matches_search(Some("ACME"), &["Acme Corp", "x"]));
        assert!(!matches_search(Some("globex"), &["Acme Corp"]));
    }
}
