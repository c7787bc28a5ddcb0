//! Quiz entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::question::QuizQuestionWithOptions;

/// Points awarded per completed aspect of a quiz.
const PROGRESS_STEP: i32 = 25;

/// A quiz authored by an organization.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Quiz {
    /// Unique quiz identifier.
    pub id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// Optional course.
    pub course_id: Option<Uuid>,
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Thumbnail URL or storage path.
    pub thumbnail: Option<String>,
    /// Free-form category.
    pub category: Option<String>,
    /// Time limit in minutes.
    pub duration_minutes: Option<i32>,
    /// Serve questions in random order per attempt.
    pub is_shuffle: bool,
    /// Allow more than one attempt per learner.
    pub is_remake: bool,
    /// Publication flag.
    pub is_published: bool,
    /// Completeness score (0-100), maintained on every write.
    pub progress: i32,
    /// Creating user.
    pub created_by: Uuid,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Last update instant.
    pub updated_at: DateTime<Utc>,
}

impl Quiz {
    /// Completeness score: 25 points each for a thumbnail, a category, a
    /// duration and at least one question.
    pub fn calculate_progress(&self, question_count: usize) -> i32 {
        [
            self.thumbnail.as_deref().is_some_and(|t| !t.trim().is_empty()),
            self.category.as_deref().is_some_and(|c| !c.trim().is_empty()),
            self.duration_minutes.is_some_and(|d| d > 0),
            question_count > 0,
        ]
        .into_iter()
        .filter(|done| *done)
        .count() as i32
            * PROGRESS_STEP
    }
}

/// Data required to create a quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQuiz {
    /// Owning organization.
    pub organization_id: Uuid,
    /// Optional course.
    pub course_id: Option<Uuid>,
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Thumbnail.
    pub thumbnail: Option<String>,
    /// Category.
    pub category: Option<String>,
    /// Time limit in minutes.
    pub duration_minutes: Option<i32>,
    /// Shuffle flag.
    pub is_shuffle: bool,
    /// Remake flag.
    pub is_remake: bool,
    /// Publication flag.
    pub is_published: bool,
    /// Creating user.
    pub created_by: Uuid,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

impl CreateQuiz {
    /// Build the row this insert produces, with `progress` computed.
    pub fn into_quiz(self, id: Uuid, question_count: usize) -> Quiz {
        let mut quiz = Quiz {
            id,
            organization_id: self.organization_id,
            course_id: self.course_id,
            title: self.title,
            description: self.description,
            thumbnail: self.thumbnail,
            category: self.category,
            duration_minutes: self.duration_minutes,
            is_shuffle: self.is_shuffle,
            is_remake: self.is_remake,
            is_published: self.is_published,
            progress: 0,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.created_at,
        };
        quiz.progress = quiz.calculate_progress(question_count);
        quiz
    }
}

/// A quiz with its questions, in stored or shuffled order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizWithQuestions {
    /// Quiz row.
    #[serde(flatten)]
    pub quiz: Quiz,
    /// Questions with their options.
    pub questions: Vec<QuizQuestionWithOptions>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> CreateQuiz {
        CreateQuiz {
            organization_id: Uuid::new_v4(),
            course_id: None,
            title: "Safety basics".into(),
            description: None,
            thumbnail: None,
            category: None,
            duration_minutes: None,
            is_shuffle: false,
            is_remake: false,
            is_published: false,
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_quiz_has_no_progress() {
        assert_eq!(draft().into_quiz(Uuid::new_v4(), 0).progress, 0);
    }

    #[test]
    fn test_progress_counts_each_aspect() {
        let mut data = draft();
        data.thumbnail = Some("thumb.png".into());
        data.category = Some("  ".into());
        data.duration_minutes = Some(20);
        let quiz = data.into_quiz(Uuid::new_v4(), 3);
        assert_eq!(quiz.progress, 75);
        assert_eq!(quiz.calculate_progress(0), 50);
    }
}
