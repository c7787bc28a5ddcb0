//! Quiz request payloads and their checks.

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use learnhub_core::error::FieldErrors;
use learnhub_core::types::lenient;
use learnhub_entity::quiz::{NewQuizOption, NewQuizQuestion, QuizQuestionKind};

use crate::validation::{non_blank, parse_enum, required};

/// Create or update payload; on update absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct QuizPayload {
    /// Title.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[validate(length(max = 255, message = "The title field may not be greater than 255 characters"))]
    pub title: Option<String>,
    /// Description.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
    /// Thumbnail URL or path.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[validate(length(max = 2048, message = "The thumbnail field may not be greater than 2048 characters"))]
    pub thumbnail: Option<String>,
    /// Category label.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[validate(length(max = 100, message = "The category field may not be greater than 100 characters"))]
    pub category: Option<String>,
    /// Time limit in minutes.
    #[serde(default, deserialize_with = "lenient::opt_i32")]
    #[validate(range(min = 1, max = 1440, message = "The duration_minutes field must be between 1 and 1440"))]
    pub duration_minutes: Option<i32>,
    /// Shuffle questions for takers.
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub is_shuffle: Option<bool>,
    /// Allow more than one attempt per learner.
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub is_remake: Option<bool>,
    /// Publication flag.
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub is_published: Option<bool>,
    /// Owning course.
    #[serde(default, deserialize_with = "lenient::opt_uuid")]
    pub course_id: Option<Uuid>,
    /// Questions, on create only.
    #[serde(default, deserialize_with = "lenient::embedded")]
    pub questions: Option<Vec<QuizQuestionInput>>,
}

/// One question as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuizQuestionInput {
    /// Question text.
    #[serde(default)]
    pub text: Option<String>,
    /// `single` or `multiple`.
    #[serde(default, alias = "type")]
    pub kind: Option<String>,
    /// Points awarded for a correct answer.
    #[serde(default)]
    pub points: Option<i32>,
    /// Answer options, in display order.
    #[serde(default, deserialize_with = "lenient::embedded")]
    pub options: Option<Vec<QuizOptionInput>>,
}

/// One answer option as submitted.
#[derive(Debug, Clone, Deserialize)]
pub struct QuizOptionInput {
    /// Option text.
    pub text: String,
    /// Whether choosing it is correct.
    #[serde(default)]
    pub is_correct: bool,
}

/// Check one question, reporting under `{prefix}text`, `{prefix}options`...
pub(crate) fn parse_question(input: QuizQuestionInput, prefix: &str, fields: &mut FieldErrors) -> Option<NewQuizQuestion> {
    let text = required(fields, &format!("{prefix}text"), non_blank(input.text));

    let kind_field = format!("{prefix}kind");
    let kind = match input.kind.as_deref() {
        Some(raw) => parse_enum::<QuizQuestionKind>(fields, &kind_field, Some(raw)),
        None => Some(QuizQuestionKind::Single),
    };

    let points = input.points.unwrap_or(1);
    if points < 0 {
        fields.add(format!("{prefix}points"), "min", "The points field must be at least 0");
    }

    let options: Vec<NewQuizOption> = input
        .options
        .unwrap_or_default()
        .into_iter()
        .filter_map(|o| {
            non_blank(Some(o.text)).map(|text| NewQuizOption {
                text,
                is_correct: o.is_correct,
            })
        })
        .collect();
    let options_field = format!("{prefix}options");
    let correct = options.iter().filter(|o| o.is_correct).count();
    if options.len() < 2 {
        fields.add(&options_field, "min", "A question needs at least two options");
    } else if correct == 0 {
        fields.add(&options_field, "correct_required", "Mark at least one option as correct");
    } else if kind == Some(QuizQuestionKind::Single) && correct > 1 {
        fields.add(&options_field, "single_correct", "A single-answer question has exactly one correct option");
    }

    Some(NewQuizQuestion {
        text: text?,
        kind: kind?,
        points,
        options,
    })
}

/// Check a list of questions, reporting under `questions.{i}.`.
pub(crate) fn parse_questions(inputs: Vec<QuizQuestionInput>, fields: &mut FieldErrors) -> Vec<NewQuizQuestion> {
    inputs
        .into_iter()
        .enumerate()
        .filter_map(|(i, input)| parse_question(input, &format!("questions.{i}."), fields))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(text: &str, is_correct: bool) -> QuizOptionInput {
        QuizOptionInput {
            text: text.into(),
            is_correct,
        }
    }

    #[test]
    fn test_valid_question_defaults() {
        let mut fields = FieldErrors::new();
        let question = parse_question(
            QuizQuestionInput {
                text: Some("2 + 2?".into()),
                options: Some(vec![option("4", true), option("5", false)]),
                ..QuizQuestionInput::default()
            },
            "",
            &mut fields,
        )
        .unwrap();
        assert!(fields.is_empty());
        assert_eq!(question.kind, QuizQuestionKind::Single);
        assert_eq!(question.points, 1);
    }

    #[test]
    fn test_option_rules() {
        let mut fields = FieldErrors::new();
        parse_questions(
            vec![
                QuizQuestionInput {
                    text: Some("a".into()),
                    options: Some(vec![option("only", true)]),
                    ..QuizQuestionInput::default()
                },
                QuizQuestionInput {
                    text: Some("b".into()),
                    options: Some(vec![option("x", false), option("y", false)]),
                    ..QuizQuestionInput::default()
                },
                QuizQuestionInput {
                    text: Some("c".into()),
                    kind: Some("single".into()),
                    options: Some(vec![option("x", true), option("y", true)]),
                    ..QuizQuestionInput::default()
                },
            ],
            &mut fields,
        );
        assert_eq!(fields.get("questions.0.options").unwrap()[0].code, "min");
        assert_eq!(fields.get("questions.1.options").unwrap()[0].code, "correct_required");
        assert_eq!(fields.get("questions.2.options").unwrap()[0].code, "single_correct");
    }

    #[test]
    fn test_embedded_options_from_multipart() {
        let input: QuizQuestionInput = serde_json::from_value(serde_json::json!({
            "text": "Pick",
            "type": "multiple",
            "options": "[{\"text\":\"a\",\"is_correct\":true},{\"text\":\"b\"}]",
        }))
        .unwrap();
        assert_eq!(input.options.unwrap().len(), 2);
        assert_eq!(input.kind.as_deref(), Some("multiple"));
    }
}
