use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{ge_zero, max_length, not_blank, Validate};
use crate::error::AppError;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CourseCategoryWrite {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Validate for CourseCategoryWrite {
    fn validate(&self) -> Result<(), AppError> {
        not_blank("name", &self.name)?;
        max_length("name", &self.name, 255)
    }
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CourseWrite {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub lesson_url: Option<String>,
}

impl Validate for CourseWrite {
    fn validate(&self) -> Result<(), AppError> {
        not_blank("title", &self.title)?;
        max_length("title", &self.title, 255)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LessonWrite {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub course_id: Uuid,
    #[serde(default)]
    pub lesson_url: Option<String>,
}

impl Validate for LessonWrite {
    fn validate(&self) -> Result<(), AppError> {
        not_blank("name", &self.name)?;
        max_length("name", &self.name, 255)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuizQuestionWrite {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub lesson_id: Uuid,
    pub question_text: String,
    pub answer_options: Vec<String>,
    pub correct_answer: String,
}

impl Validate for QuizQuestionWrite {
    fn validate(&self) -> Result<(), AppError> {
        not_blank("question_text", &self.question_text)?;
        if self.answer_options.len() < 2 {
            return Err(AppError::Validation("answer_options needs at least 2 options".into()));
        }
        if !self.answer_options.contains(&self.correct_answer) {
            return Err(AppError::Validation("correct_answer must be one of answer_options".into()));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressWrite {
    #[serde(default)]
    pub id: Option<Uuid>,
    /// Defaults to the caller on create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    pub course_id: Uuid,
    #[serde(default)]
    pub completed_lessons: Vec<Uuid>,
    #[serde(default)]
    pub score: i32,
}

impl Validate for ProgressWrite {
    fn validate(&self) -> Result<(), AppError> {
        ge_zero("score", f64::from(self.score))
    }
}

/// One item of `POST /education/progress/sync`; the user is always the caller.
#[derive(Clone, Debug, Deserialize)]
pub struct ProgressSync {
    pub course_id: Uuid,
    #[serde(default)]
    pub completed_lessons: Vec<Uuid>,
    #[serde(default)]
    pub score: i32,
}

impl Validate for ProgressSync {
    fn validate(&self) -> Result<(), AppError> {
        ge_zero("score", f64::from(self.score))
    }
}
