use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{table_columns, ColumnDef, ColumnType, Entity, TableDef};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CourseCategory {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for CourseCategory {
    type Id = Uuid;

    const TABLE: &'static TableDef = &TableDef {
        name: "course_category",
        pk: "id",
        columns: table_columns![
            ColumnDef::new("name", ColumnType::Text),
            ColumnDef::new("description", ColumnType::Text),
        ],
        timestamps: true,
        natural_sort: false,
    };
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub category_id: Option<Uuid>,
    pub lesson_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Course {
    type Id = Uuid;

    const TABLE: &'static TableDef = &TableDef {
        name: "course",
        pk: "id",
        columns: table_columns![
            ColumnDef::new("title", ColumnType::Text),
            ColumnDef::new("description", ColumnType::Text),
            ColumnDef::new("is_active", ColumnType::Bool),
            ColumnDef::new("category_id", ColumnType::Uuid),
            ColumnDef::new("lesson_url", ColumnType::Text),
        ],
        timestamps: true,
        natural_sort: true,
    };
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Lesson {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub course_id: Uuid,
    pub lesson_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Lesson {
    type Id = Uuid;

    const TABLE: &'static TableDef = &TableDef {
        name: "lesson",
        pk: "id",
        columns: table_columns![
            ColumnDef::new("name", ColumnType::Text),
            ColumnDef::new("description", ColumnType::Text),
            ColumnDef::new("course_id", ColumnType::Uuid),
            ColumnDef::new("lesson_url", ColumnType::Text),
        ],
        timestamps: true,
        natural_sort: true,
    };
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: Uuid,
    pub lesson_id: Uuid,
    pub question_text: String,
    pub answer_options: Vec<String>,
    pub correct_answer: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for QuizQuestion {
    type Id = Uuid;

    const TABLE: &'static TableDef = &TableDef {
        name: "quiz_question",
        pk: "id",
        columns: table_columns![
            ColumnDef::new("lesson_id", ColumnType::Uuid),
            ColumnDef::new("question_text", ColumnType::Text),
            ColumnDef::new("answer_options", ColumnType::Json),
            ColumnDef::new("correct_answer", ColumnType::Text),
        ],
        timestamps: true,
        natural_sort: false,
    };
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserCourseProgress {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub completed_lessons: Value,
    pub score: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for UserCourseProgress {
    type Id = Uuid;

    const TABLE: &'static TableDef = &TableDef {
        name: "user_course_progress",
        pk: "id",
        columns: table_columns![
            ColumnDef::new("user_id", ColumnType::Uuid),
            ColumnDef::new("course_id", ColumnType::Uuid),
            ColumnDef::new("completed_lessons", ColumnType::Json),
            ColumnDef::new("score", ColumnType::Int),
        ],
        timestamps: true,
        natural_sort: false,
    };
}
