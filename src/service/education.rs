//! Education catalogue resources: categories, courses, lessons, quiz questions.

use super::resource::Resource;
use crate::model::{Course, CourseCategory, Lesson, QuizQuestion};
use crate::schemas::education::{CourseCategoryWrite, CourseWrite, LessonWrite, QuizQuestionWrite};

impl Resource for CourseCategory {
    type Write = CourseCategoryWrite;
    const SEARCH_FIELD: Option<&'static str> = Some("name");
}

impl Resource for Course {
    type Write = CourseWrite;
    const SEARCH_FIELD: Option<&'static str> = Some("title");
}

impl Resource for Lesson {
    type Write = LessonWrite;
    const SEARCH_FIELD: Option<&'static str> = Some("name");
}

impl Resource for QuizQuestion {
    type Write = QuizQuestionWrite;
    const SEARCH_FIELD: Option<&'static str> = Some("question_text");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Entity;

    #[test]
    fn search_fields_are_registered_text_columns() {
        for (table, field) in [
            (CourseCategory::TABLE, CourseCategory::SEARCH_FIELD),
            (Course::TABLE, Course::SEARCH_FIELD),
            (Lesson::TABLE, Lesson::SEARCH_FIELD),
            (QuizQuestion::TABLE, QuizQuestion::SEARCH_FIELD),
        ] {
            let field = field.unwrap();
            assert_eq!(table.column(field).unwrap().ty, crate::model::ColumnType::Text, "{}", field);
        }
    }
}
