use axum::{
    routing::{get, post},
    Router,
};

use super::resource::resource_routes;
use crate::extractors::{CurrentUser, SuperUser};
use crate::handlers::education::{my_progress, sync_progress};
use crate::model::{Course, CourseCategory, Lesson, QuizQuestion, UserCourseProgress};
use crate::state::AppState;

/// Catalogue resources are readable by any user and writable by superusers.
pub fn education_routes() -> Router<AppState> {
    let progress = resource_routes::<UserCourseProgress, CurrentUser, CurrentUser>()
        .route("/me", get(my_progress))
        .route("/sync", post(sync_progress));
    Router::new()
        .nest("/course-categories", resource_routes::<CourseCategory, CurrentUser, SuperUser>())
        .nest("/courses", resource_routes::<Course, CurrentUser, SuperUser>())
        .nest("/lessons", resource_routes::<Lesson, CurrentUser, SuperUser>())
        .nest("/quiz-questions", resource_routes::<QuizQuestion, CurrentUser, SuperUser>())
        .nest("/progress", progress)
}
