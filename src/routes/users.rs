use axum::{routing::get, Router};

use crate::handlers::users::{delete_user, email, get_user, me, profile, update_me, upsert_profile};
use crate::state::AppState;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(me).patch(update_me))
        .route("/me/profile", get(profile).post(upsert_profile))
        .route("/:id", get(get_user).delete(delete_user))
        .route("/:id/email", get(email))
}
