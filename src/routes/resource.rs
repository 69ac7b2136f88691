use axum::{routing::get, Router};

use crate::extractors::Caller;
use crate::handlers::resource::{delete, get_one, list, upsert};
use crate::service::Resource;
use crate::state::AppState;

/// `GET /`, `POST /`, `DELETE /` and `GET /:id` for one resource. Reads are
/// guarded by `Read`, writes by `Write`.
pub(crate) fn resource_routes<R, Read, Write>() -> Router<AppState>
where
    R: Resource,
    Read: Caller + 'static,
    Write: Caller + 'static,
{
    Router::new()
        .route(
            "/",
            get(list::<R, Read>).post(upsert::<R, Write>).delete(delete::<R, Write>),
        )
        .route("/:id", get(get_one::<R, Read>))
}
