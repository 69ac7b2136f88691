use axum::{routing::get, Router};

use super::resource::resource_routes;
use crate::extractors::CurrentUser;
use crate::handlers::business::yours;
use crate::model::{Business, PhysicalBusinessSettings, VirtualBusinessSettings};
use crate::state::AppState;

pub fn business_routes() -> Router<AppState> {
    resource_routes::<Business, CurrentUser, CurrentUser>()
        .route("/yours", get(yours))
        .nest(
            "/physical-settings",
            resource_routes::<PhysicalBusinessSettings, CurrentUser, CurrentUser>(),
        )
        .nest(
            "/virtual-settings",
            resource_routes::<VirtualBusinessSettings, CurrentUser, CurrentUser>(),
        )
}
