use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

use crate::service::PgExecutor;
use crate::state::AppState;

/// Request-scoped executor. Its transaction is opened lazily and rolled back
/// unless the handler's service commits.
pub struct Db(pub PgExecutor);

#[async_trait]
impl FromRequestParts<AppState> for Db {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(_parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Db(PgExecutor::new(state.pool.clone())))
    }
}
