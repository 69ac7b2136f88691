use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use crate::auth::{token::bearer, AuthService};
use crate::error::AppError;
use crate::model::User;
use crate::service::PgExecutor;
use crate::state::AppState;

/// Raw bearer token from the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()).and_then(bearer)
}

/// Any extractor that resolves to an authenticated user.
pub trait Caller: FromRequestParts<AppState, Rejection = AppError> + Send {
    fn user(&self) -> &User;
}

/// Active user behind a valid, unexpired bearer token.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?.to_string();
        let mut exec = PgExecutor::new(state.pool.clone());
        let user = AuthService::authenticate(&mut exec, &token, state.settings.token_lifetime_seconds).await?;
        Ok(CurrentUser(user))
    }
}

impl Caller for CurrentUser {
    fn user(&self) -> &User {
        &self.0
    }
}

#[derive(Clone, Debug)]
pub struct SuperUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for SuperUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_superuser {
            return Err(AppError::Forbidden);
        }
        Ok(SuperUser(user))
    }
}

impl Caller for SuperUser {
    fn user(&self) -> &User {
        &self.0
    }
}
