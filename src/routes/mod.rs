//! Router assembly.

mod auth;
mod business;
mod common;
mod education;
mod resource;
mod users;

pub use auth::auth_routes;
pub use business::business_routes;
pub use common::common_routes;
pub use education::education_routes;
pub use users::user_routes;

use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::{CorsOrigins, Settings};
use crate::state::AppState;

fn cors_layer(settings: &Settings) -> CorsLayer {
    match &settings.cors_allow_origins {
        CorsOrigins::Any => CorsLayer::permissive(),
        CorsOrigins::List(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|o| match HeaderValue::from_str(o) {
                    Ok(v) => Some(v),
                    Err(_) => {
                        tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// Full application: every route group plus body limit, CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let settings = state.settings.clone();
    Router::new()
        .merge(common_routes())
        .nest("/auth", auth_routes())
        .nest("/users", user_routes())
        .nest("/business", business_routes())
        .nest("/education", education_routes())
        .layer(RequestBodyLimitLayer::new(settings.body_limit_bytes))
        .layer(cors_layer(&settings))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let settings = Settings::default();
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_lazy(&settings.database_url)
            .expect("lazy pool");
        app(AppState::new(pool, settings))
    }

    async fn send(req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let res = test_app().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn health_is_ok_without_database() {
        let (status, body) = send(Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn version_reports_package() {
        let (status, body) = send(Request::get("/version").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "business-app");
    }

    #[tokio::test]
    async fn resources_require_a_bearer_token() {
        for uri in ["/business", "/education/courses", "/users/me", "/education/progress/me"] {
            let (status, body) = send(Request::get(uri).body(Body::empty()).unwrap()).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(body["code"], "unauthorized");
        }
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_unauthorized() {
        let req = Request::builder()
            .method(Method::DELETE)
            .uri("/business")
            .header(header::AUTHORIZATION, "Basic Zm9vOmJhcg==")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"id": []}"#))
            .unwrap();
        let (status, _) = send(req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let (status, _) = send(Request::get("/nope").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
