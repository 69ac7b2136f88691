//! Server entry point: settings from the environment, migrate, serve.

use business_app::{app, apply_migrations, connect, ensure_database_exists, AppState, Settings};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("business_app=info,app_server=info,tower_http=info")
            }),
        )
        .init();

    let settings = Settings::from_env()?;
    ensure_database_exists(&settings.database_url).await?;
    let pool = connect(&settings).await?;
    let applied = apply_migrations(&pool).await?;
    tracing::info!(applied, "schema up to date");

    let bind_addr = settings.bind_addr;
    let router = app(AppState::new(pool, settings));
    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
