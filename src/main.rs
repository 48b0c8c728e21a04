use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use academy::backend::{RestBackend, SharedBackend, SqliteBackend};
use academy::config::{BackendConfig, Config};
use academy::{db, migrations, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "academy=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env();
    let backend = connect(&config)?;

    let app = routes::create_router(backend);

    let addr = config.server_addr();
    tracing::info!("Starting server at http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn connect(config: &Config) -> anyhow::Result<SharedBackend> {
    match &config.backend {
        BackendConfig::Sqlite { database_url } => {
            tracing::info!("Using local database: {}", database_url);
            let pool = db::create_pool(database_url)?;
            migrations::run_migrations(&pool)?;

            let public_url = if config.public_url.is_empty() {
                format!("http://{}", config.server_addr())
            } else {
                config.public_url.clone()
            };
            Ok(Arc::new(SqliteBackend::new(pool, public_url)))
        }
        BackendConfig::Rest { url, key } => {
            tracing::info!("Using hosted backend: {}", url);
            let backend = RestBackend::new(
                url,
                key,
                &config.storage_bucket,
                Duration::from_secs(config.backend_timeout_secs),
            )?;
            Ok(Arc::new(backend))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
