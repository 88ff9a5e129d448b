mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use agrinews_ingest::{IngestError, Pipeline};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = agrinews_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let sources = Arc::new(agrinews_core::load_sources(&config.sources_path)?);
    tracing::info!(
        path = %config.sources_path.display(),
        enabled = sources.enabled().count(),
        "loaded news sources"
    );

    let pipeline = match Pipeline::from_config(&config) {
        Ok(p) => Some(Arc::new(p)),
        Err(IngestError::MissingApiKey) => {
            tracing::warn!("GOOGLE_API_KEY is not set; trigger routes will answer 503");
            None
        }
        Err(e) => return Err(e.into()),
    };

    let pool_config = agrinews_db::PoolConfig::from_app_config(&config);
    let pool = agrinews_db::connect_pool(&config.database_url, pool_config).await?;
    agrinews_db::run_migrations(&pool).await?;

    let _scheduler = scheduler::build_scheduler(
        pool.clone(),
        &config,
        Arc::clone(&sources),
        pipeline.clone(),
    )
    .await?;

    let app = build_app(AppState {
        pool,
        sources,
        pipeline,
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "agrinews-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
