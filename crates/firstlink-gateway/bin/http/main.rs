mod cli;

use crate::cli::{StorageBackendArg, CLI};
use anyhow::Context;
use clap::Parser;
use firstlink_core::{FirstVisitPolicy, Repository, ResolutionStore};
use firstlink_gateway::{App, AppState};
use firstlink_storage::{InMemoryRepository, MySqlRepository};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    firstlink_telemetry::init(config.log_format)?;

    let policy = config.policy;
    info!(
        listen_addr = %config.listen_addr,
        storage_backend = %config.storage,
        policy = %policy,
        "starting firstlink gateway"
    );
    if policy == FirstVisitPolicy::Global {
        warn!("global policy can award the first visit more than once under concurrency");
    }

    match config.storage {
        StorageBackendArg::InMemory => {
            run_server(&config, InMemoryRepository::new(), policy).await?;
        }
        StorageBackendArg::Mysql => {
            let mysql_dsn = config
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when storage backend is mysql")?;
            let repository = MySqlRepository::connect(mysql_dsn)
                .await
                .context("failed to connect to mysql")?;
            repository
                .migrate()
                .await
                .context("failed to apply redirect schema")?;
            run_server(&config, repository, policy).await?;
        }
    }

    Ok(())
}

async fn run_server<S>(config: &CLI, store: S, policy: FirstVisitPolicy) -> anyhow::Result<()>
where
    S: Repository + ResolutionStore + Clone,
{
    let mut state = AppState::from_store(store, policy);
    if let Some(base_url) = &config.public_base_url {
        state = state.with_public_base_url(base_url.as_str());
    }

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
