//! # Agora Server
//!
//! Loads configuration, wires the application and serves the REST API
//! until Ctrl+C or SIGTERM. SIGHUP reloads the configuration files and
//! applies the new log level; other settings take effect on restart.

use agora_config::ConfigLoader;
use agora_rest::create_router;
use agora_server::{di::AppContainer, startup, telemetry, telemetry::LogFilterHandle};
use anyhow::Context;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Application error: {:#}", e);
        eprintln!("agora-server: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let loader = ConfigLoader::from_default_location()?;
    let config = loader.get().await;
    let log_filter = telemetry::init_tracing(&config.observability)?;
    spawn_reload_on_hangup(loader, log_filter);

    startup::print_banner();
    info!("Starting Agora server v{}", env!("CARGO_PKG_VERSION"));

    let container = AppContainer::build(config).await?;
    let config = &container.config;
    let router = create_router(container.app_state(), &config.server);

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    startup::print_startup_info(config);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("REST server error")?;

    info!("Server stopped");
    Ok(())
}

#[cfg(unix)]
fn spawn_reload_on_hangup(loader: ConfigLoader, log_filter: LogFilterHandle) {
    tokio::spawn(async move {
        let mut hangup = match signal::unix::signal(signal::unix::SignalKind::hangup()) {
            Ok(sig) => sig,
            Err(e) => {
                warn!("Failed to install SIGHUP handler: {}", e);
                return;
            }
        };
        while hangup.recv().await.is_some() {
            info!("Received SIGHUP, reloading configuration");
            if let Err(e) = loader.reload().await {
                warn!("Configuration reload failed, keeping previous: {}", e);
                continue;
            }
            let observability = loader.get().await.observability;
            match log_filter.apply(&observability) {
                Ok(()) => info!(level = %observability.log_level, "Log filter updated"),
                Err(e) => warn!("Failed to apply log level: {}", e),
            }
        }
    });
}

#[cfg(not(unix))]
fn spawn_reload_on_hangup(_loader: ConfigLoader, _log_filter: LogFilterHandle) {}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}
