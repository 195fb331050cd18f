#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;
mod controllers;

use args::Args;
use clap::Parser;
use hostkit_config::Config;
use hostkit_server::Server;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config, args.environment.as_deref())?;
    if let Some(listen) = args.listen {
        config.server.listen_address = Some(listen);
    }

    hostkit_telemetry::init(&config.logging)?;

    tracing::info!(
        config_path = %args.config.display(),
        app = %config.program.app,
        "starting hostkit"
    );
    if let Some(overlay) = &config.overlay {
        tracing::info!(overlay = %overlay.display(), "applied configuration overlay");
    }

    let server = Server::new(config, controllers::router()).await?;

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            shutdown.cancel();
        }
    });

    server.serve(shutdown).await?;

    tracing::info!("hostkit stopped");
    Ok(())
}

/// Wait for `SIGINT` or `SIGTERM`
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
