mod cli;
pub mod commands;
pub mod core;

use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

pub async fn run() -> ExitCode {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,lite_launcher_lib=debug")),
        )
        .init();

    let app = cli::App::parse();
    tracing::info!("LiteLauncher starting...");

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling pending downloads");
            on_interrupt.cancel();
        }
    });

    match app.execute(cancel).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
