use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use crate::commands;
use crate::core::downloader::{BatchResult, LogObserver};
use crate::core::error::LauncherResult;
use crate::core::state::{AppState, DEFAULT_STORE_DIR};
use crate::core::version::LATEST;

#[derive(Clone, Debug, Parser)]
#[command(name = "lite-launcher", version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
pub struct App {
    /// Store root holding every installed version.
    #[arg(long, global = true, value_name = "DIR")]
    pub dir: Option<PathBuf>,
    /// Parallel downloads, overriding the saved setting.
    #[arg(long, global = true, value_name = "N")]
    pub parallel: Option<usize>,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "ls", name = "versions", about = "List release versions")]
    Versions,
    #[command(alias = "i", name = "install", about = "Download a version")]
    Install(InstallArg),
    #[command(alias = "run", name = "launch", about = "Download a version and start it")]
    Launch(LaunchArg),
}

#[derive(Clone, Debug, Args)]
pub struct InstallArg {
    /// Version id, or `latest` for the newest release.
    #[arg(long, default_value = LATEST)]
    pub version: String,
}

#[derive(Clone, Debug, Args)]
pub struct LaunchArg {
    #[arg(long, default_value = LATEST)]
    pub version: String,
    /// Offline player name; defaults to the saved setting.
    #[arg(long)]
    pub username: Option<String>,
}

impl App {
    pub async fn execute(self, cancel: CancellationToken) -> LauncherResult<ExitCode> {
        let dir = self.dir.unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR));
        let mut state = AppState::new(dir)?;
        if let Some(n) = self.parallel {
            state.launcher_settings.concurrency = n;
        }

        match self.cmd {
            Commands::Versions => {
                for id in commands::list_versions(&state).await? {
                    println!("{}", id);
                }
                Ok(ExitCode::SUCCESS)
            }
            Commands::Install(arg) => {
                let observer = Arc::new(LogObserver::new(arg.version.clone()));
                let (manifest, result) =
                    commands::install_version(&state, &arg.version, cancel, observer).await?;
                print_summary(&manifest.id, &result);
                Ok(if result.is_complete() {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::FAILURE
                })
            }
            Commands::Launch(arg) => {
                let observer = Arc::new(LogObserver::new(arg.version.clone()));
                commands::launch_version(
                    &state,
                    &arg.version,
                    arg.username.as_deref(),
                    cancel,
                    observer,
                )
                .await?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn print_summary(version_id: &str, result: &BatchResult) {
    println!(
        "{}: {}/{} files ready ({} already up to date, {} bytes downloaded)",
        version_id, result.completed, result.total, result.skipped, result.bytes_downloaded
    );
    for failure in &result.failures {
        println!("  failed {}: {}", failure.url, failure.error);
    }
}
