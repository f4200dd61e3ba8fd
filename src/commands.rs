use std::process::ExitStatus;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::core::downloader::{BatchResult, ProgressObserver};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::install::{self, InstallContext};
use crate::core::launch;
use crate::core::state::AppState;
use crate::core::version::{VersionJson, VersionManifest};

/// Release ids from the (cached) version catalog, newest first.
pub async fn list_versions(state: &AppState) -> LauncherResult<Vec<String>> {
    let manifest = VersionManifest::fetch_cached(
        &state.http_client,
        &state.data_dir,
        &state.launcher_settings.version_manifest_url,
    )
    .await?;

    let versions = manifest
        .releases()
        .into_iter()
        .filter(|entry| !entry.id.to_ascii_lowercase().contains("demo"))
        .map(|entry| entry.id.clone())
        .collect();

    Ok(versions)
}

/// Look `version_id` up in the catalog (`latest` allowed) and load its
/// version JSON, from disk when already cached.
pub async fn resolve_version(state: &AppState, version_id: &str) -> LauncherResult<VersionJson> {
    let manifest = VersionManifest::fetch_cached(
        &state.http_client,
        &state.data_dir,
        &state.launcher_settings.version_manifest_url,
    )
    .await?;
    let entry = manifest.find(version_id)?;

    info!("Resolved {} to {} ({})", version_id, entry.id, entry.version_type);
    VersionJson::resolve(&state.http_client, &state.data_dir, entry).await
}

/// Resolve and download every artifact of a version.
pub async fn install_version(
    state: &AppState,
    version_id: &str,
    cancel: CancellationToken,
    observer: Arc<dyn ProgressObserver>,
) -> LauncherResult<(VersionJson, BatchResult)> {
    let manifest = resolve_version(state, version_id).await?;

    let ctx = InstallContext {
        store_dir: &state.data_dir,
        downloader: &state.downloader,
        resources_url: &state.launcher_settings.resources_url,
        concurrency: state.launcher_settings.concurrency,
        cancel,
    };
    let result = install::install(&ctx, &manifest, observer).await?;

    Ok((manifest, result))
}

/// Install a version, then run it until the game exits.
///
/// With `require_complete_install` set, any failed download aborts before
/// the game starts.
pub async fn launch_version(
    state: &AppState,
    version_id: &str,
    username: Option<&str>,
    cancel: CancellationToken,
    observer: Arc<dyn ProgressObserver>,
) -> LauncherResult<ExitStatus> {
    let (manifest, result) = install_version(state, version_id, cancel, observer).await?;
    ensure_launchable(&result, state.launcher_settings.require_complete_install)?;

    let username = username.unwrap_or(state.launcher_settings.username.as_str());
    launch::launch(&manifest, &state.data_dir, username).await
}

fn ensure_launchable(result: &BatchResult, require_complete: bool) -> LauncherResult<()> {
    if result.is_complete() {
        return Ok(());
    }

    let failed = result.failures.len();
    if require_complete {
        return Err(LauncherError::IncompleteInstall { failed });
    }

    warn!("Launching with {} missing files", failed);
    Ok(())
}
