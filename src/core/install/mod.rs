// ─── Version Install ───
// Enumerates every artifact of a resolved version and drains the list through
// the batch downloader.

mod enumerate;

pub use enumerate::TaskEnumerator;

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::core::downloader::{BatchDownloader, BatchResult, Downloader, ProgressObserver};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::version::VersionJson;

/// Everything one install run needs besides the manifest itself.
pub struct InstallContext<'a> {
    pub store_dir: &'a Path,
    pub downloader: &'a Arc<Downloader>,
    pub resources_url: &'a str,
    pub concurrency: usize,
    pub cancel: CancellationToken,
}

/// Download every artifact of `manifest` into `<store>/<id>/`.
///
/// Only enumeration errors (the asset index) are returned as `Err`;
/// per-file failures are reported in the returned [`BatchResult`].
pub async fn install(
    ctx: &InstallContext<'_>,
    manifest: &VersionJson,
    observer: Arc<dyn ProgressObserver>,
) -> LauncherResult<BatchResult> {
    let version_dir = ctx.store_dir.join(&manifest.id);
    tokio::fs::create_dir_all(&version_dir)
        .await
        .map_err(|e| LauncherError::io(&version_dir, e))?;

    let tasks = TaskEnumerator::new(ctx.downloader, ctx.resources_url)
        .enumerate(manifest, &version_dir)
        .await?;

    let result = BatchDownloader::new(ctx.downloader.clone())
        .with_concurrency(ctx.concurrency)
        .with_cancellation(ctx.cancel.clone())
        .run(tasks, observer)
        .await;

    if result.is_complete() {
        info!("Version {} is fully installed", manifest.id);
    } else {
        warn!(
            "Version {} installed with {} missing files",
            manifest.id,
            result.failures.len()
        );
    }

    Ok(result)
}
