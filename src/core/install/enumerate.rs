// ─── Task Enumeration ───
// Expands a version JSON and its asset index into one flat task list.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::assets::AssetIndex;
use crate::core::downloader::{DownloadTask, Downloader};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::version::{DownloadArtifact, VersionJson};

/// Task list that keeps the first task for any destination.
#[derive(Debug, Default)]
struct TaskList {
    tasks: Vec<DownloadTask>,
    seen: HashSet<PathBuf>,
}

impl TaskList {
    fn push(&mut self, task: DownloadTask) {
        if task.url.is_empty() {
            debug!("Skipping {:?}: no download URL", task.dest);
            return;
        }
        if self.seen.insert(task.dest.clone()) {
            self.tasks.push(task);
        }
    }

    fn push_artifact(&mut self, artifact: Option<&DownloadArtifact>, dest: PathBuf) {
        if let Some(a) = artifact {
            self.push(DownloadTask::new(&a.url, dest, a.size, &a.sha1));
        }
    }
}

/// Builds the download tasks for one version directory.
pub struct TaskEnumerator<'a> {
    downloader: &'a Downloader,
    resources_url: &'a str,
}

impl<'a> TaskEnumerator<'a> {
    pub fn new(downloader: &'a Downloader, resources_url: &'a str) -> Self {
        Self {
            downloader,
            resources_url,
        }
    }

    /// Every artifact of `version`, rooted at `version_dir`.
    ///
    /// The asset index is downloaded right away because its objects are part
    /// of the list; failing to fetch or parse it fails the whole enumeration.
    pub async fn enumerate(
        &self,
        version: &VersionJson,
        version_dir: &Path,
    ) -> LauncherResult<Vec<DownloadTask>> {
        let mut list = artifact_tasks(version, version_dir);
        let base_count = list.tasks.len();

        let index_task = asset_index_task(version, version_dir);
        let index = self
            .fetch_asset_index(&index_task)
            .await
            .map_err(|e| LauncherError::AssetIndex {
                url: index_task.url.clone(),
                source: Box::new(e),
            })?;
        list.push(index_task);

        let objects_dir = version_dir.join("assets").join("objects");
        let objects = index.download_tasks(&objects_dir, self.resources_url);
        let object_count = objects.len();
        for task in objects {
            list.push(task);
        }

        info!(
            "Enumerated {} tasks for {} ({} artifacts, {} asset objects)",
            list.tasks.len(),
            version.id,
            base_count,
            object_count
        );
        Ok(list.tasks)
    }

    async fn fetch_asset_index(&self, task: &DownloadTask) -> LauncherResult<AssetIndex> {
        self.downloader
            .download_file(&task.url, &task.dest, &task.sha1, task.size)
            .await?;
        AssetIndex::load(&task.dest).await
    }
}

/// Binaries, logging configuration and libraries, in that order.
fn artifact_tasks(version: &VersionJson, version_dir: &Path) -> TaskList {
    let mut list = TaskList::default();
    let downloads = &version.downloads;

    list.push_artifact(downloads.client.as_ref(), version_dir.join("client.jar"));
    list.push_artifact(downloads.server.as_ref(), version_dir.join("server.jar"));
    list.push_artifact(
        downloads.client_mappings.as_ref(),
        version_dir.join("client_mappings.txt"),
    );
    list.push_artifact(
        downloads.server_mappings.as_ref(),
        version_dir.join("server_mappings.txt"),
    );

    if let Some(client) = version.logging.as_ref().and_then(|l| l.client.as_ref()) {
        let file = &client.file;
        list.push(DownloadTask::new(
            &file.url,
            version_dir.join("logging").join(&file.id),
            file.size,
            &file.sha1,
        ));
    }

    let libs_dir = version_dir.join("libraries");
    for lib in &version.libraries {
        match lib.artifact() {
            Some(artifact) => list.push(DownloadTask::new(
                &artifact.url,
                libs_dir.join(&artifact.path),
                artifact.size,
                &artifact.sha1,
            )),
            None => debug!("Skipping library without artifact: {}", lib.name),
        }
    }

    list
}

fn asset_index_task(version: &VersionJson, version_dir: &Path) -> DownloadTask {
    let info = &version.asset_index;
    DownloadTask::new(
        &info.url,
        version_dir
            .join("assets")
            .join("indexes")
            .join(format!("{}.json", info.id)),
        info.size,
        &info.sha1,
    )
}
