use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::task::{DownloadTask, FetchOutcome};
use super::verify;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::build_http_client;

/// Anything that can materialize a [`DownloadTask`] on disk.
///
/// The batch coordinator only talks to this trait, so the transport can be
/// swapped out (tests use an in-memory fetcher).
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, task: &DownloadTask) -> LauncherResult<FetchOutcome>;
}

/// Streaming, SHA-1 validated HTTP downloader.
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new() -> LauncherResult<Self> {
        Ok(Self::with_client(build_http_client()?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    // ── Single file download ────────────────────────────

    /// Make sure `dest` holds the artifact served at `url`.
    ///
    /// A file that already verifies against `expected_sha1` is kept and no
    /// request is made. Otherwise the body is streamed into `<dest>.part`,
    /// hashed on the way, and renamed over `dest` once it checks out. The
    /// temporary file is removed on every failure path.
    ///
    /// With an empty `expected_sha1` the file cannot be verified: an existing
    /// file is kept only when its length equals a non-zero `expected_size`.
    pub async fn download_file(
        &self,
        url: &str,
        dest: &Path,
        expected_sha1: &str,
        expected_size: u64,
    ) -> LauncherResult<FetchOutcome> {
        if is_up_to_date(dest, expected_sha1, expected_size).await {
            debug!("Up to date: {:?}", dest);
            return Ok(FetchOutcome::Skipped);
        }

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LauncherError::io(parent, e))?;
        }

        let part = PartFile::new(dest);
        let mut hasher = Sha1::new();
        let mut written: u64 = 0;

        // Scoped so the handle is closed before the rename (required on Windows).
        {
            let mut file = tokio::fs::File::create(part.path())
                .await
                .map_err(|e| LauncherError::io(part.path(), e))?;

            let mut body = response.bytes_stream();
            while let Some(chunk) = body.next().await {
                let chunk = chunk?;
                hasher.update(&chunk);
                file.write_all(&chunk)
                    .await
                    .map_err(|e| LauncherError::io(part.path(), e))?;
                written += chunk.len() as u64;
            }

            file.flush()
                .await
                .map_err(|e| LauncherError::io(part.path(), e))?;
        }

        if !expected_sha1.is_empty() {
            let actual = hex::encode(hasher.finalize());
            if !actual.eq_ignore_ascii_case(expected_sha1) {
                return Err(LauncherError::Sha1Mismatch {
                    path: dest.to_path_buf(),
                    expected: expected_sha1.to_string(),
                    actual,
                });
            }
        }

        part.persist().await?;

        debug!("Downloaded: {} -> {:?} ({} bytes)", url, dest, written);
        Ok(FetchOutcome::Downloaded { bytes: written })
    }
}

#[async_trait]
impl Fetch for Downloader {
    async fn fetch(&self, task: &DownloadTask) -> LauncherResult<FetchOutcome> {
        self.download_file(&task.url, &task.dest, &task.sha1, task.size)
            .await
    }
}

async fn is_up_to_date(dest: &Path, expected_sha1: &str, expected_size: u64) -> bool {
    if !expected_sha1.is_empty() {
        return verify::is_valid(dest, expected_sha1).await;
    }

    match tokio::fs::metadata(dest).await {
        Ok(meta) => expected_size > 0 && meta.is_file() && meta.len() == expected_size,
        Err(_) => false,
    }
}

/// Temporary sibling of a download destination.
///
/// Removed on drop unless [`PartFile::persist`] moved it into place, which
/// also covers a download future being dropped mid-stream.
struct PartFile {
    path: PathBuf,
    dest: PathBuf,
    armed: bool,
}

impl PartFile {
    fn new(dest: &Path) -> Self {
        let mut name = dest
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".part");

        Self {
            path: dest.with_file_name(name),
            dest: dest.to_path_buf(),
            armed: true,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(mut self) -> LauncherResult<()> {
        tokio::fs::rename(&self.path, &self.dest)
            .await
            .map_err(|e| LauncherError::io(&self.dest, e))?;
        self.armed = false;
        Ok(())
    }
}

impl Drop for PartFile {
    fn drop(&mut self) {
        if self.armed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_file_sits_next_to_destination() {
        let part = PartFile::new(Path::new("/store/1.21/client.jar"));
        assert_eq!(part.path(), Path::new("/store/1.21/client.jar.part"));
    }

    #[test]
    fn dropped_part_file_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("lib.jar");
        let part = PartFile::new(&dest);
        std::fs::write(part.path(), b"partial").unwrap();
        let part_path = part.path().to_path_buf();

        drop(part);

        assert!(!part_path.exists());
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn persisted_part_file_replaces_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("lib.jar");
        std::fs::write(&dest, b"old").unwrap();

        let part = PartFile::new(&dest);
        std::fs::write(part.path(), b"new").unwrap();
        let part_path = part.path().to_path_buf();
        part.persist().await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"new");
        assert!(!part_path.exists());
    }

    #[tokio::test]
    async fn unverifiable_file_is_kept_only_on_size_match() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("log4j2.xml");
        std::fs::write(&dest, b"12345").unwrap();

        assert!(is_up_to_date(&dest, "", 5).await);
        assert!(!is_up_to_date(&dest, "", 6).await);
        assert!(!is_up_to_date(&dest, "", 0).await);
    }
}
