use std::path::PathBuf;

use crate::core::error::LauncherError;

/// A single file to download, with the SHA-1 it must hash to.
///
/// An empty `sha1` means the artifact cannot be verified; see
/// [`Downloader::download_file`](super::Downloader::download_file) for how
/// such files are treated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub url: String,
    pub dest: PathBuf,
    /// Advisory only, except for unverifiable files.
    pub size: u64,
    pub sha1: String,
}

impl DownloadTask {
    pub fn new(
        url: impl Into<String>,
        dest: impl Into<PathBuf>,
        size: u64,
        sha1: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            dest: dest.into(),
            size,
            sha1: sha1.into(),
        }
    }
}

/// What a successful fetch actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The file on disk already matched; no request was made.
    Skipped,
    /// The file was (re)downloaded.
    Downloaded { bytes: u64 },
}

#[derive(Debug)]
pub struct TaskFailure {
    pub url: String,
    pub error: LauncherError,
}

/// Aggregate outcome of one batch.
///
/// `total == completed + failures.len()` once the batch has finished.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub total: usize,
    /// Tasks that ended with a valid file, whether downloaded or not.
    pub completed: usize,
    /// Subset of `completed` that needed no request.
    pub skipped: usize,
    pub bytes_downloaded: u64,
    pub failures: Vec<TaskFailure>,
}

impl BatchResult {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_urls(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.url.as_str()).collect()
    }
}
