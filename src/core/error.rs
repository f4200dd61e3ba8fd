use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the entire launcher backend.
/// Every module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    // ── Integrity ───────────────────────────────────────
    #[error("SHA-1 mismatch for {path:?}: expected {expected}, got {actual}")]
    Sha1Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed hash {hash:?} for asset {name}")]
    MalformedAssetHash { name: String, hash: String },

    // ── Enumeration ─────────────────────────────────────
    #[error("Asset index {url} unavailable: {source}")]
    AssetIndex {
        url: String,
        source: Box<LauncherError>,
    },

    // ── Versions ────────────────────────────────────────
    #[error("Version {0} not found in version manifest")]
    VersionNotFound(String),

    // ── Batch ───────────────────────────────────────────
    #[error("Download cancelled")]
    Cancelled,

    // ── Launch ──────────────────────────────────────────
    #[error("Java not found in PATH: {0}")]
    JavaNotFound(String),

    #[error("Java execution failed: {0}")]
    JavaExecution(String),

    #[error("Install incomplete: {failed} artifact(s) failed to download")]
    IncompleteInstall { failed: usize },

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

impl LauncherError {
    /// Wrap an IO error with the path it happened at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LauncherError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<std::io::Error> for LauncherError {
    fn from(source: std::io::Error) -> Self {
        LauncherError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}
