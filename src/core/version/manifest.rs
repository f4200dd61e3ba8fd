// ─── Version Manifest ───
// Fetches the Mojang version catalog, cached on disk for an hour.

use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::error::{LauncherError, LauncherResult};

pub const VERSION_MANIFEST_URL: &str =
    "https://launchermeta.mojang.com/mc/game/version_manifest.json";

/// File name of the catalog cache inside the store root.
pub const CACHE_FILE: &str = "version_manifest.json";

/// Pseudo version id resolving to the latest release.
pub const LATEST: &str = "latest";

const CACHE_TTL_SECS: i64 = 60 * 60;

/// Top-level Mojang version manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionManifest {
    pub latest: LatestVersions,
    pub versions: Vec<VersionEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestVersions {
    pub release: String,
    pub snapshot: String,
}

/// A single entry in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub version_type: String,
    pub url: String,
    pub time: DateTime<Utc>,
    #[serde(rename = "releaseTime")]
    pub release_time: DateTime<Utc>,
}

impl VersionManifest {
    /// Load the catalog from `<store>/version_manifest.json` when it is less
    /// than an hour old, otherwise fetch it from `url` and rewrite the cache.
    pub async fn fetch_cached(
        client: &reqwest::Client,
        store_dir: &Path,
        url: &str,
    ) -> LauncherResult<Self> {
        let cache_path = store_dir.join(CACHE_FILE);

        if is_fresh(&cache_path).await {
            match Self::load(&cache_path).await {
                Ok(manifest) => {
                    info!("Using cached version manifest");
                    return Ok(manifest);
                }
                Err(e) => warn!("Ignoring unreadable version manifest cache: {}", e),
            }
        }

        let manifest = Self::fetch(client, url).await?;
        manifest.save(&cache_path).await?;
        Ok(manifest)
    }

    /// Fetch the version manifest using a shared HTTP client.
    pub async fn fetch(client: &reqwest::Client, url: &str) -> LauncherResult<Self> {
        info!("Downloading version manifest from {}", url);

        let response = client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let manifest: VersionManifest = response.json().await?;
        info!("Loaded {} versions from manifest", manifest.versions.len());
        Ok(manifest)
    }

    async fn load(path: &Path) -> LauncherResult<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| LauncherError::io(path, e))?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn save(&self, path: &Path) -> LauncherResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LauncherError::io(parent, e))?;
        }

        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| LauncherError::io(path, e))
    }

    /// Find a version entry by id. `"latest"` means the latest release.
    pub fn find(&self, id: &str) -> LauncherResult<&VersionEntry> {
        let id = if id == LATEST {
            self.latest.release.as_str()
        } else {
            id
        };

        self.versions
            .iter()
            .find(|v| v.id == id)
            .ok_or_else(|| LauncherError::VersionNotFound(id.to_string()))
    }

    /// List all official stable versions (release only).
    pub fn releases(&self) -> Vec<&VersionEntry> {
        self.versions
            .iter()
            .filter(|v| v.version_type == "release")
            .collect()
    }
}

/// Whether the file was modified less than an hour ago.
async fn is_fresh(path: &Path) -> bool {
    let modified = match tokio::fs::metadata(path).await.and_then(|m| m.modified()) {
        Ok(modified) => modified,
        Err(_) => return false,
    };

    is_within_ttl(modified, SystemTime::now())
}

fn is_within_ttl(modified: SystemTime, now: SystemTime) -> bool {
    let age = DateTime::<Utc>::from(now) - DateTime::<Utc>::from(modified);
    age < TimeDelta::seconds(CACHE_TTL_SECS)
}
