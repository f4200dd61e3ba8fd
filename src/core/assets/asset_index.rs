use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::downloader::DownloadTask;
use crate::core::error::{LauncherError, LauncherResult};

/// Content-addressed asset CDN.
pub const RESOURCES_URL: &str = "https://resources.download.minecraft.net";

/// Top-level asset index JSON structure.
#[derive(Debug, Deserialize)]
pub struct AssetIndex {
    pub objects: HashMap<String, AssetObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetObject {
    pub hash: String,
    pub size: u64,
}

impl AssetIndex {
    /// Parse an asset index and check that every object hash is a SHA-1.
    pub fn parse(raw: &str) -> LauncherResult<Self> {
        let index: AssetIndex = serde_json::from_str(raw)?;

        if let Some((name, obj)) = index.objects.iter().find(|(_, obj)| !is_sha1_hex(&obj.hash)) {
            return Err(LauncherError::MalformedAssetHash {
                name: name.clone(),
                hash: obj.hash.clone(),
            });
        }

        Ok(index)
    }

    pub async fn load(path: &Path) -> LauncherResult<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| LauncherError::io(path, e))?;
        Self::parse(&raw)
    }

    /// One task per distinct object hash.
    ///
    /// Both the destination and the URL are derived from the hash alone, so
    /// logical names sharing content collapse to a single task.
    pub fn download_tasks(&self, objects_dir: &Path, resources_url: &str) -> Vec<DownloadTask> {
        let mut seen = HashSet::new();

        self.objects
            .values()
            .filter(|obj| seen.insert(obj.hash.as_str()))
            .map(|obj| {
                DownloadTask::new(
                    object_url(resources_url, &obj.hash),
                    object_path(objects_dir, &obj.hash),
                    obj.size,
                    obj.hash.clone(),
                )
            })
            .collect()
    }
}

/// `<objects>/<hash[0:2]>/<hash>`
pub fn object_path(objects_dir: &Path, hash: &str) -> PathBuf {
    objects_dir.join(&hash[..2]).join(hash)
}

/// `<base>/<hash[0:2]>/<hash>`
pub fn object_url(resources_url: &str, hash: &str) -> String {
    format!(
        "{}/{}/{}",
        resources_url.trim_end_matches('/'),
        &hash[..2],
        hash
    )
}

fn is_sha1_hex(hash: &str) -> bool {
    hash.len() == 40 && hash.bytes().all(|b| b.is_ascii_hexdigit())
}
