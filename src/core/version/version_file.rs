// ─── Version File ───
// Parses a Mojang version JSON, caches it per version and evaluates OS rules.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use super::manifest::VersionEntry;
use crate::core::error::{LauncherError, LauncherResult};

const DEFAULT_MAIN_CLASS: &str = "net.minecraft.client.main.Main";

/// A fully parsed Mojang version JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionJson {
    pub id: String,
    #[serde(rename = "type", default)]
    pub version_type: String,
    #[serde(default = "default_main_class")]
    pub main_class: String,
    #[serde(default)]
    pub assets: Option<String>,
    #[serde(default)]
    pub java_version: Option<JavaVersionInfo>,
    #[serde(default)]
    pub downloads: VersionDownloads,
    pub asset_index: AssetIndexInfo,
    #[serde(default)]
    pub libraries: Vec<LibraryEntry>,
    #[serde(default)]
    pub logging: Option<LoggingInfo>,
    #[serde(default)]
    pub arguments: Option<Arguments>,
}

fn default_main_class() -> String {
    DEFAULT_MAIN_CLASS.to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaVersionInfo {
    #[serde(default)]
    pub component: String,
    pub major_version: u32,
}

/// Top-level binaries. Older versions lack mappings and sometimes the server.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionDownloads {
    pub client: Option<DownloadArtifact>,
    pub server: Option<DownloadArtifact>,
    pub client_mappings: Option<DownloadArtifact>,
    pub server_mappings: Option<DownloadArtifact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadArtifact {
    #[serde(default)]
    pub sha1: String,
    #[serde(default)]
    pub size: u64,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetIndexInfo {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub sha1: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub total_size: u64,
}

// ─── Logging configuration ───

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingInfo {
    pub client: Option<LoggingClient>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingClient {
    /// JVM argument template, e.g. `-Dlog4j.configurationFile=${path}`.
    #[serde(default)]
    pub argument: String,
    pub file: LoggingFile,
    #[serde(rename = "type", default)]
    pub log_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingFile {
    pub id: String,
    #[serde(default)]
    pub sha1: String,
    #[serde(default)]
    pub size: u64,
    pub url: String,
}

// ─── Arguments ───

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Arguments {
    #[serde(default)]
    pub game: Vec<Argument>,
    #[serde(default)]
    pub jvm: Vec<Argument>,
}

/// A launch argument: either a literal or a value guarded by rules.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Argument {
    Plain(String),
    Conditional {
        rules: Vec<Rule>,
        value: ArgumentValue,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ArgumentValue {
    Single(String),
    Many(Vec<String>),
}

// ─── Library Entry with Rules ───

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryEntry {
    pub name: String,
    #[serde(default)]
    pub downloads: Option<LibraryDownloads>,
    #[serde(default)]
    pub rules: Option<Vec<Rule>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryDownloads {
    pub artifact: Option<LibDownloadArtifact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibDownloadArtifact {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub sha1: String,
    #[serde(default)]
    pub size: u64,
    pub url: String,
}

// ─── OS Rule Evaluation ───

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Rule {
    pub action: RuleAction,
    #[serde(default)]
    pub os: Option<OsRule>,
    /// Launcher feature flags (demo user, custom resolution, ...).
    #[serde(default)]
    pub features: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OsRule {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arch: Option<String>,
}

impl LibraryEntry {
    /// The downloadable jar, if this entry has one.
    ///
    /// Metadata-only and classifier-only entries have no artifact or an empty
    /// path; they are skipped, never treated as errors.
    pub fn artifact(&self) -> Option<&LibDownloadArtifact> {
        self.downloads
            .as_ref()?
            .artifact
            .as_ref()
            .filter(|a| !a.path.is_empty())
    }

    /// Evaluate whether this library should be included for the current OS.
    ///
    /// Rules logic:
    /// - If no rules → allowed.
    /// - Process rules top-to-bottom. Start with "disallowed".
    /// - Each rule either sets "allow" or "disallow" if the OS matches (or if no OS is specified).
    /// - Final state determines inclusion.
    pub fn is_allowed_for_current_os(&self) -> bool {
        match &self.rules {
            Some(rules) => rules_allow(rules, current_os_name()),
            None => true,
        }
    }
}

fn rules_allow(rules: &[Rule], os_name: &str) -> bool {
    let mut allowed = false;

    for rule in rules {
        // Feature-gated rules never match: no launcher features are enabled.
        if rule.features.is_some() {
            continue;
        }

        let os_matches = match rule.os.as_ref().and_then(|os| os.name.as_deref()) {
            None => true,
            Some(name) => name == os_name,
        };

        if os_matches {
            allowed = rule.action == RuleAction::Allow;
        }
    }

    allowed
}

/// Get the Mojang OS name for the current platform.
pub fn current_os_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "macos") {
        "osx"
    } else {
        "linux"
    }
}

impl VersionJson {
    /// Path of the cached version JSON: `<store>/<id>/<id>.json`.
    pub fn cache_path(store_dir: &Path, version_id: &str) -> PathBuf {
        store_dir
            .join(version_id)
            .join(format!("{}.json", version_id))
    }

    /// Resolve a version, preferring the on-disk copy over the network.
    ///
    /// A cached file is never revalidated.
    pub async fn resolve(
        client: &reqwest::Client,
        store_dir: &Path,
        entry: &VersionEntry,
    ) -> LauncherResult<Self> {
        if let Some(cached) = Self::load_cached(store_dir, &entry.id).await? {
            debug!("Using cached version JSON for {}", entry.id);
            return Ok(cached);
        }

        Self::fetch_and_cache(client, store_dir, &entry.url).await
    }

    /// Read `<store>/<id>/<id>.json`, or `None` when it does not exist.
    pub async fn load_cached(store_dir: &Path, version_id: &str) -> LauncherResult<Option<Self>> {
        let path = Self::cache_path(store_dir, version_id);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(LauncherError::io(path, e)),
        };

        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Fetch and parse a version JSON, then save the raw body to the cache.
    pub async fn fetch_and_cache(
        client: &reqwest::Client,
        store_dir: &Path,
        url: &str,
    ) -> LauncherResult<Self> {
        info!("Fetching version JSON from {}", url);

        let response = client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let raw = response.text().await?;
        let version_json: VersionJson = serde_json::from_str(&raw)?;
        Self::save_to(&raw, store_dir, &version_json.id).await?;
        Ok(version_json)
    }

    /// Save the raw version JSON to its cache path.
    pub async fn save_to(raw_json: &str, store_dir: &Path, version_id: &str) -> LauncherResult<()> {
        let path = Self::cache_path(store_dir, version_id);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LauncherError::io(parent, e))?;
        }

        tokio::fs::write(&path, raw_json)
            .await
            .map_err(|e| LauncherError::io(path, e))?;
        Ok(())
    }

    /// Asset index name passed to the game (`--assetIndex`).
    pub fn asset_index_name(&self) -> &str {
        self.assets.as_deref().unwrap_or(&self.asset_index.id)
    }

    /// Get the required Java major version from the version JSON.
    pub fn required_java_major(&self) -> u32 {
        self.java_version
            .as_ref()
            .map(|j| j.major_version)
            .unwrap_or(17)
    }
}
