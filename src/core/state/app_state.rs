use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::assets::RESOURCES_URL;
use crate::core::downloader::{Downloader, DEFAULT_CONCURRENCY};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::build_http_client;
use crate::core::version::VERSION_MANIFEST_URL;

/// Store root used when none is given on the command line.
pub const DEFAULT_STORE_DIR: &str = ".minecraft-lite";

const SETTINGS_FILE: &str = "launcher_settings.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherSettings {
    /// Parallel downloads per batch.
    pub concurrency: usize,
    pub username: String,
    pub version_manifest_url: String,
    /// Base URL of the content-addressed asset CDN.
    pub resources_url: String,
    /// Refuse to launch when any artifact failed to download.
    pub require_complete_install: bool,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            username: "Player".into(),
            version_manifest_url: VERSION_MANIFEST_URL.into(),
            resources_url: RESOURCES_URL.into(),
            require_complete_install: true,
        }
    }
}

pub struct AppState {
    pub data_dir: PathBuf,
    pub http_client: Client,
    pub downloader: Arc<Downloader>,
    pub launcher_settings: LauncherSettings,
}

impl AppState {
    /// Open (creating if needed) the store at `data_dir`.
    ///
    /// Settings are read from `launcher_settings.json`; a missing file is
    /// written with defaults, an unreadable one is ignored.
    pub fn new(data_dir: impl Into<PathBuf>) -> LauncherResult<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir).map_err(|e| LauncherError::io(&data_dir, e))?;

        let http_client = build_http_client()?;
        let downloader = Arc::new(Downloader::with_client(http_client.clone()));

        let settings_path = data_dir.join(SETTINGS_FILE);
        let launcher_settings = match load_settings_from_disk(&settings_path) {
            Some(settings) => settings,
            None => {
                let settings = LauncherSettings::default();
                if !settings_path.exists() {
                    save_settings_to_disk(&settings_path, &settings)?;
                }
                settings
            }
        };

        info!("Launcher store at {:?}", data_dir);

        Ok(Self {
            data_dir,
            http_client,
            downloader,
            launcher_settings,
        })
    }

    /// `<store>/<version_id>`
    pub fn version_dir(&self, version_id: &str) -> PathBuf {
        self.data_dir.join(version_id)
    }

    pub fn save_settings(&self) -> LauncherResult<()> {
        save_settings_to_disk(&self.data_dir.join(SETTINGS_FILE), &self.launcher_settings)
    }
}

fn load_settings_from_disk(path: &Path) -> Option<LauncherSettings> {
    let raw = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(settings) => {
            debug!("Loaded launcher settings from {:?}", path);
            Some(settings)
        }
        Err(e) => {
            warn!("Ignoring malformed launcher settings {:?}: {}", path, e);
            None
        }
    }
}

fn save_settings_to_disk(path: &Path, settings: &LauncherSettings) -> LauncherResult<()> {
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, json).map_err(|e| LauncherError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_store_gets_default_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("store");

        let state = AppState::new(&store).unwrap();

        assert_eq!(state.launcher_settings, LauncherSettings::default());
        assert!(store.join(SETTINGS_FILE).is_file());
        assert_eq!(state.version_dir("1.21"), store.join("1.21"));
    }

    #[test]
    fn partial_settings_fill_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{ "concurrency": 4, "require_complete_install": false }"#,
        )
        .unwrap();

        let state = AppState::new(dir.path()).unwrap();

        assert_eq!(state.launcher_settings.concurrency, 4);
        assert!(!state.launcher_settings.require_complete_install);
        assert_eq!(state.launcher_settings.username, "Player");
        assert_eq!(state.launcher_settings.resources_url, RESOURCES_URL);
    }

    #[test]
    fn malformed_settings_fall_back_without_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, "not json").unwrap();

        let state = AppState::new(dir.path()).unwrap();

        assert_eq!(state.launcher_settings, LauncherSettings::default());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "not json");
    }

    #[test]
    fn saved_settings_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(dir.path()).unwrap();
        state.launcher_settings.username = "Alex".into();
        state.save_settings().unwrap();

        let reopened = AppState::new(dir.path()).unwrap();
        assert_eq!(reopened.launcher_settings.username, "Alex");
    }
}
