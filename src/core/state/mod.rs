mod app_state;

pub use app_state::{AppState, LauncherSettings, DEFAULT_STORE_DIR};
