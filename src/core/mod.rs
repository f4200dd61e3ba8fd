// ─── LiteLauncher Core ───
// Download engine and the thin layers around it.
//
// Architecture:
//   core/
//     version/    Version catalog + version JSON + OS rules
//     assets/     Asset index expansion
//     downloader/ Verified fetches and the batch worker pool
//     install/    Task enumeration + one-call version install
//     launch/     Classpath builder + process spawner
//     state/      Store root, settings and shared clients

pub mod assets;
pub mod downloader;
pub mod error;
pub mod http;
pub mod install;
pub mod launch;
pub mod state;
pub mod version;
