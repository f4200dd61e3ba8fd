pub mod manifest;
pub mod version_file;

pub use manifest::{LatestVersions, VersionEntry, VersionManifest, LATEST, VERSION_MANIFEST_URL};
#[allow(unused_imports)]
pub use version_file::{
    current_os_name, Argument, ArgumentValue, Arguments, AssetIndexInfo, DownloadArtifact,
    LibDownloadArtifact, LibraryDownloads, LibraryEntry, LoggingClient, LoggingFile, LoggingInfo,
    OsRule, Rule, RuleAction, VersionDownloads, VersionJson,
};
