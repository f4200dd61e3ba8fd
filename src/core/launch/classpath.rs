// ─── Classpath Builder ───
// Collects the jars of an installed version into a `-cp` value.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::version::VersionJson;

/// Ordered classpath entries for `manifest` installed under `version_dir`.
///
/// Libraries come first, in manifest order, followed by `client.jar`. A
/// library is included only when its OS rules allow it, it declares an
/// artifact, and that artifact exists on disk. Missing jars are logged and
/// left out so a partial install still produces a usable list.
pub fn build_classpath(manifest: &VersionJson, version_dir: &Path) -> Vec<PathBuf> {
    let libs_dir = version_dir.join("libraries");
    let mut entries = Vec::with_capacity(manifest.libraries.len() + 1);

    for lib in &manifest.libraries {
        if !lib.is_allowed_for_current_os() {
            debug!("Library {} excluded by OS rules", lib.name);
            continue;
        }
        let Some(artifact) = lib.artifact() else {
            continue;
        };

        let path = libs_dir.join(&artifact.path);
        if path.is_file() {
            entries.push(path);
        } else {
            warn!("Library jar missing, left off the classpath: {:?}", path);
        }
    }

    entries.push(version_dir.join("client.jar"));
    entries
}

/// Join entries with the platform separator.
pub fn join_classpath(entries: &[PathBuf]) -> String {
    entries
        .iter()
        .map(|p| safe_path_str(p))
        .collect::<Vec<_>>()
        .join(get_classpath_separator())
}

pub fn get_classpath_separator() -> &'static str {
    if cfg!(target_os = "windows") {
        ";"
    } else {
        ":"
    }
}

/// Absolute, Java-friendly rendering of `path`.
pub fn safe_path_str(path: &Path) -> String {
    let resolved = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let text = resolved.to_string_lossy().to_string();

    // Java rejects extended-length `\\?\` paths on the classpath.
    #[cfg(target_os = "windows")]
    {
        if let Some(stripped) = text.strip_prefix(r"\\?\") {
            return stripped.to_string();
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(os: &str) -> VersionJson {
        serde_json::from_value(serde_json::json!({
            "id": "1.21",
            "assetIndex": { "id": "17", "url": "https://example.com/17.json" },
            "libraries": [
                {
                    "name": "present",
                    "downloads": { "artifact": { "path": "a/present.jar", "sha1": "", "size": 0, "url": "u" } }
                },
                {
                    "name": "absent",
                    "downloads": { "artifact": { "path": "a/absent.jar", "sha1": "", "size": 0, "url": "u" } }
                },
                { "name": "metadata-only" },
                {
                    "name": "other-os",
                    "downloads": { "artifact": { "path": "a/other.jar", "sha1": "", "size": 0, "url": "u" } },
                    "rules": [ { "action": "allow", "os": { "name": os } } ]
                }
            ]
        }))
        .unwrap()
    }

    fn foreign_os() -> &'static str {
        if crate::core::version::current_os_name() == "linux" {
            "windows"
        } else {
            "linux"
        }
    }

    #[test]
    fn only_existing_allowed_libraries_then_client() {
        let dir = tempfile::tempdir().unwrap();
        let libs = dir.path().join("libraries").join("a");
        std::fs::create_dir_all(&libs).unwrap();
        std::fs::write(libs.join("present.jar"), b"jar").unwrap();
        std::fs::write(libs.join("other.jar"), b"jar").unwrap();

        let entries = build_classpath(&manifest(foreign_os()), dir.path());

        assert_eq!(
            entries,
            vec![libs.join("present.jar"), dir.path().join("client.jar")]
        );
    }

    #[test]
    fn matching_os_rule_keeps_library() {
        let dir = tempfile::tempdir().unwrap();
        let libs = dir.path().join("libraries").join("a");
        std::fs::create_dir_all(&libs).unwrap();
        std::fs::write(libs.join("other.jar"), b"jar").unwrap();

        let os = crate::core::version::current_os_name();
        let entries = build_classpath(&manifest(os), dir.path());

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], libs.join("other.jar"));
    }

    #[test]
    fn join_uses_platform_separator() {
        let joined = join_classpath(&[PathBuf::from("/x/a.jar"), PathBuf::from("/x/b.jar")]);
        assert_eq!(
            joined,
            format!("/x/a.jar{}/x/b.jar", get_classpath_separator())
        );
    }
}
