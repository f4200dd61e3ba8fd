// ─── Launch Task ───
// Runs the game from an installed version directory.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::version::VersionJson;

use super::classpath::{build_classpath, join_classpath, safe_path_str};

/// Full `java` argument list for an offline session.
///
/// Fails when `client.jar` is missing, since nothing could start.
pub fn build_launch_args(
    manifest: &VersionJson,
    version_dir: &Path,
    username: &str,
    session_id: &Uuid,
) -> LauncherResult<Vec<String>> {
    let client_jar = version_dir.join("client.jar");
    if !client_jar.is_file() {
        return Err(LauncherError::Other(format!(
            "client.jar missing at {:?}; install the version first",
            client_jar
        )));
    }

    let classpath = join_classpath(&build_classpath(manifest, version_dir));
    debug!("Classpath len={}", classpath.len());

    let game_dir = version_dir.join("game");
    let assets_dir = version_dir.join("assets");

    Ok(vec![
        "-cp".into(),
        classpath,
        manifest.main_class.clone(),
        "--username".into(),
        username.into(),
        "--version".into(),
        manifest.id.clone(),
        "--gameDir".into(),
        safe_path_str(&game_dir),
        "--assetsDir".into(),
        safe_path_str(&assets_dir),
        "--assetIndex".into(),
        manifest.asset_index_name().into(),
        "--userType".into(),
        "legacy".into(),
        "--accessToken".into(),
        "0".into(),
        "--uuid".into(),
        session_id.to_string(),
    ])
}

/// Launch the game and wait for it to exit.
///
/// Standard streams are inherited. A non-zero exit is reported as
/// [`LauncherError::JavaExecution`].
pub async fn launch(
    manifest: &VersionJson,
    store_dir: &Path,
    username: &str,
) -> LauncherResult<ExitStatus> {
    let java_bin = locate_java()?;
    let version_dir = store_dir.join(&manifest.id);

    let game_dir = version_dir.join("game");
    tokio::fs::create_dir_all(&game_dir)
        .await
        .map_err(|e| LauncherError::io(&game_dir, e))?;

    let session_id = Uuid::new_v4();
    let args = build_launch_args(manifest, &version_dir, username, &session_id)?;

    let mut cmd = Command::new(&java_bin);
    cmd.args(&args)
        .current_dir(&game_dir)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    info!(
        "Launching {} as {} with Java: {:?} (Java {} expected)",
        manifest.id,
        username,
        java_bin,
        manifest.required_java_major()
    );
    debug!("Command (copy/paste): {}", format_command_for_logs(&java_bin, &args));

    let status = cmd
        .status()
        .await
        .map_err(|e| LauncherError::JavaExecution(e.to_string()))?;

    if !status.success() {
        return Err(LauncherError::JavaExecution(format!(
            "game exited with {}",
            status
        )));
    }

    info!("Game exited normally");
    Ok(status)
}

fn locate_java() -> LauncherResult<PathBuf> {
    which::which("java").map_err(|e| LauncherError::JavaNotFound(e.to_string()))
}

fn format_command_for_logs(program: &Path, args: &[String]) -> String {
    std::iter::once(shell_escape(&program.to_string_lossy()))
        .chain(args.iter().map(|arg| shell_escape(arg)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell_escape(raw: &str) -> String {
    if raw.is_empty() {
        return "\"\"".to_string();
    }

    if raw.chars().all(|ch| {
        ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '/' | ':' | '\\' | '=')
    }) {
        return raw.to_string();
    }

    format!("\"{}\"", raw.replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> VersionJson {
        serde_json::from_value(serde_json::json!({
            "id": "1.21",
            "mainClass": "net.minecraft.client.main.Main",
            "assets": "17",
            "assetIndex": { "id": "17", "url": "https://example.com/17.json" }
        }))
        .unwrap()
    }

    fn value_after<'a>(args: &'a [String], flag: &str) -> &'a str {
        let idx = args.iter().position(|a| a == flag).unwrap();
        &args[idx + 1]
    }

    #[test]
    fn args_carry_session_and_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("client.jar"), b"jar").unwrap();
        let session = Uuid::new_v4();

        let args = build_launch_args(&manifest(), dir.path(), "Steve", &session).unwrap();

        assert_eq!(args[0], "-cp");
        assert!(args[1].ends_with("client.jar"));
        assert_eq!(args[2], "net.minecraft.client.main.Main");
        assert_eq!(value_after(&args, "--username"), "Steve");
        assert_eq!(value_after(&args, "--version"), "1.21");
        assert_eq!(value_after(&args, "--assetIndex"), "17");
        assert_eq!(value_after(&args, "--accessToken"), "0");
        assert_eq!(value_after(&args, "--userType"), "legacy");
        assert_eq!(value_after(&args, "--uuid"), session.to_string());
        assert!(value_after(&args, "--gameDir").ends_with("game"));
        assert!(value_after(&args, "--assetsDir").ends_with("assets"));
    }

    #[test]
    fn missing_client_jar_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = build_launch_args(&manifest(), dir.path(), "Steve", &Uuid::new_v4());
        assert!(matches!(result, Err(LauncherError::Other(_))));
    }

    #[test]
    fn shell_escape_quotes_spaces() {
        assert_eq!(shell_escape("plain-arg"), "plain-arg");
        assert_eq!(shell_escape("two words"), "\"two words\"");
        assert_eq!(shell_escape(""), "\"\"");
    }
}
