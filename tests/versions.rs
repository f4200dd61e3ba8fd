mod common;

use common::{Route, TestServer};
use lite_launcher_lib::commands;
use lite_launcher_lib::core::error::LauncherError;
use lite_launcher_lib::core::http::build_http_client;
use lite_launcher_lib::core::state::AppState;
use lite_launcher_lib::core::version::{VersionJson, VersionManifest};

fn catalog(server: &TestServer) -> String {
    serde_json::json!({
        "latest": { "release": "1.21", "snapshot": "24w33a" },
        "versions": [
            {
                "id": "24w33a", "type": "snapshot", "url": server.url("/v/24w33a.json"),
                "time": "2024-08-15T12:00:00+00:00", "releaseTime": "2024-08-15T12:00:00+00:00"
            },
            {
                "id": "1.21", "type": "release", "url": server.url("/v/1.21.json"),
                "time": "2024-06-13T08:24:03+00:00", "releaseTime": "2024-06-13T08:24:03+00:00"
            },
            {
                "id": "1.20.4", "type": "release", "url": server.url("/v/1.20.4.json"),
                "time": "2023-12-07T12:56:20+00:00", "releaseTime": "2023-12-07T12:56:20+00:00"
            }
        ]
    })
    .to_string()
}

fn version_json(id: &str) -> String {
    serde_json::json!({
        "id": id,
        "type": "release",
        "mainClass": "net.minecraft.client.main.Main",
        "assetIndex": { "id": "17", "url": "https://example.com/17.json" }
    })
    .to_string()
}

#[tokio::test]
async fn catalog_is_cached_after_first_fetch() {
    let server = TestServer::start().await;
    server.route("/manifest.json", Route::Ok(catalog(&server).into_bytes()));
    let dir = tempfile::tempdir().unwrap();
    let client = build_http_client().unwrap();
    let url = server.url("/manifest.json");

    let first = VersionManifest::fetch_cached(&client, dir.path(), &url)
        .await
        .unwrap();
    let second = VersionManifest::fetch_cached(&client, dir.path(), &url)
        .await
        .unwrap();

    assert_eq!(server.hits("/manifest.json"), 1);
    assert_eq!(first.versions.len(), second.versions.len());
    assert_eq!(second.find("latest").unwrap().id, "1.21");

    let cached = std::fs::read_to_string(dir.path().join("version_manifest.json")).unwrap();
    assert!(cached.contains("\n  \"latest\""));
}

#[tokio::test]
async fn version_json_is_read_from_disk_once_cached() {
    let server = TestServer::start().await;
    server.route("/manifest.json", Route::Ok(catalog(&server).into_bytes()));
    server.route("/v/1.21.json", Route::Ok(version_json("1.21").into_bytes()));
    let dir = tempfile::tempdir().unwrap();
    let client = build_http_client().unwrap();

    let manifest = VersionManifest::fetch_cached(&client, dir.path(), &server.url("/manifest.json"))
        .await
        .unwrap();
    let entry = manifest.find("1.21").unwrap();

    let fetched = VersionJson::resolve(&client, dir.path(), entry).await.unwrap();
    let cached = VersionJson::resolve(&client, dir.path(), entry).await.unwrap();

    assert_eq!(fetched.id, "1.21");
    assert_eq!(cached.id, "1.21");
    assert_eq!(server.hits("/v/1.21.json"), 1);
    assert!(dir.path().join("1.21").join("1.21.json").is_file());
}

#[tokio::test]
async fn commands_use_configured_catalog() {
    let server = TestServer::start().await;
    server.route("/manifest.json", Route::Ok(catalog(&server).into_bytes()));
    server.route("/v/1.21.json", Route::Ok(version_json("1.21").into_bytes()));
    let dir = tempfile::tempdir().unwrap();
    let mut state = AppState::new(dir.path()).unwrap();
    state.launcher_settings.version_manifest_url = server.url("/manifest.json");

    let releases = commands::list_versions(&state).await.unwrap();
    assert_eq!(releases, vec!["1.21".to_string(), "1.20.4".to_string()]);

    let resolved = commands::resolve_version(&state, "latest").await.unwrap();
    assert_eq!(resolved.id, "1.21");

    let missing = commands::resolve_version(&state, "0.0.1").await;
    assert!(matches!(missing, Err(LauncherError::VersionNotFound(id)) if id == "0.0.1"));
    assert_eq!(server.hits("/manifest.json"), 1);
}
