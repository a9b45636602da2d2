//! Update pipeline E2E tests

mod helper;

use std::sync::Arc;

use helper::{
    FakeRepository, artifact, build_jar, create_test_store, fabric_mod_json, forge_mods_toml,
    project,
};
use updatejson::service::UpdateService;
use updatejson::version::error::UpdateError;
use updatejson::version::store::{VersionQuery, VersionStore};

fn forge_jar(version: &str) -> Vec<u8> {
    build_jar(&[(
        "META-INF/mods.toml",
        &forge_mods_toml("examplemod", version, Some("forge")),
    )])
}

#[tokio::test(flavor = "multi_thread")]
async fn latest_ignores_loader_tags() {
    let (_temp_dir, store) = create_test_store();
    let repository = Arc::new(
        FakeRepository::new(project(100, 432))
            .with_artifact(artifact(1, 1, &["1.20.1"]), forge_jar("1.0"))
            .with_artifact(artifact(2, 2, &["1.20.1", "Forge"]), forge_jar("1.1")),
    );
    let service = UpdateService::new(store, repository, 4);

    let feed = service
        .get_update_json(100, "examplemod", "forge")
        .await
        .unwrap();

    assert_eq!(
        feed.promos.get("1.20.1-latest").map(String::as_str),
        Some("1.1")
    );
    assert!(!feed.promos.contains_key("Forge-latest"));
}

#[tokio::test(flavor = "multi_thread")]
async fn unsupported_game_stops_before_any_download() {
    let (_temp_dir, store) = create_test_store();
    let repository = Arc::new(
        FakeRepository::new(project(100, 78022))
            .with_artifact(artifact(1, 1, &["1.20.1"]), forge_jar("1.0")),
    );
    let service = UpdateService::new(Arc::clone(&store), Arc::clone(&repository) as _, 4);

    let result = service.get_update_json(100, "examplemod", "forge").await;

    assert!(matches!(result, Err(UpdateError::UnsupportedGame)));
    assert_eq!(repository.downloads(), 0);
    assert!(store.find(&VersionQuery::project(100)).unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_project_is_invalid_project_id() {
    let (_temp_dir, store) = create_test_store();
    let repository = Arc::new(FakeRepository::new(project(100, 432)));
    let service = UpdateService::new(store, repository, 4);

    let result = service.get_update_json(999, "examplemod", "forge").await;

    assert!(matches!(result, Err(UpdateError::InvalidProjectId)));
    assert_eq!(result.unwrap_err().to_string(), "invalid project id");
}

#[tokio::test(flavor = "multi_thread")]
async fn repeated_requests_download_each_file_once() {
    let (_temp_dir, store) = create_test_store();
    let repository = Arc::new(
        FakeRepository::new(project(100, 432))
            .with_artifact(artifact(1, 1, &["1.20.1"]), forge_jar("1.0"))
            .with_artifact(artifact(2, 2, &["1.20.1"]), forge_jar("1.1"))
            .with_artifact(
                artifact(3, 3, &["1.20.1"]),
                build_jar(&[("pack.mcmeta", "{}")]),
            ),
    );
    let service = UpdateService::new(Arc::clone(&store), Arc::clone(&repository) as _, 2);

    let first = service
        .get_update_json(100, "examplemod", "forge")
        .await
        .unwrap();
    let rows_after_first = store.find(&VersionQuery::project(100)).unwrap().len();
    let second = service
        .get_update_json(100, "examplemod", "forge")
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(repository.downloads(), 3);
    assert_eq!(rows_after_first, 3);
    assert_eq!(
        store.find(&VersionQuery::project(100)).unwrap().len(),
        rows_after_first
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn stored_versions_survive_revoked_credentials() {
    let (_temp_dir, store) = create_test_store();
    let repository = Arc::new(
        FakeRepository::new(project(100, 432))
            .with_artifact(artifact(1, 1, &["1.20.1"]), forge_jar("1.0"))
            .with_artifact(artifact(2, 2, &["1.19.4"]), forge_jar("0.9")),
    );
    let service = UpdateService::new(store, Arc::clone(&repository) as _, 4);
    let fresh = service
        .get_update_json(100, "examplemod", "forge")
        .await
        .unwrap();

    repository.revoke_credentials();
    let stale = service
        .get_update_json(100, "examplemod", "forge")
        .await
        .unwrap();

    assert_eq!(stale.promos, fresh.promos);
    assert_eq!(stale.homepage, helper::repository::WEBSITE);
}

#[tokio::test(flavor = "multi_thread")]
async fn dual_loader_jar_serves_both_loaders() {
    let (_temp_dir, store) = create_test_store();
    let jar = build_jar(&[
        ("META-INF/MANIFEST.MF", "Manifest-Version: 1.0\nImplementation-Version: 2.0.0\n"),
        (
            "META-INF/mods.toml",
            &forge_mods_toml("examplemod", "${file.jarVersion}", Some("forge")),
        ),
        ("fabric.mod.json", &fabric_mod_json("examplemod", "2.0.0")),
    ]);
    let repository = Arc::new(
        FakeRepository::new(project(100, 432))
            .with_artifact(artifact(1, 1, &["1.20.1", "Forge", "Fabric"]), jar),
    );
    let service = UpdateService::new(Arc::clone(&store), repository, 4);

    let forge = service
        .get_update_json(100, "examplemod", "forge")
        .await
        .unwrap();
    let fabric = service
        .get_update_json(100, "examplemod", "fabric")
        .await
        .unwrap();
    let quilt = service
        .get_update_json(100, "examplemod", "quilt")
        .await
        .unwrap();

    assert_eq!(
        forge.promos.get("1.20.1-latest").map(String::as_str),
        Some("2.0.0")
    );
    assert_eq!(forge.promos, fabric.promos);
    assert!(quilt.promos.is_empty());
    let rows = store.find(&VersionQuery::project(100)).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].loader, "forge,fabric");
}

#[tokio::test(flavor = "multi_thread")]
async fn neoforge_tag_widens_forge_build() {
    let (_temp_dir, store) = create_test_store();
    let repository = Arc::new(
        FakeRepository::new(project(100, 432)).with_artifact(
            artifact(1, 1, &["1.20.1", "Forge", "NeoForge"]),
            forge_jar("3.1"),
        ),
    );
    let service = UpdateService::new(store, repository, 4);

    let feed = service
        .get_update_json(100, "examplemod", "neoforge")
        .await
        .unwrap();

    assert_eq!(
        feed.promos.get("1.20.1-recommended").map(String::as_str),
        Some("3.1")
    );
}
