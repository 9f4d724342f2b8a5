mod common;

use common::{cli_for, read_json, StaticCatalog};
use lystforge::commands::build;
use serde_json::json;
use tempfile::TempDir;

/// Three-app batch: one writes, one has no artifact, one breaks after
/// resolution. The target still counts as a success because at least one
/// app was written.
#[test]
fn one_broken_app_never_stops_the_batch() {
    let tmp = TempDir::new().unwrap();
    let catalog = StaticCatalog::new()
        .with_app(
            "Windows",
            json!({"name": "Good App", "slug": "good"}),
            vec![json!({
                "version": "1.0.0",
                "platforms": ["Windows"],
                "downloads": {"Windows": {"exe": "https://x/good.exe"}}
            })],
        )
        .with_app(
            "Windows",
            json!({"name": "Artifactless", "slug": "artifactless"}),
            vec![json!({
                "version": "2.0.0",
                "platforms": ["Windows"],
                "downloads": {}
            })],
        )
        .with_app(
            "Windows",
            // Resolves a URL but the version record has no version string:
            // a structural failure past RESOLVED.
            json!({"name": "Broken Record", "slug": "broken"}),
            vec![json!({
                "platforms": ["Windows"],
                "downloads": {"Windows": {"msi": "https://x/broken.msi"}}
            })],
        );

    let cli = cli_for(tmp.path(), &["--target", "winget"]);
    let summary = build::run(&cli, &catalog).unwrap();

    assert_eq!(summary.targets.len(), 1);
    let target = &summary.targets[0];
    assert_eq!(target.written, 1);
    assert_eq!(target.skipped, 1);
    assert_eq!(target.failed, 1);
    assert!(target.success);
    assert!(summary.all_succeeded());

    // Only the good app landed on disk.
    assert!(tmp
        .path()
        .join("winget-repo/manifests/OpenLyst/GoodApp/1.0.0/OpenLyst.GoodApp.yaml")
        .exists());
    assert!(!tmp.path().join("winget-repo/manifests/OpenLyst/BrokenRecord").exists());
}

#[test]
fn target_with_zero_outputs_fails_the_run() {
    let tmp = TempDir::new().unwrap();
    let catalog = StaticCatalog::new().with_app(
        "Windows",
        json!({"name": "No Artifacts", "slug": "nothing"}),
        vec![json!({"version": "1.0", "platforms": ["Windows"]})],
    );
    let cli = cli_for(tmp.path(), &["--target", "winget"]);
    let summary = build::run(&cli, &catalog).unwrap();

    assert!(!summary.all_succeeded());
    // The info file is still produced for the empty repository.
    let info = read_json(&tmp.path().join("winget-repo/repo-info.json"));
    assert_eq!(info["manifest_count"], 0);
}

#[test]
fn slugless_apps_count_as_failures() {
    let tmp = TempDir::new().unwrap();
    let catalog = StaticCatalog::new()
        .with_app(
            "iOS",
            json!({"name": "No Slug"}),
            vec![],
        )
        .with_app(
            "iOS",
            json!({"name": "Fine", "slug": "fine"}),
            vec![json!({
                "version": "1.0",
                "platforms": ["iOS"],
                "downloads": {"iOS": "https://x/fine.ipa"}
            })],
        );
    let cli = cli_for(tmp.path(), &["--target", "altstore"]);
    let summary = build::run(&cli, &catalog).unwrap();

    let target = &summary.targets[0];
    assert_eq!(target.written, 1);
    assert_eq!(target.failed, 1);
    assert!(target.success);
}

#[test]
fn empty_catalog_fails_every_selected_target() {
    let tmp = TempDir::new().unwrap();
    let cli = cli_for(tmp.path(), &["--target", "altstore,fdroid"]);
    let summary = build::run(&cli, &StaticCatalog::new()).unwrap();

    assert_eq!(summary.targets.len(), 2);
    assert!(summary.targets.iter().all(|t| !t.success));
    // Aggregates with no apps are not written at all.
    assert!(!tmp.path().join("repo/apps.json").exists());
    assert!(!tmp.path().join("fdroid-repo/index.json").exists());
}
