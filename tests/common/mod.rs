use clap::Parser;
use lystforge::catalog::{App, CatalogSource, Version};
use lystforge::cli::Cli;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// In-memory catalog: a fixed app list per platform plus versions per slug.
/// Stands in for the HTTP client behind the same boundary the orchestrator
/// uses.
#[derive(Default)]
pub struct StaticCatalog {
    apps: BTreeMap<String, Vec<App>>,
    versions: BTreeMap<String, Vec<Version>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_app(mut self, platform: &str, app: Value, versions: Vec<Value>) -> Self {
        let app: App = serde_json::from_value(app).expect("valid app fixture");
        if let Some(slug) = app.slug.clone() {
            self.versions.insert(
                slug,
                versions
                    .into_iter()
                    .map(|v| serde_json::from_value(v).expect("valid version fixture"))
                    .collect(),
            );
        }
        self.apps.entry(platform.to_string()).or_default().push(app);
        self
    }
}

impl CatalogSource for StaticCatalog {
    fn list_apps(&self, platform: &str) -> Vec<App> {
        self.apps.get(platform).cloned().unwrap_or_default()
    }

    fn app_versions(&self, slug: &str) -> Vec<Version> {
        self.versions.get(slug).cloned().unwrap_or_default()
    }
}

/// Builds a `Cli` whose four output trees all live under `root`.
pub fn cli_for(root: &Path, extra: &[&str]) -> Cli {
    let altstore = root.join("repo");
    let fdroid = root.join("fdroid-repo");
    let homebrew = root.join("homebrew-tap");
    let winget = root.join("winget-repo");
    let mut args = vec![
        "lystforge".to_string(),
        format!("--altstore-output={}", altstore.display()),
        format!("--fdroid-output={}", fdroid.display()),
        format!("--homebrew-output={}", homebrew.display()),
        format!("--winget-output={}", winget.display()),
    ];
    args.extend(extra.iter().map(|s| s.to_string()));
    Cli::parse_from(args)
}

pub fn read_json(path: &Path) -> Value {
    let raw = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("read {}: {e}", path.display()));
    serde_json::from_str(&raw).expect("valid json output")
}
