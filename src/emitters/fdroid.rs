//! F-Droid repository emitter.
//!
//! Writes one `metadata/<package>.yml` descriptor per app and one
//! aggregate `index.json`. Per-app timestamp fields in the index carry the
//! orchestrator run time, not any version's release date.

use super::{write_json, EmitContext, EmitError, Emitter};
use crate::catalog::{App, Version};
use crate::domain::models::AppOutcome;
use crate::services::naming::{sanitize, NameStyle};
use crate::services::resolver::{self, ANDROID};
use crate::services::versioncode::derive_code;
use crate::services::categories;
use serde_json::{json, Map, Value};
use std::path::PathBuf;

/// Payload-size bound on published build entries per package.
const MAX_BUILDS: usize = 5;
const SUMMARY_LIMIT: usize = 80;

const REPO_NAME: &str = "OpenLyst F-Droid Repository";
const REPO_DESCRIPTION: &str = "Free and open source Android applications from OpenLyst";
const DEFAULT_WEBSITE: &str = "https://openlyst.ink";

pub struct FdroidEmitter {
    out_dir: PathBuf,
    /// Published address of this repository, recorded in the index header.
    address: String,
    apps: Vec<Value>,
    packages: Map<String, Value>,
}

impl FdroidEmitter {
    pub fn new(out_dir: PathBuf, address: String) -> Self {
        Self {
            out_dir,
            address,
            apps: Vec::new(),
            packages: Map::new(),
        }
    }
}

impl Emitter for FdroidEmitter {
    fn name(&self) -> &'static str {
        "fdroid"
    }

    fn catalog_platform(&self) -> &'static str {
        ANDROID
    }

    fn emit_app(
        &mut self,
        ctx: &EmitContext,
        app: &App,
        versions: &[Version],
    ) -> anyhow::Result<AppOutcome> {
        let Some(latest) = versions.first() else {
            return Ok(AppOutcome::Skipped {
                reason: "no versions".to_string(),
            });
        };
        if !versions.iter().any(|v| resolver::resolve(v, ANDROID).is_some()) {
            return Ok(AppOutcome::Skipped {
                reason: "no Android artifact in any version".to_string(),
            });
        }

        let name = app
            .name
            .as_deref()
            .ok_or(EmitError::MissingAppField("name"))?;
        let package_id = package_id(app, name);
        let timestamp = ctx.epoch_millis();

        let metadata_path = self
            .out_dir
            .join("metadata")
            .join(format!("{package_id}.yml"));
        if let Some(parent) = metadata_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&metadata_path, metadata_yml(app, name, latest, versions))?;

        self.apps.push(json!({
            "packageName": package_id,
            "name": name,
            "summary": app.subtitle.as_deref().unwrap_or(""),
            "icon": app.icon_url.as_deref().unwrap_or(""),
            "description": app.localized_description.as_deref().unwrap_or(""),
            "license": "Unknown",
            "categories": [categories::fdroid_category(app.category.as_deref().unwrap_or("other"))],
            "webSite": app.website.as_deref().unwrap_or(DEFAULT_WEBSITE),
            "added": timestamp,
            "lastUpdated": timestamp,
        }));

        let mut builds = Vec::new();
        for version in versions.iter().take(MAX_BUILDS) {
            let Some(apk_url) = resolver::resolve(version, ANDROID) else { continue };
            let version_name = version.version_or_default();
            let size = if ctx.calculate_sizes {
                ctx.inspector.content_length(&apk_url).unwrap_or(0)
            } else {
                0
            };
            builds.push(json!({
                "added": timestamp,
                "apkName": format!("{package_id}-{version_name}.apk"),
                "hash": "",
                "hashType": "sha256",
                "minSdkVersion": 21,
                "packageName": package_id,
                "size": size,
                "targetSdkVersion": 34,
                "versionCode": derive_code(&version_name),
                "versionName": version_name,
            }));
        }
        if !builds.is_empty() {
            self.packages.insert(package_id, Value::Array(builds));
        }

        Ok(AppOutcome::Written {
            files: vec![metadata_path],
        })
    }

    fn finalize(&mut self, ctx: &EmitContext) -> anyhow::Result<Vec<PathBuf>> {
        if self.apps.is_empty() {
            return Ok(Vec::new());
        }

        let index = json!({
            "repo": {
                "name": REPO_NAME,
                "description": REPO_DESCRIPTION,
                "icon": "icon.png",
                "address": self.address,
                "timestamp": ctx.epoch_millis(),
                "version": 21,
            },
            "requests": {"install": [], "uninstall": []},
            "apps": std::mem::take(&mut self.apps),
            "packages": std::mem::take(&mut self.packages),
        });
        let index_path = self.out_dir.join("index.json");
        write_json(&index_path, &index)?;
        Ok(vec![index_path])
    }
}

/// Package identifier: the catalog's bundle identifier when usable,
/// otherwise a reverse-DNS id derived from the sanitized name.
fn package_id(app: &App, name: &str) -> String {
    match app
        .bundle_identifier
        .as_deref()
        .filter(|id| !id.is_empty() && *id != "unknown")
    {
        Some(id) => id.to_string(),
        None => format!("ink.openlyst.{}", sanitize(name, NameStyle::Package)),
    }
}

fn metadata_yml(app: &App, name: &str, latest: &Version, versions: &[Version]) -> String {
    let latest_name = latest.version_or_default();
    let summary: String = app
        .subtitle
        .as_deref()
        .unwrap_or(name)
        .chars()
        .take(SUMMARY_LIMIT)
        .collect();
    let description = app
        .localized_description
        .as_deref()
        .or(app.description.as_deref())
        .unwrap_or("A free and open source app.");
    let website = app.website.as_deref().unwrap_or(DEFAULT_WEBSITE);
    let source_code = app.source_code.as_deref().unwrap_or("");

    let mut out = format!(
        "Categories:\n  - {category}\nLicense: Unknown\nAuthorName: {author}\nAuthorWebSite: {website}\nWebSite: {website}\nSourceCode: {source_code}\nIssueTracker: {issues}\n\nAutoName: {name}\nSummary: {summary}\n\nDescription: |\n    {description}\n\nRepoType: git\nRepo: {source_code}\n\nBuilds:\n",
        category = categories::fdroid_category(app.category.as_deref().unwrap_or("other")),
        author = app.developer_name.as_deref().unwrap_or("OpenLyst Developer"),
        issues = app.issue_tracker.as_deref().unwrap_or(""),
    );

    for version in versions.iter().take(MAX_BUILDS) {
        if resolver::resolve(version, ANDROID).is_none() {
            continue;
        }
        let version_name = version.version_or_default();
        out.push_str(&format!(
            "\n  - versionName: '{version_name}'\n    versionCode: {code}\n    commit: v{version_name}\n    subdir: app\n    gradle:\n      - yes\n",
            code = derive_code(&version_name),
        ));
    }

    out.push_str(&format!(
        "\nCurrentVersion: '{latest_name}'\nCurrentVersionCode: {code}\n",
        code = derive_code(&latest_name),
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn app(value: Value) -> App {
        serde_json::from_value(value).unwrap()
    }

    fn version(value: Value) -> Version {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn package_id_prefers_bundle_identifier() {
        let a = app(json!({"bundleIdentifier": "com.example.delta"}));
        assert_eq!(package_id(&a, "Delta"), "com.example.delta");
    }

    #[test]
    fn package_id_falls_back_to_reverse_dns() {
        let a = app(json!({}));
        assert_eq!(package_id(&a, "My App"), "ink.openlyst.myapp");
        let a = app(json!({"bundleIdentifier": "unknown"}));
        assert_eq!(package_id(&a, "My App"), "ink.openlyst.myapp");
    }

    #[test]
    fn metadata_lists_only_versions_with_apks() {
        let a = app(json!({"name": "Demo", "category": "social"}));
        let versions = vec![
            version(json!({"version": "2.0", "downloads": {"Android": "https://x/2.apk"}})),
            version(json!({"version": "1.9"})),
            version(json!({"version": "1.8", "downloads": {"Android": {"apk": "https://x/1.8.apk"}}})),
        ];
        let yml = metadata_yml(&a, "Demo", &versions[0], &versions);
        assert!(yml.contains("Categories:\n  - Internet"));
        assert!(yml.contains("versionName: '2.0'"));
        assert!(!yml.contains("versionName: '1.9'"));
        assert!(yml.contains("versionName: '1.8'"));
        assert!(yml.contains("CurrentVersion: '2.0'"));
        assert!(yml.contains("CurrentVersionCode: 20000"));
    }
}
