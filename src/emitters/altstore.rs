//! AltStore source emitter.
//!
//! Produces one aggregate `apps.json` (the source document AltStore
//! clients consume) plus a companion `index.json` pointer carrying the
//! published source URL and duplicated summary fields.

use super::{write_json, EmitContext, Emitter};
use crate::catalog::{App, Version};
use crate::domain::models::AppOutcome;
use crate::services::inspect::IpaPermissions;
use crate::services::resolver::{self, IOS};
use crate::services::categories;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;

/// Payload-size bound: only the newest entries of the caller-supplied
/// order are published.
const MAX_VERSIONS: usize = 10;
const MAX_SCREENSHOTS: usize = 10;
const MAX_FEATURED: usize = 5;

const SOURCE_NAME: &str = "OpenLyst iOS Apps";
const SOURCE_SUBTITLE: &str = "Free and open source iOS applications";
const SOURCE_DESCRIPTION: &str =
    "A curated collection of free and open source iOS applications from OpenLyst.";
const DEFAULT_TINT: &str = "#dc2626";

#[derive(Serialize)]
struct VersionEntry {
    version: String,
    #[serde(rename = "buildVersion")]
    build_version: String,
    date: String,
    #[serde(rename = "downloadURL")]
    download_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    #[serde(rename = "localizedDescription", skip_serializing_if = "Option::is_none")]
    localized_description: Option<String>,
}

#[derive(Serialize)]
struct AppEntry {
    name: String,
    #[serde(rename = "bundleIdentifier")]
    bundle_identifier: String,
    #[serde(rename = "developerName")]
    developer_name: String,
    subtitle: String,
    #[serde(rename = "localizedDescription")]
    localized_description: String,
    #[serde(rename = "iconURL")]
    icon_url: String,
    #[serde(rename = "tintColor")]
    tint_color: String,
    category: String,
    versions: Vec<VersionEntry>,
    #[serde(rename = "appPermissions", skip_serializing_if = "Option::is_none")]
    app_permissions: Option<IpaPermissions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    screenshots: Option<Vec<String>>,
}

#[derive(Serialize)]
struct Source {
    name: String,
    subtitle: String,
    description: String,
    #[serde(rename = "iconURL")]
    icon_url: String,
    #[serde(rename = "headerURL")]
    header_url: String,
    website: String,
    #[serde(rename = "tintColor")]
    tint_color: String,
    #[serde(rename = "featuredApps")]
    featured_apps: Vec<String>,
    apps: Vec<AppEntry>,
    news: Vec<Value>,
}

#[derive(Serialize)]
struct SourcePointer {
    #[serde(rename = "repositoryURL")]
    repository_url: String,
    name: String,
    subtitle: String,
    description: String,
    #[serde(rename = "generatedAt")]
    generated_at: String,
}

pub struct AltstoreEmitter {
    out_dir: PathBuf,
    entries: Vec<AppEntry>,
}

impl AltstoreEmitter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self {
            out_dir,
            entries: Vec::new(),
        }
    }
}

impl Emitter for AltstoreEmitter {
    fn name(&self) -> &'static str {
        "altstore"
    }

    fn catalog_platform(&self) -> &'static str {
        IOS
    }

    fn emit_app(
        &mut self,
        ctx: &EmitContext,
        app: &App,
        versions: &[Version],
    ) -> anyhow::Result<AppOutcome> {
        let mut published = Vec::new();
        for version in versions.iter().take(MAX_VERSIONS) {
            let Some(ipa_url) = resolver::resolve(version, IOS) else {
                debug!(version = %version.version_or_default(), "no IPA URL for version");
                continue;
            };
            let size = if ctx.calculate_sizes {
                ctx.inspector.content_length(&ipa_url)
            } else {
                None
            };
            published.push(VersionEntry {
                version: version.version_or_default(),
                build_version: version.build_version_or_default(),
                date: version.date.clone().unwrap_or_else(|| ctx.now.to_rfc3339()),
                download_url: ipa_url,
                size,
                localized_description: version.localized_description.clone(),
            });
        }

        if published.is_empty() {
            return Ok(AppOutcome::Skipped {
                reason: "no iOS artifact in any version".to_string(),
            });
        }

        let app_permissions = if ctx.extract_permissions {
            ctx.inspector.ipa_permissions(&published[0].download_url)
        } else {
            None
        };

        let slug = app.slug.clone().unwrap_or_default();
        self.entries.push(AppEntry {
            name: app.name.clone().unwrap_or_else(|| "Unknown App".to_string()),
            bundle_identifier: app.bundle_identifier.clone().unwrap_or(slug),
            developer_name: app
                .developer_name
                .clone()
                .unwrap_or_else(|| "OpenLyst Developer".to_string()),
            subtitle: app
                .subtitle
                .clone()
                .unwrap_or_else(|| "An app from OpenLyst".to_string()),
            localized_description: app
                .localized_description
                .clone()
                .or_else(|| app.description.clone())
                .unwrap_or_else(|| "A free and open source app".to_string()),
            icon_url: app.icon_url.clone().unwrap_or_default(),
            tint_color: app.tint_color.clone().unwrap_or_else(|| DEFAULT_TINT.to_string()),
            category: categories::altstore_category(app.category.as_deref().unwrap_or("other")),
            versions: published,
            app_permissions,
            screenshots: (!app.screenshots.is_empty()).then(|| process_screenshots(&app.screenshots)),
        });

        Ok(AppOutcome::Written { files: Vec::new() })
    }

    fn finalize(&mut self, ctx: &EmitContext) -> anyhow::Result<Vec<PathBuf>> {
        if self.entries.is_empty() {
            return Ok(Vec::new());
        }

        let featured_apps = self
            .entries
            .iter()
            .take(MAX_FEATURED)
            .map(|entry| entry.bundle_identifier.clone())
            .collect();
        let source = Source {
            name: SOURCE_NAME.to_string(),
            subtitle: SOURCE_SUBTITLE.to_string(),
            description: SOURCE_DESCRIPTION.to_string(),
            icon_url: repo_file_url(&ctx.repo_url, "icon.png"),
            header_url: repo_file_url(&ctx.repo_url, "header.png"),
            website: "https://openlyst.ink".to_string(),
            tint_color: DEFAULT_TINT.to_string(),
            featured_apps,
            apps: std::mem::take(&mut self.entries),
            news: Vec::new(),
        };

        let apps_path = self.out_dir.join("apps.json");
        write_json(&apps_path, &source)?;

        let pointer = SourcePointer {
            repository_url: repo_file_url(&ctx.repo_url, "apps.json"),
            name: source.name.clone(),
            subtitle: source.subtitle.clone(),
            description: source.description.clone(),
            generated_at: ctx.now.to_rfc3339(),
        };
        let index_path = self.out_dir.join("index.json");
        write_json(&index_path, &pointer)?;

        Ok(vec![apps_path, index_path])
    }
}

fn repo_file_url(base: &str, file: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), file)
}

/// Screenshots arrive either as bare URL strings or as objects carrying an
/// `imageURL` field; anything else is dropped.
fn process_screenshots(raw: &[Value]) -> Vec<String> {
    let mut shots: Vec<String> = raw
        .iter()
        .filter_map(|shot| match shot {
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => map.get("imageURL").and_then(Value::as_str).map(str::to_string),
            _ => None,
        })
        .collect();
    shots.truncate(MAX_SCREENSHOTS);
    shots
}
