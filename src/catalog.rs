//! OpenLyst catalog API: record types and the HTTP client.
//!
//! The catalog is the remote source of truth for applications and their
//! release versions. Transport failures and non-success envelopes degrade
//! to empty results at this boundary; they are logged and never raised to
//! callers.

use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const USER_AGENT: &str = concat!("lystforge/", env!("CARGO_PKG_VERSION"));
const METADATA_TIMEOUT: Duration = Duration::from_secs(30);

/// One catalog application. Records arrive in whatever shape the directory
/// service holds, so every field is optional and defaults are applied at
/// the point of use.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct App {
    pub name: Option<String>,
    pub bundle_identifier: Option<String>,
    pub developer_name: Option<String>,
    pub subtitle: Option<String>,
    pub localized_description: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "iconURL")]
    pub icon_url: Option<String>,
    pub tint_color: Option<String>,
    pub website: Option<String>,
    pub source_code: Option<String>,
    pub issue_tracker: Option<String>,
    pub category: Option<String>,
    pub screenshots: Vec<Value>,
    pub slug: Option<String>,
}

/// One release of an application. `downloads` is kept as raw JSON because
/// its shape varies per platform; the resolver parses it lazily into a
/// typed tree. Caller-supplied order is authoritative: index 0 is the
/// latest release and the engine never re-sorts.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Version {
    pub version: Option<String>,
    pub build_version: Option<String>,
    pub date: Option<String>,
    pub localized_description: Option<String>,
    pub platforms: Vec<String>,
    pub downloads: Option<Value>,
    pub platform_install: Option<Value>,
    #[serde(rename = "downloadURL")]
    pub download_url: Option<String>,
}

impl Version {
    pub fn version_or_default(&self) -> String {
        self.version.clone().unwrap_or_else(|| "1.0".to_string())
    }

    pub fn build_version_or_default(&self) -> String {
        self.build_version.clone().unwrap_or_else(|| "1".to_string())
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Value,
}

/// Read-only view of the catalog. The HTTP client implements this; tests
/// substitute an in-memory source.
pub trait CatalogSource {
    fn list_apps(&self, platform: &str) -> Vec<App>;
    fn app_versions(&self, slug: &str) -> Vec<Version>;
}

pub struct HttpCatalog {
    base: String,
    client: reqwest::blocking::Client,
}

impl HttpCatalog {
    pub fn new(base: &str) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(METADATA_TIMEOUT)
            .build()?;
        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn fetch_list(&self, url: &str, query: &[(&str, &str)]) -> Vec<Value> {
        let resp = match self
            .client
            .get(url)
            .query(query)
            .send()
            .and_then(|r| r.error_for_status())
        {
            Ok(resp) => resp,
            Err(e) => {
                error!(%url, error = %e, "catalog request failed");
                return Vec::new();
            }
        };
        let envelope: Envelope = match resp.json() {
            Ok(env) => env,
            Err(e) => {
                error!(%url, error = %e, "catalog response was not valid JSON");
                return Vec::new();
            }
        };
        if !envelope.success {
            error!(%url, "catalog returned an unsuccessful response");
            return Vec::new();
        }
        match envelope.data {
            Value::Array(items) => items,
            _ => Vec::new(),
        }
    }
}

impl CatalogSource for HttpCatalog {
    fn list_apps(&self, platform: &str) -> Vec<App> {
        let url = format!("{}/apps", self.base);
        info!(%url, platform, "fetching apps");
        let items = self.fetch_list(&url, &[("platform", platform), ("lang", "en"), ("filter", "active")]);
        let apps = parse_records(items, "app");
        info!(count = apps.len(), platform, "fetched apps");
        apps
    }

    fn app_versions(&self, slug: &str) -> Vec<Version> {
        let url = format!("{}/apps/{}/versions", self.base, slug);
        let versions: Vec<Version> = parse_records(self.fetch_list(&url, &[("lang", "en")]), "version");
        debug!(count = versions.len(), slug, "fetched versions");
        versions
    }
}

/// Decode records one by one so a single malformed entry drops that entry,
/// not the whole response.
fn parse_records<T: serde::de::DeserializeOwned>(items: Vec<Value>, kind: &str) -> Vec<T> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(kind, error = %e, "dropping malformed catalog record");
                None
            }
        })
        .collect()
}
