//! Manifest emitters, one per target ecosystem.
//!
//! ## Emitter map
//! - `altstore.rs` — aggregate AltStore source JSON + companion pointer.
//! - `fdroid.rs` — F-Droid metadata file per app + aggregate index.
//! - `homebrew.rs` — formula/cask file per (app, platform) + tap info.
//! - `winget.rs` — three manifests per (publisher, app, version) + repo info.
//!
//! ## Conventions
//! - Emitters compose the resolver/sanitizer/coder/mapper services; they
//!   own no resolution rules of their own.
//! - A resolution miss is a skip, not an error; structural problems after
//!   resolution are errors and the orchestrator records them as failures.

pub mod altstore;
pub mod fdroid;
pub mod homebrew;
pub mod winget;

use crate::catalog::{App, Version};
use crate::domain::models::AppOutcome;
use crate::services::inspect::Inspector;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Per-run configuration and shared collaborators handed to every emitter.
/// `now` is captured once by the orchestrator; every timestamp in the
/// generated trees derives from it.
pub struct EmitContext {
    pub now: DateTime<Utc>,
    pub repo_url: String,
    pub calculate_sha256: bool,
    pub calculate_sizes: bool,
    pub extract_permissions: bool,
    pub inspector: Inspector,
}

impl EmitContext {
    /// Run timestamp as an ISO-8601 string with a trailing `Z`, the format
    /// the generated info files carry.
    pub fn iso_z(&self) -> String {
        format!("{}Z", self.now.format("%Y-%m-%dT%H:%M:%S%.6f"))
    }

    /// Run timestamp in epoch milliseconds, used by the F-Droid index.
    pub fn epoch_millis(&self) -> i64 {
        self.now.timestamp_millis()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum EmitError {
    #[error("app record has no {0}")]
    MissingAppField(&'static str),
    #[error("version record has no {0}")]
    MissingVersionField(&'static str),
}

/// One target ecosystem's manifest writer. The orchestrator feeds it one
/// application at a time and calls `finalize` once afterwards for the
/// aggregate documents.
pub trait Emitter {
    /// Display name used in logs and the run summary.
    fn name(&self) -> &'static str;

    /// Platform whose catalog listing this emitter consumes.
    fn catalog_platform(&self) -> &'static str;

    fn emit_app(
        &mut self,
        ctx: &EmitContext,
        app: &App,
        versions: &[Version],
    ) -> anyhow::Result<AppOutcome>;

    /// Writes aggregate documents (indexes, info files) and returns their
    /// paths. Called exactly once, after every app has been offered.
    fn finalize(&mut self, ctx: &EmitContext) -> anyhow::Result<Vec<PathBuf>>;
}

/// Writes pretty-printed JSON, creating parent directories on demand.
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

/// Lowercased extension of a URL's path component, without the dot.
pub(crate) fn url_extension(download_url: &str) -> String {
    let path = url::Url::parse(download_url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| download_url.to_string());
    Path::new(&path)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}
