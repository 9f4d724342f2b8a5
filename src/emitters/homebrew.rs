//! Homebrew tap emitter.
//!
//! Writes one formula or cask file per (app, platform) under `Formula/`,
//! choosing the template from the artifact's file extension, plus a
//! `tap-info.json` summary. Only the latest version is published.

use super::{url_extension, write_json, EmitContext, EmitError, Emitter};
use crate::catalog::{App, Version};
use crate::domain::models::AppOutcome;
use crate::services::naming::{sanitize, NameStyle};
use crate::services::resolver::{self, LINUX};
use serde_json::json;
use std::path::PathBuf;

const TAP_NAME: &str = "OpenLyst Homebrew Tap";
const DEFAULT_HOMEPAGE: &str = "https://openlyst.ink";
const SHA256_PLACEHOLDER: &str = "  # sha256 \"REPLACE_WITH_ACTUAL_SHA256\"";

pub struct HomebrewEmitter {
    out_dir: PathBuf,
    platform: &'static str,
    written: usize,
}

impl HomebrewEmitter {
    pub fn new(out_dir: PathBuf, platform: &'static str) -> Self {
        Self {
            out_dir,
            platform,
            written: 0,
        }
    }
}

impl Emitter for HomebrewEmitter {
    fn name(&self) -> &'static str {
        match self.platform {
            LINUX => "homebrew (Linux)",
            _ => "homebrew (macOS)",
        }
    }

    fn catalog_platform(&self) -> &'static str {
        self.platform
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
        if !latest.platforms.iter().any(|p| p == self.platform) {
            return Ok(AppOutcome::Skipped {
                reason: format!("does not support {}", self.platform),
            });
        }
        let Some(download_url) = resolver::resolve(latest, self.platform) else {
            return Ok(AppOutcome::Skipped {
                reason: format!("no download URL for {}", self.platform),
            });
        };

        let name = app
            .name
            .as_deref()
            .ok_or(EmitError::MissingAppField("name"))?;
        let version = latest
            .version
            .as_deref()
            .ok_or(EmitError::MissingVersionField("version"))?;
        let class_name = sanitize(name, NameStyle::Class);

        let sha256_line = if ctx.calculate_sha256 {
            match ctx.inspector.sha256(&download_url) {
                Some(digest) => format!("  sha256 \"{digest}\""),
                None => SHA256_PLACEHOLDER.to_string(),
            }
        } else {
            SHA256_PLACEHOLDER.to_string()
        };

        let homepage = app.website.as_deref().unwrap_or(DEFAULT_HOMEPAGE);
        let desc = app
            .subtitle
            .as_deref()
            .unwrap_or(name)
            .replace('"', "\\\"");
        let extension = url_extension(&download_url);
        let content = match extension.as_str() {
            "dmg" | "pkg" => {
                let bundle_id = app
                    .bundle_identifier
                    .as_deref()
                    .ok_or(EmitError::MissingAppField("bundleIdentifier"))?;
                cask(&class_name, name, version, &download_url, &sha256_line, &desc, homepage, Some(bundle_id))
            }
            "app" => cask(&class_name, name, version, &download_url, &sha256_line, &desc, homepage, None),
            _ => formula(&class_name, version, &download_url, &sha256_line, &desc, homepage, &extension),
        };

        let suffix = if self.platform == LINUX { "-linux" } else { "" };
        let formula_path = self
            .out_dir
            .join("Formula")
            .join(format!("{}{}.rb", class_name.to_lowercase(), suffix));
        if let Some(parent) = formula_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&formula_path, content)?;
        self.written += 1;

        Ok(AppOutcome::Written {
            files: vec![formula_path],
        })
    }

    fn finalize(&mut self, ctx: &EmitContext) -> anyhow::Result<Vec<PathBuf>> {
        let info = json!({
            "name": TAP_NAME,
            "description": format!("Homebrew formulae for {} applications from OpenLyst", self.platform),
            "homepage": DEFAULT_HOMEPAGE,
            "generated_at": ctx.iso_z(),
            "platform": self.platform,
            "formulae_count": self.written,
        });
        let info_path = self.out_dir.join("tap-info.json");
        write_json(&info_path, &info)?;
        Ok(vec![info_path])
    }
}

#[allow(clippy::too_many_arguments)]
fn cask(
    token_source: &str,
    app_name: &str,
    version: &str,
    url: &str,
    sha256_line: &str,
    desc: &str,
    homepage: &str,
    zap_bundle_id: Option<&str>,
) -> String {
    let install = match zap_bundle_id {
        Some(bundle_id) => format!(
            "  app \"{app_name}.app\"\n  \n  zap trash: [\n    \"~/Library/Preferences/com.{bundle_id}.plist\",\n    \"~/Library/Application Support/{app_name}\",\n  ]"
        ),
        None => format!("  app \"{app_name}.app\""),
    };
    format!(
        "cask \"{token}\" do\n  version \"{version}\"\n{sha256_line}\n\n  url \"{url}\"\n  name \"{app_name}\"\n  desc \"{desc}\"\n  homepage \"{homepage}\"\n\n  livecheck do\n    skip \"No version check available\"\n  end\n\n{install}\nend\n",
        token = token_source.to_lowercase(),
    )
}

fn formula(
    class_name: &str,
    version: &str,
    url: &str,
    sha256_line: &str,
    desc: &str,
    homepage: &str,
    extension: &str,
) -> String {
    let install = match extension {
        "zip" | "tgz" | "gz" => "    # Extract and install archive\n    prefix.install Dir[\"*\"]",
        _ => "    # Generic installation\n    prefix.install Dir[\"*\"]",
    };
    format!(
        "class {class_name} < Formula\n  desc \"{desc}\"\n  homepage \"{homepage}\"\n  url \"{url}\"\n  version \"{version}\"\n{sha256_line}\n\n  def install\n{install}\n  end\n\n  test do\n    # Test that the application was installed\n    system \"true\"\n  end\nend\n"
    )
}
