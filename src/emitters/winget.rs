//! winget manifest emitter.
//!
//! Mirrors the Microsoft winget-pkgs layout: three co-located YAML
//! manifests (version, default locale, installer) per
//! `manifests/<Publisher>/<Package>/<version>/` directory, plus a
//! `repo-info.json` summary. Only the latest version is published.

use super::{url_extension, write_json, EmitContext, EmitError, Emitter};
use crate::catalog::{App, Version};
use crate::domain::models::AppOutcome;
use crate::services::naming::{sanitize, NameStyle};
use crate::services::resolver::{self, WINDOWS};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;

const PUBLISHER: &str = "OpenLyst";
const MANIFEST_VERSION: &str = "1.4.0";
const PACKAGE_URL: &str = "https://openlyst.ink";

#[derive(Serialize)]
struct InstallerSwitches {
    #[serde(rename = "Silent")]
    silent: String,
    #[serde(rename = "SilentWithProgress")]
    silent_with_progress: String,
}

#[derive(Serialize)]
struct Installer {
    #[serde(rename = "Architecture")]
    architecture: String,
    #[serde(rename = "InstallerType")]
    installer_type: String,
    #[serde(rename = "InstallerUrl")]
    installer_url: String,
    #[serde(rename = "InstallerSwitches", skip_serializing_if = "Option::is_none")]
    installer_switches: Option<InstallerSwitches>,
    #[serde(rename = "InstallerSha256", skip_serializing_if = "Option::is_none")]
    installer_sha256: Option<String>,
}

#[derive(Serialize)]
struct VersionManifest {
    #[serde(rename = "PackageIdentifier")]
    package_identifier: String,
    #[serde(rename = "PackageVersion")]
    package_version: String,
    #[serde(rename = "ManifestType")]
    manifest_type: String,
    #[serde(rename = "ManifestVersion")]
    manifest_version: String,
    #[serde(rename = "Installers")]
    installers: Vec<Installer>,
}

#[derive(Serialize)]
struct LocaleManifest {
    #[serde(rename = "PackageIdentifier")]
    package_identifier: String,
    #[serde(rename = "PackageVersion")]
    package_version: String,
    #[serde(rename = "PackageLocale")]
    package_locale: String,
    #[serde(rename = "ManifestType")]
    manifest_type: String,
    #[serde(rename = "ManifestVersion")]
    manifest_version: String,
    #[serde(rename = "Publisher")]
    publisher: String,
    #[serde(rename = "PackageName")]
    package_name: String,
    #[serde(rename = "License")]
    license: String,
    #[serde(rename = "ShortDescription")]
    short_description: String,
    #[serde(rename = "Description")]
    description: String,
    #[serde(rename = "PackageUrl")]
    package_url: String,
    #[serde(rename = "Tags")]
    tags: Vec<String>,
}

#[derive(Serialize)]
struct InstallerManifest {
    #[serde(rename = "PackageIdentifier")]
    package_identifier: String,
    #[serde(rename = "PackageVersion")]
    package_version: String,
    #[serde(rename = "ManifestType")]
    manifest_type: String,
    #[serde(rename = "ManifestVersion")]
    manifest_version: String,
}

pub struct WingetEmitter {
    out_dir: PathBuf,
    written: usize,
}

impl WingetEmitter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self {
            out_dir,
            written: 0,
        }
    }
}

impl Emitter for WingetEmitter {
    fn name(&self) -> &'static str {
        "winget"
    }

    fn catalog_platform(&self) -> &'static str {
        WINDOWS
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
        if !latest.platforms.iter().any(|p| p == WINDOWS) {
            return Ok(AppOutcome::Skipped {
                reason: "does not support Windows".to_string(),
            });
        }
        let Some(download_url) = resolver::resolve(latest, WINDOWS) else {
            return Ok(AppOutcome::Skipped {
                reason: "no Windows download URL".to_string(),
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
        let package_name = sanitize(name, NameStyle::Class);
        let package_id = format!("{PUBLISHER}.{package_name}");
        let installer_type = installer_type(&download_url);

        let installer_sha256 = if ctx.calculate_sha256 {
            ctx.inspector.sha256(&download_url).map(|d| d.to_uppercase())
        } else {
            None
        };
        let installer_switches = (installer_type == "exe").then(|| InstallerSwitches {
            silent: "/S".to_string(),
            silent_with_progress: "/S".to_string(),
        });

        let version_manifest = VersionManifest {
            package_identifier: package_id.clone(),
            package_version: version.to_string(),
            manifest_type: "version".to_string(),
            manifest_version: MANIFEST_VERSION.to_string(),
            installers: vec![Installer {
                architecture: "x64".to_string(),
                installer_type: installer_type.to_string(),
                installer_url: download_url,
                installer_switches,
                installer_sha256,
            }],
        };
        let locale_manifest = LocaleManifest {
            package_identifier: package_id.clone(),
            package_version: version.to_string(),
            package_locale: "en-US".to_string(),
            manifest_type: "defaultLocale".to_string(),
            manifest_version: MANIFEST_VERSION.to_string(),
            publisher: PUBLISHER.to_string(),
            package_name: name.to_string(),
            license: "Open Source".to_string(),
            short_description: app.subtitle.clone().unwrap_or_else(|| name.to_string()),
            description: app
                .localized_description
                .clone()
                .or_else(|| app.subtitle.clone())
                .unwrap_or_else(|| name.to_string()),
            package_url: PACKAGE_URL.to_string(),
            tags: vec!["opensource".to_string(), "free".to_string(), "openlyst".to_string()],
        };
        let installer_manifest = InstallerManifest {
            package_identifier: package_id.clone(),
            package_version: version.to_string(),
            manifest_type: "installer".to_string(),
            manifest_version: MANIFEST_VERSION.to_string(),
        };

        let manifest_dir = self
            .out_dir
            .join("manifests")
            .join(PUBLISHER)
            .join(&package_name)
            .join(version);
        std::fs::create_dir_all(&manifest_dir)?;

        let files = vec![
            write_yaml(&manifest_dir.join(format!("{package_id}.installer.yaml")), &installer_manifest)?,
            write_yaml(&manifest_dir.join(format!("{package_id}.locale.en-US.yaml")), &locale_manifest)?,
            write_yaml(&manifest_dir.join(format!("{package_id}.yaml")), &version_manifest)?,
        ];
        self.written += 1;

        Ok(AppOutcome::Written { files })
    }

    fn finalize(&mut self, ctx: &EmitContext) -> anyhow::Result<Vec<PathBuf>> {
        let info = json!({
            "name": "OpenLyst Winget Repository",
            "description": "Winget manifest files for Windows applications from OpenLyst",
            "homepage": PACKAGE_URL,
            "generated_at": ctx.iso_z(),
            "manifest_count": self.written,
        });
        let info_path = self.out_dir.join("repo-info.json");
        write_json(&info_path, &info)?;
        Ok(vec![info_path])
    }
}

fn installer_type(download_url: &str) -> &'static str {
    match url_extension(download_url).as_str() {
        "msi" => "msi",
        "msix" => "msix",
        "zip" => "zip",
        // Bare executables and anything unrecognized install like an exe.
        _ => "exe",
    }
}

fn write_yaml<T: Serialize>(path: &PathBuf, value: &T) -> anyhow::Result<PathBuf> {
    std::fs::write(path, serde_yaml::to_string(value)?)?;
    Ok(path.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installer_type_follows_url_extension() {
        assert_eq!(installer_type("https://x/setup.msi"), "msi");
        assert_eq!(installer_type("https://x/setup.MSIX"), "msix");
        assert_eq!(installer_type("https://x/bundle.zip"), "zip");
        assert_eq!(installer_type("https://x/setup.exe"), "exe");
        assert_eq!(installer_type("https://x/download"), "exe");
    }

    #[test]
    fn version_manifest_serializes_pascal_case_yaml() {
        let manifest = VersionManifest {
            package_identifier: "OpenLyst.Demo".to_string(),
            package_version: "1.0.0".to_string(),
            manifest_type: "version".to_string(),
            manifest_version: MANIFEST_VERSION.to_string(),
            installers: vec![Installer {
                architecture: "x64".to_string(),
                installer_type: "exe".to_string(),
                installer_url: "https://x/setup.exe".to_string(),
                installer_switches: Some(InstallerSwitches {
                    silent: "/S".to_string(),
                    silent_with_progress: "/S".to_string(),
                }),
                installer_sha256: None,
            }],
        };
        let yaml = serde_yaml::to_string(&manifest).unwrap();
        assert!(yaml.contains("PackageIdentifier: OpenLyst.Demo"));
        assert!(yaml.contains("InstallerType: exe"));
        assert!(yaml.contains("Silent: /S"));
        assert!(!yaml.contains("InstallerSha256"));
    }
}
