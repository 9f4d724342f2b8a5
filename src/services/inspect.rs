//! Opt-in artifact inspection: size probes, content hashing, and IPA
//! permission extraction.
//!
//! Everything here forces network transfers, so no emitter calls it
//! implicitly; the orchestrator wires it up only when the matching flags
//! are set. Failures degrade to "no data" rather than aborting an app.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::io::{Read, Seek};
use std::time::Duration;
use tracing::{info, warn};

const USER_AGENT: &str = concat!("lystforge/", env!("CARGO_PKG_VERSION"));
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Entitlement keys present in effectively every IPA; carrying them in the
/// manifest would be noise.
const BOILERPLATE_ENTITLEMENTS: &[&str] =
    &["com.apple.developer.team-identifier", "application-identifier"];

/// Usage-description strings and entitlement keys declared inside an IPA.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IpaPermissions {
    pub entitlements: Vec<String>,
    pub privacy: BTreeMap<String, String>,
}

pub struct Inspector {
    client: reqwest::blocking::Client,
}

impl Inspector {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    /// Metadata-only size probe. A missing Content-Length header yields
    /// `None`, never an error.
    pub fn content_length(&self, url: &str) -> Option<u64> {
        match self.client.head(url).timeout(PROBE_TIMEOUT).send() {
            Ok(resp) => resp.content_length(),
            Err(e) => {
                warn!(%url, error = %e, "could not determine file size");
                None
            }
        }
    }

    /// Downloads the full body and hashes the exact bytes received,
    /// returned as lowercase hex.
    pub fn sha256(&self, url: &str) -> Option<String> {
        info!(%url, "calculating sha256");
        let resp = match self.client.get(url).timeout(DOWNLOAD_TIMEOUT).send() {
            Ok(resp) => resp,
            Err(e) => {
                warn!(%url, error = %e, "failed to download artifact for hashing");
                return None;
            }
        };
        if !resp.status().is_success() {
            warn!(%url, status = %resp.status(), "artifact download returned an error status");
            return None;
        }
        let bytes = match resp.bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(%url, error = %e, "failed to read artifact body");
                return None;
            }
        };
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Some(hex::encode(hasher.finalize()))
    }

    /// Downloads an IPA and extracts privacy usage descriptions from its
    /// Info.plist plus entitlement keys from its signing descriptor. Any
    /// download or parse problem yields `None`.
    pub fn ipa_permissions(&self, url: &str) -> Option<IpaPermissions> {
        match self.extract_ipa_permissions(url) {
            Ok(permissions) => permissions,
            Err(e) => {
                info!(%url, error = %e, "could not extract permissions from IPA");
                None
            }
        }
    }

    fn extract_ipa_permissions(&self, url: &str) -> anyhow::Result<Option<IpaPermissions>> {
        info!(%url, "downloading IPA for permission extraction");
        let mut resp = self
            .client
            .get(url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()?
            .error_for_status()?;
        let mut scratch = tempfile::tempfile()?;
        std::io::copy(&mut resp, &mut scratch)?;

        let mut archive = zip::ZipArchive::new(scratch)?;
        let Some(app_dir) = bundle_dir(&mut archive) else {
            warn!(%url, "IPA does not contain a Payload .app directory");
            return Ok(None);
        };

        let mut privacy = BTreeMap::new();
        if let Some(bytes) = read_entry(&mut archive, &format!("{app_dir}Info.plist")) {
            if let Some(dict) = parse_plist_dict(&bytes) {
                for (key, value) in dict {
                    if key.ends_with("UsageDescription") {
                        if let Some(text) = value.as_string() {
                            privacy.insert(key, text.to_string());
                        }
                    }
                }
            }
        }

        let mut entitlements = Vec::new();
        for candidate in [
            format!("{app_dir}archived-expanded-entitlements.xcent"),
            format!("{app_dir}entitlements.plist"),
        ] {
            let Some(bytes) = read_entry(&mut archive, &candidate) else { continue };
            if let Some(dict) = parse_plist_dict(&bytes) {
                entitlements = dict.into_iter().map(|(key, _)| key).collect();
                entitlements.sort();
            }
            break;
        }
        entitlements.retain(|key| !BOILERPLATE_ENTITLEMENTS.contains(&key.as_str()));

        if entitlements.is_empty() && privacy.is_empty() {
            return Ok(None);
        }
        Ok(Some(IpaPermissions { entitlements, privacy }))
    }
}

/// Locates the top-level `Payload/<Name>.app/` bundle from the archive's
/// entry names.
fn bundle_dir<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> Option<String> {
    archive.file_names().find_map(|name| {
        let rest = name.strip_prefix("Payload/")?;
        let bundle = rest.split('/').next()?;
        bundle
            .ends_with(".app")
            .then(|| format!("Payload/{bundle}/"))
    })
}

fn read_entry<R: Read + Seek>(archive: &mut zip::ZipArchive<R>, name: &str) -> Option<Vec<u8>> {
    let mut entry = archive.by_name(name).ok()?;
    let mut buf = Vec::new();
    entry.read_to_end(&mut buf).ok()?;
    Some(buf)
}

fn parse_plist_dict(bytes: &[u8]) -> Option<plist::Dictionary> {
    match plist::Value::from_reader(std::io::Cursor::new(bytes)) {
        Ok(plist::Value::Dictionary(dict)) => Some(dict),
        Ok(_) => None,
        Err(e) => {
            warn!(error = %e, "failed to parse embedded plist");
            None
        }
    }
}
