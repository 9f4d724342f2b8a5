//! Artifact URL resolution.
//!
//! Each upstream platform encodes its artifacts differently, so resolution
//! is an ordered, short-circuiting probe chain per platform. The resolver
//! returns the first hit, not the best hit; the preference orders below are
//! part of the output contract and must not be reordered.

use crate::catalog::Version;
use crate::domain::models::DownloadNode;

pub const IOS: &str = "iOS";
pub const ANDROID: &str = "Android";
pub const MACOS: &str = "macOS";
pub const LINUX: &str = "Linux";
pub const WINDOWS: &str = "Windows";

const ANDROID_KEYS: &[&str] = &["apk", "universal", "arm64", "arm", "x86_64", "x86"];
const MACOS_ARCHES: &[&str] = &["universal", "arm64", "x86_64"];
const LINUX_PACKAGES: &[&str] = &["appimage", "zip", "deb", "rpm"];
const WINDOWS_PACKAGES: &[&str] = &["exe", "msi", "msix", "zip"];
const DESKTOP_ARCHES: &[&str] = &["x86_64", "arm64"];

/// Finds the download URL for `platform` in one version record, or `None`
/// when the version carries no artifact for it. Present-but-empty strings
/// are treated the same as absent keys.
pub fn resolve(version: &Version, platform: &str) -> Option<String> {
    match platform {
        IOS => resolve_ios(version),
        ANDROID => resolve_android(version),
        MACOS | LINUX | WINDOWS => resolve_desktop(version, platform),
        _ => None,
    }
}

fn platform_node(version: &Version, platform: &str) -> Option<DownloadNode> {
    DownloadNode::from_value(version.downloads.as_ref()?.get(platform)?)
}

fn nonempty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn resolve_ios(version: &Version) -> Option<String> {
    // Primary: downloads.iOS as a direct string.
    if let Some(DownloadNode::Leaf(s)) = platform_node(version, IOS) {
        if let Some(url) = nonempty(&s) {
            return Some(url);
        }
    }

    // Fallback: platformInstall.iOS, accepted only with a URI scheme marker.
    if let Some(install) = version
        .platform_install
        .as_ref()
        .and_then(|m| m.get(IOS))
        .and_then(|v| v.as_str())
    {
        if !install.trim().is_empty() && install.starts_with("http") {
            return Some(install.trim().to_string());
        }
    }

    // Last fallback: the top-level downloadURL field.
    scheme_prefixed_download_url(version)
}

fn resolve_android(version: &Version) -> Option<String> {
    if let Some(node) = platform_node(version, ANDROID) {
        match &node {
            DownloadNode::Leaf(s) => {
                if let Some(url) = nonempty(s) {
                    return Some(url);
                }
            }
            DownloadNode::Branch(_) => {
                for key in ANDROID_KEYS {
                    if let Some(url) = node.get(key).and_then(DownloadNode::as_leaf) {
                        if !url.is_empty() {
                            return Some(url.to_string());
                        }
                    }
                }
            }
        }
    }

    scheme_prefixed_download_url(version)
}

fn resolve_desktop(version: &Version, platform: &str) -> Option<String> {
    let node = platform_node(version, platform)?;

    match platform {
        MACOS => {
            // macOS descriptors map architectures directly under the platform.
            for arch in MACOS_ARCHES {
                if let Some(url) = node.get(arch).and_then(DownloadNode::as_leaf) {
                    if !url.is_empty() {
                        return Some(url.to_string());
                    }
                }
            }
        }
        LINUX | WINDOWS => {
            let packages = if platform == LINUX { LINUX_PACKAGES } else { WINDOWS_PACKAGES };
            for package in packages {
                let Some(entry) = node.get(package) else { continue };
                match entry {
                    DownloadNode::Branch(_) => {
                        for arch in DESKTOP_ARCHES {
                            if let Some(url) = entry.get(arch).and_then(DownloadNode::as_leaf) {
                                if !url.is_empty() {
                                    return Some(url.to_string());
                                }
                            }
                        }
                    }
                    DownloadNode::Leaf(url) => {
                        if !url.is_empty() {
                            return Some(url.clone());
                        }
                    }
                }
            }
        }
        _ => unreachable!("resolve_desktop called for {platform}"),
    }

    scan_subtree(&node)
}

fn scheme_prefixed_download_url(version: &Version) -> Option<String> {
    let url = version.download_url.as_deref()?.trim();
    (url.starts_with("http")).then(|| url.to_string())
}

/// Fallback for desktop platforms: take the first scheme-prefixed string
/// leaf in lexicographic key order, descending at most two levels
/// (package type, then architecture).
fn scan_subtree(node: &DownloadNode) -> Option<String> {
    match node {
        DownloadNode::Leaf(url) => url.starts_with("http").then(|| url.clone()),
        DownloadNode::Branch(children) => {
            for child in children.values() {
                match child {
                    DownloadNode::Leaf(url) if url.starts_with("http") => {
                        return Some(url.clone());
                    }
                    DownloadNode::Branch(inner) => {
                        for grandchild in inner.values() {
                            if let Some(url) = grandchild.as_leaf() {
                                if url.starts_with("http") {
                                    return Some(url.to_string());
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn version(value: serde_json::Value) -> Version {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn ios_direct_string_wins() {
        let v = version(json!({
            "downloads": {"iOS": "https://x/app.ipa"},
            "platformInstall": {"iOS": "https://y/install"},
            "downloadURL": "https://z/direct"
        }));
        assert_eq!(resolve(&v, IOS).as_deref(), Some("https://x/app.ipa"));
    }

    #[test]
    fn ios_falls_back_to_platform_install_then_download_url() {
        let v = version(json!({
            "downloads": {"iOS": "  "},
            "platformInstall": {"iOS": "https://y/install"}
        }));
        assert_eq!(resolve(&v, IOS).as_deref(), Some("https://y/install"));

        let v = version(json!({
            "platformInstall": {"iOS": "altstore://nope"},
            "downloadURL": "https://z/direct"
        }));
        assert_eq!(resolve(&v, IOS).as_deref(), Some("https://z/direct"));
    }

    #[test]
    fn android_branch_probes_flat_keys_in_order() {
        let v = version(json!({
            "downloads": {"Android": {"arm64": "https://x/arm64.apk", "apk": "https://x/app.apk"}}
        }));
        assert_eq!(resolve(&v, ANDROID).as_deref(), Some("https://x/app.apk"));
    }

    #[test]
    fn android_direct_string_is_trimmed() {
        let v = version(json!({"downloads": {"Android": " https://x/app.apk "}}));
        assert_eq!(resolve(&v, ANDROID).as_deref(), Some("https://x/app.apk"));
    }

    #[test]
    fn macos_prefers_universal_over_specific_arches() {
        let v = version(json!({
            "downloads": {"macOS": {"arm64": "https://x/a", "universal": "https://x/u"}}
        }));
        assert_eq!(resolve(&v, MACOS).as_deref(), Some("https://x/u"));
    }

    #[test]
    fn linux_probes_package_type_then_architecture() {
        let v = version(json!({
            "downloads": {"Linux": {
                "rpm": "https://x/pkg.rpm",
                "zip": {"arm64": "https://x/arm.zip", "x86_64": "https://x/x64.zip"}
            }}
        }));
        assert_eq!(resolve(&v, LINUX).as_deref(), Some("https://x/x64.zip"));
    }

    #[test]
    fn windows_prefers_exe_over_msi() {
        let v = version(json!({
            "downloads": {"Windows": {
                "msi": "https://x/setup.msi",
                "exe": {"x86_64": "https://x/setup.exe"}
            }}
        }));
        assert_eq!(resolve(&v, WINDOWS).as_deref(), Some("https://x/setup.exe"));
    }

    #[test]
    fn desktop_fallback_scans_in_lexicographic_order() {
        let v = version(json!({
            "downloads": {"Linux": {
                "snap": "https://x/app.snap",
                "flatpak": {"x86_64": "https://x/app.flatpak"}
            }}
        }));
        // Neither key is in the preference list; "flatpak" sorts first.
        assert_eq!(resolve(&v, LINUX).as_deref(), Some("https://x/app.flatpak"));
    }

    #[test]
    fn fallback_ignores_leaves_without_scheme_marker() {
        let v = version(json!({
            "downloads": {"macOS": {"notes": "see website", "zz": "https://x/app.dmg"}}
        }));
        assert_eq!(resolve(&v, MACOS).as_deref(), Some("https://x/app.dmg"));
    }

    #[test]
    fn empty_strings_are_never_candidates() {
        let v = version(json!({
            "downloads": {"macOS": {"universal": "", "x86_64": "https://x/intel.dmg"}}
        }));
        assert_eq!(resolve(&v, MACOS).as_deref(), Some("https://x/intel.dmg"));
    }

    #[test]
    fn missing_platform_resolves_to_none() {
        let v = version(json!({"downloads": {"iOS": "https://x/app.ipa"}}));
        assert_eq!(resolve(&v, WINDOWS), None);
        let v = version(json!({}));
        assert_eq!(resolve(&v, MACOS), None);
    }

    #[test]
    fn resolution_is_idempotent() {
        let v = version(json!({
            "downloads": {"Windows": {"zip": {"x86_64": "https://x/app.zip"}}}
        }));
        assert_eq!(resolve(&v, WINDOWS), resolve(&v, WINDOWS));
    }
}
