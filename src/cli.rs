use clap::{Parser, ValueEnum};
use std::path::PathBuf;

pub const DEFAULT_API_BASE: &str = "https://openlyst.ink/api/v1";
pub const DEFAULT_REPO_URL: &str =
    "https://raw.githubusercontent.com/justacalico/Openlyst-more-builds/main/repo";

#[derive(Parser, Debug)]
#[command(
    name = "lystforge",
    version,
    about = "Build AltStore, F-Droid, Homebrew, and winget repositories from the OpenLyst catalog"
)]
pub struct Cli {
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "all",
        help = "Build target(s): all, or a comma-separated list of altstore, fdroid, homebrew, winget"
    )]
    pub target: Vec<TargetArg>,

    #[arg(
        long,
        value_enum,
        default_value_t = PlatformArg::Both,
        ignore_case = true,
        help = "Platform for Homebrew builds"
    )]
    pub platform: PlatformArg,

    #[arg(long, default_value = "repo", help = "Output directory for the AltStore repository")]
    pub altstore_output: PathBuf,

    #[arg(long, default_value = "fdroid-repo", help = "Output directory for the F-Droid repository")]
    pub fdroid_output: PathBuf,

    #[arg(long, default_value = "homebrew-tap", help = "Output directory for the Homebrew tap")]
    pub homebrew_output: PathBuf,

    #[arg(long, default_value = "winget-repo", help = "Output directory for the winget repository")]
    pub winget_output: PathBuf,

    #[arg(
        long,
        default_value = DEFAULT_REPO_URL,
        help = "Base URL the published AltStore repository will be served from"
    )]
    pub repo_url: String,

    #[arg(long, default_value = DEFAULT_API_BASE, help = "OpenLyst API base URL")]
    pub api_base: String,

    #[arg(long, help = "Download artifacts and record SHA256 hashes (slow)")]
    pub calculate_sha256: bool,

    #[arg(long, help = "Probe artifact URLs for file sizes")]
    pub calculate_sizes: bool,

    #[arg(long, help = "Download the latest IPA per app and extract permission data (slow)")]
    pub extract_permissions: bool,

    #[arg(long, help = "Enable debug logging")]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum TargetArg {
    All,
    Altstore,
    Fdroid,
    Homebrew,
    Winget,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PlatformArg {
    #[value(name = "macOS")]
    MacOs,
    #[value(name = "Linux")]
    Linux,
    #[value(name = "both")]
    Both,
}

impl PlatformArg {
    pub fn includes_macos(self) -> bool {
        matches!(self, PlatformArg::MacOs | PlatformArg::Both)
    }

    pub fn includes_linux(self) -> bool {
        matches!(self, PlatformArg::Linux | PlatformArg::Both)
    }
}
