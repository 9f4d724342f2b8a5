//! Batch orchestration: drives each selected emitter over the catalog.

use crate::catalog::CatalogSource;
use crate::cli::{Cli, TargetArg};
use crate::domain::models::{AppOutcome, RunSummary, TargetSummary};
use crate::emitters::altstore::AltstoreEmitter;
use crate::emitters::fdroid::FdroidEmitter;
use crate::emitters::homebrew::HomebrewEmitter;
use crate::emitters::winget::WingetEmitter;
use crate::emitters::{EmitContext, Emitter};
use crate::services::inspect::Inspector;
use crate::services::resolver::{LINUX, MACOS};
use chrono::Utc;
use std::collections::BTreeSet;
use tracing::{debug, error, info, warn};

/// Runs every selected target against `catalog` and returns the summary.
/// Always completes: per-app and per-target problems are recorded, never
/// propagated.
pub fn run(cli: &Cli, catalog: &dyn CatalogSource) -> anyhow::Result<RunSummary> {
    let ctx = EmitContext {
        now: Utc::now(),
        repo_url: cli.repo_url.trim_end_matches('/').to_string(),
        calculate_sha256: cli.calculate_sha256,
        calculate_sizes: cli.calculate_sizes,
        extract_permissions: cli.extract_permissions,
        inspector: Inspector::new()?,
    };

    let mut summary = RunSummary::default();
    for mut emitter in selected_emitters(cli) {
        info!("building {}", emitter.name());
        summary.targets.push(run_emitter(&ctx, emitter.as_mut(), catalog));
    }

    info!("build summary");
    for target in &summary.targets {
        if target.success {
            info!(
                written = target.written,
                skipped = target.skipped,
                failed = target.failed,
                "{}: success",
                target.target
            );
        } else {
            error!(
                written = target.written,
                skipped = target.skipped,
                failed = target.failed,
                "{}: produced no output",
                target.target
            );
        }
    }
    Ok(summary)
}

fn run_emitter(
    ctx: &EmitContext,
    emitter: &mut dyn Emitter,
    catalog: &dyn CatalogSource,
) -> TargetSummary {
    let platform = emitter.catalog_platform();
    let apps = catalog.list_apps(platform);
    if apps.is_empty() {
        error!(platform, "no apps fetched for {}", emitter.name());
    }

    let mut written = 0;
    let mut skipped = 0;
    let mut failed = 0;
    for app in &apps {
        let Some(slug) = app.slug.as_deref().filter(|s| !s.is_empty()) else {
            warn!("app record has no slug; counting as failed for {}", emitter.name());
            failed += 1;
            continue;
        };
        info!(app = slug, "processing app");
        let versions = catalog.app_versions(slug);
        match emitter.emit_app(ctx, app, &versions) {
            Ok(AppOutcome::Written { files }) => {
                debug!(app = slug, files = files.len(), "app written");
                written += 1;
            }
            Ok(AppOutcome::Skipped { reason }) => {
                info!(app = slug, %reason, "app skipped");
                skipped += 1;
            }
            Err(e) => {
                let chain = format!("{e:#}");
                error!(app = slug, error = %chain, "app failed");
                failed += 1;
            }
        }
    }

    let finalize_ok = match emitter.finalize(ctx) {
        Ok(files) => {
            for file in &files {
                debug!(file = %file.display(), "wrote aggregate document");
            }
            true
        }
        Err(e) => {
            let chain = format!("{e:#}");
            error!(error = %chain, "failed to write aggregate documents for {}", emitter.name());
            false
        }
    };

    TargetSummary {
        target: emitter.name().to_string(),
        platform: platform.to_string(),
        written,
        skipped,
        failed,
        success: written > 0 && finalize_ok,
    }
}

fn selected_emitters(cli: &Cli) -> Vec<Box<dyn Emitter>> {
    let mut selected: BTreeSet<TargetArg> = cli.target.iter().copied().collect();
    if selected.contains(&TargetArg::All) {
        selected = [
            TargetArg::Altstore,
            TargetArg::Fdroid,
            TargetArg::Homebrew,
            TargetArg::Winget,
        ]
        .into();
    }

    let mut emitters: Vec<Box<dyn Emitter>> = Vec::new();
    for target in selected {
        match target {
            TargetArg::All => unreachable!("expanded above"),
            TargetArg::Altstore => {
                emitters.push(Box::new(AltstoreEmitter::new(cli.altstore_output.clone())));
            }
            TargetArg::Fdroid => {
                let address = cli.repo_url.replace("/repo", "/fdroid-repo");
                emitters.push(Box::new(FdroidEmitter::new(cli.fdroid_output.clone(), address)));
            }
            TargetArg::Homebrew => {
                if cli.platform.includes_macos() {
                    emitters.push(Box::new(HomebrewEmitter::new(cli.homebrew_output.clone(), MACOS)));
                }
                if cli.platform.includes_linux() {
                    emitters.push(Box::new(HomebrewEmitter::new(cli.homebrew_output.clone(), LINUX)));
                }
            }
            TargetArg::Winget => {
                emitters.push(Box::new(WingetEmitter::new(cli.winget_output.clone())));
            }
        }
    }
    emitters
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn all_expands_to_every_target() {
        let cli = Cli::parse_from(["lystforge"]);
        let emitters = selected_emitters(&cli);
        let names: Vec<&str> = emitters.iter().map(|e| e.name()).collect();
        assert_eq!(
            names,
            ["altstore", "fdroid", "homebrew (macOS)", "homebrew (Linux)", "winget"]
        );
    }

    #[test]
    fn homebrew_platform_selection_limits_instances() {
        let cli = Cli::parse_from(["lystforge", "--target", "homebrew", "--platform", "Linux"]);
        let emitters = selected_emitters(&cli);
        let names: Vec<&str> = emitters.iter().map(|e| e.name()).collect();
        assert_eq!(names, ["homebrew (Linux)"]);
    }

    #[test]
    fn duplicate_targets_collapse() {
        let cli = Cli::parse_from(["lystforge", "--target", "winget,winget,fdroid"]);
        let emitters = selected_emitters(&cli);
        let names: Vec<&str> = emitters.iter().map(|e| e.name()).collect();
        assert_eq!(names, ["fdroid", "winget"]);
    }
}
