use clap::Parser;
use lystforge::catalog::HttpCatalog;
use lystforge::cli::Cli;
use lystforge::commands::build;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let catalog = HttpCatalog::new(&cli.api_base)?;
    let summary = build::run(&cli, &catalog)?;

    // Partial success is success; only a target with zero outputs fails the run.
    if !summary.all_succeeded() {
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
