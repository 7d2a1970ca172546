use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use masto2jekyll::archive::Archive;
use masto2jekyll::cli::Cli;
use masto2jekyll::export;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "masto2jekyll=debug"
    } else {
        "masto2jekyll=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();

    let config = cli.into_config()?;
    let archive = Archive::load(&config.archive)?;
    let report = export::run(&config, &archive)?;

    println!("Total posts generated: {}", report.generated.len());
    Ok(())
}
