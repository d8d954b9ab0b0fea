//! Binary entrypoint: renders an execution JSON file as a text report.
use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tzatziki_cli::{cli, run, Args};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::from_matches(&cli().get_matches())?;
    run(&args)
}
