//! cfn-glue CLI: typed CloudFormation tooling for AWS Glue.

use cfn_glue::cli::{Cli, LogLevel};
use cfn_glue::core::config::Settings;
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr; `RUST_LOG` takes precedence over `--log-level`.
fn setup_logging(level: LogLevel) {
    let Some(level) = level.to_tracing_level() else {
        return;
    };
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.log_level);

    let settings = match Settings::load(&cli.config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = cfn_glue::cli::dispatch(cli.command, &settings) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
