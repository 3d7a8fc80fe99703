pub mod aggregate;
pub mod build;
pub mod validate;

use anyhow::{Context, Result};
use electmap::{HttpFetcher, PipelineConfig};
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins over `-v` when set.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Defaults, then the `--config` file if given.
pub fn load_config(cli: &crate::cli::Cli) -> Result<PipelineConfig> {
    match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

pub fn http_fetcher(config: &PipelineConfig) -> Result<HttpFetcher> {
    HttpFetcher::new(&config.user_agent, config.timeout()).context("creating HTTP client")
}

/// Print dropped records to stderr.
pub fn report_warnings(warnings: &[electmap::Error]) {
    for warning in warnings {
        tracing::warn!("{warning}");
    }
    if !warnings.is_empty() {
        eprintln!("[electmap] {} record(s) dropped; rerun with -v for details", warnings.len());
    }
}
