use anyhow::{Context, Result};
use electmap::{build_geometry, Endpoints};

use crate::commands::{http_fetcher, load_config, report_warnings};

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::BuildArgs) -> Result<()> {
    let mut config = load_config(cli)?;
    if let Some(base) = &args.base_url {
        let candidates = config.endpoints.candidates.clone();
        config.endpoints = Endpoints { candidates, ..Endpoints::with_base(base) };
    }
    if let Some(output) = &args.output { config.output = output.clone(); }
    if let Some(tolerance) = args.tolerance { config.tolerance = tolerance; }
    if let Some(concurrency) = args.concurrency { config.concurrency = concurrency; }
    if let Some(timeout) = args.timeout { config.timeout_secs = timeout; }

    let fetcher = http_fetcher(&config)?;
    let report = build_geometry(&config, &fetcher)
        .with_context(|| format!("building {}", config.output.display()))?;

    report_warnings(&report.warnings);
    println!(
        "[build] wrote {} ({} bytes, sha256 {})",
        report.published.path.display(),
        report.published.bytes,
        report.published.sha256,
    );
    println!(
        "[build] provinces={} districts={} constituencies={} arcs={}",
        report.provinces, report.districts, report.constituencies, report.arcs,
    );

    Ok(())
}
