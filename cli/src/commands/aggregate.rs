use std::io::Write;

use anyhow::{Context, Result};
use electmap::{aggregate_candidates, write_atomically};
use serde_json::json;

use crate::commands::{http_fetcher, load_config, report_warnings};

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::AggregateArgs) -> Result<()> {
    let mut config = load_config(cli)?;
    if let Some(source) = &args.source { config.endpoints.candidates = source.clone(); }
    if let Some(base) = &args.image_base { config.candidate_image_base = base.clone(); }

    let fetcher = http_fetcher(&config)?;
    let aggregation = match aggregate_candidates(&config, &fetcher) {
        Ok(aggregation) => aggregation,
        Err(err) => {
            if let electmap::Error::EmptyCandidates { warnings } = &err {
                report_warnings(warnings);
            }
            return Err(err).with_context(|| format!("aggregating {}", config.endpoints.candidates));
        }
    };
    report_warnings(&aggregation.warnings);

    let summary = if args.all {
        serde_json::to_vec_pretty(&aggregation)?
    } else {
        serde_json::to_vec_pretty(&json!({ "leading": aggregation.leading, "stats": aggregation.stats }))?
    };

    match &args.output {
        Some(path) => {
            write_atomically(path, |out| {
                out.write_all(&summary).map_err(|source| electmap::Error::Io { path: path.clone(), source })
            })
            .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("[aggregate] {} seats -> {}", aggregation.stats.total_seats, path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&summary)?;
            writeln!(stdout)?;
        }
    }

    Ok(())
}
