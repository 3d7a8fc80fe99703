//! End-to-end runs: geometry build and candidate aggregation.

use std::time::Instant;

use serde::Serialize;

use crate::bundle::HierarchicalBundler;
use crate::candidate::{aggregate, load_candidates, Aggregation};
use crate::common::Fetch;
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::lookup::IdentifierResolver;
use crate::map::AdminLevel;
use crate::topo::{build_topology, write_topology, Published};

/// Summary of a successful geometry build.
#[derive(Debug, Serialize)]
pub struct BuildReport {
    pub published: Published,
    pub provinces: usize,
    pub districts: usize,
    pub constituencies: usize,
    pub arcs: usize,
    /// Records dropped during normalization.
    #[serde(skip)]
    pub warnings: Vec<Error>,
}

/// Bundle the hierarchy, encode it as a topology and publish it to
/// `config.output`. Any fatal error leaves the previous artifact in place.
pub fn build_geometry(config: &PipelineConfig, fetcher: &dyn Fetch) -> Result<BuildReport> {
    config.validate()?;
    let start = Instant::now();
    let endpoints = &config.endpoints;

    let resolver = IdentifierResolver::new(fetcher, &endpoints.district_lookup, &endpoints.constituency_lookup);
    let hierarchy = HierarchicalBundler::new(fetcher, &resolver, endpoints)
        .with_concurrency(config.concurrency)
        .bundle_all()?;
    hierarchy.ensure_non_empty()?;

    let topology = build_topology(
        &hierarchy.provinces,
        &hierarchy.districts,
        &hierarchy.constituencies,
        config.tolerance,
    )?;
    for (level, expected) in [
        (AdminLevel::Province, hierarchy.provinces.len()),
        (AdminLevel::District, hierarchy.districts.len()),
        (AdminLevel::Constituency, hierarchy.constituencies.len()),
    ] {
        let encoded = topology.object_len(level.object_name()).unwrap_or(0);
        if encoded != expected {
            return Err(Error::InvalidTopology {
                reason: format!("{} holds {encoded} geometries for {expected} features", level.object_name()),
            });
        }
    }

    let published = write_topology(&config.output, &topology)?;
    let report = BuildReport {
        published,
        provinces: hierarchy.provinces.len(),
        districts: hierarchy.districts.len(),
        constituencies: hierarchy.constituencies.len(),
        arcs: topology.arcs.len(),
        warnings: hierarchy.warnings,
    };

    tracing::info!(
        provinces = report.provinces,
        districts = report.districts,
        constituencies = report.constituencies,
        arcs = report.arcs,
        dropped = report.warnings.len(),
        elapsed = ?start.elapsed(),
        "geometry build complete",
    );
    Ok(report)
}

/// Load the configured candidate source and aggregate it. A payload whose
/// records are all malformed fails with `Error::EmptyCandidates`.
pub fn aggregate_candidates(config: &PipelineConfig, fetcher: &dyn Fetch) -> Result<Aggregation> {
    let records = load_candidates(fetcher, &config.endpoints)?;
    aggregate(&records, &config.candidate_image_base)
}
