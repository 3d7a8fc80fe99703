use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const ELECTION_HOST: &str = "https://result.election.gov.np/JSONFiles";

/// Upstream read-only endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// Province FeatureCollection.
    pub provinces: String,
    /// Directory holding `STATE_C_{provinceId}.json` district files.
    pub districts_base: String,
    /// Directory holding `dist-{districtId}.json` constituency files.
    pub constituencies_base: String,
    /// `[{id, parentId}]` district -> province table.
    pub district_lookup: String,
    /// `[{distId, consts}]` constituency -> district table.
    pub constituency_lookup: String,
    /// Candidate vote file: an http(s) URL or a local cache path.
    pub candidates: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            provinces: format!("{ELECTION_HOST}/JSONMap/geojson/Province.json"),
            districts_base: format!("{ELECTION_HOST}/JSONMap/geojson/District"),
            constituencies_base: format!("{ELECTION_HOST}/JSONMap/geojson/Const"),
            district_lookup: format!("{ELECTION_HOST}/Election2079/Local/Lookup/districts.json"),
            constituency_lookup: format!("{ELECTION_HOST}/Election2079/HOR/Lookup/constituencies.json"),
            candidates: format!("{ELECTION_HOST}/ElectionResultCentral2079.txt"),
        }
    }
}

impl Endpoints {
    /// Serve every endpoint from one base URL (mirrors and tests).
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            provinces: format!("{base}/Province.json"),
            districts_base: format!("{base}/District"),
            constituencies_base: format!("{base}/Const"),
            district_lookup: format!("{base}/lookup/districts.json"),
            constituency_lookup: format!("{base}/lookup/constituencies.json"),
            candidates: format!("{base}/candidates.json"),
        }
    }

    pub fn district_url(&self, province_id: u64) -> String {
        format!("{}/STATE_C_{province_id}.json", self.districts_base.trim_end_matches('/'))
    }

    pub fn constituency_url(&self, district_id: u64) -> String {
        format!("{}/dist-{district_id}.json", self.constituencies_base.trim_end_matches('/'))
    }

    /// True if the candidate source should be fetched over HTTP.
    pub fn candidates_is_remote(&self) -> bool {
        self.candidates.starts_with("http://") || self.candidates.starts_with("https://")
    }
}

/// Settings for one pipeline run. Every field has a default, so a config
/// file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub endpoints: Endpoints,
    /// Published topology path.
    pub output: PathBuf,
    /// Simplification tolerance in degrees; 0 keeps every vertex.
    pub tolerance: f64,
    /// Worker threads for district/constituency fan-out; 1 is sequential.
    pub concurrency: usize,
    /// Per-request timeout.
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Prefix joined with the candidate id to form `image_url`.
    pub candidate_image_base: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            output: PathBuf::from("public/data/geometry.topo.json"),
            tolerance: 0.002,
            concurrency: 1,
            timeout_secs: 30,
            user_agent: concat!("electmap/", env!("CARGO_PKG_VERSION")).to_string(),
            candidate_image_base: String::new(),
        }
    }
}

impl PipelineConfig {
    /// Read a JSON config file; missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        crate::common::parse_json(&path.display().to_string(), &bytes)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(Error::Config {
                reason: format!("tolerance must be a finite, non-negative number (got {})", self.tolerance),
            });
        }
        if self.concurrency == 0 {
            return Err(Error::Config { reason: "concurrency must be at least 1".into() });
        }
        Ok(())
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}
