use std::path::PathBuf;

use thiserror::Error;

use crate::map::AdminLevel;

/// Unified error for the bundling, topology and aggregation pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// Non-2xx response, transport failure or timeout while fetching `url`.
    #[error("fetch failed for {url}: {reason}")]
    Fetch {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    /// A lookup table endpoint could not be fetched.
    #[error("lookup table fetch failed for {url} (status {status:?})")]
    LookupFetch { url: String, status: Option<u16> },

    /// A lookup table body was not the expected array shape.
    #[error("lookup table at {url} is malformed: {reason} (body starts with {preview:?})")]
    LookupParse {
        url: String,
        reason: String,
        preview: String,
    },

    /// Body is not valid JSON, or not JSON at all (e.g. an HTML error page).
    #[error("failed to parse {source_name}: {reason} (body starts with {preview:?})")]
    Parse {
        source_name: String,
        reason: String,
        preview: String,
    },

    /// Valid JSON, but neither a bare feature array nor a FeatureCollection.
    #[error("unexpected response shape from {source_name}: found {found}")]
    UnexpectedShape {
        source_name: String,
        found: &'static str,
    },

    #[error("invalid geometry on {level} feature {id:?}: {reason}")]
    InvalidGeometry {
        level: AdminLevel,
        id: Option<String>,
        reason: String,
    },

    #[error("no {level} features available")]
    EmptyInput { level: AdminLevel },

    /// A non-empty candidate payload in which every record was malformed.
    #[error("all {} candidate records were malformed", .warnings.len())]
    EmptyCandidates { warnings: Vec<Error> },

    #[error("malformed candidate record {candidate_id:?}: {reason}")]
    MalformedCandidate {
        candidate_id: Option<u64>,
        reason: String,
    },

    /// Broken parent/child references or duplicate composite ids.
    #[error("data quality violation: {reason}")]
    DataQuality { reason: String },

    #[error("invalid configuration: {reason}")]
    Config { reason: String },

    /// A topology document a consumer cannot use.
    #[error("invalid topology: {reason}")]
    InvalidTopology { reason: String },

    /// A per-parent fetch failed during fan-out.
    #[error("bundling {level} features for parent {parent_id} failed")]
    Fanout {
        level: AdminLevel,
        parent_id: u64,
        #[source]
        source: Box<Error>,
    },

    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// True for record-level errors that are dropped and reported as warnings.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidGeometry { .. } | Self::MalformedCandidate { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
