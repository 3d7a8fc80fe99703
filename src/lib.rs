#![doc = "Electmap: election map geometry bundling and candidate aggregation"]
mod bundle;
mod candidate;
mod common;
mod config;
mod error;
mod lookup;
mod map;
mod pipeline;
mod topo;

#[doc(inline)]
pub use error::{Error, Result};

#[doc(inline)]
pub use config::{Endpoints, PipelineConfig};

#[doc(inline)]
pub use common::{write_atomically, Fetch, Fetched, MemFetcher, PendingWrite};

#[cfg(feature = "download")]
#[doc(inline)]
pub use common::HttpFetcher;

#[doc(inline)]
pub use map::{
    normalize, normalize_collection, AdminLevel, AdminUnit, Constituency, ConstituencyId, ConstituencyProps,
    District, DistrictProps, Feature, Normalized, Province, ProvinceProps, RawFeature, RawResponse,
};

#[doc(inline)]
pub use lookup::{ConstituencyParent, DistrictParent, IdentifierResolver};

#[doc(inline)]
pub use bundle::{HierarchicalBundler, Hierarchy};

#[doc(inline)]
pub use topo::{build_topology, read_topology, write_topology, DecodedFeature, Published, TopoGeometry, TopoObject, Topology};

#[doc(inline)]
pub use candidate::{
    aggregate, load_candidates, parse_candidate_payload, Aggregation, Candidate, Gender, GenderBreakdown, Stats,
};

#[doc(inline)]
pub use pipeline::{aggregate_candidates, build_geometry, BuildReport};
