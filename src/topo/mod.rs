//! Shared-arc TopoJSON encoding of the bundled layers.

mod build;
mod simplify;
mod topology;
mod write;

pub use build::build_topology;
pub use topology::{read_topology, DecodedFeature, TopoGeometry, TopoObject, Topology};
pub use write::{write_topology, Published};
