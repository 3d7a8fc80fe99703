mod bundler;

pub use bundler::{HierarchicalBundler, Hierarchy};
