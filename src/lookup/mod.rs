//! Parent/child identifier tables fetched independently of the geometry.
//!
//! Both tables are loaded lazily on first use and cached for the lifetime of
//! the resolver. Loading is single-flight: concurrent first callers wait on
//! the table's mutex and only one of them performs the fetch.

mod resolver;

pub use resolver::{ConstituencyParent, DistrictParent, IdentifierResolver};
