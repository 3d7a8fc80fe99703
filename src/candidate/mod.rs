//! Candidate vote records: parsing, ranking and standings.

mod aggregate;
mod record;
mod source;

pub use aggregate::{aggregate, Aggregation, GenderBreakdown, Stats};
pub use record::{Candidate, Gender};
pub use source::{load_candidates, parse_candidate_payload};
