use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::candidate::{Candidate, Gender};
use crate::error::{Error, Result};
use crate::map::ConstituencyId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderBreakdown {
    pub male: u64,
    pub female: u64,
    pub other: u64,
}

/// Global standings derived from one candidate set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Sum over every candidate, not just leaders.
    pub total_votes: u64,
    /// One seat per distinct constituency.
    pub total_seats: u64,
    /// Leading candidates per party.
    pub party_standings: BTreeMap<String, u64>,
    /// Counted over every candidate.
    pub gender_breakdown: GenderBreakdown,
}

/// Output of one aggregation pass.
#[derive(Debug, Default, Serialize)]
pub struct Aggregation {
    /// Sorted by constituency ascending, then votes descending.
    pub candidates: Vec<Candidate>,
    /// One per constituency, in constituency order.
    pub leading: Vec<Candidate>,
    pub stats: Stats,
    /// Records dropped as malformed.
    #[serde(skip)]
    pub warnings: Vec<Error>,
}

/// Map, sort and rank raw candidate records.
///
/// Malformed records are dropped and returned in `warnings`; if that leaves
/// nothing of a non-empty payload the run fails with `EmptyCandidates`.
/// Within a constituency the leader is the first record of the
/// vote-descending stable order, so equal votes keep upstream order.
pub fn aggregate(raw: &[Value], image_base: &str) -> Result<Aggregation> {
    let mut warnings = Vec::new();
    let mut candidates: Vec<Candidate> = raw.iter()
        .filter_map(|record| match Candidate::from_raw(record, image_base) {
            Ok(candidate) => Some(candidate),
            Err(e) => {
                tracing::warn!("dropping candidate: {e}");
                warnings.push(e);
                None
            }
        })
        .collect();
    if candidates.is_empty() && !raw.is_empty() {
        return Err(Error::EmptyCandidates { warnings });
    }

    // Stable: ties keep their input order.
    candidates.sort_by(|a, b| {
        a.constituency_id.cmp(&b.constituency_id).then_with(|| b.votes.cmp(&a.votes))
    });

    let leading = select_leaders(&candidates);
    let stats = derive_stats(&candidates, &leading);
    tracing::info!(
        candidates = candidates.len(),
        seats = stats.total_seats,
        dropped = warnings.len(),
        "aggregated candidates",
    );

    Ok(Aggregation { candidates, leading, stats, warnings })
}

/// Single pass keeping the best candidate seen per constituency.
/// Only a strictly higher vote count replaces the current best.
fn select_leaders(candidates: &[Candidate]) -> Vec<Candidate> {
    let mut best: BTreeMap<ConstituencyId, &Candidate> = BTreeMap::new();
    for candidate in candidates {
        match best.entry(candidate.constituency_id) {
            Entry::Vacant(slot) => {
                slot.insert(candidate);
            }
            Entry::Occupied(mut slot) => {
                if candidate.votes > slot.get().votes {
                    slot.insert(candidate);
                }
            }
        }
    }
    best.into_values().cloned().collect()
}

fn derive_stats(candidates: &[Candidate], leading: &[Candidate]) -> Stats {
    let mut stats = Stats {
        total_seats: leading.len() as u64,
        ..Stats::default()
    };
    for leader in leading {
        *stats.party_standings.entry(leader.party.clone()).or_default() += 1;
    }
    for candidate in candidates {
        stats.total_votes += candidate.votes;
        match candidate.gender_class() {
            Gender::Male => stats.gender_breakdown.male += 1,
            Gender::Female => stats.gender_breakdown.female += 1,
            Gender::Other => stats.gender_breakdown.other += 1,
        }
    }
    stats
}
