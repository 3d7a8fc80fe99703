use geo::{Coord, LineString, Simplify};
use rayon::prelude::*;

use crate::topo::topology::arc_index;

/// A closed ring needs at least a triangle plus its closing point.
const MIN_RING_POINTS: usize = 4;

/// Ramer-Douglas-Peucker each arc once with `tolerance` (degrees).
///
/// Arc endpoints are always kept, so adjacent features keep meeting at
/// the same junctions. If a ring would fall below four points, every arc
/// on that ring keeps its original vertices instead.
pub(crate) fn simplify_arcs(arcs: &[Vec<Coord<f64>>], rings: &[Vec<i64>], tolerance: f64) -> Vec<Vec<Coord<f64>>> {
    if tolerance <= 0.0 {
        return arcs.to_vec();
    }

    let mut simplified: Vec<Vec<Coord<f64>>> = arcs.par_iter()
        .map(|arc| LineString::from(arc.clone()).simplify(&tolerance).0)
        .collect();

    let mut restored = 0usize;
    for ring in rings {
        if ring_len(&simplified, ring) >= MIN_RING_POINTS {
            continue;
        }
        for &reference in ring {
            let (i, _) = arc_index(reference);
            if simplified[i].len() != arcs[i].len() {
                simplified[i] = arcs[i].clone();
                restored += 1;
            }
        }
    }
    if restored > 0 {
        tracing::debug!(restored, "kept original vertices on arcs of collapsing rings");
    }
    simplified
}

/// Point count of the closed ring stitched from `ring`'s arcs.
fn ring_len(arcs: &[Vec<Coord<f64>>], ring: &[i64]) -> usize {
    ring.iter()
        .map(|&reference| arcs[arc_index(reference).0].len().saturating_sub(1))
        .sum::<usize>()
        + 1
}
