//! Shared-arc topology construction.
//!
//! 1. Quantize every ring vertex so coincident borders compare equal.
//! 2. Mark junctions: vertices with more than two distinct neighbors
//!    across all rings of all layers.
//! 3. Cut each ring at its junctions. Junction-free rings become one
//!    closed arc starting at their smallest vertex.
//! 4. Intern arcs, matching either direction, so a border shared by two
//!    features (or by two layers) is stored once.
//! 5. Simplify each arc once; endpoints survive, so neighbors stay aligned.

use std::collections::BTreeMap;
use std::time::Instant;

use ahash::{AHashMap, AHashSet};
use geo::{Coord, LineString};
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::map::{AdminLevel, Constituency, District, Feature, Province};
use crate::topo::simplify::simplify_arcs;
use crate::topo::topology::{TopoGeometry, TopoObject, Topology};

/// Quantization grid: 1e-7 degrees, about 1cm at Nepal's latitude.
const SCALE: f64 = 1e7;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct QCoord {
    x: i64,
    y: i64,
}

impl QCoord {
    fn new(c: Coord<f64>) -> Self {
        Self {
            x: (c.x * SCALE).round() as i64,
            y: (c.y * SCALE).round() as i64,
        }
    }

    fn to_coord(self) -> Coord<f64> {
        Coord {
            x: self.x as f64 / SCALE,
            y: self.y as f64 / SCALE,
        }
    }
}

/// One feature prepared for arc cutting: polygons -> rings -> open vertex cycles.
struct Shape {
    id: u64,
    properties: Value,
    polygons: Vec<Vec<Vec<QCoord>>>,
}

/// Quantize a ring into an open cycle without repeated vertices.
/// Rings that collapse below a triangle are dropped.
fn prepare_ring(ring: &LineString<f64>) -> Option<Vec<QCoord>> {
    let mut points: Vec<QCoord> = Vec::with_capacity(ring.0.len());
    for &c in &ring.0 {
        let q = QCoord::new(c);
        if points.last() != Some(&q) {
            points.push(q);
        }
    }
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    (points.len() >= 3).then_some(points)
}

fn prepare_shapes<P: Serialize>(level: AdminLevel, features: &[Feature<P>]) -> Result<Vec<Shape>> {
    features.iter()
        .map(|feature| {
            let polygons: Vec<Vec<Vec<QCoord>>> = feature.geometry.0.iter()
                .filter_map(|polygon| {
                    let exterior = prepare_ring(polygon.exterior())?;
                    let mut rings = vec![exterior];
                    rings.extend(polygon.interiors().iter().filter_map(prepare_ring));
                    Some(rings)
                })
                .collect();

            if polygons.is_empty() {
                tracing::debug!(%level, id = feature.id, "every ring collapsed under quantization");
            }
            Ok(Shape { id: feature.id, properties: serde_json::to_value(&feature.properties)?, polygons })
        })
        .collect()
}

/// Interned arcs plus the junction set that decides where rings are cut.
struct ArcIndex {
    junctions: AHashSet<QCoord>,
    arcs: Vec<Vec<QCoord>>,
    lookup: AHashMap<Vec<QCoord>, usize>,
}

impl ArcIndex {
    fn new<'a>(rings: impl Iterator<Item = &'a Vec<QCoord>>) -> Self {
        let mut neighbors: AHashMap<QCoord, Vec<QCoord>> = AHashMap::new();
        for ring in rings {
            let n = ring.len();
            for i in 0..n {
                let adjacent = neighbors.entry(ring[i]).or_default();
                for other in [ring[(i + n - 1) % n], ring[(i + 1) % n]] {
                    if !adjacent.contains(&other) {
                        adjacent.push(other);
                    }
                }
            }
        }

        let junctions = neighbors.into_iter()
            .filter(|(_, adjacent)| adjacent.len() > 2)
            .map(|(point, _)| point)
            .collect();

        Self { junctions, arcs: Vec::new(), lookup: AHashMap::new() }
    }

    /// Cut `ring` into arcs and return their references in ring order.
    fn encode_ring(&mut self, ring: &[QCoord]) -> Vec<i64> {
        let n = ring.len();
        let cuts: Vec<usize> = (0..n).filter(|&i| self.junctions.contains(&ring[i])).collect();

        if cuts.is_empty() {
            let start = (0..n).min_by_key(|&i| ring[i]).unwrap_or(0);
            let arc = (0..=n).map(|k| ring[(start + k) % n]).collect();
            return vec![self.intern(arc)];
        }

        (0..cuts.len())
            .map(|k| {
                let from = cuts[k];
                let to = cuts.get(k + 1).copied().unwrap_or(cuts[0] + n);
                let arc = (from..=to).map(|i| ring[i % n]).collect();
                self.intern(arc)
            })
            .collect()
    }

    fn intern(&mut self, arc: Vec<QCoord>) -> i64 {
        if let Some(&i) = self.lookup.get(&arc) {
            return i as i64;
        }
        let reversed: Vec<QCoord> = arc.iter().rev().copied().collect();
        if let Some(&i) = self.lookup.get(&reversed) {
            return !(i as i64);
        }
        let i = self.arcs.len();
        self.lookup.insert(arc.clone(), i);
        self.arcs.push(arc);
        i as i64
    }
}

/// Encode the three layers as one topology with `provinces`, `districts`
/// and `constituencies` objects. Every input feature yields exactly one
/// geometry, in input order, whatever the tolerance.
pub fn build_topology(
    provinces: &[Province],
    districts: &[District],
    constituencies: &[Constituency],
    tolerance: f64,
) -> Result<Topology> {
    for (level, len) in [
        (AdminLevel::Province, provinces.len()),
        (AdminLevel::District, districts.len()),
        (AdminLevel::Constituency, constituencies.len()),
    ] {
        if len == 0 {
            return Err(Error::EmptyInput { level });
        }
    }
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(Error::Config { reason: format!("tolerance must be finite and non-negative (got {tolerance})") });
    }

    let start = Instant::now();
    let layers = [
        (AdminLevel::Province, prepare_shapes(AdminLevel::Province, provinces)?),
        (AdminLevel::District, prepare_shapes(AdminLevel::District, districts)?),
        (AdminLevel::Constituency, prepare_shapes(AdminLevel::Constituency, constituencies)?),
    ];

    let mut index = ArcIndex::new(
        layers.iter()
            .flat_map(|(_, shapes)| shapes)
            .flat_map(|shape| &shape.polygons)
            .flatten(),
    );

    let mut objects = BTreeMap::new();
    let mut all_rings: Vec<Vec<i64>> = Vec::new();
    for (level, shapes) in layers {
        let geometries: Vec<TopoGeometry> = shapes.into_iter()
            .map(|shape| {
                let arcs: Vec<Vec<Vec<i64>>> = shape.polygons.iter()
                    .map(|rings| rings.iter().map(|ring| index.encode_ring(ring)).collect())
                    .collect();
                all_rings.extend(arcs.iter().flatten().cloned());
                TopoGeometry {
                    kind: "MultiPolygon".into(),
                    id: Some(Value::from(shape.id)),
                    properties: shape.properties,
                    arcs,
                }
            })
            .collect();

        objects.insert(
            level.object_name().to_string(),
            TopoObject { kind: "GeometryCollection".into(), geometries },
        );
    }

    if index.arcs.is_empty() {
        return Err(Error::InvalidTopology { reason: "every ring collapsed under quantization; no arcs".into() });
    }

    let raw: Vec<Vec<Coord<f64>>> = index.arcs.iter()
        .map(|arc| arc.iter().map(|q| q.to_coord()).collect())
        .collect();
    let bbox = bounding_box(&raw);
    let simplified = simplify_arcs(&raw, &all_rings, tolerance);

    let before: usize = raw.iter().map(Vec::len).sum();
    let after: usize = simplified.iter().map(Vec::len).sum();
    tracing::info!(
        arcs = raw.len(),
        junctions = index.junctions.len(),
        vertices_before = before,
        vertices_after = after,
        elapsed = ?start.elapsed(),
        "built topology",
    );

    Ok(Topology {
        kind: Topology::KIND.into(),
        bbox,
        arcs: simplified.into_iter()
            .map(|arc| arc.into_iter().map(|c| [c.x, c.y]).collect())
            .collect(),
        objects,
    })
}

fn bounding_box(arcs: &[Vec<Coord<f64>>]) -> Option<[f64; 4]> {
    let mut points = arcs.iter().flatten();
    let first = points.next()?;
    Some(points.fold([first.x, first.y, first.x, first.y], |[x0, y0, x1, y1], c| {
        [x0.min(c.x), y0.min(c.y), x1.max(c.x), y1.max(c.y)]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{ConstituencyId, ConstituencyProps, DistrictProps, ProvinceProps};
    use crate::topo::topology::arc_index;
    use geo::{MultiPolygon, Polygon};

    fn ring(points: &[(f64, f64)]) -> Polygon<f64> {
        let mut coords = points.to_vec();
        coords.push(points[0]);
        Polygon::new(LineString::from(coords), vec![])
    }

    fn arc_set(topo: &Topology, name: &str, i: usize) -> AHashSet<usize> {
        topo.objects[name].geometries[i].arcs.iter().flatten().flatten()
            .map(|&r| arc_index(r).0)
            .collect()
    }

    fn province(id: u64, poly: Polygon<f64>) -> Province {
        Feature {
            id,
            properties: ProvinceProps { province_id: id, name_np: None, name_en: None, district_ids: vec![] },
            geometry: MultiPolygon(vec![poly]),
        }
    }

    fn district(id: u64, province_id: u64, poly: Polygon<f64>) -> District {
        Feature {
            id,
            properties: DistrictProps {
                district_id: id,
                province_id,
                name_np: None,
                name_en: None,
                constituency_ids: vec![],
            },
            geometry: MultiPolygon(vec![poly]),
        }
    }

    fn constituency(district_id: u64, sub_id: u64, poly: Polygon<f64>) -> Constituency {
        let constituency_id = ConstituencyId::compose(district_id, sub_id).unwrap();
        Feature {
            id: constituency_id.get(),
            properties: ConstituencyProps {
                constituency_id,
                district_id,
                sub_id,
                province_id: 1,
                conservation_area: false,
            },
            geometry: MultiPolygon(vec![poly]),
        }
    }

    /// One 2x1 province split into two districts, the left one split again
    /// at y = 0.5. Vertices are consistent across layers, as upstream.
    fn sample() -> (Vec<Province>, Vec<District>, Vec<Constituency>) {
        let right = ring(&[(1.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0), (1.0, 0.5)]);
        (
            vec![province(1, ring(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.5)]))],
            vec![
                district(10, 1, ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 0.5), (1.0, 1.0), (0.0, 1.0), (0.0, 0.5)])),
                district(11, 1, right.clone()),
            ],
            vec![
                constituency(10, 1, ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 0.5), (0.0, 0.5)])),
                constituency(10, 2, ring(&[(0.0, 0.5), (1.0, 0.5), (1.0, 1.0), (0.0, 1.0)])),
                constituency(11, 1, right),
            ],
        )
    }

    #[test]
    fn sub_grid_rings_leave_no_arcs() {
        let speck = || ring(&[(85.0, 27.0), (85.00000001, 27.0), (85.00000001, 27.00000001)]);
        let err = build_topology(
            &[province(1, speck())],
            &[district(10, 1, speck())],
            &[constituency(10, 1, speck())],
            0.0,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidTopology { .. }));
    }

    #[test]
    fn counts_survive_any_tolerance() {
        let (p, d, c) = sample();
        for tolerance in [0.0, 0.002, 10.0] {
            let topo = build_topology(&p, &d, &c, tolerance).unwrap();
            topo.validate().unwrap();
            assert_eq!(topo.object_len("provinces"), Some(1));
            assert_eq!(topo.object_len("districts"), Some(2));
            assert_eq!(topo.object_len("constituencies"), Some(3));
            for name in ["provinces", "districts", "constituencies"] {
                for feature in topo.features(name).unwrap() {
                    assert!(feature.geometry.0.iter().all(|poly| poly.exterior().0.len() >= 4));
                }
            }
        }
    }

    #[test]
    fn shared_border_is_stored_once() {
        let (p, d, c) = sample();
        let topo = build_topology(&p, &d, &c, 0.0).unwrap();

        // Junctions at (1,0), (1,1), (0,0.5) and (1,0.5) yield six arcs in total.
        assert_eq!(topo.arcs.len(), 6);

        // The x = 1 border is two arcs, cut at (1, 0.5), both shared by the districts.
        let left = arc_set(&topo, "districts", 0);
        let right = arc_set(&topo, "districts", 1);
        assert_eq!(left.intersection(&right).count(), 2);
        let vertical = topo.arcs.iter()
            .filter(|arc| arc.iter().all(|&[x, _]| x == 1.0))
            .count();
        assert_eq!(vertical, 2);
    }

    #[test]
    fn identical_rings_across_layers_share_arcs() {
        let (p, d, c) = sample();
        let topo = build_topology(&p, &d, &c, 0.0).unwrap();
        // District 11 and constituency 111 have the same outline.
        assert_eq!(arc_set(&topo, "districts", 1), arc_set(&topo, "constituencies", 2));
        // The province reuses the districts' outer arcs.
        assert!(arc_set(&topo, "provinces", 0).is_subset(
            &arc_set(&topo, "districts", 0).union(&arc_set(&topo, "districts", 1)).copied().collect()
        ));
    }

    #[test]
    fn decoded_geometry_matches_input_without_simplification() {
        let (p, d, c) = sample();
        let topo = build_topology(&p, &d, &c, 0.0).unwrap();
        let decoded = topo.features("constituencies").unwrap();
        assert_eq!(decoded[1].id, Some(Value::from(102u64)));
        let ring: AHashSet<(i64, i64)> = decoded[1].geometry.0[0].exterior().coords()
            .map(|c| ((c.x * 10.0).round() as i64, (c.y * 10.0).round() as i64))
            .collect();
        assert_eq!(ring, AHashSet::from_iter([(0, 5), (10, 5), (10, 10), (0, 10)]));
        assert_eq!(topo.bbox, Some([0.0, 0.0, 2.0, 1.0]));
    }

    #[test]
    fn empty_level_is_rejected() {
        let (p, d, _) = sample();
        let err = build_topology(&p, &d, &[], 0.0).unwrap_err();
        assert!(matches!(err, Error::EmptyInput { level: AdminLevel::Constituency }));
    }

    #[test]
    fn simplification_drops_interior_vertices() {
        // One outline shared by all three layers, with a tiny bump on the top edge.
        let wiggly = ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.5, 1.0001), (0.0, 1.0)]);
        let p = vec![province(1, wiggly.clone())];
        let d = vec![district(10, 1, wiggly.clone())];
        let c = vec![constituency(10, 1, wiggly)];

        let full = build_topology(&p, &d, &c, 0.0).unwrap();
        let thin = build_topology(&p, &d, &c, 0.01).unwrap();
        let count = |t: &Topology| t.arcs.iter().map(Vec::len).sum::<usize>();
        assert_eq!(count(&full), 6);
        assert_eq!(count(&thin), 5);
        assert_eq!(thin.features("provinces").unwrap()[0].geometry.0[0].exterior().0.len(), 5);
    }
}
