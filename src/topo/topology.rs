use std::{collections::BTreeMap, path::Path};

use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common;
use crate::error::{Error, Result};
use crate::map::AdminLevel;

/// Shared-arc encoding of the three administrative layers.
///
/// `arcs` holds every distinct border polyline once; geometries reference
/// arcs by index, with `!i` (i.e. `-i - 1`) meaning arc `i` reversed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f64; 4]>,
    #[serde(default)]
    pub arcs: Vec<Vec<[f64; 2]>>,
    #[serde(default)]
    pub objects: BTreeMap<String, TopoObject>,
}

/// A named GeometryCollection inside a topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopoObject {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometries: Vec<TopoGeometry>,
}

/// One feature: polygons -> rings -> arc references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopoGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub properties: Value,
    pub arcs: Vec<Vec<Vec<i64>>>,
}

/// A feature decoded back out of a topology.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFeature {
    pub id: Option<Value>,
    pub properties: Value,
    pub geometry: MultiPolygon<f64>,
}

/// Resolve a (possibly reversed) arc reference.
#[inline]
pub(crate) fn arc_index(reference: i64) -> (usize, bool) {
    if reference >= 0 { (reference as usize, false) } else { ((!reference) as usize, true) }
}

impl Topology {
    pub const KIND: &'static str = "Topology";

    /// Consumer-side check: the document must be a `Topology` carrying all
    /// three named layers, and every arc reference must resolve.
    pub fn validate(&self) -> Result<()> {
        if self.kind != Self::KIND {
            return Err(Error::InvalidTopology { reason: format!("type is {:?}, expected \"Topology\"", self.kind) });
        }
        let missing: Vec<&str> = AdminLevel::ALL.iter()
            .map(|level| level.object_name())
            .filter(|name| !self.objects.contains_key(*name))
            .collect();
        if !missing.is_empty() {
            return Err(Error::InvalidTopology { reason: format!("missing objects: {}", missing.join(", ")) });
        }
        if let Some(bad) = self.objects.values()
            .flat_map(|o| &o.geometries)
            .flat_map(|g| g.arcs.iter().flatten().flatten())
            .find(|&&r| arc_index(r).0 >= self.arcs.len())
        {
            return Err(Error::InvalidTopology { reason: format!("arc reference {bad} out of range") });
        }
        Ok(())
    }

    /// Number of geometries in the named object, if present.
    pub fn object_len(&self, name: &str) -> Option<usize> {
        self.objects.get(name).map(|o| o.geometries.len())
    }

    /// Decode the named object into MultiPolygon features, stitching each
    /// ring back together from its arcs.
    pub fn features(&self, name: &str) -> Result<Vec<DecodedFeature>> {
        let object = self.objects.get(name)
            .ok_or_else(|| Error::InvalidTopology { reason: format!("missing object {name}") })?;

        object.geometries.iter()
            .map(|geometry| {
                let polygons = geometry.arcs.iter()
                    .filter_map(|rings| {
                        let mut rings = rings.iter().map(|refs| self.stitch_ring(refs));
                        let exterior = match rings.next()? {
                            Ok(ring) => ring,
                            Err(e) => return Some(Err(e)),
                        };
                        Some(rings.collect::<Result<Vec<_>>>().map(|holes| Polygon::new(exterior, holes)))
                    })
                    .collect::<Result<Vec<_>>>()?;

                Ok(DecodedFeature {
                    id: geometry.id.clone(),
                    properties: geometry.properties.clone(),
                    geometry: MultiPolygon(polygons),
                })
            })
            .collect()
    }

    fn stitch_ring(&self, refs: &[i64]) -> Result<LineString<f64>> {
        let mut coords: Vec<Coord<f64>> = Vec::new();
        for &reference in refs {
            let (idx, reversed) = arc_index(reference);
            let arc = self.arcs.get(idx)
                .ok_or_else(|| Error::InvalidTopology { reason: format!("arc reference {reference} out of range") })?;
            let points = arc.iter().map(|&[x, y]| Coord { x, y });
            // Consecutive arcs share their joining point.
            let skip = usize::from(!coords.is_empty());
            if reversed {
                coords.extend(points.rev().skip(skip));
            } else {
                coords.extend(points.skip(skip));
            }
        }
        Ok(LineString(coords))
    }
}

/// Read and validate a published topology.
pub fn read_topology(path: &Path) -> Result<Topology> {
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    let topology: Topology = common::parse_json(&path.display().to_string(), &bytes)?;
    topology.validate()?;
    Ok(topology)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn two_squares() -> Topology {
        // Two unit squares sharing the edge x = 1.
        let arcs = vec![
            vec![[1.0, 0.0], [1.0, 1.0]],                                 // shared edge
            vec![[1.0, 1.0], [0.0, 1.0], [0.0, 0.0], [1.0, 0.0]],         // left square remainder
            vec![[1.0, 0.0], [2.0, 0.0], [2.0, 1.0], [1.0, 1.0]],         // right square remainder
        ];
        let geometry = |id: u64, refs: Vec<i64>| TopoGeometry {
            kind: "MultiPolygon".into(),
            id: Some(json!(id)),
            properties: json!({ "n": id }),
            arcs: vec![vec![refs]],
        };
        let object = |geometries| TopoObject { kind: "GeometryCollection".into(), geometries };

        Topology {
            kind: "Topology".into(),
            bbox: None,
            arcs,
            objects: BTreeMap::from([
                ("provinces".to_string(), object(vec![geometry(1, vec![0, 1])])),
                ("districts".to_string(), object(vec![geometry(2, vec![2, !0])])),
                ("constituencies".to_string(), object(vec![])),
            ]),
        }
    }

    #[test]
    fn decodes_forward_and_reversed_arcs() {
        let topo = two_squares();
        topo.validate().unwrap();

        let left = &topo.features("provinces").unwrap()[0];
        assert_eq!(left.id, Some(json!(1)));
        let ring: Vec<_> = left.geometry.0[0].exterior().coords().map(|c| (c.x, c.y)).collect();
        assert_eq!(ring, vec![(1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0), (1.0, 0.0)]);

        let right = &topo.features("districts").unwrap()[0];
        let ring: Vec<_> = right.geometry.0[0].exterior().coords().map(|c| (c.x, c.y)).collect();
        assert_eq!(ring, vec![(1.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0), (1.0, 0.0)]);
    }

    #[test]
    fn rejects_wrong_type_and_missing_objects() {
        let mut topo = two_squares();
        topo.kind = "FeatureCollection".into();
        assert!(matches!(topo.validate(), Err(Error::InvalidTopology { .. })));

        let mut topo = two_squares();
        topo.objects.remove("constituencies");
        let err = topo.validate().unwrap_err();
        assert!(err.to_string().contains("constituencies"));
    }

    #[test]
    fn rejects_dangling_arc_references() {
        let mut topo = two_squares();
        topo.objects.get_mut("provinces").unwrap().geometries[0].arcs = vec![vec![vec![7]]];
        assert!(topo.validate().is_err());
        assert!(topo.features("provinces").is_err());
    }

    #[test]
    fn arc_index_decoding() {
        assert_eq!(arc_index(0), (0, false));
        assert_eq!(arc_index(5), (5, false));
        assert_eq!(arc_index(!0), (0, true));
        assert_eq!(arc_index(-3), (2, true));
    }
}
