use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::Value;

/// Decode a GeoJSON geometry object that must be a MultiPolygon.
/// Format: [[exterior, hole, hole, ...], ...], each ring [[lon, lat], ...].
/// Returns a human-readable reason on failure.
pub(crate) fn geojson_to_multipolygon(geometry: &Value) -> Result<MultiPolygon<f64>, String> {
    let kind = geometry.get("type").and_then(Value::as_str)
        .ok_or("geometry has no type")?;
    if kind != "MultiPolygon" {
        return Err(format!("expected MultiPolygon, found {kind}"));
    }

    let polygons = geometry.get("coordinates").and_then(Value::as_array)
        .ok_or("MultiPolygon has no coordinates array")?;
    if polygons.is_empty() {
        return Err("MultiPolygon has no polygons".into());
    }

    polygons.iter()
        .map(|polygon| -> Result<Polygon<f64>, String> {
            let rings = polygon.as_array().ok_or("polygon is not an array of rings")?;
            let (exterior, interiors) = rings.split_first().ok_or("polygon has no exterior ring")?;
            Ok(Polygon::new(
                parse_ring(exterior)?,
                interiors.iter().map(parse_ring).collect::<Result<Vec<_>, String>>()?,
            ))
        })
        .collect::<Result<Vec<_>, String>>()
        .map(MultiPolygon)
}

/// Parse a ring of positions, closing it if the upstream left it open.
fn parse_ring(ring: &Value) -> Result<LineString<f64>, String> {
    let positions = ring.as_array().ok_or("ring is not an array of positions")?;

    let mut coords = positions.iter()
        .map(|position| -> Result<Coord<f64>, String> {
            let pair = position.as_array().filter(|p| p.len() >= 2)
                .ok_or("position is not a [lon, lat] pair")?;
            match (pair[0].as_f64(), pair[1].as_f64()) {
                (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Ok(Coord { x, y }),
                _ => Err("position has non-numeric coordinates".to_string()),
            }
        })
        .collect::<Result<Vec<_>, String>>()?;

    if coords.first() != coords.last() {
        coords.push(coords[0]);
    }
    if coords.len() < 4 {
        return Err(format!("ring has {} positions, at least 4 required", coords.len()));
    }

    Ok(LineString(coords))
}
