//! A small two-province fixture served from memory.
#![allow(dead_code)]

use electmap::{Endpoints, MemFetcher, PipelineConfig};
use serde_json::{json, Value};

pub const BASE: &str = "http://mirror";

/// (district id, province id, x offset, sub-constituency count)
pub const DISTRICTS: [(u64, u64, f64, u64); 3] = [(27, 1, 0.0, 2), (28, 1, 1.0, 1), (30, 2, 2.0, 2)];

pub fn endpoints() -> Endpoints {
    Endpoints::with_base(BASE)
}

pub fn config(output: &std::path::Path) -> PipelineConfig {
    PipelineConfig {
        endpoints: endpoints(),
        output: output.to_path_buf(),
        tolerance: 0.0,
        ..PipelineConfig::default()
    }
}

pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Value {
    json!({
        "type": "MultiPolygon",
        "coordinates": [[[[x0, y0], [x1, y0], [x1, y1], [x0, y1], [x0, y0]]]],
    })
}

fn feature(properties: Value, geometry: Value) -> Value {
    json!({ "type": "Feature", "properties": properties, "geometry": geometry })
}

fn collection(features: Vec<Value>) -> String {
    json!({ "type": "FeatureCollection", "features": features }).to_string()
}

pub fn constituency_features(district_id: u64) -> Vec<Value> {
    let (_, province_id, x, subs) = DISTRICTS.iter().copied()
        .find(|d| d.0 == district_id)
        .expect("fixture district");
    let step = 1.0 / subs as f64;
    (1..=subs)
        .map(|sub| {
            let y0 = (sub - 1) as f64 * step;
            feature(
                json!({ "DCODE": district_id, "F_CONST": sub, "STATE_C": province_id, "Conservati": null }),
                rect(x, y0, x + 1.0, y0 + step),
            )
        })
        .collect()
}

/// Every upstream document for the fixture. Later `with_*` calls on the
/// returned fetcher replace individual responses.
pub fn fetcher() -> MemFetcher {
    let e = endpoints();

    let provinces = collection(vec![
        feature(json!({ "STATE_C": 1, "STATE_N": "Koshi" }), rect(0.0, 0.0, 2.0, 1.0)),
        feature(json!({ "STATE_C": 2, "STATE_N": "Madhesh" }), rect(2.0, 0.0, 3.0, 1.0)),
    ]);

    let district_lookup: Vec<Value> = DISTRICTS.iter()
        .map(|&(id, parent, _, _)| json!({ "id": id, "parentId": parent }))
        .collect();
    let constituency_lookup: Vec<Value> = DISTRICTS.iter()
        .flat_map(|&(id, _, _, subs)| (1..=subs).map(move |sub| json!({ "distId": id, "consts": sub })))
        .collect();

    let mut fetcher = MemFetcher::new()
        .with_json(&e.provinces, provinces)
        .with_json(&e.district_lookup, Value::from(district_lookup).to_string())
        .with_json(&e.constituency_lookup, Value::from(constituency_lookup).to_string());

    for province_id in [1, 2] {
        // District files arrive as bare arrays.
        let districts: Vec<Value> = DISTRICTS.iter()
            .filter(|d| d.1 == province_id)
            .map(|&(id, parent, x, _)| feature(
                json!({ "DCODE": id, "DISTRICT_N": format!("D{id}"), "STATE_C": parent }),
                rect(x, 0.0, x + 1.0, 1.0),
            ))
            .collect();
        fetcher = fetcher.with_json(e.district_url(province_id), Value::from(districts).to_string());
    }
    for (district_id, ..) in DISTRICTS {
        fetcher = fetcher.with_json(e.constituency_url(district_id), collection(constituency_features(district_id)));
    }
    fetcher
}

pub fn feature_collection(features: Vec<Value>) -> String {
    collection(features)
}
