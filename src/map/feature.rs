use geo::MultiPolygon;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::common;
use crate::lookup::{ConstituencyParent, DistrictParent};
use crate::map::{AdminLevel, ConstituencyId};

/// A canonical map feature: level id, typed properties and MultiPolygon geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature<P> {
    pub id: u64,
    pub properties: P,
    pub geometry: MultiPolygon<f64>,
}

pub type Province = Feature<ProvinceProps>;
pub type District = Feature<DistrictProps>;
pub type Constituency = Feature<ConstituencyProps>;

/// Property bag of one administrative level, built from upstream properties.
pub trait AdminUnit: Serialize + Clone + Send + Sync + Sized {
    const LEVEL: AdminLevel;

    /// Lookup rows needed to resolve this level's child ids.
    type Context: ?Sized + Sync;

    /// Build the canonical properties from raw upstream properties.
    /// Returns the name of a missing/invalid field on failure.
    fn from_raw(raw: &Map<String, Value>, ctx: &Self::Context) -> Result<Self, String>;

    /// The level id used as the Feature id.
    fn id(&self) -> u64;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvinceProps {
    pub province_id: u64,
    pub name_np: Option<String>,
    pub name_en: Option<String>,
    pub district_ids: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictProps {
    pub district_id: u64,
    pub province_id: u64,
    pub name_np: Option<String>,
    pub name_en: Option<String>,
    pub constituency_ids: Vec<ConstituencyId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstituencyProps {
    pub constituency_id: ConstituencyId,
    pub district_id: u64,
    pub sub_id: u64,
    pub province_id: u64,
    pub conservation_area: bool,
}

/// Required numeric property.
fn id_field(raw: &Map<String, Value>, key: &str) -> Result<u64, String> {
    raw.get(key)
        .and_then(common::value_as_u64)
        .ok_or_else(|| format!("missing or non-numeric property {key}"))
}

fn text_field(raw: &Map<String, Value>, key: &str) -> Option<String> {
    raw.get(key).and_then(common::value_as_string)
}

impl AdminUnit for ProvinceProps {
    const LEVEL: AdminLevel = AdminLevel::Province;
    type Context = [DistrictParent];

    fn from_raw(raw: &Map<String, Value>, districts: &[DistrictParent]) -> Result<Self, String> {
        let province_id = id_field(raw, "STATE_C")?;
        Ok(Self {
            province_id,
            name_np: text_field(raw, "STATE_N"),
            name_en: None,
            district_ids: districts.iter()
                .filter(|d| d.parent_id == province_id)
                .map(|d| d.id)
                .collect(),
        })
    }

    fn id(&self) -> u64 { self.province_id }
}

impl AdminUnit for DistrictProps {
    const LEVEL: AdminLevel = AdminLevel::District;
    type Context = [ConstituencyParent];

    fn from_raw(raw: &Map<String, Value>, constituencies: &[ConstituencyParent]) -> Result<Self, String> {
        let district_id = id_field(raw, "DCODE")?;
        let constituency_ids = constituencies.iter()
            .filter(|c| c.dist_id == district_id)
            .map(|c| ConstituencyId::compose(district_id, c.consts)
                .ok_or_else(|| format!("composite id overflow for {district_id}/{}", c.consts)))
            .collect::<Result<Vec<_>, String>>()?;

        Ok(Self {
            district_id,
            province_id: id_field(raw, "STATE_C")?,
            name_np: text_field(raw, "DISTRICT_N"),
            name_en: None,
            constituency_ids,
        })
    }

    fn id(&self) -> u64 { self.district_id }
}

impl AdminUnit for ConstituencyProps {
    const LEVEL: AdminLevel = AdminLevel::Constituency;
    type Context = ();

    fn from_raw(raw: &Map<String, Value>, _: &()) -> Result<Self, String> {
        let district_id = id_field(raw, "DCODE")?;
        let sub_id = id_field(raw, "F_CONST")?;
        let constituency_id = ConstituencyId::compose(district_id, sub_id)
            .ok_or_else(|| format!("composite id overflow for {district_id}/{sub_id}"))?;

        Ok(Self {
            constituency_id,
            district_id,
            sub_id,
            province_id: id_field(raw, "STATE_C")?,
            conservation_area: raw.get("Conservati").is_some_and(common::is_truthy),
        })
    }

    fn id(&self) -> u64 { self.constituency_id.get() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn province_children_come_from_lookup() {
        let lookup = [
            DistrictParent { id: 27, parent_id: 1 },
            DistrictParent { id: 30, parent_id: 2 },
            DistrictParent { id: 28, parent_id: 1 },
        ];
        let p = ProvinceProps::from_raw(&props(json!({"STATE_C": 1, "STATE_N": "Koshi"})), &lookup).unwrap();
        assert_eq!(p.province_id, 1);
        assert_eq!(p.name_np.as_deref(), Some("Koshi"));
        assert_eq!(p.name_en, None);
        assert_eq!(p.district_ids, vec![27, 28]);
    }

    #[test]
    fn district_children_are_composite_ids() {
        let lookup = [
            ConstituencyParent { dist_id: 27, consts: 1 },
            ConstituencyParent { dist_id: 27, consts: 2 },
            ConstituencyParent { dist_id: 9, consts: 1 },
        ];
        let d = DistrictProps::from_raw(
            &props(json!({"DCODE": 27, "DISTRICT_N": "Kathmandu", "STATE_C": 3})),
            &lookup,
        ).unwrap();
        assert_eq!(d.province_id, 3);
        assert_eq!(d.constituency_ids, vec![ConstituencyId(271), ConstituencyId(272)]);
    }

    #[test]
    fn constituency_id_and_conservation_flag() {
        let c = ConstituencyProps::from_raw(
            &props(json!({"DCODE": 27, "F_CONST": 1, "STATE_C": 3, "Conservati": null})),
            &(),
        ).unwrap();
        assert_eq!(c.constituency_id, ConstituencyId(271));
        assert!(!c.conservation_area);

        let c = ConstituencyProps::from_raw(
            &props(json!({"DCODE": "5", "F_CONST": "2", "STATE_C": 1, "Conservati": "Sagarmatha NP"})),
            &(),
        ).unwrap();
        assert_eq!(c.constituency_id, ConstituencyId(52));
        assert!(c.conservation_area);
    }

    #[test]
    fn missing_id_names_the_field() {
        let err = ConstituencyProps::from_raw(&props(json!({"DCODE": 27, "STATE_C": 3})), &()).unwrap_err();
        assert!(err.contains("F_CONST"));
    }
}
