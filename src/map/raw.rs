use serde_json::{Map, Value};

use crate::common;
use crate::error::{Error, Result};

/// One upstream feature before normalization.
#[derive(Debug, Clone, Default)]
pub struct RawFeature {
    pub properties: Map<String, Value>,
    pub geometry: Option<Value>,
}

impl RawFeature {
    fn from_value(value: Value, source_name: &str) -> Result<Self> {
        let Value::Object(mut obj) = value else {
            return Err(Error::UnexpectedShape {
                source_name: source_name.to_string(),
                found: "non-object feature entry",
            });
        };
        let properties = match obj.remove("properties") {
            Some(Value::Object(props)) => props,
            _ => Map::new(),
        };
        let geometry = obj.remove("geometry").filter(|g| !g.is_null());
        Ok(Self { properties, geometry })
    }
}

/// Upstream geometry responses come either as a bare array of features
/// or wrapped in a FeatureCollection, depending on the endpoint.
#[derive(Debug, Clone)]
pub enum RawResponse {
    Array(Vec<RawFeature>),
    FeatureCollection(Vec<RawFeature>),
}

impl RawResponse {
    /// Classify and decode a response body. HTML pages and invalid JSON fail
    /// with `Error::Parse`, any other JSON shape with `Error::UnexpectedShape`.
    pub fn parse(source_name: &str, bytes: &[u8], content_type: Option<&str>) -> Result<Self> {
        if common::looks_like_html(bytes, content_type) {
            return Err(Error::Parse {
                source_name: source_name.to_string(),
                reason: "received HTML instead of JSON".into(),
                preview: common::preview(bytes),
            });
        }
        Self::from_value(source_name, common::parse_json(source_name, bytes)?)
    }

    pub fn from_value(source_name: &str, value: Value) -> Result<Self> {
        let features = |items: Vec<Value>| items.into_iter()
            .map(|item| RawFeature::from_value(item, source_name))
            .collect::<Result<Vec<_>>>();

        match value {
            Value::Array(items) => Ok(Self::Array(features(items)?)),
            Value::Object(mut obj) => {
                let is_collection = obj.get("type").and_then(Value::as_str) == Some("FeatureCollection");
                match obj.remove("features") {
                    Some(Value::Array(items)) if is_collection => Ok(Self::FeatureCollection(features(items)?)),
                    _ => Err(Error::UnexpectedShape {
                        source_name: source_name.to_string(),
                        found: "object that is not a FeatureCollection",
                    }),
                }
            }
            other => Err(Error::UnexpectedShape {
                source_name: source_name.to_string(),
                found: common::kind_of(&other),
            }),
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            Self::Array(_) => "array",
            Self::FeatureCollection(_) => "FeatureCollection",
        }
    }

    pub fn into_features(self) -> Vec<RawFeature> {
        match self {
            Self::Array(f) | Self::FeatureCollection(f) => f,
        }
    }
}
