use crate::common;
use crate::error::{Error, Result};
use crate::map::{geometry::geojson_to_multipolygon, AdminUnit, Feature, RawFeature, RawResponse};

/// Features that survived normalization, plus the records dropped on the way.
#[derive(Debug)]
pub struct Normalized<P> {
    pub features: Vec<Feature<P>>,
    pub warnings: Vec<Error>,
}

/// Convert one raw upstream feature into a canonical Feature of level `P`.
///
/// Missing or non-numeric id properties are data-quality errors; a missing
/// geometry or one that is not a well-formed MultiPolygon is an
/// `InvalidGeometry` error.
pub fn normalize<P: AdminUnit>(raw: &RawFeature, ctx: &P::Context) -> Result<Feature<P>> {
    let properties = P::from_raw(&raw.properties, ctx).map_err(|reason| Error::DataQuality {
        reason: format!("{} feature: {reason}", P::LEVEL),
    })?;
    let id = properties.id();

    let invalid = |reason: String| Error::InvalidGeometry {
        level: P::LEVEL,
        id: Some(id.to_string()),
        reason,
    };
    let geometry = raw.geometry.as_ref()
        .ok_or_else(|| invalid("missing geometry".into()))?;
    let geometry = geojson_to_multipolygon(geometry).map_err(invalid)?;

    Ok(Feature { id, properties, geometry })
}

/// Normalize every feature of one upstream response, in response order.
///
/// Features with invalid geometry are dropped and reported as warnings.
/// If dropping empties a non-empty response the whole call fails with
/// `EmptyInput`; any other error is fatal.
pub fn normalize_collection<P: AdminUnit>(
    source_name: &str,
    response: RawResponse,
    ctx: &P::Context,
) -> Result<Normalized<P>> {
    let shape = response.shape();
    let raw_features = response.into_features();
    let total = raw_features.len();

    let mut features = Vec::with_capacity(total);
    let mut warnings = Vec::new();

    for raw in &raw_features {
        match normalize::<P>(raw, ctx) {
            Ok(feature) => features.push(feature),
            Err(err) if err.is_recoverable() => {
                tracing::warn!(source = source_name, "dropping feature: {err}");
                warnings.push(err);
            }
            Err(err) => return Err(err),
        }
    }

    if features.is_empty() && total > 0 {
        return Err(Error::EmptyInput { level: P::LEVEL });
    }

    tracing::debug!(
        source = source_name,
        shape,
        kept = features.len(),
        dropped = warnings.len(),
        "normalized {} features",
        P::LEVEL,
    );
    Ok(Normalized { features, warnings })
}

/// Fetch-side convenience: classify the body, then normalize it.
pub(crate) fn normalize_body<P: AdminUnit>(
    source_name: &str,
    fetched: &common::Fetched,
    ctx: &P::Context,
) -> Result<Normalized<P>> {
    let response = RawResponse::parse(source_name, &fetched.bytes, fetched.content_type.as_deref())?;
    normalize_collection::<P>(source_name, response, ctx)
}
