mod feature;
mod geometry;
mod ids;
mod level;
mod normalize;
mod raw;

pub use feature::{
    AdminUnit, Constituency, ConstituencyProps, District, DistrictProps, Feature, Province, ProvinceProps,
};
pub use ids::ConstituencyId;
pub use level::AdminLevel;
pub use normalize::{normalize, normalize_collection, Normalized};
pub(crate) use normalize::normalize_body;
pub use raw::{RawFeature, RawResponse};
