use std::fmt;

use serde::{Deserialize, Serialize};

/// Composite constituency key: the decimal digits of the district id
/// followed by the digits of the in-district sub id, read back as one integer.
/// E.g. district 27, sub id 1 -> 271.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConstituencyId(pub u64);

impl ConstituencyId {
    /// Returns `None` if the concatenation overflows `u64`.
    pub fn compose(district_id: u64, sub_id: u64) -> Option<Self> {
        format!("{district_id}{sub_id}").parse().ok().map(Self)
    }

    #[inline] pub fn get(&self) -> u64 { self.0 }
}

impl fmt::Display for ConstituencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
