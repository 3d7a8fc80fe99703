use std::fmt;

use serde::{Deserialize, Serialize};

/// The three administrative levels of the map hierarchy, coarsest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminLevel {
    Province,
    District,
    Constituency,
}

impl AdminLevel {
    pub const ALL: [AdminLevel; 3] = [Self::Province, Self::District, Self::Constituency];

    pub fn to_str(&self) -> &'static str {
        match self {
            Self::Province => "province",
            Self::District => "district",
            Self::Constituency => "constituency",
        }
    }

    /// Name of the level's object inside the published topology.
    pub fn object_name(&self) -> &'static str {
        match self {
            Self::Province => "provinces",
            Self::District => "districts",
            Self::Constituency => "constituencies",
        }
    }
}

impl fmt::Display for AdminLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}
