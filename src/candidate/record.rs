use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::common::{is_truthy, value_as_string, value_as_u64};
use crate::error::{Error, Result};
use crate::map::ConstituencyId;

/// One canonical candidate record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub candidate_id: u64,
    pub name_np: Option<String>,
    pub name_en: Option<String>,
    pub age: Option<u32>,
    pub gender: String,
    pub image_url: String,
    pub constituency_id: ConstituencyId,
    pub district: u64,
    pub province: Option<u64>,
    pub experience: Option<String>,
    pub qualification: Option<String>,
    pub party: String,
    pub symbol_id: Option<u64>,
    pub votes: u64,
    pub elected: bool,
}

impl Candidate {
    /// Map one upstream record. The district and sub-constituency fields
    /// must be present since they determine `constituency_id`.
    pub fn from_raw(raw: &Value, image_base: &str) -> Result<Self> {
        let Some(fields) = raw.as_object() else {
            return Err(Error::MalformedCandidate { candidate_id: None, reason: "record is not an object".into() });
        };
        let number = |key: &str| fields.get(key).and_then(value_as_u64);
        let text = |key: &str| fields.get(key).and_then(value_as_string).filter(|s| !s.is_empty());
        let candidate_id = number("CandidateID");
        let malformed = move |reason: String| Error::MalformedCandidate { candidate_id, reason };

        let Some(candidate_id) = candidate_id else {
            return Err(malformed("missing CandidateID".into()));
        };
        let district = number("DistrictCd").ok_or_else(|| malformed("missing or non-numeric DistrictCd".into()))?;
        let sub_id = number("SCConstID").ok_or_else(|| malformed("missing or non-numeric SCConstID".into()))?;
        let constituency_id = ConstituencyId::compose(district, sub_id)
            .ok_or_else(|| malformed(format!("composite id overflow for {district}/{sub_id}")))?;
        let votes = votes_field(fields).map_err(malformed)?;

        Ok(Self {
            candidate_id,
            name_np: text("CandidateName"),
            name_en: None,
            age: number("Age").and_then(|a| u32::try_from(a).ok()),
            gender: text("Gender").unwrap_or_default(),
            image_url: format!("{image_base}{candidate_id}"),
            constituency_id,
            district,
            province: number("State"),
            experience: text("EXPERIENCE"),
            qualification: text("QUALIFICATION"),
            party: text("PoliticalPartyName").unwrap_or_default(),
            symbol_id: number("SymbolID"),
            votes,
            elected: fields.get("Remarks").is_some_and(is_truthy),
        })
    }

    pub fn gender_class(&self) -> Gender {
        Gender::classify(&self.gender)
    }
}

/// Absent or null counts as zero votes; anything else must be numeric.
fn votes_field(fields: &Map<String, Value>) -> std::result::Result<u64, String> {
    match fields.get("TotalVoteReceived") {
        None | Some(Value::Null) => Ok(0),
        Some(v) => value_as_u64(v).ok_or_else(|| format!("non-numeric TotalVoteReceived {v}")),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Case-insensitive match against the English and Nepali tokens.
    pub fn classify(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "male" | "म" => Self::Male,
            "female" | "महि" => Self::Female,
            _ => Self::Other,
        }
    }
}
