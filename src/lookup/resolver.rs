use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde_json::Value;

use crate::common::{self, Fetch};
use crate::error::{Error, Result};

/// One row of the district lookup: district `id` belongs to province `parent_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DistrictParent {
    pub id: u64,
    pub parent_id: u64,
}

/// One row of the constituency lookup: sub-constituency `consts` of district `dist_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConstituencyParent {
    pub dist_id: u64,
    pub consts: u64,
}

type Table<T> = Mutex<Option<Arc<Vec<T>>>>;

/// Lazily-loaded, read-only lookup tables for one pipeline run.
pub struct IdentifierResolver<'a> {
    fetcher: &'a dyn Fetch,
    district_url: String,
    constituency_url: String,
    districts: Table<DistrictParent>,
    constituencies: Table<ConstituencyParent>,
}

impl<'a> IdentifierResolver<'a> {
    pub fn new(fetcher: &'a dyn Fetch, district_url: impl Into<String>, constituency_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            district_url: district_url.into(),
            constituency_url: constituency_url.into(),
            districts: Mutex::new(None),
            constituencies: Mutex::new(None),
        }
    }

    /// District -> province parentage, `[{id, parentId}]` upstream.
    pub fn resolve_district_parents(&self) -> Result<Arc<Vec<DistrictParent>>> {
        load_once(&self.districts, || {
            let rows = self.fetch_rows(&self.district_url)?;
            rows.iter()
                .map(|row| -> Result<DistrictParent> { Ok(DistrictParent {
                    id: field(row, "id", &self.district_url)?,
                    parent_id: field(row, "parentId", &self.district_url)?,
                }) })
                .collect()
        })
    }

    /// Constituency -> district parentage, `[{distId, consts}]` upstream.
    pub fn resolve_constituency_parents(&self) -> Result<Arc<Vec<ConstituencyParent>>> {
        load_once(&self.constituencies, || {
            let rows = self.fetch_rows(&self.constituency_url)?;
            rows.iter()
                .map(|row| -> Result<ConstituencyParent> { Ok(ConstituencyParent {
                    dist_id: field(row, "distId", &self.constituency_url)?,
                    consts: field(row, "consts", &self.constituency_url)?,
                }) })
                .collect()
        })
    }

    /// Fetch a table body and check that it is a JSON array.
    fn fetch_rows(&self, url: &str) -> Result<Vec<Value>> {
        let fetched = self.fetcher.fetch(url).map_err(|e| match e {
            Error::Fetch { url, status, .. } => Error::LookupFetch { url, status },
            other => other,
        })?;

        let lookup_parse = |reason: String| Error::LookupParse {
            url: url.to_string(),
            reason,
            preview: common::preview(&fetched.bytes),
        };

        if common::looks_like_html(&fetched.bytes, fetched.content_type.as_deref()) {
            return Err(lookup_parse("received HTML instead of JSON".into()));
        }
        match serde_json::from_slice::<Value>(&fetched.bytes) {
            Ok(Value::Array(rows)) => {
                tracing::debug!(url, rows = rows.len(), "loaded lookup table");
                Ok(rows)
            }
            Ok(other) => Err(lookup_parse(format!("expected an array, found {}", common::kind_of(&other)))),
            Err(e) => Err(lookup_parse(e.to_string())),
        }
    }
}

/// Return the cached table, or populate it while holding the lock.
/// A failed load is not cached; the next caller retries.
fn load_once<T>(cell: &Table<T>, load: impl FnOnce() -> Result<Vec<T>>) -> Result<Arc<Vec<T>>> {
    let mut slot = cell.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(table) = slot.as_ref() {
        return Ok(Arc::clone(table));
    }
    let table = Arc::new(load()?);
    *slot = Some(Arc::clone(&table));
    Ok(table)
}

fn field(row: &Value, key: &str, url: &str) -> Result<u64> {
    row.get(key)
        .and_then(common::value_as_u64)
        .ok_or_else(|| Error::LookupParse {
            url: url.to_string(),
            reason: format!("row is missing numeric field {key:?}"),
            preview: common::preview(row.to_string().as_bytes()),
        })
}
