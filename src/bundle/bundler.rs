use std::{collections::HashSet, sync::Mutex, time::Instant};

use rayon::prelude::*;

use crate::common::Fetch;
use crate::config::Endpoints;
use crate::error::{Error, Result};
use crate::lookup::IdentifierResolver;
use crate::map::{
    normalize_body, AdminLevel, AdminUnit, Constituency, ConstituencyProps, District, DistrictProps, Feature,
    Normalized, Province, ProvinceProps,
};

/// The three canonical collections produced by one bundling run,
/// in fetch order, plus every record dropped along the way.
#[derive(Debug, Default)]
pub struct Hierarchy {
    pub provinces: Vec<Province>,
    pub districts: Vec<District>,
    pub constituencies: Vec<Constituency>,
    pub warnings: Vec<Error>,
}

impl Hierarchy {
    /// Fail with `EmptyInput` naming the first empty level.
    pub fn ensure_non_empty(&self) -> Result<()> {
        for (level, len) in [
            (AdminLevel::Province, self.provinces.len()),
            (AdminLevel::District, self.districts.len()),
            (AdminLevel::Constituency, self.constituencies.len()),
        ] {
            if len == 0 {
                return Err(Error::EmptyInput { level });
            }
        }
        Ok(())
    }
}

/// Walks province -> district -> constituency, one request per parent.
pub struct HierarchicalBundler<'a> {
    fetcher: &'a dyn Fetch,
    resolver: &'a IdentifierResolver<'a>,
    endpoints: &'a Endpoints,
    concurrency: usize,
    warnings: Mutex<Vec<Error>>,
}

impl<'a> HierarchicalBundler<'a> {
    pub fn new(fetcher: &'a dyn Fetch, resolver: &'a IdentifierResolver<'a>, endpoints: &'a Endpoints) -> Self {
        Self { fetcher, resolver, endpoints, concurrency: 1, warnings: Mutex::new(Vec::new()) }
    }

    /// Number of worker threads used for district/constituency fan-out.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// One fetch for all provinces, joined against the district lookup.
    pub fn bundle_provinces(&self) -> Result<Vec<Province>> {
        let districts = self.resolver.resolve_district_parents()?;
        self.fetch_level::<ProvinceProps>(&self.endpoints.provinces, &districts)
    }

    /// One fetch for the districts of `province_id`, joined against the constituency lookup.
    pub fn bundle_districts(&self, province_id: u64) -> Result<Vec<District>> {
        let constituencies = self.resolver.resolve_constituency_parents()?;
        let districts = self.fetch_level::<DistrictProps>(&self.endpoints.district_url(province_id), &constituencies)?;

        if let Some(stray) = districts.iter().find(|d| d.properties.province_id != province_id) {
            return Err(Error::DataQuality {
                reason: format!(
                    "district {} fetched for province {province_id} claims province {}",
                    stray.id, stray.properties.province_id,
                ),
            });
        }
        Ok(districts)
    }

    /// One fetch for the constituencies of `district_id`.
    pub fn bundle_constituencies(&self, district_id: u64) -> Result<Vec<Constituency>> {
        let constituencies = self.fetch_level::<ConstituencyProps>(&self.endpoints.constituency_url(district_id), &())?;

        if let Some(stray) = constituencies.iter().find(|c| c.properties.district_id != district_id) {
            return Err(Error::DataQuality {
                reason: format!(
                    "constituency {} fetched for district {district_id} claims district {}",
                    stray.id, stray.properties.district_id,
                ),
            });
        }
        Ok(constituencies)
    }

    /// Full fan-out: 1 + P + D requests for P provinces and D districts.
    /// Any failed request aborts the run; output order matches the
    /// sequential walk regardless of concurrency.
    pub fn bundle_all(&self) -> Result<Hierarchy> {
        let start = Instant::now();
        let provinces = self.bundle_provinces()?;
        tracing::info!(count = provinces.len(), "bundled provinces");

        let province_ids: Vec<u64> = provinces.iter().map(|p| p.id).collect();
        let districts = self.fan_out(AdminLevel::District, &province_ids, |id| self.bundle_districts(id))?;
        tracing::info!(count = districts.len(), elapsed = ?start.elapsed(), "bundled districts");

        let district_ids: Vec<u64> = districts.iter().map(|d| d.id).collect();
        let constituencies = self.fan_out(AdminLevel::Constituency, &district_ids, |id| self.bundle_constituencies(id))?;
        tracing::info!(count = constituencies.len(), elapsed = ?start.elapsed(), "bundled constituencies");

        ensure_unique(AdminLevel::District, &districts)?;
        ensure_unique(AdminLevel::Constituency, &constituencies)?;

        Ok(Hierarchy { provinces, districts, constituencies, warnings: self.take_warnings() })
    }

    /// Drain the records dropped so far.
    pub fn take_warnings(&self) -> Vec<Error> {
        self.warnings.lock()
            .map(|mut w| std::mem::take(&mut *w))
            .unwrap_or_default()
    }

    fn fetch_level<P: AdminUnit>(&self, url: &str, ctx: &P::Context) -> Result<Vec<Feature<P>>> {
        let fetched = self.fetcher.fetch(url)?;
        let Normalized { features, warnings } = normalize_body::<P>(url, &fetched, ctx)?;
        if !warnings.is_empty() {
            if let Ok(mut all) = self.warnings.lock() {
                all.extend(warnings);
            }
        }
        Ok(features)
    }

    /// Run `bundle` for every parent id, concatenating results in parent order.
    fn fan_out<T, F>(&self, level: AdminLevel, parents: &[u64], bundle: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(u64) -> Result<Vec<T>> + Sync,
    {
        let with_parent = |id: u64| bundle(id).map_err(|e| Error::Fanout {
            level,
            parent_id: id,
            source: Box::new(e),
        });

        let sequential = || parents.iter().map(|&id| with_parent(id)).collect::<Result<Vec<_>>>();

        let batches = if self.concurrency > 1 {
            match rayon::ThreadPoolBuilder::new().num_threads(self.concurrency).build() {
                Ok(pool) => pool.install(|| {
                    parents.par_iter().map(|&id| with_parent(id)).collect::<Result<Vec<_>>>()
                }),
                Err(e) => {
                    tracing::warn!("worker pool unavailable, bundling sequentially: {e}");
                    sequential()
                }
            }
        } else {
            sequential()
        }?;

        Ok(batches.into_iter().flatten().collect())
    }
}

fn ensure_unique<P>(level: AdminLevel, features: &[Feature<P>]) -> Result<()> {
    let mut seen = HashSet::with_capacity(features.len());
    let duplicates: Vec<String> = features.iter()
        .filter(|f| !seen.insert(f.id))
        .map(|f| f.id.to_string())
        .collect();

    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(Error::DataQuality {
            reason: format!("duplicate {level} ids: {}", duplicates.join(", ")),
        })
    }
}
