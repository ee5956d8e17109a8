//! Reconciling requested dataset ids with the catalog
//!
//! A download request names a country, a set of ids and optionally a
//! description filter. Resolution narrows the country's datasets by the
//! filter, splits the requested ids into those present and those not, and
//! returns the present ones as an ordered plan. Everything that is odd but
//! not fatal comes back as a [`ResolveWarning`].

use std::collections::BTreeSet;
use std::fmt;

use tracing::{debug, warn};

use crate::app::catalog::{CatalogSnapshot, CountryCatalog};
use crate::app::countries;
use crate::app::models::DatasetRecord;
use crate::errors::{UserInputError, UserInputResult};

/// Non-fatal findings surfaced to the user during resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveWarning {
    /// The country exists but the catalog has nothing for it
    EmptyCountry { alpha3: String },
    /// The description filter matched nothing
    NoFilterMatches { filter: String },
    /// Requested ids that are not in the (filtered) country catalog
    UnknownIds { ids: BTreeSet<u32> },
}

impl fmt::Display for ResolveWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveWarning::EmptyCountry { alpha3 } => {
                write!(f, "No datasets are published for {}", alpha3)
            }
            ResolveWarning::NoFilterMatches { filter } => {
                write!(f, "The query '{}' did not produce any results", filter)
            }
            ResolveWarning::UnknownIds { ids } => {
                let ids: Vec<String> = ids.iter().map(u32::to_string).collect();
                write!(f, "The ids ({}) were not found", ids.join(", "))
            }
        }
    }
}

/// A country's datasets after filtering, plus what was noticed on the way
#[derive(Debug)]
pub struct CountrySelection<'a> {
    pub catalog: CountryCatalog<'a>,
    pub warnings: Vec<ResolveWarning>,
}

/// Outcome of resolving a download request
#[derive(Debug, Clone)]
pub struct ResolvedPlan {
    pub alpha3: String,
    /// Records to download, in catalog order
    pub targets: Vec<DatasetRecord>,
    pub valid_ids: BTreeSet<u32>,
    pub invalid_ids: BTreeSet<u32>,
    pub warnings: Vec<ResolveWarning>,
}

/// Map any accepted country code to its alpha-3 form
pub fn canonical_alpha3(code: &str) -> UserInputResult<&'static str> {
    let code = code.trim();
    if code.is_empty() {
        return Err(UserInputError::MissingCountry);
    }
    countries::lookup(code)
        .map(|country| country.alpha3)
        .ok_or_else(|| UserInputError::UnknownCountry {
            code: code.to_string(),
        })
}

/// Resolve a country code and optional description filter to a view
pub fn select_country<'a>(
    snapshot: &'a CatalogSnapshot,
    code: &str,
    filter: Option<&str>,
) -> UserInputResult<CountrySelection<'a>> {
    let alpha3 = canonical_alpha3(code)?;
    let mut catalog = snapshot.by_country(alpha3)?;
    let mut warnings = Vec::new();

    if catalog.is_empty() {
        warnings.push(ResolveWarning::EmptyCountry {
            alpha3: alpha3.to_string(),
        });
    }

    if let Some(filter) = filter.filter(|f| !f.is_empty()) {
        catalog = catalog.restrict_to(filter);
        debug!("Filter '{}' kept {} datasets for {}", filter, catalog.len(), alpha3);
        if catalog.is_empty() {
            warnings.push(ResolveWarning::NoFilterMatches {
                filter: filter.to_string(),
            });
        }
    }

    Ok(CountrySelection { catalog, warnings })
}

/// Split `requested` into ids present in `catalog` and ids that are not
pub fn partition_ids(
    catalog: &CountryCatalog<'_>,
    requested: &BTreeSet<u32>,
) -> (BTreeSet<u32>, BTreeSet<u32>) {
    requested.iter().partition(|&&id| catalog.contains(id))
}

/// Parse `--id` values; each may hold one id or a comma separated list
pub fn parse_ids<S: AsRef<str>>(values: &[S]) -> UserInputResult<BTreeSet<u32>> {
    let mut ids = BTreeSet::new();
    for value in values {
        for part in value.as_ref().split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            match part.parse::<u32>() {
                Ok(id) if id > 0 => {
                    ids.insert(id);
                }
                _ => {
                    return Err(UserInputError::InvalidId {
                        value: part.to_string(),
                    })
                }
            }
        }
    }
    Ok(ids)
}

/// Turn a download request into an ordered plan
///
/// Fails on an unknown or empty country code, on an empty id set and when
/// none of the requested ids exist. Unknown ids among valid ones, an empty
/// country and a filter without matches only produce warnings.
pub fn resolve_targets(
    snapshot: &CatalogSnapshot,
    code: &str,
    ids: impl IntoIterator<Item = u32>,
    filter: Option<&str>,
) -> UserInputResult<ResolvedPlan> {
    let CountrySelection {
        catalog,
        mut warnings,
    } = select_country(snapshot, code, filter)?;

    let requested: BTreeSet<u32> = ids.into_iter().collect();
    if requested.is_empty() {
        return Err(UserInputError::NoIdsProvided);
    }

    let (valid_ids, invalid_ids) = partition_ids(&catalog, &requested);
    if valid_ids.is_empty() {
        return Err(UserInputError::NoMatchingProducts {
            alpha3: catalog.alpha3().to_string(),
            requested: requested.into_iter().collect(),
        });
    }

    if !invalid_ids.is_empty() {
        warn!("Ignoring unknown dataset ids {:?}", invalid_ids);
        warnings.push(ResolveWarning::UnknownIds {
            ids: invalid_ids.clone(),
        });
    }

    let targets = catalog
        .records()
        .filter(|record| valid_ids.contains(&record.id))
        .cloned()
        .collect();

    Ok(ResolvedPlan {
        alpha3: catalog.alpha3().to_string(),
        targets,
        valid_ids,
        invalid_ids,
        warnings,
    })
}
