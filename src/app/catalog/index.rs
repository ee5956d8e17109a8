//! In-memory catalog and per-country views
//!
//! [`CatalogSnapshot`] is the parsed catalog file, immutable once built and
//! replaced wholesale after a refresh. [`CountryCatalog`] is a borrowed
//! projection of the snapshot onto one alpha-3 code; it keeps catalog order
//! and answers id lookups and description searches.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use tracing::debug;

use crate::app::fingerprint::{read_decompressed, Compression};
use crate::app::models::{parse_catalog, DatasetRecord};
use crate::errors::{CatalogResult, UserInputError, UserInputResult};

/// Every record of the local catalog, in file order
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    records: Vec<DatasetRecord>,
    positions: HashMap<u32, usize>,
}

impl CatalogSnapshot {
    /// Decompress and parse a catalog file
    pub fn load(path: &Path, compression: Compression) -> CatalogResult<Self> {
        let bytes = read_decompressed(path, compression)?;
        let snapshot = Self::parse(&bytes)?;
        debug!(
            "Loaded {} catalog records from {}",
            snapshot.len(),
            path.display()
        );
        Ok(snapshot)
    }

    /// Parse raw manifest CSV bytes
    pub fn parse(bytes: &[u8]) -> CatalogResult<Self> {
        Ok(Self::from_parsed(parse_catalog(bytes)?))
    }

    fn from_parsed(records: Vec<DatasetRecord>) -> Self {
        let positions = records
            .iter()
            .enumerate()
            .map(|(position, record)| (record.id, position))
            .collect();
        Self { records, positions }
    }

    pub fn records(&self) -> &[DatasetRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record anywhere in the catalog
    pub fn get(&self, id: u32) -> Option<&DatasetRecord> {
        self.positions.get(&id).map(|&position| &self.records[position])
    }

    /// Distinct alpha-3 codes that have at least one dataset
    pub fn countries(&self) -> BTreeSet<&str> {
        self.records
            .iter()
            .map(|record| record.country_alpha3.as_str())
            .collect()
    }

    /// Build the view for one country in a single pass
    ///
    /// An empty code is a usage error. A code with no records gives an empty
    /// (valid) view; callers decide how to warn about it.
    pub fn by_country(&self, alpha3: &str) -> UserInputResult<CountryCatalog<'_>> {
        let alpha3 = alpha3.trim();
        if alpha3.is_empty() {
            return Err(UserInputError::MissingCountry);
        }

        let alpha3 = alpha3.to_uppercase();
        let entries: Vec<&DatasetRecord> = self
            .records
            .iter()
            .filter(|record| record.country_alpha3 == alpha3)
            .collect();

        if entries.is_empty() {
            debug!("Found 0 products for {}", alpha3);
        }

        Ok(CountryCatalog::new(alpha3, entries))
    }
}

/// Read-only view of one country's datasets
#[derive(Debug, Clone)]
pub struct CountryCatalog<'a> {
    alpha3: String,
    entries: Vec<&'a DatasetRecord>,
    positions: HashMap<u32, usize>,
}

impl<'a> CountryCatalog<'a> {
    fn new(alpha3: String, entries: Vec<&'a DatasetRecord>) -> Self {
        let positions = entries
            .iter()
            .enumerate()
            .map(|(position, record)| (record.id, position))
            .collect();
        Self {
            alpha3,
            entries,
            positions,
        }
    }

    pub fn alpha3(&self) -> &str {
        &self.alpha3
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, id: u32) -> Option<&'a DatasetRecord> {
        self.positions.get(&id).map(|&position| self.entries[position])
    }

    pub fn contains(&self, id: u32) -> bool {
        self.positions.contains_key(&id)
    }

    /// Records in catalog order
    pub fn records(&self) -> impl Iterator<Item = &'a DatasetRecord> + '_ {
        self.entries.iter().copied()
    }

    /// `(id, record)` pairs in catalog order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &'a DatasetRecord)> + '_ {
        self.entries.iter().map(|record| (record.id, *record))
    }

    pub fn ids(&self) -> BTreeSet<u32> {
        self.positions.keys().copied().collect()
    }

    /// Lazily filter by case-insensitive description substring
    ///
    /// The returned iterator is `Clone`, so the same search can be replayed
    /// without re-filtering.
    pub fn filter_by_description(&self, needle: &str) -> DescriptionFilter<'_, 'a> {
        DescriptionFilter {
            needle: needle.to_lowercase(),
            inner: self.entries.iter(),
        }
    }

    /// Narrow this view to the records matching a description search
    pub fn restrict_to(&self, needle: &str) -> CountryCatalog<'a> {
        let entries = self
            .filter_by_description(needle)
            .map(|(_, record)| record)
            .collect();
        CountryCatalog::new(self.alpha3.clone(), entries)
    }
}

/// Iterator returned by [`CountryCatalog::filter_by_description`]
#[derive(Debug, Clone)]
pub struct DescriptionFilter<'v, 'a> {
    needle: String,
    inner: std::slice::Iter<'v, &'a DatasetRecord>,
}

impl<'v, 'a> Iterator for DescriptionFilter<'v, 'a> {
    type Item = (u32, &'a DatasetRecord);

    fn next(&mut self) -> Option<Self::Item> {
        let needle = &self.needle;
        self.inner
            .by_ref()
            .find(|record| record.description_matches(needle))
            .map(|record| (record.id, *record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u32, alpha3: &str, description: &str) -> DatasetRecord {
        DatasetRecord {
            id,
            country_numeric: "000".to_string(),
            country_alpha3: alpha3.to_string(),
            country_name: alpha3.to_string(),
            dataset_name: format!("ds_{}", id),
            description: description.to_string(),
            remote_path: format!("GIS/{}/{}.tif", alpha3, id),
        }
    }

    fn snapshot() -> CatalogSnapshot {
        CatalogSnapshot::from_parsed(vec![
            record(1, "KEN", "Population count 2000"),
            record(3, "UGA", "Population count 2000"),
            record(2, "KEN", "Night-time LIGHTS 2012"),
            record(9, "KEN", "population density 2020"),
        ])
    }

    #[test]
    fn test_by_country_exact_membership() {
        let snapshot = snapshot();
        let kenya = snapshot.by_country("KEN").unwrap();

        let ids: Vec<u32> = kenya.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![1, 2, 9]);
        assert!(kenya.records().all(|r| r.country_alpha3 == "KEN"));

        let expected = snapshot
            .records()
            .iter()
            .filter(|r| r.country_alpha3 == "KEN")
            .count();
        assert_eq!(kenya.len(), expected);
    }

    #[test]
    fn test_by_country_normalises_case() {
        let snapshot = snapshot();
        assert_eq!(snapshot.by_country("ken").unwrap().len(), 3);
        assert_eq!(snapshot.by_country(" uga ").unwrap().alpha3(), "UGA");
    }

    #[test]
    fn test_by_country_empty_code_is_usage_error() {
        let snapshot = snapshot();
        assert!(matches!(
            snapshot.by_country("").unwrap_err(),
            UserInputError::MissingCountry
        ));
    }

    #[test]
    fn test_country_without_records_is_empty_view() {
        let snapshot = snapshot();
        let tanzania = snapshot.by_country("TZA").unwrap();
        assert!(tanzania.is_empty());
        assert_eq!(tanzania.ids(), BTreeSet::new());
    }

    #[test]
    fn test_lookup_returns_option() {
        let snapshot = snapshot();
        let kenya = snapshot.by_country("KEN").unwrap();
        assert_eq!(kenya.lookup(2).unwrap().description, "Night-time LIGHTS 2012");
        assert!(kenya.lookup(3).is_none());
        assert!(snapshot.get(3).is_some());
    }

    #[test]
    fn test_filter_is_case_insensitive_and_restartable() {
        let snapshot = snapshot();
        let kenya = snapshot.by_country("KEN").unwrap();

        let filter = kenya.filter_by_description("POPULATION");
        let first: Vec<u32> = filter.clone().map(|(id, _)| id).collect();
        let second: Vec<u32> = filter.map(|(id, _)| id).collect();
        let third: Vec<u32> = kenya
            .filter_by_description("population")
            .map(|(id, _)| id)
            .collect();

        assert_eq!(first, vec![1, 9]);
        assert_eq!(first, second);
        assert_eq!(first, third);
        assert_eq!(kenya.filter_by_description("lights").count(), 1);
        assert_eq!(kenya.filter_by_description("nothing").count(), 0);
    }

    #[test]
    fn test_restrict_to_keeps_order() {
        let snapshot = snapshot();
        let kenya = snapshot.by_country("KEN").unwrap();
        let restricted = kenya.restrict_to("population");

        assert_eq!(restricted.ids(), BTreeSet::from([1, 9]));
        assert!(!restricted.contains(2));
        assert_eq!(kenya.len(), 3);
    }

    #[test]
    fn test_countries_are_distinct() {
        let snapshot = snapshot();
        let countries: Vec<&str> = snapshot.countries().into_iter().collect();
        assert_eq!(countries, vec!["KEN", "UGA"]);
    }
}
