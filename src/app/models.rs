//! Data models for WorldPop Fetcher
//!
//! This module defines [`DatasetRecord`], one row of the WorldPop manifest,
//! together with the CSV parsing that turns manifest bytes into records.
//! Parsing is all-or-nothing: any malformed row fails the whole parse.

use std::collections::HashMap;
use std::fmt;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};

use crate::app::transport::local_file_name;
use crate::constants::columns;
use crate::errors::{CatalogError, CatalogResult};

/// One dataset published for one country
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetRecord {
    /// Catalog-wide unique identifier
    pub id: u32,
    /// Numeric country code, as written in the manifest
    pub country_numeric: String,
    /// ISO alpha-3 country code, the catalog's country key
    pub country_alpha3: String,
    pub country_name: String,
    /// Short machine-friendly label (e.g. "ppp_2020")
    pub dataset_name: String,
    /// Human readable description, searched case-insensitively
    pub description: String,
    /// Path of the raster relative to the remote root
    pub remote_path: String,
}

impl DatasetRecord {
    /// File name the raster will have once downloaded
    pub fn file_name(&self) -> &str {
        local_file_name(&self.remote_path)
    }

    /// Case-insensitive description match against an already lowercased needle
    pub(crate) fn description_matches(&self, needle_lower: &str) -> bool {
        self.description.to_lowercase().contains(needle_lower)
    }
}

impl fmt::Display for DatasetRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.id, self.description)
    }
}

/// Column positions resolved from the manifest header
struct ColumnMap {
    id: usize,
    numeric: usize,
    alpha3: usize,
    country_name: usize,
    dataset_name: usize,
    description: usize,
    path: usize,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> CatalogResult<Self> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|header| header == name)
                .ok_or(CatalogError::MissingField {
                    line: 1,
                    field: name,
                })
        };

        Ok(Self {
            id: find(columns::ID)?,
            numeric: find(columns::NUMERIC)?,
            alpha3: find(columns::ALPHA3)?,
            country_name: find(columns::COUNTRY_NAME)?,
            dataset_name: find(columns::DATASET_NAME)?,
            description: find(columns::DESCRIPTION)?,
            path: find(columns::PATH)?,
        })
    }
}

/// Parse manifest CSV bytes into records, in file order
///
/// Invalid UTF-8 is replaced rather than rejected. A missing column, an empty
/// ID/ISO3/PathToRaster value, a non-numeric ID or a repeated ID anywhere in
/// the file is an error for the whole catalog.
pub fn parse_catalog(bytes: &[u8]) -> CatalogResult<Vec<DatasetRecord>> {
    let text = String::from_utf8_lossy(bytes);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|source| csv_error(source, 1))?
        .clone();
    let columns = ColumnMap::from_headers(&headers)?;

    let mut records = Vec::new();
    let mut first_seen: HashMap<u32, u64> = HashMap::new();

    for (row, result) in reader.records().enumerate() {
        let fallback_line = row as u64 + 2;
        let record = result.map_err(|source| csv_error(source, fallback_line))?;
        let line = record
            .position()
            .map(|position| position.line())
            .unwrap_or(fallback_line);

        let parsed = parse_row(&record, &columns, line)?;
        if let Some(&first_line) = first_seen.get(&parsed.id) {
            return Err(CatalogError::DuplicateId {
                id: parsed.id,
                first_line,
                line,
            });
        }
        first_seen.insert(parsed.id, line);
        records.push(parsed);
    }

    Ok(records)
}

fn parse_row(record: &StringRecord, columns: &ColumnMap, line: u64) -> CatalogResult<DatasetRecord> {
    let field = |index: usize, name: &'static str| {
        record
            .get(index)
            .map(str::to_string)
            .ok_or(CatalogError::MissingField { line, field: name })
    };
    let required = |index: usize, name: &'static str| {
        field(index, name).and_then(|value| {
            if value.is_empty() {
                Err(CatalogError::MissingField { line, field: name })
            } else {
                Ok(value)
            }
        })
    };

    let raw_id = required(columns.id, columns::ID)?;
    let id = match raw_id.parse::<u32>() {
        Ok(id) if id > 0 => id,
        _ => {
            return Err(CatalogError::InvalidId {
                line,
                value: raw_id,
            })
        }
    };

    Ok(DatasetRecord {
        id,
        country_numeric: field(columns.numeric, columns::NUMERIC)?,
        country_alpha3: required(columns.alpha3, columns::ALPHA3)?.to_uppercase(),
        country_name: field(columns.country_name, columns::COUNTRY_NAME)?,
        dataset_name: field(columns.dataset_name, columns::DATASET_NAME)?,
        description: field(columns.description, columns::DESCRIPTION)?,
        remote_path: required(columns.path, columns::PATH)?,
    })
}

fn csv_error(source: csv::Error, fallback_line: u64) -> CatalogError {
    let line = source
        .position()
        .map(|position| position.line())
        .unwrap_or(fallback_line);
    CatalogError::Csv { line, source }
}
