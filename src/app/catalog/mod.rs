//! Local catalog of WorldPop datasets
//!
//! The catalog is a compressed copy of the remote manifest. This module owns
//! it end to end: keeping the file in sync with the remote and turning it
//! into queryable structures.
//!
//! # Module Organization
//!
//! - [`store`] - The catalog file: fingerprints, staleness checks and atomic refresh
//! - [`index`] - Parsed snapshot, per-country views and description search
//! - [`tests`] - Integration tests across store and index

pub mod index;
pub mod store;

#[cfg(test)]
pub mod tests;

pub use index::{CatalogSnapshot, CountryCatalog, DescriptionFilter};
pub use store::{CatalogInfo, CatalogStore, RefreshReport, StalenessReport};
