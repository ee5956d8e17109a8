//! Integration tests for catalog functionality
//!
//! These tests drive the store and the index together through a scripted
//! transport, from an empty workspace to per-country queries.
