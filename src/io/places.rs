//! Read-only place dataset
//!
//! The dataset ships pre-seeded as JSONL, one record per line:
//! `{"name":"Picnic Point","lat":43.0898,"lon":-89.4154}`. It is loaded
//! once at startup into memory; the search path never touches disk.

use crate::domain::types::PlaceRecord;
use anyhow::Context;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// In-memory table of place records, in dataset file order
pub struct PlaceStore {
    records: Vec<PlaceRecord>,
}

impl PlaceStore {
    /// Load a JSONL dataset, skipping malformed or out-of-range rows
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read place dataset {}", path.display()))?;

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for (index, line) in content.lines().enumerate() {
            let line_no = index + 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<PlaceRecord>(line) {
                Ok(record) if record.position().is_valid() => records.push(record),
                Ok(record) => {
                    warn!(line = %line_no, name = %record.name, "place_record_out_of_range");
                    skipped += 1;
                }
                Err(e) => {
                    warn!(line = %line_no, error = %e, "place_record_malformed");
                    skipped += 1;
                }
            }
        }

        info!(
            file = %path.display(),
            records = %records.len(),
            skipped = %skipped,
            "place_store_loaded"
        );
        Ok(Self { records })
    }

    /// Build a store directly from records (tests, embedded datasets)
    pub fn from_records(records: Vec<PlaceRecord>) -> Self {
        Self { records }
    }

    /// An empty store; every search returns no results
    pub fn empty() -> Self {
        Self { records: Vec::new() }
    }

    pub fn records(&self) -> &[PlaceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
