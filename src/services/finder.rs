//! Place search - substring match ranked by proximity
//!
//! Candidates pass a coarse squared-degree pre-filter before the haversine
//! refinement. The coarse metric is only a cap on how many candidates get
//! refined; the haversine distance is always the authoritative sort key.

use crate::domain::geo::{self, GeoPoint};
use crate::io::places::PlaceStore;
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

/// How many coarse candidates to keep per requested result before the
/// haversine refinement
const COARSE_CANDIDATES_PER_RESULT: usize = 8;

/// A ranked search hit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceMatch {
    pub name: String,
    pub position: GeoPoint,
    pub distance_km: f64,
}

/// Ranks named places by text match and proximity to a reference point
pub struct LocationFinder {
    store: Arc<PlaceStore>,
}

impl LocationFinder {
    pub fn new(store: Arc<PlaceStore>) -> Self {
        Self { store }
    }

    /// Substring search ranked ascending by haversine distance from
    /// `reference`, truncated to `limit`
    ///
    /// Matching is case-sensitive. Distance ties keep dataset row order
    /// (stable sort). An empty query or zero matches returns an empty
    /// list, never an error.
    pub fn search(&self, query: &str, reference: GeoPoint, limit: usize) -> Vec<PlaceMatch> {
        if query.is_empty() || limit == 0 {
            return Vec::new();
        }

        // (row index, record, coarse squared-degree distance)
        let mut candidates: Vec<(usize, &crate::domain::types::PlaceRecord, f64)> = self
            .store
            .records()
            .iter()
            .enumerate()
            .filter(|(_, record)| record.name.contains(query))
            .map(|(row, record)| {
                let d_lat = record.lat - reference.lat;
                let d_lon = record.lon - reference.lon;
                (row, record, d_lat * d_lat + d_lon * d_lon)
            })
            .collect();

        // Coarse pre-filter caps the refinement set; row order is restored
        // afterwards so distance ties stay deterministic
        let coarse_cap = limit.saturating_mul(COARSE_CANDIDATES_PER_RESULT);
        if candidates.len() > coarse_cap {
            candidates
                .sort_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(Ordering::Equal));
            candidates.truncate(coarse_cap);
            candidates.sort_by_key(|&(row, _, _)| row);
        }

        let mut matches: Vec<PlaceMatch> = candidates
            .into_iter()
            .map(|(_, record, _)| PlaceMatch {
                name: record.name.clone(),
                position: record.position(),
                distance_km: geo::haversine_km(reference, record.position()),
            })
            .collect();

        matches.sort_by(|a, b| a.distance_km.partial_cmp(&b.distance_km).unwrap_or(Ordering::Equal));
        matches.truncate(limit);

        debug!(query = %query, results = %matches.len(), "place_search");
        matches
    }

    /// Exact-name lookup; returns the first match in dataset row order
    pub fn lookup_by_name(&self, name: &str) -> Option<GeoPoint> {
        self.store.records().iter().find(|record| record.name == name).map(|r| r.position())
    }

    /// Resolve free text to a destination: exact name first, then the
    /// nearest ranked match
    pub fn resolve(&self, text: &str, reference: GeoPoint) -> Option<PlaceMatch> {
        if let Some(position) = self.lookup_by_name(text) {
            return Some(PlaceMatch {
                name: text.to_string(),
                position,
                distance_km: geo::haversine_km(reference, position),
            });
        }
        self.search(text, reference, 1).into_iter().next()
    }
}
