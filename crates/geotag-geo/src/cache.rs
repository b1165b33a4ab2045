//! Per-run de-duplication of reverse-geocode lookups

use geotag_core::models::{CoordinatePair, LocationFieldSet};
use serde::Serialize;
use std::collections::HashMap;

/// Coordinate pair rounded to a fixed number of decimals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoordinateKey {
    latitude: i64,
    longitude: i64,
}

impl CoordinateKey {
    /// Decimal digits kept, roughly 0.1 m
    pub const PRECISION: i32 = 6;

    pub fn new(pair: CoordinatePair) -> Self {
        let scale = 10f64.powi(Self::PRECISION);
        Self {
            latitude: (pair.latitude * scale).round() as i64,
            longitude: (pair.longitude * scale).round() as i64,
        }
    }
}

impl From<CoordinatePair> for CoordinateKey {
    fn from(pair: CoordinatePair) -> Self {
        Self::new(pair)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Selected geocode fields keyed by rounded coordinate
///
/// Entries are only added, never invalidated. Only successful lookups should
/// be stored.
#[derive(Debug, Default)]
pub struct LookupCache {
    entries: HashMap<CoordinateKey, LocationFieldSet>,
    hits: u64,
    misses: u64,
}

impl LookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a coordinate pair, counting the hit or miss
    pub fn get(&mut self, pair: CoordinatePair) -> Option<&LocationFieldSet> {
        match self.entries.get(&CoordinateKey::new(pair)) {
            Some(fields) => {
                self.hits += 1;
                Some(fields)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Store a result; an existing entry for the same key is kept
    pub fn put(&mut self, pair: CoordinatePair, fields: LocationFieldSet) {
        self.entries.entry(CoordinateKey::new(pair)).or_insert(fields);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats { hits: self.hits, misses: self.misses, entries: self.entries.len() }
    }
}
