//! In-memory catalog for tests and offline runs

use async_trait::async_trait;
use geotag_core::error::Result;
use geotag_core::models::CatalogRow;
use std::collections::HashMap;

use crate::ports::CatalogLookup;

/// Catalog rows keyed by base name
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    rows: HashMap<String, CatalogRow>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row, replacing any row with the same base name
    pub fn insert(&mut self, row: CatalogRow) {
        self.rows.insert(row.base_name.clone(), row);
    }

    pub fn with_row(mut self, row: CatalogRow) -> Self {
        self.insert(row);
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl CatalogLookup for MemoryCatalog {
    async fn find_by_base_name(&self, name: &str) -> Result<Option<CatalogRow>> {
        Ok(self.rows.get(name).cloned())
    }
}
