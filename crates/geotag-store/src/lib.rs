//! Geotag Store - Catalog ports and adapters
//!
//! This crate defines the catalog lookup port and provides the Lightroom
//! catalog adapter along with an in-memory catalog.

pub mod lightroom;
pub mod memory;
pub mod ports;

pub use lightroom::LightroomCatalog;
pub use memory::MemoryCatalog;
pub use ports::CatalogLookup;
