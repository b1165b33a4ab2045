//! Port trait definitions
//!
//! These traits define the interfaces that metadata adapters must implement.

pub mod metadata;

pub use metadata::{MetadataReader, MetadataWriter};
