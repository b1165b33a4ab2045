//! Geotag Core - Domain models, ports, and configuration
//!
//! This crate contains the domain types shared by every geotag crate, the port
//! definitions for reading and writing sidecar metadata, and the XMP adapter.

pub mod config;
pub mod error;
pub mod formats;
pub mod models;
pub mod ports;

pub use error::{GeotagError, Result};
