//! # Configuration Modules
//!
//! This module aggregates the configuration providers of the library.

/// JSON description of the resources to refresh.
pub mod catalog_config;

pub use catalog_config::{CatalogConfig, CatalogConfigError, ResourceConfig};
