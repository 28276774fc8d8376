//! # Catalog Configuration
//!
//! Describes the resources to refresh in a JSON document and turns it into a
//! [`ResourceCatalog`] of [`UrlResource`]s.
//!
//! ```json
//! {
//!   "resources": [
//!     {
//!       "id": "ECB",
//!       "remote": ["https://www.ecb.europa.eu/stats/eurofxref/eurofxref-daily.xml"],
//!       "fallback": "data/ecb-fallback.xml",
//!       "cache": "cache/ecb.xml",
//!       "timeoutSecs": 10
//!     }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::registry::WILDCARD;
use crate::core::resource::ResourceCatalog;
use crate::resources::url_resource::{UrlResource, DEFAULT_TIMEOUT};

#[derive(Debug, Error)]
pub enum CatalogConfigError {
    #[error("I/O error occurred reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid URL '{url}' for resource '{resource_id}': {source}")]
    InvalidUrl {
        resource_id: String,
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Resource id must not be empty (reserved for wildcard subscriptions)")]
    EmptyId,

    #[error("Resource '{0}' is configured more than once")]
    DuplicateId(String),

    #[error("Failed to build HTTP client for resource '{resource_id}': {source}")]
    ClientError {
        resource_id: String,
        #[source]
        source: reqwest::Error,
    },
}

/// One configured resource.
#[derive(Default, Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceConfig {
    pub id: String,
    #[serde(default)]
    pub remote: Vec<String>,
    #[serde(default)]
    pub fallback: Option<PathBuf>,
    #[serde(default)]
    pub cache: Option<PathBuf>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Default, Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogConfig {
    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
}

impl CatalogConfig {
    /// Reads and validates a catalog configuration file.
    pub fn from_file(path: &Path) -> Result<Self, CatalogConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| CatalogConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&text)
    }

    /// Parses and validates a catalog configuration document.
    pub fn from_json(text: &str) -> Result<Self, CatalogConfigError> {
        let config: CatalogConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects the wildcard id and duplicate ids.
    pub fn validate(&self) -> Result<(), CatalogConfigError> {
        let mut seen = HashSet::new();
        for resource in &self.resources {
            if resource.id == WILDCARD {
                return Err(CatalogConfigError::EmptyId);
            }
            if !seen.insert(resource.id.as_str()) {
                return Err(CatalogConfigError::DuplicateId(resource.id.clone()));
            }
        }
        Ok(())
    }

    /// Builds one [`UrlResource`] per entry, restoring cached payloads.
    ///
    /// A cache that cannot be read is logged and ignored.
    pub fn build_catalog(&self) -> Result<ResourceCatalog, CatalogConfigError> {
        self.validate()?;
        let catalog = ResourceCatalog::new();
        for entry in &self.resources {
            let resource = entry.build()?;
            if let Err(e) = resource.restore_cache() {
                log::warn!("Ignoring unreadable cache for '{}': {:#}", entry.id, e);
            }
            catalog.insert(entry.id.clone(), Arc::new(resource));
        }
        Ok(catalog)
    }
}

impl ResourceConfig {
    fn build(&self) -> Result<UrlResource, CatalogConfigError> {
        let remote = self
            .remote
            .iter()
            .map(|raw| {
                Url::parse(raw).map_err(|e| CatalogConfigError::InvalidUrl {
                    resource_id: self.id.clone(),
                    url: raw.clone(),
                    source: e,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let timeout = self
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        let mut resource = UrlResource::new(self.id.clone(), remote, timeout).map_err(|e| {
            CatalogConfigError::ClientError {
                resource_id: self.id.clone(),
                source: e,
            }
        })?;
        if let Some(fallback) = &self.fallback {
            resource = resource.with_fallback(fallback);
        }
        if let Some(cache) = &self.cache {
            resource = resource.with_cache(cache);
        }
        Ok(resource)
    }
}

impl fmt::Display for CatalogConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CatalogConfig")?;
        for resource in &self.resources {
            writeln!(
                f,
                "    {}: remote {:?}, fallback {:?}, cache {:?}",
                resource.id, resource.remote, resource.fallback, resource.cache
            )?;
        }
        Ok(())
    }
}
