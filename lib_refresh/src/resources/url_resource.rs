//! # URL Resource
//!
//! A [`LoadableResource`] backed by one or more remote HTTP(S) locations, with a
//! local fallback file and an optional on-disk cache of the last remote payload.
//!
//! ## Sources
//! - **Primary**: each remote URL is tried in order with a blocking `reqwest`
//!   client; the first 2xx response wins and is written to the cache file.
//! - **Fallback**: the fallback file is read as-is.
//! - **Cache**: [`UrlResource::restore_cache`] seeds the in-memory payload at
//!   startup so readers have data before the first refresh.
//!
//! Every call to `open_data_stream` returns an independent cursor over the same
//! in-memory payload, so each subscriber reads the complete data.

use std::fs;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use anyhow::Context;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use reqwest::Url;

use crate::core::resource::{DataStream, DataStreamFactory, LoadableResource};

/// Request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct UrlResource {
    resource_id: String,
    remote: Vec<Url>,
    fallback: Option<PathBuf>,
    cache: Option<PathBuf>,
    client: Client,
    data: RwLock<Option<Bytes>>,
    last_loaded: RwLock<Option<DateTime<Utc>>>,
    load_count: AtomicU64,
}

impl UrlResource {
    /// Creates a resource fetching from `remote` (tried in order).
    ///
    /// # Errors
    /// Returns the `reqwest` error if the HTTP client cannot be built.
    pub fn new(resource_id: impl Into<String>, remote: Vec<Url>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("lib_refresh/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            resource_id: resource_id.into(),
            remote,
            fallback: None,
            cache: None,
            client,
            data: RwLock::new(None),
            last_loaded: RwLock::new(None),
            load_count: AtomicU64::new(0),
        })
    }

    /// Sets the local file read by the fallback load.
    pub fn with_fallback(mut self, path: impl Into<PathBuf>) -> Self {
        self.fallback = Some(path.into());
        self
    }

    /// Sets the file the last remote payload is cached in.
    pub fn with_cache(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache = Some(path.into());
        self
    }

    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// How many times new data was loaded from either source.
    pub fn load_count(&self) -> u64 {
        self.load_count.load(Ordering::SeqCst)
    }

    /// When new data was last loaded from either source.
    pub fn last_loaded(&self) -> Option<DateTime<Utc>> {
        *self
            .last_loaded
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Loads the cache file into memory, if one is configured and present.
    ///
    /// Does not count as a load.
    pub fn restore_cache(&self) -> anyhow::Result<bool> {
        let Some(path) = self.cache.as_deref().filter(|p| p.is_file()) else {
            return Ok(false);
        };
        let body = fs::read(path)
            .with_context(|| format!("Failed to read cache file {}", path.display()))?;
        log::debug!(
            "Restored {} cached bytes for '{}' from {}",
            body.len(),
            self.resource_id,
            path.display()
        );
        *self.data.write().unwrap_or_else(PoisonError::into_inner) = Some(Bytes::from(body));
        Ok(true)
    }

    fn fetch(&self, url: &Url) -> anyhow::Result<Bytes> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .with_context(|| format!("Request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("{} answered with status {}", url, status);
        }
        response
            .bytes()
            .with_context(|| format!("Failed to read body from {}", url))
    }

    fn store(&self, body: Bytes) {
        *self.data.write().unwrap_or_else(PoisonError::into_inner) = Some(body);
        *self
            .last_loaded
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Utc::now());
        self.load_count.fetch_add(1, Ordering::SeqCst);
    }

    fn write_cache(&self, body: &[u8]) {
        let Some(path) = &self.cache else {
            return;
        };
        if let Err(e) = write_file(path, body) {
            log::warn!(
                "Failed to write cache for '{}' to {}: {}",
                self.resource_id,
                path.display(),
                e
            );
        }
    }
}

fn write_file(path: &Path, body: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, body)
}

impl DataStreamFactory for UrlResource {
    fn open_data_stream(&self) -> io::Result<DataStream> {
        match self
            .data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            Some(body) => Ok(Box::new(Cursor::new(body.clone()))),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no data loaded for '{}'", self.resource_id),
            )),
        }
    }
}

impl LoadableResource for UrlResource {
    fn attempt_primary_load(&self) -> anyhow::Result<bool> {
        let mut last_error = None;
        for url in &self.remote {
            match self.fetch(url) {
                Ok(body) => {
                    log::debug!(
                        "Fetched {} bytes for '{}' from {}",
                        body.len(),
                        self.resource_id,
                        url
                    );
                    self.write_cache(&body);
                    self.store(body);
                    return Ok(true);
                }
                Err(e) => {
                    log::debug!("Remote location failed for '{}': {:#}", self.resource_id, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(e.context(format!(
                "All remote locations failed for '{}'",
                self.resource_id
            ))),
            None => Ok(false),
        }
    }

    fn attempt_fallback_load(&self) -> anyhow::Result<bool> {
        let Some(path) = &self.fallback else {
            return Ok(false);
        };
        let body = fs::read(path)
            .with_context(|| format!("Failed to read fallback file {}", path.display()))?;
        self.store(Bytes::from(body));
        Ok(true)
    }

    fn remote_locations(&self) -> Vec<String> {
        self.remote.iter().map(Url::to_string).collect()
    }

    fn fallback_location(&self) -> Option<String> {
        self.fallback.as_ref().map(|p| p.display().to_string())
    }

    fn reset(&self) -> anyhow::Result<()> {
        *self.data.write().unwrap_or_else(PoisonError::into_inner) = None;
        if let Some(path) = self.cache.as_deref().filter(|p| p.exists()) {
            fs::remove_file(path)
                .with_context(|| format!("Failed to delete cache file {}", path.display()))?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for UrlResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlResource")
            .field("resource_id", &self.resource_id)
            .field("remote", &self.remote_locations())
            .field("fallback", &self.fallback)
            .field("cache", &self.cache)
            .field("load_count", &self.load_count())
            .finish()
    }
}
