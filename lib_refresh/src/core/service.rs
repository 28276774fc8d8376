//! # Loader Service
//!
//! The front door of the engine. Owns a [`ResourceCatalog`], a
//! [`SubscriptionRegistry`] and the [`LoadCoordinator`] tying them together,
//! and adds the housekeeping operations callers need around a refresh:
//! registration, async loading, reset to fallback data and direct reads.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::core::coordinator::LoadCoordinator;
use crate::core::registry::SubscriptionRegistry;
use crate::core::resource::{DataStream, LoadableResource, ResourceCatalog, Subscriber};
use crate::error::RefreshError;

pub struct LoaderService {
    catalog: Arc<ResourceCatalog>,
    coordinator: LoadCoordinator,
}

impl Default for LoaderService {
    fn default() -> Self {
        Self::new()
    }
}

impl LoaderService {
    /// Creates a service with an empty catalog and an empty registry.
    pub fn new() -> Self {
        Self::with_parts(
            Arc::new(ResourceCatalog::new()),
            Arc::new(SubscriptionRegistry::new()),
        )
    }

    /// Creates a service over an existing catalog and registry.
    pub fn with_parts(catalog: Arc<ResourceCatalog>, registry: Arc<SubscriptionRegistry>) -> Self {
        Self {
            catalog,
            coordinator: LoadCoordinator::new(registry),
        }
    }

    pub fn catalog(&self) -> &Arc<ResourceCatalog> {
        &self.catalog
    }

    pub fn registry(&self) -> &Arc<SubscriptionRegistry> {
        self.coordinator.registry()
    }

    /// Registers (or replaces) the resource for `resource_id`.
    pub fn register_resource(&self, resource_id: &str, resource: Arc<dyn LoadableResource>) {
        let remote = resource.remote_locations();
        if self.catalog.insert(resource_id, resource).is_some() {
            log::info!("Replaced resource '{}' (remote: {:?})", resource_id, remote);
        } else {
            log::info!("Registered resource '{}' (remote: {:?})", resource_id, remote);
        }
    }

    pub fn is_resource_registered(&self, resource_id: &str) -> bool {
        self.catalog.contains(resource_id)
    }

    /// All registered resource ids, sorted.
    pub fn resource_ids(&self) -> Vec<String> {
        self.catalog.ids()
    }

    /// Subscribes to `resource_id`, or to every resource with
    /// [`WILDCARD`](crate::core::registry::WILDCARD).
    pub fn subscribe(&self, resource_id: &str, subscriber: Arc<dyn Subscriber>) {
        self.registry().subscribe(resource_id, subscriber);
    }

    /// Runs one primary/fallback refresh of `resource_id`.
    pub fn load_data(&self, resource_id: &str) -> Result<bool, RefreshError> {
        self.coordinator.execute(resource_id, &self.catalog)
    }

    /// Runs [`Self::load_data`] on tokio's blocking pool.
    ///
    /// Must be called from within a tokio runtime.
    pub fn load_data_async(self: &Arc<Self>, resource_id: &str) -> JoinHandle<Result<bool, RefreshError>> {
        let service = Arc::clone(self);
        let resource_id = resource_id.to_string();
        tokio::task::spawn_blocking(move || service.load_data(&resource_id))
    }

    /// # Reset Data
    ///
    /// Discards what the resource holds and reloads it from its fallback source
    /// only. Subscribers are notified once if the fallback produced data.
    ///
    /// # Errors
    /// - [`RefreshError::UnknownResource`] for an unregistered id.
    /// - [`RefreshError::Reset`] if the resource could not discard its data.
    /// - [`RefreshError::Subscriber`] if an id-specific subscriber failed.
    pub fn reset_data(&self, resource_id: &str) -> Result<bool, RefreshError> {
        let resource = self
            .catalog
            .get(resource_id)
            .ok_or_else(|| RefreshError::UnknownResource(resource_id.to_string()))?;

        resource.reset().map_err(|e| RefreshError::Reset {
            resource_id: resource_id.to_string(),
            source: e,
        })?;
        log::info!("Reset resource '{}'", resource_id);

        match resource.attempt_fallback_load() {
            Ok(true) => {
                self.registry().trigger(resource_id, resource.as_ref())?;
                Ok(true)
            }
            Ok(false) => Ok(false),
            Err(e) => {
                log::error!(
                    "Failed to read/load fallback resource after reset: {}: {:#}",
                    resource_id,
                    e
                );
                Ok(false)
            }
        }
    }

    /// Opens a stream over the data `resource_id` currently holds.
    pub fn data_stream(&self, resource_id: &str) -> Result<DataStream, RefreshError> {
        let resource = self
            .catalog
            .get(resource_id)
            .ok_or_else(|| RefreshError::UnknownResource(resource_id.to_string()))?;
        resource.open_data_stream().map_err(|e| RefreshError::Stream {
            resource_id: resource_id.to_string(),
            source: e,
        })
    }
}

impl std::fmt::Debug for LoaderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderService")
            .field("catalog", &self.catalog)
            .field("coordinator", &self.coordinator)
            .finish()
    }
}
