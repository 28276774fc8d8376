//! # Load Coordinator
//!
//! Runs one refresh attempt for one resource: the primary source first, the
//! fallback source if that yields nothing, and a single dispatch through the
//! [`SubscriptionRegistry`] on success.
//!
//! ```text
//! execute(id)
//!   ├─ catalog lookup ── missing ──► Err(UnknownResource)
//!   ├─ primary load
//!   │    ├─ Ok(true)  ──► trigger ──► Ok(true)
//!   │    ├─ Ok(false) ──┐
//!   │    └─ Err       ──┴─ (warn) ─┐
//!   └─ fallback load  ◄────────────┘
//!        ├─ Ok(true)  ──► trigger ──► Ok(true)
//!        ├─ Ok(false) ──► Ok(false)
//!        └─ Err       ──► (error) ──► Ok(false)
//! ```
//!
//! No retries, no deadlines: how often `execute` runs and how long a load may
//! take belong to the caller and to the resource.

use std::sync::Arc;

use crate::core::registry::SubscriptionRegistry;
use crate::core::resource::ResourceCatalog;
use crate::error::RefreshError;

pub struct LoadCoordinator {
    registry: Arc<SubscriptionRegistry>,
}

impl LoadCoordinator {
    pub fn new(registry: Arc<SubscriptionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<SubscriptionRegistry> {
        &self.registry
    }

    /// # Execute
    ///
    /// Loads `resource_id` from `catalog` and notifies subscribers exactly once
    /// if either source produced new data.
    ///
    /// # Returns
    /// `Ok(true)` when new data was delivered, `Ok(false)` when neither source
    /// produced any. Load failures never surface as errors.
    ///
    /// # Errors
    /// - [`RefreshError::UnknownResource`] if the id is not in the catalog.
    /// - [`RefreshError::Subscriber`] if an id-specific subscriber failed.
    pub fn execute(&self, resource_id: &str, catalog: &ResourceCatalog) -> Result<bool, RefreshError> {
        let resource = catalog
            .get(resource_id)
            .ok_or_else(|| RefreshError::UnknownResource(resource_id.to_string()))?;

        match resource.attempt_primary_load() {
            Ok(true) => {
                log::debug!("Read data from: {:?}", resource.remote_locations());
                self.registry.trigger(resource_id, resource.as_ref())?;
                log::debug!(
                    "New data successfully loaded from: {:?}",
                    resource.remote_locations()
                );
                return Ok(true);
            }
            Ok(false) => {}
            Err(e) => {
                log::warn!(
                    "Failed to read/load resource (checking fallback): {}: {:#}",
                    resource_id,
                    e
                );
            }
        }

        match resource.attempt_fallback_load() {
            Ok(true) => {
                let fallback = resource.fallback_location().unwrap_or_default();
                log::warn!("Read fallback data from: {}", fallback);
                self.registry.trigger(resource_id, resource.as_ref())?;
                log::warn!("Loaded fallback data from: {}", fallback);
                Ok(true)
            }
            Ok(false) => Ok(false),
            Err(e) => {
                log::error!(
                    "Failed to read/load fallback resource: {}: {:#}",
                    resource_id,
                    e
                );
                Ok(false)
            }
        }
    }
}

impl std::fmt::Debug for LoadCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadCoordinator")
            .field("registry", &self.registry)
            .finish()
    }
}
