//! # Capabilities
//!
//! The traits through which the engine talks to the outside world:
//! resources that know how to load themselves, and subscribers that want to
//! hear about fresh data. The [`ResourceCatalog`] maps ids to resources.

use std::collections::HashMap;
use std::io::{self, Read};
use std::sync::{Arc, PoisonError, RwLock};

/// A readable byte stream over freshly loaded data.
pub type DataStream = Box<dyn Read + Send>;

/// Something that can hand out a stream over its current data.
pub trait DataStreamFactory: Send + Sync {
    /// Opens a stream over the data currently held.
    ///
    /// Called once per subscriber during a dispatch. Implementations that
    /// cannot reopen their source only serve the first reader intact.
    fn open_data_stream(&self) -> io::Result<DataStream>;
}

/// # Loadable Resource
///
/// A named external resource with a primary source and a fallback source.
/// Both load operations are blocking; their duration and cancellation are
/// owned entirely by the implementation.
pub trait LoadableResource: DataStreamFactory {
    /// Tries to load fresh data from the primary (remote) source.
    ///
    /// `Ok(false)` means "no error, but no new data".
    fn attempt_primary_load(&self) -> anyhow::Result<bool>;

    /// Tries to load data from the fallback source.
    fn attempt_fallback_load(&self) -> anyhow::Result<bool>;

    /// Locations of the primary source, for diagnostics only.
    fn remote_locations(&self) -> Vec<String>;

    /// Location of the fallback source, for diagnostics only.
    fn fallback_location(&self) -> Option<String>;

    /// Discards any loaded or cached data.
    fn reset(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// # Subscriber
///
/// Receives a stream over new data each time a resource it listens to has
/// been loaded successfully.
pub trait Subscriber: Send + Sync {
    /// Handles newly loaded data for `resource_id`.
    fn on_new_data(&self, resource_id: &str, data: DataStream) -> anyhow::Result<()>;

    /// Name used in logs and error messages.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// # Resource Catalog
///
/// Read-mostly mapping from resource id to [`LoadableResource`].
///
/// Lookups clone the `Arc` out, so no lock is held while a resource loads.
#[derive(Default)]
pub struct ResourceCatalog {
    resources: RwLock<HashMap<String, Arc<dyn LoadableResource>>>,
}

impl ResourceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the resource registered under `resource_id`.
    pub fn get(&self, resource_id: &str) -> Option<Arc<dyn LoadableResource>> {
        self.resources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(resource_id)
            .cloned()
    }

    /// Registers a resource, returning the one it replaced (if any).
    pub fn insert(
        &self,
        resource_id: impl Into<String>,
        resource: Arc<dyn LoadableResource>,
    ) -> Option<Arc<dyn LoadableResource>> {
        self.resources
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(resource_id.into(), resource)
    }

    pub fn contains(&self, resource_id: &str) -> bool {
        self.resources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(resource_id)
    }

    /// All registered ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .resources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.resources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ResourceCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCatalog")
            .field("ids", &self.ids())
            .finish()
    }
}
