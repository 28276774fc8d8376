//! # Refresh Errors
//!
//! Typed failures surfaced by the load coordinator, the subscription registry and
//! the loader service. Capability implementations (resources, subscribers) report
//! their own failures as `anyhow::Error`; those are wrapped here only when they are
//! allowed to escape to the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RefreshError {
    /// The requested id is not present in the resource catalog.
    #[error("No such resource: {0}")]
    UnknownResource(String),

    /// An id-specific subscriber failed while new data was being delivered.
    /// Remaining subscribers of that id were not notified.
    #[error("Failed to load new data: {subscriber} (resource '{resource_id}')")]
    Subscriber {
        resource_id: String,
        subscriber: String,
        #[source]
        source: anyhow::Error,
    },

    /// The resource could not discard its loaded data.
    #[error("Failed to reset resource '{resource_id}'")]
    Reset {
        resource_id: String,
        #[source]
        source: anyhow::Error,
    },

    /// No data stream could be opened on the currently loaded data.
    #[error("Failed to open data stream for resource '{resource_id}'")]
    Stream {
        resource_id: String,
        #[source]
        source: std::io::Error,
    },
}

impl RefreshError {
    /// The resource id the error relates to.
    pub fn resource_id(&self) -> &str {
        match self {
            RefreshError::UnknownResource(id) => id,
            RefreshError::Subscriber { resource_id, .. }
            | RefreshError::Reset { resource_id, .. }
            | RefreshError::Stream { resource_id, .. } => resource_id,
        }
    }
}
