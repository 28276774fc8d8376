//! # Core Engine Module
//!
//! This module forms the heart of the refresh-and-notify engine. It aggregates
//! the components that coordinate loading a resource and fanning the result out
//! to interested parties. Everything here is synchronous and thread-safe;
//! parallel workers may call into it concurrently.
//!
//! ## Core Components:
//!
//! - **`resource`**: The capability traits (`LoadableResource`, `Subscriber`,
//!   `DataStreamFactory`) and the `ResourceCatalog` mapping ids to resources.
//!
//! - **`registry`**: The subscription table. Per-id, append-only subscriber lists
//!   created exactly once under concurrency, plus the wildcard channel that hears
//!   about every resource.
//!
//! - **`coordinator`**: One refresh attempt for one resource: primary source,
//!   then fallback source, then a single dispatch on success.
//!
//! - **`service`**: The facade owning a catalog, a registry and a coordinator,
//!   with registration, async loading and reset operations on top.

/// Capability traits and the resource catalog.
pub mod resource;
/// Per-id subscriber lists and the trigger fan-out.
pub mod registry;
/// The primary/fallback load coordinator.
pub mod coordinator;
/// The loader facade.
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;

// --- Public API Re-exports ---
pub use coordinator::LoadCoordinator;
pub use registry::{SubscriptionRegistry, WILDCARD};
pub use resource::{DataStream, DataStreamFactory, LoadableResource, ResourceCatalog, Subscriber};
pub use service::LoaderService;
