//! # lib_refresh
//!
//! A resource refresh-and-notify engine. Given a named resource, it tries to
//! load fresh data from the primary source, falls back to a secondary source if
//! that fails, and on success delivers the new data exactly once to every
//! interested subscriber.
//!
//! ```text
//! LoaderService::load_data(id)
//!   └─► LoadCoordinator::execute(id, catalog)
//!         ├─ primary load ── fail ─► fallback load
//!         └─ success ─► SubscriptionRegistry::trigger(id, resource)
//!                          ├─► wildcard ("") subscribers   (failures logged)
//!                          └─► subscribers of `id`         (first failure returned)
//! ```
//!
//! ## Modules
//! - `core` (always): capabilities, registry, coordinator, loader service.
//! - `subscribers` (always): built-in subscribers.
//! - `resources` (feature `resources`): HTTP(S) resource with fallback file.
//! - `configs` (feature `configs`): JSON catalog configuration.
//! - `loggers` (feature `loggers`): process logging setup.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, unused_qualifications)]

pub mod core;
pub mod error;
pub mod subscribers;

#[cfg(feature = "configs")]
pub mod configs;
#[cfg(feature = "loggers")]
pub mod loggers;
#[cfg(feature = "resources")]
pub mod resources;

// ---- Public re-exports ----

pub use crate::core::{
    DataStream, DataStreamFactory, LoadCoordinator, LoadableResource, LoaderService,
    ResourceCatalog, Subscriber, SubscriptionRegistry, WILDCARD,
};
pub use error::RefreshError;
pub use subscribers::LogSubscriber;
