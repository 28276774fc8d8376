//! # Subscription Registry
//!
//! Maps a resource id (or the wildcard id `""`) to an ordered, append-only list
//! of subscribers and fans out new data to them.
//!
//! ## Locking
//! - The id -> list map sits behind an `RwLock`; lookups only take the read side.
//! - A miss goes through a creation-only mutex and re-checks before publishing a
//!   new list, so concurrent first subscriptions for one id share a single list.
//! - Each list has its own mutex, held for the whole dispatch of that group.
//!   Triggers for different ids run in parallel; triggers for the same id are
//!   serialized.
//!
//! A subscriber must not subscribe to the id it is currently being notified for:
//! the list mutex is not reentrant.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::core::resource::{DataStreamFactory, Subscriber};
use crate::error::RefreshError;

/// The reserved id whose subscribers hear about every resource.
pub const WILDCARD: &str = "";

type SubscriberList = Arc<Mutex<Vec<Arc<dyn Subscriber>>>>;

#[derive(Default)]
pub struct SubscriptionRegistry {
    lists: RwLock<HashMap<String, SubscriberList>>,
    creation: Mutex<()>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `subscriber` to the list for `resource_id`, creating the list
    /// on first use. Use [`WILDCARD`] to hear about every resource.
    pub fn subscribe(&self, resource_id: &str, subscriber: Arc<dyn Subscriber>) {
        let list = self.list_for(resource_id);
        let name = subscriber.name();
        list.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(subscriber);
        log::debug!("Subscriber '{}' registered for '{}'", name, resource_id);
    }

    /// # Trigger
    ///
    /// Delivers new data for `resource_id` to the wildcard group, then to the
    /// subscribers of `resource_id` itself, each in insertion order.
    ///
    /// `open_data_stream()` is called once per subscriber.
    ///
    /// ## Failures
    /// - Wildcard group: a failing subscriber is logged and skipped; the rest of
    ///   the group and the id-specific group are still notified.
    /// - Id-specific group: the first failure stops the group and is returned
    ///   as [`RefreshError::Subscriber`].
    pub fn trigger<S>(&self, resource_id: &str, source: &S) -> Result<(), RefreshError>
    where
        S: DataStreamFactory + ?Sized,
    {
        let wildcard = self.list_for(WILDCARD);
        {
            let subscribers = wildcard.lock().unwrap_or_else(PoisonError::into_inner);
            for subscriber in subscribers.iter() {
                if let Err(e) = deliver(subscriber.as_ref(), resource_id, source) {
                    log::error!(
                        "Error calling subscriber '{}' for '{}': {:#}",
                        subscriber.name(),
                        resource_id,
                        e
                    );
                }
            }
        }

        if resource_id.is_empty() {
            return Ok(());
        }

        let targeted = self.list_for(resource_id);
        let subscribers = targeted.lock().unwrap_or_else(PoisonError::into_inner);
        for subscriber in subscribers.iter() {
            deliver(subscriber.as_ref(), resource_id, source).map_err(|e| {
                RefreshError::Subscriber {
                    resource_id: resource_id.to_string(),
                    subscriber: subscriber.name().to_string(),
                    source: e,
                }
            })?;
        }
        Ok(())
    }

    /// Number of subscribers registered for `resource_id` (0 if no list exists).
    pub fn subscriber_count(&self, resource_id: &str) -> usize {
        self.lists
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(resource_id)
            .map(|list| list.lock().unwrap_or_else(PoisonError::into_inner).len())
            .unwrap_or(0)
    }

    /// Ids that currently own a subscriber list, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .lists
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    /// Returns the list for `resource_id`, creating it exactly once.
    fn list_for(&self, resource_id: &str) -> SubscriberList {
        if let Some(list) = self.lookup(resource_id) {
            return list;
        }

        let _creating = self.creation.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(list) = self.lookup(resource_id) {
            return list;
        }
        let list: SubscriberList = Arc::new(Mutex::new(Vec::new()));
        self.lists
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(resource_id.to_string(), Arc::clone(&list));
        list
    }

    fn lookup(&self, resource_id: &str) -> Option<SubscriberList> {
        self.lists
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(resource_id)
            .cloned()
    }
}

/// One guarded delivery: opening the stream is part of the subscriber call.
fn deliver<S>(subscriber: &dyn Subscriber, resource_id: &str, source: &S) -> anyhow::Result<()>
where
    S: DataStreamFactory + ?Sized,
{
    let stream = source.open_data_stream()?;
    subscriber.on_new_data(resource_id, stream)
}

impl std::fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{FailingSubscriber, Journal, RecordingSubscriber, StaticData};
    use std::thread;

    #[test]
    fn test_subscribe_creates_list_lazily() {
        let registry = SubscriptionRegistry::new();
        assert!(registry.ids().is_empty());

        let journal = Journal::default();
        registry.subscribe("ECB", RecordingSubscriber::arc("a", &journal));
        registry.subscribe("ECB", RecordingSubscriber::arc("b", &journal));

        assert_eq!(registry.ids(), vec!["ECB".to_string()]);
        assert_eq!(registry.subscriber_count("ECB"), 2);
        assert_eq!(registry.subscriber_count("IMF"), 0);
    }

    #[test]
    fn test_trigger_notifies_wildcard_then_targeted_in_order() {
        let registry = SubscriptionRegistry::new();
        let journal = Journal::default();
        registry.subscribe("ECB", RecordingSubscriber::arc("ecb-1", &journal));
        registry.subscribe(WILDCARD, RecordingSubscriber::arc("any-1", &journal));
        registry.subscribe("ECB", RecordingSubscriber::arc("ecb-2", &journal));
        registry.subscribe(WILDCARD, RecordingSubscriber::arc("any-2", &journal));
        registry.subscribe("IMF", RecordingSubscriber::arc("imf", &journal));

        registry.trigger("ECB", &StaticData::new(b"rates")).unwrap();

        assert_eq!(
            journal.entries(),
            vec![
                "any-1:ECB:rates",
                "any-2:ECB:rates",
                "ecb-1:ECB:rates",
                "ecb-2:ECB:rates",
            ]
        );
    }

    #[test]
    fn test_trigger_opens_a_stream_per_subscriber() {
        let registry = SubscriptionRegistry::new();
        let journal = Journal::default();
        registry.subscribe(WILDCARD, RecordingSubscriber::arc("any", &journal));
        registry.subscribe("ECB", RecordingSubscriber::arc("a", &journal));
        registry.subscribe("ECB", RecordingSubscriber::arc("b", &journal));

        let data = StaticData::new(b"payload");
        registry.trigger("ECB", &data).unwrap();

        assert_eq!(data.opened(), 3);
        assert!(journal.entries().iter().all(|e| e.ends_with(":payload")));
    }

    #[test]
    fn test_trigger_with_wildcard_id_only_notifies_wildcard_group_once() {
        let registry = SubscriptionRegistry::new();
        let journal = Journal::default();
        registry.subscribe(WILDCARD, RecordingSubscriber::arc("any", &journal));

        registry.trigger(WILDCARD, &StaticData::new(b"x")).unwrap();

        assert_eq!(journal.entries(), vec!["any::x"]);
    }

    #[test]
    fn test_wildcard_failure_does_not_stop_delivery() {
        let registry = SubscriptionRegistry::new();
        let journal = Journal::default();
        registry.subscribe(WILDCARD, Arc::new(FailingSubscriber));
        registry.subscribe(WILDCARD, RecordingSubscriber::arc("any", &journal));
        registry.subscribe("ECB", RecordingSubscriber::arc("ecb", &journal));

        let result = registry.trigger("ECB", &StaticData::new(b"d"));

        assert!(result.is_ok());
        assert_eq!(journal.entries(), vec!["any:ECB:d", "ecb:ECB:d"]);
    }

    #[test]
    fn test_targeted_failure_aborts_group_and_propagates() {
        let registry = SubscriptionRegistry::new();
        let journal = Journal::default();
        registry.subscribe("ECB", RecordingSubscriber::arc("first", &journal));
        registry.subscribe("ECB", Arc::new(FailingSubscriber));
        registry.subscribe("ECB", RecordingSubscriber::arc("never", &journal));

        let err = registry
            .trigger("ECB", &StaticData::new(b"d"))
            .expect_err("targeted failure must propagate");

        match err {
            RefreshError::Subscriber { resource_id, subscriber, .. } => {
                assert_eq!(resource_id, "ECB");
                assert_eq!(subscriber, "failing");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(journal.entries(), vec!["first:ECB:d"]);
    }

    #[test]
    fn test_unopenable_stream_counts_as_subscriber_failure() {
        let registry = SubscriptionRegistry::new();
        let journal = Journal::default();
        registry.subscribe(WILDCARD, RecordingSubscriber::arc("any", &journal));
        registry.subscribe("ECB", RecordingSubscriber::arc("ecb", &journal));

        let result = registry.trigger("ECB", &StaticData::unopenable());

        assert!(matches!(result, Err(RefreshError::Subscriber { .. })));
        assert!(journal.entries().is_empty());
    }

    #[test]
    fn test_concurrent_subscribe_shares_one_list() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let journal = Journal::default();

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let registry = Arc::clone(&registry);
                let journal = journal.clone();
                thread::spawn(move || {
                    let name: &'static str = Box::leak(format!("s{i}").into_boxed_str());
                    registry.subscribe("ECB", RecordingSubscriber::arc(name, &journal));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.ids(), vec!["ECB".to_string()]);
        assert_eq!(registry.subscriber_count("ECB"), 16);

        registry.trigger("ECB", &StaticData::new(b"z")).unwrap();
        assert_eq!(journal.entries().len(), 16);
    }
}
