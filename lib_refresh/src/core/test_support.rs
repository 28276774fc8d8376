//! Fakes shared by the core unit tests.

use std::collections::VecDeque;
use std::io::{self, Cursor, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;

use crate::core::resource::{DataStream, DataStreamFactory, LoadableResource, Subscriber};

/// Ordered record of deliveries: `"<subscriber>:<resource id>:<payload>"`.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }
}

pub struct RecordingSubscriber {
    name: &'static str,
    journal: Journal,
}

impl RecordingSubscriber {
    pub fn arc(name: &'static str, journal: &Journal) -> Arc<Self> {
        Arc::new(Self {
            name,
            journal: journal.clone(),
        })
    }
}

impl Subscriber for RecordingSubscriber {
    fn on_new_data(&self, resource_id: &str, mut data: DataStream) -> anyhow::Result<()> {
        let mut payload = String::new();
        data.read_to_string(&mut payload)?;
        self.journal
            .push(format!("{}:{}:{}", self.name, resource_id, payload));
        Ok(())
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

pub struct FailingSubscriber;

impl Subscriber for FailingSubscriber {
    fn on_new_data(&self, _resource_id: &str, _data: DataStream) -> anyhow::Result<()> {
        Err(anyhow!("subscriber rejected the data"))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Fixed payload; counts how often a stream was opened.
pub struct StaticData {
    payload: Option<Vec<u8>>,
    opened: AtomicUsize,
}

impl StaticData {
    pub fn new(payload: &[u8]) -> Self {
        Self {
            payload: Some(payload.to_vec()),
            opened: AtomicUsize::new(0),
        }
    }

    pub fn unopenable() -> Self {
        Self {
            payload: None,
            opened: AtomicUsize::new(0),
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl DataStreamFactory for StaticData {
    fn open_data_stream(&self) -> io::Result<DataStream> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        match &self.payload {
            Some(bytes) => Ok(Box::new(Cursor::new(bytes.clone()))),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "no data loaded")),
        }
    }
}

/// Scripted outcome of one load attempt.
#[derive(Clone, Copy, Debug)]
pub enum Outcome {
    Loaded,
    NoData,
    Fails,
}

/// A resource whose primary/fallback outcomes are scripted per call.
pub struct ScriptedResource {
    primary: Mutex<VecDeque<Outcome>>,
    fallback: Mutex<VecDeque<Outcome>>,
    payload: &'static [u8],
    primary_calls: AtomicUsize,
    fallback_calls: AtomicUsize,
    resets: AtomicUsize,
    reset_fails: bool,
}

impl ScriptedResource {
    pub fn new(primary: &[Outcome], fallback: &[Outcome]) -> Self {
        Self {
            primary: Mutex::new(primary.iter().copied().collect()),
            fallback: Mutex::new(fallback.iter().copied().collect()),
            payload: b"data",
            primary_calls: AtomicUsize::new(0),
            fallback_calls: AtomicUsize::new(0),
            resets: AtomicUsize::new(0),
            reset_fails: false,
        }
    }

    pub fn failing_reset(mut self) -> Self {
        self.reset_fails = true;
        self
    }

    pub fn primary_calls(&self) -> usize {
        self.primary_calls.load(Ordering::SeqCst)
    }

    pub fn fallback_calls(&self) -> usize {
        self.fallback_calls.load(Ordering::SeqCst)
    }

    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }

    fn run(queue: &Mutex<VecDeque<Outcome>>, source: &str) -> anyhow::Result<bool> {
        match queue.lock().unwrap().pop_front().unwrap_or(Outcome::NoData) {
            Outcome::Loaded => Ok(true),
            Outcome::NoData => Ok(false),
            Outcome::Fails => Err(anyhow!("{source} unreachable")),
        }
    }
}

impl DataStreamFactory for ScriptedResource {
    fn open_data_stream(&self) -> io::Result<DataStream> {
        Ok(Box::new(Cursor::new(self.payload.to_vec())))
    }
}

impl LoadableResource for ScriptedResource {
    fn attempt_primary_load(&self) -> anyhow::Result<bool> {
        self.primary_calls.fetch_add(1, Ordering::SeqCst);
        Self::run(&self.primary, "primary")
    }

    fn attempt_fallback_load(&self) -> anyhow::Result<bool> {
        self.fallback_calls.fetch_add(1, Ordering::SeqCst);
        Self::run(&self.fallback, "fallback")
    }

    fn remote_locations(&self) -> Vec<String> {
        vec!["http://primary.invalid/data".to_string()]
    }

    fn fallback_location(&self) -> Option<String> {
        Some("fallback.dat".to_string())
    }

    fn reset(&self) -> anyhow::Result<()> {
        self.resets.fetch_add(1, Ordering::SeqCst);
        if self.reset_fails {
            return Err(anyhow!("cache is read-only"));
        }
        Ok(())
    }
}
