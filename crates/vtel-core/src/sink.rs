//! Data sinks - where producers push named measurements
//!
//! [`BaseDataSink`] is the write-through cache every sink builds on: it turns
//! each received triple into a [`Measurement`], stores it, then hands the
//! stored value to its [`SinkHook`]. Extra behaviour is added by supplying a
//! hook rather than by wrapping or re-implementing the store logic.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::measurement::{Measurement, MeasurementValue};
use crate::store::MeasurementStore;

/// Receiver of a stream of named measurement updates
pub trait DataSink: Send + Sync {
    /// Receive a value with an optional companion event
    fn receive(&self, name: &str, value: MeasurementValue, event: Option<MeasurementValue>);

    /// Receive a value without an event
    fn receive_value(&self, name: &str, value: MeasurementValue) {
        self.receive(name, value, None);
    }

    /// Release resources. Safe to call any number of times.
    fn stop(&self) {}
}

/// Post-store-update extension point of a [`BaseDataSink`]
///
/// Both methods default to no-ops, so implementors only override what they
/// need.
pub trait SinkHook: Send + Sync {
    /// Called after `measurement` became the stored value for `name`
    fn on_measurement(&self, _name: &str, _measurement: &Measurement) {}

    /// Called once when the owning sink stops
    fn stop(&self) {}
}

/// Hook that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHook;

impl SinkHook for NoopHook {}

impl<H: SinkHook + ?Sized> SinkHook for Arc<H> {
    fn on_measurement(&self, name: &str, measurement: &Measurement) {
        (**self).on_measurement(name, measurement);
    }

    fn stop(&self) {
        (**self).stop();
    }
}

impl<H: SinkHook + ?Sized> SinkHook for Box<H> {
    fn on_measurement(&self, name: &str, measurement: &Measurement) {
        (**self).on_measurement(name, measurement);
    }

    fn stop(&self) {
        (**self).stop();
    }
}

/// Default sink: store every update, then notify the hook
pub struct BaseDataSink<H: SinkHook = NoopHook> {
    store: Arc<MeasurementStore>,
    hook: H,
    stopped: AtomicBool,
}

impl BaseDataSink<NoopHook> {
    /// Create a sink with its own empty store and no hook
    pub fn new() -> Self {
        Self::with_hook(NoopHook)
    }
}

impl Default for BaseDataSink<NoopHook> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: SinkHook> BaseDataSink<H> {
    /// Create a sink with its own empty store
    pub fn with_hook(hook: H) -> Self {
        Self::with_store(Arc::new(MeasurementStore::new()), hook)
    }

    /// Create a sink writing into an existing (possibly shared) store
    pub fn with_store(store: Arc<MeasurementStore>, hook: H) -> Self {
        Self {
            store,
            hook,
            stopped: AtomicBool::new(false),
        }
    }

    /// Shared handle to the backing store, for readers on other threads
    pub fn store(&self) -> Arc<MeasurementStore> {
        Arc::clone(&self.store)
    }

    pub fn hook(&self) -> &H {
        &self.hook
    }

    /// Store a pre-built measurement and notify the hook
    ///
    /// Used by producers that carry their own timestamps (e.g. trace replay).
    pub fn receive_measurement(&self, name: &str, measurement: Measurement) {
        let measurement = Arc::new(measurement);
        self.store.insert(name.to_string(), Arc::clone(&measurement));
        self.hook.on_measurement(name, &measurement);
    }

    /// Latest measurement for a name, or [`Measurement::unknown`]
    pub fn get(&self, name: &str) -> Arc<Measurement> {
        self.store.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.store.contains(name)
    }

    pub fn entries(&self) -> Vec<(String, Arc<Measurement>)> {
        self.store.entries()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl<H: SinkHook> DataSink for BaseDataSink<H> {
    fn receive(&self, name: &str, value: MeasurementValue, event: Option<MeasurementValue>) {
        debug!(name, kind = value.kind(), has_event = event.is_some(), "Received value");
        self.receive_measurement(name, Measurement::from_parts(value, event));
    }

    fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        self.hook.stop();
        info!(entries = self.store.len(), "Data sink stopped");
    }
}
