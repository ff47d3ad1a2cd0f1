//! Broadcast hook - fan measurement updates out to async subscribers
//!
//! Consumers that want to react to every update, rather than poll the store,
//! subscribe to a [`BroadcastHook`] attached to a [`BaseDataSink`]. Slow
//! receivers lag and skip updates; the store still holds the latest value.
//!
//! [`BaseDataSink`]: crate::sink::BaseDataSink

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::measurement::Measurement;
use crate::sink::SinkHook;

/// Default channel capacity per hook
pub const DEFAULT_CAPACITY: usize = 256;

/// One update as seen by subscribers
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementUpdate {
    pub name: String,
    pub measurement: Arc<Measurement>,
}

/// [`SinkHook`] publishing every stored measurement on a broadcast channel
pub struct BroadcastHook {
    /// `None` once stopped; dropping the sender closes every receiver
    sender: RwLock<Option<broadcast::Sender<MeasurementUpdate>>>,
}

impl BroadcastHook {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: RwLock::new(Some(tx)),
        }
    }

    /// Receive all updates stored after this call
    ///
    /// After the hook stopped, the returned receiver is already closed.
    pub fn subscribe(&self) -> broadcast::Receiver<MeasurementUpdate> {
        match self.sender.read().as_ref() {
            Some(tx) => tx.subscribe(),
            None => broadcast::channel(1).1,
        }
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender
            .read()
            .as_ref()
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}

impl Default for BroadcastHook {
    fn default() -> Self {
        Self::new()
    }
}

impl SinkHook for BroadcastHook {
    fn on_measurement(&self, name: &str, measurement: &Measurement) {
        let guard = self.sender.read();
        let Some(tx) = guard.as_ref() else {
            return;
        };
        if tx.receiver_count() == 0 {
            return;
        }

        let update = MeasurementUpdate {
            name: name.to_string(),
            measurement: Arc::new(measurement.clone()),
        };
        // Only fails when every receiver dropped between the check and the send
        if tx.send(update).is_err() {
            debug!(name, "No subscribers left for update");
        }
    }

    fn stop(&self) {
        if self.sender.write().take().is_some() {
            info!("Broadcast hook closed");
        }
    }
}
