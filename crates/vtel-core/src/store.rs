//! Measurement Store - the latest value of every signal
//!
//! One writer stream, any number of readers. Entries are swapped as whole
//! `Arc<Measurement>` values, so a reader sees either the old or the new
//! measurement for a name, never a mix.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::measurement::Measurement;

/// Thread-safe latest-value cache keyed by signal name
#[derive(Debug, Default)]
pub struct MeasurementStore {
    /// Map of signal name → most recent measurement
    measurements: RwLock<HashMap<String, Arc<Measurement>>>,
}

impl MeasurementStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the measurement for a name
    pub fn put(&self, name: impl Into<String>, measurement: Measurement) {
        self.insert(name.into(), Arc::new(measurement));
    }

    /// Swap in an already shared measurement
    pub(crate) fn insert(&self, name: String, measurement: Arc<Measurement>) {
        let previous = self.measurements.write().insert(name.clone(), measurement);
        debug!(name = %name, replaced = previous.is_some(), "Stored measurement");
    }

    /// Get the latest measurement for a name
    ///
    /// Never fails: unknown names yield [`Measurement::unknown`].
    pub fn get(&self, name: &str) -> Arc<Measurement> {
        self.measurements
            .read()
            .get(name)
            .cloned()
            .unwrap_or_else(|| Arc::new(Measurement::unknown()))
    }

    /// Check if a measurement was ever received for a name
    pub fn contains(&self, name: &str) -> bool {
        self.measurements.read().contains_key(name)
    }

    /// Point-in-time copy of every entry
    ///
    /// Writes that land after the call are not reflected in the result.
    pub fn entries(&self) -> Vec<(String, Arc<Measurement>)> {
        self.measurements
            .read()
            .iter()
            .map(|(name, m)| (name.clone(), Arc::clone(m)))
            .collect()
    }

    /// Names of all signals seen so far
    pub fn names(&self) -> Vec<String> {
        self.measurements.read().keys().cloned().collect()
    }

    /// Number of distinct signal names
    pub fn len(&self) -> usize {
        self.measurements.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.measurements.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::MeasurementValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_store_put_and_get() {
        let store = MeasurementStore::new();
        store.put("engine_speed", Measurement::new(1800.0));

        assert!(store.contains("engine_speed"));
        assert_eq!(store.get("engine_speed").number(), Some(1800.0));
    }

    #[test]
    fn test_store_latest_write_wins() {
        let store = MeasurementStore::new();
        store.put("gear_position", Measurement::new("first"));
        store.put("gear_position", Measurement::new("second"));
        store.put("gear_position", Measurement::new("third"));

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get("gear_position").value(),
            Some(&MeasurementValue::Text("third".into()))
        );
    }

    #[test]
    fn test_store_miss_returns_unknown() {
        let store = MeasurementStore::new();

        let m = store.get("never_seen");
        assert!(m.is_unknown());
        assert_eq!(m.event(), None);
        assert!(!store.contains("never_seen"));
    }

    #[test]
    fn test_store_contains_ignores_value() {
        let store = MeasurementStore::new();
        store.put("placeholder", Measurement::unknown());

        assert!(store.contains("placeholder"));
        assert!(store.get("placeholder").is_unknown());
    }

    #[test]
    fn test_store_entries_is_a_snapshot() {
        let store = MeasurementStore::new();
        store.put("fuel_level", Measurement::new(71.0));
        store.put("odometer", Measurement::new(10234.5));

        let mut snapshot = store.entries();
        store.put("fuel_level", Measurement::new(70.0));
        store.put("brake_pedal_status", Measurement::new(true));

        snapshot.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].0, "fuel_level");
        assert_eq!(snapshot[0].1.number(), Some(71.0));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_store_clear() {
        let store = MeasurementStore::new();
        store.put("a", Measurement::new(1.0));
        store.put("b", Measurement::new(2.0));
        assert!(!store.is_empty());

        store.clear();
        assert!(store.is_empty());
        assert!(store.names().is_empty());
    }
}
