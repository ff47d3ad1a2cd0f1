//! vtel-core - Measurement store and data sinks for vehicle telemetry
//!
//! A producer (vehicle interface, trace file, test harness) pushes named
//! values into a [`DataSink`]. The default sink writes every update into a
//! shared [`MeasurementStore`] and then notifies its [`SinkHook`], so any
//! number of readers can ask for the latest value of a signal at any time.
//!
//! # Architecture
//!
//! ```text
//!  producer ──receive(name, value, event)──► BaseDataSink
//!                                              │
//!                              ┌───────────────┴───────────────┐
//!                              ▼                               ▼
//!                      MeasurementStore                    SinkHook
//!                 (name → Arc<Measurement>)     (NoopHook, BroadcastHook, ...)
//!                              │
//!            get / contains / entries (any thread)
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use vtel_core::{BaseDataSink, DataSink, MeasurementValue};
//!
//! let sink = BaseDataSink::new();
//! sink.receive("vehicle_speed", MeasurementValue::Number(42.0), None);
//!
//! let store = sink.store();
//! assert!(store.contains("vehicle_speed"));
//! assert_eq!(store.get("vehicle_speed").number(), Some(42.0));
//! assert!(store.get("fuel_level").is_unknown());
//! ```

pub mod broadcast;
pub mod error;
pub mod measurement;
pub mod sink;
pub mod store;
pub mod trace;

pub use broadcast::{BroadcastHook, MeasurementUpdate};
pub use error::{TelemetryError, TelemetryResult};
pub use measurement::{Measurement, MeasurementValue};
pub use sink::{BaseDataSink, DataSink, NoopHook, SinkHook};
pub use store::MeasurementStore;
pub use trace::{parse_trace, TraceRecord};
