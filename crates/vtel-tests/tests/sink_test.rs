//! Sink, hook and broadcast integration tests
//!
//! Run with: cargo test -p vtel-tests --test sink_test

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use tokio::sync::broadcast::error::RecvError;
use vtel_core::{
    BaseDataSink, BroadcastHook, DataSink, Measurement, MeasurementStore, MeasurementValue,
    SinkHook,
};

/// Counts updates and stops, like a recorder or UI refresher would
#[derive(Default)]
struct CountingHook {
    updates: AtomicUsize,
    stops: AtomicUsize,
}

impl SinkHook for CountingHook {
    fn on_measurement(&self, _name: &str, _measurement: &Measurement) {
        self.updates.fetch_add(1, Ordering::SeqCst);
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_hook_sees_every_update() {
    let sink = BaseDataSink::with_hook(CountingHook::default());
    sink.receive_value("vehicle_speed", MeasurementValue::Number(1.0));
    sink.receive_value("vehicle_speed", MeasurementValue::Number(2.0));
    sink.receive(
        "door_status",
        MeasurementValue::from("passenger"),
        Some(MeasurementValue::from(false)),
    );

    assert_eq!(sink.hook().updates.load(Ordering::SeqCst), 3);
    assert_eq!(sink.entries().len(), 2);
}

#[test]
fn test_stop_twice_matches_stop_once() {
    let once = BaseDataSink::with_hook(CountingHook::default());
    let twice = BaseDataSink::with_hook(CountingHook::default());
    for sink in [&once, &twice] {
        sink.receive_value("fuel_level", MeasurementValue::Number(33.0));
    }

    once.stop();
    twice.stop();
    twice.stop();

    assert_eq!(once.is_stopped(), twice.is_stopped());
    assert_eq!(
        once.hook().stops.load(Ordering::SeqCst),
        twice.hook().stops.load(Ordering::SeqCst)
    );
    assert_eq!(
        once.get("fuel_level").value(),
        twice.get("fuel_level").value()
    );
}

#[test]
fn test_trait_object_sink() {
    let store = Arc::new(MeasurementStore::new());
    let sinks: Vec<Box<dyn DataSink>> = vec![
        Box::new(BaseDataSink::with_store(Arc::clone(&store), CountingHook::default())),
        Box::new(BaseDataSink::with_store(
            Arc::clone(&store),
            BroadcastHook::new(),
        )),
    ];

    for (i, sink) in sinks.iter().enumerate() {
        sink.receive_value("odometer", MeasurementValue::Number(100.0 + i as f64));
    }
    for sink in &sinks {
        sink.stop();
    }

    assert_eq!(store.get("odometer").number(), Some(101.0));
}

#[tokio::test]
async fn test_broadcast_subscribers_and_store_agree() {
    let sink = Arc::new(BaseDataSink::with_hook(BroadcastHook::new()));
    let mut rx = sink.hook().subscribe();

    let producer = {
        let sink = Arc::clone(&sink);
        tokio::spawn(async move {
            for i in 0..20_i32 {
                sink.receive_value("engine_speed", MeasurementValue::from(i * 100));
            }
            sink.stop();
        })
    };

    let mut last = None;
    loop {
        match rx.recv().await {
            Ok(update) => {
                assert_eq!(update.name, "engine_speed");
                last = update.measurement.number();
            }
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
    producer.await.unwrap();

    assert_eq!(last, Some(1900.0));
    assert_eq!(sink.get("engine_speed").number(), last);
}
