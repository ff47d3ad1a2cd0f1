//! Trace replay integration tests
//!
//! Run with: cargo test -p vtel-tests --test replay_test

use std::io::Write;

use pretty_assertions::assert_eq;
use tokio::sync::broadcast::error::TryRecvError;
use vtel_core::{BaseDataSink, BroadcastHook, DataSink, MeasurementValue};
use vtel_replay::{ReplayConfig, ReplayStats, TracePlayer};

const TRACE: &str = r#"{"timestamp": 1351176963.000, "name": "vehicle_speed", "value": 0}
{"timestamp": 1351176963.010, "name": "transmission_gear_position", "value": "first"}
{"timestamp": 1351176963.020, "name": "vehicle_speed", "value": 4.5}

{"timestamp": 1351176963.030, "name": "door_status", "value": "driver", "event": false}
{"timestamp": 1351176963.040, "name": "headlamp_status", "value": true}
"#;

fn write_trace(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_replay_into_broadcast_sink() {
    let trace = write_trace(TRACE);
    let player = TracePlayer::open(trace.path()).unwrap();

    let sink = BaseDataSink::with_hook(BroadcastHook::new());
    let mut rx = sink.hook().subscribe();

    let stats = player.play(&sink).await;
    sink.stop();

    assert_eq!(stats, ReplayStats { records: 5, names: 4 });

    let mut received = 0;
    loop {
        match rx.try_recv() {
            Ok(_) => received += 1,
            Err(TryRecvError::Closed) => break,
            Err(other) => panic!("unexpected receive error: {other:?}"),
        }
    }
    assert_eq!(received, 5);

    assert_eq!(sink.get("vehicle_speed").number(), Some(4.5));
    assert_eq!(
        sink.get("transmission_gear_position").value(),
        Some(&MeasurementValue::Text("first".into()))
    );
    let door = sink.get("door_status");
    assert_eq!(door.event(), Some(&MeasurementValue::Bool(false)));
    assert!(!door.is_unknown());
    assert!(sink.get("fuel_level").is_unknown());
}

#[tokio::test]
async fn test_realtime_replay_from_config() {
    let trace = write_trace(TRACE);
    let config = ReplayConfig::from_toml(&format!(
        "trace_file = {:?}\nrealtime = true\nspeed = 10.0\n",
        trace.path().display().to_string()
    ))
    .unwrap();

    let path = config.trace_file.clone().unwrap();
    let player = TracePlayer::open(path)
        .unwrap()
        .realtime(config.realtime)
        .speed(config.speed);

    let sink = BaseDataSink::new();
    let started = std::time::Instant::now();
    player.play(&sink).await;

    // 40ms of recorded time at 10x
    assert!(started.elapsed() >= std::time::Duration::from_millis(3));
    assert_eq!(sink.entries().len(), 4);
    assert_eq!(
        sink.get("headlamp_status").timestamp().map(|t| t.timestamp_millis()),
        Some(1_351_176_963_040)
    );
}

#[test]
fn test_malformed_trace_is_rejected() {
    let trace = write_trace("{\"name\": \"vehicle_speed\", \"value\": 1}\nnot json\n");
    let err = TracePlayer::open(trace.path()).unwrap_err();
    assert!(err.to_string().contains("line 2"));
}
