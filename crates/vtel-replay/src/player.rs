//! Trace player - feeds recorded records into a data sink

use std::collections::HashSet;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, info, warn};
use vtel_core::{parse_trace, BaseDataSink, SinkHook, TelemetryResult, TraceRecord};

/// Summary of one replay run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayStats {
    /// Records delivered to the sink
    pub records: usize,
    /// Distinct measurement names seen
    pub names: usize,
}

/// Replays a parsed trace, optionally paced by its recorded timestamps
#[derive(Debug, Clone)]
pub struct TracePlayer {
    records: Vec<TraceRecord>,
    realtime: bool,
    speed: f64,
}

impl TracePlayer {
    pub fn new(records: Vec<TraceRecord>) -> Self {
        Self {
            records,
            realtime: false,
            speed: 1.0,
        }
    }

    /// Read and parse a trace file
    pub fn open(path: impl AsRef<Path>) -> TelemetryResult<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let records = parse_trace(BufReader::new(file))?;
        info!(path = %path.as_ref().display(), records = records.len(), "Loaded trace");
        Ok(Self::new(records))
    }

    /// Sleep between records according to their timestamps
    pub fn realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    /// Playback speed multiplier (only used in realtime mode)
    pub fn speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Delay to wait before delivering `next`, given the previous record
    ///
    /// Gaps too large for a `Duration` are skipped rather than waited out.
    fn delay_between(&self, previous: Option<f64>, next: Option<f64>) -> Option<Duration> {
        if !self.realtime || !(self.speed.is_finite() && self.speed > 0.0) {
            return None;
        }
        let gap = (next? - previous?) / self.speed;
        if gap <= 0.0 {
            return None;
        }
        match Duration::try_from_secs_f64(gap) {
            Ok(delay) => Some(delay),
            Err(_) => {
                warn!(gap_secs = gap, "Trace gap too large to wait out, skipping");
                None
            }
        }
    }

    /// Deliver every record to `sink`, in file order
    pub async fn play<H: SinkHook>(&self, sink: &BaseDataSink<H>) -> ReplayStats {
        let mut names = HashSet::new();
        let mut previous = None;

        for record in &self.records {
            if let Some(delay) = self.delay_between(previous, record.timestamp) {
                tokio::time::sleep(delay).await;
            }
            if record.timestamp.is_some() {
                previous = record.timestamp;
            }

            debug!(name = %record.name, value = %record.value, "Replaying record");
            sink.receive_measurement(&record.name, record.to_measurement());
            names.insert(record.name.as_str());
        }

        let stats = ReplayStats {
            records: self.records.len(),
            names: names.len(),
        };
        info!(records = stats.records, names = stats.names, "Replay finished");
        stats
    }
}
