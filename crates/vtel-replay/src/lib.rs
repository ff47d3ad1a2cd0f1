//! vtel-replay - Replay recorded vehicle traces
//!
//! Reads a JSON-lines trace and pushes each record through a
//! [`BaseDataSink`](vtel_core::BaseDataSink), exactly as a live vehicle
//! interface would. Useful for exercising consumers without a vehicle.
//!
//! # Usage
//!
//! ```bash
//! vtel-replay --trace traces/downtown-loop.json --realtime
//! vtel-replay --config config/replay.toml --verbose
//! ```

pub mod config;
pub mod player;

pub use config::{ConfigError, ConfigOverrides, ReplayConfig};
pub use player::{ReplayStats, TracePlayer};
