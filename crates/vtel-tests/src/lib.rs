//! Integration tests for the vtel workspace
//!
//! These tests exercise the crates together:
//!
//! ```bash
//! cargo test -p vtel-tests
//! ```
//!
//! # Test Structure
//!
//! - `store_concurrency_test.rs` - many writers and readers on one store
//! - `sink_test.rs` - sink, hook and broadcast fan-out together
//! - `diagnostic_test.rs` - JSON validation and wire round trips
//! - `replay_test.rs` - trace files replayed into a store

// This crate only contains tests, no library code
