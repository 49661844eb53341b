//! Scenario test suite for Tagfade.
//!
//! Drives the public engine API end to end against an in-memory sink, with
//! tokio's paused clock standing in for wall time.

pub mod helpers;
