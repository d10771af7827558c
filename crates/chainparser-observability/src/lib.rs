//! # chainparser-observability
//!
//! Structured logging for ChainParser binaries. Library crates only emit
//! `tracing` events; installing a subscriber is left to the application.
//!
//! Logs go to stderr so command output on stdout stays machine-readable.

pub mod tracing_setup;

pub use tracing_setup::{init_tracing, try_init_tracing, LogConfig};
