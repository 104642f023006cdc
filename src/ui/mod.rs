//! ui
//!
//! Operator-facing output and diagnostics.
//!
//! # Modules
//!
//! - [`logging`] - Tracing subscriber setup
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! Command results go to stdout, as text or as JSON with `--json`.
//! Diagnostics go to stderr through `tracing`, so piping stdout into other
//! tools never mixes in log lines.

pub mod logging;
pub mod output;
