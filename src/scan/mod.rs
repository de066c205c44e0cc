//! Scan lifecycle: a single-flight background scan task and the pipeline
//! it runs.

pub mod controller;
pub mod pipeline;

pub use controller::{ScanController, ScanError, StopSignal};
pub use pipeline::{run_scan, ScanContext};
