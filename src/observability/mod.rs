//! Observability for the alignment pipeline
//!
//! A batch run still wants structured logs: every stage emits spans and
//! counters through `tracing` so a run can be reconstructed from its output.

pub mod logging;

pub use logging::{init_default_logging, init_logging, LogFormat};
