//! High-level interface tying configuration, files and sessions together.

mod context;

pub use context::{Context, SourceOutcome};
