//! Command implementations for the defmark CLI.

mod config;
mod defs;
mod helpers;
mod locate;
mod refs;
mod render;
mod watch;

pub use config::{config_to_string, show_config};
pub use defs::{defs, format_definitions, DefsOptions};
pub use helpers::prepare_session;
pub use locate::{locate, locate_to_string, LocateOptions};
pub use refs::{describe_references, refs, RefsOptions};
pub use render::{render, render_to_string, RenderOptions};
pub use watch::{watch, WatchOptions};
