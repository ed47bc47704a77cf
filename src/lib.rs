//! Defmark - Markdown document processing core
//!
//! This library turns Markdown with delimited definition references into
//! HTML whose top-level blocks carry stable `p<n>` anchors, and maps editor
//! positions back onto those anchors for synchronized scrolling.
//!
//! # Features
//!
//! - **Definitions**: Load YAML, TOML, JSON and properties files into one flat key/value mapping
//! - **Substitution**: Replace every `{{key}}` in a single pass over the document
//! - **Rendering**: Run a configurable processor chain that ends in anchored HTML
//! - **Correlation**: Estimate the rendered block under an editor caret
//! - **Watch**: Re-render when the document or a definition file changes
//!
//! # Example
//!
//! ```no_run
//! use defmark::interface::Context;
//! use defmark::commands::{render, RenderOptions};
//!
//! let ctx = Context::from_current_dir().unwrap();
//! let options = RenderOptions {
//!     file: "README.md".into(),
//!     ..Default::default()
//! };
//! render(&ctx, options).unwrap();
//! ```

pub mod commands;
pub mod config;
pub mod correlate;
pub mod definitions;
pub mod editing;
pub mod errors;
pub mod interface;
pub mod io;
pub mod markup;
pub mod pipeline;
pub mod replace;
pub mod session;
pub mod sigils;
pub mod text_location;

// Re-export commonly used types
pub use config::Config;
pub use correlate::{AnchorLookup, Correlator, ScrollTarget};
pub use definitions::{DefinitionStore, SourceFormat, SourceId};
pub use errors::{DefmarkError, Result};
pub use interface::Context;
pub use markup::{MarkupConverter, MarkupTree};
pub use pipeline::{Artifact, ProcessContext, Processor, ProcessorChain};
pub use replace::Replacer;
pub use session::{Rendered, Session};
pub use sigils::SigilOperator;

// Re-export command options
pub use commands::{DefsOptions, LocateOptions, RefsOptions, RenderOptions, WatchOptions};
