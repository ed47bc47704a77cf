//! File access for definition sources.

mod file_cache;

pub use file_cache::{FileCache, RealFileCache, VirtualFS};
