//! Shared command helpers.

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{DefmarkError, Result};
use crate::interface::Context;
use crate::session::Session;

/// Creates a session and loads every definition file into it.
///
/// A file that fails to load is reported and skipped.
pub fn prepare_session(ctx: &Context, extra_definitions: &[PathBuf]) -> Result<Session> {
    let session = ctx.session()?;
    let files = ctx.definition_files(extra_definitions)?;
    for outcome in ctx.load_definitions(&session, &files) {
        match outcome.result {
            Ok(report) => {
                tracing::debug!("{}: {} keys", outcome.path.display(), report.keys);
                for key in report.overridden {
                    tracing::debug!("{}: shares key {}", outcome.path.display(), key);
                }
            }
            Err(e) => eprintln!("Warning: {}", e),
        }
    }
    Ok(session)
}

/// Reads a document relative to the context's base directory.
pub fn read_document(ctx: &Context, file: &Path) -> Result<String> {
    let full_path = ctx.resolve_path(file);
    if !full_path.exists() {
        return Err(DefmarkError::Other(format!(
            "File not found: {}",
            full_path.display()
        )));
    }
    Ok(fs::read_to_string(full_path)?)
}

/// Writes output to a file, or stdout when no file is given.
pub fn write_output(ctx: &Context, output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            let full_path = ctx.resolve_path(path);
            if let Some(parent) = full_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&full_path, content)?;
            tracing::info!("Wrote {}", full_path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}
