//! Locate command implementation.

use std::path::PathBuf;

use crate::correlate::ScrollTarget;
use crate::errors::{DefmarkError, Result};
use crate::interface::Context;
use crate::session::Rendered;

use super::helpers::{prepare_session, read_document};

/// Options for the locate command.
#[derive(Debug, Clone, Default)]
pub struct LocateOptions {
    /// Markdown document to render.
    pub file: PathBuf,
    /// Editor line, 1-based.
    pub line: usize,
    /// Definition files beyond the configured ones.
    pub definitions: Vec<PathBuf>,
}

/// Executes the locate command: prints where the preview would scroll.
pub fn locate(ctx: &Context, options: LocateOptions) -> Result<()> {
    println!("{}", locate_to_string(ctx, &options)?);
    Ok(())
}

/// Renders the document and describes the scroll target for the line.
pub fn locate_to_string(ctx: &Context, options: &LocateOptions) -> Result<String> {
    if options.line == 0 {
        return Err(DefmarkError::Other("Line numbers start at 1".to_string()));
    }

    let session = prepare_session(ctx, &options.definitions)?;
    let text = read_document(ctx, &options.file)?;
    let rendered = session
        .render(1, &text)?
        .ok_or_else(|| DefmarkError::Other("render was superseded".to_string()))?;

    let lines: Vec<&str> = text.lines().collect();
    let target = session.locate(&lines, options.line - 1, &rendered);
    Ok(describe_target(
        target,
        &rendered,
        &session.config().markup.anchor_prefix,
    ))
}

fn describe_target(target: ScrollTarget, rendered: &Rendered, prefix: &str) -> String {
    match target {
        ScrollTarget::Top => "top".to_string(),
        ScrollTarget::Bottom => "bottom".to_string(),
        ScrollTarget::Anchor(index) => match rendered.tree.block(index) {
            Some(block) => format!(
                "{} ({}, line {})",
                block.anchor.id(prefix),
                block.anchor.kind,
                block.source_line
            ),
            None => format!("{}{}", prefix, index),
        },
    }
}
