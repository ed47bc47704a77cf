//! Refs command implementation.

use std::path::PathBuf;

use crate::errors::Result;
use crate::interface::Context;
use crate::session::Session;

use super::helpers::{prepare_session, read_document};

/// Options for the refs command.
#[derive(Debug, Clone, Default)]
pub struct RefsOptions {
    /// Markdown document to scan.
    pub file: PathBuf,
    /// Only list references with no definition.
    pub unresolved_only: bool,
    /// Definition files beyond the configured ones.
    pub definitions: Vec<PathBuf>,
}

/// Executes the refs command: lists every delimited reference.
pub fn refs(ctx: &Context, options: RefsOptions) -> Result<()> {
    let session = prepare_session(ctx, &options.definitions)?;
    let text = read_document(ctx, &options.file)?;
    for line in describe_references(&session, &text, options.unresolved_only) {
        println!("{}:{}", options.file.display(), line);
    }
    Ok(())
}

/// One line per reference: `line:column key -> value` or `... (unresolved)`.
pub fn describe_references(session: &Session, text: &str, unresolved_only: bool) -> Vec<String> {
    let snapshot = session.snapshot();
    let replacer = snapshot.replacer();

    session
        .store()
        .operator()
        .references(text)
        .into_iter()
        .filter_map(|reference| {
            let loc = reference.location(text);
            let at = format!("{}:{}", loc.line, loc.column);
            match replacer.value(&reference.key) {
                Some(_) if unresolved_only => None,
                Some(value) => Some(format!("{} {} -> {}", at, reference.key, value)),
                None => Some(format!("{} {} (unresolved)", at, reference.key)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::definitions::{SourceFormat, SourceId};
    use pretty_assertions::assert_eq;

    fn session() -> Session {
        let session = Session::new(Config::default()).unwrap();
        session
            .load_source(SourceId::new("vars"), SourceFormat::Yaml, "name: Ada\n")
            .unwrap();
        session
    }

    #[test]
    fn test_describe_references() {
        let text = "Hi {{name}}.\nBye {{ghost}}.\n";
        assert_eq!(
            describe_references(&session(), text, false),
            vec![
                "1:4 name -> Ada".to_string(),
                "2:5 ghost (unresolved)".to_string(),
            ]
        );
    }

    #[test]
    fn test_unresolved_only() {
        let text = "Hi {{name}}.\nBye {{ghost}}.\n";
        assert_eq!(
            describe_references(&session(), text, true),
            vec!["2:5 ghost (unresolved)".to_string()]
        );
    }
}
