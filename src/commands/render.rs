//! Render command implementation.

use std::path::{Path, PathBuf};

use crate::errors::{DefmarkError, Result};
use crate::interface::Context;

use super::helpers::{prepare_session, read_document, write_output};

/// Options for the render command.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Markdown document to render.
    pub file: PathBuf,
    /// Output file; stdout when absent.
    pub output: Option<PathBuf>,
    /// Wrap the body in a complete HTML page.
    pub standalone: bool,
    /// Definition files beyond the configured ones.
    pub definitions: Vec<PathBuf>,
}

/// Executes the render command.
pub fn render(ctx: &Context, options: RenderOptions) -> Result<()> {
    let html = render_to_string(ctx, &options)?;
    write_output(ctx, options.output.as_deref(), &html)
}

/// Renders the document to HTML.
pub fn render_to_string(ctx: &Context, options: &RenderOptions) -> Result<String> {
    let session = prepare_session(ctx, &options.definitions)?;
    let text = read_document(ctx, &options.file)?;
    let rendered = session
        .render(1, &text)?
        .ok_or_else(|| DefmarkError::Other("render was superseded".to_string()))?;

    if options.standalone {
        Ok(standalone_page(&options.file, &rendered.html))
    } else {
        Ok(rendered.html)
    }
}

fn standalone_page(file: &Path, body: &str) -> String {
    let title = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape_html(&title),
        body
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_render_with_definitions() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("vars.yaml"), "book:\n  title: Voyage\n").unwrap();
        fs::write(dir.path().join("doc.md"), "# {{book.title}}\n\nText.\n").unwrap();

        let ctx = Context::default_for_dir(dir.path().to_path_buf());
        let options = RenderOptions {
            file: PathBuf::from("doc.md"),
            definitions: vec![PathBuf::from("vars.yaml")],
            ..Default::default()
        };

        let html = render_to_string(&ctx, &options).unwrap();
        assert_eq!(html, "<h1 id=\"p1\">Voyage</h1>\n<p id=\"p2\">Text.</p>\n");
    }

    #[test]
    fn test_render_standalone_to_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("doc.md"), "Hello.\n").unwrap();

        let ctx = Context::default_for_dir(dir.path().to_path_buf());
        let options = RenderOptions {
            file: PathBuf::from("doc.md"),
            output: Some(PathBuf::from("out/doc.html")),
            standalone: true,
            ..Default::default()
        };
        render(&ctx, options).unwrap();

        let page = fs::read_to_string(dir.path().join("out/doc.html")).unwrap();
        assert!(page.contains("<title>doc</title>"));
        assert!(page.contains("<p id=\"p1\">Hello.</p>"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("a \"b\" <c> & d"),
            "a &quot;b&quot; &lt;c&gt; &amp; d"
        );
    }

    #[test]
    fn test_render_missing_file() {
        let dir = tempdir().unwrap();
        let ctx = Context::default_for_dir(dir.path().to_path_buf());
        let options = RenderOptions {
            file: PathBuf::from("missing.md"),
            ..Default::default()
        };
        assert!(render_to_string(&ctx, &options).is_err());
    }
}
