//! Watch command implementation.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::definitions::{SourceFormat, SourceId};
use crate::errors::{DefmarkError, Result};
use crate::interface::Context;
use crate::session::{spawn_reconciler, Event};

use super::helpers::{prepare_session, read_document, write_output};

/// Options for the watch command.
#[derive(Debug, Clone, Default)]
pub struct WatchOptions {
    /// Markdown document to render on every change.
    pub file: PathBuf,
    /// Output file; stdout when absent.
    pub output: Option<PathBuf>,
    /// Debounce delay in milliseconds; 0 uses the configured value.
    pub debounce_ms: u64,
    /// Definition files beyond the configured ones.
    pub definitions: Vec<PathBuf>,
}

/// What a changed path on disk corresponds to.
///
/// Definitions order first so a batch re-renders with the new values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Change {
    /// A definition file, by the path it was loaded under.
    Definition(PathBuf),
    Document,
}

/// The files a watch session reacts to.
#[derive(Debug)]
struct WatchTargets {
    document: PathBuf,
    definitions: HashMap<PathBuf, PathBuf>,
}

impl WatchTargets {
    fn new(ctx: &Context, document: &Path, definitions: &[PathBuf]) -> Self {
        Self {
            document: canonical(&ctx.resolve_path(document)),
            definitions: definitions
                .iter()
                .map(|rel| (canonical(&ctx.resolve_path(rel)), rel.clone()))
                .collect(),
        }
    }

    fn classify(&self, path: &Path) -> Option<Change> {
        let path = canonical(path);
        if path == self.document {
            return Some(Change::Document);
        }
        self.definitions.get(&path).cloned().map(Change::Definition)
    }

    /// Parent directories to watch; files may be replaced rather than written.
    fn dirs(&self) -> BTreeSet<PathBuf> {
        std::iter::once(&self.document)
            .chain(self.definitions.keys())
            .filter_map(|p| p.parent().map(Path::to_path_buf))
            .collect()
    }
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Builds the reconciler event for a changed definition file.
fn definition_event(ctx: &Context, path: &Path) -> Result<Event> {
    let id = SourceId::new(path.display().to_string());
    if !ctx.file_cache.exists(path) {
        return Ok(Event::SourceRemoved { id });
    }
    let format = SourceFormat::from_extension(path).ok_or_else(|| {
        DefmarkError::Config(format!("unknown definition format: {}", path.display()))
    })?;
    let bytes = ctx.file_cache.read_bytes(path)?;
    Ok(Event::SourceChanged { id, format, bytes })
}

/// Executes the watch command.
///
/// Renders once, then re-renders whenever the document or a definition
/// file changes, until interrupted.
pub fn watch(ctx: &Context, options: WatchOptions) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(ctx, options))
}

async fn run(ctx: &Context, options: WatchOptions) -> Result<()> {
    let debounce = if options.debounce_ms > 0 {
        options.debounce_ms
    } else {
        ctx.config.watch.debounce_ms
    };

    let session = Arc::new(prepare_session(ctx, &options.definitions)?);
    let files = ctx.definition_files(&options.definitions)?;
    let targets = WatchTargets::new(ctx, &options.file, &files);

    let (events, events_rx) = mpsc::channel(64);
    let (reconciler, mut published) = spawn_reconciler(Arc::clone(&session), events_rx);

    let mut revision = 1;
    let text = read_document(ctx, &options.file)?;
    send(&events, Event::DocumentEdited { revision, text }).await?;

    let (fs_tx, mut fs_rx) = mpsc::unbounded_channel::<PathBuf>();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<notify::Event>| {
            if let Ok(event) = res {
                for path in event.paths {
                    let _ = fs_tx.send(path);
                }
            }
        },
        notify::Config::default(),
    )
    .map_err(|e| DefmarkError::Watch(e.to_string()))?;

    for dir in targets.dirs() {
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| DefmarkError::Watch(format!("{}: {}", dir.display(), e)))?;
    }

    eprintln!("Watching {} (debounce: {}ms)...", options.file.display(), debounce);
    eprintln!("Press Ctrl+C to stop.");

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            Ok(()) = published.changed() => {
                let latest = published.borrow_and_update().clone();
                if let Some(rendered) = latest {
                    tracing::debug!("Publishing revision {}", rendered.revision);
                    if let Err(e) = write_output(ctx, options.output.as_deref(), &rendered.html) {
                        eprintln!("Write error: {}", e);
                    }
                }
            }
            Some(first) = fs_rx.recv() => {
                let mut changed = BTreeSet::from([first]);
                let settle = tokio::time::sleep(Duration::from_millis(debounce));
                tokio::pin!(settle);
                loop {
                    tokio::select! {
                        _ = &mut settle => break,
                        Some(path) = fs_rx.recv() => {
                            changed.insert(path);
                        }
                    }
                }

                let changes: BTreeSet<Change> =
                    changed.iter().filter_map(|p| targets.classify(p)).collect();

                for change in changes {
                    let event = match change {
                        Change::Document => match read_document(ctx, &options.file) {
                            Ok(text) => {
                                revision += 1;
                                Event::DocumentEdited { revision, text }
                            }
                            Err(e) => {
                                eprintln!("Warning: {}", e);
                                continue;
                            }
                        },
                        Change::Definition(path) => match definition_event(ctx, &path) {
                            Ok(event) => event,
                            Err(e) => {
                                eprintln!("Warning: {}: {}", path.display(), e);
                                continue;
                            }
                        },
                    };
                    send(&events, event).await?;
                }
            }
        }
    }

    drop(watcher);
    send(&events, Event::Shutdown).await?;
    reconciler
        .await
        .map_err(|e| DefmarkError::Watch(e.to_string()))?;
    Ok(())
}

async fn send(events: &mpsc::Sender<Event>, event: Event) -> Result<()> {
    events
        .send(event)
        .await
        .map_err(|_| DefmarkError::Watch("reconciler stopped".to_string()))
}
