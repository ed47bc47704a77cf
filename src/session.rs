//! A rendering session and its reconciliation task.
//!
//! A [`Session`] owns the definition store and processor chain for one
//! document. Changes arrive as [`Event`]s on a channel; a single task applies
//! them in order and publishes the newest render.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::correlate::{Correlator, ScrollTarget};
use crate::definitions::{DefinitionStore, LoadReport, Snapshot, SourceFormat, SourceId};
use crate::errors::{DefmarkError, Result};
use crate::markup::MarkupTree;
use crate::pipeline::{Artifact, ProcessContext, ProcessorChain};

/// Output of one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub revision: u64,
    pub html: String,
    /// Anchored blocks; empty when the chain has no markup stage.
    pub tree: MarkupTree,
}

/// Owns the store, chain and correlator for one document.
#[derive(Debug)]
pub struct Session {
    config: Config,
    store: DefinitionStore,
    chain: ProcessorChain,
    correlator: Correlator,
    /// Highest revision published so far.
    published: AtomicU64,
}

impl Session {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let store = DefinitionStore::from_config(&config)?;
        let chain = ProcessorChain::from_config(&config.stages);
        let correlator =
            Correlator::new(config.correlator).with_front_matter(config.markup.front_matter);
        Ok(Self {
            config,
            store,
            chain,
            correlator,
            published: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &DefinitionStore {
        &self.store
    }

    pub fn correlator(&self) -> &Correlator {
        &self.correlator
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.store.snapshot()
    }

    /// Loads or reloads a definition source.
    pub fn load_source(&self, id: SourceId, format: SourceFormat, text: &str) -> Result<LoadReport> {
        self.store.load(id, format, text)
    }

    /// Loads a source from raw bytes, rejecting invalid UTF-8.
    pub fn load_source_bytes(
        &self,
        id: SourceId,
        format: SourceFormat,
        bytes: &[u8],
    ) -> Result<LoadReport> {
        let text = std::str::from_utf8(bytes).map_err(|_| {
            DefmarkError::for_source(id.clone(), DefmarkError::Encoding(id.to_string()))
        })?;
        self.load_source(id, format, text)
    }

    pub fn remove_source(&self, id: &SourceId) -> Result<bool> {
        self.store.remove(id)
    }

    /// Builds the context for a run over the current snapshot.
    pub fn context(&self) -> ProcessContext {
        ProcessContext::new(
            self.store.snapshot(),
            self.store.operator().clone(),
            self.config.markup.clone(),
        )
    }

    /// Runs the chain over `text` as document revision `revision`.
    ///
    /// Returns `None` when a newer revision was already published, in which
    /// case the result is discarded.
    pub fn render(&self, revision: u64, text: &str) -> Result<Option<Rendered>> {
        if revision < self.published.load(Ordering::Acquire) {
            return Ok(None);
        }

        let context = self.context();
        let mut tree = MarkupTree::default();
        let output = self.chain.run_inspect(text, &context, |_, artifact| {
            if let Artifact::Tree(t) = artifact {
                tree = t.clone();
            }
        })?;

        let html = match output {
            Artifact::Html(html) | Artifact::Text(html) => html,
            Artifact::Tree(t) => t.to_html(&self.config.markup.anchor_prefix),
        };

        let previous = self.published.fetch_max(revision, Ordering::AcqRel);
        if previous > revision {
            tracing::debug!("Discarding revision {} superseded by {}", revision, previous);
            return Ok(None);
        }

        Ok(Some(Rendered {
            revision,
            html,
            tree,
        }))
    }

    /// Maps an editor line to a scroll target in a render.
    pub fn locate<S: AsRef<str>>(
        &self,
        lines: &[S],
        paragraph_index: usize,
        rendered: &Rendered,
    ) -> ScrollTarget {
        self.correlator.locate(lines, paragraph_index, &rendered.tree)
    }
}

/// A change for the reconciliation task.
#[derive(Debug, Clone)]
pub enum Event {
    SourceChanged {
        id: SourceId,
        format: SourceFormat,
        bytes: Vec<u8>,
    },
    SourceRemoved {
        id: SourceId,
    },
    DocumentEdited {
        revision: u64,
        text: String,
    },
    Shutdown,
}

/// Spawns the task that applies events in order and publishes renders.
///
/// A source change re-renders the last edited document. Source failures are
/// logged and leave the previous definitions in place.
pub fn spawn_reconciler(
    session: Arc<Session>,
    mut events: mpsc::Receiver<Event>,
) -> (JoinHandle<()>, watch::Receiver<Option<Arc<Rendered>>>) {
    let (tx, rx) = watch::channel(None);

    let handle = tokio::spawn(async move {
        let mut document: Option<(u64, String)> = None;

        while let Some(event) = events.recv().await {
            let rerender = match event {
                Event::SourceChanged { id, format, bytes } => {
                    match session.load_source_bytes(id, format, &bytes) {
                        Ok(report) => {
                            tracing::debug!("Reloaded {} ({} keys)", report.source, report.keys);
                            true
                        }
                        Err(e) => {
                            tracing::warn!("{}", e);
                            false
                        }
                    }
                }
                Event::SourceRemoved { id } => match session.remove_source(&id) {
                    Ok(removed) => removed,
                    Err(e) => {
                        tracing::warn!("Failed to remove {}: {}", id, e);
                        false
                    }
                },
                Event::DocumentEdited { revision, text } => {
                    document = Some((revision, text));
                    true
                }
                Event::Shutdown => break,
            };

            if !rerender {
                continue;
            }
            let Some((revision, text)) = &document else {
                continue;
            };

            match session.render(*revision, text) {
                Ok(Some(rendered)) => {
                    tx.send_replace(Some(Arc::new(rendered)));
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("Render of revision {} failed: {}", revision, e),
            }
        }

        tracing::debug!("Reconciler stopped");
    });

    (handle, rx)
}
