//! The definition store and its immutable snapshots.

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;
use indexmap::IndexMap;

use super::{load_entries, Definition, FlatEntry, SourceFormat, SourceId};
use crate::config::Config;
use crate::errors::{DefmarkError, Result};
use crate::replace::Replacer;
use crate::sigils::SigilOperator;

/// Flattened key to definition, in order of first appearance.
pub type FlatMapping = IndexMap<String, Definition>;

/// An immutable view of every loaded definition plus its compiled matcher.
///
/// Snapshots are never modified; the store swaps in a new one on every change.
#[derive(Debug)]
pub struct Snapshot {
    mapping: FlatMapping,
    replacer: Replacer,
    generation: u64,
}

impl Snapshot {
    fn empty() -> Self {
        Self {
            mapping: FlatMapping::new(),
            replacer: Replacer::empty(),
            generation: 0,
        }
    }

    /// Returns the flat mapping.
    pub fn mapping(&self) -> &FlatMapping {
        &self.mapping
    }

    /// Returns the matcher compiled for this mapping.
    pub fn replacer(&self) -> &Replacer {
        &self.replacer
    }

    /// Looks up a definition by its joined key.
    pub fn get(&self, key: &str) -> Option<&Definition> {
        self.mapping.get(key)
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Incremented on every successful rebuild.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A key defined by more than one source.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Collision {
    key: String,
    shadowed: SourceId,
    winner: SourceId,
}

/// Outcome of loading one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub source: SourceId,
    /// Number of keys the source defines.
    pub keys: usize,
    /// Keys this source shares with another source, in mapping order.
    pub overridden: Vec<String>,
}

/// Merges definition sources into a flat mapping.
///
/// Sources keep the position of their first registration; on a key
/// collision the later source wins. Reloading a source does not move it, so
/// a source registered early keeps losing to later ones even after it is
/// reloaded last; [`remove`] it first to move it to the end. Readers call
/// [`snapshot`] and never see a partially rebuilt mapping.
///
/// [`snapshot`]: DefinitionStore::snapshot
/// [`remove`]: DefinitionStore::remove
pub struct DefinitionStore {
    operator: SigilOperator,
    separator: String,
    sources: Mutex<IndexMap<SourceId, Vec<FlatEntry>>>,
    current: ArcSwap<Snapshot>,
}

impl DefinitionStore {
    /// Creates an empty store.
    pub fn new(operator: SigilOperator, separator: impl Into<String>) -> Self {
        Self {
            operator,
            separator: separator.into(),
            sources: Mutex::new(IndexMap::new()),
            current: ArcSwap::from_pointee(Snapshot::empty()),
        }
    }

    /// Creates an empty store using the configured sigils and separator.
    pub fn from_config(config: &Config) -> Result<Self> {
        let operator = SigilOperator::new(config.sigils.clone())?;
        Ok(Self::new(operator, config.key_separator.clone()))
    }

    /// Returns the sigil operator used to build matchers.
    pub fn operator(&self) -> &SigilOperator {
        &self.operator
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Returns the registered sources in precedence order.
    pub fn sources(&self) -> Vec<SourceId> {
        let sources = self.sources.lock().unwrap_or_else(PoisonError::into_inner);
        sources.keys().cloned().collect()
    }

    /// Parses a source and replaces its contribution.
    ///
    /// On any failure the previous snapshot stays current and the source's
    /// previous contribution, if any, is retained.
    pub fn load(&self, id: SourceId, format: SourceFormat, text: &str) -> Result<LoadReport> {
        let entries = load_entries(format, text, &self.separator).map_err(|e| {
            tracing::warn!("Dropping definition source {}: {}", id, e);
            DefmarkError::for_source(id.clone(), e)
        })?;
        let keys = entries.len();

        let mut sources = self.sources.lock().unwrap_or_else(PoisonError::into_inner);
        let mut candidate = sources.clone();
        candidate.insert(id.clone(), entries);

        let collisions = self.commit(&mut sources, candidate).map_err(|e| {
            tracing::warn!("Rejecting definition source {}: {}", id, e);
            DefmarkError::for_source(id.clone(), e)
        })?;

        let overridden = collisions
            .into_iter()
            .filter(|c| c.shadowed == id || c.winner == id)
            .map(|c| c.key)
            .collect();

        tracing::debug!("Loaded {} keys from {}", keys, id);
        Ok(LoadReport {
            source: id,
            keys,
            overridden,
        })
    }

    /// Drops a source. Returns false if it was not registered.
    pub fn remove(&self, id: &SourceId) -> Result<bool> {
        let mut sources = self.sources.lock().unwrap_or_else(PoisonError::into_inner);
        if !sources.contains_key(id) {
            return Ok(false);
        }
        let mut candidate = sources.clone();
        candidate.shift_remove(id);
        self.commit(&mut sources, candidate)?;
        tracing::debug!("Removed definition source {}", id);
        Ok(true)
    }

    /// Builds a snapshot for the candidate sources and publishes both.
    fn commit(
        &self,
        sources: &mut IndexMap<SourceId, Vec<FlatEntry>>,
        candidate: IndexMap<SourceId, Vec<FlatEntry>>,
    ) -> Result<Vec<Collision>> {
        let generation = self.current.load().generation + 1;
        let (snapshot, collisions) = self.build(&candidate, generation)?;
        *sources = candidate;
        self.current.store(Arc::new(snapshot));
        Ok(collisions)
    }

    fn build(
        &self,
        sources: &IndexMap<SourceId, Vec<FlatEntry>>,
        generation: u64,
    ) -> Result<(Snapshot, Vec<Collision>)> {
        let mut mapping = FlatMapping::new();
        let mut collisions = Vec::new();

        for (id, entries) in sources {
            for entry in entries {
                let key = entry.key(&self.separator);
                let definition = Definition {
                    path: entry.path.clone(),
                    key: key.clone(),
                    value: entry.value.clone(),
                    source: id.clone(),
                };
                if let Some(previous) = mapping.insert(key.clone(), definition) {
                    if previous.source != *id {
                        tracing::debug!("{} from {} overrides {}", key, id, previous.source);
                        collisions.push(Collision {
                            key,
                            shadowed: previous.source,
                            winner: id.clone(),
                        });
                    }
                }
            }
        }

        let replacer = Replacer::new(
            mapping.iter().map(|(k, d)| (k.as_str(), d.value.as_str())),
            &self.operator,
        )?;

        Ok((
            Snapshot {
                mapping,
                replacer,
                generation,
            },
            collisions,
        ))
    }
}

impl std::fmt::Debug for DefinitionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefinitionStore")
            .field("separator", &self.separator)
            .field("sources", &self.sources())
            .field("generation", &self.current.load().generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Sigils;
    use pretty_assertions::assert_eq;

    fn store() -> DefinitionStore {
        DefinitionStore::new(SigilOperator::new(Sigils::default()).unwrap(), ".")
    }

    fn value(snapshot: &Snapshot, key: &str) -> Option<String> {
        snapshot.get(key).map(|d| d.value.clone())
    }

    #[test]
    fn test_load_builds_snapshot() {
        let store = store();
        let report = store
            .load(SourceId::new("a.yaml"), SourceFormat::Yaml, "a:\n  b: X\n")
            .unwrap();

        assert_eq!(report.keys, 1);
        assert!(report.overridden.is_empty());

        let snap = store.snapshot();
        assert_eq!(value(&snap, "a.b"), Some("X".to_string()));
        assert_eq!(snap.replacer().replace("{{a.b}} end"), "X end");
        assert_eq!(snap.generation(), 1);
    }

    #[test]
    fn test_later_source_wins() {
        let store = store();
        store
            .load(SourceId::new("base"), SourceFormat::Yaml, "name: Base\nonly: here\n")
            .unwrap();
        let report = store
            .load(SourceId::new("local"), SourceFormat::Json, r#"{"name": "Local"}"#)
            .unwrap();
        assert_eq!(report.overridden, vec!["name".to_string()]);

        let snap = store.snapshot();
        assert_eq!(value(&snap, "name"), Some("Local".to_string()));
        assert_eq!(snap.get("name").unwrap().source, SourceId::new("local"));
        assert_eq!(value(&snap, "only"), Some("here".to_string()));
    }

    #[test]
    fn test_reload_keeps_position() {
        let store = store();
        store
            .load(SourceId::new("base"), SourceFormat::Yaml, "name: Base\n")
            .unwrap();
        store
            .load(SourceId::new("local"), SourceFormat::Yaml, "name: Local\n")
            .unwrap();
        store
            .load(SourceId::new("base"), SourceFormat::Yaml, "name: Base2\n")
            .unwrap();

        assert_eq!(
            store.sources(),
            vec![SourceId::new("base"), SourceId::new("local")]
        );
        assert_eq!(value(&store.snapshot(), "name"), Some("Local".to_string()));
    }

    #[test]
    fn test_failed_load_retains_previous_state() {
        let store = store();
        store
            .load(SourceId::new("vars"), SourceFormat::Yaml, "a: 1\n")
            .unwrap();
        let before = store.snapshot();

        let err = store
            .load(SourceId::new("vars"), SourceFormat::Yaml, "a: [unclosed")
            .unwrap_err();
        assert!(matches!(err, DefmarkError::Source { .. }));

        let after = store.snapshot();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(value(&after, "a"), Some("1".to_string()));
    }

    #[test]
    fn test_failed_new_source_not_registered() {
        let store = store();
        assert!(store
            .load(SourceId::new("bad"), SourceFormat::Json, "{")
            .is_err());
        assert!(store.sources().is_empty());
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_remove() {
        let store = store();
        store
            .load(SourceId::new("base"), SourceFormat::Yaml, "name: Base\n")
            .unwrap();
        store
            .load(SourceId::new("local"), SourceFormat::Yaml, "name: Local\n")
            .unwrap();

        assert!(store.remove(&SourceId::new("local")).unwrap());
        assert_eq!(value(&store.snapshot(), "name"), Some("Base".to_string()));
        assert!(!store.remove(&SourceId::new("missing")).unwrap());
    }

    #[test]
    fn test_old_snapshot_unaffected_by_rebuild() {
        let store = store();
        store
            .load(SourceId::new("vars"), SourceFormat::Yaml, "a: 1\n")
            .unwrap();
        let held = store.snapshot();
        store
            .load(SourceId::new("vars"), SourceFormat::Yaml, "a: 2\n")
            .unwrap();

        assert_eq!(value(&held, "a"), Some("1".to_string()));
        assert_eq!(value(&store.snapshot(), "a"), Some("2".to_string()));
    }
}
