//! Execution context for defmark operations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::definitions::{LoadReport, SourceFormat, SourceId};
use crate::errors::{DefmarkError, Result};
use crate::io::{FileCache, RealFileCache};
use crate::session::Session;

/// Result of loading one definition file.
#[derive(Debug)]
pub struct SourceOutcome {
    pub path: PathBuf,
    pub result: Result<LoadReport>,
}

/// Context for defmark operations.
///
/// Contains configuration and file system access.
#[derive(Debug)]
pub struct Context {
    /// Configuration.
    pub config: Config,
    /// File cache for reading definition files.
    pub file_cache: Arc<dyn FileCache>,
    /// Base directory for relative paths.
    pub base_dir: PathBuf,
}

impl Context {
    /// Creates a context reading from the real file system.
    pub fn new(config: Config, base_dir: PathBuf) -> Self {
        let file_cache = Arc::new(RealFileCache::new(base_dir.clone()));
        Self::with_file_cache(config, base_dir, file_cache)
    }

    /// Creates a context over an arbitrary file cache.
    pub fn with_file_cache(
        config: Config,
        base_dir: PathBuf,
        file_cache: Arc<dyn FileCache>,
    ) -> Self {
        Self {
            config,
            file_cache,
            base_dir,
        }
    }

    /// Creates a context with default configuration.
    pub fn default_for_dir(base_dir: PathBuf) -> Self {
        Self::new(Config::default(), base_dir)
    }

    /// Creates a context from the current directory.
    pub fn from_current_dir() -> Result<Self> {
        let base_dir = std::env::current_dir()?;
        let config = crate::config::read_config(&base_dir)?;
        Ok(Self::new(config, base_dir))
    }

    /// Creates a session from this context's configuration.
    pub fn session(&self) -> Result<Session> {
        Session::new(self.config.clone())
    }

    /// Returns definition files in precedence order.
    ///
    /// Configured patterns come first, each expanded in sorted order, then
    /// `extra` files. A file matched twice keeps its first position.
    pub fn definition_files(&self, extra: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = Vec::new();
        for pattern in self.config.definition_patterns() {
            let matched = self.file_cache.glob(pattern)?;
            if matched.is_empty() {
                tracing::debug!("Definition pattern '{}' matched no files", pattern);
            }
            for path in matched {
                if !files.contains(&path) {
                    files.push(path);
                }
            }
        }
        for path in extra {
            if !self.file_cache.exists(path) {
                return Err(DefmarkError::Config(format!(
                    "Definition file {} does not exist",
                    path.display()
                )));
            }
            if !files.contains(path) {
                files.push(path.clone());
            }
        }
        Ok(files)
    }

    /// Reads and loads each file into the session.
    ///
    /// Failures are reported per file; later files still load.
    pub fn load_definitions(&self, session: &Session, files: &[PathBuf]) -> Vec<SourceOutcome> {
        files
            .iter()
            .map(|path| SourceOutcome {
                path: path.clone(),
                result: self.load_definition(session, path),
            })
            .collect()
    }

    /// Reads and loads one definition file.
    pub fn load_definition(&self, session: &Session, path: &Path) -> Result<LoadReport> {
        let id = SourceId::new(path.display().to_string());
        let format = SourceFormat::from_extension(path).ok_or_else(|| {
            DefmarkError::for_source(
                id.clone(),
                DefmarkError::Config(format!("unknown definition format: {}", path.display())),
            )
        })?;
        let bytes = self
            .file_cache
            .read_bytes(path)
            .map_err(|e| DefmarkError::for_source(id.clone(), e.into()))?;
        session.load_source_bytes(id, format, &bytes)
    }

    /// Resolves a path relative to the base directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}
