//! Shared AST manager.
//!
//! The manager hands out one parsed tree per file and keeps the most recently used ones in an
//! [`LruCache`] keyed by file location. Editors keep it coherent by forwarding their change
//! notifications:
//!
//! - [`AstManager::on_input_changed`] records that the editor switched to another input.
//! - [`AstManager::on_model_changing`] drops the file's tree, except for the first event after an
//!   input change, which the editor fires while loading the new input.
//! - [`AstManager::on_file_changed`] drops every JavaScript file of a content-changed batch.
//!
//! ## Notes
//! - The state lock is never held across a fetch. Two concurrent misses for the same file may
//!   parse twice; the later result replaces the earlier one and both are equivalent.
//! - Every invalidation bumps the key's generation, cached or not. A fetch that overlapped one
//!   still returns its tree but does not cache it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::cache::LruCache;
use crate::config::AstManagerConfig;
use crate::metrics::MetricsSink;
use crate::pipeline::{AstParser, SyntaxTree};

/// Cache key used when a file has no location.
pub const UNKNOWN_LOCATION: &str = "unknown";

/// What the file-access layer knows about a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMetadata {
    /// Stable identity of the file, used as the cache key.
    pub location: Option<String>,
    pub content_type: Option<String>,
    pub name: Option<String>,
}

impl FileMetadata {
    pub fn at(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..Self::default()
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Cache key for a file: its location, or [`UNKNOWN_LOCATION`].
pub fn cache_key(metadata: Option<&FileMetadata>) -> String {
    metadata
        .and_then(|m| m.location.clone())
        .unwrap_or_else(|| UNKNOWN_LOCATION.to_string())
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to read {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{location} is too large ({size} bytes, max {max} bytes)")]
    TooLarge { location: String, size: u64, max: u64 },
    #[error("file metadata unavailable: {0}")]
    Metadata(String),
    #[error("file contents unavailable: {0}")]
    Text(String),
}

/// Access to one file's metadata and text.
#[async_trait]
pub trait FileHandle: Send + Sync {
    async fn metadata(&self) -> Result<Option<FileMetadata>, FetchError>;
    async fn text(&self) -> Result<String, FetchError>;
}

/// The editor switched to a new input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputChangedEvent {
    pub file: Option<FileMetadata>,
}

/// The editor's text model for `file` is about to change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelChangingEvent {
    pub file: Option<FileMetadata>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEventKind {
    ContentChanged,
    Created,
    Deleted,
}

/// A batch of file-system notifications of one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChangedEvent {
    pub kind: FileEventKind,
    pub files: Vec<FileMetadata>,
}

struct ManagerState {
    cache: LruCache<String, Arc<SyntaxTree>>,
    pending_input: Option<InputChangedEvent>,
    /// Invalidation count per key.
    generations: HashMap<String, u64>,
}

impl ManagerState {
    fn generation(&self, key: &str) -> u64 {
        self.generations.get(key).copied().unwrap_or(0)
    }

    fn invalidate(&mut self, key: String) -> bool {
        let removed = self.cache.remove(&key).is_some();
        if removed {
            tracing::debug!(%key, "ast cache invalidated");
        }
        *self.generations.entry(key).or_default() += 1;
        removed
    }
}

pub struct AstManager {
    config: AstManagerConfig,
    parser: AstParser,
    state: Mutex<ManagerState>,
}

impl Default for AstManager {
    fn default() -> Self {
        Self::new(AstManagerConfig::default())
    }
}

impl AstManager {
    pub fn new(config: AstManagerConfig) -> Self {
        let parser = AstParser::new().with_options(config.parse.clone());
        let cache = LruCache::new(config.cache_capacity);
        Self {
            config,
            parser,
            state: Mutex::new(ManagerState {
                cache,
                pending_input: None,
                generations: HashMap::new(),
            }),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.parser = self.parser.with_metrics(metrics);
        self
    }

    pub fn config(&self) -> &AstManagerConfig {
        &self.config
    }

    /// Tree for `file`, from the cache or freshly parsed.
    ///
    /// ## Errors
    /// Propagates failures of the file handle. Syntax errors never fail; they are recorded on the
    /// tree.
    pub async fn get_tree(&self, file: &dyn FileHandle) -> Result<Arc<SyntaxTree>, FetchError> {
        let metadata = file.metadata().await?;
        let key = cache_key(metadata.as_ref());
        let generation = {
            let mut state = self.state.lock().await;
            if let Some(tree) = state.cache.get(&key) {
                tracing::debug!(%key, "ast cache hit");
                return Ok(Arc::clone(tree));
            }
            state.generation(&key)
        };
        tracing::debug!(%key, "ast cache miss");

        let text = file.text().await?;
        let tree = Arc::new(self.parser.parse(&text, &key));

        let mut state = self.state.lock().await;
        if state.generation(&key) != generation {
            tracing::debug!(%key, "ast invalidated during fetch, not cached");
            return Ok(tree);
        }
        if let Some((evicted, _)) = state.cache.put(key, Arc::clone(&tree)) {
            tracing::debug!(key = %evicted, "ast cache evicted");
        }
        Ok(tree)
    }

    /// Cached tree for `file`, without parsing or refreshing recency.
    pub async fn cached(&self, file: Option<&FileMetadata>) -> Option<Arc<SyntaxTree>> {
        self.state.lock().await.cache.peek(&cache_key(file)).cloned()
    }

    /// Drop the cached tree for `file`. Returns whether one was cached.
    pub async fn invalidate(&self, file: Option<&FileMetadata>) -> bool {
        self.state.lock().await.invalidate(cache_key(file))
    }

    pub async fn on_input_changed(&self, event: InputChangedEvent) {
        self.state.lock().await.pending_input = Some(event);
    }

    pub async fn on_model_changing(&self, event: &ModelChangingEvent) {
        let mut state = self.state.lock().await;
        if state.pending_input.take().is_some() {
            tracing::trace!("model change right after input change ignored");
            return;
        }
        state.invalidate(cache_key(event.file.as_ref()));
    }

    pub async fn on_file_changed(&self, event: &FileChangedEvent) {
        if event.kind != FileEventKind::ContentChanged {
            return;
        }
        let mut state = self.state.lock().await;
        for file in &event.files {
            if file.content_type.as_deref() != Some(self.config.javascript_content_type.as_str()) {
                continue;
            }
            state.invalidate(cache_key(Some(file)));
        }
    }

    /// Number of cached trees.
    pub async fn len(&self) -> usize {
        self.state.lock().await.cache.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::MemoryFile;
    use tokio::sync::Notify;

    fn js(location: &str, text: &str) -> MemoryFile {
        MemoryFile::new(
            Some(FileMetadata::at(location).with_content_type("application/javascript")),
            text,
        )
    }

    #[tokio::test]
    async fn test_second_get_is_cached_instance() {
        let manager = AstManager::default();
        let file = js("/a.js", "var a;");
        let first = manager.get_tree(&file).await.unwrap();
        let second = manager.get_tree(&file).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(file.text_reads(), 1);
    }

    #[tokio::test]
    async fn test_missing_location_uses_unknown_key() {
        let manager = AstManager::default();
        let file = MemoryFile::new(None, "x;");
        let tree = manager.get_tree(&file).await.unwrap();
        assert_eq!(tree.source_file, "unknown");
        assert!(manager.cached(None).await.is_some());
    }

    #[tokio::test]
    async fn test_model_changing_after_input_changed_is_ignored_once() {
        let manager = AstManager::default();
        let file = js("/a.js", "var a;");
        manager.get_tree(&file).await.unwrap();
        let event = ModelChangingEvent {
            file: Some(FileMetadata::at("/a.js")),
        };

        manager.on_input_changed(InputChangedEvent::default()).await;
        manager.on_model_changing(&event).await;
        assert!(manager.cached(event.file.as_ref()).await.is_some());

        manager.on_model_changing(&event).await;
        assert!(manager.cached(event.file.as_ref()).await.is_none());
    }

    #[tokio::test]
    async fn test_file_changed_only_drops_javascript() {
        let manager = AstManager::default();
        manager.get_tree(&js("/a.js", "a;")).await.unwrap();
        manager.get_tree(&js("/b.js", "b;")).await.unwrap();
        let event = FileChangedEvent {
            kind: FileEventKind::ContentChanged,
            files: vec![
                FileMetadata::at("/a.js").with_content_type("application/javascript"),
                FileMetadata::at("/b.js").with_content_type("text/plain"),
            ],
        };
        manager.on_file_changed(&event).await;
        assert!(manager.cached(Some(&FileMetadata::at("/a.js"))).await.is_none());
        assert!(manager.cached(Some(&FileMetadata::at("/b.js"))).await.is_some());
    }

    #[tokio::test]
    async fn test_other_file_events_are_ignored() {
        let manager = AstManager::default();
        manager.get_tree(&js("/a.js", "a;")).await.unwrap();
        let event = FileChangedEvent {
            kind: FileEventKind::Deleted,
            files: vec![FileMetadata::at("/a.js").with_content_type("application/javascript")],
        };
        manager.on_file_changed(&event).await;
        assert_eq!(manager.len().await, 1);
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recent() {
        let manager = AstManager::new(AstManagerConfig::default().with_cache_capacity(2));
        let (a, b, c) = (js("/a.js", "a;"), js("/b.js", "b;"), js("/c.js", "c;"));
        manager.get_tree(&a).await.unwrap();
        manager.get_tree(&b).await.unwrap();
        manager.get_tree(&a).await.unwrap();
        manager.get_tree(&c).await.unwrap();
        assert!(manager.cached(Some(&FileMetadata::at("/b.js"))).await.is_none());
        assert_eq!(manager.len().await, 2);
    }

    #[tokio::test]
    async fn test_fetch_errors_propagate() {
        let manager = AstManager::default();
        let file = MemoryFile::failing(FileMetadata::at("/gone.js"));
        let err = manager.get_tree(&file).await.unwrap_err();
        assert!(matches!(err, FetchError::Text(_)));
        assert!(manager.is_empty().await);
    }

    #[tokio::test]
    async fn test_invalidate_reports_removal() {
        let manager = AstManager::default();
        manager.get_tree(&js("/a.js", "a;")).await.unwrap();
        assert!(manager.invalidate(Some(&FileMetadata::at("/a.js"))).await);
        assert!(!manager.invalidate(Some(&FileMetadata::at("/a.js"))).await);
    }

    /// Handle whose text is held back until `gate` is notified.
    struct GatedFile {
        metadata: FileMetadata,
        text: String,
        fetching: Arc<Notify>,
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl FileHandle for GatedFile {
        async fn metadata(&self) -> Result<Option<FileMetadata>, FetchError> {
            Ok(Some(self.metadata.clone()))
        }

        async fn text(&self) -> Result<String, FetchError> {
            self.fetching.notify_one();
            self.gate.notified().await;
            Ok(self.text.clone())
        }
    }

    #[tokio::test]
    async fn test_invalidation_during_fetch_is_not_overwritten() {
        let manager = Arc::new(AstManager::default());
        let (fetching, gate) = (Arc::new(Notify::new()), Arc::new(Notify::new()));
        let file = GatedFile {
            metadata: FileMetadata::at("/a.js"),
            text: "require('old');".to_string(),
            fetching: Arc::clone(&fetching),
            gate: Arc::clone(&gate),
        };
        let pending = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.get_tree(&file).await })
        };

        fetching.notified().await;
        manager
            .on_model_changing(&ModelChangingEvent {
                file: Some(FileMetadata::at("/a.js")),
            })
            .await;
        gate.notify_one();

        let tree = pending.await.unwrap().unwrap();
        assert_eq!(tree.dependencies, vec!["old"]);
        assert!(manager.cached(Some(&FileMetadata::at("/a.js"))).await.is_none());

        // Later fetches cache again.
        manager.get_tree(&js("/a.js", "require('new');")).await.unwrap();
        assert!(manager.cached(Some(&FileMetadata::at("/a.js"))).await.is_some());
    }

    #[tokio::test]
    async fn test_invalidating_another_file_keeps_fetch_cacheable() {
        let manager = Arc::new(AstManager::default());
        let (fetching, gate) = (Arc::new(Notify::new()), Arc::new(Notify::new()));
        let file = GatedFile {
            metadata: FileMetadata::at("/a.js"),
            text: "a;".to_string(),
            fetching: Arc::clone(&fetching),
            gate: Arc::clone(&gate),
        };
        let pending = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.get_tree(&file).await })
        };

        fetching.notified().await;
        manager.invalidate(Some(&FileMetadata::at("/b.js"))).await;
        gate.notify_one();

        pending.await.unwrap().unwrap();
        assert!(manager.cached(Some(&FileMetadata::at("/a.js"))).await.is_some());
    }
}
