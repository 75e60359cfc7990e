//! LSP (Language Server Protocol) backend implementation for jsast
//!
//! Open documents are parsed through a shared [`AstManager`]. The document lifecycle is mapped onto
//! the manager's notifications:
//!
//! - `didOpen`: input changed, followed by the model change the editor fires while loading it
//! - `didChange`: model changing (drops the cached tree), after the new text is stored
//! - `didClose`: invalidate
//! - `workspace/didChangeWatchedFiles`: file content changed, for JavaScript files

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::config::AstManagerConfig;
use crate::files::{MemoryFile, content_type_for};
use crate::lint::{self, Rule};
use crate::lsp::diagnostics::{finding_to_diagnostic, outline_to_symbols, parse_error_to_diagnostic};
use crate::manager::{
    AstManager, FileChangedEvent, FileEventKind, FileMetadata, InputChangedEvent, ModelChangingEvent,
};
use crate::metrics::TracingMetrics;
use crate::outline;
use crate::pipeline::SyntaxTree;

/// Last text and version the client sent for an open document
#[derive(Debug, Clone)]
pub struct DocumentState {
    pub source: String,
    pub version: i32,
}

/// Identity the manager uses for an LSP document.
pub fn document_metadata(uri: &Url) -> FileMetadata {
    let mut metadata = FileMetadata::at(uri.as_str());
    let path = Path::new(uri.path());
    metadata.content_type = content_type_for(path).map(str::to_string);
    metadata.name = path.file_name().map(|n| n.to_string_lossy().into_owned());
    metadata
}

/// Open documents, plus the manager notifications their lifecycle maps to.
///
/// Stored text is updated before the manager hears of a change, so a tree fetched in between is
/// dropped by the invalidation that follows.
pub struct OpenDocuments {
    documents: Arc<RwLock<HashMap<Url, DocumentState>>>,
    manager: Arc<AstManager>,
}

impl OpenDocuments {
    pub fn new(manager: Arc<AstManager>) -> Self {
        Self {
            documents: Arc::new(RwLock::new(HashMap::new())),
            manager,
        }
    }

    pub fn manager(&self) -> &AstManager {
        &self.manager
    }

    pub async fn get(&self, uri: &Url) -> Option<DocumentState> {
        self.documents.read().await.get(uri).cloned()
    }

    pub async fn open(&self, uri: &Url, source: String, version: i32) {
        let metadata = document_metadata(uri);
        self.documents
            .write()
            .await
            .insert(uri.clone(), DocumentState { source, version });

        self.manager
            .on_input_changed(InputChangedEvent {
                file: Some(metadata.clone()),
            })
            .await;
        self.manager
            .on_model_changing(&ModelChangingEvent { file: Some(metadata) })
            .await;
    }

    pub async fn change(&self, uri: &Url, source: String, version: i32) {
        self.documents
            .write()
            .await
            .insert(uri.clone(), DocumentState { source, version });
        self.manager
            .on_model_changing(&ModelChangingEvent {
                file: Some(document_metadata(uri)),
            })
            .await;
    }

    pub async fn close(&self, uri: &Url) {
        self.documents.write().await.remove(uri);
        self.manager.invalidate(Some(&document_metadata(uri))).await;
    }

    /// Forward watched-file changes to the manager. Returns the changed files that are open.
    pub async fn files_changed(&self, uris: Vec<Url>) -> Vec<Url> {
        let event = FileChangedEvent {
            kind: FileEventKind::ContentChanged,
            files: uris.iter().map(document_metadata).collect(),
        };
        self.manager.on_file_changed(&event).await;

        let docs = self.documents.read().await;
        uris.into_iter().filter(|uri| docs.contains_key(uri)).collect()
    }

    /// Tree for an open document, from the manager.
    pub async fn tree(&self, uri: &Url) -> Option<(Arc<SyntaxTree>, String)> {
        let source = self.documents.read().await.get(uri)?.source.clone();
        let file = MemoryFile::new(Some(document_metadata(uri)), source.clone());
        match self.manager.get_tree(&file).await {
            Ok(tree) => Some((tree, source)),
            Err(err) => {
                tracing::warn!(%uri, %err, "failed to get tree");
                None
            }
        }
    }
}

/// jsast Language Server
pub struct JsLanguageServer {
    client: Client,
    documents: OpenDocuments,
    rules: Vec<Box<dyn Rule>>,
}

impl JsLanguageServer {
    pub fn new(client: Client) -> Self {
        Self::with_config(client, AstManagerConfig::default())
    }

    pub fn with_config(client: Client, config: AstManagerConfig) -> Self {
        let manager = Arc::new(AstManager::new(config).with_metrics(Arc::new(TracingMetrics)));
        Self {
            client,
            documents: OpenDocuments::new(manager),
            rules: lint::default_rules(),
        }
    }

    pub fn manager(&self) -> &AstManager {
        self.documents.manager()
    }

    /// Parse and lint `uri`, then publish its syntax errors and findings
    async fn analyze_document(&self, uri: &Url) {
        let Some((tree, source)) = self.documents.tree(uri).await else {
            return;
        };
        let version = self.documents.get(uri).await.map(|doc| doc.version);

        let mut diagnostics: Vec<Diagnostic> = tree
            .errors
            .iter()
            .map(|error| parse_error_to_diagnostic(error, &source))
            .collect();
        diagnostics.extend(
            lint::lint(&tree, &self.rules)
                .iter()
                .map(|finding| finding_to_diagnostic(finding, &source)),
        );

        self.client
            .publish_diagnostics(uri.clone(), diagnostics, version)
            .await;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for JsLanguageServer {
    async fn initialize(&self, _: InitializeParams) -> Result<InitializeResult> {
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                // Whole-document sync
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
                // Outline
                document_symbol_provider: Some(OneOf::Left(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "jsast-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "jsast LSP initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents
            .open(&uri, params.text_document.text, params.text_document.version)
            .await;
        self.analyze_document(&uri).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;

        // Full sync: the last change carries the whole text
        let Some(change) = params.content_changes.into_iter().last() else {
            return;
        };
        self.documents
            .change(&uri, change.text, params.text_document.version)
            .await;
        self.analyze_document(&uri).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;

        self.documents.close(&uri).await;

        // Clear diagnostics
        self.client.publish_diagnostics(uri, vec![], None).await;
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        let mut changed = Vec::new();
        for event in &params.changes {
            if event.typ == FileChangeType::CHANGED {
                changed.push(event.uri.clone());
            }
        }
        for uri in self.documents.files_changed(changed).await {
            self.analyze_document(&uri).await;
        }
    }

    async fn document_symbol(&self, params: DocumentSymbolParams) -> Result<Option<DocumentSymbolResponse>> {
        let Some((tree, source)) = self.documents.tree(&params.text_document.uri).await else {
            return Ok(None);
        };
        let symbols = outline_to_symbols(&outline::outline(&tree), &source);
        Ok(Some(DocumentSymbolResponse::Nested(symbols)))
    }
}
