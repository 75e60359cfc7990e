#![forbid(unsafe_code)]
//! Shared JavaScript AST cache with an error-tolerant parsing pipeline
//!
//! Parsing is done by the `jsast_syntax` crate. This crate annotates the result (tokens, comments,
//! module dependencies, environment hints), caches trees per file, and exposes them to consumers:
//! lint rules, the outline, the `jsast` CLI and the `jsast-lsp` language server.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module
//!   enforces `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **Parsing**: [`pipeline::AstParser::parse`] never fails; syntax errors are recorded on the tree.

pub mod cache;
pub mod cli;
pub mod config;
pub mod files;
pub mod lint;
pub mod lsp;
pub mod manager;
pub mod metrics;
pub mod outline;
pub mod pipeline;
pub mod report;

pub use jsast_syntax::{ast, diagnostics, lexer};

pub use cache::LruCache;
pub use config::{AstManagerConfig, ParseOptions};
pub use manager::{AstManager, FetchError, FileHandle, FileMetadata};
pub use pipeline::{AstParser, SyntaxTree};
