//! jsast Language Server Protocol (LSP) implementation
//!
//! Provides IDE features:
//! - Real-time diagnostics (syntax errors, lint findings)
//! - Document outline

pub mod backend;
pub mod diagnostics;

pub use backend::JsLanguageServer;
