//! jsast Language Server binary entry point
//!
//! Run with: jsast-lsp
//!
//! The LSP communicates via stdin/stdout using the Language Server Protocol; logs go to stderr.

use jsast::lsp::JsLanguageServer;
use tower_lsp::{LspService, Server};

#[tokio::main]
async fn main() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    // Create LSP service
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(JsLanguageServer::new);

    // Run server
    Server::new(stdin, stdout, socket).serve(service).await;
}
