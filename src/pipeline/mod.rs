//! Error-tolerant parse pipeline.
//!
//! [`AstParser::parse`] never fails: it runs the strict parser and, when that reports a syntax
//! error, reruns the same text through the loose parser with the same [`ParseContext`]. The result
//! is always a [`SyntaxTree`], with whatever went wrong listed in `errors`.
//!
//! ```rust
//! use jsast::pipeline::AstParser;
//!
//! let tree = AstParser::new().parse("require(['a/b', 'c']);", "main.js");
//! assert_eq!(tree.dependencies, vec!["a/b", "c"]);
//! assert!(tree.errors.is_empty());
//! ```

pub mod context;
pub mod deps;
pub mod tree;

use std::sync::Arc;
use std::time::Instant;

use jsast_syntax::ParseMode;
use jsast_syntax::ast::{Node, NodeKind, Span};
use jsast_syntax::lines::LineIndex;

pub use context::ParseContext;
pub use deps::DependencyCollector;
pub use tree::{Environment, SyntaxTree, Token, TokenType};

use crate::config::{JAVASCRIPT_CONTENT_TYPE, ParseOptions};
use crate::metrics::{MetricsSink, TIMING_CATEGORY, TIMING_PARSE};

/// Parses text into annotated trees and reports timings.
#[derive(Clone, Default)]
pub struct AstParser {
    options: ParseOptions,
    metrics: Option<Arc<dyn MetricsSink>>,
}

impl std::fmt::Debug for AstParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AstParser")
            .field("options", &self.options)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

impl AstParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse `source`, tagging the result with `source_file`.
    #[tracing::instrument(skip_all, fields(file = %source_file, len = source.len()))]
    pub fn parse(&self, source: &str, source_file: &str) -> SyntaxTree {
        let started = Instant::now();
        let lines = LineIndex::new(source);
        let mut ctx = ParseContext::new(source, &lines, source_file, &self.options);
        let program = match jsast_syntax::parse_with_lines(source, &lines, ParseMode::Strict, &mut ctx) {
            Ok(program) => program,
            Err(error) => {
                tracing::debug!(%error, "strict parse failed, retrying with the loose parser");
                match jsast_syntax::parse_with_lines(source, &lines, ParseMode::Loose, &mut ctx) {
                    Ok(program) => program,
                    Err(error) => {
                        tracing::warn!(%error, "loose parse failed");
                        Node::new(NodeKind::Program { body: Vec::new() }, Span::new(0, source.len()))
                    }
                }
            }
        };
        let tree = ctx.into_tree(program);
        if let Some(metrics) = &self.metrics {
            metrics.log_timing(TIMING_CATEGORY, TIMING_PARSE, started.elapsed(), JAVASCRIPT_CONTENT_TYPE);
        }
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::RecordingMetrics;
    use jsast_syntax::ast::NodeType;
    use jsast_syntax::diagnostics::ParseErrorKind;

    #[test]
    fn test_valid_source_has_no_errors() {
        let tree = AstParser::new().parse("var a = 1;\nfunction f() { return a; }", "a.js");
        assert!(tree.errors.is_empty());
        assert_eq!(tree.body().len(), 2);
        assert_eq!(tree.source_file, "a.js");
    }

    #[test]
    fn test_strict_failure_falls_back_to_loose_tree() {
        let tree = AstParser::new().parse("var a = ;\nfoo();", "a.js");
        assert_eq!(tree.errors.len(), 1);
        assert_eq!(tree.errors[0].kind, ParseErrorKind::Unexpected);
        assert!(tree.body().iter().any(|s| s.node_type() == NodeType::ExpressionStatement));
    }

    #[test]
    fn test_failure_at_end_of_input() {
        let tree = AstParser::new().parse("foo(", "a.js");
        assert_eq!(tree.errors.len(), 1);
        assert_eq!(tree.errors[0].kind, ParseErrorKind::EndOfInput);
        assert_eq!(tree.tokens.len(), 2);
    }

    #[test]
    fn test_unterminated_block_comment() {
        let tree = AstParser::new().parse("x = 1; /* abc", "a.js");
        assert_eq!(tree.comments.len(), 1);
        assert_eq!(tree.comments[0].span, Span::new(7, 13));
        assert_eq!(tree.errors.len(), 1);
        assert_eq!(tree.errors[0].kind, ParseErrorKind::EndOfInput);
    }

    #[test]
    fn test_metrics_receive_parse_timing() {
        let metrics = Arc::new(RecordingMetrics::new());
        let parser = AstParser::new().with_metrics(metrics.clone());
        parser.parse("x;", "a.js");
        let timings = metrics.timings();
        assert_eq!(timings.len(), 1);
        assert_eq!(timings[0].category, "language tools");
        assert_eq!(timings[0].operation, "parse");
        assert_eq!(timings[0].content_type, "application/javascript");
    }

    #[test]
    fn test_source_file_tag_can_be_disabled() {
        let parser = AstParser::new().with_options(ParseOptions::default().with_source_file(false));
        let tree = parser.parse("foo(", "a.js");
        assert_eq!(tree.errors[0].source_file, None);
    }

    #[test]
    fn test_deep_nesting_is_reported_not_fatal_on_worker_sized_stack() {
        let sources = [
            format!("{}1;", "a=".repeat(20_000)),
            format!("{}1;", "a?b:".repeat(20_000)),
            format!("var {}x = y;", "[".repeat(20_000)),
            format!("{}1{};", "(".repeat(150), ")".repeat(150)),
        ];
        let errors = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(move || {
                sources
                    .iter()
                    .map(|source| AstParser::new().parse(source, "deep.js").errors)
                    .collect::<Vec<_>>()
            })
            .unwrap()
            .join()
            .unwrap();
        for tree_errors in &errors[..3] {
            assert_eq!(tree_errors[0].message, "Nesting too deep");
        }
        assert!(errors[3].is_empty());
    }
}
