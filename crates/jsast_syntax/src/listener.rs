//! Parser hooks.
//!
//! A [`ParseListener`] observes the parser while it runs: every consumed token, every scanned
//! comment, every node as it is opened and closed, and every syntax error. Annotation passes
//! (comment attachment, token capture, dependency extraction) are built on top of these hooks
//! instead of re-walking the finished tree.
//!
//! ## Notes
//! - All methods have no-op defaults; `()` is the listener that observes nothing.
//! - Hooks are called synchronously from inside the parser, in source order.

use crate::ast::{Comment, Node};
use crate::diagnostics::ParseError;
use crate::lexer::Token;

pub trait ParseListener {
    /// A token was consumed. Never called for the end-of-input token.
    fn on_token(&mut self, _token: &Token) {}

    /// A comment was scanned. Comments arrive before the token that follows them.
    fn on_comment(&mut self, _comment: &Comment) {}

    /// A node was opened at byte offset `start`. Comments pushed into `leading` become the
    /// node's leading comments.
    ///
    /// Nodes whose start is inherited from an already-parsed child (binary, member, call,
    /// assignment, sequence and conditional expressions) are opened without this hook.
    fn on_node_start(&mut self, _start: usize, _leading: &mut Vec<Comment>) {}

    /// A node was closed. Its span is final; the listener may attach trailing comments.
    fn on_node_finish(&mut self, _node: &mut Node) {}

    /// A syntax error was raised. `fatal` errors abort the parse that raised them.
    fn on_error(&mut self, _error: &ParseError, _fatal: bool) {}
}

impl ParseListener for () {}
