//! Per-parse annotation state.
//!
//! [`ParseContext`] is the [`ParseListener`] installed for both the strict and the loose pass. It
//! records classified tokens and comments, attaches leading/trailing comments to nodes through
//! two forward-only cursors, feeds call expressions to the dependency collector and keeps the
//! errors that end up on the tree.
//!
//! ## Notes
//! - The first fatal error clears tokens, comments and both cursors, exactly once. The loose pass
//!   then records the whole stream again; errors it raises never clear anything.
//! - Dependencies and environments survive that reset.

use std::collections::HashSet;

use jsast_syntax::ast::{Comment, Node, NodeKind};
use jsast_syntax::diagnostics::ParseError;
use jsast_syntax::lexer::{Token as LexToken, TokenKind};
use jsast_syntax::lines::LineIndex;
use jsast_syntax::listener::ParseListener;

use super::deps::DependencyCollector;
use super::tree::{SyntaxTree, Token, TokenType};
use crate::config::ParseOptions;

pub struct ParseContext<'s> {
    source: &'s str,
    source_file: String,
    options: ParseOptions,
    lines: &'s LineIndex,
    tokens: Vec<Token>,
    comments: Vec<Comment>,
    leading_cursor: usize,
    trailing_cursor: usize,
    collector: DependencyCollector,
    failure: Option<ParseError>,
    diagnostics: Vec<ParseError>,
    needs_reset: bool,
}

impl<'s> ParseContext<'s> {
    /// Context for one parse of `source`. `lines` is the index both passes locate errors with.
    pub fn new(
        source: &'s str,
        lines: &'s LineIndex,
        source_file: impl Into<String>,
        options: &ParseOptions,
    ) -> Self {
        Self {
            source,
            source_file: source_file.into(),
            options: options.clone(),
            lines,
            tokens: Vec::new(),
            comments: Vec::new(),
            leading_cursor: 0,
            trailing_cursor: 0,
            collector: DependencyCollector::new(),
            failure: None,
            diagnostics: Vec::new(),
            needs_reset: true,
        }
    }

    fn reset(&mut self) {
        self.tokens.clear();
        self.comments.clear();
        self.leading_cursor = 0;
        self.trailing_cursor = 0;
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// The error that stopped the strict pass, if any.
    pub fn failure(&self) -> Option<&ParseError> {
        self.failure.as_ref()
    }

    fn token_value(&self, token: &LexToken) -> String {
        match &token.kind {
            TokenKind::RegExp { pattern, flags } => format!("/{pattern}/{flags}"),
            _ => token.raw(self.source).to_string(),
        }
    }

    /// Finish the parse: move the recorded state onto `program`.
    ///
    /// Errors are ordered with the strict failure first, followed by the lexical diagnostics of
    /// both passes, without repeating a (position, message) pair.
    pub fn into_tree(self, program: Node) -> SyntaxTree {
        let mut seen = HashSet::new();
        let tag = self.options.source_file.then_some(self.source_file.as_str());
        let errors = self
            .failure
            .into_iter()
            .chain(self.diagnostics)
            .filter(|e| seen.insert((e.index, e.message.clone())))
            .map(|e| match tag {
                Some(file) => e.with_source_file(file),
                None => e,
            })
            .collect();
        let (dependencies, environments) = self.collector.into_parts();
        SyntaxTree {
            program,
            comments: self.comments,
            tokens: self.tokens,
            dependencies,
            environments,
            errors,
            source_file: self.source_file,
        }
    }
}

impl ParseListener for ParseContext<'_> {
    fn on_token(&mut self, token: &LexToken) {
        let Some(token_type) = TokenType::classify(&token.kind) else {
            return;
        };
        let value = self.token_value(token);
        self.tokens.push(Token {
            token_type,
            value,
            range: token.span,
            index: self.tokens.len(),
        });
    }

    fn on_comment(&mut self, comment: &Comment) {
        let mut comment = comment.clone();
        if self.options.locations {
            let file = self.options.source_file.then_some(self.source_file.as_str());
            comment.location = Some(self.lines.location(comment.span, file));
        }
        self.comments.push(comment);
    }

    fn on_node_start(&mut self, start: usize, leading: &mut Vec<Comment>) {
        while let Some(comment) = self.comments.get(self.leading_cursor) {
            if comment.span.end > start {
                break;
            }
            leading.push(comment.clone());
            self.leading_cursor += 1;
        }
    }

    fn on_node_finish(&mut self, node: &mut Node) {
        if matches!(node.kind, NodeKind::CallExpression { .. } | NodeKind::NewExpression { .. }) {
            self.collector.inspect(node);
        }
        // A comment starting before this node's end cannot trail any node closed from here on.
        while let Some(comment) = self.comments.get(self.trailing_cursor) {
            if comment.span.start >= node.span.end {
                node.trailing_comments.push(comment.clone());
            }
            self.trailing_cursor += 1;
        }
    }

    fn on_error(&mut self, error: &ParseError, fatal: bool) {
        if !fatal {
            self.diagnostics.push(error.clone());
            return;
        }
        if self.needs_reset {
            self.reset();
            self.needs_reset = false;
        }
        if self.failure.is_none() {
            self.failure = Some(error.clone());
        } else {
            self.diagnostics.push(error.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsast_syntax::ParseMode;
    use jsast_syntax::ast::CommentKind;

    fn run<'s>(source: &'s str, lines: &'s LineIndex, mode: ParseMode) -> (Result<Node, ParseError>, ParseContext<'s>) {
        let mut ctx = ParseContext::new(source, lines, "test.js", &ParseOptions::default());
        let result = jsast_syntax::parse_with_lines(source, lines, mode, &mut ctx);
        (result, ctx)
    }

    #[test]
    fn test_tokens_are_classified_and_indexed() {
        let source = "var re = /ab+c/gi; x = null;";
        let lines = LineIndex::new(source);
        let (result, ctx) = run(source, &lines, ParseMode::Strict);
        assert!(result.is_ok());
        let types: Vec<_> = ctx.tokens().iter().map(|t| t.token_type).collect();
        assert_eq!(
            types,
            vec![
                TokenType::Keyword,
                TokenType::Identifier,
                TokenType::Punctuator,
                TokenType::RegularExpression,
                TokenType::Punctuator,
                TokenType::Identifier,
                TokenType::Punctuator,
                TokenType::Null,
                TokenType::Punctuator,
            ]
        );
        assert_eq!(ctx.tokens()[3].value, "/ab+c/gi");
        assert!(ctx.tokens().iter().enumerate().all(|(i, t)| t.index == i));
    }

    #[test]
    fn test_leading_comment_attached_to_next_node() {
        let source = "/* doc */\nfunction f() {}";
        let lines = LineIndex::new(source);
        let (result, _) = run(source, &lines, ParseMode::Strict);
        let program = result.unwrap();
        let function = &program.statements().unwrap()[0];
        assert_eq!(function.leading_comments.len(), 1);
        assert_eq!(function.leading_comments[0].text, " doc ");
        assert_eq!(function.leading_comments[0].kind, CommentKind::Block);
    }

    #[test]
    fn test_trailing_comment_attached_to_statement() {
        let source = "a(); // after\nb();";
        let lines = LineIndex::new(source);
        let (result, _) = run(source, &lines, ParseMode::Strict);
        let program = result.unwrap();
        let first = &program.statements().unwrap()[0];
        assert_eq!(first.trailing_comments.len(), 1);
        assert_eq!(first.trailing_comments[0].text, " after");
    }

    #[test]
    fn test_comment_between_statements_trails_and_leads() {
        let source = "a(); /* c */ b();";
        let lines = LineIndex::new(source);
        let (result, ctx) = run(source, &lines, ParseMode::Strict);
        let program = result.unwrap();
        let statements = program.statements().unwrap();
        // One cursor each: the comment trails `a();` and leads `b();`, once per side.
        assert_eq!(statements[0].trailing_comments.len(), 1);
        assert_eq!(statements[1].leading_comments.len(), 1);
        assert_eq!(statements[0].trailing_comments[0], statements[1].leading_comments[0]);
        assert_eq!(ctx.comments().len(), 1);
    }

    #[test]
    fn test_inner_comment_does_not_block_later_trailing_comments() {
        let source = "f(/* in */); g(); // tail\nh();";
        let lines = LineIndex::new(source);
        let (result, _) = run(source, &lines, ParseMode::Strict);
        let program = result.unwrap();
        let second = &program.statements().unwrap()[1];
        assert_eq!(second.trailing_comments.len(), 1);
        assert_eq!(second.trailing_comments[0].text, " tail");
    }

    #[test]
    fn test_comment_locations_carry_source_file() {
        let source = "x;\n// note";
        let lines = LineIndex::new(source);
        let (_, ctx) = run(source, &lines, ParseMode::Strict);
        let location = ctx.comments()[0].location.as_ref().unwrap();
        assert_eq!(location.start.line, 2);
        assert_eq!(location.start.column, 0);
        assert_eq!(location.source_file.as_deref(), Some("test.js"));
    }

    #[test]
    fn test_comment_columns_count_characters() {
        let source = "var é = 'ü'; /* x */";
        let lines = LineIndex::new(source);
        let (_, ctx) = run(source, &lines, ParseMode::Strict);
        let location = ctx.comments()[0].location.as_ref().unwrap();
        assert_eq!(location.start.column, 13);
        assert_eq!(location.end.column, 20);
    }

    #[test]
    fn test_first_fatal_error_resets_once() {
        let source = "// c\nvar = 1;";
        let lines = LineIndex::new(source);
        let mut ctx = ParseContext::new(source, &lines, "test.js", &ParseOptions::default());
        assert!(jsast_syntax::parse_with_lines(source, &lines, ParseMode::Strict, &mut ctx).is_err());
        assert!(ctx.tokens().is_empty());
        assert!(ctx.comments().is_empty());

        let program = jsast_syntax::parse_with_lines(source, &lines, ParseMode::Loose, &mut ctx).unwrap();
        assert_eq!(ctx.comments().len(), 1);
        assert_eq!(ctx.tokens()[0].value, "var");
        let tree = ctx.into_tree(program);
        assert_eq!(tree.errors.len(), 1);
        assert_eq!(tree.errors[0].index, 9);
        assert_eq!(tree.errors[0].source_file.as_deref(), Some("test.js"));
    }

    #[test]
    fn test_lexical_errors_deduplicated_across_passes() {
        let source = "x = 'abc";
        let lines = LineIndex::new(source);
        let mut ctx = ParseContext::new(source, &lines, "test.js", &ParseOptions::default());
        assert!(jsast_syntax::parse_with_lines(source, &lines, ParseMode::Strict, &mut ctx).is_err());
        let program = jsast_syntax::parse_with_lines(source, &lines, ParseMode::Loose, &mut ctx).unwrap();
        let tree = ctx.into_tree(program);
        assert_eq!(tree.errors.len(), 1);
        assert_eq!(tree.errors[0].message, "Unterminated string constant");
    }
}
