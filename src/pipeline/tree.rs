//! The annotated tree produced by [`super::AstParser`].

use std::collections::BTreeSet;
use std::fmt;

use jsast_syntax::ast::{Comment, Node, Span};
use jsast_syntax::diagnostics::ParseError;
use jsast_syntax::lexer::{Keyword, TokenKind};
use serde::Serialize;

/// Semantic category of a recorded token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenType {
    Numeric,
    String,
    RegularExpression,
    Identifier,
    Keyword,
    Boolean,
    Null,
    Punctuator,
}

impl TokenType {
    /// Classify a lexer token. Returns `None` for the end-of-input token.
    pub fn classify(kind: &TokenKind) -> Option<TokenType> {
        let ty = match kind {
            TokenKind::Numeric(_) => TokenType::Numeric,
            TokenKind::String(_) => TokenType::String,
            TokenKind::RegExp { .. } => TokenType::RegularExpression,
            TokenKind::Name(_) => TokenType::Identifier,
            TokenKind::Keyword(Keyword::Null) => TokenType::Null,
            TokenKind::Keyword(Keyword::True | Keyword::False) => TokenType::Boolean,
            TokenKind::Keyword(_) => TokenType::Keyword,
            TokenKind::Punct(_) | TokenKind::Template { .. } => TokenType::Punctuator,
            TokenKind::Eof => return None,
        };
        Some(ty)
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A token as recorded on the tree.
///
/// `value` is the source text of the token, except for regular expressions which are
/// re-serialized as `/pattern/flags`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub value: String,
    pub range: Span,
    pub index: usize,
}

/// Runtime environment hinted at by module-loading calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Node,
    Amd,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Node => "node",
            Environment::Amd => "amd",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed program together with everything recorded while parsing it.
///
/// Trees are immutable once built; the manager shares them as `Arc<SyntaxTree>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntaxTree {
    #[serde(flatten)]
    pub program: Node,
    pub comments: Vec<Comment>,
    pub tokens: Vec<Token>,
    /// Module references in first-seen order, without duplicates.
    pub dependencies: Vec<String>,
    pub environments: BTreeSet<Environment>,
    pub errors: Vec<ParseError>,
    pub source_file: String,
}

impl SyntaxTree {
    /// Top-level statements.
    pub fn body(&self) -> &[Node] {
        self.program.statements().unwrap_or(&[])
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_environment(&self, env: Environment) -> bool {
        self.environments.contains(&env)
    }
}
