//! Parser for JavaScript
//!
//! Converts source text into an ESTree-shaped [`Node`] tree. The parser pulls tokens from the
//! [`Lexer`] on demand and reports its progress through a [`ParseListener`].
//!
//! Two modes share one grammar:
//! - [`ParseMode::Strict`] stops at the first syntax error.
//! - [`ParseMode::Loose`] never stops: missing syntax is replaced by placeholder identifiers
//!   named [`DUMMY_NAME`], unexpected tokens are skipped, and a best-effort tree is always
//!   produced.
//!
//! ## Examples
//!
//! ```rust
//! use jsast_syntax::parser::{self, ParseMode};
//!
//! let program = parser::parse("var a = 1;", ParseMode::Strict, &mut ()).unwrap();
//! assert_eq!(program.statements().map(|s| s.len()), Some(1));
//! ```

use crate::ast::*;
use crate::diagnostics::{ParseError, ParseErrorKind};
use crate::lexer::{Keyword, Lexer, Punct, Token, TokenKind, is_id_start};
use crate::lines::LineIndex;
use crate::listener::ParseListener;
use crate::stack::ensure_sufficient_stack;

// NOTE: This module is split across multiple files using `include!` to keep all parser
// methods in the same Rust module (preserving privacy + call patterns) while avoiding
// a single large source file.

include!("parser/core.rs");
include!("parser/helpers.rs");
include!("parser/stmts.rs");
include!("parser/expr.rs");
include!("parser/patterns.rs");
include!("parser/api.rs");
include!("parser/tests.rs");
