//! Shared syntax frontend for JavaScript: lexer, parser, AST, diagnostics.
//!
//! This crate is dependency-light and intended for reuse by the AST cache, the lint rules, the
//! command-line tool and the language server.
//!
//! ## Notes
//! - This crate is intentionally “syntax-only”: it does not cache, resolve modules or lint.
//! - Annotation (comment attachment, token capture, dependency extraction) is done by callers
//!   through the [`listener::ParseListener`] hooks.
//!
//! ## Examples
//! ```rust
//! use jsast_syntax::{lexer, parser};
//!
//! let tokens = lexer::lex("a = 1;").tokens;
//! assert_eq!(tokens.len(), 5);
//! let program = parser::parse("a = 1;", parser::ParseMode::Strict, &mut ()).unwrap();
//! assert_eq!(program.statements().map(|s| s.len()), Some(1));
//! ```

pub mod ast;
pub mod diagnostics;
pub mod lexer;
pub mod lines;
pub mod listener;
pub mod parser;
pub mod stack;

pub use parser::{ParseMode, parse, parse_with_lines};
