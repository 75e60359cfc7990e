// Parser core types and entrypoint.
//
// This chunk defines the [`Parser`] type and its top-level `parse_program()` entrypoint.
// It also contains a few small internal helper types shared across the other
// parser chunks.
//
// ## Notes
// - This file is `include!`'d into `crate::parser` to keep all parser methods in a
//   single module while avoiding a single “god file”.

/// How the parser reacts to syntax errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Abort on the first error.
    #[default]
    Strict,
    /// Recover from every error and always produce a tree.
    Loose,
}

type PResult<T> = Result<T, ParseError>;

/// Limit on nesting: recursive statements and expressions, plus operator and subscript chains.
/// It bounds the depth of every produced tree.
const MAX_NESTING_DEPTH: usize = 256;

/// An opened node: its start offset and the leading comments handed out by the listener.
struct Marker {
    start: usize,
    leading: Vec<Comment>,
}

/// Parser state.
///
/// ## Notes
/// - The parser keeps exactly one token of lookahead (`token`); `prev_end` is the end of the
///   last consumed token and becomes the end of every node finished after it.
/// - `consumed` counts consumed tokens and is what the loose-mode progress guards compare.
pub struct Parser<'a, 'l> {
    source: &'a str,
    lexer: Lexer<'a>,
    token: Token,
    prev_end: usize,
    consumed: usize,
    depth: usize,
    in_function: bool,
    mode: ParseMode,
    lines: &'a LineIndex,
    listener: &'l mut dyn ParseListener,
}

impl<'a, 'l> Parser<'a, 'l> {
    /// Create a new parser over `source`.
    ///
    /// ## Parameters
    /// - `lines`: line index of `source`, used to locate errors.
    /// - `mode`: strict or loose error handling.
    /// - `listener`: receives tokens, comments, node lifecycle events and errors.
    pub fn new(
        source: &'a str,
        lines: &'a LineIndex,
        mode: ParseMode,
        listener: &'l mut dyn ParseListener,
    ) -> Self {
        Self {
            source,
            lexer: Lexer::new(source),
            token: Token::new(TokenKind::Eof, Span::default(), false),
            prev_end: 0,
            consumed: 0,
            depth: 0,
            in_function: false,
            mode,
            lines,
            listener,
        }
    }

    /// Parse the whole input into a `Program` node.
    ///
    /// ## Errors
    /// In strict mode, returns the first syntax error. Loose mode does not fail.
    pub fn parse_program(mut self) -> PResult<Node> {
        // The program is opened before the first token is scanned, so it never has leading
        // comments.
        let marker = self.start_node();
        self.advance_lexer()?;
        let body = self.parse_statements_until(|_| false)?;
        self.prev_end = self.source.len();
        Ok(self.finish_node(marker, NodeKind::Program { body }))
    }
}
