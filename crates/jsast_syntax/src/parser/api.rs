/// Parse JavaScript source into a `Program` node.
///
/// This is the main public entrypoint for parsing.
///
/// ## Parameters
/// - `source`: the program text.
/// - `mode`: [`ParseMode::Strict`] fails on the first error, [`ParseMode::Loose`] always
///   produces a tree.
/// - `listener`: receives tokens, comments, node lifecycle events and errors while parsing.
///
/// ## Errors
/// Returns the first syntax error in strict mode.
pub fn parse(source: &str, mode: ParseMode, listener: &mut dyn ParseListener) -> Result<Node, ParseError> {
    parse_with_lines(source, &LineIndex::new(source), mode, listener)
}

/// [`parse`] with a line index the caller already built for `source`.
///
/// ## Errors
/// Returns the first syntax error in strict mode.
#[tracing::instrument(skip_all, fields(mode = ?mode, len = source.len()))]
pub fn parse_with_lines(
    source: &str,
    lines: &LineIndex,
    mode: ParseMode,
    listener: &mut dyn ParseListener,
) -> Result<Node, ParseError> {
    Parser::new(source, lines, mode, listener).parse_program()
}
