//! Lexer for JavaScript
//!
//! Handles tokenization including:
//! - Reserved words, identifiers and punctuators
//! - Numeric, string, template and regular-expression literals
//! - Line and block comments, which are collected on the side for the parser to forward
//!
//! The lexer never stops on bad input. Each problem is queued as a [`LexDiagnostic`] and scanning
//! continues with a best-effort token, leaving it to the parser to decide whether the problem is
//! fatal in its current mode.
//!
//! ## Module Structure
//!
//! - `tokens` - Token types (TokenKind, Token, Keyword, Punct)

pub mod tokens;

pub use tokens::{Keyword, Punct, Token, TokenKind};

use crate::ast::{Comment, CommentKind, Span};
use crate::diagnostics::{ParseError, ParseErrorKind};
use tokens::PUNCTUATORS;

/// A problem found while scanning.
///
/// Non-fatal diagnostics (currently only the unterminated block comment) are reported but never
/// abort a strict parse: editor tooling has to keep working while a comment is being typed.
#[derive(Debug, Clone, PartialEq)]
pub struct LexDiagnostic {
    pub error: ParseError,
    pub fatal: bool,
}

/// Output of [`lex`].
#[derive(Debug, Clone, Default)]
pub struct Lexed {
    /// Tokens in source order. The stream always ends with an `Eof` token.
    pub tokens: Vec<Token>,
    pub comments: Vec<Comment>,
    pub diagnostics: Vec<LexDiagnostic>,
}

/// Tokenize a whole source string in one go.
pub fn lex(source: &str) -> Lexed {
    Lexer::new(source).tokenize()
}

// ============================================================================
// Character classes
// ============================================================================

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn is_js_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | '\x0B' | '\x0C' | ' ' | '\u{00A0}' | '\u{FEFF}' | '\u{1680}' | '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}'
    )
}

pub(crate) fn is_id_start(c: char) -> bool {
    c == '$' || c == '_' || c.is_alphabetic()
}

pub(crate) fn is_id_continue(c: char) -> bool {
    c == '$' || c == '_' || c == '\u{200C}' || c == '\u{200D}' || c.is_alphanumeric()
}

fn radix_value(digits: &str, radix: u32) -> f64 {
    digits
        .chars()
        .filter_map(|c| c.to_digit(radix))
        .fold(0.0, |acc, d| acc * radix as f64 + d as f64)
}

// ============================================================================
// LEXER STATE
// ============================================================================

/// Pull-based JavaScript lexer.
///
/// `/` is disambiguated between division and a regular expression from the previous significant
/// token: after something that produces a value (name, literal, `)`, `]`, `++`, `--`, `this`...)
/// it is division, everywhere else it starts a regular expression.
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    /// Brace depth recorded at each open `${`; a `}` at that depth resumes the template.
    template_stack: Vec<usize>,
    brace_depth: usize,
    regex_allowed: bool,
    comments: Vec<Comment>,
    diagnostics: Vec<LexDiagnostic>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            template_stack: Vec::new(),
            brace_depth: 0,
            regex_allowed: true,
            comments: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Comments scanned since the last call, in source order.
    pub fn take_comments(&mut self) -> Vec<Comment> {
        std::mem::take(&mut self.comments)
    }

    /// Diagnostics raised since the last call, in source order.
    pub fn take_diagnostics(&mut self) -> Vec<LexDiagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Scan the whole input.
    pub fn tokenize(mut self) -> Lexed {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.is_eof();
            tokens.push(token);
            if done {
                break;
            }
        }
        Lexed {
            tokens,
            comments: self.comments,
            diagnostics: self.diagnostics,
        }
    }

    // ========================================================================
    // Core character handling
    // ========================================================================

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while matches!(self.peek(), Some(c) if pred(c)) {
            self.bump();
        }
    }

    fn report(&mut self, message: impl Into<String>, span: Span, fatal: bool) {
        let kind = if self.at_end() {
            ParseErrorKind::EndOfInput
        } else {
            ParseErrorKind::Unexpected
        };
        self.diagnostics.push(LexDiagnostic {
            error: ParseError::new(message, span, kind),
            fatal,
        });
    }

    // ========================================================================
    // Trivia
    // ========================================================================

    /// Skip whitespace and comments. Returns true if a line terminator was crossed.
    fn skip_trivia(&mut self) -> bool {
        let mut newline = false;
        loop {
            match self.peek() {
                Some(c) if is_line_terminator(c) => {
                    newline = true;
                    self.bump();
                }
                Some(c) if is_js_whitespace(c) => {
                    self.bump();
                }
                Some('/') if self.peek_nth(1) == Some('/') => self.skip_line_comment(),
                Some('/') if self.peek_nth(1) == Some('*') => {
                    if self.skip_block_comment() {
                        newline = true;
                    }
                }
                _ => break,
            }
        }
        newline
    }

    fn skip_line_comment(&mut self) {
        let start = self.pos;
        self.pos += 2;
        self.eat_while(|c| !is_line_terminator(c));
        let text = &self.source[start + 2..self.pos];
        self.comments
            .push(Comment::new(CommentKind::Line, text, Span::new(start, self.pos)));
    }

    /// Returns true if the comment spans a line break.
    fn skip_block_comment(&mut self) -> bool {
        let start = self.pos;
        let body_start = start + 2;
        match self.source[body_start..].find("*/") {
            Some(len) => {
                let text = &self.source[body_start..body_start + len];
                self.pos = body_start + len + 2;
                self.comments
                    .push(Comment::new(CommentKind::Block, text, Span::new(start, self.pos)));
                text.contains(is_line_terminator)
            }
            None => {
                // Keep the comment, spanning to the end of input, instead of failing the parse.
                let text = &self.source[body_start..];
                self.pos = self.source.len();
                self.comments
                    .push(Comment::new(CommentKind::Block, text, Span::new(start, self.pos)));
                self.report("Unterminated comment", Span::new(start, self.pos), false);
                text.contains(is_line_terminator)
            }
        }
    }

    // ========================================================================
    // Main scanning dispatch
    // ========================================================================

    /// Scan the next significant token. Returns an `Eof` token once input is exhausted.
    pub fn next_token(&mut self) -> Token {
        let mut newline_before = self.skip_trivia();
        loop {
            let start = self.pos;
            let Some(c) = self.peek() else {
                let end = self.source.len();
                return Token::new(TokenKind::Eof, Span::new(end, end), newline_before);
            };
            match self.scan(c, start) {
                Some(kind) => {
                    self.regex_allowed = regex_allowed_after(&kind);
                    return Token::new(kind, Span::new(start, self.pos), newline_before);
                }
                None => {
                    newline_before |= self.skip_trivia();
                }
            }
        }
    }

    fn scan(&mut self, c: char, start: usize) -> Option<TokenKind> {
        match c {
            '`' => {
                self.bump();
                Some(self.scan_template(true))
            }
            '}' if self.template_stack.last() == Some(&self.brace_depth) => {
                self.template_stack.pop();
                self.bump();
                Some(self.scan_template(false))
            }
            '"' | '\'' => Some(self.scan_string(c, start)),
            '0'..='9' => Some(self.scan_number(start)),
            '.' if matches!(self.peek_nth(1), Some('0'..='9')) => Some(self.scan_number(start)),
            '/' if self.regex_allowed => Some(self.scan_regex(start)),
            c if is_id_start(c) => {
                self.eat_while(is_id_continue);
                let word = &self.source[start..self.pos];
                Some(match Keyword::lookup(word) {
                    Some(k) => TokenKind::Keyword(k),
                    None => TokenKind::Name(word.to_string()),
                })
            }
            _ => {
                let rest = self.rest();
                if let Some((text, punct)) = PUNCTUATORS.iter().find(|(text, _)| rest.starts_with(*text)) {
                    self.pos += text.len();
                    match punct {
                        Punct::LBrace => self.brace_depth += 1,
                        Punct::RBrace => self.brace_depth = self.brace_depth.saturating_sub(1),
                        _ => {}
                    }
                    return Some(TokenKind::Punct(*punct));
                }
                self.bump();
                self.report(
                    format!("Unexpected character '{c}'"),
                    Span::new(start, self.pos),
                    true,
                );
                None
            }
        }
    }

    // ========================================================================
    // Literals
    // ========================================================================

    /// Scan a template chunk after the opening backquote or the `}` closing a substitution.
    fn scan_template(&mut self, head: bool) -> TokenKind {
        let body_start = self.pos;
        loop {
            match self.peek() {
                None => {
                    let raw = self.source[body_start..].to_string();
                    self.report("Unterminated template", Span::new(body_start, self.pos), true);
                    return TokenKind::Template { raw, head, tail: true };
                }
                Some('`') => {
                    let raw = self.source[body_start..self.pos].to_string();
                    self.bump();
                    return TokenKind::Template { raw, head, tail: true };
                }
                Some('$') if self.peek_nth(1) == Some('{') => {
                    let raw = self.source[body_start..self.pos].to_string();
                    self.pos += 2;
                    self.template_stack.push(self.brace_depth);
                    return TokenKind::Template { raw, head, tail: false };
                }
                Some('\\') => {
                    self.bump();
                    self.bump();
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    fn scan_string(&mut self, quote: char, start: usize) -> TokenKind {
        self.bump();
        let mut value = String::new();
        loop {
            match self.peek() {
                None | Some('\n') | Some('\r') => {
                    self.report("Unterminated string constant", Span::new(start, self.pos), true);
                    break;
                }
                Some(c) if c == quote => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    self.bump();
                    self.read_escape(&mut value);
                }
                Some(c) => {
                    value.push(c);
                    self.bump();
                }
            }
        }
        TokenKind::String(value)
    }

    fn read_hex(&mut self, len: usize) -> Option<u32> {
        let digits = self.rest().get(..len)?;
        if digits.len() != len || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(digits, 16).ok()?;
        self.pos += len;
        Some(value)
    }

    fn read_escape(&mut self, out: &mut String) {
        let escape_start = self.pos - 1;
        let Some(c) = self.bump() else {
            return;
        };
        let code = match c {
            'n' => Some('\n' as u32),
            't' => Some('\t' as u32),
            'r' => Some('\r' as u32),
            'b' => Some(0x08),
            'f' => Some(0x0C),
            'v' => Some(0x0B),
            '0' if !matches!(self.peek(), Some('0'..='9')) => Some(0),
            'x' => self.read_hex(2),
            'u' => {
                if self.peek() == Some('{') {
                    self.bump();
                    let digits_start = self.pos;
                    self.eat_while(|c| c.is_ascii_hexdigit());
                    let value = u32::from_str_radix(&self.source[digits_start..self.pos], 16).ok();
                    if self.peek() == Some('}') {
                        self.bump();
                        value
                    } else {
                        None
                    }
                } else {
                    self.read_hex(4)
                }
            }
            '\r' => {
                if self.peek() == Some('\n') {
                    self.bump();
                }
                return;
            }
            '\n' | '\u{2028}' | '\u{2029}' => return,
            other => {
                out.push(other);
                return;
            }
        };
        match code.and_then(char::from_u32) {
            Some(ch) => out.push(ch),
            None => self.report(
                "Bad character escape sequence",
                Span::new(escape_start, self.pos),
                true,
            ),
        }
    }

    fn scan_number(&mut self, start: usize) -> TokenKind {
        let first = self.bump().unwrap_or('0');
        let radix = match (first, self.peek()) {
            ('0', Some('x' | 'X')) => Some(16),
            ('0', Some('o' | 'O')) => Some(8),
            ('0', Some('b' | 'B')) => Some(2),
            _ => None,
        };

        let value = if let Some(radix) = radix {
            self.bump();
            let digits_start = self.pos;
            self.eat_while(|c| c.is_digit(radix));
            if self.pos == digits_start {
                self.report(
                    format!("Expected number in radix {radix}"),
                    Span::new(start, self.pos),
                    true,
                );
            }
            radix_value(&self.source[digits_start..self.pos], radix)
        } else if first == '0' && matches!(self.peek(), Some('0'..='9')) {
            // Legacy octal (`017`), or decimal if any digit is 8/9.
            self.eat_while(|c| c.is_ascii_digit());
            let digits = &self.source[start + 1..self.pos];
            if digits.chars().all(|c| c.is_digit(8)) {
                radix_value(digits, 8)
            } else {
                digits.parse().unwrap_or(f64::NAN)
            }
        } else {
            if first != '.' {
                self.eat_while(|c| c.is_ascii_digit());
                if self.peek() == Some('.') {
                    self.bump();
                }
            }
            self.eat_while(|c| c.is_ascii_digit());
            if matches!(self.peek(), Some('e' | 'E')) {
                let exp_ok = match self.peek_nth(1) {
                    Some('0'..='9') => true,
                    Some('+' | '-') => matches!(self.peek_nth(2), Some('0'..='9')),
                    _ => false,
                };
                if exp_ok {
                    self.bump();
                    if matches!(self.peek(), Some('+' | '-')) {
                        self.bump();
                    }
                    self.eat_while(|c| c.is_ascii_digit());
                } else {
                    self.bump();
                    self.report("Invalid number", Span::new(start, self.pos), true);
                }
            }
            self.source[start..self.pos].parse().unwrap_or(f64::NAN)
        };

        if matches!(self.peek(), Some(c) if is_id_start(c)) {
            self.report(
                "Identifier directly after number",
                Span::new(start, self.pos),
                true,
            );
        }
        TokenKind::Numeric(value)
    }

    fn scan_regex(&mut self, start: usize) -> TokenKind {
        self.bump();
        let mut in_class = false;
        loop {
            match self.peek() {
                None => break,
                Some(c) if is_line_terminator(c) => break,
                Some('[') => in_class = true,
                Some(']') => in_class = false,
                Some('/') if !in_class => {
                    let pattern = self.source[start + 1..self.pos].to_string();
                    self.bump();
                    let flags_start = self.pos;
                    self.eat_while(is_id_continue);
                    let flags = self.source[flags_start..self.pos].to_string();
                    return TokenKind::RegExp { pattern, flags };
                }
                Some('\\') => {
                    self.bump();
                    if matches!(self.peek(), Some(c) if is_line_terminator(c)) {
                        break;
                    }
                }
                Some(_) => {}
            }
            self.bump();
        }
        self.report(
            "Unterminated regular expression",
            Span::new(start, self.pos),
            true,
        );
        TokenKind::RegExp {
            pattern: self.source[start + 1..self.pos].to_string(),
            flags: String::new(),
        }
    }
}

/// Whether a `/` following a token of this kind starts a regular expression.
fn regex_allowed_after(kind: &TokenKind) -> bool {
    match kind {
        TokenKind::Name(_) | TokenKind::Numeric(_) | TokenKind::String(_) | TokenKind::RegExp { .. } => false,
        TokenKind::Template { tail, .. } => !tail,
        TokenKind::Keyword(k) => !matches!(
            k,
            Keyword::This | Keyword::Super | Keyword::True | Keyword::False | Keyword::Null
        ),
        TokenKind::Punct(p) => !matches!(
            p,
            Punct::RParen | Punct::RBracket | Punct::PlusPlus | Punct::MinusMinus
        ),
        TokenKind::Eof => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_var_declaration_tokens() {
        assert_eq!(
            kinds("var x = 42;"),
            vec![
                TokenKind::Keyword(Keyword::Var),
                TokenKind::Name("x".to_string()),
                TokenKind::Punct(Punct::Eq),
                TokenKind::Numeric(42.0),
                TokenKind::Punct(Punct::Semi),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_longest_punctuator_wins() {
        assert_eq!(
            kinds("a >>>= b"),
            vec![
                TokenKind::Name("a".to_string()),
                TokenKind::Punct(Punct::UShrEq),
                TokenKind::Name("b".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numeric_forms() {
        assert_eq!(kinds("0x1F")[0], TokenKind::Numeric(31.0));
        assert_eq!(kinds("0b101")[0], TokenKind::Numeric(5.0));
        assert_eq!(kinds("0o17")[0], TokenKind::Numeric(15.0));
        assert_eq!(kinds("017")[0], TokenKind::Numeric(15.0));
        assert_eq!(kinds(".5")[0], TokenKind::Numeric(0.5));
        assert_eq!(kinds("1e3")[0], TokenKind::Numeric(1000.0));
    }

    #[test]
    fn test_string_escapes_are_cooked() {
        assert_eq!(kinds(r#"'a\nb\x41B'"#)[0], TokenKind::String("a\nbAB".to_string()));
    }

    #[test]
    fn test_unterminated_string_is_fatal_diagnostic() {
        let lexed = lex("'abc\nx");
        assert_eq!(lexed.diagnostics.len(), 1);
        assert!(lexed.diagnostics[0].fatal);
        assert_eq!(lexed.tokens[0].kind, TokenKind::String("abc".to_string()));
        assert!(lexed.tokens[1].newline_before);
    }

    #[test]
    fn test_regex_after_assignment() {
        assert_eq!(
            kinds("x = /a[/]b/gi")[2],
            TokenKind::RegExp {
                pattern: "a[/]b".to_string(),
                flags: "gi".to_string()
            }
        );
    }

    #[test]
    fn test_division_after_identifier_and_paren() {
        assert_eq!(kinds("a / b")[1], TokenKind::Punct(Punct::Slash));
        assert_eq!(kinds("(a) / b")[3], TokenKind::Punct(Punct::Slash));
    }

    #[test]
    fn test_template_with_nested_braces() {
        let toks = kinds("`a${ {b: 1}.b }c`");
        assert_eq!(
            toks[0],
            TokenKind::Template {
                raw: "a".to_string(),
                head: true,
                tail: false
            }
        );
        assert_eq!(
            toks[toks.len() - 2],
            TokenKind::Template {
                raw: "c".to_string(),
                head: false,
                tail: true
            }
        );
    }

    #[test]
    fn test_comments_are_collected_not_tokenized() {
        let lexed = lex("// one\na /* two */ b");
        assert_eq!(lexed.tokens.len(), 3);
        assert_eq!(lexed.comments.len(), 2);
        assert_eq!(lexed.comments[0].kind, CommentKind::Line);
        assert_eq!(lexed.comments[0].text, " one");
        assert_eq!(lexed.comments[1].span, Span::new(9, 18));
        assert!(lexed.tokens[0].newline_before);
    }

    #[test]
    fn test_unterminated_block_comment_spans_to_end() {
        let source = "x; /* abc";
        let lexed = lex(source);
        assert_eq!(lexed.comments.len(), 1);
        assert_eq!(lexed.comments[0].span, Span::new(3, source.len()));
        assert_eq!(lexed.comments[0].text, " abc");
        assert_eq!(lexed.diagnostics.len(), 1);
        assert!(!lexed.diagnostics[0].fatal);
        assert_eq!(lexed.diagnostics[0].error.kind, ParseErrorKind::EndOfInput);
    }

    #[test]
    fn test_invalid_character_is_skipped() {
        let lexed = lex("a # b");
        assert_eq!(lexed.tokens.len(), 3);
        assert!(lexed.diagnostics[0].error.message.contains('#'));
    }
}
