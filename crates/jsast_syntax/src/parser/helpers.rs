/// Token-stream helpers and error recovery.
///
/// This chunk contains the low-level primitives used throughout parsing:
/// - Consuming tokens (`bump`) and forwarding comments/lexer diagnostics to the listener
/// - Matching / expecting punctuators and keywords, automatic semicolon insertion
/// - Opening and closing nodes (`start_node`, `start_node_at`, `finish_node`)
/// - Error reporting, which aborts in strict mode and is silent in loose mode (`fail`)
impl<'a, 'l> Parser<'a, 'l> {
    // ========================================================================
    // Token stream
    // ========================================================================

    /// Scan the next token into `self.token` and return the previous one.
    fn advance_lexer(&mut self) -> PResult<Token> {
        let next = self.lexer.next_token();
        let previous = std::mem::replace(&mut self.token, next);
        for comment in self.lexer.take_comments() {
            self.listener.on_comment(&comment);
        }
        for diagnostic in self.lexer.take_diagnostics() {
            let error = diagnostic.error.locate(self.lines);
            if diagnostic.fatal && self.mode == ParseMode::Strict {
                self.listener.on_error(&error, true);
                return Err(error);
            }
            self.listener.on_error(&error, false);
        }
        Ok(previous)
    }

    /// Consume the current token and return it. At end of input this is a no-op.
    fn bump(&mut self) -> PResult<Token> {
        if self.token.is_eof() {
            return Ok(self.token.clone());
        }
        self.listener.on_token(&self.token);
        self.prev_end = self.token.span.end;
        self.consumed += 1;
        self.advance_lexer()
    }

    fn at_end(&self) -> bool {
        self.token.is_eof()
    }

    fn at(&self, punct: Punct) -> bool {
        self.token.is_punct(punct)
    }

    fn at_keyword(&self, keyword: Keyword) -> bool {
        self.token.is_keyword(keyword)
    }

    fn at_name(&self) -> bool {
        matches!(self.token.kind, TokenKind::Name(_))
    }

    fn keyword(&self) -> Option<Keyword> {
        match self.token.kind {
            TokenKind::Keyword(k) => Some(k),
            _ => None,
        }
    }

    fn eat(&mut self, punct: Punct) -> PResult<bool> {
        if self.at(punct) {
            self.bump()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn eat_keyword(&mut self, keyword: Keyword) -> PResult<bool> {
        if self.at_keyword(keyword) {
            self.bump()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consume `punct` or report an error. In loose mode a missing token is simply assumed.
    fn expect(&mut self, punct: Punct) -> PResult<()> {
        if self.eat(punct)? { Ok(()) } else { self.unexpected() }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> PResult<()> {
        if self.eat_keyword(keyword)? {
            Ok(())
        } else {
            self.unexpected()
        }
    }

    fn can_insert_semicolon(&self) -> bool {
        self.at_end() || self.at(Punct::RBrace) || self.token.newline_before
    }

    fn semicolon(&mut self) -> PResult<()> {
        if self.eat(Punct::Semi)? || self.can_insert_semicolon() {
            Ok(())
        } else {
            self.unexpected()
        }
    }

    /// True if the current `let` starts a declaration rather than naming a variable.
    fn at_let_declaration(&self) -> bool {
        if !self.token.is_name("let") {
            return false;
        }
        self.source
            .get(self.token.span.end..)
            .and_then(|rest| rest.trim_start().chars().next())
            .is_some_and(|c| c == '[' || c == '{' || is_id_start(c))
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    /// Open a node at the current token, letting the listener hand out leading comments.
    fn start_node(&mut self) -> Marker {
        let start = self.token.span.start;
        let mut leading = Vec::new();
        self.listener.on_node_start(start, &mut leading);
        Marker { start, leading }
    }

    /// Open a node whose start is inherited from an earlier child. No listener call.
    fn start_node_at(&self, start: usize) -> Marker {
        Marker {
            start,
            leading: Vec::new(),
        }
    }

    fn finish_node(&mut self, marker: Marker, kind: NodeKind) -> Node {
        let end = self.prev_end;
        self.finish_node_at(marker, kind, end)
    }

    fn finish_node_at(&mut self, marker: Marker, kind: NodeKind, end: usize) -> Node {
        let mut node = Node::new(kind, Span::new(marker.start, end.max(marker.start)));
        node.leading_comments = marker.leading;
        self.listener.on_node_finish(&mut node);
        node
    }

    /// Placeholder identifier for syntax the loose parser had to invent.
    fn dummy_ident(&self) -> Node {
        Node::new(
            NodeKind::Identifier {
                name: DUMMY_NAME.to_string(),
            },
            Span::new(self.prev_end, self.prev_end),
        )
    }

    // ========================================================================
    // Errors
    // ========================================================================

    /// Build a syntax error and report it to the listener as fatal.
    fn raise(&mut self, span: Span, message: impl Into<String>) -> ParseError {
        let kind = if self.lexer.at_end() {
            ParseErrorKind::EndOfInput
        } else {
            ParseErrorKind::Unexpected
        };
        let error = ParseError::new(message, span, kind).locate(self.lines);
        self.listener.on_error(&error, true);
        error
    }

    /// Strict mode: abort with an error. Loose mode: note the recovery and carry on.
    fn fail(&mut self, span: Span, message: impl Into<String>) -> PResult<()> {
        match self.mode {
            ParseMode::Strict => Err(self.raise(span, message)),
            ParseMode::Loose => {
                let message = message.into();
                tracing::trace!(offset = span.start, %message, "loose parser recovered");
                Ok(())
            }
        }
    }

    fn unexpected(&mut self) -> PResult<()> {
        let span = self.token.span;
        let message = if self.at_end() {
            "Unexpected end of input".to_string()
        } else {
            format!("Unexpected {}", self.token.describe())
        };
        self.fail(span, message)
    }

    /// Run `f` one nesting level deeper. Past the limit, strict mode fails and loose mode skips
    /// a token and yields `fallback`.
    fn nested(
        &mut self,
        fallback: fn(&Self) -> Node,
        f: impl FnOnce(&mut Self) -> PResult<Node>,
    ) -> PResult<Node> {
        if self.depth >= MAX_NESTING_DEPTH {
            let span = self.token.span;
            self.fail(span, "Nesting too deep")?;
            self.bump()?;
            return Ok(fallback(self));
        }
        self.depth += 1;
        let result = ensure_sufficient_stack(|| f(self));
        self.depth -= 1;
        result
    }

    /// Charge one nesting level for a node a loop wraps around the previous one (operator and
    /// subscript chains). Past the limit, strict mode fails and loose mode returns `false` so the
    /// loop stops. Callers restore `depth` when the chain ends.
    fn deepen(&mut self) -> PResult<bool> {
        if self.depth >= MAX_NESTING_DEPTH {
            let span = self.token.span;
            self.fail(span, "Nesting too deep")?;
            return Ok(false);
        }
        self.depth += 1;
        Ok(true)
    }
}
