/// Expression parsing.
///
/// Precedence climbing for binary operators, prefix/postfix unary operators, member/call
/// subscripts, and the atoms (literals, identifiers, arrays, objects, functions, classes,
/// templates, parenthesized expressions and arrow functions).
///
/// ## Notes
/// - Arrow functions are recognized after the fact: an identifier or a parenthesized list
///   followed by `=>` is reinterpreted as a parameter list via `to_pattern`.
/// - `no_in` suppresses `in` as a binary operator inside `for (...)` heads.
impl<'a, 'l> Parser<'a, 'l> {
    // ========================================================================
    // Comma / assignment / conditional
    // ========================================================================

    fn parse_expression(&mut self, no_in: bool) -> PResult<Node> {
        let start = self.token.span.start;
        let first = self.parse_maybe_assign(no_in)?;
        if !self.at(Punct::Comma) {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.eat(Punct::Comma)? {
            expressions.push(self.parse_maybe_assign(no_in)?);
        }
        Ok(self.finish_node(self.start_node_at(start), NodeKind::SequenceExpression { expressions }))
    }

    fn parse_maybe_assign(&mut self, no_in: bool) -> PResult<Node> {
        let start = self.token.span.start;
        let left = self.parse_maybe_conditional(no_in)?;
        let TokenKind::Punct(op) = self.token.kind else {
            return Ok(left);
        };
        if !op.is_assign() {
            return Ok(left);
        }
        let left = if op == Punct::Eq {
            self.to_pattern(left)?
        } else {
            self.check_simple_target(&left)?;
            left
        };
        self.bump()?;
        let right = self.nested(Self::dummy_ident, |p| p.parse_maybe_assign(no_in))?;
        Ok(self.finish_node(
            self.start_node_at(start),
            NodeKind::AssignmentExpression {
                operator: op.as_str().to_string(),
                left: Box::new(left),
                right: Box::new(right),
            },
        ))
    }

    fn parse_maybe_conditional(&mut self, no_in: bool) -> PResult<Node> {
        let start = self.token.span.start;
        let test = self.parse_expr_ops(no_in)?;
        if !self.eat(Punct::Question)? {
            return Ok(test);
        }
        let consequent = self.nested(Self::dummy_ident, |p| p.parse_maybe_assign(false))?;
        self.expect(Punct::Colon)?;
        let alternate = self.nested(Self::dummy_ident, |p| p.parse_maybe_assign(no_in))?;
        Ok(self.finish_node(
            self.start_node_at(start),
            NodeKind::ConditionalExpression {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
        ))
    }

    // ========================================================================
    // Binary operators
    // ========================================================================

    fn parse_expr_ops(&mut self, no_in: bool) -> PResult<Node> {
        let start = self.token.span.start;
        let left = self.parse_maybe_unary()?;
        self.parse_expr_op(left, start, 0, no_in)
    }

    /// Binding power, spelling and logical-ness of the current token as a binary operator.
    fn binary_operator(&self, no_in: bool) -> Option<(u8, &'static str, bool)> {
        let prec = match self.token.kind {
            TokenKind::Punct(p) => match p {
                Punct::PipePipe => 1,
                Punct::AmpAmp => 2,
                Punct::Pipe => 3,
                Punct::Caret => 4,
                Punct::Amp => 5,
                Punct::EqEq | Punct::NotEq | Punct::EqEqEq | Punct::NotEqEq => 6,
                Punct::Lt | Punct::Gt | Punct::LtEq | Punct::GtEq => 7,
                Punct::Shl | Punct::Shr | Punct::UShr => 8,
                Punct::Plus | Punct::Minus => 9,
                Punct::Star | Punct::Slash | Punct::Percent => 10,
                Punct::StarStar => 11,
                _ => return None,
            },
            TokenKind::Keyword(Keyword::Instanceof) => 7,
            TokenKind::Keyword(Keyword::In) if !no_in => 7,
            _ => return None,
        };
        let op = match self.token.kind {
            TokenKind::Punct(p) => p.as_str(),
            TokenKind::Keyword(k) => k.as_str(),
            _ => return None,
        };
        Some((prec, op, prec <= 2))
    }

    fn parse_expr_op(&mut self, left: Node, left_start: usize, min_prec: u8, no_in: bool) -> PResult<Node> {
        let depth = self.depth;
        let result = self.parse_expr_op_chain(left, left_start, min_prec, no_in);
        self.depth = depth;
        result
    }

    /// Fold operators binding tighter than `min_prec` onto `left`, left to right.
    fn parse_expr_op_chain(&mut self, mut left: Node, left_start: usize, min_prec: u8, no_in: bool) -> PResult<Node> {
        loop {
            let Some((prec, op, logical)) = self.binary_operator(no_in) else {
                return Ok(left);
            };
            if prec <= min_prec || !self.deepen()? {
                return Ok(left);
            }
            self.bump()?;
            let right_start = self.token.span.start;
            let right = self.parse_maybe_unary()?;
            // `**` is right-associative.
            let next_min = if op == "**" { prec - 1 } else { prec };
            let right = ensure_sufficient_stack(|| self.parse_expr_op(right, right_start, next_min, no_in))?;
            let (operator, left_box, right) = (op.to_string(), Box::new(left), Box::new(right));
            let kind = if logical {
                NodeKind::LogicalExpression {
                    operator,
                    left: left_box,
                    right,
                }
            } else {
                NodeKind::BinaryExpression {
                    operator,
                    left: left_box,
                    right,
                }
            };
            left = self.finish_node(self.start_node_at(left_start), kind);
        }
    }

    // ========================================================================
    // Unary operators
    // ========================================================================

    fn prefix_operator(&self) -> Option<&'static str> {
        match self.token.kind {
            TokenKind::Punct(
                p @ (Punct::Bang | Punct::Tilde | Punct::Plus | Punct::Minus | Punct::PlusPlus | Punct::MinusMinus),
            ) => Some(p.as_str()),
            TokenKind::Keyword(k @ (Keyword::Typeof | Keyword::Void | Keyword::Delete)) => Some(k.as_str()),
            _ => None,
        }
    }

    fn parse_maybe_unary(&mut self) -> PResult<Node> {
        self.nested(Self::dummy_ident, |p| p.parse_maybe_unary_inner())
    }

    fn parse_maybe_unary_inner(&mut self) -> PResult<Node> {
        if let Some(operator) = self.prefix_operator() {
            let marker = self.start_node();
            self.bump()?;
            let argument = self.parse_maybe_unary()?;
            let update = matches!(operator, "++" | "--");
            if update {
                self.check_simple_target(&argument)?;
            }
            let (operator, argument) = (operator.to_string(), Box::new(argument));
            let kind = if update {
                NodeKind::UpdateExpression {
                    operator,
                    argument,
                    prefix: true,
                }
            } else {
                NodeKind::UnaryExpression {
                    operator,
                    argument,
                    prefix: true,
                }
            };
            return Ok(self.finish_node(marker, kind));
        }

        let start = self.token.span.start;
        let mut expr = self.parse_expr_subscripts()?;
        while (self.at(Punct::PlusPlus) || self.at(Punct::MinusMinus)) && !self.token.newline_before {
            self.check_simple_target(&expr)?;
            let operator = if self.at(Punct::PlusPlus) { "++" } else { "--" };
            self.bump()?;
            expr = self.finish_node(
                self.start_node_at(start),
                NodeKind::UpdateExpression {
                    operator: operator.to_string(),
                    argument: Box::new(expr),
                    prefix: false,
                },
            );
        }
        Ok(expr)
    }

    // ========================================================================
    // Subscripts
    // ========================================================================

    fn parse_expr_subscripts(&mut self) -> PResult<Node> {
        let start = self.token.span.start;
        let base = self.parse_expr_atom()?;
        self.parse_subscripts(base, start, false)
    }

    /// Member accesses, calls and tagged templates following `base`. `no_calls` stops at `(`,
    /// which belongs to an enclosing `new`.
    fn parse_subscripts(&mut self, base: Node, start: usize, no_calls: bool) -> PResult<Node> {
        let depth = self.depth;
        let result = self.parse_subscript_chain(base, start, no_calls);
        self.depth = depth;
        result
    }

    fn parse_subscript_chain(&mut self, mut base: Node, start: usize, no_calls: bool) -> PResult<Node> {
        loop {
            let continues = self.at(Punct::Dot)
                || self.at(Punct::LBracket)
                || (!no_calls && self.at(Punct::LParen))
                || matches!(self.token.kind, TokenKind::Template { head: true, .. });
            if !continues || !self.deepen()? {
                return Ok(base);
            }
            let kind = if self.eat(Punct::Dot)? {
                let property = self.parse_ident_name()?;
                NodeKind::MemberExpression {
                    object: Box::new(base),
                    property: Box::new(property),
                    computed: false,
                }
            } else if self.eat(Punct::LBracket)? {
                let property = self.parse_expression(false)?;
                self.expect(Punct::RBracket)?;
                NodeKind::MemberExpression {
                    object: Box::new(base),
                    property: Box::new(property),
                    computed: true,
                }
            } else if !no_calls && self.at(Punct::LParen) {
                let arguments = self.parse_call_arguments()?;
                NodeKind::CallExpression {
                    callee: Box::new(base),
                    arguments,
                }
            } else if matches!(self.token.kind, TokenKind::Template { head: true, .. }) {
                let quasi = self.parse_template()?;
                NodeKind::TaggedTemplateExpression {
                    tag: Box::new(base),
                    quasi: Box::new(quasi),
                }
            } else {
                return Ok(base);
            };
            base = self.finish_node(self.start_node_at(start), kind);
        }
    }

    fn parse_call_arguments(&mut self) -> PResult<Vec<Node>> {
        self.expect(Punct::LParen)?;
        let mut arguments = Vec::new();
        while !self.at(Punct::RParen) && !self.at_end() {
            let before = self.consumed;
            arguments.push(self.parse_spread_or_assign()?);
            if self.consumed == before {
                break;
            }
            if !self.at(Punct::RParen) && !self.eat(Punct::Comma)? {
                self.unexpected()?;
                break;
            }
        }
        self.expect(Punct::RParen)?;
        Ok(arguments)
    }

    fn parse_spread_or_assign(&mut self) -> PResult<Node> {
        if !self.at(Punct::Ellipsis) {
            return self.parse_maybe_assign(false);
        }
        let marker = self.start_node();
        self.bump()?;
        let argument = Box::new(self.parse_maybe_assign(false)?);
        Ok(self.finish_node(marker, NodeKind::SpreadElement { argument }))
    }

    // ========================================================================
    // Atoms
    // ========================================================================

    fn parse_expr_atom(&mut self) -> PResult<Node> {
        if let Some(keyword) = self.keyword() {
            return match keyword {
                Keyword::This | Keyword::Super => {
                    let marker = self.start_node();
                    self.bump()?;
                    let kind = if keyword == Keyword::This {
                        NodeKind::ThisExpression
                    } else {
                        NodeKind::Super
                    };
                    Ok(self.finish_node(marker, kind))
                }
                Keyword::True | Keyword::False | Keyword::Null => self.parse_literal(),
                Keyword::Function => {
                    let marker = self.start_node();
                    self.parse_function(marker, false)
                }
                Keyword::Class => {
                    let marker = self.start_node();
                    self.parse_class(marker, false)
                }
                Keyword::New => self.parse_new(),
                _ => {
                    self.unexpected()?;
                    Ok(self.dummy_ident())
                }
            };
        }

        match self.token.kind {
            TokenKind::Name(_) => {
                let start = self.token.span.start;
                let ident = self.parse_identifier()?;
                if self.at(Punct::Arrow) && !self.token.newline_before {
                    let marker = self.start_node_at(start);
                    return self.parse_arrow_body(marker, vec![ident]);
                }
                Ok(ident)
            }
            TokenKind::Numeric(_) | TokenKind::String(_) | TokenKind::RegExp { .. } => self.parse_literal(),
            TokenKind::Template { head: true, .. } => self.parse_template(),
            TokenKind::Punct(Punct::LParen) => self.parse_paren_and_distinguish(),
            TokenKind::Punct(Punct::LBracket) => self.parse_array(),
            TokenKind::Punct(Punct::LBrace) => self.parse_object(),
            _ => {
                self.unexpected()?;
                Ok(self.dummy_ident())
            }
        }
    }

    fn parse_identifier(&mut self) -> PResult<Node> {
        let name = match &self.token.kind {
            TokenKind::Name(name) => name.clone(),
            _ => {
                self.unexpected()?;
                return Ok(self.dummy_ident());
            }
        };
        let marker = self.start_node();
        self.bump()?;
        Ok(self.finish_node(marker, NodeKind::Identifier { name }))
    }

    /// Identifier after `.` or as a property key; reserved words are allowed here.
    fn parse_ident_name(&mut self) -> PResult<Node> {
        let name = match &self.token.kind {
            TokenKind::Name(name) => name.clone(),
            TokenKind::Keyword(keyword) => keyword.as_str().to_string(),
            _ => {
                self.unexpected()?;
                return Ok(self.dummy_ident());
            }
        };
        let marker = self.start_node();
        self.bump()?;
        Ok(self.finish_node(marker, NodeKind::Identifier { name }))
    }

    fn parse_literal(&mut self) -> PResult<Node> {
        let value = match &self.token.kind {
            TokenKind::Numeric(n) => LiteralValue::Number(*n),
            TokenKind::String(s) => LiteralValue::String(s.clone()),
            TokenKind::RegExp { pattern, flags } => LiteralValue::RegExp {
                pattern: pattern.clone(),
                flags: flags.clone(),
            },
            TokenKind::Keyword(Keyword::True) => LiteralValue::Boolean(true),
            TokenKind::Keyword(Keyword::False) => LiteralValue::Boolean(false),
            TokenKind::Keyword(Keyword::Null) => LiteralValue::Null,
            _ => {
                self.unexpected()?;
                return Ok(self.dummy_ident());
            }
        };
        let raw = self.token.raw(self.source).to_string();
        let marker = self.start_node();
        self.bump()?;
        Ok(self.finish_node(marker, NodeKind::Literal { value, raw }))
    }

    fn parse_new(&mut self) -> PResult<Node> {
        let marker = self.start_node();
        self.bump()?;
        let start = self.token.span.start;
        let base = self.parse_expr_atom()?;
        let callee = Box::new(self.parse_subscripts(base, start, true)?);
        let arguments = if self.at(Punct::LParen) {
            self.parse_call_arguments()?
        } else {
            Vec::new()
        };
        Ok(self.finish_node(marker, NodeKind::NewExpression { callee, arguments }))
    }

    fn parse_template(&mut self) -> PResult<Node> {
        let marker = self.start_node();
        let mut quasis = Vec::new();
        let mut expressions = Vec::new();
        loop {
            let (raw, tail) = match &self.token.kind {
                TokenKind::Template { raw, tail, .. } => (raw.clone(), *tail),
                _ => {
                    self.unexpected()?;
                    break;
                }
            };
            // The element covers the raw text only, without the backquote or `${`/`}`.
            let element_start = self.token.span.start + 1;
            let element_end = element_start + raw.len();
            self.bump()?;
            let element_marker = self.start_node_at(element_start);
            quasis.push(self.finish_node_at(element_marker, NodeKind::TemplateElement { raw, tail }, element_end));
            if tail {
                break;
            }
            expressions.push(self.parse_expression(false)?);
            if !matches!(self.token.kind, TokenKind::Template { head: false, .. }) {
                self.unexpected()?;
                break;
            }
        }
        Ok(self.finish_node(marker, NodeKind::TemplateLiteral { quasis, expressions }))
    }

    fn parse_array(&mut self) -> PResult<Node> {
        let marker = self.start_node();
        self.bump()?;
        let mut elements = Vec::new();
        while !self.at(Punct::RBracket) && !self.at_end() {
            if self.eat(Punct::Comma)? {
                elements.push(None);
                continue;
            }
            let before = self.consumed;
            elements.push(Some(self.parse_spread_or_assign()?));
            if self.consumed == before {
                break;
            }
            if !self.at(Punct::RBracket) && !self.eat(Punct::Comma)? {
                self.unexpected()?;
                break;
            }
        }
        self.expect(Punct::RBracket)?;
        Ok(self.finish_node(marker, NodeKind::ArrayExpression { elements }))
    }

    fn parse_object(&mut self) -> PResult<Node> {
        let marker = self.start_node();
        self.bump()?;
        let mut properties = Vec::new();
        while !self.at(Punct::RBrace) && !self.at_end() {
            let before = self.consumed;
            properties.push(self.parse_object_property()?);
            if self.consumed == before {
                break;
            }
            if !self.at(Punct::RBrace) && !self.eat(Punct::Comma)? {
                self.unexpected()?;
                break;
            }
        }
        self.expect(Punct::RBrace)?;
        Ok(self.finish_node(marker, NodeKind::ObjectExpression { properties }))
    }

    fn parse_object_property(&mut self) -> PResult<Node> {
        let marker = self.start_node();
        let (mut key, mut computed) = self.parse_property_name()?;

        let accessor = if computed
            || self.at(Punct::Comma)
            || self.at(Punct::Colon)
            || self.at(Punct::LParen)
            || self.at(Punct::RBrace)
            || self.at(Punct::Eq)
        {
            None
        } else {
            match key.as_identifier() {
                Some("get") => Some(PropertyKind::Get),
                Some("set") => Some(PropertyKind::Set),
                _ => None,
            }
        };

        let (kind, value, shorthand, method) = if let Some(kind) = accessor {
            (key, computed) = self.parse_property_name()?;
            (kind, self.parse_method_function()?, false, false)
        } else if self.at(Punct::LParen) {
            (PropertyKind::Init, self.parse_method_function()?, false, true)
        } else if self.eat(Punct::Colon)? {
            (PropertyKind::Init, self.parse_maybe_assign(false)?, false, false)
        } else if !computed && key.as_identifier().is_some() {
            // Shorthand `{a}`, or `{a = 1}` which is only valid once reinterpreted as a pattern.
            let value = if self.at(Punct::Eq) {
                let default_marker = self.start_node_at(key.span.start);
                self.bump()?;
                let right = self.parse_maybe_assign(false)?;
                self.finish_node(
                    default_marker,
                    NodeKind::AssignmentPattern {
                        left: Box::new(key.detached()),
                        right: Box::new(right),
                    },
                )
            } else {
                key.detached()
            };
            (PropertyKind::Init, value, true, false)
        } else {
            self.unexpected()?;
            (PropertyKind::Init, self.dummy_ident(), false, false)
        };

        Ok(self.finish_node(
            marker,
            NodeKind::Property {
                key: Box::new(key),
                value: Box::new(value),
                kind,
                computed,
                shorthand,
                method,
            },
        ))
    }

    /// Property or method key. Returns the key and whether it was computed (`[expr]`).
    fn parse_property_name(&mut self) -> PResult<(Node, bool)> {
        if self.eat(Punct::LBracket)? {
            let key = self.parse_maybe_assign(false)?;
            self.expect(Punct::RBracket)?;
            return Ok((key, true));
        }
        let key = match self.token.kind {
            TokenKind::Numeric(_) | TokenKind::String(_) => self.parse_literal()?,
            _ => self.parse_ident_name()?,
        };
        Ok((key, false))
    }

    // ========================================================================
    // Parentheses and arrow functions
    // ========================================================================

    /// `( ... )`: either a parenthesized expression or the parameter list of an arrow function.
    fn parse_paren_and_distinguish(&mut self) -> PResult<Node> {
        let start = self.token.span.start;
        self.bump()?;
        let inner_start = self.token.span.start;
        let mut items = Vec::new();
        let mut rest_seen = false;
        while !self.at(Punct::RParen) && !self.at_end() {
            let before = self.consumed;
            if self.at(Punct::Ellipsis) {
                items.push(self.parse_rest_element()?);
                rest_seen = true;
            } else {
                items.push(self.parse_maybe_assign(false)?);
            }
            if self.consumed == before || !self.eat(Punct::Comma)? {
                break;
            }
        }
        let inner_end = self.prev_end;
        self.expect(Punct::RParen)?;

        if self.at(Punct::Arrow) && !self.token.newline_before {
            let params = items
                .into_iter()
                .map(|item| self.to_pattern(item))
                .collect::<PResult<Vec<_>>>()?;
            let marker = self.start_node_at(start);
            return self.parse_arrow_body(marker, params);
        }

        if items.is_empty() || rest_seen {
            self.unexpected()?;
        }
        match items.len() {
            0 => Ok(self.dummy_ident()),
            1 => Ok(items.remove(0)),
            _ => {
                let marker = self.start_node_at(inner_start);
                Ok(self.finish_node_at(marker, NodeKind::SequenceExpression { expressions: items }, inner_end))
            }
        }
    }

    /// Body of an arrow function, positioned at `=>`.
    fn parse_arrow_body(&mut self, marker: Marker, params: Vec<Node>) -> PResult<Node> {
        self.expect(Punct::Arrow)?;
        let (body, expression) = if self.at(Punct::LBrace) {
            (self.parse_function_body()?, false)
        } else {
            (self.parse_maybe_assign(false)?, true)
        };
        Ok(self.finish_node(
            marker,
            NodeKind::ArrowFunctionExpression {
                params,
                body: Box::new(body),
                expression,
            },
        ))
    }
}
