/// Statement parsing.
///
/// This chunk parses statements, blocks, declarations (variables, functions, classes) and
/// the statement lists of programs, blocks and switch cases.
///
/// ## Notes
/// - Statement lists carry the loose-mode progress guard: a statement that consumed nothing is
///   dropped and the offending token skipped.
/// - A statement node is opened with `start_node()` at its first token, so it is the statement
///   (not its first expression) that receives the comments in front of it.
impl<'a, 'l> Parser<'a, 'l> {
    // ========================================================================
    // Statement lists
    // ========================================================================

    fn parse_statements_until(&mut self, stop: impl Fn(&Token) -> bool) -> PResult<Vec<Node>> {
        let mut body = Vec::new();
        while !self.at_end() && !stop(&self.token) {
            let before = self.consumed;
            let statement = self.parse_statement()?;
            if self.consumed == before {
                self.bump()?;
                continue;
            }
            body.push(statement);
        }
        Ok(body)
    }

    fn parse_statement(&mut self) -> PResult<Node> {
        self.nested(
            |p| Node::new(NodeKind::EmptyStatement, Span::new(p.prev_end, p.prev_end)),
            |p| p.parse_statement_inner(),
        )
    }

    fn parse_statement_inner(&mut self) -> PResult<Node> {
        if let Some(keyword) = self.keyword() {
            match keyword {
                Keyword::Var => return self.parse_var_statement(VarKind::Var),
                Keyword::Const => return self.parse_var_statement(VarKind::Const),
                Keyword::Function => {
                    let marker = self.start_node();
                    return self.parse_function(marker, true);
                }
                Keyword::Class => {
                    let marker = self.start_node();
                    return self.parse_class(marker, true);
                }
                Keyword::If => return self.parse_if(),
                Keyword::For => return self.parse_for(),
                Keyword::While => return self.parse_while(),
                Keyword::Do => return self.parse_do_while(),
                Keyword::Return => return self.parse_return(),
                Keyword::Break => return self.parse_break_continue(true),
                Keyword::Continue => return self.parse_break_continue(false),
                Keyword::Throw => return self.parse_throw(),
                Keyword::Try => return self.parse_try(),
                Keyword::Switch => return self.parse_switch(),
                Keyword::With => return self.parse_with(),
                Keyword::Debugger => {
                    let marker = self.start_node();
                    self.bump()?;
                    self.semicolon()?;
                    return Ok(self.finish_node(marker, NodeKind::DebuggerStatement));
                }
                Keyword::Import | Keyword::Export => {
                    let span = self.token.span;
                    self.fail(span, "'import' and 'export' may appear only with 'sourceType: module'")?;
                }
                _ => {}
            }
        }
        if self.at(Punct::LBrace) {
            return self.parse_block();
        }
        if self.at(Punct::Semi) {
            let marker = self.start_node();
            self.bump()?;
            return Ok(self.finish_node(marker, NodeKind::EmptyStatement));
        }
        if self.at_let_declaration() {
            return self.parse_var_statement(VarKind::Let);
        }
        self.parse_expression_statement()
    }

    fn parse_expression_statement(&mut self) -> PResult<Node> {
        let marker = self.start_node();
        let expression = self.parse_expression(false)?;
        if expression.as_identifier().is_some() && !expression.is_dummy() && self.eat(Punct::Colon)? {
            let body = self.parse_statement()?;
            return Ok(self.finish_node(
                marker,
                NodeKind::LabeledStatement {
                    label: Box::new(expression),
                    body: Box::new(body),
                },
            ));
        }
        self.semicolon()?;
        Ok(self.finish_node(
            marker,
            NodeKind::ExpressionStatement {
                expression: Box::new(expression),
            },
        ))
    }

    fn parse_block(&mut self) -> PResult<Node> {
        let marker = self.start_node();
        self.expect(Punct::LBrace)?;
        let body = self.parse_statements_until(|t| t.is_punct(Punct::RBrace))?;
        self.expect(Punct::RBrace)?;
        Ok(self.finish_node(marker, NodeKind::BlockStatement { body }))
    }

    fn parse_paren_expression(&mut self) -> PResult<Node> {
        self.expect(Punct::LParen)?;
        let expression = self.parse_expression(false)?;
        self.expect(Punct::RParen)?;
        Ok(expression)
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn parse_var_statement(&mut self, kind: VarKind) -> PResult<Node> {
        let marker = self.start_node();
        self.bump()?;
        let declarations = self.parse_var_declarators(false)?;
        self.semicolon()?;
        Ok(self.finish_node(marker, NodeKind::VariableDeclaration { kind, declarations }))
    }

    fn parse_var_declarators(&mut self, no_in: bool) -> PResult<Vec<Node>> {
        let mut declarations = Vec::new();
        loop {
            let marker = self.start_node();
            let id = self.parse_binding_target()?;
            let init = if self.eat(Punct::Eq)? {
                Some(Box::new(self.parse_maybe_assign(no_in)?))
            } else {
                None
            };
            declarations.push(self.finish_node(
                marker,
                NodeKind::VariableDeclarator {
                    id: Box::new(id),
                    init,
                },
            ));
            if !self.eat(Punct::Comma)? {
                break;
            }
        }
        Ok(declarations)
    }

    /// Parse a function after its opening marker; the current token is `function`.
    fn parse_function(&mut self, marker: Marker, is_statement: bool) -> PResult<Node> {
        self.bump()?;
        if self.at(Punct::Star) {
            let span = self.token.span;
            self.fail(span, "Generator functions are not supported")?;
            self.bump()?;
        }
        let id = if self.at_name() {
            Some(Box::new(self.parse_identifier()?))
        } else {
            if is_statement {
                self.unexpected()?;
            }
            None
        };
        let params = self.parse_params()?;
        let body = Box::new(self.parse_function_body()?);
        let kind = if is_statement {
            NodeKind::FunctionDeclaration { id, params, body }
        } else {
            NodeKind::FunctionExpression { id, params, body }
        };
        Ok(self.finish_node(marker, kind))
    }

    fn parse_params(&mut self) -> PResult<Vec<Node>> {
        self.expect(Punct::LParen)?;
        let mut params = Vec::new();
        while !self.at(Punct::RParen) && !self.at_end() {
            let before = self.consumed;
            if self.at(Punct::Ellipsis) {
                params.push(self.parse_rest_element()?);
            } else {
                params.push(self.parse_binding_element()?);
            }
            if self.consumed == before || !self.eat(Punct::Comma)? {
                break;
            }
        }
        self.expect(Punct::RParen)?;
        Ok(params)
    }

    fn parse_function_body(&mut self) -> PResult<Node> {
        let outer = std::mem::replace(&mut self.in_function, true);
        let body = self.parse_block();
        self.in_function = outer;
        body
    }

    /// Parse a class after its opening marker; the current token is `class`.
    fn parse_class(&mut self, marker: Marker, is_statement: bool) -> PResult<Node> {
        self.bump()?;
        let id = if self.at_name() {
            Some(Box::new(self.parse_identifier()?))
        } else {
            if is_statement {
                self.unexpected()?;
            }
            None
        };
        let super_class = if self.eat_keyword(Keyword::Extends)? {
            let start = self.token.span.start;
            let base = self.parse_expr_atom()?;
            Some(Box::new(self.parse_subscripts(base, start, false)?))
        } else {
            None
        };

        let body_marker = self.start_node();
        self.expect(Punct::LBrace)?;
        let mut members = Vec::new();
        while !self.at(Punct::RBrace) && !self.at_end() {
            if self.eat(Punct::Semi)? {
                continue;
            }
            let before = self.consumed;
            let method = self.parse_class_method()?;
            if self.consumed == before {
                self.bump()?;
                continue;
            }
            members.push(method);
        }
        self.expect(Punct::RBrace)?;
        let body = Box::new(self.finish_node(body_marker, NodeKind::ClassBody { body: members }));

        let kind = if is_statement {
            NodeKind::ClassDeclaration { id, super_class, body }
        } else {
            NodeKind::ClassExpression { id, super_class, body }
        };
        Ok(self.finish_node(marker, kind))
    }

    fn parse_class_method(&mut self) -> PResult<Node> {
        let marker = self.start_node();
        let (mut key, mut computed) = self.parse_property_name()?;

        let mut is_static = false;
        if !computed && key.as_identifier() == Some("static") && !self.at(Punct::LParen) {
            is_static = true;
            (key, computed) = self.parse_property_name()?;
        }

        let accessor = match key.as_identifier() {
            Some("get") if !computed && !self.at(Punct::LParen) => Some(MethodKind::Get),
            Some("set") if !computed && !self.at(Punct::LParen) => Some(MethodKind::Set),
            _ => None,
        };
        let kind = match accessor {
            Some(kind) => {
                (key, computed) = self.parse_property_name()?;
                kind
            }
            None => {
                let name = key.as_identifier().or_else(|| key.as_string_literal());
                if !computed && !is_static && name == Some("constructor") {
                    MethodKind::Constructor
                } else {
                    MethodKind::Method
                }
            }
        };

        let value = self.parse_method_function()?;
        Ok(self.finish_node(
            marker,
            NodeKind::MethodDefinition {
                key: Box::new(key),
                value: Box::new(value),
                kind,
                computed,
                is_static,
            },
        ))
    }

    /// Parameters and body of a method, as an anonymous function expression starting at `(`.
    fn parse_method_function(&mut self) -> PResult<Node> {
        let marker = self.start_node();
        let params = self.parse_params()?;
        let body = Box::new(self.parse_function_body()?);
        Ok(self.finish_node(marker, NodeKind::FunctionExpression { id: None, params, body }))
    }

    // ========================================================================
    // Control flow
    // ========================================================================

    fn parse_if(&mut self) -> PResult<Node> {
        let marker = self.start_node();
        self.bump()?;
        let test = Box::new(self.parse_paren_expression()?);
        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.eat_keyword(Keyword::Else)? {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(self.finish_node(
            marker,
            NodeKind::IfStatement {
                test,
                consequent,
                alternate,
            },
        ))
    }

    fn parse_for(&mut self) -> PResult<Node> {
        let marker = self.start_node();
        self.bump()?;
        self.expect(Punct::LParen)?;
        if self.at(Punct::Semi) {
            return self.parse_for_rest(marker, None);
        }

        let var_kind = match self.keyword() {
            Some(Keyword::Var) => Some(VarKind::Var),
            Some(Keyword::Const) => Some(VarKind::Const),
            _ if self.at_let_declaration() => Some(VarKind::Let),
            _ => None,
        };
        if let Some(kind) = var_kind {
            let init_marker = self.start_node();
            self.bump()?;
            let declarations = self.parse_var_declarators(true)?;
            let single = declarations.len() == 1;
            let init = self.finish_node(init_marker, NodeKind::VariableDeclaration { kind, declarations });
            if single && (self.at_keyword(Keyword::In) || self.token.is_name("of")) {
                return self.parse_for_in(marker, init);
            }
            return self.parse_for_rest(marker, Some(init));
        }

        let init = self.parse_expression(true)?;
        if self.at_keyword(Keyword::In) || self.token.is_name("of") {
            let left = self.to_pattern(init)?;
            return self.parse_for_in(marker, left);
        }
        self.parse_for_rest(marker, Some(init))
    }

    /// `for (init; test; update) body`, positioned at the first `;`.
    fn parse_for_rest(&mut self, marker: Marker, init: Option<Node>) -> PResult<Node> {
        self.expect(Punct::Semi)?;
        let test = if self.at(Punct::Semi) {
            None
        } else {
            Some(Box::new(self.parse_expression(false)?))
        };
        self.expect(Punct::Semi)?;
        let update = if self.at(Punct::RParen) {
            None
        } else {
            Some(Box::new(self.parse_expression(false)?))
        };
        self.expect(Punct::RParen)?;
        let body = Box::new(self.parse_statement()?);
        Ok(self.finish_node(
            marker,
            NodeKind::ForStatement {
                init: init.map(Box::new),
                test,
                update,
                body,
            },
        ))
    }

    /// `for (left in right)` / `for (left of right)`, positioned at `in`/`of`.
    fn parse_for_in(&mut self, marker: Marker, left: Node) -> PResult<Node> {
        let is_of = self.token.is_name("of");
        self.bump()?;
        let right = if is_of {
            self.parse_maybe_assign(false)?
        } else {
            self.parse_expression(false)?
        };
        self.expect(Punct::RParen)?;
        let body = Box::new(self.parse_statement()?);
        let (left, right) = (Box::new(left), Box::new(right));
        let kind = if is_of {
            NodeKind::ForOfStatement { left, right, body }
        } else {
            NodeKind::ForInStatement { left, right, body }
        };
        Ok(self.finish_node(marker, kind))
    }

    fn parse_while(&mut self) -> PResult<Node> {
        let marker = self.start_node();
        self.bump()?;
        let test = Box::new(self.parse_paren_expression()?);
        let body = Box::new(self.parse_statement()?);
        Ok(self.finish_node(marker, NodeKind::WhileStatement { test, body }))
    }

    fn parse_do_while(&mut self) -> PResult<Node> {
        let marker = self.start_node();
        self.bump()?;
        let body = Box::new(self.parse_statement()?);
        self.expect_keyword(Keyword::While)?;
        let test = Box::new(self.parse_paren_expression()?);
        self.eat(Punct::Semi)?;
        Ok(self.finish_node(marker, NodeKind::DoWhileStatement { body, test }))
    }

    fn parse_return(&mut self) -> PResult<Node> {
        let marker = self.start_node();
        if !self.in_function {
            let span = self.token.span;
            self.fail(span, "'return' outside of function")?;
        }
        self.bump()?;
        let argument = if self.eat(Punct::Semi)? || self.can_insert_semicolon() {
            None
        } else {
            let argument = self.parse_expression(false)?;
            self.semicolon()?;
            Some(Box::new(argument))
        };
        Ok(self.finish_node(marker, NodeKind::ReturnStatement { argument }))
    }

    fn parse_break_continue(&mut self, is_break: bool) -> PResult<Node> {
        let marker = self.start_node();
        self.bump()?;
        let label = if self.at_name() && !self.token.newline_before {
            Some(Box::new(self.parse_identifier()?))
        } else {
            None
        };
        self.semicolon()?;
        let kind = if is_break {
            NodeKind::BreakStatement { label }
        } else {
            NodeKind::ContinueStatement { label }
        };
        Ok(self.finish_node(marker, kind))
    }

    fn parse_throw(&mut self) -> PResult<Node> {
        let marker = self.start_node();
        self.bump()?;
        if self.token.newline_before {
            let span = Span::new(self.prev_end, self.token.span.start);
            self.fail(span, "Illegal newline after throw")?;
        }
        let argument = Box::new(self.parse_expression(false)?);
        self.semicolon()?;
        Ok(self.finish_node(marker, NodeKind::ThrowStatement { argument }))
    }

    fn parse_try(&mut self) -> PResult<Node> {
        let marker = self.start_node();
        self.bump()?;
        let block = Box::new(self.parse_block()?);
        let handler = if self.at_keyword(Keyword::Catch) {
            let clause = self.start_node();
            self.bump()?;
            self.expect(Punct::LParen)?;
            let param = self.parse_binding_target()?;
            self.expect(Punct::RParen)?;
            let body = Box::new(self.parse_block()?);
            Some(Box::new(self.finish_node(
                clause,
                NodeKind::CatchClause {
                    param: Some(Box::new(param)),
                    body,
                },
            )))
        } else {
            None
        };
        let finalizer = if self.eat_keyword(Keyword::Finally)? {
            Some(Box::new(self.parse_block()?))
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            let span = self.token.span;
            self.fail(span, "Missing catch or finally clause")?;
        }
        Ok(self.finish_node(
            marker,
            NodeKind::TryStatement {
                block,
                handler,
                finalizer,
            },
        ))
    }

    fn parse_switch(&mut self) -> PResult<Node> {
        let marker = self.start_node();
        self.bump()?;
        let discriminant = Box::new(self.parse_paren_expression()?);
        self.expect(Punct::LBrace)?;
        let mut cases = Vec::new();
        while !self.at(Punct::RBrace) && !self.at_end() {
            let case = self.start_node();
            let test = if self.eat_keyword(Keyword::Case)? {
                Some(Box::new(self.parse_expression(false)?))
            } else if self.eat_keyword(Keyword::Default)? {
                None
            } else {
                self.unexpected()?;
                self.bump()?;
                continue;
            };
            self.expect(Punct::Colon)?;
            let consequent = self.parse_statements_until(|t| {
                t.is_punct(Punct::RBrace) || t.is_keyword(Keyword::Case) || t.is_keyword(Keyword::Default)
            })?;
            cases.push(self.finish_node(case, NodeKind::SwitchCase { test, consequent }));
        }
        self.expect(Punct::RBrace)?;
        Ok(self.finish_node(marker, NodeKind::SwitchStatement { discriminant, cases }))
    }

    fn parse_with(&mut self) -> PResult<Node> {
        let marker = self.start_node();
        self.bump()?;
        let object = Box::new(self.parse_paren_expression()?);
        let body = Box::new(self.parse_statement()?);
        Ok(self.finish_node(marker, NodeKind::WithStatement { object, body }))
    }
}
