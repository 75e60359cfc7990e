/// Binding and assignment patterns.
///
/// Declarations and parameters parse patterns directly (`parse_binding_target`). Assignment
/// targets and arrow parameters are first parsed as expressions and then converted with
/// `to_pattern`.
impl<'a, 'l> Parser<'a, 'l> {
    /// Identifier, `[...]` or `{...}` pattern.
    fn parse_binding_target(&mut self) -> PResult<Node> {
        match self.token.kind {
            TokenKind::Name(_) => self.parse_identifier(),
            TokenKind::Punct(Punct::LBracket) => self.nested(Self::dummy_ident, |p| p.parse_array_pattern()),
            TokenKind::Punct(Punct::LBrace) => self.nested(Self::dummy_ident, |p| p.parse_object_pattern()),
            _ => {
                self.unexpected()?;
                Ok(self.dummy_ident())
            }
        }
    }

    /// Binding target with an optional `= default`.
    fn parse_binding_element(&mut self) -> PResult<Node> {
        let start = self.token.span.start;
        let target = self.parse_binding_target()?;
        if !self.eat(Punct::Eq)? {
            return Ok(target);
        }
        let right = self.parse_maybe_assign(false)?;
        Ok(self.finish_node(
            self.start_node_at(start),
            NodeKind::AssignmentPattern {
                left: Box::new(target),
                right: Box::new(right),
            },
        ))
    }

    /// `...target`, positioned at the ellipsis.
    fn parse_rest_element(&mut self) -> PResult<Node> {
        let marker = self.start_node();
        self.bump()?;
        let argument = Box::new(self.parse_binding_target()?);
        Ok(self.finish_node(marker, NodeKind::RestElement { argument }))
    }

    fn parse_array_pattern(&mut self) -> PResult<Node> {
        let marker = self.start_node();
        self.bump()?;
        let mut elements = Vec::new();
        while !self.at(Punct::RBracket) && !self.at_end() {
            if self.eat(Punct::Comma)? {
                elements.push(None);
                continue;
            }
            let before = self.consumed;
            if self.at(Punct::Ellipsis) {
                elements.push(Some(self.parse_rest_element()?));
            } else {
                elements.push(Some(self.parse_binding_element()?));
            }
            if self.consumed == before {
                break;
            }
            if !self.at(Punct::RBracket) && !self.eat(Punct::Comma)? {
                self.unexpected()?;
                break;
            }
        }
        self.expect(Punct::RBracket)?;
        Ok(self.finish_node(marker, NodeKind::ArrayPattern { elements }))
    }

    fn parse_object_pattern(&mut self) -> PResult<Node> {
        let marker = self.start_node();
        self.bump()?;
        let mut properties = Vec::new();
        while !self.at(Punct::RBrace) && !self.at_end() {
            let before = self.consumed;
            let property_marker = self.start_node();
            let (key, computed) = self.parse_property_name()?;
            let (value, shorthand) = if self.eat(Punct::Colon)? {
                (self.parse_binding_element()?, false)
            } else if !computed && key.as_identifier().is_some() {
                let value = if self.eat(Punct::Eq)? {
                    let right = self.parse_maybe_assign(false)?;
                    self.finish_node(
                        self.start_node_at(key.span.start),
                        NodeKind::AssignmentPattern {
                            left: Box::new(key.detached()),
                            right: Box::new(right),
                        },
                    )
                } else {
                    key.detached()
                };
                (value, true)
            } else {
                self.unexpected()?;
                (self.dummy_ident(), false)
            };
            properties.push(self.finish_node(
                property_marker,
                NodeKind::Property {
                    key: Box::new(key),
                    value: Box::new(value),
                    kind: PropertyKind::Init,
                    computed,
                    shorthand,
                    method: false,
                },
            ));
            if self.consumed == before {
                break;
            }
            if !self.at(Punct::RBrace) && !self.eat(Punct::Comma)? {
                self.unexpected()?;
                break;
            }
        }
        self.expect(Punct::RBrace)?;
        Ok(self.finish_node(marker, NodeKind::ObjectPattern { properties }))
    }

    /// Reinterpret an expression as an assignment target / parameter pattern.
    fn to_pattern(&mut self, node: Node) -> PResult<Node> {
        ensure_sufficient_stack(|| self.to_pattern_inner(node))
    }

    fn to_pattern_inner(&mut self, node: Node) -> PResult<Node> {
        let Node {
            kind,
            span,
            leading_comments,
            trailing_comments,
        } = node;
        let kind = match kind {
            NodeKind::Identifier { .. }
            | NodeKind::MemberExpression { .. }
            | NodeKind::ObjectPattern { .. }
            | NodeKind::ArrayPattern { .. }
            | NodeKind::AssignmentPattern { .. }
            | NodeKind::RestElement { .. } => kind,
            NodeKind::ObjectExpression { properties } => {
                let mut patterns = Vec::with_capacity(properties.len());
                for property in properties {
                    patterns.push(self.property_to_pattern(property)?);
                }
                NodeKind::ObjectPattern { properties: patterns }
            }
            NodeKind::ArrayExpression { elements } => {
                let mut patterns = Vec::with_capacity(elements.len());
                for element in elements {
                    patterns.push(element.map(|e| self.to_pattern(e)).transpose()?);
                }
                NodeKind::ArrayPattern { elements: patterns }
            }
            NodeKind::SpreadElement { argument } => NodeKind::RestElement {
                argument: Box::new(self.to_pattern(*argument)?),
            },
            NodeKind::AssignmentExpression { operator, left, right } if operator == "=" => {
                NodeKind::AssignmentPattern { left, right }
            }
            other => {
                self.fail(span, "Assigning to rvalue")?;
                other
            }
        };
        Ok(Node {
            kind,
            span,
            leading_comments,
            trailing_comments,
        })
    }

    fn property_to_pattern(&mut self, property: Node) -> PResult<Node> {
        let Node {
            kind,
            span,
            leading_comments,
            trailing_comments,
        } = property;
        let kind = match kind {
            NodeKind::Property {
                key,
                value,
                computed,
                shorthand,
                kind: PropertyKind::Init,
                method: false,
            } => NodeKind::Property {
                key,
                value: Box::new(self.to_pattern(*value)?),
                kind: PropertyKind::Init,
                computed,
                shorthand,
                method: false,
            },
            other => {
                self.fail(span, "Object pattern can't contain getter, setter or method")?;
                other
            }
        };
        Ok(Node {
            kind,
            span,
            leading_comments,
            trailing_comments,
        })
    }

    /// `++`/`--` and compound assignment need an identifier or member expression.
    fn check_simple_target(&mut self, node: &Node) -> PResult<()> {
        match node.kind {
            NodeKind::Identifier { .. } | NodeKind::MemberExpression { .. } => Ok(()),
            _ => self.fail(node.span, "Assigning to rvalue"),
        }
    }
}
