//! Abstract Syntax Tree definitions for JavaScript
//!
//! The node shapes follow the ESTree conventions that editor tooling expects: every node carries a
//! `type` tag, a byte-offset range, and the leading/trailing comments that were attached to it while
//! the parser was running.

use std::fmt;

use serde::Serialize;

/// Source location span (byte offsets, half-open)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 1-based line, 0-based column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LineColumn {
    pub line: u32,
    pub column: u32,
}

/// Line/column location of a source range, tagged with the file it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub start: LineColumn,
    pub end: LineColumn,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

// ============================================================================
// Comments
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommentKind {
    Block,
    Line,
}

/// A comment as recorded by the lexer.
///
/// `text` excludes the delimiters (`//`, `/*`, `*/`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    #[serde(rename = "type")]
    pub kind: CommentKind,
    #[serde(rename = "value")]
    pub text: String,
    #[serde(rename = "range")]
    pub span: Span,
    #[serde(rename = "loc", skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl Comment {
    pub fn new(kind: CommentKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
            location: None,
        }
    }
}

// ============================================================================
// Nodes
// ============================================================================

/// Identifier name used by the loose parser for nodes it had to invent.
pub const DUMMY_NAME: &str = "✖";

/// A syntax node with its range and attached comments.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(rename = "range")]
    pub span: Span,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub leading_comments: Vec<Comment>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trailing_comments: Vec<Comment>,
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self {
            kind,
            span,
            leading_comments: Vec::new(),
            trailing_comments: Vec::new(),
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    /// Returns the identifier name if this node is an `Identifier`.
    pub fn as_identifier(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Identifier { name } => Some(name),
            _ => None,
        }
    }

    /// Returns the value if this node is a string `Literal`.
    pub fn as_string_literal(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Literal {
                value: LiteralValue::String(s),
                ..
            } => Some(s),
            _ => None,
        }
    }

    /// Copy of this node without its attached comments, for syntax that repeats a node
    /// (the value of a shorthand property).
    pub fn detached(&self) -> Node {
        Node::new(self.kind.clone(), self.span)
    }

    /// True for identifiers the loose parser synthesized in place of missing syntax.
    pub fn is_dummy(&self) -> bool {
        self.as_identifier() == Some(DUMMY_NAME)
    }

    /// Program/block/switch-case statement lists, when this node has one.
    pub fn statements(&self) -> Option<&[Node]> {
        match &self.kind {
            NodeKind::Program { body } | NodeKind::BlockStatement { body } => Some(body),
            NodeKind::SwitchCase { consequent, .. } => Some(consequent),
            _ => None,
        }
    }

    /// Direct children in source order.
    pub fn children(&self) -> Vec<&Node> {
        let mut out: Vec<&Node> = Vec::new();
        fn opt<'a>(out: &mut Vec<&'a Node>, node: &'a Option<Box<Node>>) {
            if let Some(n) = node {
                out.push(n);
            }
        }
        match &self.kind {
            NodeKind::Program { body } | NodeKind::BlockStatement { body } | NodeKind::ClassBody { body } => {
                out.extend(body.iter())
            }
            NodeKind::EmptyStatement
            | NodeKind::DebuggerStatement
            | NodeKind::ThisExpression
            | NodeKind::Super
            | NodeKind::Identifier { .. }
            | NodeKind::Literal { .. }
            | NodeKind::TemplateElement { .. } => {}
            NodeKind::ExpressionStatement { expression } => out.push(expression),
            NodeKind::VariableDeclaration { declarations, .. } => out.extend(declarations.iter()),
            NodeKind::VariableDeclarator { id, init } => {
                out.push(id);
                opt(&mut out, init);
            }
            NodeKind::FunctionDeclaration { id, params, body }
            | NodeKind::FunctionExpression { id, params, body } => {
                opt(&mut out, id);
                out.extend(params.iter());
                out.push(body);
            }
            NodeKind::ArrowFunctionExpression { params, body, .. } => {
                out.extend(params.iter());
                out.push(body);
            }
            NodeKind::ReturnStatement { argument } => opt(&mut out, argument),
            NodeKind::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                out.push(test);
                out.push(consequent);
                opt(&mut out, alternate);
            }
            NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => {
                out.push(test);
                out.push(consequent);
                out.push(alternate);
            }
            NodeKind::ForStatement {
                init,
                test,
                update,
                body,
            } => {
                opt(&mut out, init);
                opt(&mut out, test);
                opt(&mut out, update);
                out.push(body);
            }
            NodeKind::ForInStatement { left, right, body } | NodeKind::ForOfStatement { left, right, body } => {
                out.push(left);
                out.push(right);
                out.push(body);
            }
            NodeKind::WhileStatement { test, body } => {
                out.push(test);
                out.push(body);
            }
            NodeKind::DoWhileStatement { body, test } => {
                out.push(body);
                out.push(test);
            }
            NodeKind::BreakStatement { label } | NodeKind::ContinueStatement { label } => opt(&mut out, label),
            NodeKind::ThrowStatement { argument }
            | NodeKind::SpreadElement { argument }
            | NodeKind::RestElement { argument }
            | NodeKind::UnaryExpression { argument, .. }
            | NodeKind::UpdateExpression { argument, .. } => out.push(argument),
            NodeKind::TryStatement {
                block,
                handler,
                finalizer,
            } => {
                out.push(block);
                opt(&mut out, handler);
                opt(&mut out, finalizer);
            }
            NodeKind::CatchClause { param, body } => {
                opt(&mut out, param);
                out.push(body);
            }
            NodeKind::SwitchStatement { discriminant, cases } => {
                out.push(discriminant);
                out.extend(cases.iter());
            }
            NodeKind::SwitchCase { test, consequent } => {
                opt(&mut out, test);
                out.extend(consequent.iter());
            }
            NodeKind::LabeledStatement { label, body } => {
                out.push(label);
                out.push(body);
            }
            NodeKind::WithStatement { object, body } => {
                out.push(object);
                out.push(body);
            }
            NodeKind::ClassDeclaration { id, super_class, body }
            | NodeKind::ClassExpression { id, super_class, body } => {
                opt(&mut out, id);
                opt(&mut out, super_class);
                out.push(body);
            }
            NodeKind::MethodDefinition { key, value, .. } => {
                out.push(key);
                out.push(value);
            }
            NodeKind::TemplateLiteral { quasis, expressions } => {
                // Interleave quasis and expressions to keep source order.
                let mut exprs = expressions.iter();
                for quasi in quasis {
                    out.push(quasi);
                    if let Some(e) = exprs.next() {
                        out.push(e);
                    }
                }
                out.extend(exprs);
            }
            NodeKind::TaggedTemplateExpression { tag, quasi } => {
                out.push(tag);
                out.push(quasi);
            }
            NodeKind::ArrayExpression { elements } | NodeKind::ArrayPattern { elements } => {
                out.extend(elements.iter().flatten())
            }
            NodeKind::ObjectExpression { properties } | NodeKind::ObjectPattern { properties } => {
                out.extend(properties.iter())
            }
            NodeKind::Property { key, value, shorthand, .. } => {
                if !shorthand {
                    out.push(key);
                }
                out.push(value);
            }
            NodeKind::BinaryExpression { left, right, .. }
            | NodeKind::LogicalExpression { left, right, .. }
            | NodeKind::AssignmentExpression { left, right, .. }
            | NodeKind::AssignmentPattern { left, right } => {
                out.push(left);
                out.push(right);
            }
            NodeKind::CallExpression { callee, arguments } | NodeKind::NewExpression { callee, arguments } => {
                out.push(callee);
                out.extend(arguments.iter());
            }
            NodeKind::MemberExpression { object, property, .. } => {
                out.push(object);
                out.push(property);
            }
            NodeKind::SequenceExpression { expressions } => out.extend(expressions.iter()),
        }
        out
    }

    /// Pre-order traversal over this node and all of its descendants.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Node)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VarKind {
    Var,
    Let,
    Const,
}

impl VarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VarKind::Var => "var",
            VarKind::Let => "let",
            VarKind::Const => "const",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    Init,
    Get,
    Set,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    Constructor,
    Method,
    Get,
    Set,
}

/// Value carried by a `Literal` node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LiteralValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
    RegExp { pattern: String, flags: String },
}

/// Node payloads, named after their ESTree `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum NodeKind {
    Program {
        body: Vec<Node>,
    },

    // ========== Statements ==========
    EmptyStatement,
    DebuggerStatement,
    ExpressionStatement {
        expression: Box<Node>,
    },
    BlockStatement {
        body: Vec<Node>,
    },
    VariableDeclaration {
        kind: VarKind,
        declarations: Vec<Node>,
    },
    VariableDeclarator {
        id: Box<Node>,
        init: Option<Box<Node>>,
    },
    FunctionDeclaration {
        id: Option<Box<Node>>,
        params: Vec<Node>,
        body: Box<Node>,
    },
    ReturnStatement {
        argument: Option<Box<Node>>,
    },
    IfStatement {
        test: Box<Node>,
        consequent: Box<Node>,
        alternate: Option<Box<Node>>,
    },
    ForStatement {
        init: Option<Box<Node>>,
        test: Option<Box<Node>>,
        update: Option<Box<Node>>,
        body: Box<Node>,
    },
    ForInStatement {
        left: Box<Node>,
        right: Box<Node>,
        body: Box<Node>,
    },
    ForOfStatement {
        left: Box<Node>,
        right: Box<Node>,
        body: Box<Node>,
    },
    WhileStatement {
        test: Box<Node>,
        body: Box<Node>,
    },
    DoWhileStatement {
        body: Box<Node>,
        test: Box<Node>,
    },
    BreakStatement {
        label: Option<Box<Node>>,
    },
    ContinueStatement {
        label: Option<Box<Node>>,
    },
    ThrowStatement {
        argument: Box<Node>,
    },
    TryStatement {
        block: Box<Node>,
        handler: Option<Box<Node>>,
        finalizer: Option<Box<Node>>,
    },
    CatchClause {
        param: Option<Box<Node>>,
        body: Box<Node>,
    },
    SwitchStatement {
        discriminant: Box<Node>,
        cases: Vec<Node>,
    },
    SwitchCase {
        test: Option<Box<Node>>,
        consequent: Vec<Node>,
    },
    LabeledStatement {
        label: Box<Node>,
        body: Box<Node>,
    },
    WithStatement {
        object: Box<Node>,
        body: Box<Node>,
    },
    ClassDeclaration {
        id: Option<Box<Node>>,
        super_class: Option<Box<Node>>,
        body: Box<Node>,
    },

    // ========== Classes ==========
    ClassBody {
        body: Vec<Node>,
    },
    MethodDefinition {
        key: Box<Node>,
        value: Box<Node>,
        kind: MethodKind,
        computed: bool,
        #[serde(rename = "static")]
        is_static: bool,
    },

    // ========== Expressions ==========
    Identifier {
        name: String,
    },
    Literal {
        value: LiteralValue,
        raw: String,
    },
    ThisExpression,
    Super,
    TemplateLiteral {
        quasis: Vec<Node>,
        expressions: Vec<Node>,
    },
    TemplateElement {
        raw: String,
        tail: bool,
    },
    TaggedTemplateExpression {
        tag: Box<Node>,
        quasi: Box<Node>,
    },
    ArrayExpression {
        elements: Vec<Option<Node>>,
    },
    ObjectExpression {
        properties: Vec<Node>,
    },
    Property {
        key: Box<Node>,
        value: Box<Node>,
        kind: PropertyKind,
        computed: bool,
        shorthand: bool,
        method: bool,
    },
    FunctionExpression {
        id: Option<Box<Node>>,
        params: Vec<Node>,
        body: Box<Node>,
    },
    ArrowFunctionExpression {
        params: Vec<Node>,
        body: Box<Node>,
        expression: bool,
    },
    ClassExpression {
        id: Option<Box<Node>>,
        super_class: Option<Box<Node>>,
        body: Box<Node>,
    },
    UnaryExpression {
        operator: String,
        argument: Box<Node>,
        prefix: bool,
    },
    UpdateExpression {
        operator: String,
        argument: Box<Node>,
        prefix: bool,
    },
    BinaryExpression {
        operator: String,
        left: Box<Node>,
        right: Box<Node>,
    },
    LogicalExpression {
        operator: String,
        left: Box<Node>,
        right: Box<Node>,
    },
    AssignmentExpression {
        operator: String,
        left: Box<Node>,
        right: Box<Node>,
    },
    ConditionalExpression {
        test: Box<Node>,
        consequent: Box<Node>,
        alternate: Box<Node>,
    },
    CallExpression {
        callee: Box<Node>,
        arguments: Vec<Node>,
    },
    NewExpression {
        callee: Box<Node>,
        arguments: Vec<Node>,
    },
    MemberExpression {
        object: Box<Node>,
        property: Box<Node>,
        computed: bool,
    },
    SequenceExpression {
        expressions: Vec<Node>,
    },
    SpreadElement {
        argument: Box<Node>,
    },

    // ========== Patterns ==========
    ObjectPattern {
        properties: Vec<Node>,
    },
    ArrayPattern {
        elements: Vec<Option<Node>>,
    },
    RestElement {
        argument: Box<Node>,
    },
    AssignmentPattern {
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// Fieldless discriminant of [`NodeKind`], used for handler dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum NodeType {
    Program,
    EmptyStatement,
    DebuggerStatement,
    ExpressionStatement,
    BlockStatement,
    VariableDeclaration,
    VariableDeclarator,
    FunctionDeclaration,
    ReturnStatement,
    IfStatement,
    ForStatement,
    ForInStatement,
    ForOfStatement,
    WhileStatement,
    DoWhileStatement,
    BreakStatement,
    ContinueStatement,
    ThrowStatement,
    TryStatement,
    CatchClause,
    SwitchStatement,
    SwitchCase,
    LabeledStatement,
    WithStatement,
    ClassDeclaration,
    ClassBody,
    MethodDefinition,
    Identifier,
    Literal,
    ThisExpression,
    Super,
    TemplateLiteral,
    TemplateElement,
    TaggedTemplateExpression,
    ArrayExpression,
    ObjectExpression,
    Property,
    FunctionExpression,
    ArrowFunctionExpression,
    ClassExpression,
    UnaryExpression,
    UpdateExpression,
    BinaryExpression,
    LogicalExpression,
    AssignmentExpression,
    ConditionalExpression,
    CallExpression,
    NewExpression,
    MemberExpression,
    SequenceExpression,
    SpreadElement,
    ObjectPattern,
    ArrayPattern,
    RestElement,
    AssignmentPattern,
}

impl NodeKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Program { .. } => NodeType::Program,
            NodeKind::EmptyStatement => NodeType::EmptyStatement,
            NodeKind::DebuggerStatement => NodeType::DebuggerStatement,
            NodeKind::ExpressionStatement { .. } => NodeType::ExpressionStatement,
            NodeKind::BlockStatement { .. } => NodeType::BlockStatement,
            NodeKind::VariableDeclaration { .. } => NodeType::VariableDeclaration,
            NodeKind::VariableDeclarator { .. } => NodeType::VariableDeclarator,
            NodeKind::FunctionDeclaration { .. } => NodeType::FunctionDeclaration,
            NodeKind::ReturnStatement { .. } => NodeType::ReturnStatement,
            NodeKind::IfStatement { .. } => NodeType::IfStatement,
            NodeKind::ForStatement { .. } => NodeType::ForStatement,
            NodeKind::ForInStatement { .. } => NodeType::ForInStatement,
            NodeKind::ForOfStatement { .. } => NodeType::ForOfStatement,
            NodeKind::WhileStatement { .. } => NodeType::WhileStatement,
            NodeKind::DoWhileStatement { .. } => NodeType::DoWhileStatement,
            NodeKind::BreakStatement { .. } => NodeType::BreakStatement,
            NodeKind::ContinueStatement { .. } => NodeType::ContinueStatement,
            NodeKind::ThrowStatement { .. } => NodeType::ThrowStatement,
            NodeKind::TryStatement { .. } => NodeType::TryStatement,
            NodeKind::CatchClause { .. } => NodeType::CatchClause,
            NodeKind::SwitchStatement { .. } => NodeType::SwitchStatement,
            NodeKind::SwitchCase { .. } => NodeType::SwitchCase,
            NodeKind::LabeledStatement { .. } => NodeType::LabeledStatement,
            NodeKind::WithStatement { .. } => NodeType::WithStatement,
            NodeKind::ClassDeclaration { .. } => NodeType::ClassDeclaration,
            NodeKind::ClassBody { .. } => NodeType::ClassBody,
            NodeKind::MethodDefinition { .. } => NodeType::MethodDefinition,
            NodeKind::Identifier { .. } => NodeType::Identifier,
            NodeKind::Literal { .. } => NodeType::Literal,
            NodeKind::ThisExpression => NodeType::ThisExpression,
            NodeKind::Super => NodeType::Super,
            NodeKind::TemplateLiteral { .. } => NodeType::TemplateLiteral,
            NodeKind::TemplateElement { .. } => NodeType::TemplateElement,
            NodeKind::TaggedTemplateExpression { .. } => NodeType::TaggedTemplateExpression,
            NodeKind::ArrayExpression { .. } => NodeType::ArrayExpression,
            NodeKind::ObjectExpression { .. } => NodeType::ObjectExpression,
            NodeKind::Property { .. } => NodeType::Property,
            NodeKind::FunctionExpression { .. } => NodeType::FunctionExpression,
            NodeKind::ArrowFunctionExpression { .. } => NodeType::ArrowFunctionExpression,
            NodeKind::ClassExpression { .. } => NodeType::ClassExpression,
            NodeKind::UnaryExpression { .. } => NodeType::UnaryExpression,
            NodeKind::UpdateExpression { .. } => NodeType::UpdateExpression,
            NodeKind::BinaryExpression { .. } => NodeType::BinaryExpression,
            NodeKind::LogicalExpression { .. } => NodeType::LogicalExpression,
            NodeKind::AssignmentExpression { .. } => NodeType::AssignmentExpression,
            NodeKind::ConditionalExpression { .. } => NodeType::ConditionalExpression,
            NodeKind::CallExpression { .. } => NodeType::CallExpression,
            NodeKind::NewExpression { .. } => NodeType::NewExpression,
            NodeKind::MemberExpression { .. } => NodeType::MemberExpression,
            NodeKind::SequenceExpression { .. } => NodeType::SequenceExpression,
            NodeKind::SpreadElement { .. } => NodeType::SpreadElement,
            NodeKind::ObjectPattern { .. } => NodeType::ObjectPattern,
            NodeKind::ArrayPattern { .. } => NodeType::ArrayPattern,
            NodeKind::RestElement { .. } => NodeType::RestElement,
            NodeKind::AssignmentPattern { .. } => NodeType::AssignmentPattern,
        }
    }
}

impl NodeType {
    pub fn is_function(self) -> bool {
        matches!(
            self,
            NodeType::FunctionDeclaration | NodeType::FunctionExpression | NodeType::ArrowFunctionExpression
        )
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
