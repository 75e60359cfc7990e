//! Structural outline of a syntax tree: functions, classes, methods and variables.

use jsast_syntax::ast::{MethodKind, Node, NodeKind, Span};
use serde::Serialize;

use crate::pipeline::SyntaxTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlineKind {
    Function,
    Class,
    Method,
    Variable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineItem {
    pub name: String,
    pub kind: OutlineKind,
    /// Signature-like label, e.g. `f(a, b)`.
    pub detail: String,
    /// Whole declaration.
    pub span: Span,
    /// The name itself, or the declaration when there is none.
    pub selection: Span,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<OutlineItem>,
}

/// Build the outline of `tree`.
pub fn outline(tree: &SyntaxTree) -> Vec<OutlineItem> {
    let mut items = Vec::new();
    for statement in tree.body() {
        collect(statement, &mut items);
    }
    items
}

fn collect(node: &Node, out: &mut Vec<OutlineItem>) {
    match &node.kind {
        NodeKind::FunctionDeclaration { id, params, body } => {
            let name = id.as_deref().and_then(Node::as_identifier).unwrap_or("<anonymous>");
            out.push(function_item(name, id.as_deref(), node.span, params, body, OutlineKind::Function));
        }
        NodeKind::ClassDeclaration { id, body, .. } => {
            let name = id.as_deref().and_then(Node::as_identifier).unwrap_or("<anonymous>");
            out.push(class_item(name, id.as_deref(), node.span, body));
        }
        NodeKind::VariableDeclaration { kind, declarations } => {
            for declarator in declarations {
                if let NodeKind::VariableDeclarator { id, init } = &declarator.kind {
                    let Some(name) = id.as_identifier() else {
                        continue;
                    };
                    out.push(variable_item(name, kind.as_str(), id, declarator.span, init.as_deref()));
                }
            }
        }
        NodeKind::ExpressionStatement { expression } => collect_functions_in(expression, out),
        NodeKind::BlockStatement { .. }
        | NodeKind::IfStatement { .. }
        | NodeKind::ForStatement { .. }
        | NodeKind::ForInStatement { .. }
        | NodeKind::ForOfStatement { .. }
        | NodeKind::WhileStatement { .. }
        | NodeKind::DoWhileStatement { .. }
        | NodeKind::TryStatement { .. }
        | NodeKind::CatchClause { .. }
        | NodeKind::SwitchStatement { .. }
        | NodeKind::SwitchCase { .. }
        | NodeKind::LabeledStatement { .. }
        | NodeKind::WithStatement { .. } => {
            for child in node.children() {
                collect(child, out);
            }
        }
        _ => {}
    }
}

/// Function expressions passed around in expression statements, e.g. `define([...], function () {})`.
fn collect_functions_in(node: &Node, out: &mut Vec<OutlineItem>) {
    match &node.kind {
        NodeKind::FunctionExpression { id, params, body } => {
            let name = id.as_deref().and_then(Node::as_identifier).unwrap_or("<anonymous>");
            out.push(function_item(name, id.as_deref(), node.span, params, body, OutlineKind::Function));
        }
        NodeKind::ArrowFunctionExpression { params, body, .. } => {
            out.push(function_item("<anonymous>", None, node.span, params, body, OutlineKind::Function));
        }
        NodeKind::ClassExpression { id, body, .. } => {
            let name = id.as_deref().and_then(Node::as_identifier).unwrap_or("<anonymous>");
            out.push(class_item(name, id.as_deref(), node.span, body));
        }
        _ => {
            for child in node.children() {
                collect_functions_in(child, out);
            }
        }
    }
}

fn function_item(name: &str, id: Option<&Node>, span: Span, params: &[Node], body: &Node, kind: OutlineKind) -> OutlineItem {
    let mut children = Vec::new();
    collect(body, &mut children);
    OutlineItem {
        name: name.to_string(),
        kind,
        detail: format!("{name}({})", param_list(params)),
        span,
        selection: id.map_or(span, |id| id.span),
        children,
    }
}

fn class_item(name: &str, id: Option<&Node>, span: Span, body: &Node) -> OutlineItem {
    let mut children = Vec::new();
    if let NodeKind::ClassBody { body } = &body.kind {
        for member in body {
            let NodeKind::MethodDefinition { key, value, kind, .. } = &member.kind else {
                continue;
            };
            let method_name = key
                .as_identifier()
                .or_else(|| key.as_string_literal())
                .unwrap_or("<computed>");
            let label = match kind {
                MethodKind::Get => format!("get {method_name}"),
                MethodKind::Set => format!("set {method_name}"),
                _ => method_name.to_string(),
            };
            if let NodeKind::FunctionExpression { params, body, .. } = &value.kind {
                children.push(function_item(&label, Some(key), member.span, params, body, OutlineKind::Method));
            }
        }
    }
    OutlineItem {
        name: name.to_string(),
        kind: OutlineKind::Class,
        detail: format!("class {name}"),
        span,
        selection: id.map_or(span, |id| id.span),
        children,
    }
}

fn variable_item(name: &str, keyword: &str, id: &Node, span: Span, init: Option<&Node>) -> OutlineItem {
    match init.map(|n| &n.kind) {
        Some(NodeKind::FunctionExpression { params, body, .. })
        | Some(NodeKind::ArrowFunctionExpression { params, body, .. }) => {
            function_item(name, Some(id), span, params, body, OutlineKind::Function)
        }
        Some(NodeKind::ClassExpression { body, .. }) => class_item(name, Some(id), span, body),
        _ => OutlineItem {
            name: name.to_string(),
            kind: OutlineKind::Variable,
            detail: format!("{keyword} {name}"),
            span,
            selection: id.span,
            children: Vec::new(),
        },
    }
}

fn param_list(params: &[Node]) -> String {
    params
        .iter()
        .map(|p| match &p.kind {
            NodeKind::Identifier { name } => name.clone(),
            NodeKind::AssignmentPattern { left, .. } => left.as_identifier().unwrap_or("_").to_string(),
            NodeKind::RestElement { argument } => format!("...{}", argument.as_identifier().unwrap_or("_")),
            _ => "_".to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::AstParser;

    fn names(items: &[OutlineItem]) -> Vec<(&str, OutlineKind)> {
        items.iter().map(|i| (i.name.as_str(), i.kind)).collect()
    }

    #[test]
    fn test_top_level_declarations() {
        let tree = AstParser::new().parse(
            "var a = 1; function f(x, y = 2, ...rest) { function inner() {} } const g = () => 0;",
            "o.js",
        );
        let items = outline(&tree);
        assert_eq!(
            names(&items),
            vec![("a", OutlineKind::Variable), ("f", OutlineKind::Function), ("g", OutlineKind::Function)]
        );
        assert_eq!(items[1].detail, "f(x, y, ...rest)");
        assert_eq!(names(&items[1].children), vec![("inner", OutlineKind::Function)]);
        assert_eq!(items[0].detail, "var a");
    }

    #[test]
    fn test_class_methods() {
        let tree = AstParser::new().parse("class A { constructor(v) {} get size() {} run() {} }", "o.js");
        let items = outline(&tree);
        assert_eq!(items[0].kind, OutlineKind::Class);
        let methods: Vec<_> = items[0].children.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(methods, vec!["constructor", "get size", "run"]);
    }

    #[test]
    fn test_define_callback_is_outlined() {
        let tree = AstParser::new().parse("define(['x'], function(x) { function helper() {} });", "o.js");
        let items = outline(&tree);
        assert_eq!(names(&items), vec![("<anonymous>", OutlineKind::Function)]);
        assert_eq!(names(&items[0].children), vec![("helper", OutlineKind::Function)]);
    }
}
