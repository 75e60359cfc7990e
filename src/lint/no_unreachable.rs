//! `no-unreachable`: statements after `return`, `throw`, `break` or `continue` in the same
//! statement list.
//!
//! Function and variable declarations are hoisted, so they are not reported.

use jsast_syntax::ast::{Node, NodeKind, NodeType};

use super::{LintContext, Rule};

pub const UNREACHABLE_MESSAGE: &str = "Unreachable code.";

#[derive(Debug, Default, Clone, Copy)]
pub struct NoUnreachable;

fn ends_flow(node: &Node) -> bool {
    matches!(
        node.node_type(),
        NodeType::ReturnStatement | NodeType::ThrowStatement | NodeType::ContinueStatement | NodeType::BreakStatement
    )
}

fn hoisted(node: &Node) -> bool {
    matches!(
        node.node_type(),
        NodeType::FunctionDeclaration | NodeType::VariableDeclaration
    )
}

impl NoUnreachable {
    fn check_list(&self, statements: &[Node], ctx: &mut LintContext<'_>) {
        let Some(first_exit) = statements.iter().position(ends_flow) else {
            return;
        };
        for statement in &statements[first_exit + 1..] {
            if !hoisted(statement) {
                ctx.report(statement, UNREACHABLE_MESSAGE);
            }
        }
    }
}

impl Rule for NoUnreachable {
    fn name(&self) -> &'static str {
        "no-unreachable"
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[NodeType::BlockStatement, NodeType::SwitchCase]
    }

    fn check(&self, node: &Node, ctx: &mut LintContext<'_>) {
        match &node.kind {
            NodeKind::BlockStatement { body } => self.check_list(body, ctx),
            NodeKind::SwitchCase { consequent, .. } => self.check_list(consequent, ctx),
            _ => {}
        }
    }
}
