//! Lint rules over cached syntax trees.
//!
//! A [`Rule`] declares the node types it wants to see; [`lint`] walks the tree once and hands each
//! node to the rules registered for its type. Rules report through a [`LintContext`].

mod no_unreachable;

use std::collections::HashMap;
use std::fmt;

use jsast_syntax::ast::{Node, NodeType, Span};
use serde::Serialize;

use crate::pipeline::SyntaxTree;

pub use no_unreachable::NoUnreachable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A problem reported by a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub rule: &'static str,
    pub message: String,
    pub span: Span,
    pub severity: Severity,
}

pub trait Rule: Send + Sync {
    /// Rule id, e.g. `no-unreachable`.
    fn name(&self) -> &'static str;

    /// Node types this rule is dispatched on.
    fn node_types(&self) -> &'static [NodeType];

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, node: &Node, ctx: &mut LintContext<'_>);
}

/// What a rule sees while it runs.
pub struct LintContext<'t> {
    tree: &'t SyntaxTree,
    rule: &'static str,
    severity: Severity,
    findings: Vec<Finding>,
}

impl<'t> LintContext<'t> {
    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    pub fn report(&mut self, node: &Node, message: impl Into<String>) {
        self.findings.push(Finding {
            rule: self.rule,
            message: message.into(),
            span: node.span,
            severity: self.severity,
        });
    }
}

/// The rules enabled by default.
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![Box::new(NoUnreachable)]
}

/// Run `rules` over `tree`. Findings come out in tree order.
#[tracing::instrument(skip_all, fields(file = %tree.source_file, rules = rules.len()))]
pub fn lint(tree: &SyntaxTree, rules: &[Box<dyn Rule>]) -> Vec<Finding> {
    let mut dispatch: HashMap<NodeType, Vec<&dyn Rule>> = HashMap::new();
    for rule in rules {
        for ty in rule.node_types() {
            dispatch.entry(*ty).or_default().push(rule.as_ref());
        }
    }

    let mut ctx = LintContext {
        tree,
        rule: "",
        severity: Severity::Warning,
        findings: Vec::new(),
    };
    tree.program.walk(&mut |node| {
        let Some(handlers) = dispatch.get(&node.node_type()) else {
            return;
        };
        for rule in handlers {
            ctx.rule = rule.name();
            ctx.severity = rule.severity();
            rule.check(node, &mut ctx);
        }
    });
    tracing::debug!(findings = ctx.findings.len(), "lint finished");
    ctx.findings
}
