//! Module dependency and environment extraction.
//!
//! Every call or `new` expression closed during parsing is shown to a [`DependencyCollector`].
//! Five loader idioms are recognized:
//!
//! | Callee          | Accepted shapes                                 | Environment |
//! |-----------------|-------------------------------------------------|-------------|
//! | `importScripts` | `importScripts('a', 'b', ...)`                  |             |
//! | `Worker`        | `new Worker('a')`                               |             |
//! | `require`       | `require('a')`, `require(['a'])`, 2nd arg array | `node`      |
//! | `requirejs`     | `requirejs(['a'])`                              | `amd`       |
//! | `define`        | `define(['a'], f)`, `define('id', ['a'], f)`    | `amd`       |
//!
//! Only string literals become dependencies; anything else is skipped without complaint.

use std::collections::{BTreeSet, HashSet};

use jsast_syntax::ast::{Node, NodeKind};

use super::tree::Environment;

/// Accumulates dependencies (first occurrence wins) and environment hints across a parse.
#[derive(Debug, Default, Clone)]
pub struct DependencyCollector {
    seen: HashSet<String>,
    dependencies: Vec<String>,
    environments: BTreeSet<Environment>,
}

impl DependencyCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect a call or `new` expression. Other nodes are ignored.
    pub fn inspect(&mut self, node: &Node) {
        let (callee, arguments) = match &node.kind {
            NodeKind::CallExpression { callee, arguments } | NodeKind::NewExpression { callee, arguments } => {
                (callee, arguments.as_slice())
            }
            _ => return,
        };
        let Some(name) = callee.as_identifier() else {
            return;
        };
        match name {
            "importScripts" => self.add_all(arguments.iter()),
            "Worker" => {
                if let Some(first) = arguments.first() {
                    self.add(first);
                }
            }
            "require" => {
                match arguments.first().map(|a| &a.kind) {
                    Some(NodeKind::ArrayExpression { elements }) => {
                        self.environments.insert(Environment::Node);
                        self.add_all(elements.iter().flatten());
                    }
                    Some(NodeKind::Literal { .. }) => {
                        self.environments.insert(Environment::Node);
                        self.add(&arguments[0]);
                    }
                    _ => {}
                }
                if let Some(NodeKind::ArrayExpression { elements }) = arguments.get(1).map(|a| &a.kind) {
                    self.environments.insert(Environment::Node);
                    self.add_all(elements.iter().flatten());
                }
            }
            "requirejs" => {
                if let Some(NodeKind::ArrayExpression { elements }) = arguments.first().map(|a| &a.kind) {
                    self.environments.insert(Environment::Amd);
                    self.add_all(elements.iter().flatten());
                }
            }
            "define" if arguments.len() > 1 => {
                let mut candidate = &arguments[0];
                if matches!(candidate.kind, NodeKind::Literal { .. }) {
                    candidate = &arguments[1];
                }
                if let NodeKind::ArrayExpression { elements } = &candidate.kind {
                    self.environments.insert(Environment::Amd);
                    self.add_all(elements.iter().flatten());
                }
            }
            _ => {}
        }
    }

    fn add_all<'n>(&mut self, nodes: impl Iterator<Item = &'n Node>) {
        for node in nodes {
            self.add(node);
        }
    }

    fn add(&mut self, node: &Node) {
        let Some(value) = node.as_string_literal() else {
            return;
        };
        if self.seen.insert(value.to_string()) {
            self.dependencies.push(value.to_string());
        }
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn environments(&self) -> &BTreeSet<Environment> {
        &self.environments
    }

    pub fn into_parts(self) -> (Vec<String>, BTreeSet<Environment>) {
        (self.dependencies, self.environments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsast_syntax::ParseMode;
    use jsast_syntax::listener::ParseListener;

    struct Collect(DependencyCollector);

    impl ParseListener for Collect {
        fn on_node_finish(&mut self, node: &mut Node) {
            self.0.inspect(node);
        }
    }

    fn collect(source: &str) -> DependencyCollector {
        let mut listener = Collect(DependencyCollector::new());
        jsast_syntax::parse(source, ParseMode::Loose, &mut listener).unwrap();
        listener.0
    }

    #[test]
    fn test_require_array_sets_node() {
        let deps = collect("require(['a/b', 'c']);");
        assert_eq!(deps.dependencies(), ["a/b", "c"]);
        assert!(deps.environments().contains(&Environment::Node));
    }

    #[test]
    fn test_require_literal_and_second_array() {
        let deps = collect("require('x'); require(y, ['z']);");
        assert_eq!(deps.dependencies(), ["x", "z"]);
    }

    #[test]
    fn test_define_with_id_uses_second_argument() {
        let deps = collect("define('id', ['x'], function(x){});");
        assert_eq!(deps.dependencies(), ["x"]);
        assert_eq!(deps.environments().iter().copied().collect::<Vec<_>>(), vec![Environment::Amd]);
    }

    #[test]
    fn test_define_needs_two_arguments() {
        let deps = collect("define(['x']);");
        assert!(deps.dependencies().is_empty());
        assert!(deps.environments().is_empty());
    }

    #[test]
    fn test_requirejs_and_workers() {
        let deps = collect("requirejs(['m']); new Worker('w.js'); importScripts('a.js', b, 'c.js');");
        assert_eq!(deps.dependencies(), ["m", "w.js", "a.js", "c.js"]);
        assert!(deps.environments().contains(&Environment::Amd));
    }

    #[test]
    fn test_duplicates_keep_first_occurrence() {
        let deps = collect("require('b'); require('a'); require('b');");
        assert_eq!(deps.dependencies(), ["b", "a"]);
    }

    #[test]
    fn test_non_literals_and_missing_arguments_are_ignored() {
        let deps = collect("require(); require(name); Worker(); requirejs('x'); foo.require('y');");
        assert!(deps.dependencies().is_empty());
        assert!(deps.environments().is_empty());
    }

    #[test]
    fn test_nested_calls_are_found() {
        let deps = collect("function f() { if (x) { return require('deep'); } }");
        assert_eq!(deps.dependencies(), ["deep"]);
    }
}
