//! Property-based tests for the jsast pipeline
//!
//! These tests use proptest to verify invariants across many randomly
//! generated inputs, catching edge cases that hand-written tests might miss.

use jsast::ast::Node;
use jsast::{AstParser, LruCache};
use proptest::prelude::*;

// =============================================================================
// Generators
// =============================================================================

/// Source fragments, valid and broken, stitched together into programs.
const FRAGMENTS: &[&str] = &[
    "var a = 1;",
    "let b = a + 2;",
    "const c = [1, 2, 3];",
    "require('fs');",
    "require(['x', 'y/z']);",
    "define(['dep'], function(dep) { return dep; });",
    "new Worker('w.js');",
    "importScripts('s1.js');",
    "function f(p) { return p; }",
    "if (a) { b(); } else { c(); }",
    "for (var i = 0; i < 3; i++) { continue; }",
    "switch (a) { case 1: break; default: a = 2; }",
    "x = /re+/g.test(s);",
    "o.m(`t ${a}`);",
    "// line comment",
    "/* block */",
    "/** doc */ function g() {}",
    "(a, b) => a * b;",
    "var o = { a, /* k */ b, c: 1 };",
    "throw new Error('e');",
    "var = ;",
    "foo(",
    "}",
    "{",
    "if (",
    "'unterminated",
    "/* open",
    "a ** ",
    "@",
];

fn program() -> impl Strategy<Value = String> {
    prop::collection::vec((prop::sample::select(FRAGMENTS), prop::bool::ANY), 0..12).prop_map(|parts| {
        let mut source = String::new();
        for (fragment, newline) in parts {
            source.push_str(fragment);
            source.push(if newline { '\n' } else { ' ' });
        }
        source
    })
}

fn walk<'a>(node: &'a Node, out: &mut Vec<&'a Node>) {
    out.push(node);
    for child in node.children() {
        walk(child, out);
    }
}

// =============================================================================
// Parse Properties
// =============================================================================

proptest! {
    /// Property: Tokens are indexed by position and strictly ascending within the source
    #[test]
    fn tokens_are_ordered_and_indexed(source in program()) {
        let tree = AstParser::new().parse(&source, "prop.js");
        for (i, token) in tree.tokens.iter().enumerate() {
            prop_assert_eq!(token.index, i);
            prop_assert!(token.range.start < token.range.end);
            prop_assert!(token.range.end <= source.len());
        }
        for pair in tree.tokens.windows(2) {
            prop_assert!(pair[0].range.end <= pair[1].range.start);
        }
    }

    /// Property: Parsing is deterministic
    #[test]
    fn parse_is_deterministic(source in program()) {
        let parser = AstParser::new();
        let first = parser.parse(&source, "prop.js");
        let second = parser.parse(&source, "prop.js");
        prop_assert_eq!(first, second);
    }

    /// Property: Attached comments come from the comment list and sit on the right side of their node
    #[test]
    fn attached_comments_are_positioned(source in program()) {
        let tree = AstParser::new().parse(&source, "prop.js");
        let mut nodes = Vec::new();
        walk(&tree.program, &mut nodes);
        for node in nodes {
            for comment in &node.leading_comments {
                prop_assert!(comment.span.end <= node.span.start);
                prop_assert!(tree.comments.contains(comment));
            }
            for comment in &node.trailing_comments {
                prop_assert!(comment.span.start >= node.span.end);
                prop_assert!(tree.comments.contains(comment));
            }
        }
    }

    /// Property: No comment is handed out twice as leading, nor twice as trailing
    #[test]
    fn comments_are_attached_at_most_once(source in program()) {
        let tree = AstParser::new().parse(&source, "prop.js");
        let mut nodes = Vec::new();
        walk(&tree.program, &mut nodes);
        let mut leading: Vec<usize> = nodes.iter().flat_map(|n| n.leading_comments.iter().map(|c| c.span.start)).collect();
        let mut trailing: Vec<usize> = nodes.iter().flat_map(|n| n.trailing_comments.iter().map(|c| c.span.start)).collect();
        let (leading_total, trailing_total) = (leading.len(), trailing.len());
        leading.sort_unstable();
        leading.dedup();
        trailing.sort_unstable();
        trailing.dedup();
        prop_assert_eq!(leading.len(), leading_total);
        prop_assert_eq!(trailing.len(), trailing_total);
    }

    /// Property: Dependencies are unique and errors are unique per (index, message)
    #[test]
    fn annotations_are_deduplicated(source in program()) {
        let tree = AstParser::new().parse(&source, "prop.js");
        let mut deps = tree.dependencies.clone();
        deps.sort();
        deps.dedup();
        prop_assert_eq!(deps.len(), tree.dependencies.len());

        let mut keys: Vec<_> = tree.errors.iter().map(|e| (e.index, e.message.clone())).collect();
        keys.sort();
        keys.dedup();
        prop_assert_eq!(keys.len(), tree.errors.len());
    }

    /// Property: A program with no parse errors reports no syntax failure on its own
    #[test]
    fn valid_programs_have_no_errors(parts in prop::collection::vec(prop::sample::select(&FRAGMENTS[..19]), 0..8)) {
        let source = parts.join("\n");
        let tree = AstParser::new().parse(&source, "prop.js");
        prop_assert!(tree.errors.is_empty(), "{:?} in {:?}", tree.errors, source);
    }
}

// =============================================================================
// Cache Properties
// =============================================================================

#[derive(Debug, Clone)]
enum CacheOp {
    Put(u8),
    Get(u8),
    Remove(u8),
}

fn cache_op() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (0u8..8).prop_map(CacheOp::Put),
        (0u8..8).prop_map(CacheOp::Get),
        (0u8..8).prop_map(CacheOp::Remove),
    ]
}

proptest! {
    /// Property: The cache agrees with a simple recency list
    #[test]
    fn lru_matches_reference_model(capacity in 1usize..5, ops in prop::collection::vec(cache_op(), 0..64)) {
        let mut cache = LruCache::new(capacity);
        // Most recent first.
        let mut model: Vec<u8> = Vec::new();

        for op in ops {
            match op {
                CacheOp::Put(k) => {
                    let evicted = cache.put(k, u32::from(k) * 10);
                    model.retain(|m| *m != k);
                    model.insert(0, k);
                    let expected = if model.len() > capacity { model.pop() } else { None };
                    prop_assert_eq!(evicted.map(|(key, _)| key), expected);
                }
                CacheOp::Get(k) => {
                    let hit = cache.get(&k).copied();
                    if model.contains(&k) {
                        prop_assert_eq!(hit, Some(u32::from(k) * 10));
                        model.retain(|m| *m != k);
                        model.insert(0, k);
                    } else {
                        prop_assert_eq!(hit, None);
                    }
                }
                CacheOp::Remove(k) => {
                    let removed = cache.remove(&k);
                    prop_assert_eq!(removed.is_some(), model.contains(&k));
                    model.retain(|m| *m != k);
                }
            }
            prop_assert!(cache.len() <= capacity);
            prop_assert_eq!(cache.keys().copied().collect::<Vec<_>>(), model.clone());
        }
    }
}
