//! Integration tests for the jsast parse pipeline, manager and lint rules

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use jsast::ast::{CommentKind, NodeType};
use jsast::diagnostics::ParseErrorKind;
use jsast::files::{FsFile, MemoryFile};
use jsast::lint::{self, Severity};
use jsast::manager::{FileChangedEvent, FileEventKind};
use jsast::pipeline::{Environment, TokenType};
use jsast::{AstManager, AstManagerConfig, AstParser, FileMetadata, LruCache};

fn fixtures(kind: &str) -> Vec<std::path::PathBuf> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(kind);
    let mut paths: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().map(|e| e == "js").unwrap_or(false))
        .collect();
    paths.sort();
    paths
}

/// Test that all valid fixtures parse without errors
#[test]
fn test_valid_fixtures() {
    for path in fixtures("valid") {
        let source = fs::read_to_string(&path).unwrap();
        let tree = AstParser::new().parse(&source, &path.display().to_string());
        assert!(
            tree.errors.is_empty(),
            "{} should parse cleanly, got {:?}",
            path.display(),
            tree.errors
        );
        assert!(!tree.tokens.is_empty());
    }
}

/// Test that invalid fixtures still produce a tree plus errors
#[test]
fn test_invalid_fixtures_recover() {
    for path in fixtures("invalid") {
        let source = fs::read_to_string(&path).unwrap();
        let tree = AstParser::new().parse(&source, &path.display().to_string());
        assert!(!tree.errors.is_empty(), "{} should report errors", path.display());
        assert!(!tree.body().is_empty(), "{} should keep a best-effort tree", path.display());
    }
}

#[test]
fn test_require_array_dependencies() {
    let tree = AstParser::new().parse("require(['a/b', 'c']);", "r.js");
    assert_eq!(tree.dependencies, vec!["a/b", "c"]);
    assert_eq!(tree.environments.iter().copied().collect::<Vec<_>>(), vec![Environment::Node]);
}

#[test]
fn test_define_with_id_dependencies() {
    let tree = AstParser::new().parse("define('id', ['x'], function(x){});", "d.js");
    assert_eq!(tree.dependencies, vec!["x"]);
    assert_eq!(tree.environments.iter().copied().collect::<Vec<_>>(), vec![Environment::Amd]);
}

#[test]
fn test_amd_fixture_annotations() {
    let source = fs::read_to_string(Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/valid/amd_module.js")).unwrap();
    let tree = AstParser::new().parse(&source, "amd_module.js");
    assert_eq!(tree.dependencies, vec!["app/util", "app/view"]);
    assert!(tree.has_environment(Environment::Amd));
    assert_eq!(tree.comments.len(), 2);
    assert_eq!(tree.comments[0].kind, CommentKind::Block);
    assert_eq!(tree.comments[1].kind, CommentKind::Line);
    // The module comment leads the `define(...)` statement.
    assert_eq!(tree.body()[0].leading_comments.len(), 1);
}

#[test]
fn test_dependencies_survive_strict_failure() {
    let tree = AstParser::new().parse("require(['a', 'b']);\nfunction broken() {\n\tfoo(1, 2\n}\n", "x.js");
    assert_eq!(tree.dependencies, vec!["a", "b"]);
    assert_eq!(tree.errors.len(), 1);
}

#[test]
fn test_unreachable_after_return() {
    let source = "function f(){ return 1; var x=2; console.log(x); }";
    let tree = AstParser::new().parse(source, "u.js");
    let findings = lint::lint(&tree, &lint::default_rules());
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].message, "Unreachable code.");
    assert_eq!(findings[0].severity, Severity::Warning);
    assert_eq!(&source[findings[0].span.start..findings[0].span.end], "console.log(x);");
}

#[test]
fn test_unterminated_block_comment_at_end() {
    let source = "var x = 1;\n/* abc";
    let tree = AstParser::new().parse(source, "c.js");
    assert_eq!(tree.comments.len(), 1);
    assert_eq!(tree.comments[0].span.end, source.len());
    assert_eq!(tree.comments[0].text, " abc");
    assert_eq!(tree.errors.len(), 1);
    assert_eq!(tree.errors[0].kind, ParseErrorKind::EndOfInput);
}

#[test]
fn test_token_classification() {
    let tree = AstParser::new().parse("if (a === true) x = null; else y = 0x1F + 'z';", "t.js");
    let kinds: HashSet<TokenType> = tree.tokens.iter().map(|t| t.token_type).collect();
    for expected in [
        TokenType::Keyword,
        TokenType::Identifier,
        TokenType::Boolean,
        TokenType::Null,
        TokenType::Numeric,
        TokenType::String,
        TokenType::Punctuator,
    ] {
        assert!(kinds.contains(&expected), "missing {expected}");
    }
    let hex = tree.tokens.iter().find(|t| t.token_type == TokenType::Numeric && t.value == "0x1F");
    assert!(hex.is_some());
}

#[test]
fn test_lru_scenario() {
    let mut cache = LruCache::new(2);
    cache.put("A", 1);
    cache.put("B", 2);
    cache.get(&"A");
    cache.put("C", 3);
    assert!(!cache.contains(&"B"));
    assert!(cache.contains(&"A"));
    assert!(cache.contains(&"C"));
}

#[test]
fn test_tree_serializes_with_estree_names() {
    let tree = AstParser::new().parse("// hi\nfoo(1);", "s.js");
    let json = serde_json::to_value(&tree).unwrap();
    assert_eq!(json["type"], "Program");
    assert_eq!(json["sourceFile"], "s.js");
    assert_eq!(json["comments"][0]["type"], "Line");
    assert_eq!(json["tokens"][0]["type"], "Identifier");
    assert_eq!(json["body"][0]["expression"]["type"], "CallExpression");
}

#[tokio::test]
async fn test_manager_reads_from_disk_once() {
    let manager = AstManager::default();
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/valid/worker.js");
    let file = FsFile::new(&path);
    let first = manager.get_tree(&file).await.unwrap();
    let second = manager.get_tree(&file).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.dependencies, vec!["lib/a.js", "lib/b.js", "worker/compute.js"]);
}

#[tokio::test]
async fn test_content_change_reparses() {
    let manager = AstManager::new(AstManagerConfig::default().with_cache_capacity(4));
    let metadata = FileMetadata::at("/src/app.js").with_content_type("application/javascript");

    let before = manager
        .get_tree(&MemoryFile::new(Some(metadata.clone()), "require('old');"))
        .await
        .unwrap();
    // Cached: the new text is not looked at until the entry is invalidated.
    let cached = manager
        .get_tree(&MemoryFile::new(Some(metadata.clone()), "require('new');"))
        .await
        .unwrap();
    assert!(Arc::ptr_eq(&before, &cached));

    manager
        .on_file_changed(&FileChangedEvent {
            kind: FileEventKind::ContentChanged,
            files: vec![metadata.clone()],
        })
        .await;
    let after = manager
        .get_tree(&MemoryFile::new(Some(metadata), "require('new');"))
        .await
        .unwrap();
    assert_eq!(after.dependencies, vec!["new"]);
}

#[test]
fn test_loose_tree_contains_recovered_statements() {
    let tree = AstParser::new().parse("var a = ;\nvar b = 2;\nb++;", "l.js");
    let types: Vec<_> = tree.body().iter().map(|s| s.node_type()).collect();
    assert!(types.contains(&NodeType::VariableDeclaration));
    assert_eq!(types.last(), Some(&NodeType::ExpressionStatement));
}

#[test]
fn test_token_dump_snapshot() {
    let tree = AstParser::new().parse("var re = /a+/g; // tail", "snap.js");
    let dump: Vec<String> = tree
        .tokens
        .iter()
        .map(|t| format!("{} {} {}..{}", t.token_type, t.value, t.range.start, t.range.end))
        .collect();
    insta::assert_snapshot!(dump.join("\n"), @r"
    Keyword var 0..3
    Identifier re 4..6
    Punctuator = 7..8
    RegularExpression /a+/g 9..14
    Punctuator ; 14..15
    ");
}
