//! Convert parse errors, lint findings and outlines to LSP types

use tower_lsp::lsp_types::{
    Diagnostic, DiagnosticSeverity, DiagnosticTag, DocumentSymbol, NumberOrString, Position, Range, SymbolKind,
};

use jsast_syntax::diagnostics::ParseError;

use crate::lint::{Finding, Severity};
use crate::outline::{OutlineItem, OutlineKind};

const SOURCE: &str = "jsast";

/// Convert a byte offset to LSP Position (0-based line, UTF-16 character)
pub fn offset_to_position(source: &str, offset: usize) -> Position {
    let offset = offset.min(source.len());
    let mut line = 0u32;
    let mut col = 0u32;

    for (i, c) in source.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            col = 0;
        } else {
            col += c.len_utf16() as u32;
        }
    }

    Position::new(line, col)
}

/// LSP range covering `start..end`, widened to one character when empty
pub fn span_to_range(source: &str, start: usize, end: usize) -> Range {
    let start_pos = offset_to_position(source, start);
    let end_pos = offset_to_position(source, end.max(start + 1));
    Range::new(start_pos, end_pos)
}

/// Convert a ParseError to LSP Diagnostic
pub fn parse_error_to_diagnostic(error: &ParseError, source: &str) -> Diagnostic {
    Diagnostic {
        range: span_to_range(source, error.span.start, error.span.end),
        severity: Some(DiagnosticSeverity::ERROR),
        source: Some(SOURCE.to_string()),
        message: error.message.clone(),
        ..Default::default()
    }
}

fn severity_to_lsp(severity: Severity) -> DiagnosticSeverity {
    match severity {
        Severity::Info => DiagnosticSeverity::INFORMATION,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Error => DiagnosticSeverity::ERROR,
    }
}

/// Convert a lint Finding to LSP Diagnostic
pub fn finding_to_diagnostic(finding: &Finding, source: &str) -> Diagnostic {
    let tags = (finding.rule == "no-unreachable").then(|| vec![DiagnosticTag::UNNECESSARY]);
    Diagnostic {
        range: span_to_range(source, finding.span.start, finding.span.end),
        severity: Some(severity_to_lsp(finding.severity)),
        code: Some(NumberOrString::String(finding.rule.to_string())),
        source: Some(SOURCE.to_string()),
        message: finding.message.clone(),
        tags,
        ..Default::default()
    }
}

/// Convert an outline to nested LSP document symbols
#[allow(deprecated)]
pub fn outline_to_symbols(items: &[OutlineItem], source: &str) -> Vec<DocumentSymbol> {
    items
        .iter()
        .map(|item| {
            let kind = match item.kind {
                OutlineKind::Function => SymbolKind::FUNCTION,
                OutlineKind::Class => SymbolKind::CLASS,
                OutlineKind::Method => SymbolKind::METHOD,
                OutlineKind::Variable => SymbolKind::VARIABLE,
            };
            let children = outline_to_symbols(&item.children, source);
            DocumentSymbol {
                name: item.name.clone(),
                detail: Some(item.detail.clone()),
                kind,
                tags: None,
                deprecated: None,
                range: span_to_range(source, item.span.start, item.span.end),
                selection_range: span_to_range(source, item.selection.start, item.selection.end),
                children: (!children.is_empty()).then_some(children),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::AstParser;

    #[test]
    fn test_offset_to_position() {
        let source = "var a;\nfoo(a);\n";
        assert_eq!(offset_to_position(source, 0), Position::new(0, 0));
        assert_eq!(offset_to_position(source, 7), Position::new(1, 0));
        assert_eq!(offset_to_position(source, 11), Position::new(1, 4));
        assert_eq!(offset_to_position(source, 999), Position::new(2, 0));
    }

    #[test]
    fn test_positions_count_utf16_units() {
        let source = "'😀'; x";
        let offset = source.find('x').unwrap();
        let pos = offset_to_position(source, offset);
        assert_eq!(pos.character, 6);
    }

    #[test]
    fn test_parse_error_diagnostic() {
        let source = "var = 1;";
        let tree = AstParser::new().parse(source, "a.js");
        let diagnostic = parse_error_to_diagnostic(&tree.errors[0], source);
        assert_eq!(diagnostic.severity, Some(DiagnosticSeverity::ERROR));
        assert_eq!(diagnostic.range.start, Position::new(0, 4));
        assert_eq!(diagnostic.source.as_deref(), Some("jsast"));
    }

    #[test]
    fn test_unreachable_is_tagged_unnecessary() {
        let source = "{ return; a(); }";
        let tree = AstParser::new().parse(source, "a.js");
        let findings = crate::lint::lint(&tree, &crate::lint::default_rules());
        let diagnostic = finding_to_diagnostic(&findings[0], source);
        assert_eq!(diagnostic.tags, Some(vec![DiagnosticTag::UNNECESSARY]));
        assert_eq!(diagnostic.code, Some(NumberOrString::String("no-unreachable".to_string())));
    }
}
