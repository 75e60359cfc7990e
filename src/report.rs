//! Human-readable rendering of parse errors and lint findings.
//!
//! Both are turned into [`miette::Diagnostic`]s carrying the source text, then rendered with the
//! graphical handler (no colors) so they can go straight to a terminal or a test assertion.

use std::fmt;

use jsast_syntax::ast::Span;
use jsast_syntax::diagnostics::ParseError;
use jsast_syntax::lines::LineIndex;
use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme, LabeledSpan, NamedSource, SourceCode, SourceSpan};
use thiserror::Error;

use crate::lint::{Finding, Severity};

/// A syntax error with its source.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(jsast::syntax))]
pub struct SyntaxReport {
    message: String,
    #[source_code]
    source_code: NamedSource<String>,
    #[label("here")]
    span: SourceSpan,
    #[help]
    help: Option<String>,
}

impl SyntaxReport {
    pub fn new(error: &ParseError, file: &str, source: &str) -> Self {
        let help = error
            .is_end_of_input()
            .then(|| "the file ends before this construct is complete".to_string());
        Self {
            message: error.message.clone(),
            source_code: NamedSource::new(file, source.to_string()),
            span: source_span(error.span, source),
            help,
        }
    }
}

/// A lint finding with its source.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct FindingReport {
    message: String,
    source_code: NamedSource<String>,
    span: SourceSpan,
    rule: String,
    severity: miette::Severity,
}

impl FindingReport {
    pub fn new(finding: &Finding, file: &str, source: &str) -> Self {
        let severity = match finding.severity {
            Severity::Info => miette::Severity::Advice,
            Severity::Warning => miette::Severity::Warning,
            Severity::Error => miette::Severity::Error,
        };
        Self {
            message: finding.message.clone(),
            source_code: NamedSource::new(file, source.to_string()),
            span: source_span(finding.span, source),
            rule: finding.rule.to_string(),
            severity,
        }
    }
}

impl Diagnostic for FindingReport {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.rule))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(self.severity)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(&self.source_code)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let label = LabeledSpan::new_with_span(Some(self.rule.clone()), self.span);
        Some(Box::new(std::iter::once(label)))
    }
}

fn source_span(span: Span, source: &str) -> SourceSpan {
    let start = span.start.min(source.len());
    let end = span.end.clamp(start, source.len());
    (start, end - start).into()
}

/// Render any diagnostic without colors.
pub fn render(diagnostic: &dyn Diagnostic) -> String {
    let mut out = String::new();
    let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());
    if handler.render_report(&mut out, diagnostic).is_err() {
        return diagnostic.to_string();
    }
    out
}

/// One-line `file:line:col: severity: message [rule]` form of a finding.
pub fn finding_line(finding: &Finding, file: &str, lines: &LineIndex) -> String {
    let at = lines.line_column(finding.span.start);
    format!(
        "{file}:{}:{}: {}: {} [{}]",
        at.line,
        at.column + 1,
        finding.severity,
        finding.message,
        finding.rule
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::AstParser;

    #[test]
    fn test_syntax_report_mentions_message_and_file() {
        let source = "var = 1;";
        let tree = AstParser::new().parse(source, "bad.js");
        let rendered = render(&SyntaxReport::new(&tree.errors[0], "bad.js", source));
        assert!(rendered.contains("bad.js"));
        assert!(rendered.contains(&tree.errors[0].message));
        assert!(rendered.contains("jsast::syntax"));
    }

    #[test]
    fn test_end_of_input_gets_help() {
        let source = "foo(";
        let tree = AstParser::new().parse(source, "eoi.js");
        let report = SyntaxReport::new(&tree.errors[0], "eoi.js", source);
        assert!(report.help.is_some());
    }

    #[test]
    fn test_finding_line_format() {
        let source = "function f() {\n  return;\n  g();\n}";
        let tree = AstParser::new().parse(source, "f.js");
        let findings = crate::lint::lint(&tree, &crate::lint::default_rules());
        let line = finding_line(&findings[0], "f.js", &LineIndex::new(source));
        assert_eq!(line, "f.js:3:3: warning: Unreachable code. [no-unreachable]");
    }

    #[test]
    fn test_finding_report_uses_rule_as_code() {
        let source = "{ return; g(); }";
        let tree = AstParser::new().parse(source, "f.js");
        let findings = crate::lint::lint(&tree, &crate::lint::default_rules());
        let report = FindingReport::new(&findings[0], "f.js", source);
        assert_eq!(report.severity(), Some(miette::Severity::Warning));
        assert!(render(&report).contains("no-unreachable"));
    }

    #[test]
    fn test_span_is_clamped_to_source() {
        let span = source_span(Span::new(3, 10), "abcd");
        assert_eq!(span.offset(), 3);
        assert_eq!(span.len(), 1);
    }
}
