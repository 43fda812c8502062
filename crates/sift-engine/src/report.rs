//! Diagnostic reporting
//!
//! Renders lint diagnostics and parse errors with source context through
//! codespan-reporting, or as JSON for editors and CI.

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label, Severity as CsSeverity};
use codespan_reporting::files::{self, SimpleFiles};
use codespan_reporting::term;
use codespan_reporting::term::termcolor::WriteColor;
use serde::Serialize;

use crate::linter::{LintDiagnostic, LintResult, Severity};
use crate::syntax::{LineIndex, ParseError};

/// Code attached to parse error diagnostics.
pub const PARSE_ERROR_CODE: &str = "E0001";

/// Convert a lint diagnostic into a codespan diagnostic for `file_id`.
///
/// Each fix becomes a `help:` note so the terminal output lists the
/// available actions.
pub fn lint_diagnostic(diag: &LintDiagnostic, file_id: usize) -> CsDiagnostic<usize> {
    let severity = match diag.severity {
        Severity::Info => CsSeverity::Note,
        Severity::Warning => CsSeverity::Warning,
        Severity::Error => CsSeverity::Error,
    };
    let mut notes = diag.notes.clone();
    notes.extend(diag.fixes.iter().map(|f| format!("help: {}", f.title)));

    CsDiagnostic::new(severity)
        .with_message(diag.message.clone())
        .with_code(diag.code)
        .with_labels(vec![
            Label::primary(file_id, diag.span.start..diag.span.end).with_message(diag.rule)
        ])
        .with_notes(notes)
}

/// Convert a parse error into a codespan diagnostic for `file_id`.
pub fn parse_error(error: &ParseError, file_id: usize) -> CsDiagnostic<usize> {
    let span = error.span();
    CsDiagnostic::error()
        .with_message(error.to_string())
        .with_code(PARSE_ERROR_CODE)
        .with_labels(vec![Label::primary(file_id, span.start..span.end)])
}

/// Source files plus rendering configuration.
pub struct Reporter {
    files: SimpleFiles<String, String>,
    config: term::Config,
}

impl Reporter {
    pub fn new() -> Self {
        Self {
            files: SimpleFiles::new(),
            config: term::Config::default(),
        }
    }

    /// Register a file and return its id.
    pub fn add_file(&mut self, path: impl Into<String>, source: impl Into<String>) -> usize {
        self.files.add(path.into(), source.into())
    }

    /// Write parse errors, then lint diagnostics, for one file.
    pub fn emit(
        &self,
        writer: &mut dyn WriteColor,
        file_id: usize,
        result: &LintResult,
    ) -> Result<(), files::Error> {
        for error in &result.parse_errors {
            term::emit(writer, &self.config, &self.files, &parse_error(error, file_id))?;
        }
        for diag in &result.diagnostics {
            term::emit(writer, &self.config, &self.files, &lint_diagnostic(diag, file_id))?;
        }
        Ok(())
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

/// JSON report for one file.
#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub file: String,
    pub diagnostics: Vec<JsonDiagnostic>,
    pub parse_errors: Vec<JsonParseError>,
}

/// JSON representation of a lint diagnostic.
#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    pub code: &'static str,
    pub rule: &'static str,
    pub severity: Severity,
    pub message: String,
    pub span: JsonSpan,
    pub notes: Vec<String>,
    pub fixes: Vec<JsonFix>,
}

#[derive(Debug, Serialize)]
pub struct JsonParseError {
    pub message: String,
    pub span: JsonSpan,
}

/// Byte range plus the 1-based line/column of its start.
#[derive(Debug, Serialize)]
pub struct JsonSpan {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Serialize)]
pub struct JsonFix {
    pub id: &'static str,
    pub title: String,
}

impl JsonReport {
    /// Build a report for `result`, which was produced from `source`.
    pub fn new(result: &LintResult, source: &str) -> Self {
        let lines = LineIndex::new(source);
        let span = |start: usize, end: usize| {
            let pos = lines.line_col(source, start);
            JsonSpan {
                start,
                end,
                line: pos.line,
                column: pos.column,
            }
        };

        let diagnostics = result
            .diagnostics
            .iter()
            .map(|d| JsonDiagnostic {
                code: d.code,
                rule: d.rule,
                severity: d.severity,
                message: d.message.clone(),
                span: span(d.span.start, d.span.end),
                notes: d.notes.clone(),
                fixes: d
                    .fixes
                    .iter()
                    .map(|f| JsonFix {
                        id: f.id,
                        title: f.title.clone(),
                    })
                    .collect(),
            })
            .collect();

        let parse_errors = result
            .parse_errors
            .iter()
            .map(|e| JsonParseError {
                message: e.to_string(),
                span: span(e.span().start, e.span().end),
            })
            .collect();

        Self {
            file: result.file_path.clone(),
            diagnostics,
            parse_errors,
        }
    }
}

/// Serialize reports for several files as one pretty-printed JSON array.
pub fn to_json(reports: &[JsonReport]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(reports)
}

#[cfg(test)]
mod tests {
    use codespan_reporting::term::termcolor::NoColor;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::linter::Linter;

    const SOURCE: &str = "class C {\n    void M() {\n        try { } catch (Exception ex) { throw ex; }\n    }\n}\n";

    #[test]
    fn test_fixes_become_help_notes() {
        let result = Linter::new().lint_source(SOURCE, "a.cs");
        let diag = lint_diagnostic(&result.diagnostics[0], 0);
        assert_eq!(diag.severity, CsSeverity::Error);
        assert_eq!(diag.code.as_deref(), Some("S2001"));
        assert_eq!(
            diag.notes,
            vec![
                "help: Rethrow with `throw;`".to_string(),
                "help: Throw a new exception with the caught one as inner".to_string(),
            ]
        );
    }

    #[test]
    fn test_emit_renders_source_context() {
        let result = Linter::new().lint_source(SOURCE, "a.cs");
        let mut reporter = Reporter::new();
        let file_id = reporter.add_file("a.cs", SOURCE);

        let mut out = NoColor::new(Vec::new());
        reporter.emit(&mut out, file_id, &result).unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();
        assert!(text.contains("error[S2001]"));
        assert!(text.contains("a.cs:3:40"));
        assert!(text.contains("throw ex;"));
    }

    #[test]
    fn test_emit_includes_parse_errors() {
        let source = "class C { void M() { Run( } }";
        let result = Linter::new().lint_source(source, "b.cs");
        let mut reporter = Reporter::new();
        let file_id = reporter.add_file("b.cs", source);

        let mut out = NoColor::new(Vec::new());
        reporter.emit(&mut out, file_id, &result).unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();
        assert!(text.contains("error[E0001]"));
    }

    #[test]
    fn test_json_report() {
        let result = Linter::new().lint_source(SOURCE, "a.cs");
        let report = JsonReport::new(&result, SOURCE);
        let text = to_json(&[report]).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(json[0]["file"], "a.cs");
        let diag = &json[0]["diagnostics"][0];
        assert_eq!(diag["code"], "S2001");
        assert_eq!(diag["rule"], "unsafe-rethrow");
        assert_eq!(diag["severity"], "error");
        assert_eq!(diag["span"]["line"], 3);
        assert_eq!(diag["span"]["column"], 40);
        assert_eq!(diag["fixes"][0]["id"], "bare-rethrow");
        assert_eq!(diag["fixes"][1]["id"], "wrap-inner");
    }
}
