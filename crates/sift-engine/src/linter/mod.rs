//! Sift linter
//!
//! Rule-based analysis of C# syntax trees, with automated fixes.
//!
//! # Architecture
//!
//! - Each rule implements [`LintRule`], declares the node kinds that trigger
//!   it, and inspects one node at a time.
//! - A [`RuleRegistry`] maps node kinds to rules. The
//!   [`LintRunner`](runner::LintRunner) walks a tree once and dispatches each
//!   node to the rules registered for its kind, submitting results to a
//!   [`DiagnosticSink`].
//! - [`Linter`] is the entry point for one tree; [`Driver`] lints many files
//!   on a worker pool.
//! - Fixes are applied with [`apply_fix`](crate::rewrite::apply_fix), or
//!   repeatedly with [`Linter::fix_all`].
//!
//! # Example
//!
//! ```ignore
//! use sift_engine::linter::Linter;
//!
//! let linter = Linter::new();
//! let result = linter.lint_source("class C { void M() { try { } catch (Exception e) { throw e; } } }", "a.cs");
//! for d in &result.diagnostics {
//!     println!("[{}] {}: {}", d.code, d.rule, d.message);
//! }
//! ```

pub mod config;
mod driver;
pub mod registry;
pub mod rule;
pub mod rules;
mod runner;
pub mod sink;

pub use config::{ConfigError, LintConfig, RuleSetting};
pub use driver::Driver;
pub use registry::RuleRegistry;
pub use rule::{
    Category, FixAction, LintContext, LintDiagnostic, LintFix, LintRule, RuleMeta, Severity,
};
pub use sink::DiagnosticSink;

use tracing::{debug, warn};

use crate::rewrite::{apply_fix, FixError};
use crate::syntax::{parse, ParseError, SyntaxTree};
use runner::LintRunner;

/// Upper bound on fix passes over one file.
const MAX_FIX_PASSES: usize = 256;

/// A file to lint.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path used in diagnostics.
    pub path: String,
    /// Full source text.
    pub text: String,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// Result of linting a single file.
#[derive(Debug)]
pub struct LintResult {
    /// Diagnostics ordered by position, then rule code.
    pub diagnostics: Vec<LintDiagnostic>,
    /// File path that was linted.
    pub file_path: String,
    /// Number of diagnostics that offer at least one fix.
    pub fixable_count: usize,
    /// Syntax the parser could not make sense of. Rules still ran on the
    /// rest of the tree.
    pub parse_errors: Vec<ParseError>,
}

impl LintResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}

/// A linted file together with the tree its fixes refer to.
#[derive(Debug)]
pub struct LintedFile {
    pub tree: SyntaxTree,
    pub result: LintResult,
}

/// A fix applied by [`Linter::fix_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedFix {
    /// Code of the rule whose diagnostic was fixed.
    pub code: &'static str,
    /// Fix id, e.g. "bare-rethrow".
    pub fix_id: &'static str,
    /// Diagnostic message.
    pub message: String,
}

/// Outcome of [`Linter::fix_all`].
#[derive(Debug)]
pub struct FixOutcome {
    /// Text after all fixes.
    pub text: String,
    /// Fixes in the order they were applied.
    pub applied: Vec<AppliedFix>,
    /// Lint result for the final text.
    pub remaining: LintResult,
}

impl FixOutcome {
    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// The Sift linter. Holds the rule registry and configuration.
pub struct Linter {
    registry: RuleRegistry,
    config: LintConfig,
}

impl Linter {
    /// Create a linter with all built-in rules.
    pub fn new() -> Self {
        Self::with_config(LintConfig::new())
    }

    /// Create a linter honouring `config`.
    pub fn with_config(config: LintConfig) -> Self {
        Self {
            registry: RuleRegistry::with_config(&config),
            config,
        }
    }

    /// Create a linter with an explicit set of rules.
    pub fn with_registry(registry: RuleRegistry) -> Self {
        Self {
            registry,
            config: LintConfig::new(),
        }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn config(&self) -> &LintConfig {
        &self.config
    }

    /// Lint an already parsed tree.
    pub fn lint_tree(&self, tree: &SyntaxTree, file_path: &str) -> LintResult {
        let sink = DiagnosticSink::new();
        let ctx = LintContext { tree, file_path };
        LintRunner::new(&self.registry, ctx, &sink).run();

        let diagnostics = sink.drain();
        let fixable_count = diagnostics.iter().filter(|d| d.is_fixable()).count();
        debug!(
            file = file_path,
            diagnostics = diagnostics.len(),
            fixable = fixable_count,
            "linted tree"
        );

        LintResult {
            diagnostics,
            file_path: file_path.to_string(),
            fixable_count,
            parse_errors: Vec::new(),
        }
    }

    /// Parse and lint, keeping the tree so fixes can be applied.
    pub fn lint_file(&self, file: &SourceFile) -> LintedFile {
        let parse = parse(&file.text);
        let mut result = self.lint_tree(&parse.tree, &file.path);
        result.parse_errors = parse.errors;
        LintedFile {
            tree: parse.tree,
            result,
        }
    }

    /// Convenience: parse source code and lint it.
    ///
    /// The tree is dropped, so the returned fixes cannot be applied; use
    /// [`lint_file`](Self::lint_file) for that.
    pub fn lint_source(&self, source: &str, file_path: &str) -> LintResult {
        self.lint_file(&SourceFile::new(file_path, source)).result
    }

    /// Apply fixes until none is left to choose.
    ///
    /// Each pass lints the current tree and applies the first fix that can
    /// be chosen without asking: the only fix of a diagnostic, or else the
    /// first fix whose id appears in `preference` (earlier ids win). The
    /// rewritten tree is linted again directly, without re-parsing.
    pub fn fix_all(
        &self,
        source: &str,
        file_path: &str,
        preference: &[&str],
    ) -> Result<FixOutcome, FixError> {
        let parse = parse(source);
        let parse_errors = parse.errors;
        let mut tree = parse.tree;
        let mut applied = Vec::new();

        for _ in 0..MAX_FIX_PASSES {
            let result = self.lint_tree(&tree, file_path);
            let Some((diagnostic, fix)) = result
                .diagnostics
                .iter()
                .find_map(|d| choose_fix(d, preference).map(|f| (d, f)))
            else {
                return Ok(FixOutcome {
                    text: tree.text().to_string(),
                    applied,
                    remaining: LintResult {
                        parse_errors,
                        ..result
                    },
                });
            };

            let rewrite = apply_fix(&tree, fix)?;
            debug!(
                file = file_path,
                code = diagnostic.code,
                fix = fix.id,
                span = %rewrite.edit.span,
                "applied fix"
            );
            applied.push(AppliedFix {
                code: diagnostic.code,
                fix_id: fix.id,
                message: diagnostic.message.clone(),
            });
            tree = rewrite.tree;
        }

        warn!(file = file_path, passes = MAX_FIX_PASSES, "fix passes exhausted");
        let mut remaining = self.lint_tree(&tree, file_path);
        remaining.parse_errors = parse_errors;
        Ok(FixOutcome {
            text: tree.text().to_string(),
            applied,
            remaining,
        })
    }
}

impl Default for Linter {
    fn default() -> Self {
        Self::new()
    }
}

/// The fix to apply for `diagnostic` without user input, if any.
fn choose_fix<'d>(diagnostic: &'d LintDiagnostic, preference: &[&str]) -> Option<&'d LintFix> {
    if let [only] = diagnostic.fixes.as_slice() {
        return Some(only);
    }
    preference.iter().find_map(|id| diagnostic.fix(id))
}
