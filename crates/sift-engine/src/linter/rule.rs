//! Lint rule trait and supporting types.
//!
//! Each lint rule implements `LintRule`: static metadata (`RuleMeta`) naming
//! the node kinds that trigger it, and a `check` method that inspects one
//! such node and returns at most one diagnostic.

use std::fmt;

use serde::Serialize;

use crate::syntax::{NodeId, Span, SyntaxKind, SyntaxTree, TreeId};

/// Severity of a diagnostic. Fixed per rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational.
    Info,
    /// Reported, does not affect exit code.
    Warning,
    /// A defect; causes a non-zero exit code.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// Category of a lint rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Likely bugs or lost information.
    Correctness,
    /// Avoidable work at runtime.
    Performance,
    /// Language idioms and recommended patterns.
    BestPractice,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Correctness => "correctness",
            Category::Performance => "performance",
            Category::BestPractice => "best-practice",
        })
    }
}

/// Static metadata for a lint rule.
pub struct RuleMeta {
    /// Rule name, e.g. "unsafe-rethrow".
    pub name: &'static str,
    /// Stable code, e.g. "S2001".
    pub code: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// Category.
    pub category: Category,
    /// Severity of every diagnostic the rule emits.
    pub default_severity: Severity,
    /// Node kinds the rule is invoked for.
    pub triggers: &'static [SyntaxKind],
    /// Whether the rule offers fixes.
    pub fixable: bool,
}

/// Read-only context passed to each rule.
#[derive(Clone, Copy)]
pub struct LintContext<'a> {
    /// The tree being linted.
    pub tree: &'a SyntaxTree,
    /// Path of the file being linted.
    pub file_path: &'a str,
}

/// The transformation behind a fix, with the node ids it operates on.
///
/// Ids refer to the tree named by [`LintFix::tree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixAction {
    /// Replace `terminal_call` (`x.Where(p).First()`) with `x.First(p)`.
    MovePredicateIntoTerminal {
        /// The `Where(..)` invocation.
        filter_call: NodeId,
        /// The invocation consuming it.
        terminal_call: NodeId,
    },
    /// Replace `throw ex;` with `throw;`.
    BareRethrow {
        /// The throw statement.
        throw_stmt: NodeId,
    },
    /// Replace `throw ex;` with `throw new Exception("..", ex);`.
    WrapInInnerException {
        /// The throw statement.
        throw_stmt: NodeId,
        /// Name of the caught exception variable.
        binding: String,
    },
}

/// A named, independently selectable fix for one diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintFix {
    /// Stable id, e.g. "bare-rethrow".
    pub id: &'static str,
    /// User-facing title.
    pub title: String,
    /// What applying the fix does.
    pub action: FixAction,
    /// The tree the action's node ids belong to.
    pub tree: TreeId,
}

/// A single lint diagnostic emitted by a rule.
#[derive(Debug, Clone)]
pub struct LintDiagnostic {
    /// Rule name (e.g. "redundant-filter").
    pub rule: &'static str,
    /// Rule code (e.g. "S1001").
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Source location.
    pub span: Span,
    /// Severity level.
    pub severity: Severity,
    /// Available fixes; empty when the rule cannot fix this occurrence.
    pub fixes: Vec<LintFix>,
    /// Additional notes.
    pub notes: Vec<String>,
}

impl LintDiagnostic {
    /// Diagnostic for `meta` at `span` with no fixes or notes.
    pub fn new(meta: &RuleMeta, message: impl Into<String>, span: Span) -> Self {
        Self {
            rule: meta.name,
            code: meta.code,
            message: message.into(),
            span,
            severity: meta.default_severity,
            fixes: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Add a fix option.
    pub fn with_fix(mut self, fix: LintFix) -> Self {
        self.fixes.push(fix);
        self
    }

    /// Add a note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Find a fix by id.
    pub fn fix(&self, id: &str) -> Option<&LintFix> {
        self.fixes.iter().find(|f| f.id == id)
    }

    pub fn is_fixable(&self) -> bool {
        !self.fixes.is_empty()
    }
}

/// Trait that every lint rule must implement.
///
/// `check` is called once for every node whose kind is listed in
/// [`RuleMeta::triggers`]. It must be a pure function of the node and the
/// tree: rules are shared across worker threads and invoked in no
/// particular order. "Not this pattern" and "shape I cannot interpret"
/// both return `None`.
pub trait LintRule: Send + Sync {
    /// Static metadata for this rule.
    fn meta(&self) -> &'static RuleMeta;

    /// Check one node.
    fn check(&self, node: NodeId, ctx: &LintContext<'_>) -> Option<LintDiagnostic>;
}
