//! Sift Engine
//!
//! Static analysis for C# source with automated, minimal-span fixes.
//!
//! This crate provides:
//! - A lossless syntax tree and an error-tolerant parser
//! - A rule registry with two built-in rules: redundant `Where` filters and
//!   rethrowing a caught exception by name
//! - A rewrite engine whose edits touch only the targeted span
//! - A diagnostic sink, a concurrent batch driver, and codespan/JSON reporting
//!
//! # Usage
//!
//! ```ignore
//! use sift_engine::linter::{Linter, SourceFile};
//! use sift_engine::rewrite::apply_fix;
//!
//! let linter = Linter::new();
//! let linted = linter.lint_file(&SourceFile::new("Program.cs", source));
//! for diag in &linted.result.diagnostics {
//!     if let Some(fix) = diag.fixes.first() {
//!         let rewrite = apply_fix(&linted.tree, fix)?;
//!         println!("{}", rewrite.text());
//!     }
//! }
//! ```

pub mod linter;
pub mod report;
pub mod rewrite;
pub mod syntax;

pub use linter::{
    Driver, FixOutcome, LintConfig, LintDiagnostic, LintFix, LintResult, LintRule, LintedFile,
    Linter, RuleRegistry, Severity, SourceFile,
};
pub use rewrite::{apply_fix, FixError, Rewrite, TextEdit};
pub use syntax::{parse, Span, SyntaxKind, SyntaxTree};
