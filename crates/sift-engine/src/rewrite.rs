//! Minimal-span tree rewriting.
//!
//! A rewrite replaces one element of a [`SyntaxTree`] and produces a new
//! tree. Only the ancestors of the replaced element get new green nodes;
//! every other subtree is shared with the original by reference. The
//! original tree is never touched, so any number of fixes can be computed
//! from it concurrently.

use thiserror::Error;
use tracing::debug;

use crate::linter::rule::{FixAction, LintFix};
use crate::linter::rules::{redundant_filter, unsafe_rethrow};
use crate::syntax::{GreenElement, NodeId, Span, SyntaxKind, SyntaxTree};

/// Why a fix could not be applied. Nothing is edited when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixError {
    /// The fix was computed for a different tree.
    #[error("fix belongs to a different syntax tree")]
    StaleTree,

    /// A node id the fix refers to is not in the tree.
    #[error("node {0} is not part of this tree")]
    NodeNotFound(NodeId),

    /// A node no longer has the shape the fix expects.
    #[error("expected {expected} at {span}, found {found}")]
    UnexpectedShape {
        /// What the fix needs.
        expected: &'static str,
        /// What is there.
        found: SyntaxKind,
        /// Where.
        span: Span,
    },

    /// The rewrite would change the program's meaning.
    #[error("fix cannot be applied safely: {reason}")]
    Precondition {
        /// Explanation for the user.
        reason: String,
    },

    /// The new text differs from the old outside the edited span.
    #[error("rewrite changed text outside {span}")]
    SpanInvariant {
        /// The span the rewrite claimed to touch.
        span: Span,
    },
}

/// One contiguous text replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Replaced range of the old text.
    pub span: Span,
    /// Text that takes its place.
    pub replacement: String,
}

impl TextEdit {
    pub fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() - self.span.len() + self.replacement.len());
        out.push_str(&text[..self.span.start]);
        out.push_str(&self.replacement);
        out.push_str(&text[self.span.end..]);
        out
    }

    /// Shrink the edit to the region where `old` (the text at `span`) and
    /// the replacement actually differ.
    fn narrowed(span: Span, old: &str, new: &str) -> TextEdit {
        let mut prefix = old
            .bytes()
            .zip(new.bytes())
            .take_while(|(a, b)| a == b)
            .count();
        while !old.is_char_boundary(prefix) {
            prefix -= 1;
        }

        let max_suffix = old.len().min(new.len()) - prefix;
        let mut suffix = old
            .bytes()
            .rev()
            .zip(new.bytes().rev())
            .take(max_suffix)
            .take_while(|(a, b)| a == b)
            .count();
        while !old.is_char_boundary(old.len() - suffix) || !new.is_char_boundary(new.len() - suffix) {
            suffix -= 1;
        }

        TextEdit {
            span: Span::new(span.start + prefix, span.end - suffix),
            replacement: new[prefix..new.len() - suffix].to_string(),
        }
    }
}

/// Result of a rewrite: the new tree and the single text region it changed.
#[derive(Debug)]
pub struct Rewrite {
    pub tree: SyntaxTree,
    pub edit: TextEdit,
}

impl Rewrite {
    pub fn text(&self) -> &str {
        self.tree.text()
    }
}

/// Replace `target` with `replacement`, rebuilding only its ancestor chain.
pub fn replace_node(
    tree: &SyntaxTree,
    target: NodeId,
    replacement: GreenElement,
) -> Result<Rewrite, FixError> {
    if !tree.contains(target) {
        return Err(FixError::NodeNotFound(target));
    }

    let old_span = tree.span(target);
    let replacement_text = replacement.to_string();

    let mut current = target;
    let mut green = replacement;
    while let Some(parent) = tree.parent(current) {
        let Some(parent_green) = tree.green(parent).as_node() else {
            return Err(FixError::UnexpectedShape {
                expected: "node",
                found: tree.kind(parent),
                span: tree.span(parent),
            });
        };
        green = parent_green
            .replace_child(tree.index_in_parent(current), green)
            .into();
        current = parent;
    }

    let GreenElement::Node(root) = green else {
        return Err(FixError::UnexpectedShape {
            expected: "node",
            found: green.kind(),
            span: old_span,
        });
    };
    let new_tree = SyntaxTree::new(root);

    let edit = TextEdit::narrowed(old_span, tree.node_text(target), &replacement_text);
    if edit.apply(tree.text()) != new_tree.text() {
        return Err(FixError::SpanInvariant { span: old_span });
    }

    debug!(
        target = %tree.kind(target),
        span = %edit.span,
        removed = edit.span.len(),
        inserted = edit.replacement.len(),
        "rewrote node"
    );
    Ok(Rewrite {
        tree: new_tree,
        edit,
    })
}

/// Apply `fix` to the tree it was computed for.
pub fn apply_fix(tree: &SyntaxTree, fix: &LintFix) -> Result<Rewrite, FixError> {
    if fix.tree != tree.id() {
        return Err(FixError::StaleTree);
    }
    match &fix.action {
        FixAction::MovePredicateIntoTerminal {
            filter_call,
            terminal_call,
        } => redundant_filter::move_predicate(tree, *filter_call, *terminal_call),
        FixAction::BareRethrow { throw_stmt } => unsafe_rethrow::bare_rethrow(tree, *throw_stmt),
        FixAction::WrapInInnerException {
            throw_stmt,
            binding,
        } => unsafe_rethrow::wrap_in_inner_exception(tree, *throw_stmt, binding),
    }
}

/// Check that `id` exists in `tree` and has `kind`.
pub(crate) fn expect_kind(
    tree: &SyntaxTree,
    id: NodeId,
    kind: SyntaxKind,
    expected: &'static str,
) -> Result<(), FixError> {
    if !tree.contains(id) {
        return Err(FixError::NodeNotFound(id));
    }
    if tree.kind(id) != kind {
        return Err(FixError::UnexpectedShape {
            expected,
            found: tree.kind(id),
            span: tree.span(id),
        });
    }
    Ok(())
}
