//! Rule: unsafe-rethrow (S2001)
//!
//! Flags `throw ex;` inside `catch (Exception ex)`. Throwing the caught
//! object by name resets its stack trace. Two fixes are offered and neither
//! is preferred: a bare `throw;`, or a new exception that carries the caught
//! one as its inner exception.
//!
//! Identity is syntactic: the thrown identifier must spell the binding of
//! the nearest enclosing catch clause.

use crate::linter::rule::*;
use crate::rewrite::{self, FixError, Rewrite};
use crate::syntax::ast::{CatchClause, IdentifierName, ThrowStatement};
use crate::syntax::{make, GreenNode, GreenToken, NodeId, SyntaxKind, SyntaxTree};

pub struct UnsafeRethrow;

static META: RuleMeta = RuleMeta {
    name: "unsafe-rethrow",
    code: "S2001",
    description: "Disallow rethrowing a caught exception by name",
    category: Category::Correctness,
    default_severity: Severity::Error,
    triggers: &[SyntaxKind::ThrowStatement],
    fixable: true,
};

/// Exception type constructed by the wrapping fix.
const WRAPPER_EXCEPTION: &str = "Exception";
/// Placeholder message for the wrapping fix.
const WRAPPER_MESSAGE: &str = "some reason to rethrow";

/// A `throw name;` whose operand is the enclosing catch's binding.
struct Rethrow<'t> {
    throw: ThrowStatement<'t>,
    operand: IdentifierName<'t>,
}

fn match_rethrow(tree: &SyntaxTree, node: NodeId) -> Option<Rethrow<'_>> {
    let throw = ThrowStatement::cast(tree, node)?;
    let operand = IdentifierName::cast(tree, throw.expression()?)?;
    let clause = tree.first_ancestor_of_kind(node, SyntaxKind::CatchClause)?;
    let binding = CatchClause::cast(tree, clause)?.binding_name()?;
    (operand.name() == binding).then_some(Rethrow { throw, operand })
}

impl LintRule for UnsafeRethrow {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn check(&self, node: NodeId, ctx: &LintContext<'_>) -> Option<LintDiagnostic> {
        let tree = ctx.tree;
        let rethrow = match_rethrow(tree, node)?;

        let mut diagnostic = LintDiagnostic::new(
            &META,
            "Don't throw the same exception you caught, you lose the original stack trace.",
            rethrow.throw.span(),
        );

        // A statement missing its keyword or `;` came from a parse error;
        // report it but leave it alone.
        if rethrow.throw.throw_keyword().is_none() || rethrow.throw.semicolon().is_none() {
            return Some(diagnostic);
        }

        diagnostic = diagnostic
            .with_fix(LintFix {
                id: "bare-rethrow",
                title: "Rethrow with `throw;`".to_string(),
                action: FixAction::BareRethrow { throw_stmt: node },
                tree: tree.id(),
            })
            .with_fix(LintFix {
                id: "wrap-inner",
                title: "Throw a new exception with the caught one as inner".to_string(),
                action: FixAction::WrapInInnerException {
                    throw_stmt: node,
                    binding: rethrow.operand.name().to_string(),
                },
                tree: tree.id(),
            });
        Some(diagnostic)
    }
}

/// The `throw` keyword and `;` of a matched statement, for reuse.
fn statement_tokens(
    tree: &SyntaxTree,
    throw_stmt: NodeId,
) -> Result<(Rethrow<'_>, GreenToken, GreenToken), FixError> {
    rewrite::expect_kind(tree, throw_stmt, SyntaxKind::ThrowStatement, "throw statement")?;
    let rethrow = match_rethrow(tree, throw_stmt).ok_or_else(|| FixError::Precondition {
        reason: "the statement no longer rethrows the caught exception".into(),
    })?;

    let token = |id: Option<NodeId>, expected: &'static str| {
        id.and_then(|id| tree.green(id).as_token().cloned())
            .ok_or(FixError::UnexpectedShape {
                expected,
                found: SyntaxKind::ThrowStatement,
                span: tree.span(throw_stmt),
            })
    };
    let keyword = token(rethrow.throw.throw_keyword(), "`throw` keyword")?;
    let semicolon = token(rethrow.throw.semicolon(), "`;`")?;
    Ok((rethrow, keyword, semicolon))
}

/// Replace `throw ex;` with `throw;`.
pub(crate) fn bare_rethrow(tree: &SyntaxTree, throw_stmt: NodeId) -> Result<Rewrite, FixError> {
    let (_, keyword, semicolon) = statement_tokens(tree, throw_stmt)?;
    let replacement = make::throw_statement(keyword, None, semicolon);
    rewrite::replace_node(tree, throw_stmt, replacement.into())
}

/// Replace `throw ex;` with `throw new Exception("some reason to rethrow", ex);`.
pub(crate) fn wrap_in_inner_exception(
    tree: &SyntaxTree,
    throw_stmt: NodeId,
    binding: &str,
) -> Result<Rewrite, FixError> {
    let (rethrow, keyword, semicolon) = statement_tokens(tree, throw_stmt)?;
    if rethrow.operand.name() != binding {
        return Err(FixError::Precondition {
            reason: format!(
                "expected to rethrow `{}`, found `{}`",
                binding,
                rethrow.operand.name()
            ),
        });
    }

    let inner: GreenNode = match tree.green(rethrow.operand.id()).as_node() {
        Some(node) => node.clone(),
        None => make::identifier_name(binding),
    };
    let creation = make::object_creation(
        WRAPPER_EXCEPTION,
        vec![make::string_literal(WRAPPER_MESSAGE), inner],
    );
    let replacement = make::throw_statement(keyword, Some(creation), semicolon);
    rewrite::replace_node(tree, throw_stmt, replacement.into())
}
