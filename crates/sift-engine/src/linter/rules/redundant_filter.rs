//! Rule: redundant-filter (S1001)
//!
//! Flags `source.Where(pred).First()` and friends: the terminal call has an
//! overload taking the predicate, so the intermediate filter is redundant.
//! The fix rewrites the chain to `source.First(pred)`.

use crate::linter::rule::*;
use crate::rewrite::{self, FixError, Rewrite};
use crate::syntax::ast::{self, Invocation, Lambda};
use crate::syntax::{GreenNode, NodeId, Span, SyntaxKind, SyntaxTree};

pub struct RedundantFilter;

static META: RuleMeta = RuleMeta {
    name: "redundant-filter",
    code: "S1001",
    description: "Move a Where predicate into the terminal call that follows it",
    category: Category::Performance,
    default_severity: Severity::Warning,
    triggers: &[SyntaxKind::Invocation],
    fixable: true,
};

/// Calls that keep the elements matching a single predicate.
const FILTER_METHODS: &[&str] = &["Where"];

/// Terminal calls with a predicate overload equivalent to filter-then-call.
pub const SUPPORTED_TERMINALS: &[&str] = &[
    "First",
    "FirstOrDefault",
    "Last",
    "LastOrDefault",
    "Any",
    "Single",
    "SingleOrDefault",
    "Count",
];

/// A matched `x.Where(p).Terminal()` chain.
struct FilterChain<'t> {
    filter: Invocation<'t>,
    terminal: Invocation<'t>,
    filter_name: &'t str,
    filter_name_span: Span,
    candidate: &'t str,
}

/// Match the chain whose filter call is `node`.
fn match_chain(tree: &SyntaxTree, node: NodeId) -> Option<FilterChain<'_>> {
    let filter = Invocation::cast(tree, node)?;
    let filter_name = filter.callee_name()?;
    if !FILTER_METHODS.contains(&filter_name.name()) {
        return None;
    }
    filter.receiver()?;
    if filter.argument_count()? != 1 {
        return None;
    }

    // The nearest enclosing invocation must be called on this one's result.
    let terminal_id = tree.first_ancestor_of_kind(node, SyntaxKind::Invocation)?;
    let terminal = Invocation::cast(tree, terminal_id)?;
    let receiver = terminal.receiver()?;
    if ast::skip_parens(tree, receiver) != node {
        return None;
    }

    let candidate = terminal.callee_name()?.name();
    if !SUPPORTED_TERMINALS.contains(&candidate) {
        return None;
    }
    if terminal.argument_count()? != 0 {
        return None;
    }

    Some(FilterChain {
        filter,
        terminal,
        filter_name: filter_name.name(),
        filter_name_span: filter_name.span(),
        candidate,
    })
}

/// The filter's predicate, if it is a lambda taking an element index.
fn indexed_predicate(tree: &SyntaxTree, filter: Invocation<'_>) -> Option<Span> {
    let predicate = filter.argument_list()?.single_expression()?;
    let lambda = Lambda::cast(tree, predicate)?;
    (lambda.parameter_count() == 2).then(|| lambda.span())
}

impl LintRule for RedundantFilter {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn check(&self, node: NodeId, ctx: &LintContext<'_>) -> Option<LintDiagnostic> {
        let tree = ctx.tree;
        let chain = match_chain(tree, node)?;

        let diagnostic = LintDiagnostic::new(
            &META,
            format!(
                "You can remove '{}' moving the predicate to '{}'.",
                chain.filter_name, chain.candidate
            ),
            chain.filter_name_span,
        );

        if indexed_predicate(tree, chain.filter).is_some() {
            return Some(diagnostic.with_note(format!(
                "the predicate uses the element index, which `{}` does not provide",
                chain.candidate
            )));
        }

        Some(diagnostic.with_fix(LintFix {
            id: "move-predicate",
            title: format!("Move predicate into `{}`", chain.candidate),
            action: FixAction::MovePredicateIntoTerminal {
                filter_call: chain.filter.id(),
                terminal_call: chain.terminal.id(),
            },
            tree: tree.id(),
        }))
    }
}

/// Rewrite `x.Where(p).First()` to `x.First(p)`.
///
/// The receiver `x`, the terminal's `.First` tokens and the filter's whole
/// argument list are reused as they are; only the terminal invocation and
/// its member access get new green nodes.
pub(crate) fn move_predicate(
    tree: &SyntaxTree,
    filter_call: NodeId,
    terminal_call: NodeId,
) -> Result<Rewrite, FixError> {
    rewrite::expect_kind(tree, filter_call, SyntaxKind::Invocation, "filter invocation")?;
    rewrite::expect_kind(tree, terminal_call, SyntaxKind::Invocation, "terminal invocation")?;

    let chain = match_chain(tree, filter_call).ok_or_else(|| FixError::Precondition {
        reason: "the filter call is no longer followed by a supported terminal call".into(),
    })?;
    if chain.terminal.id() != terminal_call {
        return Err(FixError::Precondition {
            reason: "the filter call is consumed by a different call".into(),
        });
    }
    if let Some(span) = indexed_predicate(tree, chain.filter) {
        return Err(FixError::Precondition {
            reason: format!(
                "the predicate at {} takes an element index, which `{}` does not provide",
                span, chain.candidate
            ),
        });
    }

    let shape_error = |id: NodeId, expected: &'static str| FixError::UnexpectedShape {
        expected,
        found: tree.kind(id),
        span: tree.span(id),
    };
    let filter_receiver = chain
        .filter
        .receiver()
        .ok_or_else(|| shape_error(filter_call, "member access receiver"))?;
    let filter_args = chain
        .filter
        .argument_list()
        .ok_or_else(|| shape_error(filter_call, "argument list"))?;
    let terminal_access = chain
        .terminal
        .member_access()
        .ok_or_else(|| shape_error(terminal_call, "member access"))?;
    let terminal_receiver = terminal_access
        .receiver()
        .ok_or_else(|| shape_error(terminal_access.id(), "member access receiver"))?;
    let terminal_args = chain
        .terminal
        .argument_list()
        .ok_or_else(|| shape_error(terminal_call, "argument list"))?;

    let green_node = |id: NodeId| -> Result<GreenNode, FixError> {
        tree.green(id)
            .as_node()
            .cloned()
            .ok_or_else(|| shape_error(id, "node"))
    };

    let mut new_access = green_node(terminal_access.id())?.replace_child(
        tree.index_in_parent(terminal_receiver),
        tree.green(filter_receiver).clone(),
    );
    // `x?.Where(p).First()` becomes `x?.First(p)`.
    if let Some(filter_access) = chain.filter.member_access().filter(|a| a.is_conditional()) {
        if let (Some(from), Some(to)) = (filter_access.dot_token(), terminal_access.dot_token()) {
            new_access =
                new_access.replace_child(tree.index_in_parent(to), tree.green(from).clone());
        }
    }
    let new_terminal = green_node(terminal_call)?
        .replace_child(tree.index_in_parent(terminal_access.id()), new_access.into())
        .replace_child(
            tree.index_in_parent(terminal_args.id()),
            tree.green(filter_args.id()).clone(),
        );

    rewrite::replace_node(tree, terminal_call, new_terminal.into())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::linter::rule::LintDiagnostic;
    use crate::linter::Linter;
    use crate::rewrite::{apply_fix, FixError};
    use crate::syntax::parse;

    fn wrap(body: &str) -> String {
        format!("class C\n{{\n    void M()\n    {{\n        {}\n    }}\n}}\n", body)
    }

    fn lint(source: &str) -> Vec<LintDiagnostic> {
        let linter = Linter::new();
        linter.lint_source(source, "test.cs").diagnostics
    }

    fn has_rule(diags: &[LintDiagnostic], code: &str) -> bool {
        diags.iter().any(|d| d.code == code)
    }

    fn fixed(body: &str) -> String {
        let source = wrap(body);
        let tree = parse(&source).tree;
        let result = Linter::new().lint_tree(&tree, "test.cs");
        let diag = result
            .diagnostics
            .iter()
            .find(|d| d.code == "S1001")
            .expect("redundant-filter diagnostic");
        let rewrite = apply_fix(&tree, &diag.fixes[0]).unwrap();
        rewrite.text().to_string()
    }

    #[test]
    fn test_where_first_flagged_at_where_name() {
        let source = wrap("var item = items.Where(x => x.Ok).First();");
        let diags = lint(&source);
        assert_eq!(diags.len(), 1, "{:?}", diags);
        let diag = &diags[0];
        assert_eq!(diag.code, "S1001");
        assert_eq!(diag.span.slice(&source), "Where");
        assert_eq!(
            diag.message,
            "You can remove 'Where' moving the predicate to 'First'."
        );
        assert_eq!(diag.severity, crate::linter::Severity::Warning);
        assert_eq!(diag.fixes.len(), 1);
        assert_eq!(diag.fixes[0].id, "move-predicate");
        assert_eq!(diag.fixes[0].title, "Move predicate into `First`");
    }

    #[test]
    fn test_every_supported_terminal_flagged() {
        for terminal in super::SUPPORTED_TERMINALS {
            let source = wrap(&format!("var r = items.Where(x => x.Ok).{}();", terminal));
            let diags = lint(&source);
            assert!(has_rule(&diags, "S1001"), "{} should be flagged", terminal);
            assert!(diags[0].message.ends_with(&format!("`{}`", terminal)));
        }
    }

    #[test]
    fn test_unsupported_terminal_ok() {
        for body in [
            "var r = items.Where(x => x.Ok).ToList();",
            "var r = items.Where(x => x.Ok).Select(x => x.Id);",
            "var r = items.Where(x => x.Ok).OrderBy(x => x.Id);",
        ] {
            assert!(!has_rule(&lint(&wrap(body)), "S1001"), "{}", body);
        }
    }

    #[test]
    fn test_terminal_with_argument_ok() {
        let source = wrap("var r = items.Where(x => x.Ok).First(x => x.Ready);");
        assert!(!has_rule(&lint(&source), "S1001"));
    }

    #[test]
    fn test_where_not_chained_ok() {
        for body in [
            "var filtered = items.Where(x => x.Ok);",
            "Consume(items.Where(x => x.Ok));",
            "var n = Count(items.Where(x => x.Ok));",
            "return items.Where(x => x.Ok);",
        ] {
            assert!(!has_rule(&lint(&wrap(body)), "S1001"), "{}", body);
        }
    }

    #[test]
    fn test_where_used_as_argument_of_terminal_ok() {
        // `First` is the nearest enclosing invocation but `Where` is its
        // argument, not its receiver.
        let source = wrap("var r = other.First(items.Where(x => x.Ok));");
        assert!(!has_rule(&lint(&source), "S1001"));
    }

    #[test]
    fn test_partial_shapes_are_not_faults() {
        for body in [
            "var r = items.Where().First();",
            "var r = items.Where(a, b).First();",
            "var r = Where(x => x.Ok).First();",
            "var r = items.Where(x => x.Ok).;",
            "var r = items.Where(x => x.Ok.First();",
        ] {
            assert!(!has_rule(&lint(&wrap(body)), "S1001"), "{}", body);
        }
    }

    #[test]
    fn test_chained_wheres_each_analyzed() {
        let source = wrap("var r = items.Where(a => a.X).Where(b => b.Y).Any();");
        let diags: Vec<_> = lint(&source)
            .into_iter()
            .filter(|d| d.code == "S1001")
            .collect();
        // Only the second Where is directly followed by a supported terminal.
        assert_eq!(diags.len(), 1);
        let second = source.rfind("Where").unwrap();
        assert_eq!(diags[0].span.start, second);
    }

    #[test]
    fn test_parenthesized_receiver_flagged() {
        let source = wrap("var r = (items.Where(x => x.Ok)).Any();");
        assert!(has_rule(&lint(&source), "S1001"));
    }

    #[test]
    fn test_fix_moves_predicate_verbatim() {
        assert_eq!(
            fixed("var item = items.Where(x => x.Ok /* keep */ && Check(x)).First();"),
            wrap("var item = items.First(x => x.Ok /* keep */ && Check(x));")
        );
    }

    #[test]
    fn test_fix_keeps_chain_layout() {
        assert_eq!(
            fixed("var n = db.Orders\n            .Where(o => o.Open)\n            .Count();"),
            wrap("var n = db.Orders\n            .Count(o => o.Open);")
        );
    }

    #[test]
    fn test_null_conditional_chain() {
        let source = wrap("var r = items?.Where(x => x.Ok).First();");
        let result = Linter::new().lint_source(&source, "test.cs");
        assert!(result.parse_errors.is_empty(), "{:?}", result.parse_errors);
        assert!(has_rule(&result.diagnostics, "S1001"));
        assert_eq!(
            fixed("var r = items?.Where(x => x.Ok).First();"),
            wrap("var r = items?.First(x => x.Ok);")
        );
        assert_eq!(
            fixed("var r = order.Lines?.Where(l => l.Open).Any();"),
            wrap("var r = order.Lines?.Any(l => l.Open);")
        );
    }

    #[test]
    fn test_fix_parenthesized_receiver() {
        assert_eq!(
            fixed("var r = (items.Where(x => x.Ok)).Any();"),
            wrap("var r = items.Any(x => x.Ok);")
        );
    }

    #[test]
    fn test_fix_is_idempotent() {
        let once = fixed("var item = items.Where(x => x.Ok).FirstOrDefault();");
        assert!(!has_rule(&lint(&once), "S1001"));
    }

    #[test]
    fn test_indexed_predicate_has_no_fix() {
        let source = wrap("var r = items.Where((x, i) => i > 2).First();");
        let diags = lint(&source);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].fixes.is_empty());
        assert_eq!(diags[0].notes.len(), 1);
    }

    #[test]
    fn test_indexed_predicate_fix_rejected() {
        let source = wrap("var r = items.Where((x, i) => i > 2).First();");
        let tree = parse(&source).tree;
        let calls: Vec<_> = tree
            .descendants(tree.root())
            .filter(|&n| tree.kind(n) == crate::syntax::SyntaxKind::Invocation)
            .collect();
        // Pre-order: the terminal call encloses the filter call.
        let (terminal, filter) = (calls[0], calls[1]);
        let err = super::move_predicate(&tree, filter, terminal).unwrap_err();
        assert!(matches!(err, FixError::Precondition { .. }), "{:?}", err);
    }
}
