//! Lint runner: one pre-order pass over a tree, dispatching each node to the
//! rules registered for its kind.

use tracing::trace;

use super::registry::RuleRegistry;
use super::rule::LintContext;
use super::sink::DiagnosticSink;

/// Runs the registry's rules over one tree.
pub struct LintRunner<'a> {
    registry: &'a RuleRegistry,
    ctx: LintContext<'a>,
    sink: &'a DiagnosticSink,
}

impl<'a> LintRunner<'a> {
    pub fn new(registry: &'a RuleRegistry, ctx: LintContext<'a>, sink: &'a DiagnosticSink) -> Self {
        Self { registry, ctx, sink }
    }

    /// Visit every node and submit diagnostics to the sink. Returns the
    /// number of rule invocations.
    pub fn run(self) -> usize {
        let tree = self.ctx.tree;
        let mut invocations = 0;
        for node in tree.descendants(tree.root()) {
            let kind = tree.kind(node);
            if kind.is_token() {
                continue;
            }
            for rule in self.registry.rules_for(kind) {
                invocations += 1;
                if let Some(diagnostic) = rule.check(node, &self.ctx) {
                    self.sink.push(diagnostic);
                }
            }
        }
        trace!(
            file = self.ctx.file_path,
            invocations,
            "rule dispatch finished"
        );
        invocations
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::linter::rule::{Category, LintDiagnostic, LintRule, RuleMeta, Severity};
    use crate::syntax::{parse, NodeId, SyntaxKind};

    /// A trivial test rule that flags every throw statement.
    struct FlagAllThrows;

    static FLAG_ALL_META: RuleMeta = RuleMeta {
        name: "flag-all",
        code: "T0001",
        description: "Flags every throw (test only)",
        category: Category::Correctness,
        default_severity: Severity::Info,
        triggers: &[SyntaxKind::ThrowStatement],
        fixable: false,
    };

    impl LintRule for FlagAllThrows {
        fn meta(&self) -> &'static RuleMeta {
            &FLAG_ALL_META
        }

        fn check(&self, node: NodeId, ctx: &LintContext<'_>) -> Option<LintDiagnostic> {
            Some(LintDiagnostic::new(&FLAG_ALL_META, "throw", ctx.tree.span(node)))
        }
    }

    #[test]
    fn test_runner_dispatches_only_to_triggered_kinds() {
        let tree = parse("class C { void M() { throw a; f(); throw; } }").tree;
        let mut registry = RuleRegistry::empty();
        registry.register(Arc::new(FlagAllThrows));
        let sink = DiagnosticSink::new();
        let ctx = LintContext {
            tree: &tree,
            file_path: "test.cs",
        };

        let invocations = LintRunner::new(&registry, ctx, &sink).run();
        assert_eq!(invocations, 2);
        assert_eq!(sink.len(), 2);
    }
}
