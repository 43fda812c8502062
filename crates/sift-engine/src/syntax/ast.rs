//! Typed views over [`SyntaxTree`] nodes.
//!
//! Each view is a `Copy` pair of tree reference and node id. `cast` checks
//! the kind; accessors return `Option` because a partially invalid tree can
//! be missing any piece.

use super::token::{Span, SyntaxKind};
use super::tree::{NodeId, SyntaxTree};

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident, $($kind:ident)|+) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name<'t> {
            tree: &'t SyntaxTree,
            id: NodeId,
        }

        impl<'t> $name<'t> {
            pub fn cast(tree: &'t SyntaxTree, id: NodeId) -> Option<Self> {
                match tree.kind(id) {
                    $(SyntaxKind::$kind)|+ => Some(Self { tree, id }),
                    _ => None,
                }
            }

            pub fn id(&self) -> NodeId {
                self.id
            }

            pub fn span(&self) -> Span {
                self.tree.span(self.id)
            }

            pub fn text(&self) -> &'t str {
                self.tree.node_text(self.id)
            }
        }
    };
}

ast_node!(
    /// `callee(args)`
    Invocation, Invocation
);
ast_node!(
    /// `receiver.Name`
    MemberAccess, MemberAccess
);
ast_node!(ArgumentList, ArgumentList);
ast_node!(IdentifierName, IdentifierName);
ast_node!(
    /// `throw;` or `throw expr;`
    ThrowStatement, ThrowStatement
);
ast_node!(CatchClause, CatchClause);
ast_node!(
    /// The parenthesized `(Type name)` part of a catch clause.
    CatchDeclaration, CatchDeclaration
);
ast_node!(
    /// `x => ...` or `(x, i) => ...`
    Lambda, SimpleLambda | ParenthesizedLambda
);

/// Look through any number of parentheses.
pub fn skip_parens(tree: &SyntaxTree, mut id: NodeId) -> NodeId {
    while tree.kind(id) == SyntaxKind::ParenthesizedExpression {
        match tree.first_child_node(id) {
            Some(inner) => id = inner,
            None => break,
        }
    }
    id
}

impl<'t> Invocation<'t> {
    /// The expression being called.
    pub fn callee(&self) -> Option<NodeId> {
        self.tree
            .first_child_node(self.id)
            .filter(|&c| self.tree.kind(c) != SyntaxKind::ArgumentList)
    }

    pub fn member_access(&self) -> Option<MemberAccess<'t>> {
        MemberAccess::cast(self.tree, self.callee()?)
    }

    /// Name of the called method: `Name` in `x.Name(..)` or `Name(..)`.
    pub fn callee_name(&self) -> Option<IdentifierName<'t>> {
        let callee = self.callee()?;
        match self.tree.kind(callee) {
            SyntaxKind::MemberAccess => MemberAccess::cast(self.tree, callee)?.name(),
            SyntaxKind::IdentifierName => IdentifierName::cast(self.tree, callee),
            _ => None,
        }
    }

    /// The `x` in `x.Name(..)`.
    pub fn receiver(&self) -> Option<NodeId> {
        self.member_access()?.receiver()
    }

    pub fn argument_list(&self) -> Option<ArgumentList<'t>> {
        let list = self
            .tree
            .first_child_of_kind(self.id, SyntaxKind::ArgumentList)?;
        ArgumentList::cast(self.tree, list)
    }

    /// Number of arguments; `None` when the argument list is missing.
    pub fn argument_count(&self) -> Option<usize> {
        Some(self.argument_list()?.arguments().count())
    }
}

impl<'t> MemberAccess<'t> {
    pub fn receiver(&self) -> Option<NodeId> {
        let first = self.tree.first_child_node(self.id)?;
        let dot = self.dot_token()?;
        (first < dot).then_some(first)
    }

    /// The `.` or `?.` between receiver and name.
    pub fn dot_token(&self) -> Option<NodeId> {
        self.tree
            .children(self.id)
            .iter()
            .copied()
            .find(|&c| matches!(self.tree.kind(c), SyntaxKind::Dot | SyntaxKind::QuestionDot))
    }

    pub fn is_conditional(&self) -> bool {
        self.dot_token()
            .is_some_and(|dot| self.tree.kind(dot) == SyntaxKind::QuestionDot)
    }

    pub fn name(&self) -> Option<IdentifierName<'t>> {
        let dot = self.dot_token()?;
        let after = self
            .tree
            .significant_children(self.id)
            .find(|&c| c > dot)?;
        IdentifierName::cast(self.tree, after)
    }
}

impl<'t> ArgumentList<'t> {
    /// The `Argument` nodes, in order.
    pub fn arguments(&self) -> impl Iterator<Item = NodeId> + 't {
        let tree = self.tree;
        tree.child_nodes(self.id)
            .filter(move |&c| tree.kind(c) == SyntaxKind::Argument)
    }

    /// Expression of the only argument, if there is exactly one.
    pub fn single_expression(&self) -> Option<NodeId> {
        let mut args = self.arguments();
        let only = args.next()?;
        if args.next().is_some() {
            return None;
        }
        self.tree.first_child_node(only)
    }

    pub fn is_empty(&self) -> bool {
        self.arguments().next().is_none()
    }
}

impl<'t> IdentifierName<'t> {
    /// The identifier without a leading `@`.
    pub fn name(&self) -> &'t str {
        let text = self
            .tree
            .first_child_of_kind(self.id, SyntaxKind::Ident)
            .and_then(|t| self.tree.token_text(t))
            .unwrap_or("");
        text.strip_prefix('@').unwrap_or(text)
    }
}

impl<'t> ThrowStatement<'t> {
    pub fn throw_keyword(&self) -> Option<NodeId> {
        self.tree.first_child_of_kind(self.id, SyntaxKind::ThrowKw)
    }

    /// The thrown expression; `None` for a bare `throw;`.
    pub fn expression(&self) -> Option<NodeId> {
        self.tree
            .child_nodes(self.id)
            .find(|&c| self.tree.kind(c) != SyntaxKind::Error)
    }

    pub fn semicolon(&self) -> Option<NodeId> {
        self.tree.first_child_of_kind(self.id, SyntaxKind::Semicolon)
    }
}

impl<'t> CatchClause<'t> {
    pub fn declaration(&self) -> Option<CatchDeclaration<'t>> {
        let decl = self
            .tree
            .first_child_of_kind(self.id, SyntaxKind::CatchDeclaration)?;
        CatchDeclaration::cast(self.tree, decl)
    }

    /// The caught-exception variable name, if the clause declares one.
    pub fn binding_name(&self) -> Option<&'t str> {
        self.declaration()?.binding_name()
    }

    pub fn block(&self) -> Option<NodeId> {
        self.tree.first_child_of_kind(self.id, SyntaxKind::Block)
    }
}

impl<'t> CatchDeclaration<'t> {
    pub fn type_ref(&self) -> Option<NodeId> {
        self.tree.first_child_of_kind(self.id, SyntaxKind::TypeRef)
    }

    /// The identifier token naming the caught exception.
    pub fn binding(&self) -> Option<NodeId> {
        self.tree.first_child_of_kind(self.id, SyntaxKind::Ident)
    }

    pub fn binding_name(&self) -> Option<&'t str> {
        let text = self.tree.token_text(self.binding()?)?;
        Some(text.strip_prefix('@').unwrap_or(text))
    }
}

impl<'t> Lambda<'t> {
    pub fn parameter_count(&self) -> usize {
        match self.tree.kind(self.id) {
            SyntaxKind::SimpleLambda => 1,
            _ => self
                .tree
                .first_child_of_kind(self.id, SyntaxKind::ParameterList)
                .map(|list| {
                    self.tree
                        .child_nodes(list)
                        .filter(|&p| self.tree.kind(p) == SyntaxKind::Parameter)
                        .count()
                })
                .unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    fn first<'t>(tree: &'t SyntaxTree, kind: SyntaxKind) -> NodeId {
        tree.descendants(tree.root())
            .find(|&n| tree.kind(n) == kind)
            .unwrap()
    }

    #[test]
    fn test_invocation_accessors() {
        let tree = parse("class C { void M() { var r = xs.Where(x => x.Ok).First(); } }").tree;
        let outer = Invocation::cast(&tree, first(&tree, SyntaxKind::Invocation)).unwrap();
        assert_eq!(outer.callee_name().unwrap().name(), "First");
        assert_eq!(outer.argument_count(), Some(0));

        let inner = Invocation::cast(&tree, outer.receiver().unwrap()).unwrap();
        assert_eq!(inner.callee_name().unwrap().name(), "Where");
        let predicate = inner.argument_list().unwrap().single_expression().unwrap();
        assert_eq!(tree.node_text(predicate), "x => x.Ok");
        assert_eq!(Lambda::cast(&tree, predicate).unwrap().parameter_count(), 1);
    }

    #[test]
    fn test_plain_call_has_no_receiver() {
        let tree = parse("class C { void M() { Where(p); } }").tree;
        let call = Invocation::cast(&tree, first(&tree, SyntaxKind::Invocation)).unwrap();
        assert_eq!(call.callee_name().unwrap().name(), "Where");
        assert!(call.receiver().is_none());
    }

    #[test]
    fn test_throw_and_catch_accessors() {
        let tree = parse("class C { void M() { try { } catch (Exception ex) { throw ex; } } }").tree;
        let throw = ThrowStatement::cast(&tree, first(&tree, SyntaxKind::ThrowStatement)).unwrap();
        let operand = throw.expression().unwrap();
        assert_eq!(IdentifierName::cast(&tree, operand).unwrap().name(), "ex");

        let clause = CatchClause::cast(&tree, first(&tree, SyntaxKind::CatchClause)).unwrap();
        assert_eq!(clause.binding_name(), Some("ex"));
        assert!(clause.block().is_some());
    }

    #[test]
    fn test_catch_without_binding() {
        let tree = parse("class C { void M() { try { } catch (Exception) { } catch { } } }").tree;
        let clauses: Vec<_> = tree
            .descendants(tree.root())
            .filter_map(|n| CatchClause::cast(&tree, n))
            .collect();
        assert_eq!(clauses.len(), 2);
        assert!(clauses.iter().all(|c| c.binding_name().is_none()));
    }

    #[test]
    fn test_indexed_lambda_parameter_count() {
        let tree = parse("class C { void M() { f((x, i) => i > 0); } }").tree;
        let lambda = Lambda::cast(&tree, first(&tree, SyntaxKind::ParenthesizedLambda)).unwrap();
        assert_eq!(lambda.parameter_count(), 2);
    }

    #[test]
    fn test_skip_parens() {
        let tree = parse("class C { void M() { var y = ((x)); } }").tree;
        let outer = first(&tree, SyntaxKind::ParenthesizedExpression);
        let inner = skip_parens(&tree, outer);
        assert_eq!(tree.kind(inner), SyntaxKind::IdentifierName);
    }
}
