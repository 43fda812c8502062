//! Expression parsing.
//!
//! Binary operators use precedence climbing over [`BINARY_LEVELS`]; the
//! left operand is wrapped after the fact with a checkpoint, so every
//! expression node covers exactly its operands and operator.

use super::guards::LoopGuard;
use super::Parser;
use crate::syntax::token::SyntaxKind;

/// Binary operators, loosest first.
const BINARY_LEVELS: &[&[SyntaxKind]] = &[
    &[SyntaxKind::QuestionQuestion],
    &[SyntaxKind::PipePipe],
    &[SyntaxKind::AmpAmp],
    &[SyntaxKind::Pipe],
    &[SyntaxKind::Amp],
    &[SyntaxKind::EqEq, SyntaxKind::BangEq],
    &[
        SyntaxKind::Lt,
        SyntaxKind::Gt,
        SyntaxKind::LtEq,
        SyntaxKind::GtEq,
        SyntaxKind::IsKw,
        SyntaxKind::AsKw,
    ],
    &[SyntaxKind::Plus, SyntaxKind::Minus],
    &[SyntaxKind::Star, SyntaxKind::Slash, SyntaxKind::Percent],
];

fn is_assignment_op(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::Eq
            | SyntaxKind::PlusEq
            | SyntaxKind::MinusEq
            | SyntaxKind::StarEq
            | SyntaxKind::SlashEq
    )
}

impl Parser<'_> {
    /// Parse one expression. Returns false (consuming nothing) if no
    /// expression starts here.
    pub(crate) fn expression(&mut self) -> bool {
        self.with_depth(|p| p.assignment())
    }

    fn assignment(&mut self) -> bool {
        if self.at(SyntaxKind::Ident) && self.nth(1) == SyntaxKind::FatArrow {
            self.simple_lambda();
            return true;
        }
        if self.at(SyntaxKind::LParen) && self.at_parenthesized_lambda() {
            self.parenthesized_lambda();
            return true;
        }

        let checkpoint = self.checkpoint();
        if !self.binary(0) {
            return false;
        }
        if is_assignment_op(self.current()) {
            self.start_node_at(checkpoint, SyntaxKind::Assignment);
            self.bump();
            if !self.expression() {
                self.error_expected("expression");
            }
            self.finish_node();
        }
        true
    }

    fn binary(&mut self, level: usize) -> bool {
        let Some(ops) = BINARY_LEVELS.get(level) else {
            return self.unary();
        };
        let checkpoint = self.checkpoint();
        if !self.binary(level + 1) {
            return false;
        }
        let mut guard = LoopGuard::new("binary_operators");
        while ops.contains(&self.current()) {
            if guard.check(self.current_span()).is_err() {
                break;
            }
            self.start_node_at(checkpoint, SyntaxKind::BinaryExpression);
            let op = self.current();
            self.bump();
            if matches!(op, SyntaxKind::IsKw | SyntaxKind::AsKw) {
                self.type_ref();
                // Declaration pattern: `x is Foo f`.
                if op == SyntaxKind::IsKw && self.at(SyntaxKind::Ident) {
                    self.bump();
                }
            } else if !self.binary(level + 1) {
                self.error_expected("expression");
            }
            self.finish_node();
        }
        true
    }

    fn unary(&mut self) -> bool {
        match self.current() {
            SyntaxKind::Bang
            | SyntaxKind::Minus
            | SyntaxKind::Plus
            | SyntaxKind::PlusPlus
            | SyntaxKind::MinusMinus
            | SyntaxKind::AwaitKw => {
                self.start_node(SyntaxKind::PrefixUnary);
                self.bump();
                let parsed = self.with_depth(|p| p.unary());
                if !parsed {
                    self.error_expected("expression");
                }
                self.finish_node();
                true
            }
            _ => self.postfix(),
        }
    }

    /// Primary followed by `.Name`, `?.Name`, `(args)`, `[args]`, `++` and `--`.
    fn postfix(&mut self) -> bool {
        let checkpoint = self.checkpoint();
        if !self.primary() {
            return false;
        }
        let mut guard = LoopGuard::new("postfix");
        loop {
            if guard.check(self.current_span()).is_err() {
                break;
            }
            match self.current() {
                SyntaxKind::Dot | SyntaxKind::QuestionDot => {
                    self.start_node_at(checkpoint, SyntaxKind::MemberAccess);
                    self.bump();
                    if self.at(SyntaxKind::Ident) {
                        self.identifier_name();
                    } else {
                        self.error_expected("member name");
                    }
                    self.finish_node();
                }
                SyntaxKind::LParen => {
                    self.start_node_at(checkpoint, SyntaxKind::Invocation);
                    self.argument_list(SyntaxKind::LParen, SyntaxKind::RParen);
                    self.finish_node();
                }
                SyntaxKind::LBracket => {
                    self.start_node_at(checkpoint, SyntaxKind::ElementAccess);
                    self.argument_list(SyntaxKind::LBracket, SyntaxKind::RBracket);
                    self.finish_node();
                }
                SyntaxKind::PlusPlus | SyntaxKind::MinusMinus => {
                    self.start_node_at(checkpoint, SyntaxKind::PostfixUnary);
                    self.bump();
                    self.finish_node();
                }
                _ => break,
            }
        }
        true
    }

    fn primary(&mut self) -> bool {
        let kind = self.current();
        match kind {
            SyntaxKind::Ident => self.identifier_name(),
            _ if kind.is_literal() || kind == SyntaxKind::ThisKw => {
                self.start_node(SyntaxKind::Literal);
                self.bump();
                self.finish_node();
            }
            SyntaxKind::LParen => {
                self.start_node(SyntaxKind::ParenthesizedExpression);
                self.bump();
                if !self.expression() {
                    self.error_expected("expression");
                }
                self.expect(SyntaxKind::RParen);
                self.finish_node();
            }
            SyntaxKind::NewKw => self.object_creation(),
            _ => {
                self.error_expected("expression");
                return false;
            }
        }
        true
    }

    fn identifier_name(&mut self) {
        self.start_node(SyntaxKind::IdentifierName);
        self.bump();
        self.finish_node();
    }

    /// `new T(args)`; the argument list may be omitted.
    fn object_creation(&mut self) {
        self.start_node(SyntaxKind::ObjectCreation);
        self.bump();
        self.type_ref();
        if self.at(SyntaxKind::LParen) {
            self.argument_list(SyntaxKind::LParen, SyntaxKind::RParen);
        }
        self.finish_node();
    }

    /// `(a, b)` or `[a, b]`. For `[..]` the delimiters are tokens of the
    /// element access; only `(..)` gets its own `ArgumentList` node.
    fn argument_list(&mut self, open: SyntaxKind, close: SyntaxKind) {
        let own_node = open == SyntaxKind::LParen;
        if own_node {
            self.start_node(SyntaxKind::ArgumentList);
        }
        self.bump();
        let mut guard = LoopGuard::new("arguments");
        while !self.at(close) && !self.at_eof() {
            if guard.check(self.current_span()).is_err() {
                break;
            }
            let checkpoint = self.checkpoint();
            if !self.expression() {
                break;
            }
            self.start_node_at(checkpoint, SyntaxKind::Argument);
            self.finish_node();
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        self.expect(close);
        if own_node {
            self.finish_node();
        }
    }

    /// `x => body`
    fn simple_lambda(&mut self) {
        self.start_node(SyntaxKind::SimpleLambda);
        self.start_node(SyntaxKind::Parameter);
        self.bump();
        self.finish_node();
        self.bump();
        self.lambda_body();
        self.finish_node();
    }

    /// `(a, b) => body`, `() => body`, `(int a) => body`
    fn parenthesized_lambda(&mut self) {
        self.start_node(SyntaxKind::ParenthesizedLambda);
        self.start_node(SyntaxKind::ParameterList);
        self.bump();
        let mut guard = LoopGuard::new("lambda_parameters");
        while !self.at(SyntaxKind::RParen) && !self.at_eof() {
            if guard.check(self.current_span()).is_err() {
                break;
            }
            self.parameter();
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        self.expect(SyntaxKind::RParen);
        self.finish_node();
        self.expect(SyntaxKind::FatArrow);
        self.lambda_body();
        self.finish_node();
    }

    fn lambda_body(&mut self) {
        if self.at(SyntaxKind::LBrace) {
            self.block();
        } else if !self.expression() {
            self.error_expected("lambda body");
        }
    }

    /// At `(`: does the matching `)` precede `=>`?
    fn at_parenthesized_lambda(&self) -> bool {
        let mut depth = 0usize;
        let mut n = 0;
        loop {
            match self.nth(n) {
                SyntaxKind::LParen => depth += 1,
                SyntaxKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return self.nth(n + 1) == SyntaxKind::FatArrow;
                    }
                }
                SyntaxKind::Eof | SyntaxKind::Semicolon | SyntaxKind::LBrace => return false,
                _ => {}
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::syntax::parse;
    use crate::syntax::token::SyntaxKind;
    use crate::syntax::tree::{NodeId, SyntaxTree};

    /// Parse `expr` as the initializer of a local and return the tree and
    /// the initializer node.
    fn parse_expr(expr: &str) -> (SyntaxTree, NodeId) {
        let source = format!("class C {{ void M() {{ var r = {}; }} }}", expr);
        let parse = parse(&source);
        assert!(!parse.has_errors(), "{}: {:?}", expr, parse.errors);
        let tree = parse.tree;
        let declarator = tree
            .descendants(tree.root())
            .find(|&n| tree.kind(n) == SyntaxKind::VariableDeclarator)
            .unwrap();
        let init = tree.child_nodes(declarator).last().unwrap();
        (tree, init)
    }

    fn shape(tree: &SyntaxTree, id: NodeId) -> String {
        let kind = tree.kind(id);
        let children: Vec<String> = tree.child_nodes(id).map(|c| shape(tree, c)).collect();
        if children.is_empty() {
            format!("{:?}", kind)
        } else {
            format!("{:?}({})", kind, children.join(" "))
        }
    }

    #[test]
    fn test_member_chain_nests_left() {
        let (tree, init) = parse_expr("xs.Where(x => x > 1).First()");
        assert_eq!(tree.kind(init), SyntaxKind::Invocation);
        assert_eq!(
            shape(&tree, init),
            "Invocation(MemberAccess(Invocation(MemberAccess(IdentifierName IdentifierName) \
             ArgumentList(Argument(SimpleLambda(Parameter BinaryExpression(IdentifierName Literal))))) \
             IdentifierName) ArgumentList)"
        );
    }

    #[test]
    fn test_precedence() {
        let (tree, init) = parse_expr("a + b * c == d && !e");
        assert_eq!(
            shape(&tree, init),
            "BinaryExpression(BinaryExpression(BinaryExpression(IdentifierName \
             BinaryExpression(IdentifierName IdentifierName)) IdentifierName) \
             PrefixUnary(IdentifierName))"
        );
    }

    #[test]
    fn test_lambdas() {
        let (tree, init) = parse_expr("(x, i) => { return x; }");
        assert_eq!(tree.kind(init), SyntaxKind::ParenthesizedLambda);
        let (tree, init) = parse_expr("() => 1");
        assert_eq!(tree.kind(init), SyntaxKind::ParenthesizedLambda);
        let (tree, init) = parse_expr("(a) + b");
        assert_eq!(tree.kind(init), SyntaxKind::BinaryExpression);
    }

    #[test]
    fn test_object_creation_and_element_access() {
        let (tree, init) = parse_expr("new Dictionary<string, int>()[key]++");
        assert_eq!(
            shape(&tree, init),
            "PostfixUnary(ElementAccess(ObjectCreation(TypeRef ArgumentList) Argument(IdentifierName)))"
        );
    }

    #[test]
    fn test_is_and_as_take_types() {
        let (tree, init) = parse_expr("o as string ?? d");
        assert_eq!(
            shape(&tree, init),
            "BinaryExpression(BinaryExpression(IdentifierName TypeRef) IdentifierName)"
        );
        let (tree, init) = parse_expr("o is List<int> && ok");
        assert_eq!(
            shape(&tree, init),
            "BinaryExpression(BinaryExpression(IdentifierName TypeRef) IdentifierName)"
        );
    }

    #[test]
    fn test_where_with_no_arguments_parses() {
        let (tree, init) = parse_expr("xs.Where().First()");
        assert_eq!(tree.kind(init), SyntaxKind::Invocation);
    }
}
