//! Statement parsing.

use super::guards::LoopGuard;
use super::{recovery, Parser};
use crate::syntax::token::SyntaxKind;

impl Parser<'_> {
    /// `{ statements }`
    pub(crate) fn block(&mut self) {
        self.start_node(SyntaxKind::Block);
        if !self.expect(SyntaxKind::LBrace) {
            self.finish_node();
            return;
        }
        let mut guard = LoopGuard::new("block_statements");
        while !self.at(SyntaxKind::RBrace) && !self.at_eof() {
            if let Err(err) = guard.check(self.current_span()) {
                self.errors.push(err);
                break;
            }
            let before = self.position();
            self.statement();
            if self.position() == before {
                self.bump_error("statement");
            }
        }
        self.expect(SyntaxKind::RBrace);
        self.finish_node();
    }

    pub(crate) fn statement(&mut self) {
        self.with_depth(|p| {
            p.statement_inner();
            true
        });
    }

    fn statement_inner(&mut self) {
        match self.current() {
            SyntaxKind::LBrace => self.block(),
            SyntaxKind::Semicolon => {
                self.start_node(SyntaxKind::EmptyStatement);
                self.bump();
                self.finish_node();
            }
            SyntaxKind::IfKw => self.if_statement(),
            SyntaxKind::WhileKw => self.while_statement(),
            SyntaxKind::ForeachKw => self.foreach_statement(),
            SyntaxKind::ReturnKw => self.keyword_statement(SyntaxKind::ReturnStatement),
            SyntaxKind::ThrowKw => self.keyword_statement(SyntaxKind::ThrowStatement),
            SyntaxKind::TryKw => self.try_statement(),
            _ if self.at_local_declaration() => self.local_declaration(),
            _ => self.expression_statement(),
        }
    }

    /// `Type name =`, `Type name;` or `Type name,` ahead.
    fn at_local_declaration(&self) -> bool {
        if self.at(SyntaxKind::VarKw) {
            return true;
        }
        let Some(n) = self.scan_type(0) else {
            return false;
        };
        self.nth(n) == SyntaxKind::Ident
            && matches!(
                self.nth(n + 1),
                SyntaxKind::Eq | SyntaxKind::Semicolon | SyntaxKind::Comma
            )
    }

    fn local_declaration(&mut self) {
        self.start_node(SyntaxKind::LocalDeclaration);
        self.type_ref();
        self.variable_declarators();
        self.expect(SyntaxKind::Semicolon);
        self.finish_node();
    }

    fn expression_statement(&mut self) {
        let checkpoint = self.checkpoint();
        if !self.expression() {
            recovery::sync_to_statement_boundary(self);
            return;
        }
        self.start_node_at(checkpoint, SyntaxKind::ExpressionStatement);
        self.expect(SyntaxKind::Semicolon);
        self.finish_node();
    }

    /// `return [expr];` and `throw [expr];`
    fn keyword_statement(&mut self, kind: SyntaxKind) {
        self.start_node(kind);
        self.bump();
        if !self.at(SyntaxKind::Semicolon) && !self.at(SyntaxKind::RBrace) {
            self.expression();
        }
        self.expect(SyntaxKind::Semicolon);
        self.finish_node();
    }

    /// `( expr )` as used by `if`, `while` and catch filters.
    fn parenthesized_condition(&mut self) {
        if self.expect(SyntaxKind::LParen) {
            self.expression();
            self.expect(SyntaxKind::RParen);
        }
    }

    fn if_statement(&mut self) {
        self.start_node(SyntaxKind::IfStatement);
        self.bump();
        self.parenthesized_condition();
        self.statement();
        if self.at(SyntaxKind::ElseKw) {
            self.start_node(SyntaxKind::ElseClause);
            self.bump();
            self.statement();
            self.finish_node();
        }
        self.finish_node();
    }

    fn while_statement(&mut self) {
        self.start_node(SyntaxKind::WhileStatement);
        self.bump();
        self.parenthesized_condition();
        self.statement();
        self.finish_node();
    }

    /// `foreach (Type name in expr) statement`
    fn foreach_statement(&mut self) {
        self.start_node(SyntaxKind::ForEachStatement);
        self.bump();
        if self.expect(SyntaxKind::LParen) {
            self.type_ref();
            self.expect(SyntaxKind::Ident);
            self.expect(SyntaxKind::InKw);
            self.expression();
            self.expect(SyntaxKind::RParen);
        }
        self.statement();
        self.finish_node();
    }

    /// `try { } catch (T e) when (cond) { } finally { }`
    fn try_statement(&mut self) {
        self.start_node(SyntaxKind::TryStatement);
        self.bump();
        self.block();

        let mut clauses = 0;
        let mut guard = LoopGuard::new("catch_clauses");
        while self.at(SyntaxKind::CatchKw) {
            if guard.check(self.current_span()).is_err() {
                break;
            }
            self.catch_clause();
            clauses += 1;
        }
        if self.at(SyntaxKind::FinallyKw) {
            self.start_node(SyntaxKind::FinallyClause);
            self.bump();
            self.block();
            self.finish_node();
            clauses += 1;
        }
        if clauses == 0 {
            self.error_expected("'catch' or 'finally'");
        }
        self.finish_node();
    }

    fn catch_clause(&mut self) {
        self.start_node(SyntaxKind::CatchClause);
        self.bump();
        if self.at(SyntaxKind::LParen) {
            self.start_node(SyntaxKind::CatchDeclaration);
            self.bump();
            self.type_ref();
            self.eat(SyntaxKind::Ident);
            self.expect(SyntaxKind::RParen);
            self.finish_node();
        }
        if self.at(SyntaxKind::WhenKw) {
            self.start_node(SyntaxKind::CatchFilter);
            self.bump();
            self.parenthesized_condition();
            self.finish_node();
        }
        self.block();
        self.finish_node();
    }
}

#[cfg(test)]
mod tests {
    use crate::syntax::parse;
    use crate::syntax::token::SyntaxKind;

    fn statement_kinds(body: &str) -> Vec<SyntaxKind> {
        let source = format!("class C {{ void M() {{ {} }} }}", body);
        let parse = parse(&source);
        assert!(!parse.has_errors(), "{:?}", parse.errors);
        let tree = &parse.tree;
        let block = tree
            .descendants(tree.root())
            .find(|&n| tree.kind(n) == SyntaxKind::Block)
            .unwrap();
        tree.child_nodes(block).map(|n| tree.kind(n)).collect()
    }

    #[test]
    fn test_local_declaration_vs_expression() {
        assert_eq!(
            statement_kinds("var a = 1; List<int> b = null; int c; a = b; Run();"),
            vec![
                SyntaxKind::LocalDeclaration,
                SyntaxKind::LocalDeclaration,
                SyntaxKind::LocalDeclaration,
                SyntaxKind::ExpressionStatement,
                SyntaxKind::ExpressionStatement,
            ]
        );
    }

    #[test]
    fn test_control_flow() {
        assert_eq!(
            statement_kinds(
                "if (a) { } else if (b) return; while (c) ; foreach (var x in xs) { } ;"
            ),
            vec![
                SyntaxKind::IfStatement,
                SyntaxKind::WhileStatement,
                SyntaxKind::ForEachStatement,
                SyntaxKind::EmptyStatement,
            ]
        );
    }

    #[test]
    fn test_try_catch_forms() {
        let source = "class C { void M() { try { } catch (IOException e) when (e.Code > 0) { throw; } catch (Exception) { } catch { } finally { } } }";
        let parse = parse(source);
        assert!(!parse.has_errors(), "{:?}", parse.errors);
        let tree = &parse.tree;
        let count = |kind| {
            tree.descendants(tree.root())
                .filter(|&n| tree.kind(n) == kind)
                .count()
        };
        assert_eq!(count(SyntaxKind::CatchClause), 3);
        assert_eq!(count(SyntaxKind::CatchDeclaration), 2);
        assert_eq!(count(SyntaxKind::CatchFilter), 1);
        assert_eq!(count(SyntaxKind::FinallyClause), 1);
        assert_eq!(count(SyntaxKind::ThrowStatement), 1);
    }

    #[test]
    fn test_throw_statement_shapes() {
        let source = "class C { void M() { throw; throw ex; throw new E(\"m\", ex); } }";
        let parse = parse(source);
        assert!(!parse.has_errors(), "{:?}", parse.errors);
        let tree = &parse.tree;
        let operands: Vec<_> = tree
            .descendants(tree.root())
            .filter(|&n| tree.kind(n) == SyntaxKind::ThrowStatement)
            .map(|n| tree.first_child_node(n).map(|e| tree.kind(e)))
            .collect();
        assert_eq!(
            operands,
            vec![
                None,
                Some(SyntaxKind::IdentifierName),
                Some(SyntaxKind::ObjectCreation)
            ]
        );
    }
}
