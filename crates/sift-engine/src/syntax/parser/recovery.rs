//! Error recovery for the parser.
//!
//! Skipped tokens are never dropped: they are wrapped in an `Error` node so
//! the tree still renders to the exact input.

use super::guards::LoopGuard;
use super::Parser;
use crate::syntax::token::SyntaxKind;

/// Tokens that begin a statement.
fn starts_statement(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::IfKw
            | SyntaxKind::WhileKw
            | SyntaxKind::ForeachKw
            | SyntaxKind::TryKw
            | SyntaxKind::ReturnKw
            | SyntaxKind::ThrowKw
            | SyntaxKind::VarKw
            | SyntaxKind::LBrace
    )
}

/// Tokens that begin a declaration.
fn starts_declaration(kind: SyntaxKind) -> bool {
    kind.is_modifier()
        || matches!(
            kind,
            SyntaxKind::ClassKw | SyntaxKind::NamespaceKw | SyntaxKind::UsingKw
        )
}

/// Skip to the next statement boundary.
///
/// Always consumes at least one token (unless at `}` or end of input). A `;`
/// ends the skipped region and is consumed; a `}` or a statement keyword ends
/// it and is left for the caller.
pub(super) fn sync_to_statement_boundary(p: &mut Parser<'_>) {
    skip_in_error_node(p, "statement_recovery", |kind| {
        starts_statement(kind) || starts_declaration(kind)
    });
}

/// Skip to the next member or top-level declaration.
pub(super) fn sync_to_declaration_boundary(p: &mut Parser<'_>) {
    skip_in_error_node(p, "declaration_recovery", starts_declaration);
}

fn skip_in_error_node(
    p: &mut Parser<'_>,
    name: &'static str,
    stop_before: impl Fn(SyntaxKind) -> bool,
) {
    if p.at_eof() || p.at(SyntaxKind::RBrace) {
        return;
    }

    p.start_node(SyntaxKind::Error);
    // The first token is the one that failed; always take it.
    let first = p.current();
    p.bump();
    if first == SyntaxKind::Semicolon {
        p.finish_node();
        return;
    }

    let mut guard = LoopGuard::new(name);
    while !p.at_eof() {
        if guard.check(p.current_span()).is_err() {
            break;
        }
        match p.current() {
            SyntaxKind::Semicolon => {
                p.bump();
                break;
            }
            SyntaxKind::RBrace => break,
            kind if stop_before(kind) => break,
            _ => p.bump(),
        }
    }
    p.finish_node();
}

/// Consume one balanced group (`(..)`, `[..]`, `{..}`) or a single token
/// into an `Error` node. Used when nesting is too deep to parse.
pub(super) fn skip_balanced(p: &mut Parser<'_>) {
    if p.at_eof() || is_closer(p.current()) || p.at(SyntaxKind::Semicolon) {
        return;
    }

    p.start_node(SyntaxKind::Error);
    let mut balance = 0usize;
    let mut guard = LoopGuard::new("skip_balanced");
    loop {
        if p.at_eof() || guard.check(p.current_span()).is_err() {
            break;
        }
        let kind = p.current();
        if is_opener(kind) {
            balance += 1;
        } else if is_closer(kind) {
            balance = balance.saturating_sub(1);
        }
        p.bump();
        if balance == 0 {
            break;
        }
    }
    p.finish_node();
}

fn is_opener(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::LParen | SyntaxKind::LBracket | SyntaxKind::LBrace
    )
}

fn is_closer(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::RParen | SyntaxKind::RBracket | SyntaxKind::RBrace
    )
}

#[cfg(test)]
mod tests {
    use crate::syntax::parse;
    use crate::syntax::token::SyntaxKind;

    #[test]
    fn test_garbage_statement_recovers_at_next_statement() {
        let source = "class C { void M() { ) ) ; throw ex; } }";
        let parse = parse(source);
        assert!(!parse.errors.is_empty());
        assert_eq!(parse.tree.text(), source);

        let tree = &parse.tree;
        let throw = tree
            .descendants(tree.root())
            .find(|&n| tree.kind(n) == SyntaxKind::ThrowStatement);
        assert!(throw.is_some(), "throw after garbage should still parse");
    }

    #[test]
    fn test_stray_closing_brace_at_top_level() {
        let source = "} class C { }";
        let parse = parse(source);
        assert_eq!(parse.tree.text(), source);
        let tree = &parse.tree;
        assert!(tree
            .descendants(tree.root())
            .any(|n| tree.kind(n) == SyntaxKind::ClassDeclaration));
    }
}
