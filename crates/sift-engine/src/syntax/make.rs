//! Construction of green trees.
//!
//! [`GreenBuilder`] is the event sink the parser drives; the free functions
//! build the small fragments rule fixes splice into an existing tree.

use super::green::{GreenElement, GreenNode, GreenToken};
use super::token::SyntaxKind;

/// Position in the builder's child stack, used to wrap already-built
/// children in a node after the fact (e.g. the left operand of a binary
/// expression, the callee of an invocation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// Bottom-up green tree builder.
#[derive(Debug, Default)]
pub struct GreenBuilder {
    parents: Vec<(SyntaxKind, usize)>,
    children: Vec<GreenElement>,
}

impl GreenBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_node(&mut self, kind: SyntaxKind) {
        let first_child = self.children.len();
        self.parents.push((kind, first_child));
    }

    pub fn token(&mut self, kind: SyntaxKind, text: &str) {
        self.children.push(GreenToken::new(kind, text).into());
    }

    /// Append an already built subtree.
    pub fn push(&mut self, element: GreenElement) {
        self.children.push(element);
    }

    pub fn finish_node(&mut self) {
        let Some((kind, first_child)) = self.parents.pop() else {
            debug_assert!(false, "finish_node without start_node");
            return;
        };
        let children = self.children.split_off(first_child);
        self.children.push(GreenNode::new(kind, children).into());
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.children.len())
    }

    /// Start a node whose first child is the element built at `checkpoint`.
    pub fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        let Checkpoint(first_child) = checkpoint;
        debug_assert!(
            first_child <= self.children.len(),
            "checkpoint no longer valid"
        );
        if let Some(&(_, open)) = self.parents.last() {
            debug_assert!(first_child >= open, "checkpoint precedes open node");
        }
        self.parents.push((kind, first_child));
    }

    /// Number of open nodes.
    pub fn depth(&self) -> usize {
        self.parents.len()
    }

    /// Close every open node and return the root.
    ///
    /// If more than one element remains at the top level they are wrapped in
    /// a [`SyntaxKind::CompilationUnit`].
    pub fn finish(mut self) -> GreenNode {
        while !self.parents.is_empty() {
            self.finish_node();
        }
        if self.children.len() == 1 {
            if let Some(GreenElement::Node(node)) = self.children.first() {
                if node.kind() == SyntaxKind::CompilationUnit {
                    return node.clone();
                }
            }
        }
        GreenNode::new(SyntaxKind::CompilationUnit, self.children)
    }
}

pub fn token(kind: SyntaxKind, text: &str) -> GreenToken {
    GreenToken::new(kind, text)
}

pub fn space() -> GreenElement {
    token(SyntaxKind::Whitespace, " ").into()
}

pub fn ident(name: &str) -> GreenToken {
    token(SyntaxKind::Ident, name)
}

/// `name` as an expression.
pub fn identifier_name(name: &str) -> GreenNode {
    GreenNode::new(SyntaxKind::IdentifierName, vec![ident(name).into()])
}

/// A string literal expression; `value` is quoted and escaped.
pub fn string_literal(value: &str) -> GreenNode {
    let mut text = String::with_capacity(value.len() + 2);
    text.push('"');
    for c in value.chars() {
        match c {
            '"' => text.push_str("\\\""),
            '\\' => text.push_str("\\\\"),
            '\n' => text.push_str("\\n"),
            _ => text.push(c),
        }
    }
    text.push('"');
    GreenNode::new(
        SyntaxKind::Literal,
        vec![token(SyntaxKind::StringLiteral, &text).into()],
    )
}

/// A simple (possibly dotted) type name such as `System.Exception`.
pub fn type_ref(name: &str) -> GreenNode {
    let mut children = Vec::new();
    for (i, part) in name.split('.').enumerate() {
        if i > 0 {
            children.push(token(SyntaxKind::Dot, ".").into());
        }
        children.push(ident(part).into());
    }
    GreenNode::new(SyntaxKind::TypeRef, children)
}

/// `(a, b, c)` with one space after each comma.
pub fn argument_list(args: Vec<GreenNode>) -> GreenNode {
    let mut children = vec![token(SyntaxKind::LParen, "(").into()];
    for (i, expr) in args.into_iter().enumerate() {
        if i > 0 {
            children.push(token(SyntaxKind::Comma, ",").into());
            children.push(space());
        }
        children.push(GreenNode::new(SyntaxKind::Argument, vec![expr.into()]).into());
    }
    children.push(token(SyntaxKind::RParen, ")").into());
    GreenNode::new(SyntaxKind::ArgumentList, children)
}

/// `new T(args)`.
pub fn object_creation(type_name: &str, args: Vec<GreenNode>) -> GreenNode {
    GreenNode::new(
        SyntaxKind::ObjectCreation,
        vec![
            token(SyntaxKind::NewKw, "new").into(),
            space(),
            type_ref(type_name).into(),
            argument_list(args).into(),
        ],
    )
}

/// `throw <operand>;`, or `throw;` when `operand` is `None`.
///
/// The keyword and semicolon are passed in so a rewrite can keep the
/// original tokens.
pub fn throw_statement(
    throw_kw: GreenToken,
    operand: Option<GreenNode>,
    semicolon: GreenToken,
) -> GreenNode {
    let mut children: Vec<GreenElement> = vec![throw_kw.into()];
    if let Some(operand) = operand {
        children.push(space());
        children.push(operand.into());
    }
    children.push(semicolon.into());
    GreenNode::new(SyntaxKind::ThrowStatement, children)
}
