//! Immutable, reference-counted tree elements.
//!
//! Green elements carry kind, text and length but no position or parent, so a
//! subtree can be shared between any number of trees. A rewrite builds a few
//! new green nodes along one ancestor chain and shares everything else.

use std::fmt;
use std::sync::Arc;

use super::token::SyntaxKind;

#[derive(Debug, PartialEq, Eq, Hash)]
struct GreenTokenData {
    kind: SyntaxKind,
    text: String,
}

/// A leaf: a token kind plus its exact source text.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct GreenToken(Arc<GreenTokenData>);

impl GreenToken {
    pub fn new(kind: SyntaxKind, text: impl Into<String>) -> Self {
        debug_assert!(kind.is_token(), "{:?} is not a token kind", kind);
        GreenToken(Arc::new(GreenTokenData {
            kind,
            text: text.into(),
        }))
    }

    pub fn kind(&self) -> SyntaxKind {
        self.0.kind
    }

    pub fn text(&self) -> &str {
        &self.0.text
    }

    pub fn text_len(&self) -> usize {
        self.0.text.len()
    }
}

impl fmt::Debug for GreenToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.text())
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct GreenNodeData {
    kind: SyntaxKind,
    text_len: usize,
    children: Vec<GreenElement>,
}

/// An interior node: a kind plus ordered children.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct GreenNode(Arc<GreenNodeData>);

impl GreenNode {
    pub fn new(kind: SyntaxKind, children: Vec<GreenElement>) -> Self {
        debug_assert!(kind.is_node(), "{:?} is not a node kind", kind);
        let text_len = children.iter().map(GreenElement::text_len).sum();
        GreenNode(Arc::new(GreenNodeData {
            kind,
            text_len,
            children,
        }))
    }

    pub fn kind(&self) -> SyntaxKind {
        self.0.kind
    }

    pub fn text_len(&self) -> usize {
        self.0.text_len
    }

    pub fn children(&self) -> &[GreenElement] {
        &self.0.children
    }

    /// Returns a copy of this node with child `index` replaced.
    ///
    /// Only the child vector is copied; every child is an `Arc` clone.
    pub fn replace_child(&self, index: usize, replacement: GreenElement) -> GreenNode {
        let mut children = self.0.children.clone();
        children[index] = replacement;
        GreenNode::new(self.kind(), children)
    }

    /// Returns true if both handles point at the same allocation.
    pub fn ptr_eq(&self, other: &GreenNode) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn write_text(&self, out: &mut String) {
        for child in self.children() {
            match child {
                GreenElement::Node(node) => node.write_text(out),
                GreenElement::Token(token) => out.push_str(token.text()),
            }
        }
    }
}

impl fmt::Display for GreenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut text = String::with_capacity(self.text_len());
        self.write_text(&mut text);
        f.write_str(&text)
    }
}

impl fmt::Debug for GreenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{}", self.kind(), self.text_len())
    }
}

/// Either a node or a token.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum GreenElement {
    Node(GreenNode),
    Token(GreenToken),
}

impl GreenElement {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            GreenElement::Node(node) => node.kind(),
            GreenElement::Token(token) => token.kind(),
        }
    }

    pub fn text_len(&self) -> usize {
        match self {
            GreenElement::Node(node) => node.text_len(),
            GreenElement::Token(token) => token.text_len(),
        }
    }

    pub fn as_node(&self) -> Option<&GreenNode> {
        match self {
            GreenElement::Node(node) => Some(node),
            GreenElement::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&GreenToken> {
        match self {
            GreenElement::Token(token) => Some(token),
            GreenElement::Node(_) => None,
        }
    }
}

impl From<GreenNode> for GreenElement {
    fn from(node: GreenNode) -> Self {
        GreenElement::Node(node)
    }
}

impl From<GreenToken> for GreenElement {
    fn from(token: GreenToken) -> Self {
        GreenElement::Token(token)
    }
}

impl fmt::Display for GreenElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GreenElement::Node(node) => fmt::Display::fmt(node, f),
            GreenElement::Token(token) => f.write_str(token.text()),
        }
    }
}

impl fmt::Debug for GreenElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GreenElement::Node(node) => fmt::Debug::fmt(node, f),
            GreenElement::Token(token) => fmt::Debug::fmt(token, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(text: &str) -> GreenElement {
        GreenNode::new(
            SyntaxKind::IdentifierName,
            vec![GreenToken::new(SyntaxKind::Ident, text).into()],
        )
        .into()
    }

    #[test]
    fn test_text_len_and_display() {
        let access = GreenNode::new(
            SyntaxKind::MemberAccess,
            vec![
                name("items"),
                GreenToken::new(SyntaxKind::Dot, ".").into(),
                name("Count"),
            ],
        );
        assert_eq!(access.text_len(), 11);
        assert_eq!(access.to_string(), "items.Count");
    }

    #[test]
    fn test_replace_child_shares_siblings() {
        let receiver = name("items");
        let access = GreenNode::new(
            SyntaxKind::MemberAccess,
            vec![
                receiver.clone(),
                GreenToken::new(SyntaxKind::Dot, ".").into(),
                name("Count"),
            ],
        );
        let replaced = access.replace_child(2, name("Length"));
        assert_eq!(replaced.to_string(), "items.Length");
        assert_eq!(access.to_string(), "items.Count");

        let (old, new) = (
            access.children()[0].as_node().unwrap(),
            replaced.children()[0].as_node().unwrap(),
        );
        assert!(old.ptr_eq(new));
    }
}
