//! Positioned, navigable view over a green tree.
//!
//! A [`SyntaxTree`] flattens a green root into an arena of entries indexed by
//! [`NodeId`]. Each entry knows its parent, its children and its absolute
//! span. The arena is built once and never mutated, so a tree can be shared
//! across threads and inspected by any number of rules at the same time.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::green::{GreenElement, GreenNode};
use super::token::{LineCol, LineIndex, Span, SyntaxKind};

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeId(u64);

impl TreeId {
    fn fresh() -> Self {
        TreeId(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Index of a node or token within its tree. Only meaningful for the tree
/// that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
struct NodeData {
    kind: SyntaxKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    index_in_parent: u32,
    span: Span,
    green: GreenElement,
}

/// An immutable syntax tree for one source text.
pub struct SyntaxTree {
    id: TreeId,
    text: String,
    nodes: Vec<NodeData>,
    lines: LineIndex,
}

impl SyntaxTree {
    /// Lay out `green` as a positioned tree.
    pub fn new(green: GreenNode) -> Self {
        let text = green.to_string();
        let mut nodes: Vec<NodeData> = Vec::new();
        let root = GreenElement::Node(green);
        let mut stack: Vec<(GreenElement, Option<NodeId>, u32, usize)> = vec![(root, None, 0, 0)];

        // Pre-order: children are pushed in reverse so they are visited left to right.
        while let Some((element, parent, index_in_parent, offset)) = stack.pop() {
            let id = NodeId(nodes.len() as u32);
            let span = Span::new(offset, offset + element.text_len());
            if let Some(parent) = parent {
                nodes[parent.index()].children.push(id);
            }

            if let GreenElement::Node(node) = &element {
                let mut child_offset = offset;
                let mut pending = Vec::with_capacity(node.children().len());
                for (i, child) in node.children().iter().enumerate() {
                    pending.push((child.clone(), Some(id), i as u32, child_offset));
                    child_offset += child.text_len();
                }
                stack.extend(pending.into_iter().rev());
            }

            nodes.push(NodeData {
                kind: element.kind(),
                parent,
                children: Vec::new(),
                index_in_parent,
                span,
                green: element,
            });
        }

        let lines = LineIndex::new(&text);
        SyntaxTree {
            id: TreeId::fresh(),
            text,
            nodes,
            lines,
        }
    }

    pub fn id(&self) -> TreeId {
        self.id
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Full source text of the tree.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of entries (nodes and tokens).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns true if `id` belongs to this tree's arena.
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn kind(&self, id: NodeId) -> SyntaxKind {
        self.nodes[id.index()].kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    pub fn green(&self, id: NodeId) -> &GreenElement {
        &self.nodes[id.index()].green
    }

    /// Source text covered by `id`.
    pub fn node_text(&self, id: NodeId) -> &str {
        self.span(id).slice(&self.text)
    }

    /// Text of a token, or `None` if `id` is a node.
    pub fn token_text(&self, id: NodeId) -> Option<&str> {
        self.green(id).as_token().map(|t| t.text())
    }

    pub fn is_token(&self, id: NodeId) -> bool {
        self.kind(id).is_token()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    /// Position of `id` among its parent's children.
    pub fn index_in_parent(&self, id: NodeId) -> usize {
        self.nodes[id.index()].index_in_parent as usize
    }

    /// All children, trivia included.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// Children that are nodes (no tokens).
    pub fn child_nodes(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&c| self.kind(c).is_node())
    }

    /// Children that are not trivia.
    pub fn significant_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&c| !self.kind(c).is_trivia())
    }

    pub fn first_child_of_kind(&self, id: NodeId, kind: SyntaxKind) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| self.kind(c) == kind)
    }

    /// First child node (not token), if any.
    pub fn first_child_node(&self, id: NodeId) -> Option<NodeId> {
        self.child_nodes(id).next()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        self.children(parent)
            .get(self.index_in_parent(id) + 1)
            .copied()
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id);
        if index == 0 {
            return None;
        }
        self.children(parent).get(index - 1).copied()
    }

    /// Strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    pub fn first_ancestor_of_kind(&self, id: NodeId, kind: SyntaxKind) -> Option<NodeId> {
        self.ancestors(id).find(|&a| self.kind(a) == kind)
    }

    /// `id` and everything below it, in pre-order.
    ///
    /// The arena is laid out in pre-order, so a subtree is a contiguous
    /// index range ending where the next non-descendant begins.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let span = self.span(id);
        let start = id.index();
        let end = self.subtree_end(id);
        debug_assert!(self.nodes[start..end]
            .iter()
            .all(|n| span.contains(&n.span)));
        (start..end).map(|i| NodeId(i as u32))
    }

    fn subtree_end(&self, id: NodeId) -> usize {
        let mut current = id;
        loop {
            if let Some(next) = self.next_sibling(current) {
                return next.index();
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return self.nodes.len(),
            }
        }
    }

    /// 1-based line and column of a byte offset.
    pub fn line_col(&self, offset: usize) -> LineCol {
        self.lines.line_col(&self.text, offset)
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.lines
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("id", &self.id)
            .field("len", &self.nodes.len())
            .field("text_len", &self.text.len())
            .finish()
    }
}

/// Iterator over the strict ancestors of a node.
pub struct Ancestors<'a> {
    tree: &'a SyntaxTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    fn tree(source: &str) -> SyntaxTree {
        parse(source).tree
    }

    fn find(tree: &SyntaxTree, kind: SyntaxKind) -> NodeId {
        tree.descendants(tree.root())
            .find(|&n| tree.kind(n) == kind)
            .unwrap_or_else(|| panic!("no {:?} in tree", kind))
    }

    #[test]
    fn test_text_round_trips() {
        let source = "class C {\n  // note\n  void M() { a.b(c); }\n}\n";
        assert_eq!(tree(source).text(), source);
    }

    #[test]
    fn test_spans_nest_and_order() {
        let t = tree("class C { void M() { var x = a.Where(y => y > 1).First(); } }");
        for id in t.descendants(t.root()) {
            let span = t.span(id);
            let mut last_end = span.start;
            for &child in t.children(id) {
                let child_span = t.span(child);
                assert!(span.contains(&child_span), "{:?} escapes parent", t.kind(child));
                assert!(child_span.start >= last_end, "children overlap");
                last_end = child_span.end;
                assert_eq!(t.parent(child), Some(id));
            }
        }
    }

    #[test]
    fn test_ancestors_and_siblings() {
        let t = tree("class C { void M() { throw ex; } }");
        let throw = find(&t, SyntaxKind::ThrowStatement);
        let kinds: Vec<_> = t.ancestors(throw).map(|a| t.kind(a)).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::Block,
                SyntaxKind::MethodDeclaration,
                SyntaxKind::ClassDeclaration,
                SyntaxKind::CompilationUnit
            ]
        );
        assert_eq!(
            t.first_ancestor_of_kind(throw, SyntaxKind::MethodDeclaration)
                .map(|m| t.kind(m)),
            Some(SyntaxKind::MethodDeclaration)
        );

        let keyword = t.children(throw)[0];
        assert_eq!(t.token_text(keyword), Some("throw"));
        let space = t.next_sibling(keyword).unwrap();
        assert_eq!(t.kind(space), SyntaxKind::Whitespace);
        assert_eq!(t.prev_sibling(space), Some(keyword));
    }

    #[test]
    fn test_descendants_stay_in_subtree() {
        let t = tree("class C { void M() { f(); } void N() { g(); } }");
        let first_method = find(&t, SyntaxKind::MethodDeclaration);
        let texts: Vec<_> = t
            .descendants(first_method)
            .filter(|&n| t.kind(n) == SyntaxKind::Ident)
            .map(|n| t.node_text(n))
            .collect();
        assert_eq!(texts, vec!["M", "f"]);
    }

    #[test]
    fn test_tree_ids_are_unique() {
        let a = tree("class A {}");
        let b = tree("class A {}");
        assert_ne!(a.id(), b.id());
    }
}
