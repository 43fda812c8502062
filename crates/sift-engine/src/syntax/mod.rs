//! Lossless syntax trees for C# source.
//!
//! Two layers, in the style of red/green trees:
//!
//! - [`green`]: immutable, reference-counted nodes and tokens with no
//!   position or parent. Subtrees are shared between trees.
//! - [`tree`]: a [`SyntaxTree`] arena that lays a green root out with
//!   absolute spans and parent back-references for navigation.
//!
//! [`parse`] builds a tree from source text; [`make`] builds the green
//! fragments that rewrites splice in.

pub mod ast;
pub mod green;
pub mod lexer;
pub mod make;
pub mod parser;
pub mod token;
pub mod tree;

pub use green::{GreenElement, GreenNode, GreenToken};
pub use parser::{parse, Parse, ParseError};
pub use token::{LineCol, LineIndex, Span, SyntaxKind};
pub use tree::{NodeId, SyntaxTree, TreeId};
