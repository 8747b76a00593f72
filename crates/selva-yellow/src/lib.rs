//! Lossless, immutable syntax tree with attached trivia and filterable token
//! navigation.
//!
//! The tree is split into a green layer (interned, position-independent
//! values) and a red layer (positional handles with offsets and parent
//! links). A trivia piece may host a full parsed subtree of its own;
//! navigation descends into and climbs out of those subtrees so callers see
//! one flat left-to-right token stream.

mod builder;
mod cursor;
mod green;
mod navigator;
mod red;
mod syntax_kind;

/// Event-based construction of green trees.
pub use builder::Builder;
/// Preorder traversal over red nodes and tokens.
pub use cursor::{Preorder, WalkEvent};
/// Position-independent tree values.
pub use green::{
    Green, GreenNode, GreenToken, GreenTrivia, NodeOrToken, TriviaPiece, TriviaPieceKind,
};
/// Navigation flags and predicates.
pub use navigator::{NavigationFlags, TokenPredicate, TriviaPredicate};
/// Positional handles over green values.
pub use red::{
    Red, RedChildren, RedNode, RedParent, RedToken, RedTrivia, RedTriviaIter, TriviaSide,
};
/// Token and node kinds used throughout the tree.
pub use syntax_kind::SyntaxKind;
