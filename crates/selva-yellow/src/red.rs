//! Red layer: positional handles over green values.
//!
//! Red handles pair a green value with an absolute offset, a sibling index,
//! and an upward link. They are salsa-interned, so positional identity is
//! plain value equality: the same position reached through different
//! iterations compares equal. The index keeps identical zero-width siblings
//! apart, since offset and green alone cannot tell them from each other.

use salsa::Database;
use text_size::{TextRange, TextSize};

use crate::SyntaxKind;
use crate::green::{
    Green, GreenNode, GreenToken, GreenTrivia, NodeOrToken, TriviaPiece, TriviaPieceKind,
};

pub type Red<'db> = NodeOrToken<RedNode<'db>, RedToken<'db>>;

impl<'db> Red<'db> {
    pub fn kind(self, db: &'db dyn Database) -> SyntaxKind {
        match self {
            Self::Node(node) => node.kind(db),
            Self::Token(token) => token.kind(db),
        }
    }

    pub fn text_range(self, db: &'db dyn Database) -> TextRange {
        match self {
            Self::Node(node) => node.text_range(db),
            Self::Token(token) => token.text_range(db),
        }
    }
}

/// Upward edge of a node.
///
/// A structured-trivia root has no tree parent; its upward relationship goes
/// through the trivia instance hosting it.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RedParent<'db> {
    Node(RedNode<'db>),
    Trivia(RedTrivia<'db>),
}

#[salsa::interned(debug)]
pub struct RedNode<'db> {
    pub parent: Option<RedParent<'db>>,
    pub index: u32,
    pub text_offset: TextSize,
    pub green: GreenNode<'db>,
}

impl<'db> RedNode<'db> {
    pub fn new_root(db: &'db dyn Database, root: GreenNode<'db>) -> Self {
        Self::new(db, None, 0, TextSize::new(0), root)
    }

    pub fn kind(self, db: &'db dyn Database) -> SyntaxKind {
        self.green(db).kind(db)
    }

    pub fn text_range(self, db: &'db dyn Database) -> TextRange {
        TextRange::at(self.text_offset(db), self.green(db).text_len(db))
    }

    /// Iterates the direct children, front to back or back to front.
    pub fn children(self, db: &'db dyn Database) -> RedChildren<'db> {
        let range = self.text_range(db);
        let children = self.green(db).children(db);
        RedChildren {
            db,
            parent: self,
            front_index: 0,
            back_index: children.len() as u32,
            front_offset: range.start(),
            back_offset: range.end(),
            children: children.iter(),
        }
    }

    /// Renders the subtree as an indented listing of kinds, ranges, and
    /// trivia pieces, descending into trivia structures.
    pub fn debug_dump(self, db: &'db dyn Database) -> String {
        let mut out = String::new();
        dump_node(db, self, 0, &mut out);
        out
    }
}

#[salsa::interned(debug)]
pub struct RedToken<'db> {
    pub parent: Option<RedNode<'db>>,
    pub index: u32,
    pub text_offset: TextSize,
    pub green: GreenToken<'db>,
}

impl<'db> RedToken<'db> {
    /// Creates a parentless token, the degenerate single-token tree.
    pub fn new_detached(db: &'db dyn Database, green: GreenToken<'db>) -> Self {
        Self::new(db, None, 0, TextSize::new(0), green)
    }

    pub fn kind(self, db: &'db dyn Database) -> SyntaxKind {
        self.green(db).kind(db)
    }

    /// Returns the range including attached trivia.
    pub fn text_range(self, db: &'db dyn Database) -> TextRange {
        let len = TextSize::new(self.green(db).text(db).len() as u32);
        TextRange::at(self.text_offset(db), len)
    }

    /// Returns the range with leading/trailing trivia trimmed away.
    pub fn text_trimmed_range(self, db: &'db dyn Database) -> TextRange {
        let green = self.green(db);
        let range = self.text_range(db);
        TextRange::new(range.start() + green.leading(db).len(), range.end() - green.trailing(db).len())
    }

    /// Returns the token text including trivia.
    pub fn text(self, db: &'db dyn Database) -> &'db str {
        self.green(db).text(db).as_ref()
    }

    /// Returns the token text excluding trivia.
    pub fn text_trimmed(self, db: &'db dyn Database) -> &'db str {
        self.green(db).text_trimmed(db)
    }

    pub fn is_zero_width(self, db: &'db dyn Database) -> bool {
        self.green(db).is_zero_width(db)
    }

    /// Iterates over leading trivia pieces.
    pub fn leading_trivia(self, db: &'db dyn Database) -> RedTriviaIter<'db> {
        let trivia = self.green(db).leading(db);
        let start = self.text_offset(db);
        RedTriviaIter::new(db, self, TriviaSide::Leading, trivia, start)
    }

    /// Iterates over trailing trivia pieces.
    pub fn trailing_trivia(self, db: &'db dyn Database) -> RedTriviaIter<'db> {
        let trivia = self.green(db).trailing(db);
        let start = self.text_range(db).end() - trivia.len();
        RedTriviaIter::new(db, self, TriviaSide::Trailing, trivia, start)
    }
}

/// Which trivia list of the owning token a piece belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TriviaSide {
    Leading,
    Trailing,
}

#[salsa::interned(debug)]
pub struct RedTrivia<'db> {
    pub token: RedToken<'db>,
    pub side: TriviaSide,
    pub index: u32,
    pub text_offset: TextSize,
}

impl<'db> RedTrivia<'db> {
    pub fn piece(self, db: &'db dyn Database) -> TriviaPiece<'db> {
        let green = self.token(db).green(db);
        let list = match self.side(db) {
            TriviaSide::Leading => green.leading(db),
            TriviaSide::Trailing => green.trailing(db),
        };
        list.pieces()[self.index(db) as usize]
    }

    pub fn kind(self, db: &'db dyn Database) -> TriviaPieceKind {
        self.piece(db).kind
    }

    pub fn len(self, db: &'db dyn Database) -> TextSize {
        self.piece(db).len
    }

    pub fn text_range(self, db: &'db dyn Database) -> TextRange {
        TextRange::at(self.text_offset(db), self.piece(db).len)
    }

    /// Returns the parsed structure of this piece, if it has one. The
    /// subtree's parent edge points back at this trivia, not at a node.
    pub fn structure(self, db: &'db dyn Database) -> Option<RedNode<'db>> {
        let structure = self.piece(db).structure?;
        Some(RedNode::new(db, Some(RedParent::Trivia(self)), 0, self.text_offset(db), structure))
    }
}

/// Double-ended iterator over a node's direct children.
///
/// Offsets are accumulated from the front and subtracted from the back, so
/// reverse scans cost the same as forward ones.
#[derive(Clone)]
pub struct RedChildren<'db> {
    db: &'db dyn Database,
    parent: RedNode<'db>,
    front_index: u32,
    back_index: u32,
    front_offset: TextSize,
    back_offset: TextSize,
    children: std::slice::Iter<'db, Green<'db>>,
}

impl<'db> RedChildren<'db> {
    fn make(&self, green: Green<'db>, index: u32, offset: TextSize) -> Red<'db> {
        match green {
            NodeOrToken::Node(node) => Red::Node(RedNode::new(
                self.db,
                Some(RedParent::Node(self.parent)),
                index,
                offset,
                node,
            )),
            NodeOrToken::Token(token) => {
                Red::Token(RedToken::new(self.db, Some(self.parent), index, offset, token))
            }
        }
    }
}

impl<'db> Iterator for RedChildren<'db> {
    type Item = Red<'db>;

    fn next(&mut self) -> Option<Self::Item> {
        let &green = self.children.next()?;
        let index = self.front_index;
        let offset = self.front_offset;
        self.front_index += 1;
        self.front_offset += green.text_len(self.db);
        Some(self.make(green, index, offset))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.children.size_hint()
    }
}

impl<'db> DoubleEndedIterator for RedChildren<'db> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let &green = self.children.next_back()?;
        self.back_index -= 1;
        self.back_offset -= green.text_len(self.db);
        Some(self.make(green, self.back_index, self.back_offset))
    }
}

impl ExactSizeIterator for RedChildren<'_> {
    fn len(&self) -> usize {
        self.children.len()
    }
}

/// Double-ended iterator over one trivia list of a token.
#[derive(Clone)]
pub struct RedTriviaIter<'db> {
    db: &'db dyn Database,
    token: RedToken<'db>,
    side: TriviaSide,
    trivia: GreenTrivia<'db>,
    front_index: u32,
    back_index: u32,
    front_offset: TextSize,
    back_offset: TextSize,
}

impl<'db> RedTriviaIter<'db> {
    fn new(
        db: &'db dyn Database,
        token: RedToken<'db>,
        side: TriviaSide,
        trivia: GreenTrivia<'db>,
        start: TextSize,
    ) -> Self {
        let back_index = trivia.pieces().len() as u32;
        let back_offset = start + trivia.len();
        Self { db, token, side, trivia, front_index: 0, back_index, front_offset: start, back_offset }
    }
}

impl<'db> Iterator for RedTriviaIter<'db> {
    type Item = RedTrivia<'db>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front_index == self.back_index {
            return None;
        }
        let piece = self.trivia.pieces()[self.front_index as usize];
        let trivia =
            RedTrivia::new(self.db, self.token, self.side, self.front_index, self.front_offset);
        self.front_index += 1;
        self.front_offset += piece.len;
        Some(trivia)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = (self.back_index - self.front_index) as usize;
        (len, Some(len))
    }
}

impl<'db> DoubleEndedIterator for RedTriviaIter<'db> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front_index == self.back_index {
            return None;
        }
        self.back_index -= 1;
        let piece = self.trivia.pieces()[self.back_index as usize];
        self.back_offset -= piece.len;
        Some(RedTrivia::new(self.db, self.token, self.side, self.back_index, self.back_offset))
    }
}

impl ExactSizeIterator for RedTriviaIter<'_> {
    fn len(&self) -> usize {
        (self.back_index - self.front_index) as usize
    }
}

fn dump_node<'db>(db: &'db dyn Database, node: RedNode<'db>, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    out.push_str(&format!("{indent}{:?}@{:?}\n", node.kind(db), node.text_range(db)));
    for child in node.children(db) {
        match child {
            Red::Node(it) => dump_node(db, it, depth + 1, out),
            Red::Token(it) => dump_token(db, it, depth + 1, out),
        }
    }
}

fn dump_token<'db>(db: &'db dyn Database, token: RedToken<'db>, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for trivia in token.leading_trivia(db) {
        dump_trivia(db, trivia, depth, "leading", out);
    }
    out.push_str(&format!(
        "{indent}{:?}@{:?} {:?}\n",
        token.kind(db),
        token.text_trimmed_range(db),
        token.text_trimmed(db),
    ));
    for trivia in token.trailing_trivia(db) {
        dump_trivia(db, trivia, depth, "trailing", out);
    }
}

fn dump_trivia<'db>(
    db: &'db dyn Database,
    trivia: RedTrivia<'db>,
    depth: usize,
    label: &str,
    out: &mut String,
) {
    let indent = "  ".repeat(depth);
    out.push_str(&format!("{indent}{label} {:?}@{:?}\n", trivia.kind(db), trivia.text_range(db)));
    if let Some(structure) = trivia.structure(db) {
        dump_node(db, structure, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use salsa::DatabaseImpl;

    use super::*;
    use crate::Builder;

    fn ws<'db>(len: u32) -> TriviaPiece<'db> {
        TriviaPiece::new(TriviaPieceKind::Whitespace, len.into())
    }

    fn module(db: &dyn Database) -> RedNode<'_> {
        let mut builder = Builder::new(db, "val x = 1;");
        builder.start_node(SyntaxKind::MODULE);
        builder.start_node(SyntaxKind::BINDING);
        builder.token_with_trivia(&[], SyntaxKind::VAL_KW, 3, &[ws(1)]);
        builder.token_with_trivia(&[], SyntaxKind::IDENT, 1, &[ws(1)]);
        builder.token_with_trivia(&[], SyntaxKind::EQ, 1, &[ws(1)]);
        builder.start_node(SyntaxKind::LITERAL);
        builder.token(SyntaxKind::NUMBER, 1);
        builder.finish_node();
        builder.finish_node();
        builder.token(SyntaxKind::SEMI, 1);
        builder.finish_node();
        RedNode::new_root(db, builder.finish())
    }

    #[test]
    fn children_offsets() {
        let db = DatabaseImpl::new();
        let root = module(&db);

        assert_eq!(root.text_range(&db), TextRange::new(0.into(), 10.into()));

        let mut children = root.children(&db);
        let binding = children.next().unwrap().into_node().unwrap();
        let semi = children.next().unwrap().into_token().unwrap();
        assert!(children.next().is_none());

        assert_eq!(binding.kind(&db), SyntaxKind::BINDING);
        assert_eq!(binding.text_range(&db), TextRange::new(0.into(), 9.into()));
        assert_eq!(semi.kind(&db), SyntaxKind::SEMI);
        assert_eq!(semi.text_range(&db), TextRange::new(9.into(), 10.into()));

        let val = binding.children(&db).next().unwrap().into_token().unwrap();
        assert_eq!(val.text(&db), "val ");
        assert_eq!(val.text_trimmed(&db), "val");
        assert_eq!(val.text_trimmed_range(&db), TextRange::new(0.into(), 3.into()));
    }

    #[test]
    fn reverse_children_match_forward() {
        let db = DatabaseImpl::new();
        let root = module(&db);
        let binding = root.children(&db).next().unwrap().into_node().unwrap();

        let forward: Vec<_> = binding.children(&db).collect();
        let mut backward: Vec<_> = binding.children(&db).rev().collect();
        backward.reverse();

        assert_eq!(forward, backward);
    }

    #[test]
    fn positional_identity_is_equality() {
        let db = DatabaseImpl::new();
        let root = module(&db);

        let first = root.children(&db).next().unwrap();
        let again = root.children(&db).next().unwrap();
        assert_eq!(first, again);

        let last = root.children(&db).next_back().unwrap();
        assert_ne!(first, last);
    }

    #[test]
    fn identical_zero_width_siblings_stay_distinct() {
        let db = DatabaseImpl::new();
        let mut builder = Builder::new(&db, "");
        builder.start_node(SyntaxKind::MODULE);
        builder.start_node(SyntaxKind::ERROR);
        builder.finish_node();
        builder.start_node(SyntaxKind::ERROR);
        builder.finish_node();
        builder.token(SyntaxKind::UNKNOWN, 0);
        builder.token(SyntaxKind::UNKNOWN, 0);
        builder.finish_node();
        let root = RedNode::new_root(&db, builder.finish());

        let children: Vec<_> = root.children(&db).collect();
        assert_eq!(children.len(), 4);
        assert_ne!(children[0], children[1]);
        assert_ne!(children[2], children[3]);

        let mut backward: Vec<_> = root.children(&db).rev().collect();
        backward.reverse();
        assert_eq!(children, backward);
    }

    #[test]
    fn trivia_iteration() {
        let db = DatabaseImpl::new();
        let root = module(&db);
        let binding = root.children(&db).next().unwrap().into_node().unwrap();
        let val = binding.children(&db).next().unwrap().into_token().unwrap();

        assert_eq!(val.leading_trivia(&db).len(), 0);
        let trailing: Vec<_> = val.trailing_trivia(&db).collect();
        assert_eq!(trailing.len(), 1);
        assert_eq!(trailing[0].kind(&db), TriviaPieceKind::Whitespace);
        assert_eq!(trailing[0].text_range(&db), TextRange::new(3.into(), 4.into()));
        assert_eq!(trailing[0].token(&db), val);
        assert!(trailing[0].structure(&db).is_none());
    }

    #[test]
    fn structured_trivia_parent_edge() {
        let db = DatabaseImpl::new();

        let directive = {
            let mut builder = Builder::new(&db, "#if x");
            builder.start_node(SyntaxKind::DIRECTIVE);
            builder.token(SyntaxKind::HASH, 1);
            builder.token_with_trivia(&[], SyntaxKind::IF_KW, 2, &[ws(1)]);
            builder.token(SyntaxKind::IDENT, 1);
            builder.finish_node();
            builder.finish()
        };

        let mut builder = Builder::new(&db, "#if xval");
        builder.start_node(SyntaxKind::MODULE);
        builder.token_with_trivia(
            &[TriviaPiece::structured(&db, TriviaPieceKind::Directive, directive)],
            SyntaxKind::VAL_KW,
            3,
            &[],
        );
        builder.finish_node();
        let root = RedNode::new_root(&db, builder.finish());

        let val = root.children(&db).next().unwrap().into_token().unwrap();
        let host = val.leading_trivia(&db).next().unwrap();
        let structure = host.structure(&db).unwrap();

        assert_eq!(structure.kind(&db), SyntaxKind::DIRECTIVE);
        assert_eq!(structure.text_range(&db), TextRange::new(0.into(), 5.into()));
        assert_eq!(structure.parent(&db), Some(RedParent::Trivia(host)));
        assert_eq!(host.token(&db), val);
    }
}
