//! Event-based construction of green trees.
//!
//! Token and trivia lengths are consumed left to right from the text given up
//! front; `finish` asserts the whole text was claimed. A structured trivia
//! piece is built separately over its own slice of the text and attached via
//! [`TriviaPiece::structured`]; its characters are claimed by the hosting
//! token.

use text_size::TextSize;

use crate::SyntaxKind;
use crate::green::{Green, GreenNode, GreenToken, GreenTrivia, NodeOrToken, TriviaPiece};

/// Builds a green tree from parser-style events over `text`.
pub struct Builder<'db> {
    db: &'db dyn salsa::Database,
    text: Box<str>,
    pos: TextSize,
    parents: Vec<(SyntaxKind, usize)>,
    children: Vec<Green<'db>>,
}

impl<'db> Builder<'db> {
    pub fn new(db: &'db dyn salsa::Database, text: &str) -> Self {
        Self {
            db,
            text: text.into(),
            pos: TextSize::new(0),
            parents: Vec::with_capacity(16),
            children: Vec::with_capacity(16),
        }
    }

    /// Starts a new node of the given kind.
    pub fn start_node(&mut self, kind: SyntaxKind) {
        self.parents.push((kind, self.children.len()));
    }

    /// Finishes the most recently started node.
    pub fn finish_node(&mut self) {
        let (kind, first_child) = self.parents.pop().expect("unbalanced `finish_node`");
        let children = self.children.split_off(first_child);
        let node = GreenNode::new(self.db, kind, children);
        self.children.push(NodeOrToken::Node(node));
    }

    /// Adds a token without trivia, consuming `len` bytes of the text.
    pub fn token(&mut self, kind: SyntaxKind, len: u32) {
        self.token_with_trivia(&[], kind, len, &[]);
    }

    /// Adds a token with its leading and trailing trivia pieces. The token
    /// text spans the trivia extents on both sides.
    pub fn token_with_trivia(
        &mut self,
        leading: &[TriviaPiece<'db>],
        kind: SyntaxKind,
        len: u32,
        trailing: &[TriviaPiece<'db>],
    ) {
        let leading = GreenTrivia::new(leading);
        let trailing = GreenTrivia::new(trailing);
        let full_len = leading.len() + TextSize::new(len) + trailing.len();

        let start = usize::from(self.pos);
        let end = usize::from(self.pos + full_len);
        assert!(end <= self.text.len(), "token extends past the end of the text");
        assert!(
            self.text.is_char_boundary(start) && self.text.is_char_boundary(end),
            "token must start and end on char boundaries"
        );

        let text: Box<str> = self.text[start..end].into();
        let token = GreenToken::new(self.db, leading, kind, text, trailing);
        self.children.push(NodeOrToken::Token(token));
        self.pos += full_len;
    }

    /// Finishes building and returns the green root.
    pub fn finish(mut self) -> GreenNode<'db> {
        assert!(self.parents.is_empty(), "unfinished nodes");
        assert_eq!(usize::from(self.pos), self.text.len(), "unconsumed text");
        match self.children.pop() {
            Some(NodeOrToken::Node(root)) if self.children.is_empty() => root,
            _ => panic!("expected exactly one root node"),
        }
    }
}

#[cfg(test)]
mod tests {
    use expect_test::expect;
    use salsa::DatabaseImpl;

    use super::*;
    use crate::green::TriviaPieceKind;
    use crate::red::RedNode;

    #[test]
    fn dump_tree_with_structured_trivia() {
        let db = DatabaseImpl::new();

        let directive = {
            let mut builder = Builder::new(&db, "#x ");
            builder.start_node(SyntaxKind::DIRECTIVE);
            builder.token(SyntaxKind::HASH, 1);
            builder.token_with_trivia(
                &[],
                SyntaxKind::IDENT,
                1,
                &[TriviaPiece::new(TriviaPieceKind::Whitespace, 1.into())],
            );
            builder.finish_node();
            builder.finish()
        };

        let mut builder = Builder::new(&db, "a#x b//c");
        builder.start_node(SyntaxKind::MODULE);
        builder.token(SyntaxKind::IDENT, 1);
        builder.token_with_trivia(
            &[TriviaPiece::structured(&db, TriviaPieceKind::Directive, directive)],
            SyntaxKind::IDENT,
            1,
            &[TriviaPiece::new(TriviaPieceKind::LineComment, 3.into())],
        );
        builder.finish_node();
        let root = RedNode::new_root(&db, builder.finish());

        expect![[r##"
            MODULE@0..8
              IDENT@0..1 "a"
              leading Directive@1..4
                DIRECTIVE@1..4
                  HASH@1..2 "#"
                  IDENT@2..3 "x"
                  trailing Whitespace@3..4
              IDENT@4..5 "b"
              trailing LineComment@5..8
        "##]]
        .assert_eq(&root.debug_dump(&db));
    }

    #[test]
    #[should_panic = "unconsumed text"]
    fn unconsumed_text_panics() {
        let db = DatabaseImpl::new();
        let mut builder = Builder::new(&db, "val x");
        builder.start_node(SyntaxKind::MODULE);
        builder.token(SyntaxKind::VAL_KW, 3);
        builder.finish_node();
        builder.finish();
    }
}
