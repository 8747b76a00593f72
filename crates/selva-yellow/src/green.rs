//! Green layer: position-independent, interned tree values.
//!
//! Green values carry kinds, text, and trivia but no offsets or parent links.
//! A trivia piece may own a parsed subtree of its own (directives, doc
//! comments, skipped tokens); that subtree is a full green tree whose text is
//! embedded in the hosting token's text.

use salsa::Database;
use text_size::TextSize;
use triomphe::ThinArc;

use crate::SyntaxKind;

/// Node-or-token wrapper used throughout the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeOrToken<N, T> {
    Node(N),
    Token(T),
}

impl<N, T> NodeOrToken<N, T> {
    /// Converts into the node variant, if any.
    pub fn into_node(self) -> Option<N> {
        match self {
            Self::Node(node) => Some(node),
            Self::Token(_) => None,
        }
    }

    /// Converts into the token variant, if any.
    pub fn into_token(self) -> Option<T> {
        match self {
            Self::Node(_) => None,
            Self::Token(token) => Some(token),
        }
    }
}

pub type Green<'db> = NodeOrToken<GreenNode<'db>, GreenToken<'db>>;

impl Green<'_> {
    pub fn text_len(&self, db: &dyn Database) -> TextSize {
        match self {
            Self::Node(node) => node.text_len(db),
            Self::Token(token) => TextSize::new(token.text(db).len() as u32),
        }
    }
}

#[salsa::interned(constructor = alloc, debug)]
pub struct GreenNode<'db> {
    pub kind: SyntaxKind,
    #[returns(ref)]
    pub children: Vec<Green<'db>>,
    pub text_len: TextSize,
}

impl<'db> GreenNode<'db> {
    pub fn new(db: &'db dyn Database, kind: SyntaxKind, children: Vec<Green<'db>>) -> Self {
        let text_len: TextSize = children.iter().map(|child| child.text_len(db)).sum();
        Self::alloc(db, kind, children, text_len)
    }
}

#[salsa::interned(debug)]
pub struct GreenToken<'db> {
    pub leading: GreenTrivia<'db>,
    pub kind: SyntaxKind,
    #[returns(ref)]
    pub text: Box<str>,
    pub trailing: GreenTrivia<'db>,
}

impl<'db> GreenToken<'db> {
    fn leading_trailing_total_len(self, db: &'db dyn Database) -> (TextSize, TextSize, TextSize) {
        let leading_len = self.leading(db).len();
        let trailing_len = self.trailing(db).len();
        let total_len = self.text(db).len() as u32;

        (leading_len, trailing_len, total_len.into())
    }

    /// Returns the token text with leading and trailing trivia sliced away.
    pub fn text_trimmed(self, db: &'db dyn Database) -> &'db str {
        let (leading_len, trailing_len, total_len) = self.leading_trailing_total_len(db);

        let start: usize = leading_len.into();
        let end: usize = (total_len - trailing_len).into();

        &self.text(db)[start..end]
    }

    /// Returns the length of the token text excluding trivia.
    pub fn width(self, db: &'db dyn Database) -> TextSize {
        let (leading_len, trailing_len, total_len) = self.leading_trailing_total_len(db);
        total_len - leading_len - trailing_len
    }

    /// Returns `true` if the token consumed no source text of its own.
    pub fn is_zero_width(self, db: &'db dyn Database) -> bool {
        self.width(db) == TextSize::new(0)
    }
}

/// Trivia list attached to one side of a token.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct GreenTrivia<'db> {
    ptr: Option<ThinArc<TextSize, TriviaPiece<'db>>>,
}

impl std::fmt::Debug for GreenTrivia<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GreenTrivia")
            .field("pieces", &self.pieces())
            .field("total_len", &self.len())
            .finish()
    }
}

impl<'db> GreenTrivia<'db> {
    pub fn new(pieces: &[TriviaPiece<'db>]) -> Self {
        if pieces.is_empty() {
            return Self::empty();
        }
        let total_len: TextSize = pieces.iter().map(|piece| piece.len).sum();
        Self { ptr: Some(ThinArc::from_header_and_slice(total_len, pieces)) }
    }

    pub const fn empty() -> Self {
        Self { ptr: None }
    }

    pub fn len(&self) -> TextSize {
        match self.ptr {
            None => TextSize::new(0),
            Some(ref ptr) => ptr.header.header,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ptr.is_none()
    }

    pub fn pieces(&self) -> &[TriviaPiece<'db>] {
        match &self.ptr {
            None => &[],
            Some(ptr) => &ptr.slice,
        }
    }
}

/// A trivia fragment, optionally hosting a parsed subtree.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TriviaPiece<'db> {
    pub kind: TriviaPieceKind,
    pub len: TextSize,
    /// Parsed structure of the piece, if any. The subtree's text occupies
    /// exactly this piece's extent inside the hosting token's text.
    pub structure: Option<GreenNode<'db>>,
}

impl<'db> TriviaPiece<'db> {
    pub fn new(kind: TriviaPieceKind, len: TextSize) -> Self {
        Self { kind, len, structure: None }
    }

    /// Creates a piece hosting `structure`; the piece length is the subtree's.
    pub fn structured(
        db: &'db dyn Database,
        kind: TriviaPieceKind,
        structure: GreenNode<'db>,
    ) -> Self {
        Self { kind, len: structure.text_len(db), structure: Some(structure) }
    }
}

/// Kinds of trivia stored alongside tokens.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TriviaPieceKind {
    Whitespace,
    Newline,
    LineComment,
    DocComment,
    Directive,
    SkippedTokens,
}
