//! Filterable token navigation: first/last token of a subtree and
//! next/previous token from a token or trivia position.
//!
//! Structured trivia is treated as a second tree grafted onto the primary
//! one. Bounded search descends into trivia structures the descent predicate
//! accepts; positional search exits an exhausted structure through the trivia
//! instance hosting it and resumes the sibling scan from that position, so
//! callers observe a single flat left-to-right token stream.
//!
//! Node descent and ascent are iterative; the remaining recursion goes
//! through nested trivia structures only, so stack use is bounded by trivia
//! nesting depth rather than tree depth.

use salsa::Database;

use crate::green::TriviaPieceKind;
use crate::red::{Red, RedNode, RedParent, RedToken, RedTrivia};

/// Flags controlling which tokens and structured trivia navigation reports.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct NavigationFlags {
    /// Report tokens that consumed no source text.
    pub zero_width: bool,
    /// Descend into skipped-token trivia.
    pub skipped_tokens: bool,
    /// Descend into preprocessor-directive trivia.
    pub directives: bool,
    /// Descend into documentation-comment trivia.
    pub doc_comments: bool,
}

impl NavigationFlags {
    fn steps_into_any(self) -> bool {
        self.skipped_tokens || self.directives || self.doc_comments
    }

    pub fn token_predicate<'a, 'db>(self) -> TokenPredicate<'a, 'db> {
        if self.zero_width { TokenPredicate::Any } else { TokenPredicate::NonZeroWidth }
    }

    pub fn trivia_predicate<'a, 'db>(self) -> TriviaPredicate<'a, 'db> {
        if self.steps_into_any() {
            TriviaPredicate::Categories(self)
        } else {
            TriviaPredicate::Nothing
        }
    }
}

/// Token acceptance predicate.
///
/// The fixed variants cover the common cases without an indirect call and
/// keep "no filtering" recognizable by a tag check.
#[derive(Clone, Copy)]
pub enum TokenPredicate<'a, 'db> {
    Any,
    NonZeroWidth,
    Custom(&'a dyn Fn(&'db dyn Database, RedToken<'db>) -> bool),
}

impl<'db> TokenPredicate<'_, 'db> {
    fn matches(self, db: &'db dyn Database, token: RedToken<'db>) -> bool {
        match self {
            Self::Any => true,
            Self::NonZeroWidth => !token.is_zero_width(db),
            Self::Custom(predicate) => predicate(db, token),
        }
    }
}

/// Descent predicate deciding which structured trivia get searched.
#[derive(Clone, Copy)]
pub enum TriviaPredicate<'a, 'db> {
    /// Never descend; trivia lists are not scanned at all.
    Nothing,
    /// Descend when the piece's structural category flag is set.
    Categories(NavigationFlags),
    Custom(&'a dyn Fn(&'db dyn Database, RedTrivia<'db>) -> bool),
}

impl<'db> TriviaPredicate<'_, 'db> {
    /// Fast path: whether any trivia scan can succeed at all.
    fn steps_into_trivia(self) -> bool {
        !matches!(self, Self::Nothing)
    }

    fn matches(self, db: &'db dyn Database, trivia: RedTrivia<'db>) -> bool {
        match self {
            Self::Nothing => false,
            Self::Categories(flags) => match trivia.kind(db) {
                TriviaPieceKind::SkippedTokens => flags.skipped_tokens,
                TriviaPieceKind::Directive => flags.directives,
                TriviaPieceKind::DocComment => flags.doc_comments,
                _ => false,
            },
            Self::Custom(predicate) => predicate(db, trivia),
        }
    }
}

fn first_token<'db>(
    db: &'db dyn Database,
    node: RedNode<'db>,
    predicate: TokenPredicate<'_, 'db>,
    step_into: TriviaPredicate<'_, 'db>,
) -> Option<RedToken<'db>> {
    let mut stack = vec![node.children(db)];
    while let Some(children) = stack.last_mut() {
        match children.next() {
            Some(Red::Node(child)) => stack.push(child.children(db)),
            Some(Red::Token(child)) => {
                if let Some(token) = first_token_of(db, child, predicate, step_into) {
                    return Some(token);
                }
            }
            None => {
                stack.pop();
            }
        }
    }
    None
}

fn last_token<'db>(
    db: &'db dyn Database,
    node: RedNode<'db>,
    predicate: TokenPredicate<'_, 'db>,
    step_into: TriviaPredicate<'_, 'db>,
) -> Option<RedToken<'db>> {
    let mut stack = vec![node.children(db)];
    while let Some(children) = stack.last_mut() {
        match children.next_back() {
            Some(Red::Node(child)) => stack.push(child.children(db)),
            Some(Red::Token(child)) => {
                if let Some(token) = last_token_of(db, child, predicate, step_into) {
                    return Some(token);
                }
            }
            None => {
                stack.pop();
            }
        }
    }
    None
}

/// Leading trivia, then the token itself, then trailing trivia.
fn first_token_of<'db>(
    db: &'db dyn Database,
    token: RedToken<'db>,
    predicate: TokenPredicate<'_, 'db>,
    step_into: TriviaPredicate<'_, 'db>,
) -> Option<RedToken<'db>> {
    if step_into.steps_into_trivia()
        && let Some(found) = first_token_in_list(db, token.leading_trivia(db), predicate, step_into)
    {
        return Some(found);
    }
    if predicate.matches(db, token) {
        return Some(token);
    }
    if step_into.steps_into_trivia()
        && let Some(found) =
            first_token_in_list(db, token.trailing_trivia(db), predicate, step_into)
    {
        return Some(found);
    }
    None
}

/// Trailing trivia, then the token itself, then leading trivia.
fn last_token_of<'db>(
    db: &'db dyn Database,
    token: RedToken<'db>,
    predicate: TokenPredicate<'_, 'db>,
    step_into: TriviaPredicate<'_, 'db>,
) -> Option<RedToken<'db>> {
    if step_into.steps_into_trivia()
        && let Some(found) =
            last_token_in_list(db, token.trailing_trivia(db).rev(), predicate, step_into)
    {
        return Some(found);
    }
    if predicate.matches(db, token) {
        return Some(token);
    }
    if step_into.steps_into_trivia()
        && let Some(found) =
            last_token_in_list(db, token.leading_trivia(db).rev(), predicate, step_into)
    {
        return Some(found);
    }
    None
}

fn first_token_in_list<'db>(
    db: &'db dyn Database,
    list: impl Iterator<Item = RedTrivia<'db>>,
    predicate: TokenPredicate<'_, 'db>,
    step_into: TriviaPredicate<'_, 'db>,
) -> Option<RedToken<'db>> {
    for trivia in list {
        if let Some(structure) = trivia.structure(db)
            && step_into.matches(db, trivia)
            && let Some(token) = first_token(db, structure, predicate, step_into)
        {
            return Some(token);
        }
    }
    None
}

/// Takes the list already reversed so the scan runs source-backwards.
fn last_token_in_list<'db>(
    db: &'db dyn Database,
    list: impl Iterator<Item = RedTrivia<'db>>,
    predicate: TokenPredicate<'_, 'db>,
    step_into: TriviaPredicate<'_, 'db>,
) -> Option<RedToken<'db>> {
    for trivia in list {
        if let Some(structure) = trivia.structure(db)
            && step_into.matches(db, trivia)
            && let Some(token) = last_token(db, structure, predicate, step_into)
        {
            return Some(token);
        }
    }
    None
}

fn next_token<'db>(
    db: &'db dyn Database,
    current: RedToken<'db>,
    predicate: TokenPredicate<'_, 'db>,
    step_into: TriviaPredicate<'_, 'db>,
) -> Option<RedToken<'db>> {
    next_token_impl(db, current, predicate, step_into, step_into.steps_into_trivia())
}

fn prev_token<'db>(
    db: &'db dyn Database,
    current: RedToken<'db>,
    predicate: TokenPredicate<'_, 'db>,
    step_into: TriviaPredicate<'_, 'db>,
) -> Option<RedToken<'db>> {
    prev_token_impl(db, current, predicate, step_into, step_into.steps_into_trivia())
}

/// `search_trailing` is cleared when re-entering from a trivia position whose
/// list scans already covered the trailing list.
fn next_token_impl<'db>(
    db: &'db dyn Database,
    current: RedToken<'db>,
    predicate: TokenPredicate<'_, 'db>,
    step_into: TriviaPredicate<'_, 'db>,
    search_trailing: bool,
) -> Option<RedToken<'db>> {
    let parent = current.parent(db)?;

    if search_trailing
        && let Some(found) =
            first_token_in_list(db, current.trailing_trivia(db), predicate, step_into)
    {
        return Some(found);
    }

    let mut siblings = parent.children(db);
    let located = siblings.by_ref().any(|child| child == Red::Token(current));
    debug_assert!(located, "token does not belong to its recorded parent");
    for sibling in siblings {
        let found = match sibling {
            Red::Node(node) => first_token(db, node, predicate, step_into),
            Red::Token(token) => first_token_of(db, token, predicate, step_into),
        };
        if found.is_some() {
            return found;
        }
    }

    next_token_from_node(db, parent, predicate, step_into)
}

fn prev_token_impl<'db>(
    db: &'db dyn Database,
    current: RedToken<'db>,
    predicate: TokenPredicate<'_, 'db>,
    step_into: TriviaPredicate<'_, 'db>,
    search_leading: bool,
) -> Option<RedToken<'db>> {
    let parent = current.parent(db)?;

    if search_leading
        && let Some(found) =
            last_token_in_list(db, current.leading_trivia(db).rev(), predicate, step_into)
    {
        return Some(found);
    }

    let mut siblings = parent.children(db).rev();
    let located = siblings.by_ref().any(|child| child == Red::Token(current));
    debug_assert!(located, "token does not belong to its recorded parent");
    for sibling in siblings {
        let found = match sibling {
            Red::Node(node) => last_token(db, node, predicate, step_into),
            Red::Token(token) => last_token_of(db, token, predicate, step_into),
        };
        if found.is_some() {
            return found;
        }
    }

    prev_token_from_node(db, parent, predicate, step_into)
}

/// Ascends the ownership chain, scanning the siblings after each exhausted
/// node. An ascent that reaches a structured-trivia root is bridged back to
/// the trivia instance hosting the subtree.
fn next_token_from_node<'db>(
    db: &'db dyn Database,
    mut node: RedNode<'db>,
    predicate: TokenPredicate<'_, 'db>,
    step_into: TriviaPredicate<'_, 'db>,
) -> Option<RedToken<'db>> {
    loop {
        match node.parent(db)? {
            RedParent::Trivia(host) => {
                return next_token_from_trivia(db, host, predicate, step_into);
            }
            RedParent::Node(parent) => {
                let mut siblings = parent.children(db);
                let located = siblings.by_ref().any(|child| child == Red::Node(node));
                debug_assert!(located, "node does not belong to its recorded parent");
                for sibling in siblings {
                    let found = match sibling {
                        Red::Node(it) => first_token(db, it, predicate, step_into),
                        Red::Token(it) => first_token_of(db, it, predicate, step_into),
                    };
                    if found.is_some() {
                        return found;
                    }
                }
                node = parent;
            }
        }
    }
}

fn prev_token_from_node<'db>(
    db: &'db dyn Database,
    mut node: RedNode<'db>,
    predicate: TokenPredicate<'_, 'db>,
    step_into: TriviaPredicate<'_, 'db>,
) -> Option<RedToken<'db>> {
    loop {
        match node.parent(db)? {
            RedParent::Trivia(host) => {
                return prev_token_from_trivia(db, host, predicate, step_into);
            }
            RedParent::Node(parent) => {
                let mut siblings = parent.children(db).rev();
                let located = siblings.by_ref().any(|child| child == Red::Node(node));
                debug_assert!(located, "node does not belong to its recorded parent");
                for sibling in siblings {
                    let found = match sibling {
                        Red::Node(it) => last_token(db, it, predicate, step_into),
                        Red::Token(it) => last_token_of(db, it, predicate, step_into),
                    };
                    if found.is_some() {
                        return found;
                    }
                }
                node = parent;
            }
        }
    }
}

/// Lateral search from a trivia position.
///
/// The leading list is probed first regardless of which side `current`
/// records; a probe that never locates `current` falls through to the
/// trailing list, reproducing both probe attempts of the original control
/// flow.
fn next_token_from_trivia<'db>(
    db: &'db dyn Database,
    current: RedTrivia<'db>,
    predicate: TokenPredicate<'_, 'db>,
    step_into: TriviaPredicate<'_, 'db>,
) -> Option<RedToken<'db>> {
    let token = current.token(db);

    let (located, found) =
        next_in_trivia_list(db, current, token.leading_trivia(db), predicate, step_into);
    if found.is_some() {
        return found;
    }
    if located {
        if predicate.matches(db, token) {
            return Some(token);
        }
        if let Some(found) =
            first_token_in_list(db, token.trailing_trivia(db), predicate, step_into)
        {
            return Some(found);
        }
    } else {
        let (_, found) =
            next_in_trivia_list(db, current, token.trailing_trivia(db), predicate, step_into);
        if found.is_some() {
            return found;
        }
    }

    // Both trivia lists were covered above.
    next_token_impl(db, token, predicate, step_into, false)
}

fn prev_token_from_trivia<'db>(
    db: &'db dyn Database,
    current: RedTrivia<'db>,
    predicate: TokenPredicate<'_, 'db>,
    step_into: TriviaPredicate<'_, 'db>,
) -> Option<RedToken<'db>> {
    let token = current.token(db);

    let (located, found) =
        prev_in_trivia_list(db, current, token.trailing_trivia(db).rev(), predicate, step_into);
    if found.is_some() {
        return found;
    }
    if located {
        if predicate.matches(db, token) {
            return Some(token);
        }
        if let Some(found) =
            last_token_in_list(db, token.leading_trivia(db).rev(), predicate, step_into)
        {
            return Some(found);
        }
    } else {
        let (_, found) = prev_in_trivia_list(
            db,
            current,
            token.leading_trivia(db).rev(),
            predicate,
            step_into,
        );
        if found.is_some() {
            return found;
        }
    }

    prev_token_impl(db, token, predicate, step_into, false)
}

/// Two-phase scan: locate `current`, then search the structures after it.
/// Returns whether `current` was located at all.
fn next_in_trivia_list<'db>(
    db: &'db dyn Database,
    current: RedTrivia<'db>,
    mut list: impl Iterator<Item = RedTrivia<'db>>,
    predicate: TokenPredicate<'_, 'db>,
    step_into: TriviaPredicate<'_, 'db>,
) -> (bool, Option<RedToken<'db>>) {
    if !list.by_ref().any(|trivia| trivia == current) {
        return (false, None);
    }
    for trivia in list {
        if let Some(structure) = trivia.structure(db)
            && step_into.matches(db, trivia)
            && let Some(token) = first_token(db, structure, predicate, step_into)
        {
            return (true, Some(token));
        }
    }
    (true, None)
}

/// Takes the list already reversed; searches structures with `last_token`.
fn prev_in_trivia_list<'db>(
    db: &'db dyn Database,
    current: RedTrivia<'db>,
    mut list: impl Iterator<Item = RedTrivia<'db>>,
    predicate: TokenPredicate<'_, 'db>,
    step_into: TriviaPredicate<'_, 'db>,
) -> (bool, Option<RedToken<'db>>) {
    if !list.by_ref().any(|trivia| trivia == current) {
        return (false, None);
    }
    for trivia in list {
        if let Some(structure) = trivia.structure(db)
            && step_into.matches(db, trivia)
            && let Some(token) = last_token(db, structure, predicate, step_into)
        {
            return (true, Some(token));
        }
    }
    (true, None)
}

impl<'db> RedNode<'db> {
    /// Returns the first token in this subtree visible under `flags`.
    pub fn first_token(
        self,
        db: &'db dyn Database,
        flags: NavigationFlags,
    ) -> Option<RedToken<'db>> {
        first_token(db, self, flags.token_predicate(), flags.trivia_predicate())
    }

    /// Returns the last token in this subtree visible under `flags`.
    pub fn last_token(
        self,
        db: &'db dyn Database,
        flags: NavigationFlags,
    ) -> Option<RedToken<'db>> {
        last_token(db, self, flags.token_predicate(), flags.trivia_predicate())
    }

    /// `first_token` with explicit predicates.
    pub fn first_token_with(
        self,
        db: &'db dyn Database,
        predicate: TokenPredicate<'_, 'db>,
        step_into: TriviaPredicate<'_, 'db>,
    ) -> Option<RedToken<'db>> {
        first_token(db, self, predicate, step_into)
    }

    /// `last_token` with explicit predicates.
    pub fn last_token_with(
        self,
        db: &'db dyn Database,
        predicate: TokenPredicate<'_, 'db>,
        step_into: TriviaPredicate<'_, 'db>,
    ) -> Option<RedToken<'db>> {
        last_token(db, self, predicate, step_into)
    }
}

impl<'db> Red<'db> {
    pub fn first_token(
        self,
        db: &'db dyn Database,
        flags: NavigationFlags,
    ) -> Option<RedToken<'db>> {
        self.first_token_with(db, flags.token_predicate(), flags.trivia_predicate())
    }

    pub fn last_token(
        self,
        db: &'db dyn Database,
        flags: NavigationFlags,
    ) -> Option<RedToken<'db>> {
        self.last_token_with(db, flags.token_predicate(), flags.trivia_predicate())
    }

    pub fn first_token_with(
        self,
        db: &'db dyn Database,
        predicate: TokenPredicate<'_, 'db>,
        step_into: TriviaPredicate<'_, 'db>,
    ) -> Option<RedToken<'db>> {
        match self {
            Self::Node(node) => first_token(db, node, predicate, step_into),
            Self::Token(token) => first_token_of(db, token, predicate, step_into),
        }
    }

    pub fn last_token_with(
        self,
        db: &'db dyn Database,
        predicate: TokenPredicate<'_, 'db>,
        step_into: TriviaPredicate<'_, 'db>,
    ) -> Option<RedToken<'db>> {
        match self {
            Self::Node(node) => last_token(db, node, predicate, step_into),
            Self::Token(token) => last_token_of(db, token, predicate, step_into),
        }
    }
}

impl<'db> RedToken<'db> {
    /// Returns the next token after this one visible under `flags`.
    pub fn next_token(
        self,
        db: &'db dyn Database,
        flags: NavigationFlags,
    ) -> Option<RedToken<'db>> {
        next_token(db, self, flags.token_predicate(), flags.trivia_predicate())
    }

    /// Returns the previous token before this one visible under `flags`.
    pub fn prev_token(
        self,
        db: &'db dyn Database,
        flags: NavigationFlags,
    ) -> Option<RedToken<'db>> {
        prev_token(db, self, flags.token_predicate(), flags.trivia_predicate())
    }

    /// `next_token` with explicit predicates.
    pub fn next_token_with(
        self,
        db: &'db dyn Database,
        predicate: TokenPredicate<'_, 'db>,
        step_into: TriviaPredicate<'_, 'db>,
    ) -> Option<RedToken<'db>> {
        next_token(db, self, predicate, step_into)
    }

    /// `prev_token` with explicit predicates.
    pub fn prev_token_with(
        self,
        db: &'db dyn Database,
        predicate: TokenPredicate<'_, 'db>,
        step_into: TriviaPredicate<'_, 'db>,
    ) -> Option<RedToken<'db>> {
        prev_token(db, self, predicate, step_into)
    }
}

impl<'db> RedTrivia<'db> {
    /// Returns the next token after this trivia position.
    pub fn next_token(
        self,
        db: &'db dyn Database,
        flags: NavigationFlags,
    ) -> Option<RedToken<'db>> {
        next_token_from_trivia(db, self, flags.token_predicate(), flags.trivia_predicate())
    }

    /// Returns the previous token before this trivia position.
    pub fn prev_token(
        self,
        db: &'db dyn Database,
        flags: NavigationFlags,
    ) -> Option<RedToken<'db>> {
        prev_token_from_trivia(db, self, flags.token_predicate(), flags.trivia_predicate())
    }

    pub fn next_token_with(
        self,
        db: &'db dyn Database,
        predicate: TokenPredicate<'_, 'db>,
        step_into: TriviaPredicate<'_, 'db>,
    ) -> Option<RedToken<'db>> {
        next_token_from_trivia(db, self, predicate, step_into)
    }

    pub fn prev_token_with(
        self,
        db: &'db dyn Database,
        predicate: TokenPredicate<'_, 'db>,
        step_into: TriviaPredicate<'_, 'db>,
    ) -> Option<RedToken<'db>> {
        prev_token_from_trivia(db, self, predicate, step_into)
    }
}
