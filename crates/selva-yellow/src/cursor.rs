//! Preorder traversal over red nodes and tokens.
//!
//! The walk stays inside the primary tree; it does not descend into trivia
//! structures. Token navigation is what crosses that boundary.

use salsa::Database;

use crate::red::{Red, RedChildren, RedNode, RedToken};

/// Preorder traversal over nodes and tokens, driven by an explicit stack.
#[derive(Clone)]
pub struct Preorder<'db> {
    db: &'db dyn Database,
    stack: Vec<(RedNode<'db>, RedChildren<'db>)>,
    root: Option<RedNode<'db>>,
    pending: Option<WalkEvent<'db>>,
}

impl<'db> Preorder<'db> {
    fn new(db: &'db dyn Database, start: RedNode<'db>) -> Self {
        Self { db, stack: Vec::with_capacity(16), root: Some(start), pending: None }
    }

    /// Skips the rest of the current subtree; its `LeaveNode` is still
    /// emitted so enter/leave events stay balanced.
    pub fn skip_subtree(&mut self) {
        let (skipped, _) = self.stack.pop().expect("must have a subtree to skip");
        self.pending = Some(WalkEvent::LeaveNode(skipped));
    }
}

impl<'db> Iterator for Preorder<'db> {
    type Item = WalkEvent<'db>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(event) = self.pending.take() {
            return Some(event);
        }
        if let Some(root) = self.root.take() {
            self.stack.push((root, root.children(self.db)));
            return Some(WalkEvent::EnterNode(root));
        }

        let (_, active) = self.stack.last_mut()?;
        match active.next() {
            Some(Red::Node(child)) => {
                let children = child.children(self.db);
                self.stack.push((child, children));
                Some(WalkEvent::EnterNode(child))
            }
            Some(Red::Token(token)) => Some(WalkEvent::Token(token)),
            None => {
                let (exited, _) = self.stack.pop().expect("should have an exited-from node");
                Some(WalkEvent::LeaveNode(exited))
            }
        }
    }
}

/// Preorder walk event including tokens.
#[derive(Clone, Copy, Debug)]
pub enum WalkEvent<'db> {
    EnterNode(RedNode<'db>),
    LeaveNode(RedNode<'db>),
    Token(RedToken<'db>),
}

impl<'db> RedNode<'db> {
    /// Returns a preorder iterator over nodes and tokens.
    pub fn preorder_with_tokens(self, db: &'db dyn Database) -> Preorder<'db> {
        Preorder::new(db, self)
    }
}

#[cfg(test)]
mod tests {
    use salsa::DatabaseImpl;

    use super::*;
    use crate::{Builder, SyntaxKind, TriviaPiece, TriviaPieceKind};

    fn module(db: &dyn Database) -> RedNode<'_> {
        let mut builder = Builder::new(db, "val x");
        builder.start_node(SyntaxKind::MODULE);
        builder.start_node(SyntaxKind::BINDING);
        builder.token(SyntaxKind::VAL_KW, 3);
        builder.finish_node();
        builder.token_with_trivia(
            &[TriviaPiece::new(TriviaPieceKind::Whitespace, 1.into())],
            SyntaxKind::IDENT,
            1,
            &[],
        );
        builder.finish_node();
        RedNode::new_root(db, builder.finish())
    }

    fn render<'db>(db: &'db dyn Database, event: WalkEvent<'db>) -> String {
        match event {
            WalkEvent::EnterNode(node) => format!("enter {:?}", node.kind(db)),
            WalkEvent::LeaveNode(node) => format!("leave {:?}", node.kind(db)),
            WalkEvent::Token(token) => format!("token {:?}", token.kind(db)),
        }
    }

    #[test]
    fn walk_order() {
        let db = DatabaseImpl::new();
        let root = module(&db);

        let events: Vec<String> =
            root.preorder_with_tokens(&db).map(|event| render(&db, event)).collect();

        assert_eq!(
            events,
            [
                "enter MODULE",
                "enter BINDING",
                "token VAL_KW",
                "leave BINDING",
                "token IDENT",
                "leave MODULE",
            ],
        );
    }

    #[test]
    fn skip_subtree_keeps_events_balanced() {
        let db = DatabaseImpl::new();
        let root = module(&db);

        let mut events = Vec::new();
        let mut preorder = root.preorder_with_tokens(&db);
        while let Some(event) = preorder.next() {
            events.push(render(&db, event));
            if let WalkEvent::EnterNode(node) = event
                && node.kind(&db) == SyntaxKind::BINDING
            {
                preorder.skip_subtree();
            }
        }

        assert_eq!(
            events,
            [
                "enter MODULE",
                "enter BINDING",
                "leave BINDING",
                "token IDENT",
                "leave MODULE",
            ],
        );
    }
}
