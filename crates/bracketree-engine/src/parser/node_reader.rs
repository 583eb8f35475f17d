use std::rc::Rc;

use super::UpdateMode;
use crate::ast::NodeRef;
use crate::length::Length;

/// Walks the previous tree in document order and hands out the longest
/// subtree starting at a requested offset that satisfies a predicate.
///
/// Offsets passed to [`read_longest_node_at`](Self::read_longest_node_at)
/// must be non-decreasing. In [`UpdateMode::Fast`] the reader owns the old
/// tree and unwraps every node it descends into, moving the children out.
pub struct NodeReader {
    mode: UpdateMode,
    /// Unvisited siblings of every ancestor of `current`, innermost last.
    pending: Vec<std::vec::IntoIter<NodeRef>>,
    current: Option<(NodeRef, Length)>,
    last_offset: Length,
}

impl NodeReader {
    pub fn new(root: NodeRef, mode: UpdateMode) -> Self {
        Self {
            mode,
            pending: Vec::new(),
            current: Some((root, Length::ZERO)),
            last_offset: Length::ZERO,
        }
    }

    pub fn read_longest_node_at(
        &mut self,
        offset: Length,
        predicate: impl Fn(&NodeRef) -> bool,
    ) -> Option<NodeRef> {
        debug_assert!(offset >= self.last_offset, "reader offsets must not decrease");
        self.last_offset = offset;

        loop {
            let (node, node_offset) = self.current.as_ref()?;
            let node_offset = *node_offset;
            if offset < node_offset {
                // Nothing in the old tree starts exactly here.
                return None;
            }

            let has_children = node.child_count() > 0;
            if node_offset < offset {
                if node_offset + node.length() <= offset || !has_children {
                    self.next_node_after_current();
                } else {
                    self.descend();
                }
            } else if predicate(node) {
                return self.take_current();
            } else if has_children {
                self.descend();
            } else {
                self.next_node_after_current();
                return None;
            }
        }
    }

    /// Replaces the current node by its first child.
    fn descend(&mut self) {
        let Some((node, offset)) = self.current.take() else {
            return;
        };
        let mut children = self.take_children(node).into_iter();
        match children.next() {
            Some(first) => {
                self.pending.push(children);
                self.current = Some((first, offset));
            }
            None => self.advance_from(offset),
        }
    }

    fn take_children(&self, node: NodeRef) -> Vec<NodeRef> {
        match self.mode {
            UpdateMode::Fast => match Rc::try_unwrap(node) {
                Ok(owned) => owned.into_children(),
                Err(shared) => shared.children(),
            },
            UpdateMode::Pure => node.children(),
        }
    }

    fn take_current(&mut self) -> Option<NodeRef> {
        let (node, offset) = self.current.take()?;
        self.advance_from(offset + node.length());
        Some(node)
    }

    fn next_node_after_current(&mut self) {
        self.take_current();
    }

    /// Moves to the next unvisited sibling of the innermost ancestor that
    /// has one.
    fn advance_from(&mut self, offset: Length) {
        while let Some(siblings) = self.pending.last_mut() {
            if let Some(next) = siblings.next() {
                self.current = Some((next, offset));
                return;
            }
            self.pending.pop();
        }
    }
}
