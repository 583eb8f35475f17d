//! # Bracket AST
//!
//! A persistent tree of reference-counted nodes describing where brackets are
//! and how they pair up. Nodes store only relative [`Length`]s; absolute
//! positions are recovered by summing lengths during a traversal.
//!
//! ## Node Kinds
//!
//! - **List**: a node of a 2-3 tree. Every list has two or three children of
//!   equal list height, except the empty list standing in for an empty
//!   document. Long sequences of siblings stay balanced, so a reparse only
//!   rebuilds the lists along the edited paths.
//! - **Pair**: an opening bracket, optional content and an optional closing
//!   bracket. A pair without a closer is *unterminated*.
//! - **Bracket**: a bracket token that belongs to a pair.
//! - **UnexpectedClosingBracket**: a closer with nothing open to close.
//! - **Text**: everything else.
//!
//! ## Copy on Write
//!
//! Nodes are shared through [`NodeRef`]. Code that modifies a list goes
//! through [`Rc::make_mut`], which copies the node when another tree still
//! holds it. A tree handed out to a caller is therefore never modified by a
//! later reparse.

mod concat;

use std::rc::Rc;

use smol_str::SmolStr;

pub use concat::{concat23_trees, concat23_trees_of_same_height};

use crate::length::Length;
use crate::registry::{BracketIdSet, FamilyId, LanguageId};

pub type NodeRef = Rc<AstNode>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AstNodeKind {
    List,
    Pair,
    Bracket,
    UnexpectedClosingBracket,
    Text,
}

#[derive(Debug, Clone)]
pub enum AstNode {
    List(ListNode),
    Pair(PairNode),
    Bracket(BracketNode),
    UnexpectedClosingBracket(UnexpectedClosingNode),
    Text(TextNode),
}

#[derive(Debug, Clone)]
pub struct ListNode {
    length: Length,
    height: u32,
    children: Vec<NodeRef>,
    missing: BracketIdSet,
}

#[derive(Debug, Clone)]
pub struct PairNode {
    length: Length,
    family: FamilyId,
    opening: NodeRef,
    content: Option<NodeRef>,
    closing: Option<NodeRef>,
    missing: BracketIdSet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketNode {
    pub length: Length,
    pub family: FamilyId,
    /// Families this bracket closes; `{family}` for openers.
    pub closes: BracketIdSet,
    pub text: SmolStr,
    pub language: LanguageId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnexpectedClosingNode {
    pub length: Length,
    /// Families that an enclosing opener would have to belong to for this
    /// closer to match.
    pub missing: BracketIdSet,
    pub text: SmolStr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextNode {
    pub length: Length,
}

impl AstNode {
    pub fn text(length: Length) -> NodeRef {
        Rc::new(AstNode::Text(TextNode { length }))
    }

    pub fn unexpected_closing(missing: BracketIdSet, text: SmolStr, length: Length) -> NodeRef {
        Rc::new(AstNode::UnexpectedClosingBracket(UnexpectedClosingNode {
            length,
            missing,
            text,
        }))
    }

    pub fn pair(
        family: FamilyId,
        opening: NodeRef,
        content: Option<NodeRef>,
        closing: Option<NodeRef>,
    ) -> NodeRef {
        let mut length = opening.length();
        let mut missing = BracketIdSet::empty();
        if let Some(content) = &content {
            length += content.length();
            if let Some(ids) = content.missing_opening_bracket_ids() {
                missing = ids.clone();
            }
        }
        if let Some(closing) = &closing {
            length += closing.length();
        }
        Rc::new(AstNode::Pair(PairNode {
            length,
            family,
            opening,
            content,
            closing,
            missing,
        }))
    }

    /// A list one level above its children, which must share a list height.
    pub fn list23(a: NodeRef, b: NodeRef, c: Option<NodeRef>) -> NodeRef {
        debug_assert_eq!(a.list_height(), b.list_height());
        let height = a.list_height() + 1;
        let mut children = Vec::with_capacity(3);
        children.push(a);
        children.push(b);
        if let Some(c) = c {
            debug_assert_eq!(c.list_height(), height - 1);
            children.push(c);
        }
        Rc::new(AstNode::List(ListNode::new(height, children)))
    }

    pub fn empty_list() -> NodeRef {
        Rc::new(AstNode::List(ListNode::new(0, Vec::new())))
    }

    pub fn kind(&self) -> AstNodeKind {
        match self {
            AstNode::List(_) => AstNodeKind::List,
            AstNode::Pair(_) => AstNodeKind::Pair,
            AstNode::Bracket(_) => AstNodeKind::Bracket,
            AstNode::UnexpectedClosingBracket(_) => AstNodeKind::UnexpectedClosingBracket,
            AstNode::Text(_) => AstNodeKind::Text,
        }
    }

    pub fn length(&self) -> Length {
        match self {
            AstNode::List(n) => n.length,
            AstNode::Pair(n) => n.length,
            AstNode::Bracket(n) => n.length,
            AstNode::UnexpectedClosingBracket(n) => n.length,
            AstNode::Text(n) => n.length,
        }
    }

    /// Height in the 2-3 tree; every non-list node is a leaf at height 0.
    pub fn list_height(&self) -> u32 {
        match self {
            AstNode::List(n) => n.height,
            _ => 0,
        }
    }

    /// Union of the families of every unexpected closer in this subtree.
    pub fn missing_opening_bracket_ids(&self) -> Option<&BracketIdSet> {
        match self {
            AstNode::List(n) => Some(&n.missing),
            AstNode::Pair(n) => Some(&n.missing),
            AstNode::UnexpectedClosingBracket(n) => Some(&n.missing),
            AstNode::Bracket(_) | AstNode::Text(_) => None,
        }
    }

    pub fn is_empty_list(&self) -> bool {
        matches!(self, AstNode::List(n) if n.children.is_empty())
    }

    /// Whether the parser may take this node from the previous tree unchanged
    /// while the families in `open` are waiting for a closer.
    pub fn can_be_reused(&self, open: &BracketIdSet) -> bool {
        match self {
            AstNode::Text(_) => true,
            // Brackets are only reused as part of their pair.
            AstNode::Bracket(_) => false,
            AstNode::UnexpectedClosingBracket(n) => !n.missing.intersects(open),
            AstNode::Pair(n) => n.closing.is_some() && !n.missing.intersects(open),
            AstNode::List(n) => {
                if n.children.is_empty() || n.missing.intersects(open) {
                    return false;
                }
                // An unterminated pair at the very end may be able to take a
                // closer that follows the list now.
                let mut last = n.children.last();
                while let Some(node) = last {
                    match &**node {
                        AstNode::List(list) => last = list.children.last(),
                        other => return other.can_be_reused(open),
                    }
                }
                false
            }
        }
    }

    pub fn child_count(&self) -> usize {
        match self {
            AstNode::List(n) => n.children.len(),
            AstNode::Pair(n) => 1 + n.content.is_some() as usize + n.closing.is_some() as usize,
            _ => 0,
        }
    }

    /// Present children in document order.
    pub fn children(&self) -> Vec<NodeRef> {
        match self {
            AstNode::List(n) => n.children.clone(),
            AstNode::Pair(n) => n.parts().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Like [`children`](Self::children), taking the children out of an owned node.
    pub fn into_children(self) -> Vec<NodeRef> {
        match self {
            AstNode::List(n) => n.children,
            AstNode::Pair(n) => std::iter::once(n.opening)
                .chain(n.content)
                .chain(n.closing)
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn as_list(&self) -> Option<&ListNode> {
        match self {
            AstNode::List(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_pair(&self) -> Option<&PairNode> {
        match self {
            AstNode::Pair(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_bracket(&self) -> Option<&BracketNode> {
        match self {
            AstNode::Bracket(n) => Some(n),
            _ => None,
        }
    }
}

impl ListNode {
    fn new(height: u32, children: Vec<NodeRef>) -> Self {
        let mut list = Self {
            length: Length::ZERO,
            height,
            children,
            missing: BracketIdSet::empty(),
        };
        list.refresh();
        list
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn children(&self) -> &[NodeRef] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<NodeRef> {
        &mut self.children
    }

    /// Recomputes the cached length and missing ids from the children.
    pub(crate) fn refresh(&mut self) {
        let mut length = Length::ZERO;
        let mut missing = BracketIdSet::empty();
        for child in &self.children {
            length += child.length();
            if let Some(ids) = child.missing_opening_bracket_ids() {
                if !ids.is_empty() {
                    missing = missing.merge(ids);
                }
            }
        }
        self.length = length;
        self.missing = missing;
    }
}

impl PairNode {
    pub fn family(&self) -> FamilyId {
        self.family
    }

    pub fn opening(&self) -> &NodeRef {
        &self.opening
    }

    pub fn content(&self) -> Option<&NodeRef> {
        self.content.as_ref()
    }

    pub fn closing(&self) -> Option<&NodeRef> {
        self.closing.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.closing.is_some()
    }

    fn parts(&self) -> impl Iterator<Item = &NodeRef> {
        std::iter::once(&self.opening)
            .chain(self.content.iter())
            .chain(self.closing.iter())
    }
}
