//! # Incremental Parser
//!
//! Builds a bracket tree from a token stream, reusing subtrees of the
//! previous tree wherever the edits left them untouched.
//!
//! ## Algorithm
//!
//! The parser is a recursive descent over lists:
//!
//! - **Opening bracket**: parse a nested list with the bracket's family added
//!   to the set of open families. If the token after the nested list closes
//!   that family, consume it and build a closed pair; otherwise build an
//!   unterminated pair.
//! - **Closing bracket** of an open family: end the current list. The
//!   enclosing openers up to the matching one become unterminated pairs.
//! - **Closing bracket** of no open family: an unexpected closing bracket.
//! - **Text**: a text leaf.
//!
//! ## Reuse
//!
//! Before reading a token, the parser asks the [`NodeReader`] for the longest
//! node of the previous tree that starts at the same text (mapped through
//! the edits by [`BeforeEditPositionMapper`]). A node is taken if it ends
//! strictly before the next edit and [`AstNode::can_be_reused`] holds for the
//! currently open families. A node that only touches an edit is re-parsed.
//!
//! Reused and new siblings are joined with [`concat23_trees`], so list
//! heights and cached lengths stay consistent however the pieces were
//! obtained.

mod edits;
mod node_reader;
mod position_mapper;

use std::rc::Rc;

pub use edits::{EditBatch, TextEditInfo};
pub use node_reader::NodeReader;
pub use position_mapper::BeforeEditPositionMapper;

use crate::ast::{AstNode, NodeRef, concat23_trees, concat23_trees_of_same_height};
use crate::registry::{BracketIdSet, FamilyId};
use crate::tokenizer::{TokenKind, Tokenizer};

/// Openers nested deeper than this are treated as text.
const MAX_NESTING: u32 = 300;

/// How the previous tree is consumed by a reparse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Reused subtrees are shared with the previous tree, which stays valid.
    Pure,
    /// Uniquely owned nodes of the previous tree are taken apart and their
    /// children moved into the new tree.
    Fast,
}

/// Counters of one parse, for logging and benchmarks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub reused: usize,
    pub constructed: usize,
}

/// Parses a document, reusing `previous` where `edits` did not touch it.
pub fn parse_document(
    tokenizer: &mut dyn Tokenizer,
    edits: &EditBatch,
    previous: Option<NodeRef>,
    mode: UpdateMode,
) -> NodeRef {
    parse_document_with_stats(tokenizer, edits, previous, mode).0
}

pub fn parse_document_with_stats(
    tokenizer: &mut dyn Tokenizer,
    edits: &EditBatch,
    previous: Option<NodeRef>,
    mode: UpdateMode,
) -> (NodeRef, ParseStats) {
    let mut parser = Parser {
        tokenizer,
        reader: previous.map(|root| NodeReader::new(root, mode)),
        mapper: BeforeEditPositionMapper::new(edits.edits()),
        stats: ParseStats::default(),
    };
    let root = parser
        .parse_list(&BracketIdSet::empty(), 0)
        .unwrap_or_else(AstNode::empty_list);
    log::trace!(
        "parsed {} edits: {} nodes reused, {} constructed",
        edits.edits().len(),
        parser.stats.reused,
        parser.stats.constructed
    );
    (root, parser.stats)
}

struct Parser<'t, 'e> {
    tokenizer: &'t mut dyn Tokenizer,
    reader: Option<NodeReader>,
    mapper: BeforeEditPositionMapper<'e>,
    stats: ParseStats,
}

impl Parser<'_, '_> {
    fn parse_list(&mut self, open: &BracketIdSet, level: u32) -> Option<NodeRef> {
        let mut items = Vec::new();
        loop {
            let child = match self.try_read_child_from_cache(open) {
                Some(child) => child,
                None => {
                    let ends_list = match self.tokenizer.peek() {
                        None => true,
                        Some(token) => token.closes().is_some_and(|ids| ids.intersects(open)),
                    };
                    if ends_list {
                        break;
                    }
                    match self.parse_child(open, level + 1) {
                        Some(child) => child,
                        None => break,
                    }
                }
            };
            if child.is_empty_list() {
                continue;
            }
            items.push(child);
        }

        if self.reader.is_some() {
            concat23_trees(items)
        } else {
            // Everything was parsed fresh, so every item is a height 0 leaf.
            concat23_trees_of_same_height(items)
        }
    }

    fn try_read_child_from_cache(&mut self, open: &BracketIdSet) -> Option<NodeRef> {
        let reader = self.reader.as_mut()?;
        let offset = self.tokenizer.offset();
        let max_length = self.mapper.distance_to_next_change(offset);
        if max_length.is_some_and(|max| max.is_zero()) {
            return None;
        }
        let old_offset = self.mapper.offset_before_change(offset);
        let node = reader.read_longest_node_at(old_offset, |node| {
            if max_length.is_some_and(|max| node.length() >= max) {
                // The node reaches into or up to edited text.
                return false;
            }
            node.can_be_reused(open)
        })?;
        self.stats.reused += 1;
        self.tokenizer.skip(node.length());
        Some(node)
    }

    fn parse_child(&mut self, open: &BracketIdSet, level: u32) -> Option<NodeRef> {
        let token = self.tokenizer.read()?;
        self.stats.constructed += 1;
        let node = match token.kind {
            TokenKind::Text => AstNode::text(token.length),
            TokenKind::ClosingBracket { closes, node, .. } => {
                let text = node.as_bracket().map(|b| b.text.clone()).unwrap_or_default();
                AstNode::unexpected_closing(closes, text, token.length)
            }
            TokenKind::OpeningBracket { .. } if level > MAX_NESTING => AstNode::text(token.length),
            TokenKind::OpeningBracket { family, node } => {
                let nested = open.with(family);
                let content = self.parse_list(&nested, level + 1);
                let closing = self.read_closer_of(family);
                AstNode::pair(family, node, content, closing)
            }
        };
        Some(node)
    }

    /// Consumes the next token if it closes `family`.
    fn read_closer_of(&mut self, family: FamilyId) -> Option<NodeRef> {
        let closes_family = self
            .tokenizer
            .peek()
            .and_then(|token| token.closes())
            .is_some_and(|ids| ids.contains(family));
        if !closes_family {
            return None;
        }
        match self.tokenizer.read()?.kind {
            TokenKind::ClosingBracket { node, .. } => Some(closing_leaf_for(node, family)),
            _ => None,
        }
    }
}

/// A closer shared by several families is tagged with the family it closed.
fn closing_leaf_for(node: NodeRef, family: FamilyId) -> NodeRef {
    match node.as_bracket() {
        Some(bracket) if bracket.family != family => {
            let mut bracket = bracket.clone();
            bracket.family = family;
            Rc::new(AstNode::Bracket(bracket))
        }
        _ => node,
    }
}
