//! # Dual-Tree Coordinator
//!
//! Background classification arrives some time after a document opens. To
//! show brackets immediately without flickering once classification lands,
//! [`BracketPairsTree`] holds up to two trees:
//!
//! - the **initial** tree, built as soon as the document is available and
//!   served to queries until classification completes;
//! - the **classified** tree, built with the classification-aware token
//!   stream and refined as classified lines come in.
//!
//! | classification at construction | initial tree | classified tree |
//! |---|---|---|
//! | `Uninitialized` | fast tokenizer | shares the initial tree |
//! | `InProgress` | classified tokenizer | shares the initial tree |
//! | `Completed` | none | classified tokenizer |
//!
//! Every edit batch updates every held tree before returning, so the trees
//! never disagree on document length. A shared tree is updated in
//! [`UpdateMode::Pure`] so neither holder sees the other's nodes taken apart.

use std::rc::Rc;

use crate::ast::{AstNode, NodeRef};
use crate::host::{ClassificationSource, ClassificationState, TextSource};
use crate::length::Length;
use crate::parser::{EditBatch, TextEditInfo, UpdateMode, parse_document};
use crate::position::LineRange;
use crate::registry::BracketRegistry;
use crate::tokenizer::{ClassifiedTokenizer, FastTokenizer};

/// Token stream a tree is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizerKind {
    Fast,
    Classified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeState {
    /// Serving a fast tree; classification has not started.
    NoTokens,
    /// Serving a classification-aware tree built before classification
    /// completed.
    InitialOnly,
    /// Serving the classified tree.
    TokensAvailable,
}

#[derive(Debug)]
struct InitialTree {
    root: NodeRef,
    tokenizer: TokenizerKind,
}

#[derive(Debug)]
pub struct BracketPairsTree {
    initial: Option<InitialTree>,
    classified: NodeRef,
}

impl BracketPairsTree {
    pub fn new<D>(document: &D, registry: &BracketRegistry) -> Self
    where
        D: TextSource + ClassificationSource + ?Sized,
    {
        let state = document.classification_state();
        let tree = match state {
            ClassificationState::Uninitialized => {
                let root = full_parse(document, registry, TokenizerKind::Fast);
                Self {
                    initial: Some(InitialTree {
                        root: root.clone(),
                        tokenizer: TokenizerKind::Fast,
                    }),
                    classified: root,
                }
            }
            ClassificationState::InProgress => {
                let root = full_parse(document, registry, TokenizerKind::Classified);
                Self {
                    initial: Some(InitialTree {
                        root: root.clone(),
                        tokenizer: TokenizerKind::Classified,
                    }),
                    classified: root,
                }
            }
            ClassificationState::Completed => Self {
                initial: None,
                classified: full_parse(document, registry, TokenizerKind::Classified),
            },
        };
        log::debug!(
            "built bracket tree for {} lines (classification {:?})",
            document.line_count(),
            state
        );
        tree
    }

    pub fn state(&self) -> TreeState {
        match &self.initial {
            Some(InitialTree {
                tokenizer: TokenizerKind::Fast,
                ..
            }) => TreeState::NoTokens,
            Some(_) => TreeState::InitialOnly,
            None => TreeState::TokensAvailable,
        }
    }

    /// The tree queries read: the initial tree while one is held.
    pub fn root(&self) -> &NodeRef {
        self.initial
            .as_ref()
            .map_or(&self.classified, |initial| &initial.root)
    }

    pub fn initial_root(&self) -> Option<&NodeRef> {
        self.initial.as_ref().map(|initial| &initial.root)
    }

    pub fn classified_root(&self) -> &NodeRef {
        &self.classified
    }

    fn is_shared(&self) -> bool {
        self.initial
            .as_ref()
            .is_some_and(|initial| Rc::ptr_eq(&initial.root, &self.classified))
    }

    /// Applies one edit batch to every held tree. `document` is the text
    /// after the edits.
    ///
    /// Trees read through the classification re-tokenize every edited line
    /// in full, since the host drops the classification of those lines.
    pub fn handle_content_changed<D>(
        &mut self,
        document: &D,
        registry: &BracketRegistry,
        edits: &EditBatch,
    ) where
        D: TextSource + ClassificationSource + ?Sized,
    {
        let shared = self.is_shared();
        let mode = if shared { UpdateMode::Pure } else { UpdateMode::Fast };
        let previous = std::mem::replace(&mut self.classified, AstNode::empty_list());
        let by_line = edits.extended_to_whole_lines(previous.length());

        match self.initial.take() {
            Some(initial) if shared && initial.tokenizer == TokenizerKind::Classified => {
                // Both trees would come out of the same parse.
                drop(initial.root);
                let root = reparse_classified(document, registry, &by_line, previous, mode);
                self.initial = Some(InitialTree {
                    root: root.clone(),
                    tokenizer: TokenizerKind::Classified,
                });
                self.classified = root;
            }
            Some(initial) => {
                let tokenizer = initial.tokenizer;
                let initial_edits = match tokenizer {
                    TokenizerKind::Fast => edits,
                    TokenizerKind::Classified => &by_line,
                };
                let root = reparse(
                    document,
                    registry,
                    tokenizer,
                    initial_edits,
                    Some(initial.root),
                    mode,
                );
                self.initial = Some(InitialTree {
                    root,
                    tokenizer,
                });
                self.classified = reparse_classified(document, registry, &by_line, previous, mode);
            }
            None => {
                self.classified = reparse_classified(document, registry, &by_line, previous, mode);
            }
        }
    }

    /// Reacts to a classification state change. Returns whether the served
    /// tree changed.
    pub fn handle_classification_state_changed<D>(
        &mut self,
        document: &D,
        registry: &BracketRegistry,
    ) -> bool
    where
        D: TextSource + ClassificationSource + ?Sized,
    {
        if document.classification_state() != ClassificationState::Completed {
            return false;
        }
        let Some(initial) = self.initial.take() else {
            return false;
        };
        if initial.tokenizer == TokenizerKind::Fast && Rc::ptr_eq(&initial.root, &self.classified) {
            // The classified tree is still the fast mirror and has never seen
            // classification.
            self.classified = full_parse(document, registry, TokenizerKind::Classified);
        }
        log::debug!("classification completed, dropped the initial bracket tree");
        true
    }

    /// Re-tokenizes the lines in `ranges` in the classified tree. Returns
    /// whether the served tree changed.
    pub fn handle_classification_changed<D>(
        &mut self,
        document: &D,
        registry: &BracketRegistry,
        ranges: &[LineRange],
    ) -> bool
    where
        D: TextSource + ClassificationSource + ?Sized,
    {
        let edits = classification_edits(ranges, document.line_count(), document.length());
        if edits.is_empty() {
            return false;
        }
        let batch = match EditBatch::new(edits) {
            Ok(batch) => batch,
            Err(err) => {
                log::warn!("ignoring classification update: {err}");
                return false;
            }
        };
        let mode = if self.is_shared() { UpdateMode::Pure } else { UpdateMode::Fast };
        let previous = std::mem::replace(&mut self.classified, AstNode::empty_list());
        self.classified = reparse_classified(document, registry, &batch, previous, mode);
        self.initial.is_none()
    }
}

/// Zero-delta edits covering exactly the given lines, merged and clamped to
/// the document.
pub fn classification_edits(
    ranges: &[LineRange],
    line_count: u32,
    document_length: Length,
) -> Vec<TextEditInfo> {
    let line_count = line_count.max(1);
    let mut clamped: Vec<(u32, u32)> = ranges
        .iter()
        .filter_map(|range| {
            let from = range.start_line_number.max(1);
            let to = range.end_line_number.min(line_count);
            (from <= to).then_some((from, to))
        })
        .collect();
    clamped.sort_unstable();

    let mut merged: Vec<(u32, u32)> = Vec::with_capacity(clamped.len());
    for (from, to) in clamped {
        match merged.last_mut() {
            Some(last) if from <= last.1 + 1 => last.1 = last.1.max(to),
            _ => merged.push((from, to)),
        }
    }

    merged
        .into_iter()
        .map(|(from, to)| {
            let start = Length::new(from - 1, 0);
            if to < line_count {
                TextEditInfo::new(start, Length::new(to, 0), Length::new(to - from + 1, 0))
            } else {
                let new_length = Length::diff_non_negative(start, document_length);
                TextEditInfo::new(start, document_length, new_length)
            }
        })
        .collect()
}

fn full_parse<D>(document: &D, registry: &BracketRegistry, tokenizer: TokenizerKind) -> NodeRef
where
    D: TextSource + ClassificationSource + ?Sized,
{
    reparse(document, registry, tokenizer, &EditBatch::empty(), None, UpdateMode::Pure)
}

fn reparse_classified<D>(
    document: &D,
    registry: &BracketRegistry,
    edits: &EditBatch,
    previous: NodeRef,
    mode: UpdateMode,
) -> NodeRef
where
    D: TextSource + ClassificationSource + ?Sized,
{
    reparse(document, registry, TokenizerKind::Classified, edits, Some(previous), mode)
}

fn reparse<D>(
    document: &D,
    registry: &BracketRegistry,
    tokenizer: TokenizerKind,
    edits: &EditBatch,
    previous: Option<NodeRef>,
    mode: UpdateMode,
) -> NodeRef
where
    D: TextSource + ClassificationSource + ?Sized,
{
    match tokenizer {
        TokenizerKind::Fast => {
            let mut tokens = FastTokenizer::new(document, registry);
            parse_document(&mut tokens, edits, previous, mode)
        }
        TokenizerKind::Classified => {
            let mut tokens = ClassifiedTokenizer::new(document, registry);
            parse_document(&mut tokens, edits, previous, mode)
        }
    }
}
