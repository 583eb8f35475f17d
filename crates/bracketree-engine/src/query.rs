//! # Range Queries
//!
//! Read-only traversals of a bracket tree that compute absolute positions on
//! the fly from relative lengths.
//!
//! A subtree is entered only when its `[start, end]` touches the query range.
//! Both ends are inclusive, so an empty range placed right next to a bracket
//! still reports it.
//!
//! Nesting levels count enclosing pairs: a pair's own brackets are at the
//! pair's level and its content is one level deeper.

use std::collections::HashMap;

use smol_str::SmolStr;

use crate::ast::{AstNode, NodeRef};
use crate::host::TextSource;
use crate::length::Length;
use crate::position::{Position, Range};
use crate::registry::FamilyId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketInfo {
    pub range: Range,
    pub text: SmolStr,
    /// `None` for unexpected closing brackets.
    pub family: Option<FamilyId>,
    pub nesting_level: u32,
    pub nesting_level_of_same_family: u32,
    /// Set for unexpected closers and for openers of unterminated pairs.
    pub is_unmatched: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketPairInfo {
    pub range: Range,
    pub opening_range: Range,
    /// `None` for unterminated pairs.
    pub closing_range: Option<Range>,
    pub family: FamilyId,
    pub nesting_level: u32,
    pub nesting_level_of_same_family: u32,
    pub min_indentation: Option<u32>,
}

/// Query bounds as offsets, clamped to the document.
fn clamp(range: Range, document_length: Length) -> (Length, Length) {
    let start = Length::from_position(range.start).min(document_length);
    let end = Length::from_position(range.end).min(document_length);
    if end < start { (end, start) } else { (start, end) }
}

fn to_range(start: Length, end: Length) -> Range {
    Range::from_positions(start.to_position(), end.to_position())
}

#[derive(Default)]
struct FamilyLevels(HashMap<FamilyId, u32>);

impl FamilyLevels {
    fn get(&self, family: FamilyId) -> u32 {
        self.0.get(&family).copied().unwrap_or(0)
    }

    fn enter(&mut self, family: FamilyId) {
        *self.0.entry(family).or_insert(0) += 1;
    }

    fn leave(&mut self, family: FamilyId) {
        if let Some(level) = self.0.get_mut(&family) {
            *level = level.saturating_sub(1);
        }
    }
}

/// Brackets touching `range`, in document order.
pub fn brackets_in_range(
    root: &NodeRef,
    document_length: Length,
    range: Range,
) -> Vec<BracketInfo> {
    let (start, end) = clamp(range, document_length);
    let mut collector = BracketCollector {
        start,
        end,
        levels: FamilyLevels::default(),
        out: Vec::new(),
    };
    collector.visit(root, Length::ZERO, 0);
    collector.out
}

struct BracketCollector {
    start: Length,
    end: Length,
    levels: FamilyLevels,
    out: Vec<BracketInfo>,
}

impl BracketCollector {
    fn touches(&self, from: Length, to: Length) -> bool {
        from <= self.end && to >= self.start
    }

    fn visit(&mut self, node: &NodeRef, offset: Length, level: u32) {
        if !self.touches(offset, offset + node.length()) {
            return;
        }
        match &**node {
            AstNode::List(list) => {
                let mut offset = offset;
                for child in list.children() {
                    self.visit(child, offset, level);
                    offset += child.length();
                }
            }
            AstNode::Pair(pair) => {
                let family = pair.family();
                let family_level = self.levels.get(family);
                let opening_end = offset + pair.opening().length();
                self.push(
                    pair.opening(),
                    offset,
                    opening_end,
                    Some(family),
                    level,
                    family_level,
                    !pair.is_closed(),
                );

                let mut content_end = opening_end;
                if let Some(content) = pair.content() {
                    self.levels.enter(family);
                    self.visit(content, opening_end, level + 1);
                    self.levels.leave(family);
                    content_end += content.length();
                }
                if let Some(closing) = pair.closing() {
                    let (start, end) = (content_end, content_end + closing.length());
                    self.push(closing, start, end, Some(family), level, family_level, false);
                }
            }
            AstNode::UnexpectedClosingBracket(stray) => {
                let end = offset + stray.length;
                let text = stray.text.clone();
                if let Some(info) = self.info(offset, end, text, None, level, 0, true) {
                    self.out.push(info);
                }
            }
            AstNode::Bracket(_) | AstNode::Text(_) => {}
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn push(
        &mut self,
        bracket: &NodeRef,
        start: Length,
        end: Length,
        family: Option<FamilyId>,
        level: u32,
        family_level: u32,
        is_unmatched: bool,
    ) {
        let text = bracket.as_bracket().map(|b| b.text.clone()).unwrap_or_default();
        if let Some(info) = self.info(start, end, text, family, level, family_level, is_unmatched) {
            self.out.push(info);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn info(
        &self,
        start: Length,
        end: Length,
        text: SmolStr,
        family: Option<FamilyId>,
        nesting_level: u32,
        nesting_level_of_same_family: u32,
        is_unmatched: bool,
    ) -> Option<BracketInfo> {
        self.touches(start, end).then(|| BracketInfo {
            range: to_range(start, end),
            text,
            family,
            nesting_level,
            nesting_level_of_same_family,
            is_unmatched,
        })
    }
}

/// Pairs touching `range`, outer pairs before the pairs they contain.
pub fn bracket_pairs_in_range<T: TextSource + ?Sized>(
    root: &NodeRef,
    text: &T,
    range: Range,
    include_min_indentation: bool,
    tab_size: u32,
) -> Vec<BracketPairInfo> {
    let (start, end) = clamp(range, text.length());
    let mut collector = PairCollector {
        start,
        end,
        levels: FamilyLevels::default(),
        indentation: include_min_indentation.then(|| IndentationCache::new(text, tab_size)),
        out: Vec::new(),
    };
    collector.visit(root, Length::ZERO, 0);
    collector.out
}

struct PairCollector<'t, T: ?Sized> {
    start: Length,
    end: Length,
    levels: FamilyLevels,
    indentation: Option<IndentationCache<'t, T>>,
    out: Vec<BracketPairInfo>,
}

impl<T: TextSource + ?Sized> PairCollector<'_, T> {
    fn visit(&mut self, node: &NodeRef, offset: Length, level: u32) {
        let node_end = offset + node.length();
        if !(offset <= self.end && node_end >= self.start) {
            return;
        }
        match &**node {
            AstNode::List(list) => {
                let mut offset = offset;
                for child in list.children() {
                    self.visit(child, offset, level);
                    offset += child.length();
                }
            }
            AstNode::Pair(pair) => {
                let family = pair.family();
                let opening_end = offset + pair.opening().length();
                let content_end = opening_end + pair.content().map_or(Length::ZERO, |c| c.length());
                let min_indentation = self
                    .indentation
                    .as_mut()
                    .and_then(|cache| cache.min_over_lines(offset, node_end));
                self.out.push(BracketPairInfo {
                    range: to_range(offset, node_end),
                    opening_range: to_range(offset, opening_end),
                    closing_range: pair.is_closed().then(|| to_range(content_end, node_end)),
                    family,
                    nesting_level: level,
                    nesting_level_of_same_family: self.levels.get(family),
                    min_indentation,
                });

                if let Some(content) = pair.content() {
                    self.levels.enter(family);
                    self.visit(content, opening_end, level + 1);
                    self.levels.leave(family);
                }
            }
            _ => {}
        }
    }
}

/// Indentation of each line, computed at most once per query.
struct IndentationCache<'t, T: ?Sized> {
    text: &'t T,
    tab_size: u32,
    lines: HashMap<u32, Option<u32>>,
}

impl<'t, T: TextSource + ?Sized> IndentationCache<'t, T> {
    fn new(text: &'t T, tab_size: u32) -> Self {
        Self {
            text,
            tab_size: tab_size.max(1),
            lines: HashMap::new(),
        }
    }

    /// Minimum indentation over the non-blank lines from `start` to `end`.
    fn min_over_lines(&mut self, start: Length, end: Length) -> Option<u32> {
        (start.lines()..=end.lines())
            .filter_map(|line| self.line(line + 1))
            .min()
    }

    fn line(&mut self, line_number: u32) -> Option<u32> {
        if let Some(cached) = self.lines.get(&line_number) {
            return *cached;
        }
        let indentation = visible_indentation(&self.text.line_content(line_number), self.tab_size);
        self.lines.insert(line_number, indentation);
        indentation
    }
}

/// Visible column of the first non-whitespace character, with tabs advancing
/// to the next multiple of `tab_size`. `None` for blank lines.
pub fn visible_indentation(line: &str, tab_size: u32) -> Option<u32> {
    let mut column = 0;
    for c in line.chars() {
        match c {
            ' ' => column += 1,
            '\t' => column += tab_size - column % tab_size,
            c if c.is_whitespace() => column += 1,
            _ => return Some(column),
        }
    }
    None
}

/// The innermost pair with a bracket touching `position`.
pub fn matching_bracket_pair<T: TextSource + ?Sized>(
    root: &NodeRef,
    text: &T,
    position: Position,
) -> Option<BracketPairInfo> {
    bracket_pairs_in_range(root, text, Range::caret(position), false, 1)
        .into_iter()
        .filter(|pair| {
            pair.opening_range.contains_position(position)
                || pair
                    .closing_range
                    .is_some_and(|closing| closing.contains_position(position))
        })
        .max_by_key(|pair| pair.nesting_level)
}

/// The innermost pair whose range strictly contains `position`.
pub fn enclosing_pair<T: TextSource + ?Sized>(
    root: &NodeRef,
    text: &T,
    position: Position,
) -> Option<BracketPairInfo> {
    bracket_pairs_in_range(root, text, Range::caret(position), false, 1)
        .into_iter()
        .filter(|pair| pair.range.start < position && position < pair.range.end)
        .max_by_key(|pair| pair.nesting_level)
}
