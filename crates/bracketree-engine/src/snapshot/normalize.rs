use serde::Serialize;

use crate::ast::{AstNode, NodeRef};
use crate::length::Length;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlatRole {
    Opening,
    UnmatchedOpening,
    Closing,
    UnexpectedClosing,
}

/// One bracket of a tree with its absolute offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatBracket {
    pub line: u32,
    pub column: u32,
    pub text: String,
    /// Opening text of the pair's family; `None` for unexpected closers.
    pub family: Option<String>,
    pub role: FlatRole,
}

/// Renders a tree on one line, ignoring list structure.
///
/// Closed pairs print as `( … )`, unterminated openers as `(…`, unexpected
/// closers as `!)` and text runs as `text`.
pub fn render(root: &NodeRef) -> String {
    let mut parts = Vec::new();
    render_into(root, &mut parts);
    parts.join(" ")
}

fn render_into(node: &NodeRef, parts: &mut Vec<String>) {
    match &**node {
        AstNode::List(list) => list.children().iter().for_each(|c| render_into(c, parts)),
        AstNode::Pair(pair) => {
            let open = bracket_text(pair.opening());
            if pair.is_closed() {
                parts.push(open);
            } else {
                parts.push(format!("{open}…"));
            }
            if let Some(content) = pair.content() {
                render_into(content, parts);
            }
            if let Some(closing) = pair.closing() {
                parts.push(bracket_text(closing));
            }
        }
        AstNode::Bracket(bracket) => parts.push(bracket.text.to_string()),
        AstNode::UnexpectedClosingBracket(stray) => parts.push(format!("!{}", stray.text)),
        AstNode::Text(_) => parts.push("text".to_string()),
    }
}

fn bracket_text(node: &NodeRef) -> String {
    node.as_bracket()
        .map(|b| b.text.to_string())
        .unwrap_or_default()
}

/// Every bracket in document order.
pub fn flatten(root: &NodeRef) -> Vec<FlatBracket> {
    let mut out = Vec::new();
    flatten_into(root, Length::ZERO, &mut out);
    out
}

fn flatten_into(node: &NodeRef, offset: Length, out: &mut Vec<FlatBracket>) {
    match &**node {
        AstNode::List(list) => {
            let mut offset = offset;
            for child in list.children() {
                flatten_into(child, offset, out);
                offset += child.length();
            }
        }
        AstNode::Pair(pair) => {
            let family = Some(bracket_text(pair.opening()));
            let role = if pair.is_closed() {
                FlatRole::Opening
            } else {
                FlatRole::UnmatchedOpening
            };
            out.push(flat(offset, pair.opening(), family.clone(), role));
            let mut offset = offset + pair.opening().length();
            if let Some(content) = pair.content() {
                flatten_into(content, offset, out);
                offset += content.length();
            }
            if let Some(closing) = pair.closing() {
                out.push(flat(offset, closing, family, FlatRole::Closing));
            }
        }
        AstNode::UnexpectedClosingBracket(stray) => out.push(FlatBracket {
            line: offset.lines(),
            column: offset.columns(),
            text: stray.text.to_string(),
            family: None,
            role: FlatRole::UnexpectedClosing,
        }),
        AstNode::Bracket(_) | AstNode::Text(_) => {}
    }
}

fn flat(offset: Length, node: &NodeRef, family: Option<String>, role: FlatRole) -> FlatBracket {
    FlatBracket {
        line: offset.lines(),
        column: offset.columns(),
        text: bracket_text(node),
        family,
        role,
    }
}
