use crate::ast::{AstNode, NodeRef};
use crate::length::Length;
use crate::registry::BracketIdSet;

/// Panics if `root` is not a well-formed tree of length `document_length`.
pub fn check(root: &NodeRef, document_length: Length) {
    assert_eq!(
        root.length(),
        document_length,
        "root length does not match the document"
    );
    if root.is_empty_list() {
        return;
    }
    check_node(root, &BracketIdSet::empty());
}

fn check_node(node: &NodeRef, open: &BracketIdSet) {
    match &**node {
        AstNode::List(list) => {
            let children = list.children();
            assert!(
                (2..=3).contains(&children.len()),
                "list with {} children",
                children.len()
            );
            let mut length = Length::ZERO;
            let mut missing = BracketIdSet::empty();
            for child in children {
                assert_eq!(
                    child.list_height() + 1,
                    list.height(),
                    "child height does not fit its list"
                );
                length += child.length();
                if let Some(ids) = child.missing_opening_bracket_ids() {
                    missing = missing.merge(ids);
                }
                check_node(child, open);
            }
            assert_eq!(node.length(), length, "list length is not the sum of its children");
            assert_eq!(node.missing_opening_bracket_ids(), Some(&missing));
        }
        AstNode::Pair(pair) => {
            let mut length = pair.opening().length();
            for part in [pair.opening()].into_iter().chain(pair.closing()) {
                let Some(bracket) = part.as_bracket() else {
                    panic!("pair part is not a bracket: {part:?}");
                };
                assert_eq!(
                    bracket.family,
                    pair.family(),
                    "bracket {:?} in a pair of another family",
                    bracket.text
                );
            }
            let inner = open.with(pair.family());
            if let Some(content) = pair.content() {
                length += content.length();
                check_node(content, &inner);
            }
            if let Some(closing) = pair.closing() {
                length += closing.length();
            }
            assert_eq!(node.length(), length, "pair length is not the sum of its parts");
        }
        AstNode::Bracket(bracket) => {
            panic!("bracket {:?} outside of a pair", bracket.text);
        }
        AstNode::UnexpectedClosingBracket(stray) => {
            assert!(
                !stray.missing.intersects(open),
                "unexpected closer {:?} while its family is open",
                stray.text
            );
        }
        AstNode::Text(text) => {
            assert!(!text.length.is_zero(), "empty text leaf");
        }
    }
}
