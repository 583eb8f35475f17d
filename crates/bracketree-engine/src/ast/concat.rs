//! Joining sibling nodes into balanced 2-3 lists.
//!
//! Freshly parsed siblings all sit at height 0 and are packed bottom-up.
//! Siblings taken from a previous tree can be lists of any height; those are
//! joined pairwise by appending the lower tree into the right (or left) spine
//! of the higher one, splitting overfull lists on the way back up.

use std::rc::Rc;

use super::{AstNode, NodeRef};

/// Joins nodes of equal list height into one balanced tree.
pub fn concat23_trees_of_same_height(mut items: Vec<NodeRef>) -> Option<NodeRef> {
    if items.len() <= 1 {
        return items.pop();
    }

    while items.len() > 3 {
        let mut iter = items.into_iter();
        let mut next = Vec::with_capacity(iter.len() / 2);
        while let (Some(a), Some(b)) = (iter.next(), iter.next()) {
            // An odd count leaves the last group with three nodes.
            let c = if iter.len() == 1 { iter.next() } else { None };
            next.push(AstNode::list23(a, b, c));
        }
        items = next;
    }

    let mut iter = items.into_iter();
    let a = iter.next()?;
    let b = iter.next()?;
    Some(AstNode::list23(a, b, iter.next()))
}

/// Joins nodes of arbitrary list heights, preserving their order.
pub fn concat23_trees(items: Vec<NodeRef>) -> Option<NodeRef> {
    let mut runs = Vec::new();
    let mut iter = items.into_iter().peekable();
    while let Some(first) = iter.next() {
        let height = first.list_height();
        let mut run = vec![first];
        while let Some(node) = iter.next_if(|n| n.list_height() == height) {
            run.push(node);
        }
        runs.extend(concat23_trees_of_same_height(run));
    }

    let mut runs = runs.into_iter();
    let mut first = runs.next()?;
    let Some(mut second) = runs.next() else {
        return Some(first);
    };
    for item in runs {
        // Join the closer-in-height neighbours first.
        if height_diff(&first, &second) <= height_diff(&second, &item) {
            first = concat(first, second);
            second = item;
        } else {
            second = concat(second, item);
        }
    }
    Some(concat(first, second))
}

fn height_diff(a: &NodeRef, b: &NodeRef) -> u32 {
    a.list_height().abs_diff(b.list_height())
}

fn concat(left: NodeRef, right: NodeRef) -> NodeRef {
    let (lh, rh) = (left.list_height(), right.list_height());
    if lh == rh {
        AstNode::list23(left, right, None)
    } else if lh > rh {
        append(left, right)
    } else {
        prepend(right, left)
    }
}

/// Appends `node` to the right spine of the higher `list`.
fn append(mut list: NodeRef, node: NodeRef) -> NodeRef {
    match append_into(&mut list, node) {
        Some(split) => AstNode::list23(list, split, None),
        None => list,
    }
}

/// Returns the right sibling split off `list` when it overflows.
fn append_into(list: &mut NodeRef, node: NodeRef) -> Option<NodeRef> {
    let AstNode::List(l) = Rc::make_mut(list) else {
        return Some(node);
    };
    let to_insert = if l.height() == node.list_height() + 1 {
        Some(node)
    } else {
        match l.children_mut().last_mut() {
            Some(last) => append_into(last, node),
            None => Some(node),
        }
    };

    let split = match to_insert {
        Some(node) if l.children().len() >= 3 => l
            .children_mut()
            .pop()
            .map(|third| AstNode::list23(third, node, None)),
        Some(node) => {
            l.children_mut().push(node);
            None
        }
        None => None,
    };
    l.refresh();
    split
}

/// Prepends `node` to the left spine of the higher `list`.
fn prepend(mut list: NodeRef, node: NodeRef) -> NodeRef {
    match prepend_into(&mut list, node) {
        Some(split) => AstNode::list23(split, list, None),
        None => list,
    }
}

/// Returns the left sibling split off `list` when it overflows.
fn prepend_into(list: &mut NodeRef, node: NodeRef) -> Option<NodeRef> {
    let AstNode::List(l) = Rc::make_mut(list) else {
        return Some(node);
    };
    let to_insert = if l.height() == node.list_height() + 1 {
        Some(node)
    } else {
        match l.children_mut().first_mut() {
            Some(first) => prepend_into(first, node),
            None => Some(node),
        }
    };

    let split = match to_insert {
        Some(node) if l.children().len() >= 3 => {
            let first = l.children_mut().remove(0);
            Some(AstNode::list23(node, first, None))
        }
        Some(node) => {
            l.children_mut().insert(0, node);
            None
        }
        None => None,
    };
    l.refresh();
    split
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::length::Length;
    use rstest::rstest;

    fn leaves(n: u32) -> Vec<NodeRef> {
        (1..=n).map(|i| AstNode::text(Length::new(0, i))).collect()
    }

    fn leaf_columns(node: &NodeRef, out: &mut Vec<u32>) {
        match node.as_list() {
            Some(list) => list.children().iter().for_each(|c| leaf_columns(c, out)),
            None => out.push(node.length().columns()),
        }
    }

    fn assert_balanced(node: &NodeRef) {
        if let Some(list) = node.as_list() {
            assert!((2..=3).contains(&list.children().len()));
            for child in list.children() {
                assert_eq!(child.list_height() + 1, list.height());
                assert_balanced(child);
            }
        }
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    #[case(4)]
    #[case(5)]
    #[case(17)]
    #[case(100)]
    fn same_height_keeps_order_and_balance(#[case] n: u32) {
        let Some(tree) = concat23_trees_of_same_height(leaves(n)) else {
            panic!("no tree for {n} leaves");
        };
        assert_balanced(&tree);
        let mut cols = Vec::new();
        leaf_columns(&tree, &mut cols);
        assert_eq!(cols, (1..=n).collect::<Vec<_>>());
        assert_eq!(tree.length().columns(), n * (n + 1) / 2);
    }

    #[test]
    fn mixed_heights_keep_order_and_balance() {
        let mut next = 1;
        let mut take = |count: u32| {
            let batch: Vec<NodeRef> = (next..next + count)
                .map(|i| AstNode::text(Length::new(0, i)))
                .collect();
            next += count;
            batch
        };
        let mut items = Vec::new();
        items.extend(take(1));
        items.extend(concat23_trees_of_same_height(take(9)));
        items.extend(take(2));
        items.extend(concat23_trees_of_same_height(take(30)));
        items.extend(concat23_trees_of_same_height(take(3)));
        items.extend(take(1));

        let Some(tree) = concat23_trees(items) else {
            panic!("no tree");
        };
        assert_balanced(&tree);
        let mut cols = Vec::new();
        leaf_columns(&tree, &mut cols);
        assert_eq!(cols, (1..=46).collect::<Vec<_>>());
    }

    #[test]
    fn shared_lists_are_copied_not_modified() {
        let Some(shared) = concat23_trees_of_same_height(leaves(9)) else {
            panic!("no tree");
        };
        let before = shared.length();
        let joined = concat23_trees(vec![shared.clone(), AstNode::text(Length::new(0, 50))]);
        assert_eq!(shared.length(), before);
        assert_eq!(
            joined.map(|n| n.length()),
            Some(before + Length::new(0, 50))
        );
    }

    #[test]
    fn empty_input_has_no_tree() {
        assert!(concat23_trees(Vec::new()).is_none());
        assert!(concat23_trees_of_same_height(Vec::new()).is_none());
    }
}
