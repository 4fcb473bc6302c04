//! AVL tree of roots, keyed by the root string.
//!
//! Keys compare by code point (`str` ordering), so the in-order walk yields
//! roots sorted the way `Ord for String` sorts them. The category stored on a
//! node is always the classifier's verdict for its key; it is recomputed on
//! every insert and never taken from a caller.

use std::cmp::Ordering;

use sarf_morph::classify;

use crate::{RootEntry, TreeShape};

#[derive(Debug, Clone)]
struct Node {
    entry: RootEntry,
    height: i32,
    left: Option<Box<Node>>,
    right: Option<Box<Node>>,
}

impl Node {
    fn new(entry: RootEntry) -> Self {
        Self {
            entry,
            height: 1,
            left: None,
            right: None,
        }
    }

    fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    fn balance(&self) -> i32 {
        height(&self.left) - height(&self.right)
    }
}

fn height(node: &Option<Box<Node>>) -> i32 {
    node.as_ref().map_or(0, |n| n.height)
}

#[derive(Debug, Clone, Default)]
pub struct RootTree {
    root: Option<Box<Node>>,
    len: usize,
}

impl RootTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the tree; 0 when empty.
    pub fn height(&self) -> i32 {
        height(&self.root)
    }

    /// Insert `root`, or refresh the category of an existing node. Returns
    /// `true` when a new node was created.
    pub fn insert(&mut self, root: &str) -> bool {
        let (node, inserted) = insert_node(self.root.take(), root);
        self.root = Some(node);
        if inserted {
            self.len += 1;
        }
        inserted
    }

    pub fn search(&self, root: &str) -> Option<&RootEntry> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match root.cmp(node.entry.root.as_str()) {
                Ordering::Equal => return Some(&node.entry),
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
            };
        }
        None
    }

    pub fn search_mut(&mut self, root: &str) -> Option<&mut RootEntry> {
        let mut current = self.root.as_deref_mut();
        while let Some(node) = current {
            current = match root.cmp(node.entry.root.as_str()) {
                Ordering::Equal => return Some(&mut node.entry),
                Ordering::Less => node.left.as_deref_mut(),
                Ordering::Greater => node.right.as_deref_mut(),
            };
        }
        None
    }

    pub fn contains(&self, root: &str) -> bool {
        self.search(root).is_some()
    }

    /// Entries in key order.
    pub fn in_order(&self) -> Vec<&RootEntry> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack: Vec<&Node> = Vec::new();
        let mut current = self.root.as_deref();
        loop {
            while let Some(node) = current {
                stack.push(node);
                current = node.left.as_deref();
            }
            let Some(node) = stack.pop() else {
                break;
            };
            out.push(&node.entry);
            current = node.right.as_deref();
        }
        out
    }

    /// Name, balance factor and children of every node, children left first.
    pub fn visualize(&self) -> Option<TreeShape> {
        self.root.as_deref().map(shape)
    }

    #[cfg(test)]
    fn assert_balanced(&self) {
        fn check(node: &Option<Box<Node>>) -> i32 {
            let Some(node) = node else {
                return 0;
            };
            let left = check(&node.left);
            let right = check(&node.right);
            assert!((left - right).abs() <= 1, "unbalanced at {}", node.entry.root);
            assert_eq!(node.height, 1 + left.max(right), "stale height at {}", node.entry.root);
            1 + left.max(right)
        }
        check(&self.root);
    }
}

fn shape(node: &Node) -> TreeShape {
    TreeShape {
        name: node.entry.root.clone(),
        balance: node.balance(),
        children: [node.left.as_deref(), node.right.as_deref()]
            .into_iter()
            .flatten()
            .map(shape)
            .collect(),
    }
}

fn insert_node(node: Option<Box<Node>>, root: &str) -> (Box<Node>, bool) {
    let Some(mut node) = node else {
        return (Box::new(Node::new(RootEntry::new(root, classify(root)))), true);
    };

    let inserted = match root.cmp(node.entry.root.as_str()) {
        Ordering::Equal => {
            node.entry.category = classify(root);
            return (node, false);
        }
        Ordering::Less => {
            let (child, inserted) = insert_node(node.left.take(), root);
            node.left = Some(child);
            inserted
        }
        Ordering::Greater => {
            let (child, inserted) = insert_node(node.right.take(), root);
            node.right = Some(child);
            inserted
        }
    };

    (rebalance(node), inserted)
}

fn rebalance(mut node: Box<Node>) -> Box<Node> {
    node.update_height();
    let balance = node.balance();

    if balance > 1 {
        // left-right: straighten the left child first
        if node.left.as_ref().is_some_and(|l| l.balance() < 0) {
            node.left = node.left.take().map(rotate_left);
        }
        return rotate_right(node);
    }
    if balance < -1 {
        // right-left
        if node.right.as_ref().is_some_and(|r| r.balance() > 0) {
            node.right = node.right.take().map(rotate_right);
        }
        return rotate_left(node);
    }
    node
}

fn rotate_right(mut node: Box<Node>) -> Box<Node> {
    let Some(mut pivot) = node.left.take() else {
        return node;
    };
    node.left = pivot.right.take();
    node.update_height();
    pivot.right = Some(node);
    pivot.update_height();
    pivot
}

fn rotate_left(mut node: Box<Node>) -> Box<Node> {
    let Some(mut pivot) = node.right.take() else {
        return node;
    };
    node.right = pivot.left.take();
    node.update_height();
    pivot.left = Some(node);
    pivot.update_height();
    pivot
}
