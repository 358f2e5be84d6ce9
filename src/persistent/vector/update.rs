//! Write path: point update by path copying.
//!
//! Only the nodes on the path from the root to the target leaf are rebuilt.
//! A slot equal to the current length is appended, which is how the trie grows
//! one element at a time.

use super::index::{BITS_PER_LEVEL, capacity, shift_for, slot};
use super::node::{Children, Elements, Node};
use crate::persistent::ReferenceCounter;

/// A root together with its height, as published by a vector.
pub(super) struct Root<T> {
    pub(super) node: ReferenceCounter<Node<T>>,
    pub(super) levels: usize,
}

/// Wraps the root in single-child branches until `index` is addressable.
///
/// Each step allocates one node; nothing below the old root is copied.
pub(super) fn grow_to_fit<T>(mut root: ReferenceCounter<Node<T>>, mut levels: usize, index: usize) -> Root<T> {
    while index >= capacity(levels) {
        root = Node::wrap(root);
        levels += 1;
        trace_event!(levels, index, "trie grew a level");
    }
    Root { node: root, levels }
}

/// Writes the slot for `index`, rebuilding the path above it.
///
/// `write` receives the element currently stored at `index` (`None` when the
/// slot is being appended) and returns the value to store, or `None` to leave
/// the slot as it is. An untouched slot propagates `None` upwards so every
/// ancestor is reused instead of copied.
pub(super) fn update_root<T, W>(
    root: Option<&ReferenceCounter<Node<T>>>,
    levels: usize,
    index: usize,
    write: W,
) -> Option<Root<T>>
where
    T: Clone,
    W: FnOnce(Option<&T>) -> Option<T>,
{
    let Some(root) = root else {
        let value = write(None)?;
        let mut elements = Elements::new();
        elements.push(value);
        return Some(Root {
            node: ReferenceCounter::new(Node::Leaf(elements)),
            levels: 0,
        });
    };
    let Root { node, levels } = grow_to_fit(root.clone(), levels, index);
    let node = update_node(Some(&node), shift_for(levels), index, write)?;
    Some(Root { node, levels })
}

fn update_node<T, W>(
    node: Option<&ReferenceCounter<Node<T>>>,
    shift: usize,
    index: usize,
    write: W,
) -> Option<ReferenceCounter<Node<T>>>
where
    T: Clone,
    W: FnOnce(Option<&T>) -> Option<T>,
{
    let slot_index = slot(index, shift);

    if shift == 0 {
        let existing: &[T] = match node {
            Some(leaf) => leaf.elements(),
            None => &[],
        };
        let value = write(existing.get(slot_index))?;
        let mut elements: Elements<T> = existing.iter().cloned().collect();
        match elements.get_mut(slot_index) {
            Some(target) => *target = value,
            None => elements.push(value),
        }
        return Some(ReferenceCounter::new(Node::Leaf(elements)));
    }

    let existing: &[ReferenceCounter<Node<T>>] = match node {
        Some(branch) => branch.children(),
        None => &[],
    };
    let child = update_node(existing.get(slot_index), shift - BITS_PER_LEVEL, index, write)?;
    let mut children: Children<T> = existing.iter().cloned().collect();
    match children.get_mut(slot_index) {
        Some(target) => *target = child,
        None => children.push(child),
    }
    Some(ReferenceCounter::new(Node::Branch(children)))
}
