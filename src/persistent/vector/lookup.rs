//! Read path: descend the index codec to the leaf owning an index.

use super::index::{MASK, SlotPath};
use super::node::Node;
use crate::persistent::ReferenceCounter;

/// Returns the leaf node owning `index` in a trie of height `levels`.
///
/// The caller guarantees `index` is below the vector's length; a missing slot
/// only arises from a broken invariant and yields `None`.
pub(super) fn leaf_node_for<T>(
    root: &ReferenceCounter<Node<T>>,
    levels: usize,
    index: usize,
) -> Option<&ReferenceCounter<Node<T>>> {
    SlotPath::new(index, levels)
        .take(levels)
        .try_fold(root, |node, slot| node.children().get(slot))
}

/// Returns the element at `index` in a trie of height `levels`.
pub(super) fn element_at<T>(root: &ReferenceCounter<Node<T>>, levels: usize, index: usize) -> Option<&T> {
    leaf_node_for(root, levels, index)?.elements().get(index & MASK)
}

/// Returns the slots visited when reading `index`, for diagnostics and tests.
#[cfg(test)]
pub(super) fn path_of(index: usize, levels: usize) -> Vec<usize> {
    SlotPath::new(index, levels).collect()
}
