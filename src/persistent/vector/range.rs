//! Range extraction: flattening whole subtrees, index ranges and suffixes.
//!
//! Whenever a range boundary is aligned to a child's address-space boundary
//! the child is copied wholesale, so the work done is proportional to the
//! output rather than to the size of the trie.

use super::index::{BITS_PER_LEVEL, slot, subtree_mask};
use super::node::Node;

/// Appends every element of the subtree to `output`, in index order.
pub(super) fn flatten_node<T: Clone>(node: &Node<T>, shift: usize, output: &mut Vec<T>) {
    if shift == 0 {
        output.extend_from_slice(node.elements());
    } else if shift == BITS_PER_LEVEL {
        for leaf in node.children() {
            output.extend_from_slice(leaf.elements());
        }
    } else {
        for child in node.children() {
            flatten_node(child, shift - BITS_PER_LEVEL, output);
        }
    }
}

/// Appends the elements at indices `from..=to` of the subtree to `output`.
///
/// Both bounds are global indices already checked against the vector length.
pub(super) fn flatten_range<T: Clone>(node: &Node<T>, shift: usize, from: usize, to: usize, output: &mut Vec<T>) {
    let from_slot = slot(from, shift);
    let to_slot = slot(to, shift);

    if shift == 0 {
        let elements = node.elements();
        output.extend_from_slice(elements.get(from_slot..=to_slot).unwrap_or(elements));
        return;
    }

    let children = node.children();
    let child_shift = shift - BITS_PER_LEVEL;

    if from_slot == to_slot {
        if let Some(child) = children.get(from_slot) {
            flatten_range(child, child_shift, from, to, output);
        }
        return;
    }

    let mask = subtree_mask(shift);

    if let Some(first) = children.get(from_slot) {
        if from & mask == 0 {
            flatten_node(first, child_shift, output);
        } else {
            flatten_range(first, child_shift, from, from | mask, output);
        }
    }

    for interior in children.iter().take(to_slot).skip(from_slot + 1) {
        flatten_node(interior, child_shift, output);
    }

    if let Some(last) = children.get(to_slot) {
        if to & mask == mask {
            flatten_node(last, child_shift, output);
        } else {
            flatten_range(last, child_shift, to & !mask, to, output);
        }
    }
}

/// Appends every element at index `from` or later to `output`.
pub(super) fn flatten_suffix<T: Clone>(node: &Node<T>, shift: usize, from: usize, output: &mut Vec<T>) {
    let from_slot = slot(from, shift);

    if shift == 0 {
        output.extend_from_slice(node.elements().get(from_slot..).unwrap_or_default());
        return;
    }

    let children = node.children();
    let child_shift = shift - BITS_PER_LEVEL;

    let following = if from & subtree_mask(shift) == 0 {
        from_slot
    } else if let Some(child) = children.get(from_slot) {
        flatten_suffix(child, child_shift, from, output);
        from_slot + 1
    } else {
        return;
    };

    for child in children.iter().skip(following) {
        flatten_node(child, child_shift, output);
    }
}
