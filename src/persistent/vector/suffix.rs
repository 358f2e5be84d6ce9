//! Bulk construction and suffix replacement.
//!
//! Suffix replacement keeps every element before a cut point (sharing the
//! untouched subtrees) and rebuilds everything from the cut onward out of a
//! replacement run. Append, insert, delete, truncation, concatenation and fill
//! are all expressed through it.
//!
//! The replacement run is consumed front to back: each step receives the
//! slice still to be placed and reports how many elements it used.

use arrayvec::ArrayVec;

use super::index::{BITS_PER_LEVEL, BRANCHING_FACTOR, child_span, shift_for, slot, subtree_mask};
use super::node::{Children, Elements, Node};
use super::update::{Root, grow_to_fit};
use crate::persistent::ReferenceCounter;

/// Groups items into nodes of up to 32 slots each.
fn pack<T, U, I>(items: I, make: fn(ArrayVec<U, BRANCHING_FACTOR>) -> Node<T>) -> Vec<ReferenceCounter<Node<T>>>
where
    I: Iterator<Item = U>,
{
    let mut packed = Vec::with_capacity(items.size_hint().0.div_ceil(BRANCHING_FACTOR));
    let mut items = items.peekable();
    while items.peek().is_some() {
        let slots: ArrayVec<U, BRANCHING_FACTOR> = items.by_ref().take(BRANCHING_FACTOR).collect();
        packed.push(ReferenceCounter::new(make(slots)));
    }
    packed
}

/// Builds full subtrees of the given level from a run of elements.
///
/// Every subtree except possibly the last one is completely filled.
fn build_subtrees<T, I>(elements: I, level: usize) -> Vec<ReferenceCounter<Node<T>>>
where
    I: Iterator<Item = T>,
{
    let mut nodes = pack(elements, Node::Leaf as fn(Elements<T>) -> Node<T>);
    for _ in 0..level {
        nodes = pack(nodes.into_iter(), Node::Branch as fn(Children<T>) -> Node<T>);
    }
    nodes
}

/// Stacks sibling nodes under new branches until a single root remains.
fn raise<T>(mut nodes: Vec<ReferenceCounter<Node<T>>>, mut levels: usize) -> Option<Root<T>> {
    while nodes.len() > 1 {
        nodes = pack(nodes.into_iter(), Node::Branch as fn(Children<T>) -> Node<T>);
        levels += 1;
    }
    let node = nodes.pop()?;
    Some(Root { node, levels })
}

/// Unwraps single-child roots so the height is minimal for the content.
fn collapse<T>(mut node: ReferenceCounter<Node<T>>, mut levels: usize) -> Root<T> {
    while levels > 0 {
        let Some(child) = node.only_child().cloned() else {
            break;
        };
        node = child;
        levels -= 1;
        trace_event!(levels, "trie dropped a redundant level");
    }
    Root { node, levels }
}

/// Builds a trie of minimal height holding `elements` in order.
///
/// Returns `None` for an empty input.
pub(super) fn build_root<T, I>(elements: I) -> Option<Root<T>>
where
    I: IntoIterator<Item = T>,
{
    let leaves = build_subtrees(elements.into_iter(), 0);
    trace_event!(leaves = leaves.len(), "building trie from leaves");
    raise(leaves, 0)
}

/// Replaces every element from index `from` onward with `suffix`.
///
/// `from` must not exceed the length of the trie rooted at `root`. Returns
/// `None` when the result holds no elements.
pub(super) fn replace_suffix<T: Clone>(
    root: &ReferenceCounter<Node<T>>,
    levels: usize,
    from: usize,
    suffix: &[T],
) -> Option<Root<T>> {
    if from == 0 {
        return build_root(suffix.iter().cloned());
    }

    let Root { node, levels } = grow_to_fit(root.clone(), levels, from);
    let (rebuilt, consumed) = replace_node_suffix(&node, shift_for(levels), from, suffix);

    let mut nodes = vec![ReferenceCounter::new(rebuilt)];
    let remaining = suffix.get(consumed..).unwrap_or_default();
    nodes.extend(build_subtrees(remaining.iter().cloned(), levels));

    let Root { node, levels } = raise(nodes, levels)?;
    Some(collapse(node, levels))
}

/// Rebuilds one node so it keeps its slots before `from` and continues with
/// as much of `suffix` as fits. Returns the node and the number of suffix
/// elements placed in it.
fn replace_node_suffix<T: Clone>(node: &Node<T>, shift: usize, from: usize, suffix: &[T]) -> (Node<T>, usize) {
    let from_slot = slot(from, shift);

    if shift == 0 {
        let kept = node.elements().get(..from_slot).unwrap_or_default();
        let taken = suffix.len().min(BRANCHING_FACTOR - kept.len());
        let elements: Elements<T> = kept.iter().chain(&suffix[..taken]).cloned().collect();
        return (Node::Leaf(elements), taken);
    }

    let children = node.children();
    let child_shift = shift - BITS_PER_LEVEL;
    let mut rebuilt: Children<T> = children.iter().take(from_slot).cloned().collect();
    let mut consumed = 0;

    if from & subtree_mask(shift) != 0
        && let Some(child) = children.get(from_slot)
    {
        let (child, used) = replace_node_suffix(child, child_shift, from, suffix);
        rebuilt.push(ReferenceCounter::new(child));
        consumed = used;
    }

    let remaining = &suffix[consumed..];
    let room = (BRANCHING_FACTOR - rebuilt.len()).saturating_mul(child_span(shift));
    let taken = remaining.len().min(room);
    rebuilt.extend(build_subtrees(
        remaining[..taken].iter().cloned(),
        child_shift / BITS_PER_LEVEL,
    ));

    (Node::Branch(rebuilt), consumed + taken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistent::vector::range::flatten_node;
    use rstest::rstest;

    fn contents(root: &Root<usize>) -> Vec<usize> {
        let mut output = Vec::new();
        flatten_node(&root.node, shift_for(root.levels), &mut output);
        output
    }

    #[rstest]
    #[case(1, 0)]
    #[case(32, 0)]
    #[case(33, 1)]
    #[case(1024, 1)]
    #[case(1025, 2)]
    fn test_build_root_uses_minimal_levels(#[case] length: usize, #[case] expected_levels: usize) {
        let root = build_root(0..length).expect("non-empty");
        assert_eq!(root.levels, expected_levels);
        assert_eq!(contents(&root), (0..length).collect::<Vec<_>>());
    }

    #[rstest]
    fn test_build_root_empty_is_none() {
        assert!(build_root(std::iter::empty::<usize>()).is_none());
    }

    #[rstest]
    #[case(100, 40, 10)]
    #[case(100, 64, 0)]
    #[case(32, 32, 1)]
    #[case(1024, 1024, 5)]
    #[case(1100, 5, 3000)]
    fn test_replace_suffix_keeps_prefix(#[case] length: usize, #[case] from: usize, #[case] added: usize) {
        let root = build_root(0..length).expect("non-empty");
        let suffix: Vec<usize> = (10_000..10_000 + added).collect();
        let replaced = replace_suffix(&root.node, root.levels, from, &suffix).expect("non-empty");

        let mut expected: Vec<usize> = (0..from).collect();
        expected.extend(&suffix);
        assert_eq!(contents(&replaced), expected);
    }

    #[rstest]
    fn test_replace_suffix_shares_untouched_subtrees() {
        let root = build_root(0..2048).expect("non-empty");
        let replaced = replace_suffix(&root.node, root.levels, 1500, &[1]).expect("non-empty");
        assert!(ReferenceCounter::ptr_eq(
            &root.node.children()[0],
            &replaced.node.children()[0]
        ));
    }

    #[rstest]
    fn test_truncation_collapses_redundant_levels() {
        let root = build_root(0..1025).expect("non-empty");
        assert_eq!(root.levels, 2);
        let truncated = replace_suffix(&root.node, root.levels, 20, &[]).expect("non-empty");
        assert_eq!(truncated.levels, 0);
        assert_eq!(contents(&truncated), (0..20).collect::<Vec<_>>());
    }

    #[rstest]
    fn test_shrinking_replacement_collapses_redundant_levels() {
        let root = build_root(0..33).expect("non-empty");
        let suffix: Vec<usize> = (6..33).collect();
        let replaced = replace_suffix(&root.node, root.levels, 5, &suffix).expect("non-empty");
        assert_eq!(replaced.levels, 0);
        assert_eq!(replaced.node.slot_count(), 32);
    }

    #[rstest]
    fn test_replace_everything_with_nothing_is_none() {
        let root = build_root(0..10).expect("non-empty");
        assert!(replace_suffix(&root.node, root.levels, 0, &[]).is_none());
    }
}
