//! Node model of the bitmapped trie.
//!
//! A node's kind is implied by the level it sits at: level 0 holds elements,
//! every higher level holds child references one level down. Callers descend
//! with a shift and pick the accessor matching that level; they never inspect
//! a node to guess its kind.

use arrayvec::ArrayVec;

use super::index::BRANCHING_FACTOR;
use crate::persistent::ReferenceCounter;

/// Up to 32 elements stored inline in a leaf.
pub(super) type Elements<T> = ArrayVec<T, BRANCHING_FACTOR>;

/// Up to 32 shared child references stored inline in a branch.
pub(super) type Children<T> = ArrayVec<ReferenceCounter<Node<T>>, BRANCHING_FACTOR>;

/// Internal node structure for the bitmapped trie.
///
/// Nodes are never mutated once they are reachable from a published vector;
/// edits build new nodes and share the untouched ones by reference.
#[derive(Clone)]
pub(super) enum Node<T> {
    /// Level 0: elements, densely packed from slot 0
    Leaf(Elements<T>),
    /// Level > 0: full subtrees of the level below, densely packed from slot 0
    Branch(Children<T>),
}

impl<T> Node<T> {
    /// Wraps a node in a new single-child branch one level up.
    pub(super) fn wrap(node: ReferenceCounter<Self>) -> ReferenceCounter<Self> {
        let mut children = Children::new();
        children.push(node);
        ReferenceCounter::new(Self::Branch(children))
    }

    /// Elements of a node reached at level 0.
    #[inline]
    pub(super) fn elements(&self) -> &[T] {
        match self {
            Self::Leaf(elements) => elements,
            Self::Branch(_) => {
                debug_assert!(false, "branch node reached at leaf level");
                &[]
            }
        }
    }

    /// Children of a node reached above level 0.
    #[inline]
    pub(super) fn children(&self) -> &[ReferenceCounter<Self>] {
        match self {
            Self::Branch(children) => children,
            Self::Leaf(_) => {
                debug_assert!(false, "leaf node reached at branch level");
                &[]
            }
        }
    }

    /// Number of occupied slots.
    #[cfg(test)]
    pub(super) fn slot_count(&self) -> usize {
        match self {
            Self::Leaf(elements) => elements.len(),
            Self::Branch(children) => children.len(),
        }
    }

    /// Returns the only child of a branch, if it has exactly one.
    pub(super) fn only_child(&self) -> Option<&ReferenceCounter<Self>> {
        match self {
            Self::Branch(children) if children.len() == 1 => children.first(),
            _ => None,
        }
    }
}

impl<T: PartialEq> Node<T> {
    /// Deep, level-directed comparison of two subtrees.
    ///
    /// Subtrees shared by reference compare equal without descending.
    pub(super) fn equals(this: &ReferenceCounter<Self>, other: &ReferenceCounter<Self>, level: usize) -> bool {
        if ReferenceCounter::ptr_eq(this, other) {
            return true;
        }
        if level == 0 {
            return this.elements() == other.elements();
        }
        let (left, right) = (this.children(), other.children());
        left.len() == right.len()
            && left
                .iter()
                .zip(right)
                .all(|(left_child, right_child)| Self::equals(left_child, right_child, level - 1))
    }
}
