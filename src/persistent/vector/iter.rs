//! Traversal: internal `for_each` walks and the external iterators.

use std::iter::FusedIterator;

use super::PersistentVector;
use super::index::MASK;
use super::lookup::leaf_node_for;
use super::node::Node;
use crate::persistent::ReferenceCounter;

// =============================================================================
// Recursive Traversal
// =============================================================================

fn visit_forward<'a, T, F: FnMut(&'a T)>(node: &'a Node<T>, level: usize, visit: &mut F) {
    if level == 0 {
        for element in node.elements() {
            visit(element);
        }
    } else {
        for child in node.children() {
            visit_forward(child, level - 1, visit);
        }
    }
}

fn visit_backward<'a, T, F: FnMut(&'a T)>(node: &'a Node<T>, level: usize, visit: &mut F) {
    if level == 0 {
        for element in node.elements().iter().rev() {
            visit(element);
        }
    } else {
        for child in node.children().iter().rev() {
            visit_backward(child, level - 1, visit);
        }
    }
}

impl<T> PersistentVector<T> {
    /// Calls `function` on every element in index order.
    ///
    /// Walks the trie depth-first, so no per-element index lookups happen.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=4).collect();
    /// let mut sum = 0;
    /// vector.for_each(|element| sum += element);
    /// assert_eq!(sum, 10);
    /// ```
    pub fn for_each<'a, F: FnMut(&'a T)>(&'a self, mut function: F) {
        if let Some(root) = &self.root {
            visit_forward(root, self.levels, &mut function);
        }
    }

    /// Calls `function` on every element from the last index to the first.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=3).collect();
    /// let mut seen = Vec::new();
    /// vector.for_each_reverse(|element| seen.push(*element));
    /// assert_eq!(seen, vec![3, 2, 1]);
    /// ```
    pub fn for_each_reverse<'a, F: FnMut(&'a T)>(&'a self, mut function: F) {
        if let Some(root) = &self.root {
            visit_backward(root, self.levels, &mut function);
        }
    }

    /// Returns an iterator over references to the elements.
    ///
    /// The iterator is double-ended and knows its exact length. It caches the
    /// current leaf at each end, so the trie is descended once per 32 elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// let collected: Vec<&i32> = vector.iter().collect();
    /// assert_eq!(collected, vec![&1, &2, &3, &4, &5]);
    /// assert_eq!(vector.iter().rev().next(), Some(&5));
    /// ```
    #[must_use]
    pub fn iter(&self) -> PersistentVectorIterator<'_, T> {
        PersistentVectorIterator::new(self)
    }

    /// Returns the leaf owning `index`, or `None` on an empty vector.
    fn leaf_node(&self, index: usize) -> Option<&ReferenceCounter<Node<T>>> {
        leaf_node_for(self.root.as_ref()?, self.levels, index)
    }
}

// =============================================================================
// Borrowing Iterator
// =============================================================================

/// An iterator over references to elements of a [`PersistentVector`].
///
/// Holds the unvisited part of the current leaf at both ends; a new leaf is
/// looked up only when one of them runs dry.
pub struct PersistentVectorIterator<'a, T> {
    vector: &'a PersistentVector<T>,
    /// Index of the next element yielded from the front
    front: usize,
    /// One past the index of the next element yielded from the back
    back: usize,
    front_chunk: &'a [T],
    back_chunk: &'a [T],
}

impl<'a, T> PersistentVectorIterator<'a, T> {
    fn new(vector: &'a PersistentVector<T>) -> Self {
        Self {
            vector,
            front: 0,
            back: vector.length,
            front_chunk: &[],
            back_chunk: &[],
        }
    }

    fn leaf_at(&self, index: usize) -> &'a [T] {
        match self.vector.leaf_node(index) {
            Some(leaf) => leaf.elements(),
            None => &[],
        }
    }
}

impl<'a, T> Iterator for PersistentVectorIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        if self.front_chunk.is_empty() {
            self.front_chunk = self
                .leaf_at(self.front)
                .get(self.front & MASK..)
                .unwrap_or_default();
        }
        let (element, rest) = self.front_chunk.split_first()?;
        self.front_chunk = rest;
        self.front += 1;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back.saturating_sub(self.front);
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for PersistentVectorIterator<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        if self.back_chunk.is_empty() {
            let last = self.back - 1;
            self.back_chunk = self.leaf_at(last).get(..=last & MASK).unwrap_or_default();
        }
        let (element, rest) = self.back_chunk.split_last()?;
        self.back_chunk = rest;
        self.back -= 1;
        Some(element)
    }
}

impl<T> ExactSizeIterator for PersistentVectorIterator<'_, T> {}

impl<T> FusedIterator for PersistentVectorIterator<'_, T> {}

impl<T> Clone for PersistentVectorIterator<'_, T> {
    fn clone(&self) -> Self {
        Self {
            vector: self.vector,
            front: self.front,
            back: self.back,
            front_chunk: self.front_chunk,
            back_chunk: self.back_chunk,
        }
    }
}

// =============================================================================
// Owning Iterator
// =============================================================================

/// An owning iterator over elements of a [`PersistentVector`].
///
/// The trie may be shared with other vectors, so elements are cloned out of
/// it as they are returned. The leaf at each end is held by reference count.
pub struct PersistentVectorIntoIterator<T> {
    vector: PersistentVector<T>,
    front: usize,
    back: usize,
    front_leaf: Option<ReferenceCounter<Node<T>>>,
    back_leaf: Option<ReferenceCounter<Node<T>>>,
}

impl<T> PersistentVectorIntoIterator<T> {
    fn new(vector: PersistentVector<T>) -> Self {
        let back = vector.length;
        Self {
            vector,
            front: 0,
            back,
            front_leaf: None,
            back_leaf: None,
        }
    }
}

impl<T: Clone> Iterator for PersistentVectorIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        if self.front & MASK == 0 || self.front_leaf.is_none() {
            self.front_leaf = self.vector.leaf_node(self.front).cloned();
        }
        let element = self.front_leaf.as_ref()?.elements().get(self.front & MASK)?.clone();
        self.front += 1;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back.saturating_sub(self.front);
        (remaining, Some(remaining))
    }
}

impl<T: Clone> DoubleEndedIterator for PersistentVectorIntoIterator<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let last = self.back - 1;
        if last & MASK == MASK || self.back_leaf.is_none() {
            self.back_leaf = self.vector.leaf_node(last).cloned();
        }
        let element = self.back_leaf.as_ref()?.elements().get(last & MASK)?.clone();
        self.back = last;
        Some(element)
    }
}

impl<T: Clone> ExactSizeIterator for PersistentVectorIntoIterator<T> {}

impl<T: Clone> FusedIterator for PersistentVectorIntoIterator<T> {}

impl<T: Clone> IntoIterator for PersistentVector<T> {
    type Item = T;
    type IntoIter = PersistentVectorIntoIterator<T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        PersistentVectorIntoIterator::new(self)
    }
}

impl<'a, T> IntoIterator for &'a PersistentVector<T> {
    type Item = &'a T;
    type IntoIter = PersistentVectorIterator<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
