//! Persistent (immutable) vector based on a 32-way bitmapped trie.
//!
//! This module provides [`PersistentVector`], an immutable indexed sequence
//! that uses structural sharing for efficient operations.
//!
//! # Overview
//!
//! Elements live in leaves of up to 32 slots; internal nodes hold up to 32
//! children, each a full subtree one level down. A trie of height `levels`
//! addresses `32^(levels + 1)` indices, and the height is always the smallest
//! one that fits the length.
//!
//! - O(log32 N) random access and point update
//! - O(log32 N) append
//! - O(N - i) insert and delete at position `i` (the suffix is rebuilt)
//! - Range extraction proportional to the output
//! - O(1) len and `is_empty`
//!
//! # Internal Structure
//!
//! Four primitives do all the work:
//! - the read path descends from the root to one leaf
//! - the write path copies the nodes on one root-to-leaf path
//! - range extraction flattens an index range, copying aligned subtrees whole
//! - suffix replacement keeps a prefix and rebuilds everything after it
//!
//! # Examples
//!
//! ```rust
//! use bitmapped_vector::persistent::PersistentVector;
//!
//! let vector = PersistentVector::new().add(1).add(2).add(3);
//!
//! assert_eq!(vector.get(0), Some(&1));
//! assert_eq!(vector.get(-1), Some(&3));
//!
//! // Structural sharing: the original vector is preserved
//! let extended = vector.add(4);
//! assert_eq!(vector.len(), 3);     // Original unchanged
//! assert_eq!(extended.len(), 4);   // New vector
//! ```

mod index;
mod iter;
mod lookup;
mod node;
mod range;
mod suffix;
mod update;

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;
use std::ops::{Add, Bound, RangeBounds};

use super::ReferenceCounter;
use super::error::VectorError;

use index::normalize;
use node::Node;
use update::Root;

pub use iter::{PersistentVectorIntoIterator, PersistentVectorIterator};

// =============================================================================
// PersistentVector Definition
// =============================================================================

/// A persistent (immutable) vector based on a 32-way bitmapped trie.
///
/// Positions are `isize`: a negative position counts back from the end, so
/// `-1` is the last element.
///
/// # Time Complexity
///
/// | Operation       | Complexity          |
/// |-----------------|---------------------|
/// | `new`           | O(1)                |
/// | `get`           | O(log32 N)          |
/// | `set`           | O(log32 N)          |
/// | `add`           | O(log32 N)          |
/// | `insert`        | O(N - i + k)        |
/// | `delete_at`     | O(N - i)            |
/// | `pop`           | O(log32 N)          |
/// | `slice`         | O(k + log32 N)      |
/// | `concat`        | O(M + log32 N)      |
/// | `len`           | O(1)                |
/// | `iter`          | O(1) to create, O(N) to iterate |
///
/// # Examples
///
/// ```rust
/// use bitmapped_vector::persistent::PersistentVector;
///
/// let vector: PersistentVector<i32> = (0..100).collect();
/// assert_eq!(vector.len(), 100);
/// assert_eq!(vector.get(50), Some(&50));
/// ```
pub struct PersistentVector<T> {
    /// Root node of the trie; `None` for the empty vector
    root: Option<ReferenceCounter<Node<T>>>,
    /// Total number of elements
    length: usize,
    /// Height of the root above the leaves
    levels: usize,
}

#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(PersistentVector<i32>: Send, Sync);

#[cfg(not(feature = "arc"))]
static_assertions::assert_not_impl_any!(PersistentVector<i32>: Send, Sync);

impl<T> PersistentVector<T> {
    /// The empty vector. Every operation yielding no elements returns a value
    /// equal to it.
    pub const EMPTY: Self = Self::new();

    /// Creates a new empty vector.
    ///
    /// Allocates nothing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = PersistentVector::new();
    /// assert!(vector.is_empty());
    /// assert_eq!(vector, PersistentVector::EMPTY);
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root: None,
            length: 0,
            levels: 0,
        }
    }

    /// Creates a vector containing a single element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::singleton(42);
    /// assert_eq!(vector.len(), 1);
    /// assert_eq!(vector.get(0), Some(&42));
    /// ```
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self::from_vec(vec![element])
    }

    /// Creates a vector taking ownership of the elements of `elements`.
    ///
    /// Leaves are filled 32 at a time and grouped until one root remains.
    ///
    /// # Complexity
    ///
    /// O(N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::from_vec(vec![1, 2, 3]);
    /// assert_eq!(vector.len(), 3);
    /// assert_eq!(vector.levels(), 0);
    /// ```
    #[must_use]
    pub fn from_vec(elements: Vec<T>) -> Self {
        let length = elements.len();
        Self::from_root(suffix::build_root(elements), length)
    }

    /// Publishes an already built trie.
    ///
    /// The caller guarantees that `root` holds exactly `length` elements and
    /// has minimal height.
    fn from_root(root: Option<Root<T>>, length: usize) -> Self {
        match root {
            Some(Root { node, levels }) if length > 0 => Self {
                root: Some(node),
                length,
                levels,
            },
            _ => Self::new(),
        }
    }

    /// Returns the number of elements in the vector.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// assert_eq!(vector.len(), 5);
    /// ```
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the vector contains no elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let empty: PersistentVector<i32> = PersistentVector::new();
    /// assert!(empty.is_empty());
    ///
    /// let non_empty = empty.add(1);
    /// assert!(!non_empty.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the height of the trie above its leaves.
    ///
    /// A vector of up to 32 elements has height 0, up to 1024 height 1, and
    /// so on. The height never exceeds what the length requires.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (0..65).collect();
    /// assert_eq!(vector.levels(), 1);
    /// assert_eq!(vector.take(32).unwrap().levels(), 0);
    /// ```
    #[inline]
    #[must_use]
    pub const fn levels(&self) -> usize {
        self.levels
    }

    /// Resolves a position against the length; `None` if nothing is stored there.
    fn resolve(&self, index: isize) -> Option<usize> {
        normalize(index, self.length).filter(|&position| position < self.length)
    }

    fn element(&self, position: usize) -> Option<&T> {
        lookup::element_at(self.root.as_ref()?, self.levels, position)
    }

    /// Returns a reference to the element at the given position.
    ///
    /// Negative positions count from the end. Returns `None` if the position
    /// is outside `-len..len`.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// assert_eq!(vector.get(0), Some(&1));
    /// assert_eq!(vector.get(-1), Some(&5));
    /// assert_eq!(vector.get(10), None);
    /// assert_eq!(vector.get(-6), None);
    /// ```
    #[must_use]
    pub fn get(&self, index: isize) -> Option<&T> {
        self.element(self.resolve(index)?)
    }

    /// Returns a reference to the element at the given position, or an error
    /// naming the position and the length.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::OutOfRange`] if the position is outside `-len..len`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::{PersistentVector, VectorError};
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// assert_eq!(vector.fetch(2), Ok(&3));
    /// assert_eq!(
    ///     vector.fetch(5),
    ///     Err(VectorError::OutOfRange { index: 5, length: 5 })
    /// );
    /// ```
    pub fn fetch(&self, index: isize) -> Result<&T, VectorError> {
        self.get(index)
            .ok_or(VectorError::out_of_range(index, self.length))
    }

    /// Returns a reference to the first element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// assert_eq!(vector.first(), Some(&1));
    ///
    /// let empty: PersistentVector<i32> = PersistentVector::new();
    /// assert_eq!(empty.first(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    /// Returns a reference to the last element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// assert_eq!(vector.last(), Some(&5));
    /// ```
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.get(-1)
    }

    /// Finds the position of the first element that satisfies the predicate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// assert_eq!(vector.find_index(|x| *x > 3), Some(3));
    /// ```
    #[must_use]
    pub fn find_index<P>(&self, predicate: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().position(predicate)
    }

    /// Finds the position of the last element that satisfies the predicate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::from_vec(vec![1, 4, 2, 5, 3]);
    /// assert_eq!(vector.rfind_index(|x| *x > 3), Some(3));
    /// ```
    #[must_use]
    pub fn rfind_index<P>(&self, predicate: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().rposition(predicate)
    }

    /// Binary searches a vector sorted with respect to `compare`.
    ///
    /// Returns `Ok(position)` of a matching element, or `Err(position)` where
    /// a matching element could be inserted while keeping the order.
    ///
    /// # Complexity
    ///
    /// O(log N * log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (0..100).map(|x| x * 2).collect();
    /// assert_eq!(vector.binary_search_by(|x| x.cmp(&40)), Ok(20));
    /// assert_eq!(vector.binary_search_by(|x| x.cmp(&41)), Err(21));
    /// ```
    pub fn binary_search_by<F>(&self, mut compare: F) -> Result<usize, usize>
    where
        F: FnMut(&T) -> Ordering,
    {
        let mut low = 0;
        let mut high = self.length;
        while low < high {
            let middle = low + (high - low) / 2;
            let Some(element) = self.element(middle) else {
                break;
            };
            match compare(element) {
                Ordering::Less => low = middle + 1,
                Ordering::Greater => high = middle,
                Ordering::Equal => return Ok(middle),
            }
        }
        Err(low)
    }

    /// Returns a new vector with `function` applied to every element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=3).collect();
    /// let doubled = vector.map(|x| x * 2);
    /// assert_eq!(doubled, PersistentVector::from_vec(vec![2, 4, 6]));
    /// ```
    #[must_use]
    pub fn map<U, F>(&self, function: F) -> PersistentVector<U>
    where
        F: FnMut(&T) -> U,
    {
        self.iter().map(function).collect()
    }

    /// Returns the empty vector.
    #[inline]
    #[must_use]
    pub const fn clear(&self) -> Self {
        Self::new()
    }
}

impl<T: Clone> PersistentVector<T> {
    /// Creates a vector holding clones of the elements of `slice`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::from_slice(&[1, 2, 3, 4, 5]);
    /// assert_eq!(vector.len(), 5);
    /// assert_eq!(vector.get(2), Some(&3));
    /// ```
    #[must_use]
    pub fn from_slice(slice: &[T]) -> Self {
        Self::from_root(suffix::build_root(slice.iter().cloned()), slice.len())
    }

    /// Collects the elements into a standard `Vec`, in order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=3).collect();
    /// assert_eq!(vector.to_vec(), vec![1, 2, 3]);
    /// ```
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        let mut output = Vec::with_capacity(self.length);
        if let Some(root) = &self.root {
            range::flatten_node(root, index::shift_for(self.levels), &mut output);
        }
        output
    }

    // =========================================================================
    // Point Writes
    // =========================================================================

    /// Runs the write path for `position`, which must be at most `len`.
    fn write_at<W>(&self, position: usize, write: W) -> Self
    where
        W: FnOnce(Option<&T>) -> Option<T>,
    {
        match update::update_root(self.root.as_ref(), self.levels, position, write) {
            Some(root) => Self::from_root(Some(root), self.length.max(position + 1)),
            None => self.clone(),
        }
    }

    /// Resolves a position a point write may target: anything in `-len..=len`.
    const fn writable_position(&self, index: isize) -> Result<usize, VectorError> {
        match normalize(index, self.length) {
            Some(position) if position <= self.length => Ok(position),
            _ => Err(VectorError::out_of_range(index, self.length)),
        }
    }

    /// Returns a new vector with the element at `index` replaced.
    ///
    /// Only the nodes on the path to `index` are copied. Setting position
    /// `len` appends.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::OutOfRange`] if `index` is below `-len` or above `len`.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// let updated = vector.set(2, 100).unwrap();
    /// assert_eq!(updated.get(2), Some(&100));
    /// assert_eq!(vector.get(2), Some(&3)); // Original unchanged
    ///
    /// assert_eq!(vector.set(5, 6).unwrap().len(), 6);
    /// assert!(vector.set(6, 7).is_err());
    /// ```
    pub fn set(&self, index: isize, element: T) -> Result<Self, VectorError> {
        let position = self.writable_position(index)?;
        Ok(self.write_at(position, |_| Some(element)))
    }

    /// Like [`set`](Self::set), but returns a vector sharing the original
    /// root when the stored element already equals `element`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::OutOfRange`] if `index` is below `-len` or above `len`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// let same = vector.set_if_changed(0, 1).unwrap();
    /// assert_eq!(same, vector);
    /// ```
    pub fn set_if_changed(&self, index: isize, element: T) -> Result<Self, VectorError>
    where
        T: PartialEq,
    {
        let position = self.writable_position(index)?;
        Ok(self.write_at(position, |existing| {
            if existing == Some(&element) {
                None
            } else {
                Some(element)
            }
        }))
    }

    /// Returns a new vector with the element at `index` replaced by
    /// `function` applied to it.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::OutOfRange`] if no element is stored at `index`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// let updated = vector.update_with(-1, |x| x * 10).unwrap();
    /// assert_eq!(updated.last(), Some(&50));
    /// ```
    pub fn update_with<F>(&self, index: isize, function: F) -> Result<Self, VectorError>
    where
        F: FnOnce(&T) -> T,
    {
        let position = self
            .resolve(index)
            .ok_or(VectorError::out_of_range(index, self.length))?;
        Ok(self.write_at(position, |existing| existing.map(function)))
    }

    /// Returns a new vector with `element` appended at the end.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::new().add(1).add(2);
    /// assert_eq!(vector.len(), 2);
    /// assert_eq!(vector.get(1), Some(&2));
    /// ```
    #[must_use]
    pub fn add(&self, element: T) -> Self {
        self.write_at(self.length, |_| Some(element))
    }

    // =========================================================================
    // Suffix Replacement
    // =========================================================================

    /// Clones every element from `position` onward.
    fn suffix_from(&self, position: usize) -> Vec<T> {
        let mut output = Vec::with_capacity(self.length.saturating_sub(position));
        if let Some(root) = &self.root {
            range::flatten_suffix(root, index::shift_for(self.levels), position, &mut output);
        }
        output
    }

    /// Keeps the first `from` elements and continues with `suffix`.
    ///
    /// `from` must not exceed the length.
    fn replace_suffix(&self, from: usize, suffix: &[T]) -> Self {
        debug_assert!(from <= self.length);
        trace_event!(
            from,
            replaced = self.length - from,
            inserted = suffix.len(),
            "replacing suffix"
        );
        let root = match &self.root {
            Some(root) => suffix::replace_suffix(root, self.levels, from, suffix),
            None => suffix::build_root(suffix.iter().cloned()),
        };
        Self::from_root(root, from + suffix.len())
    }

    /// Places `items` before `position` (at most `len`), shifting the rest back.
    fn splice(&self, position: usize, mut items: Vec<T>) -> Self {
        items.extend(self.suffix_from(position));
        self.replace_suffix(position, &items)
    }

    /// Returns a new vector with `items` inserted before `index`.
    ///
    /// Inserting past the end pads the gap with `T::default()`; see
    /// [`insert_with`](Self::insert_with) to choose the padding.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::OutOfRange`] if `index` is below `-len`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=3).collect();
    /// let inserted = vector.insert(1, [10, 11]).unwrap();
    /// assert_eq!(inserted.to_vec(), vec![1, 10, 11, 2, 3]);
    ///
    /// let padded = vector.insert(5, [9]).unwrap();
    /// assert_eq!(padded.to_vec(), vec![1, 2, 3, 0, 0, 9]);
    /// ```
    pub fn insert<I>(&self, index: isize, items: I) -> Result<Self, VectorError>
    where
        I: IntoIterator<Item = T>,
        T: Default,
    {
        self.insert_with(index, items, T::default)
    }

    /// Returns a new vector with `items` inserted before `index`, filling any
    /// gap past the end with values produced by `padding`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::OutOfRange`] if `index` is below `-len`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::from_vec(vec!["a", "b"]);
    /// let padded = vector.insert_with(4, ["z"], || "-").unwrap();
    /// assert_eq!(padded.to_vec(), vec!["a", "b", "-", "-", "z"]);
    /// ```
    pub fn insert_with<I, F>(&self, index: isize, items: I, padding: F) -> Result<Self, VectorError>
    where
        I: IntoIterator<Item = T>,
        F: FnMut() -> T,
    {
        let position =
            normalize(index, self.length).ok_or(VectorError::out_of_range(index, self.length))?;
        let items: Vec<T> = items.into_iter().collect();

        if position <= self.length {
            if items.is_empty() {
                return Ok(self.clone());
            }
            return Ok(self.splice(position, items));
        }

        let mut suffix: Vec<T> = std::iter::repeat_with(padding)
            .take(position - self.length)
            .collect();
        suffix.extend(items);
        Ok(self.replace_suffix(self.length, &suffix))
    }

    /// Returns a new vector with `element` inserted at the front.
    ///
    /// # Complexity
    ///
    /// O(N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (2..=3).collect();
    /// assert_eq!(vector.push_front(1).to_vec(), vec![1, 2, 3]);
    /// ```
    #[must_use]
    pub fn push_front(&self, element: T) -> Self {
        self.splice(0, vec![element])
    }

    /// Returns a new vector without the element at `index`.
    ///
    /// Returns the vector unchanged when nothing is stored at `index`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// assert_eq!(vector.delete_at(1).to_vec(), vec![1, 3, 4, 5]);
    /// assert_eq!(vector.delete_at(-1).to_vec(), vec![1, 2, 3, 4]);
    /// assert_eq!(vector.delete_at(9), vector);
    /// ```
    #[must_use]
    pub fn delete_at(&self, index: isize) -> Self {
        let Some(position) = self.resolve(index) else {
            return self.clone();
        };
        let suffix = self.suffix_from(position + 1);
        self.replace_suffix(position, &suffix)
    }

    /// Returns a new vector without its last element.
    ///
    /// Returns the empty vector unchanged.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=3).collect();
    /// assert_eq!(vector.pop().to_vec(), vec![1, 2]);
    /// assert!(PersistentVector::<i32>::new().pop().is_empty());
    /// ```
    #[must_use]
    pub fn pop(&self) -> Self {
        if self.is_empty() {
            return self.clone();
        }
        self.replace_suffix(self.length - 1, &[])
    }

    /// Returns a new vector without its first element.
    ///
    /// # Complexity
    ///
    /// O(N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=3).collect();
    /// assert_eq!(vector.pop_front().to_vec(), vec![2, 3]);
    /// ```
    #[must_use]
    pub fn pop_front(&self) -> Self {
        self.delete_at(0)
    }

    /// Returns a new vector with the elements of `other` appended.
    ///
    /// The receiver's trie is shared up to its last partial path; only the
    /// elements of `other` are copied.
    ///
    /// # Complexity
    ///
    /// O(M + log32 N) where M is the length of `other`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let left: PersistentVector<i32> = (1..=3).collect();
    /// let right: PersistentVector<i32> = (4..=6).collect();
    /// assert_eq!(left.concat(&right).to_vec(), vec![1, 2, 3, 4, 5, 6]);
    /// assert_eq!((&left + &right).len(), 6);
    /// ```
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        self.replace_suffix(self.length, &other.to_vec())
    }

    /// Returns a new vector where `length` elements from `start` are `element`.
    ///
    /// Without a length the run extends to the end. A run reaching past the
    /// end grows the vector; a `start` past the end pads the gap with
    /// `T::default()` (see [`fill_with`](Self::fill_with)).
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::OutOfRange`] if `start` is below `-len`, and
    /// [`VectorError::InvalidArgument`] if `length` is negative.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// assert_eq!(vector.fill(0, 1, Some(2)).unwrap().to_vec(), vec![1, 0, 0, 4, 5]);
    /// assert_eq!(vector.fill(0, -2, None).unwrap().to_vec(), vec![1, 2, 3, 0, 0]);
    /// assert_eq!(vector.fill(9, 4, Some(3)).unwrap().to_vec(), vec![1, 2, 3, 4, 9, 9, 9]);
    /// ```
    pub fn fill(&self, element: T, start: isize, length: Option<isize>) -> Result<Self, VectorError>
    where
        T: Default,
    {
        self.fill_with(element, start, length, T::default)
    }

    /// Like [`fill`](Self::fill), filling any gap before `start` with values
    /// produced by `padding`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::OutOfRange`] if `start` is below `-len`, and
    /// [`VectorError::InvalidArgument`] if `length` is negative.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::from_vec(vec!['a']);
    /// let filled = vector.fill_with('x', 3, Some(1), || '.').unwrap();
    /// assert_eq!(filled.to_vec(), vec!['a', '.', '.', 'x']);
    /// ```
    pub fn fill_with<F>(
        &self,
        element: T,
        start: isize,
        length: Option<isize>,
        padding: F,
    ) -> Result<Self, VectorError>
    where
        F: FnMut() -> T,
    {
        let position =
            normalize(start, self.length).ok_or(VectorError::out_of_range(start, self.length))?;
        let count = match length {
            Some(count) if count < 0 => return Err(VectorError::negative_count("fill", count)),
            Some(count) => count.unsigned_abs(),
            None => self.length.saturating_sub(position),
        };

        if position <= self.length && count == 0 {
            return Ok(self.clone());
        }

        if position < self.length {
            let mut suffix = self.suffix_from(position);
            let overwritten = count.min(suffix.len());
            suffix[..overwritten].fill(element.clone());
            suffix.extend(std::iter::repeat_n(element, count - overwritten));
            return Ok(self.replace_suffix(position, &suffix));
        }

        let mut suffix: Vec<T> = std::iter::repeat_with(padding)
            .take(position - self.length)
            .collect();
        suffix.extend(std::iter::repeat_n(element, count));
        Ok(self.replace_suffix(self.length, &suffix))
    }

    // =========================================================================
    // Slicing
    // =========================================================================

    /// Extracts `length` elements starting at `from`, clamped to the end.
    fn subsequence(&self, from: usize, length: isize) -> Option<Self> {
        if from > self.length || length < 0 {
            return None;
        }
        let length = length.unsigned_abs().min(self.length - from);
        if length == 0 {
            return Some(Self::new());
        }
        if length == self.length {
            return Some(self.clone());
        }
        let root = self.root.as_ref()?;
        let mut output = Vec::with_capacity(length);
        range::flatten_range(
            root,
            index::shift_for(self.levels),
            from,
            from + length - 1,
            &mut output,
        );
        Some(Self::from_vec(output))
    }

    /// Returns the `length` elements starting at `from`.
    ///
    /// The run is clamped to the end of the vector. Returns `None` if `from`
    /// is outside `-len..=len` or `length` is negative.
    ///
    /// # Complexity
    ///
    /// O(length + log32 N); aligned subtrees are copied whole.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (0..10).collect();
    /// assert_eq!(vector.slice(2, 3).unwrap().to_vec(), vec![2, 3, 4]);
    /// assert_eq!(vector.slice(-2, 5).unwrap().to_vec(), vec![8, 9]);
    /// assert!(vector.slice(10, 1).unwrap().is_empty());
    /// assert!(vector.slice(11, 1).is_none());
    /// ```
    #[must_use]
    pub fn slice(&self, from: isize, length: isize) -> Option<Self> {
        self.subsequence(normalize(from, self.length)?, length)
    }

    /// Returns the elements covered by `range`.
    ///
    /// Negative bounds count from the end; the end is clamped to the length.
    /// Returns `None` if the start lies outside `-len..=len`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (0..10).collect();
    /// assert_eq!(vector.slice_range(2..5).unwrap().to_vec(), vec![2, 3, 4]);
    /// assert_eq!(vector.slice_range(-3..).unwrap().to_vec(), vec![7, 8, 9]);
    /// assert_eq!(vector.slice_range(..=1).unwrap().to_vec(), vec![0, 1]);
    /// assert!(vector.slice_range(5..2).unwrap().is_empty());
    /// ```
    #[must_use]
    pub fn slice_range<R>(&self, range: R) -> Option<Self>
    where
        R: RangeBounds<isize>,
    {
        let length = isize::try_from(self.length).unwrap_or(isize::MAX);
        let resolve = |bound: isize| {
            if bound < 0 {
                bound.saturating_add(length)
            } else {
                bound
            }
        };
        let from = match range.start_bound() {
            Bound::Included(&start) => resolve(start),
            Bound::Excluded(&start) => resolve(start).saturating_add(1),
            Bound::Unbounded => 0,
        };
        let to = match range.end_bound() {
            Bound::Included(&end) => resolve(end).saturating_add(1),
            Bound::Excluded(&end) => resolve(end),
            Bound::Unbounded => length,
        };
        if from < 0 {
            return None;
        }
        self.subsequence(from.unsigned_abs(), to.saturating_sub(from).max(0))
    }

    /// Returns the first `count` elements.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::InvalidArgument`] if `count` is negative.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// assert_eq!(vector.take(3).unwrap().to_vec(), vec![1, 2, 3]);
    /// assert_eq!(vector.take(10).unwrap(), vector);
    /// ```
    pub fn take(&self, count: isize) -> Result<Self, VectorError> {
        if count < 0 {
            return Err(VectorError::negative_count("take", count));
        }
        Ok(self.subsequence(0, count).unwrap_or_default())
    }

    /// Returns the vector without its first `count` elements.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::InvalidArgument`] if `count` is negative.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// assert_eq!(vector.drop_first(2).unwrap().to_vec(), vec![3, 4, 5]);
    /// assert!(vector.drop_first(5).unwrap().is_empty());
    /// assert!(vector.drop_first(-1).is_err());
    /// ```
    pub fn drop_first(&self, count: isize) -> Result<Self, VectorError> {
        if count < 0 {
            return Err(VectorError::negative_count("drop_first", count));
        }
        let count = count.unsigned_abs();
        if count == 0 {
            return Ok(self.clone());
        }
        if count >= self.length {
            return Ok(Self::new());
        }
        Ok(Self::from_vec(self.suffix_from(count)))
    }

    /// Returns the longest prefix whose elements all satisfy `predicate`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::from_vec(vec![1, 2, 5, 1]);
    /// assert_eq!(vector.take_while(|x| *x < 3).to_vec(), vec![1, 2]);
    /// ```
    #[must_use]
    pub fn take_while<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&T) -> bool,
    {
        let count = self.iter().take_while(|element| predicate(element)).count();
        isize::try_from(count)
            .ok()
            .and_then(|count| self.subsequence(0, count))
            .unwrap_or_default()
    }

    /// Returns the vector without its longest prefix satisfying `predicate`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::from_vec(vec![1, 2, 5, 1]);
    /// assert_eq!(vector.drop_while(|x| *x < 3).to_vec(), vec![5, 1]);
    /// ```
    #[must_use]
    pub fn drop_while<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&T) -> bool,
    {
        match self.iter().take_while(|element| predicate(element)).count() {
            0 => self.clone(),
            count => Self::from_vec(self.suffix_from(count)),
        }
    }

    // =========================================================================
    // Materializing Wrappers
    // =========================================================================

    /// Returns the vector repeated `times` times.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::InvalidArgument`] if `times` is negative.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::from_vec(vec![1, 2]);
    /// assert_eq!(vector.repeat(3).unwrap().to_vec(), vec![1, 2, 1, 2, 1, 2]);
    /// assert!(vector.repeat(0).unwrap().is_empty());
    /// ```
    pub fn repeat(&self, times: isize) -> Result<Self, VectorError> {
        match times {
            times if times < 0 => Err(VectorError::negative_count("repeat", times)),
            0 => Ok(Self::new()),
            1 => Ok(self.clone()),
            _ => Ok((0..times).flat_map(|_| self.iter().cloned()).collect()),
        }
    }

    /// Returns the elements in reverse order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=3).collect();
    /// assert_eq!(vector.reverse().to_vec(), vec![3, 2, 1]);
    /// ```
    #[must_use]
    pub fn reverse(&self) -> Self {
        self.iter().rev().cloned().collect()
    }

    /// Returns the elements rotated so the one at `count` comes first.
    ///
    /// A negative count rotates the other way.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=4).collect();
    /// assert_eq!(vector.rotate(1).to_vec(), vec![2, 3, 4, 1]);
    /// assert_eq!(vector.rotate(-1).to_vec(), vec![4, 1, 2, 3]);
    /// ```
    #[must_use]
    pub fn rotate(&self, count: isize) -> Self {
        let Ok(length) = isize::try_from(self.length) else {
            return self.clone();
        };
        if length == 0 {
            return self.clone();
        }
        match count.rem_euclid(length).unsigned_abs() {
            0 => self.clone(),
            shift => self
                .iter()
                .skip(shift)
                .chain(self.iter().take(shift))
                .cloned()
                .collect(),
        }
    }

    /// Returns the elements satisfying `predicate`, in order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitmapped_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=6).collect();
    /// assert_eq!(vector.filter(|x| x % 2 == 0).to_vec(), vec![2, 4, 6]);
    /// ```
    #[must_use]
    pub fn filter<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().filter(|element| predicate(element)).cloned().collect()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Clone for PersistentVector<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            length: self.length,
            levels: self.levels,
        }
    }
}

impl<T> Default for PersistentVector<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for PersistentVector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T> From<Vec<T>> for PersistentVector<T> {
    #[inline]
    fn from(elements: Vec<T>) -> Self {
        Self::from_vec(elements)
    }
}

impl<T: Clone> Add for &PersistentVector<T> {
    type Output = PersistentVector<T>;

    #[inline]
    fn add(self, other: Self) -> Self::Output {
        self.concat(other)
    }
}

/// Compares length first, then the tries node by node.
///
/// Subtrees shared between the two vectors are skipped without looking at
/// their elements, so comparing a vector with a lightly edited copy of itself
/// only visits the edited paths.
impl<T: PartialEq> PartialEq for PersistentVector<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.length != other.length {
            return false;
        }
        match (&self.root, &other.root) {
            (None, None) => true,
            (Some(left), Some(right)) if self.levels == other.levels => {
                Node::equals(left, right, self.levels)
            }
            _ => self.iter().eq(other.iter()),
        }
    }
}

impl<T: Eq> Eq for PersistentVector<T> {}

/// Lexicographic order, as for slices.
impl<T: PartialOrd> PartialOrd for PersistentVector<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord> Ord for PersistentVector<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

/// Computes a hash value for this vector.
///
/// The length is hashed first, then each element in order, so permutations
/// of the same elements hash differently and equal vectors hash equally.
///
/// # Examples
///
/// ```rust
/// use bitmapped_vector::persistent::PersistentVector;
/// use std::collections::HashMap;
///
/// let mut map: HashMap<PersistentVector<i32>, &str> = HashMap::new();
/// let key: PersistentVector<i32> = (1..=3).collect();
/// map.insert(key.clone(), "value");
/// assert_eq!(map.get(&key), Some(&"value"));
/// ```
impl<T: Hash> Hash for PersistentVector<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        self.for_each(|element| element.hash(state));
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentVector<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for PersistentVector<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "[")?;
        let mut first = true;
        for element in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "]")
    }
}

// =============================================================================
// Tests
// =============================================================================


// =============================================================================
// Thread Safety Tests (arc feature only)
// =============================================================================
