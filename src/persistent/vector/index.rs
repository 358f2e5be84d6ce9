//! Index codec.
//!
//! Converts a logical index into per-level slot numbers. A trie whose root sits
//! at level `levels` descends with a bit shift of `levels * BITS_PER_LEVEL`; the
//! slot at each level is `(index >> shift) & MASK`.

/// Branching factor (2^5 = 32)
pub(super) const BRANCHING_FACTOR: usize = 32;

/// Bits per level in the trie
pub(super) const BITS_PER_LEVEL: usize = 5;

/// Bit mask for extracting index within a node
pub(super) const MASK: usize = BRANCHING_FACTOR - 1;

/// Returns the slot owning `index` in a node whose children are addressed with `shift`.
#[inline]
pub(super) const fn slot(index: usize, shift: usize) -> usize {
    (index >> shift) & MASK
}

/// Returns the bit shift used at the root of a trie of the given height.
#[inline]
pub(super) const fn shift_for(levels: usize) -> usize {
    levels * BITS_PER_LEVEL
}

/// Number of elements covered by one child of a node addressed with `shift`.
///
/// Saturates at `usize::MAX` for shifts past the width of `usize`.
#[inline]
pub(super) const fn child_span(shift: usize) -> usize {
    if shift < usize::BITS as usize {
        1 << shift
    } else {
        usize::MAX
    }
}

/// Low-bit mask selecting the offset of an index inside one child subtree.
#[inline]
pub(super) const fn subtree_mask(shift: usize) -> usize {
    let span = child_span(shift);
    if span == usize::MAX { usize::MAX } else { span - 1 }
}

/// Number of indices addressable by a trie of the given height: `32^(levels + 1)`.
#[inline]
pub(super) const fn capacity(levels: usize) -> usize {
    child_span(shift_for(levels + 1))
}

/// Resolves a possibly negative position against `length`.
///
/// Negative positions count from the end. Returns `None` when the position is
/// still negative after adding `length`; no upper bound is applied.
#[inline]
pub(super) const fn normalize(index: isize, length: usize) -> Option<usize> {
    if index >= 0 {
        Some(index.unsigned_abs())
    } else if index.unsigned_abs() <= length {
        Some(length - index.unsigned_abs())
    } else {
        None
    }
}

/// The slots visited on the way from the root down to the leaf owning an index.
///
/// Yields `levels + 1` slots: one per internal level, then the leaf slot.
#[derive(Debug, Clone)]
pub(super) struct SlotPath {
    index: usize,
    shift: usize,
    exhausted: bool,
}

impl SlotPath {
    pub(super) const fn new(index: usize, levels: usize) -> Self {
        Self {
            index,
            shift: shift_for(levels),
            exhausted: false,
        }
    }
}

impl Iterator for SlotPath {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let current = slot(self.index, self.shift);
        if self.shift == 0 {
            self.exhausted = true;
        } else {
            self.shift -= BITS_PER_LEVEL;
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.exhausted {
            0
        } else {
            self.shift / BITS_PER_LEVEL + 1
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SlotPath {}
