//! Property-based tests for PersistentVector laws.
//!
//! Every property compares the vector against a plain `Vec` model and checks
//! that the trie height stays minimal after arbitrary edits.

use bitmapped_vector::persistent::PersistentVector;
use proptest::prelude::*;

/// The smallest height whose address space fits `length` elements.
fn minimal_levels(length: usize) -> usize {
    let mut levels = 0;
    let mut capacity = 32_usize;
    while length > capacity {
        levels += 1;
        capacity = capacity.saturating_mul(32);
    }
    levels
}

fn position(length: usize, seed: usize) -> isize {
    isize::try_from(seed % length.max(1)).unwrap()
}

#[derive(Debug, Clone)]
enum Edit {
    Add(i32),
    Set(usize, i32),
    Insert(usize, Vec<i32>),
    Delete(usize),
    Pop,
    Concat(Vec<i32>),
    Take(usize),
    Drop(usize),
    Fill(usize, usize, i32),
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        any::<i32>().prop_map(Edit::Add),
        (any::<usize>(), any::<i32>()).prop_map(|(seed, value)| Edit::Set(seed, value)),
        (any::<usize>(), prop::collection::vec(any::<i32>(), 0..70))
            .prop_map(|(seed, items)| Edit::Insert(seed, items)),
        any::<usize>().prop_map(Edit::Delete),
        Just(Edit::Pop),
        prop::collection::vec(any::<i32>(), 0..1100).prop_map(Edit::Concat),
        any::<usize>().prop_map(Edit::Take),
        any::<usize>().prop_map(Edit::Drop),
        (any::<usize>(), 0..80_usize, any::<i32>())
            .prop_map(|(seed, length, value)| Edit::Fill(seed, length, value)),
    ]
}

fn apply(vector: &PersistentVector<i32>, model: &mut Vec<i32>, edit: &Edit) -> PersistentVector<i32> {
    let length = model.len();
    match edit {
        Edit::Add(value) => {
            model.push(*value);
            vector.add(*value)
        }
        Edit::Set(seed, value) => {
            if length == 0 {
                return vector.clone();
            }
            let index = position(length, *seed);
            model[index.unsigned_abs()] = *value;
            vector.set(index, *value).unwrap()
        }
        Edit::Insert(seed, items) => {
            let index = position(length + 1, *seed);
            let at = index.unsigned_abs();
            model.splice(at..at, items.iter().copied());
            vector.insert(index, items.iter().copied()).unwrap()
        }
        Edit::Delete(seed) => {
            if length == 0 {
                return vector.delete_at(0);
            }
            let index = position(length, *seed);
            model.remove(index.unsigned_abs());
            vector.delete_at(index)
        }
        Edit::Pop => {
            model.pop();
            vector.pop()
        }
        Edit::Concat(items) => {
            model.extend(items);
            vector.concat(&items.iter().copied().collect())
        }
        Edit::Take(seed) => {
            let count = position(length + 1, *seed);
            model.truncate(count.unsigned_abs());
            vector.take(count).unwrap()
        }
        Edit::Drop(seed) => {
            let count = position(length + 1, *seed);
            model.drain(..count.unsigned_abs());
            vector.drop_first(count).unwrap()
        }
        Edit::Fill(seed, run, value) => {
            let start = position(length + 1, *seed);
            let from = start.unsigned_abs();
            let end = from + run;
            if end > model.len() {
                model.resize(end, 0);
            }
            model[from..end].fill(*value);
            vector
                .fill(*value, start, Some(isize::try_from(*run).unwrap()))
                .unwrap()
        }
    }
}

// =============================================================================
// Point Update Laws
// =============================================================================

proptest! {
    /// Get-Set Law: a set element is read back
    #[test]
    fn prop_get_set_law(
        elements in prop::collection::vec(any::<i32>(), 1..2000),
        seed in any::<usize>(),
        value in any::<i32>()
    ) {
        let vector: PersistentVector<i32> = elements.iter().copied().collect();
        let index = position(elements.len(), seed);
        let updated = vector.set(index, value).unwrap();
        prop_assert_eq!(updated.get(index), Some(&value));
    }

    /// Set-Other Law: a set leaves every other position alone
    #[test]
    fn prop_set_other_law(
        elements in prop::collection::vec(any::<i32>(), 1..2000),
        seed in any::<usize>(),
        value in any::<i32>()
    ) {
        let vector: PersistentVector<i32> = elements.iter().copied().collect();
        let index = position(elements.len(), seed);
        let updated = vector.set(index, value).unwrap();
        for (other, element) in elements.iter().enumerate() {
            if other != index.unsigned_abs() {
                prop_assert_eq!(updated.get(isize::try_from(other).unwrap()), Some(element));
            }
        }
    }

    /// Append Law: add grows the length by one and stores the element last
    #[test]
    fn prop_add_law(
        elements in prop::collection::vec(any::<i32>(), 0..2000),
        value in any::<i32>()
    ) {
        let vector: PersistentVector<i32> = elements.iter().copied().collect();
        let appended = vector.add(value);
        prop_assert_eq!(appended.len(), vector.len() + 1);
        prop_assert_eq!(appended.get(isize::try_from(vector.len()).unwrap()), Some(&value));
        prop_assert_eq!(appended.levels(), minimal_levels(appended.len()));
    }
}

// =============================================================================
// Splicing Laws
// =============================================================================

proptest! {
    /// Insert-Delete Law: deleting what was just inserted restores the vector
    #[test]
    fn prop_insert_delete_inverse(
        elements in prop::collection::vec(any::<i32>(), 0..1200),
        seed in any::<usize>(),
        value in any::<i32>()
    ) {
        let vector: PersistentVector<i32> = elements.iter().copied().collect();
        let index = position(elements.len() + 1, seed);
        let inserted = vector.insert(index, [value]).unwrap();
        prop_assert_eq!(inserted.get(index), Some(&value));
        prop_assert_eq!(inserted.delete_at(index), vector);
    }

    /// Slice Law: a slice equals the same range of the flattened vector
    #[test]
    fn prop_slice_matches_model(
        elements in prop::collection::vec(any::<i32>(), 0..2100),
        first in any::<usize>(),
        second in any::<usize>()
    ) {
        let vector: PersistentVector<i32> = elements.iter().copied().collect();
        let from = first % (elements.len() + 1);
        let to = from + second % (elements.len() - from + 1);
        let sliced = vector
            .slice(isize::try_from(from).unwrap(), isize::try_from(to - from).unwrap())
            .unwrap();
        prop_assert_eq!(sliced.to_vec(), elements[from..to].to_vec());
        prop_assert_eq!(sliced.levels(), minimal_levels(sliced.len()));
    }

    /// Concatenation Associativity Law
    #[test]
    fn prop_concat_associativity(
        first in prop::collection::vec(any::<i32>(), 0..100),
        second in prop::collection::vec(any::<i32>(), 0..1100),
        third in prop::collection::vec(any::<i32>(), 0..100)
    ) {
        let first: PersistentVector<i32> = first.into_iter().collect();
        let second: PersistentVector<i32> = second.into_iter().collect();
        let third: PersistentVector<i32> = third.into_iter().collect();

        let left = first.concat(&second).concat(&third);
        let right = first.concat(&second.concat(&third));
        prop_assert_eq!(left, right);
    }

    /// Reverse Involution Law
    #[test]
    fn prop_reverse_involution(elements in prop::collection::vec(any::<i32>(), 0..500)) {
        let vector: PersistentVector<i32> = elements.into_iter().collect();
        prop_assert_eq!(vector.reverse().reverse(), vector);
    }
}

// =============================================================================
// Edit Sequences
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Random edit sequences agree with a `Vec` model, never change earlier
    /// versions, and always leave the trie at its minimal height.
    #[test]
    fn prop_edit_sequences_match_model(
        initial in prop::collection::vec(any::<i32>(), 0..1500),
        edits in prop::collection::vec(edit_strategy(), 1..25)
    ) {
        let mut model = initial.clone();
        let mut vector: PersistentVector<i32> = initial.into_iter().collect();

        for edit in &edits {
            let snapshot = model.clone();
            let next = apply(&vector, &mut model, edit);

            prop_assert_eq!(vector.to_vec(), snapshot, "edit {:?} changed the original", edit);
            prop_assert_eq!(next.to_vec(), model.clone(), "edit {:?} diverged", edit);
            prop_assert_eq!(next.len(), model.len());
            prop_assert_eq!(next.levels(), minimal_levels(next.len()), "edit {:?} left extra levels", edit);
            if next.is_empty() {
                prop_assert_eq!(&next, &PersistentVector::EMPTY);
            }
            vector = next;
        }
    }

    /// Reverse traversal yields forward traversal backwards
    #[test]
    fn prop_traversal_orders_agree(elements in prop::collection::vec(any::<i32>(), 0..3000)) {
        let vector: PersistentVector<i32> = elements.iter().copied().collect();
        let mut forward = Vec::new();
        vector.for_each(|element| forward.push(*element));
        let mut backward: Vec<i32> = vector.iter().rev().copied().collect();
        backward.reverse();
        prop_assert_eq!(&forward, &elements);
        prop_assert_eq!(backward, elements);
    }
}
