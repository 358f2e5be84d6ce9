//! IAI-Callgrind benchmark for PersistentVector operations.
//!
//! Measures instruction counts for construction, access, update, suffix
//! replacement and iteration.
//!
//! # Data Sizes
//!
//! - **get_sequential / set**: 100, 1000, 10000 (multi-size for regression detection)
//! - **from_vec**: 1000, 100000
//! - **add / iter / insert / delete_at**: 1000 (single size)
//!
//! # Design Notes
//!
//! - **Setup functions**: `#[bench::with_setup]` keeps the cost of building the
//!   input out of the measurement.

use bitmapped_vector::persistent::PersistentVector;
use iai_callgrind::{library_benchmark, library_benchmark_group, main};
use std::hint::black_box;

fn setup_vector_100() -> PersistentVector<i32> {
    (0..100).collect()
}

fn setup_vector_1000() -> PersistentVector<i32> {
    (0..1000).collect()
}

fn setup_vector_10000() -> PersistentVector<i32> {
    (0..10000).collect()
}

fn setup_vec_1000() -> Vec<i32> {
    (0..1000).collect()
}

fn setup_vec_100000() -> Vec<i32> {
    (0..100_000).collect()
}

fn sum_sequential(vector: &PersistentVector<i32>, size: isize) -> i32 {
    let mut sum = 0;
    for index in 0..size {
        if let Some(&value) = vector.get(black_box(index)) {
            sum += value;
        }
    }
    sum
}

fn set_every_seventh(vector: PersistentVector<i32>, size: isize) -> PersistentVector<i32> {
    let mut vector = vector;
    for index in (0..size).step_by(7) {
        if let Ok(updated) = vector.set(black_box(index), -1) {
            vector = updated;
        }
    }
    vector
}

#[library_benchmark]
fn add_1000() -> PersistentVector<i32> {
    let mut vector = PersistentVector::new();
    for index in 0..1000 {
        vector = vector.add(black_box(index));
    }
    black_box(vector)
}

#[library_benchmark]
#[bench::with_setup(setup_vector_100())]
fn get_sequential_100(vector: PersistentVector<i32>) -> i32 {
    black_box(sum_sequential(&black_box(vector), 100))
}

#[library_benchmark]
#[bench::with_setup(setup_vector_1000())]
fn get_sequential_1000(vector: PersistentVector<i32>) -> i32 {
    black_box(sum_sequential(&black_box(vector), 1000))
}

#[library_benchmark]
#[bench::with_setup(setup_vector_10000())]
fn get_sequential_10000(vector: PersistentVector<i32>) -> i32 {
    black_box(sum_sequential(&black_box(vector), 10000))
}

#[library_benchmark]
#[bench::with_setup(setup_vector_100())]
fn set_100(vector: PersistentVector<i32>) -> PersistentVector<i32> {
    black_box(set_every_seventh(black_box(vector), 100))
}

#[library_benchmark]
#[bench::with_setup(setup_vector_1000())]
fn set_1000(vector: PersistentVector<i32>) -> PersistentVector<i32> {
    black_box(set_every_seventh(black_box(vector), 1000))
}

#[library_benchmark]
#[bench::with_setup(setup_vector_10000())]
fn set_10000(vector: PersistentVector<i32>) -> PersistentVector<i32> {
    black_box(set_every_seventh(black_box(vector), 10000))
}

#[library_benchmark]
#[bench::with_setup(setup_vector_1000())]
fn insert_middle_1000(vector: PersistentVector<i32>) -> PersistentVector<i32> {
    let vector = black_box(vector);
    black_box(vector.insert(black_box(500), [1, 2, 3]).unwrap_or_default())
}

#[library_benchmark]
#[bench::with_setup(setup_vector_1000())]
fn delete_at_middle_1000(vector: PersistentVector<i32>) -> PersistentVector<i32> {
    let vector = black_box(vector);
    black_box(vector.delete_at(black_box(500)))
}

#[library_benchmark]
#[bench::with_setup(setup_vector_1000())]
fn iter_1000(vector: PersistentVector<i32>) -> i32 {
    let vector = black_box(vector);
    black_box(vector.iter().sum())
}

#[library_benchmark]
#[bench::with_setup(setup_vec_1000())]
fn from_vec_1000(elements: Vec<i32>) -> PersistentVector<i32> {
    black_box(PersistentVector::from_vec(black_box(elements)))
}

#[library_benchmark]
#[bench::with_setup(setup_vec_100000())]
fn from_vec_100000(elements: Vec<i32>) -> PersistentVector<i32> {
    black_box(PersistentVector::from_vec(black_box(elements)))
}

library_benchmark_group!(
    name = persistent_vector_group;
    benchmarks =
        add_1000,
        get_sequential_100, get_sequential_1000, get_sequential_10000,
        set_100, set_1000, set_10000,
        insert_middle_1000, delete_at_middle_1000,
        iter_1000,
        from_vec_1000, from_vec_100000
);

main!(library_benchmark_groups = persistent_vector_group);
