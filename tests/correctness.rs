mod common;

use common::{random_keys, verify_permutation, verify_sorted};
use parasort::ParallelSorter;

fn sort_and_verify(n: usize) {
    sort_and_verify_data(random_keys(n, n as u64));
}

fn sort_and_verify_data(data: Vec<u32>) {
    let n = data.len();
    let mut expected = data.clone();
    expected.sort();

    let mut actual = data;
    let mut sorter = ParallelSorter::new();
    sorter.sort_u32(&mut actual).unwrap();

    assert!(verify_sorted(&actual));
    assert!(verify_permutation(&expected, &actual));
    assert_eq!(
        actual,
        expected,
        "Sort mismatch at n={}. First diff at index {}",
        n,
        actual
            .iter()
            .zip(expected.iter())
            .position(|(a, b)| a != b)
            .unwrap_or(n)
    );
}

// Size tests
#[test] fn test_sort_1k()   { sort_and_verify(1_000); }
#[test] fn test_sort_4k()   { sort_and_verify(4_000); }
#[test] fn test_sort_16k()  { sort_and_verify(16_000); }
#[test] fn test_sort_64k()  { sort_and_verify(64_000); }
#[test] fn test_sort_256k() { sort_and_verify(256_000); }
#[test] fn test_sort_1m()   { sort_and_verify(1_000_000); }
#[test] fn test_sort_2m()   { sort_and_verify(2_073_600); } // 1920x1080

// Edge cases
#[test]
fn test_empty() {
    let mut data: Vec<u32> = vec![];
    let mut sorter = ParallelSorter::new();
    sorter.sort_u32(&mut data).unwrap();
    assert!(data.is_empty());
}

#[test]
fn test_single() {
    let mut data = vec![42u32];
    let mut sorter = ParallelSorter::new();
    sorter.sort_u32(&mut data).unwrap();
    assert_eq!(data, vec![42]);
}

#[test]
fn test_all_zeros() {
    sort_and_verify_data(vec![0u32; 100_000]);
}

#[test]
fn test_all_same() {
    sort_and_verify_data(vec![0xDEADBEEFu32; 100_000]);
}

#[test]
fn test_pre_sorted() {
    sort_and_verify_data((0..1_000_000u32).collect());
}

#[test]
fn test_reverse_sorted() {
    sort_and_verify_data((0..1_000_000u32).rev().collect());
}

#[test]
fn test_extreme_values() {
    sort_and_verify_data(vec![u32::MAX, 0, u32::MAX, 1, 0, u32::MAX - 1]);
}

#[test]
fn test_non_block_aligned() {
    sort_and_verify(385); // one block + 1
    sort_and_verify(384 * 7 + 1);
}

#[test]
fn test_sub_block() {
    sort_and_verify(100);
}

#[test]
fn test_idempotent_on_sorted_input() {
    let mut data = random_keys(50_000, 7);
    let mut sorter = ParallelSorter::new();
    sorter.sort_u32(&mut data).unwrap();
    let first = data.clone();
    sorter.sort_u32(&mut data).unwrap();
    assert_eq!(data, first);
}

// Group budget variations: correctness must not depend on parallelism.
#[test]
fn test_group_budget_one() {
    let mut data = random_keys(100_000, 11);
    let mut expected = data.clone();
    expected.sort();
    let mut sorter = ParallelSorter::with_max_groups(1);
    sorter.sort_u32(&mut data).unwrap();
    assert_eq!(data, expected);
}

#[test]
fn test_group_budget_sweep() {
    let data = random_keys(38_500, 3);
    let mut expected = data.clone();
    expected.sort();
    for groups in [2, 3, 5, 16, 100, 800, 4096] {
        let mut actual = data.clone();
        let mut sorter = ParallelSorter::with_max_groups(groups);
        sorter.sort_u32(&mut actual).unwrap();
        assert_eq!(actual, expected, "group budget {groups}");
    }
}

// Buffer reuse
#[test]
fn test_buffer_reuse() {
    let mut sorter = ParallelSorter::new();

    let mut data1 = random_keys(1_000_000, 21);
    let mut expected1 = data1.clone();
    expected1.sort();
    sorter.sort_u32(&mut data1).unwrap();
    assert_eq!(data1, expected1);

    // Sort again (reuse buffers)
    let mut data2 = random_keys(1_000_000, 22);
    let mut expected2 = data2.clone();
    expected2.sort();
    sorter.sort_u32(&mut data2).unwrap();
    assert_eq!(data2, expected2);

    // Sort smaller (reuse larger buffers)
    let mut data3 = random_keys(100_000, 23);
    let mut expected3 = data3.clone();
    expected3.sort();
    sorter.sort_u32(&mut data3).unwrap();
    assert_eq!(data3, expected3);
}
