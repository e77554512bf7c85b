//! Demonstrates the wrappers and attribute macros of `profmem` working together.
//!
//! Run with: `cargo run --example profmem_basic`.
#![expect(
    clippy::arithmetic_side_effects,
    reason = "this is example code that does not need production-level safety"
)]

use std::collections::HashMap;

use profmem::{SortKey, memory_usage, profile_scope, profile_with_memory_usage};

#[profmem::profiled]
fn tokenize(line: &str) -> Vec<String> {
    line.split_whitespace()
        .map(|word| word.to_lowercase())
        .collect()
}

fn count_words(lines: &[&str]) -> HashMap<String, usize> {
    let _scope = profile_scope!();

    let mut counts = HashMap::new();

    for line in lines {
        for word in tokenize(line) {
            *counts.entry(word).or_insert(0_usize) += 1;
        }
    }

    counts
}

#[profmem::profile_with_memory_usage(sort_key = "calls")]
fn most_common(lines: &[&str]) -> Option<(String, usize)> {
    count_words(lines)
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
}

fn build_table(size: u64) -> Vec<u64> {
    (0..size).map(|n| n.wrapping_mul(31)).collect()
}

fn main() {
    let lines = [
        "the quick brown fox",
        "jumps over the lazy dog",
        "The end",
    ];

    println!("=== Attribute macro ===");
    println!();
    let common = most_common(&lines);
    println!("Most common word: {common:?}");
    println!();

    println!("=== Wrapped closure, sorted by standard name ===");
    println!();
    let counted = profile_with_memory_usage(SortKey::StdName)
        .wrap(|| count_words(&lines).len())
        .name("distinct words");
    println!("Distinct words: {}", counted.call(()));
    println!();

    println!("=== Memory usage ===");
    println!();
    let size: u64 = 4 * 1024 * 1024;
    let table = memory_usage(build_table).call((size,));
    println!("Table entries: {}", table.len());
}
