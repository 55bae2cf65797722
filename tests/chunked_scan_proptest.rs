//! Chunked scanning agrees with a naive whole-image search

mod common;

use common::FakeProcess;
use procmem::config::{Config, ScannerConfig};
use procmem::{MemoryEngine, MemoryError, Pattern, ScanDirective};
use proptest::prelude::*;

fn naive_find(haystack: &[u8], pattern: &[Option<u8>]) -> Option<usize> {
    if pattern.len() > haystack.len() {
        return None;
    }
    (0..=haystack.len() - pattern.len()).find(|&i| {
        pattern
            .iter()
            .enumerate()
            .all(|(j, p)| p.map_or(true, |b| haystack[i + j] == b))
    })
}

fn pattern_strategy() -> impl Strategy<Value = Vec<Option<u8>>> {
    // Small alphabet so matches actually happen
    prop::collection::vec(prop::option::weighted(0.8, 0u8..4), 1..8)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn chunked_scan_matches_naive(
        image in prop::collection::vec(0u8..4, 0..600),
        pattern in pattern_strategy(),
        chunk_size in 1usize..96,
        parallel in any::<bool>(),
    ) {
        let process = FakeProcess::new(image.clone());
        let engine = MemoryEngine::new(Config {
            scanner: ScannerConfig {
                chunk_size,
                parallel,
                ..ScannerConfig::default()
            },
            ..Config::default()
        });
        let compiled = Pattern::new(pattern.clone()).unwrap();

        let result = engine.find_pattern(&process, "game.exe", &compiled, ScanDirective::default());
        match naive_find(&image, &pattern) {
            Some(offset) => prop_assert_eq!(result, Ok(process.address(offset))),
            None => prop_assert_eq!(result, Err(MemoryError::PatternNotFound)),
        }
    }

    #[test]
    fn find_in_parallel_matches_find_in(
        haystack in prop::collection::vec(0u8..3, 0..2048),
        pattern in pattern_strategy(),
    ) {
        let compiled = Pattern::new(pattern).unwrap();
        prop_assert_eq!(compiled.find_in_parallel(&haystack), compiled.find_in(&haystack));
    }
}
