//! Signature scanning against an in-memory target

mod common;

use common::{FakeProcess, IMAGE_BASE};
use pretty_assertions::assert_eq;
use procmem::config::{Config, ScannerConfig};
use procmem::{Address, MemoryEngine, MemoryError, Pattern, ScanDirective, ScanMode};

fn engine_with_chunk(chunk_size: usize) -> MemoryEngine {
    MemoryEngine::new(Config {
        scanner: ScannerConfig {
            chunk_size,
            ..ScannerConfig::default()
        },
        ..Config::default()
    })
}

/// `mov rax, [rip+0x1234]` at offset 0x200, pointer slot at offset 0x300
fn game_image() -> Vec<u8> {
    let mut image = vec![0xCCu8; 0x1000];
    image[0x200..0x207].copy_from_slice(&[0x48, 0x8B, 0x05, 0x34, 0x12, 0x00, 0x00]);
    let pointer = (IMAGE_BASE + 0x800).to_ne_bytes();
    image[0x300..0x300 + pointer.len()].copy_from_slice(&pointer);
    image[0x2F0..0x2F4].copy_from_slice(&[0xDE, 0xC0, 0xAD, 0xDE]);
    image
}

#[test]
fn test_normal_mode() {
    let process = FakeProcess::new(game_image());
    let pattern = Pattern::parse("48 8B 05 ?? ?? ?? ??").unwrap();

    let address = engine_with_chunk(0x100)
        .find_pattern(&process, "game.exe", &pattern, ScanDirective::normal(3, 0))
        .unwrap();
    assert_eq!(address, process.address(0x203));
}

#[test]
fn test_read_mode_dereferences_pointer() {
    let process = FakeProcess::new(game_image());
    let pattern = Pattern::parse("DE C0 AD DE").unwrap();

    // Match at 0x2F0; the pointer slot sits 0x10 bytes further
    let address = engine_with_chunk(0x40)
        .find_pattern(&process, "game.exe", &pattern, ScanDirective::read(0x10, 8))
        .unwrap();
    assert_eq!(address, Address::new(IMAGE_BASE + 0x808));
}

#[test]
fn test_subtract_mode() {
    let process = FakeProcess::new(game_image());
    let pattern = Pattern::parse("DE C0 AD DE").unwrap();

    let address = engine_with_chunk(0x40)
        .find_pattern(&process, "game.exe", &pattern, ScanDirective::subtract(4, 0x2F4))
        .unwrap();
    assert_eq!(address, Address::new(IMAGE_BASE));
}

#[test]
fn test_mode_from_numeric_code() {
    let directive = ScanDirective::new(0, 0, ScanMode::try_from(1u8).unwrap());
    assert_eq!(directive, ScanDirective::read(0, 0));
}

#[test]
fn test_chunk_size_does_not_change_result() {
    let process = FakeProcess::new(game_image());
    let pattern = Pattern::parse("48 8B 05 34 12").unwrap();

    let expected = process.address(0x200);
    for chunk in [1, 2, 3, 7, 16, 0x1FF, 0x200, 0x201, 0x1000, 0x10000] {
        let found = engine_with_chunk(chunk)
            .find_pattern(&process, "game.exe", &pattern, ScanDirective::default())
            .unwrap();
        assert_eq!(found, expected, "chunk size {}", chunk);
    }
}

#[test]
fn test_missing_pattern() {
    let process = FakeProcess::new(game_image());
    let pattern = Pattern::parse("0F 0B 0F 0B").unwrap();

    assert_eq!(
        engine_with_chunk(0x100).find_pattern(&process, "game.exe", &pattern, ScanDirective::default()),
        Err(MemoryError::PatternNotFound)
    );
}

#[test]
fn test_empty_module_reads_nothing() {
    let process = FakeProcess::new(game_image());
    let pattern = Pattern::exact(&[0xCC]).unwrap();

    assert_eq!(
        MemoryEngine::default().find_pattern(&process, "empty.dll", &pattern, ScanDirective::default()),
        Err(MemoryError::PatternNotFound)
    );
    assert_eq!(process.reads(), 0);
}

#[test]
fn test_unknown_module() {
    let process = FakeProcess::new(game_image());
    let pattern = Pattern::exact(&[0xCC]).unwrap();

    assert_eq!(
        MemoryEngine::default().find_pattern(&process, "GAME.EXE", &pattern, ScanDirective::default()),
        if cfg!(windows) {
            Ok(process.address(0))
        } else {
            Err(MemoryError::ModuleNotFound("GAME.EXE".to_string()))
        }
    );
}

#[test]
fn test_faulting_chunk_fails_scan() {
    let process = FakeProcess::new(game_image()).faulting(0x100..0x180);
    let pattern = Pattern::parse("48 8B 05").unwrap();

    let result = engine_with_chunk(0x80).find_pattern(&process, "game.exe", &pattern, ScanDirective::default());
    assert!(matches!(result, Err(MemoryError::ReadFailed { .. })));
}

#[test]
fn test_faulting_chunk_skipped_when_configured() {
    let process = FakeProcess::new(game_image()).faulting(0x100..0x180);
    let pattern = Pattern::parse("48 8B 05").unwrap();
    let engine = MemoryEngine::new(Config {
        scanner: ScannerConfig {
            chunk_size: 0x80,
            skip_unreadable: true,
            ..ScannerConfig::default()
        },
        ..Config::default()
    });

    assert_eq!(
        engine.find_pattern(&process, "game.exe", &pattern, ScanDirective::default()),
        Ok(process.address(0x200))
    );
}

#[test]
fn test_scan_range_subrange() {
    let process = FakeProcess::new(game_image());
    let pattern = Pattern::exact(&[0xCC, 0xCC]).unwrap();

    let found = MemoryEngine::default()
        .scan_range(&process, process.address(0x207), 0x20, &pattern)
        .unwrap();
    assert_eq!(found, process.address(0x207));
}

#[test]
fn test_subtract_underflow() {
    let process = FakeProcess::new(game_image());
    let pattern = Pattern::parse("48 8B 05").unwrap();

    let result = MemoryEngine::default().find_pattern(
        &process,
        "game.exe",
        &pattern,
        ScanDirective::subtract(0, usize::MAX),
    );
    assert!(matches!(result, Err(MemoryError::InvalidArgument(_))));
}

#[test]
fn test_all_wildcards_match_module_base() {
    let process = FakeProcess::new(game_image());
    let pattern = Pattern::parse("?? ?? ??").unwrap();

    let address = engine_with_chunk(0x100)
        .find_pattern(&process, "game.exe", &pattern, ScanDirective::default())
        .unwrap();
    assert_eq!(address, Address::new(IMAGE_BASE));
}

#[test]
fn test_pattern_as_long_as_module() {
    let process = FakeProcess::new(vec![0x90, 0xE8, 0x00, 0xC3]);
    let engine = engine_with_chunk(2);

    for text in ["90 E8 00 C3", "?? ?? ?? ??", "90 ?? ?? C3"] {
        let pattern = Pattern::parse(text).unwrap();
        let address = engine
            .find_pattern(&process, "game.exe", &pattern, ScanDirective::default())
            .unwrap();
        assert_eq!(address, process.address(0));
    }

    let longer = Pattern::parse("90 E8 00 C3 ??").unwrap();
    let result = engine.find_pattern(&process, "game.exe", &longer, ScanDirective::default());
    assert_eq!(result, Err(MemoryError::PatternNotFound));
}
