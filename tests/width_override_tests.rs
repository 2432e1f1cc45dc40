//! Tests for binding the host width slot to cluster-aware measurement.
//!
//! Every test that installs an override holds `slot_lock()` for its whole
//! body, since the slot is process-wide.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cellshape::console::Console;
use cellshape::host::{self, UnicodeWidth, WidthStrategy};
use cellshape::width_override::INSTALLED_BINDING_NAME;
use cellshape::{
    CellshapeError, Direction, WidthMapperRegistry, install, install_with, is_installed,
    register_width_mapper, shape_text, uninstall,
};
use common::{GridShaper, NoFonts, RejectingShaper, measurer, measurer_with, slot_lock};

const ASCII_SAMPLES: &[&str] = &["", "Hello", "a b c", "tab\there", "~!@#$%^&*()"];

#[test]
fn test_ascii_fast_path_matches_pristine() {
    let _guard = slot_lock();
    // Wildly wrong advances: only reachable if ASCII were shaped
    let shaper = Arc::new(GridShaper::new(100, 100));
    install_with(measurer(shaper.clone(), Arc::default()));

    for text in ASCII_SAMPLES {
        assert_eq!(host::cell_len(text), UnicodeWidth.cell_len(text), "{text:?}");
    }
    assert_eq!(shaper.calls(), 0);

    uninstall();
}

#[test]
fn test_install_uninstall_round_trip() {
    let _guard = slot_lock();
    let before = host::current();
    assert!(Arc::ptr_eq(&before, &host::pristine()));
    assert!(!is_installed());

    install_with(measurer(Arc::new(GridShaper::new(8, 12)), Arc::default()));
    assert!(is_installed());
    assert_eq!(host::current().name(), INSTALLED_BINDING_NAME);

    uninstall();
    assert!(!is_installed());
    assert!(Arc::ptr_eq(&host::current(), &before));

    // Uninstalling again is harmless
    uninstall();
    assert!(Arc::ptr_eq(&host::current(), &before));
}

#[test]
fn test_reinstall_keeps_original_binding() {
    let _guard = slot_lock();
    let before = host::current();

    install_with(measurer(Arc::new(GridShaper::new(8, 12)), Arc::default()));
    install_with(measurer(Arc::new(GridShaper::new(8, 24)), Arc::default()));
    // The second measurer is the active one
    assert_eq!(host::cell_len("తె"), 6);

    uninstall();
    assert!(Arc::ptr_eq(&host::current(), &before));
}

#[test]
fn test_global_install_is_idempotent() {
    let _guard = slot_lock();
    let before = host::current();

    install().unwrap();
    let first = host::current();
    install().unwrap();
    assert!(Arc::ptr_eq(&host::current(), &first));
    assert_eq!(host::cell_len("Hello"), 5);

    uninstall();
    assert!(Arc::ptr_eq(&host::current(), &before));
}

#[test]
fn test_non_ascii_uses_cluster_advances() {
    let _guard = slot_lock();
    install_with(measurer(Arc::new(GridShaper::new(8, 12)), Arc::default()));

    // Six codepoints at 12px = 72px = 9 cells of 8px
    assert_eq!(host::cell_len("తెలుగు"), 9);
    // 6 ASCII * 8 + 1 * 12 = 60px = 8 cells
    assert_eq!(host::cell_len("hello é"), 8);

    uninstall();
}

#[test]
fn test_fixed_mapper_wins_until_earlier_mapper_overrides() {
    let _guard = slot_lock();
    let registry = Arc::new(WidthMapperRegistry::new());
    install_with(measurer(
        Arc::new(GridShaper::new(8, 12)),
        Arc::clone(&registry),
    ));

    let earlier_active = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&earlier_active);
    registry
        .register("earlier", move |_: &str, _: usize| {
            flag.load(Ordering::SeqCst).then_some(7)
        })
        .unwrap();
    registry
        .register("fixed", |_: &str, _: usize| Some(42))
        .unwrap();

    for text in ["తెలుగు", "हिन्दी", "مرحبا", "日本語"] {
        assert_eq!(host::cell_len(text), 42, "{text}");
    }

    // Re-registering keeps "earlier" ahead of "fixed"
    earlier_active.store(true, Ordering::SeqCst);
    let flag = Arc::clone(&earlier_active);
    registry
        .register("earlier", move |_: &str, _: usize| {
            flag.load(Ordering::SeqCst).then_some(7)
        })
        .unwrap();
    assert_eq!(host::cell_len("తెలుగు"), 7);

    uninstall();
}

#[test]
fn test_shaping_failure_falls_back_to_char_count() {
    let _guard = slot_lock();
    install_with(measurer(Arc::new(RejectingShaper), Arc::default()));

    assert_eq!(host::cell_len("తెలుగు"), 6);
    assert_eq!(host::cell_len("Hello"), 5);

    uninstall();
}

#[test]
fn test_missing_fonts_fall_back_to_char_count() {
    let _guard = slot_lock();
    install_with(measurer_with(
        Arc::new(NoFonts),
        Arc::new(GridShaper::new(8, 12)),
        Arc::default(),
    ));

    assert_eq!(host::cell_len("مرحبا"), 5);

    uninstall();
}

#[test]
fn test_console_follows_installed_override() {
    let _guard = slot_lock();
    let console = Console::new(Vec::new()).with_improve_display(false);
    let plain = console.cell_len("తెలుగు");

    install_with(measurer(Arc::new(GridShaper::new(8, 12)), Arc::default()));
    assert_eq!(console.cell_len("తెలుగు"), 9);
    assert_ne!(plain, 9);

    uninstall();
    assert_eq!(console.cell_len("తెలుగు"), plain);
}

#[test]
fn test_concurrent_readers_see_consistent_widths() {
    let _guard = slot_lock();
    let shaper = Arc::new(GridShaper::new(8, 12));
    install_with(measurer(shaper.clone(), Arc::default()));

    let samples = ["తెలుగు", "हिन्दी", "مرحبا", "தமிழ்", "Hello"];
    let expected: Vec<usize> = samples.iter().map(|s| host::cell_len(s)).collect();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let expected = expected.clone();
            std::thread::spawn(move || {
                for _ in 0..200 {
                    for (text, want) in samples.iter().zip(&expected) {
                        assert_eq!(host::cell_len(text), *want);
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Only the first pass shaped anything; the rest hit the width cache
    assert_eq!(shaper.calls(), 4);

    uninstall();
}

#[test]
fn test_global_register_rejects_empty_name() {
    assert!(matches!(
        register_width_mapper("", |_: &str, _: usize| Some(1)),
        Err(CellshapeError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_shape_text_empty_input_for_every_combination() {
    for direction in [Direction::Ltr, Direction::Rtl] {
        for script in [None, Some("latn"), Some("arab"), Some("telu")] {
            for language in ["en", "ar", "te"] {
                let clusters = shape_text("", direction, script, language).unwrap();
                assert!(clusters.is_empty());
            }
        }
    }
}
