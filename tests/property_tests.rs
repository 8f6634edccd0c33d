//! Property-based tests for block normalization
//!
//! These tests use proptest to verify invariants across many randomly
//! generated blocks, catching indentation edge cases that hand-written tests might miss.

use blockdoc::{BlockText, normalize};
use blockdoc_core::normalize_block;
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// Code text without slashes, so the only markers are the ones we place.
fn code_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9 ().=:]{0,12}"
}

/// A visible line: indentation plus code, or a blank line.
fn visible_line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => (0usize..9, code_strategy()).prop_map(|(indent, code)| format!("{}{}", " ".repeat(indent), code)),
        1 => (0usize..4).prop_map(|indent| " ".repeat(indent)),
    ]
}

/// A hidden line: indentation, the marker, optional spacing, code.
fn hidden_line_strategy() -> impl Strategy<Value = String> {
    (0usize..9, 0usize..3, code_strategy())
        .prop_map(|(indent, gap, code)| format!("{}//{}{}", " ".repeat(indent), " ".repeat(gap), code))
}

fn block_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop_oneof![3 => visible_line_strategy(), 1 => hidden_line_strategy()],
        0..12,
    )
}

// =============================================================================
// Normalization Properties
// =============================================================================

proptest! {
    /// Property: without hidden lines, both renderings agree
    #[test]
    fn no_hidden_lines_renderings_agree(lines in prop::collection::vec(visible_line_strategy(), 0..12)) {
        let rendering = normalize(&BlockText::new(lines, 1));
        prop_assert_eq!(rendering.executable, rendering.visible);
    }

    /// Property: the executable rendering has exactly one line per input line
    #[test]
    fn executable_keeps_line_count(lines in block_strategy()) {
        let block = BlockText::new(lines.clone(), 1);
        let rendering = normalize(&block);

        prop_assert_eq!(normalize_block(&block).lines().len(), lines.len());
        if !lines.is_empty() {
            prop_assert_eq!(rendering.executable.split('\n').count(), lines.len());
        }
    }

    /// Property: visible lines are the non-hidden executable lines, in order, possibly dedented further
    #[test]
    fn visible_is_ordered_subset_of_executable(lines in block_strategy()) {
        let block = BlockText::new(lines, 1);
        let normalized = normalize_block(&block);
        let rendering = normalize(&block);

        let shown: Vec<&str> = normalized
            .lines()
            .iter()
            .filter(|l| !l.hidden)
            .map(|l| l.text.as_str())
            .collect();
        if !shown.is_empty() {
            let visible: Vec<&str> = rendering.visible.split('\n').collect();
            prop_assert_eq!(visible.len(), shown.len());
            for (vis, exec) in visible.iter().zip(&shown) {
                prop_assert!(exec.ends_with(vis), "{:?} is not a dedent of {:?}", vis, exec);
            }
        } else {
            prop_assert_eq!(rendering.visible, "");
        }
    }

    /// Property: normalizing the visible rendering again changes nothing
    #[test]
    fn visible_rendering_is_idempotent(lines in block_strategy()) {
        let visible = normalize(&BlockText::new(lines, 1)).visible;
        let again = normalize(&BlockText::from_text(&visible, 1)).visible;
        prop_assert_eq!(again, visible);
    }

    /// Property: all-hidden blocks show nothing but still run something
    #[test]
    fn all_hidden_blocks_have_empty_visible(lines in prop::collection::vec(hidden_line_strategy(), 1..8)) {
        let rendering = normalize(&BlockText::new(lines, 1));
        prop_assert_eq!(rendering.visible, "");
        prop_assert!(!rendering.executable.is_empty());
    }
}
