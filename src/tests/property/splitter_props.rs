//! Property-based tests for the block splitter
//!
//! Tests invariants:
//! - The chunk list is never empty
//! - Separator and blank-line modes yield one chunk per block
//! - Tier headers yield one chunk per actor, each starting on its name line

use proptest::prelude::*;

use crate::ingestion::ttrpg::splitter::{split, SeparatorMode};
use crate::ingestion::ttrpg::vocabulary::EntityKind;

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

fn arb_kind() -> impl Strategy<Value = EntityKind> {
    prop::sample::select(EntityKind::ALL.to_vec())
}

fn arb_mode() -> impl Strategy<Value = SeparatorMode> {
    prop_oneof![Just(SeparatorMode::BlankLine), Just(SeparatorMode::Separator)]
}

/// One item block: a few lines of plain words, no blank lines inside.
fn arb_item_block() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z]{2,8}( [a-z]{2,8}){0,3}", 1..4).prop_map(|lines| lines.join("\n"))
}

/// One actor block: name line, tier header, lower-case body lines.
fn arb_actor_block() -> impl Strategy<Value = (String, String)> {
    (
        "[A-Z][a-z]{2,10}",
        1u32..5,
        prop::sample::select(vec!["Solo", "Bruiser", "Minion", "Horde (3/HP)", "Exploration"]),
        prop::collection::vec("[a-z]{3,8} [a-z]{3,8}", 0..4),
    )
        .prop_map(|(name, tier, subtype, body)| {
            let mut lines = vec![name.clone(), format!("Tier {tier} {subtype}")];
            lines.extend(body);
            (name, lines.join("\n"))
        })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn split_never_returns_empty(text in any::<String>(), mode in arb_mode(), kind in arb_kind()) {
        prop_assert!(!split(&text, mode, kind).is_empty(), "no chunks for {:?}", text);
    }

    #[test]
    fn separator_mode_counts_blocks(
        blocks in prop::collection::vec(arb_item_block(), 1..6),
        kind in arb_kind(),
    ) {
        let text = blocks.join("\n===\n");
        let chunks = split(&text, SeparatorMode::Separator, kind);
        prop_assert_eq!(chunks, blocks);
    }

    #[test]
    fn blank_lines_split_items(blocks in prop::collection::vec(arb_item_block(), 1..6)) {
        let text = blocks.join("\n\n\n");
        let chunks = split(&text, SeparatorMode::BlankLine, EntityKind::Loot);
        prop_assert_eq!(chunks, blocks);
    }

    #[test]
    fn tier_headers_split_actors(actors in prop::collection::vec(arb_actor_block(), 1..6)) {
        let text = actors.iter().map(|(_, block)| block.as_str()).collect::<Vec<_>>().join("\n\n");
        let chunks = split(&text, SeparatorMode::BlankLine, EntityKind::Adversary);

        prop_assert_eq!(chunks.len(), actors.len());
        for (chunk, (name, block)) in chunks.iter().zip(&actors) {
            let expected = format!("{name}\n");
            prop_assert!(chunk.starts_with(&expected), "chunk {:?} does not start with {:?}", chunk, name);
            prop_assert_eq!(chunk, block);
        }
    }
}
