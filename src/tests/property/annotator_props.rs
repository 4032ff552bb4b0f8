//! Property-based tests for dice wrapping and action detection
//!
//! Tests invariants:
//! - Wrapping is idempotent, so markers are never nested
//! - Exactly one roll marker per dice expression
//! - Unwrapping restores the original text
//! - Damage actions carry the formulas found in the prose

use proptest::prelude::*;

use crate::ingestion::ttrpg::annotator::annotate;
use crate::ingestion::ttrpg::dice_extractor::{find_dice, unwrap_dice, wrap_dice, DiceFormula, ROLL_MARKER_RE};
use crate::ingestion::ttrpg::entity::ActionDescriptor;

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

fn arb_formula() -> impl Strategy<Value = DiceFormula> {
    (
        1u32..6,
        prop::sample::select(vec![4u32, 6, 8, 10, 12, 20]),
        prop::option::of(1i32..10),
    )
        .prop_map(|(count, faces, bonus)| DiceFormula::new(count, faces, bonus))
}

/// Prose with dice expressions between plain words.
fn arb_prose() -> impl Strategy<Value = (String, Vec<DiceFormula>)> {
    prop::collection::vec(("[a-z]{2,8}( [a-z]{2,8}){0,3}", arb_formula()), 0..5).prop_map(|parts| {
        let text = parts
            .iter()
            .map(|(words, formula)| format!("{words} {formula}"))
            .collect::<Vec<_>>()
            .join(" and ");
        let formulas = parts.into_iter().map(|(_, f)| f).collect();
        (text, formulas)
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn wrap_is_idempotent((text, _) in arb_prose()) {
        let once = wrap_dice(&text);
        prop_assert_eq!(wrap_dice(&once), once);
    }

    #[test]
    fn one_marker_per_formula((text, formulas) in arb_prose()) {
        let wrapped = wrap_dice(&text);
        prop_assert_eq!(ROLL_MARKER_RE.find_iter(&wrapped).count(), formulas.len());
        prop_assert!(!wrapped.contains("[[/r [[/r"), "nested marker in {:?}", wrapped);
        prop_assert_eq!(find_dice(&wrapped), formulas);
    }

    #[test]
    fn unwrap_restores_text((text, _) in arb_prose()) {
        prop_assert_eq!(unwrap_dice(&wrap_dice(&text)), text);
    }

    #[test]
    fn annotation_is_stable((text, _) in arb_prose()) {
        let first = annotate(&text);
        let second = annotate(&first.description);
        prop_assert_eq!(&second.description, &first.description);
        prop_assert_eq!(second.actions, first.actions);
    }

    #[test]
    fn damage_actions_follow_formulas((text, formulas) in arb_prose()) {
        let annotated = annotate(&format!("{text} damage"));
        let damage: Vec<DiceFormula> = annotated
            .actions
            .iter()
            .filter_map(|a| match a {
                ActionDescriptor::Damage { formula, .. } => Some(*formula),
                _ => None,
            })
            .collect();
        prop_assert_eq!(damage, formulas);
    }
}
