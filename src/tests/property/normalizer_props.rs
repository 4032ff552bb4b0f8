//! Property-based tests for the text normalizer
//!
//! Tests invariants:
//! - normalize(normalize(x)) == normalize(x)
//! - Output holds no CR, tab, long dash or repeated space
//! - Output carries no leading or trailing whitespace

use proptest::prelude::*;

use crate::ingestion::ttrpg::normalizer::normalize;

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

/// Statblock-like text salted with the characters PDF copies leave behind.
fn arb_pasted_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            "[A-Za-z0-9:|+/()]{1,8}".prop_map(|s| s),
            Just(" ".to_string()),
            Just("\t".to_string()),
            Just("\r\n".to_string()),
            Just("\r".to_string()),
            Just("\n".to_string()),
            Just("\u{00A0}".to_string()),
            Just("\u{2003}".to_string()),
            Just("\u{200B}".to_string()),
            Just("\u{FEFF}".to_string()),
            Just("\u{2013}".to_string()),
            Just("\u{2014}".to_string()),
            Just("\u{2212}".to_string()),
        ],
        0..40,
    )
    .prop_map(|parts| parts.concat())
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn normalize_is_idempotent(text in any::<String>()) {
        let once = normalize(&text);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn normalize_pasted_text_is_idempotent(text in arb_pasted_text()) {
        let once = normalize(&text);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn normalized_text_is_canonical(text in arb_pasted_text()) {
        let out = normalize(&text);
        prop_assert!(!out.contains('\r'), "carriage return left in output");
        prop_assert!(!out.contains('\t'), "tab left in output");
        prop_assert!(!out.contains("  "), "double space in {:?}", out);
        prop_assert!(
            !out.contains(['\u{2013}', '\u{2014}', '\u{2212}', '\u{00A0}']),
            "long dash or no-break space in {:?}",
            out
        );
        prop_assert_eq!(out.trim(), out.as_str());
    }

    #[test]
    fn ascii_words_survive(words in prop::collection::vec("[A-Za-z0-9]{1,10}", 1..10)) {
        let text = words.join(" \u{00A0}\t");
        prop_assert_eq!(normalize(&text), words.join(" "));
    }
}
