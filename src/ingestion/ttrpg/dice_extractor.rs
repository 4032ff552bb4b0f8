//! Dice Expression Extraction Module
//!
//! Finds dice notation (`1d8+2`, `2d10`) in statblock prose and wraps each
//! occurrence in the host's inline roll marker (`[[/r 1d8+2]]`) so it renders
//! as a clickable roll.
//!
//! # Example
//!
//! ```ignore
//! use crate::ingestion::ttrpg::dice_extractor::wrap_dice;
//!
//! let wrapped = wrap_dice("deals 1d8 + 2 damage");
//! assert_eq!(wrapped, "deals [[/r 1d8+2]] damage");
//! ```

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Types
// ============================================================================

/// A parsed dice formula (e.g., `1d10+3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiceFormula {
    /// Number of dice rolled (1 in "d8" and "1d8")
    pub count: u32,
    /// Faces per die
    pub faces: u32,
    /// Flat modifier added to the roll, if printed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus: Option<i32>,
}

impl DiceFormula {
    pub fn new(count: u32, faces: u32, bonus: Option<i32>) -> Self {
        Self {
            count,
            faces,
            bonus,
        }
    }

    /// Parse a complete dice formula. The die count may be omitted (`d8+3`)
    /// and spaces are allowed around the modifier sign.
    pub fn parse(expr: &str) -> Option<Self> {
        let caps = DICE_FORMULA_RE.captures(expr.trim())?;
        Self::from_captures(&caps)
    }

    /// Build from captures named `count`, `faces`, and optionally `sign` + `bonus`
    /// (or a single `bonus` group carrying its own sign).
    pub(crate) fn from_captures(caps: &Captures<'_>) -> Option<Self> {
        let count = match caps.name("count") {
            Some(m) => m.as_str().parse().ok()?,
            None => 1,
        };
        let faces = caps.name("faces")?.as_str().parse().ok()?;

        let bonus = match (caps.name("sign"), caps.name("bonus")) {
            (Some(sign), Some(value)) => {
                let value: i32 = value.as_str().parse().ok()?;
                Some(if sign.as_str() == "-" { -value } else { value })
            }
            (None, Some(value)) => parse_signed(value.as_str()),
            _ => None,
        };

        Some(Self::new(count, faces, bonus))
    }

    /// Die part only (`d10`), the host's `dice` field.
    pub fn die(&self) -> String {
        format!("d{}", self.faces)
    }
}

impl fmt::Display for DiceFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.faces)?;
        match self.bonus {
            Some(b) if b > 0 => write!(f, "+{b}"),
            Some(b) if b < 0 => write!(f, "{b}"),
            _ => Ok(()),
        }
    }
}

/// Parse a signed integer that may carry spaces after its sign (`+ 3`, `-2`).
pub fn parse_signed(text: &str) -> Option<i32> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    compact.strip_prefix('+').unwrap_or(&compact).parse().ok()
}

// ============================================================================
// Regex Patterns
// ============================================================================

/// Inline roll marker the host renders as a clickable roll.
pub const ROLL_MARKER_PREFIX: &str = "[[/r ";
pub const ROLL_MARKER_SUFFIX: &str = "]]";

/// A whole-string dice formula, count optional: "d8+3", "1d10 + 3", "2d6".
pub static DICE_FORMULA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)
        ^(?P<count>\d+)?
        d(?P<faces>\d+)
        (?:\s*(?P<sign>[+\-])\s*(?P<bonus>\d+))?
        $",
    )
    .expect("Failed to compile dice formula regex")
});

/// Dice with a flat modifier inside prose: "1d8+2", "2d6 - 1".
pub static DICE_WITH_MODIFIER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?P<count>\d+)d(?P<faces>\d+)\s*(?P<sign>[+\-])\s*(?P<bonus>\d+)\b")
        .expect("Failed to compile modified dice regex")
});

/// Bare dice inside prose: "2d10".
pub static BARE_DICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?P<count>\d+)d(?P<faces>\d+)\b").expect("Failed to compile bare dice regex")
});

/// Any dice expression, modifier preferred when present.
pub static DICE_ROLL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?P<count>\d+)d(?P<faces>\d+)\b(?:\s*(?P<sign>[+\-])\s*(?P<bonus>\d+)\b)?",
    )
    .expect("Failed to compile dice roll regex")
});

/// An existing roll marker: "[[/r 1d8+2]]".
pub static ROLL_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\[/r\s+(?P<formula>[^\]]*)\]\]").expect("Failed to compile roll marker regex")
});

// ============================================================================
// Wrapping
// ============================================================================

/// Wrap every dice expression in a roll marker.
///
/// Modified dice are wrapped before bare dice, and text already inside a
/// marker is never touched, so `wrap_dice(wrap_dice(x)) == wrap_dice(x)`.
pub fn wrap_dice(text: &str) -> String {
    let once = replace_outside_markers(text, &DICE_WITH_MODIFIER_RE);
    replace_outside_markers(&once, &BARE_DICE_RE)
}

fn replace_outside_markers(text: &str, pattern: &Regex) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut last = 0;

    for marker in ROLL_MARKER_RE.find_iter(text) {
        out.push_str(&wrap_span(&text[last..marker.start()], pattern));
        out.push_str(marker.as_str());
        last = marker.end();
    }
    out.push_str(&wrap_span(&text[last..], pattern));
    out
}

fn wrap_span(span: &str, pattern: &Regex) -> String {
    pattern
        .replace_all(span, |caps: &Captures<'_>| match DiceFormula::from_captures(caps) {
            Some(formula) => format!("{ROLL_MARKER_PREFIX}{formula}{ROLL_MARKER_SUFFIX}"),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Every dice expression in the text, wrapped or not, in order.
pub fn find_dice(text: &str) -> Vec<DiceFormula> {
    DICE_ROLL_RE
        .captures_iter(text)
        .filter_map(|caps| DiceFormula::from_captures(&caps))
        .collect()
}

/// Replace roll markers with their bare formula.
pub fn unwrap_dice(text: &str) -> String {
    ROLL_MARKER_RE.replace_all(text, "$formula").into_owned()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formula() {
        assert_eq!(DiceFormula::parse("1d10+3"), Some(DiceFormula::new(1, 10, Some(3))));
        assert_eq!(DiceFormula::parse("d8"), Some(DiceFormula::new(1, 8, None)));
        assert_eq!(DiceFormula::parse("2d6 - 1"), Some(DiceFormula::new(2, 6, Some(-1))));
        assert_eq!(DiceFormula::parse("2d6 phy"), None);
        assert_eq!(DiceFormula::parse("twelve"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(DiceFormula::new(1, 10, Some(3)).to_string(), "1d10+3");
        assert_eq!(DiceFormula::new(2, 4, Some(-2)).to_string(), "2d4-2");
        assert_eq!(DiceFormula::new(3, 6, None).to_string(), "3d6");
        assert_eq!(DiceFormula::new(3, 6, Some(0)).to_string(), "3d6");
        assert_eq!(DiceFormula::new(3, 6, None).die(), "d6");
    }

    #[test]
    fn test_wrap_modified_dice_once() {
        let wrapped = wrap_dice("deals 1d8+2 damage");
        assert_eq!(wrapped, "deals [[/r 1d8+2]] damage");
        assert_eq!(wrapped.matches("[[/r").count(), 1);
    }

    #[test]
    fn test_wrap_bare_dice_without_modifier() {
        assert_eq!(wrap_dice("roll 2d10 and weep"), "roll [[/r 2d10]] and weep");
        assert_eq!(wrap_dice("2d10 + extra"), "[[/r 2d10]] + extra");
    }

    #[test]
    fn test_wrap_spaced_modifier() {
        assert_eq!(wrap_dice("take 3d6 + 4 fire"), "take [[/r 3d6+4]] fire");
        assert_eq!(wrap_dice("take 1d4 -1"), "take [[/r 1d4-1]]");
    }

    #[test]
    fn test_wrap_is_idempotent() {
        let once = wrap_dice("1d8+2 then 2d10 then 1d4");
        assert_eq!(wrap_dice(&once), once);
        assert_eq!(once, "[[/r 1d8+2]] then [[/r 2d10]] then [[/r 1d4]]");
    }

    #[test]
    fn test_no_dice_inside_words() {
        assert_eq!(wrap_dice("model x2d6y"), "model x2d6y");
        assert_eq!(wrap_dice("d8 alone"), "d8 alone");
    }

    #[test]
    fn test_find_dice_wrapped_and_bare() {
        let found = find_dice("[[/r 1d8+2]] and 2d6");
        assert_eq!(
            found,
            vec![DiceFormula::new(1, 8, Some(2)), DiceFormula::new(2, 6, None)]
        );
    }

    #[test]
    fn test_unwrap_dice() {
        assert_eq!(unwrap_dice("deals [[/r 1d8+2]] damage"), "deals 1d8+2 damage");
    }

    #[test]
    fn test_parse_signed() {
        assert_eq!(parse_signed("+ 3"), Some(3));
        assert_eq!(parse_signed("-2"), Some(-2));
        assert_eq!(parse_signed("4"), Some(4));
        assert_eq!(parse_signed("x"), None);
    }
}
