//! Stat-Segment Tokenizer
//!
//! Classifies statblock lines as stat lines or free text and flattens stat
//! lines into an ordered list of segments:
//!
//! ```text
//! Difficulty: 14 | Thresholds: 8/15 | HP: 8 | Stress: 3
//! ATK: +1 | Claws: Melee | 1d12+2 phy
//! ```
//!
//! becomes `["Difficulty: 14", "Thresholds: 8/15", "HP: 8", ...]`. The
//! segment readers below each recognize one keyword-anchored field.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

use super::dice_extractor::{parse_signed, DiceFormula};
use super::vocabulary::{DamageType, Range};

// ============================================================================
// Regex Patterns
// ============================================================================

/// Keyword anchors that mark a line as a stat line even without a pipe.
pub static STAT_KEYWORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:Diffi\s*culty|HP|Thresholds|Stress|ATK|Experiences?):")
        .expect("Failed to compile stat keyword regex")
});

pub static DIFFICULTY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Diffi\s*culty:\s*(\d+)").expect("Failed to compile difficulty regex"));

pub static THRESHOLDS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Thresholds:\s*(\d+)\s*/\s*(\d+)").expect("Failed to compile thresholds regex")
});

pub static HIT_POINTS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)HP:\s*(\d+)").expect("Failed to compile HP regex"));

pub static STRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Stress:\s*(\d+)").expect("Failed to compile stress regex"));

/// Attack bonus. Long dashes are tolerated here even though the normalizer
/// already folds them.
pub static ATTACK_BONUS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^ATK:\s*([+\-\u{2013}\u{2014}\u{2212}]?\s*\d+)").expect("Failed to compile ATK regex")
});

/// "Claws: Melee", "Longbow: Very Far".
pub static NAMED_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(.+):\s*(Very\s+Close|Close|Far|Melee|Very\s+Far)$")
        .expect("Failed to compile named range regex")
});

/// "1d12+2 phy", "d8 mag/phy", "2d6 + 3 physical".
pub static DAMAGE_DICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?P<count>\d+)?d(?P<faces>\d+)(?:\s*(?P<bonus>[+\-]\s*\d+))?\s+(?P<types>.+)$")
        .expect("Failed to compile dice damage regex")
});

/// Flat damage: "5 phy".
pub static DAMAGE_STATIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?P<amount>\d+)\s+(?P<types>.+)$").expect("Failed to compile static damage regex")
});

pub static EXPERIENCE_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^Experiences?:\s*").expect("Failed to compile experience regex"));

/// One experience item; the trailing signed integer anchors where the name ends.
pub static EXPERIENCE_ITEM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<name>.+?)\s+(?P<value>[+\-]?\d+)$").expect("Failed to compile experience item regex")
});

// ============================================================================
// Line Classification
// ============================================================================

/// Whether a line carries stats: any pipe, or one of the keyword anchors.
pub fn is_stat_line(line: &str) -> bool {
    line.contains('|') || STAT_KEYWORD_RE.is_match(line)
}

/// Trimmed, non-empty pipe-delimited segments of one stat line.
pub fn segments(line: &str) -> impl Iterator<Item = &str> {
    line.split('|').map(str::trim).filter(|s| !s.is_empty())
}

// ============================================================================
// Segment Readers
// ============================================================================

/// Damage value: rolled dice or a literal formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentDamage {
    Dice(DiceFormula),
    Flat(String),
}

/// A recognized damage segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageSegment {
    pub value: SegmentDamage,
    pub types: BTreeSet<DamageType>,
}

fn first_number(pattern: &Regex, segment: &str) -> Option<u32> {
    pattern.captures(segment)?.get(1)?.as_str().parse().ok()
}

pub fn read_difficulty(segment: &str) -> Option<u32> {
    first_number(&DIFFICULTY_RE, segment)
}

pub fn read_hit_points(segment: &str) -> Option<u32> {
    first_number(&HIT_POINTS_RE, segment)
}

pub fn read_stress(segment: &str) -> Option<u32> {
    first_number(&STRESS_RE, segment)
}

/// `(major, severe)`.
pub fn read_thresholds(segment: &str) -> Option<(u32, u32)> {
    let caps = THRESHOLDS_RE.captures(segment)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

pub fn read_attack_bonus(segment: &str) -> Option<i32> {
    let caps = ATTACK_BONUS_RE.captures(segment)?;
    let raw: String = caps[1]
        .chars()
        .map(|c| match c {
            '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
            other => other,
        })
        .collect();
    parse_signed(&raw)
}

/// Attack name and range. Segments mentioning "Diffi" or "Tier" are skipped.
pub fn read_named_range(segment: &str) -> Option<(String, Range)> {
    if segment.contains("Diffi") || segment.contains("Tier") {
        return None;
    }
    let caps = NAMED_RANGE_RE.captures(segment)?;
    let range = Range::from_words(&caps[2])?;
    Some((caps[1].trim().to_string(), range))
}

/// Damage types split on `/`; only recognized tokens are kept.
pub fn read_damage_types(words: &str) -> BTreeSet<DamageType> {
    words.split('/').filter_map(DamageType::from_token).collect()
}

/// Dice damage first, then flat damage. Not a damage segment unless at least
/// one damage type is recognized.
pub fn read_damage(segment: &str) -> Option<DamageSegment> {
    if let Some(caps) = DAMAGE_DICE_RE.captures(segment) {
        let types = read_damage_types(&caps["types"]);
        if types.is_empty() {
            return None;
        }
        let formula = DiceFormula::from_captures(&caps)?;
        return Some(DamageSegment {
            value: SegmentDamage::Dice(formula),
            types,
        });
    }

    let caps = DAMAGE_STATIC_RE.captures(segment)?;
    let types = read_damage_types(&caps["types"]);
    if types.is_empty() {
        return None;
    }
    Some(DamageSegment {
        value: SegmentDamage::Flat(caps["amount"].to_string()),
        types,
    })
}

/// `Experience: Tremor Sense +2, Keen Nose +1` into `(name, value)` pairs.
/// Items without a trailing signed integer are skipped.
pub fn read_experiences(segment: &str) -> Option<Vec<(String, i32)>> {
    let prefix = EXPERIENCE_PREFIX_RE.find(segment)?;
    let items = segment[prefix.end()..]
        .split(',')
        .map(str::trim)
        .filter_map(|item| {
            let caps = EXPERIENCE_ITEM_RE.captures(item)?;
            let value = parse_signed(&caps["value"])?;
            Some((caps["name"].trim().to_string(), value))
        })
        .collect();
    Some(items)
}

// ============================================================================
// Tests
// ============================================================================
