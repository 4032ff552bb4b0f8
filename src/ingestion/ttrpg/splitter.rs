//! Block Splitting Module
//!
//! Splits one pasted block of text into independent per-entity chunks.
//!
//! Two strategies, selected by [`SeparatorMode`]:
//!
//! - **Separator**: a line holding exactly `===` separates entities, for every kind.
//! - **Blank line** (heuristic, default): adversaries and environments are split
//!   on their `Tier N Type` header lines, each chunk starting on the name line
//!   just above its header; item kinds are split on runs of blank lines.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::vocabulary::EntityKind;

// ============================================================================
// Types
// ============================================================================

/// How a pasted batch is divided into entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeparatorMode {
    /// Tier headers for actors, blank lines for items.
    #[default]
    BlankLine,
    /// Explicit `===` lines.
    Separator,
}

impl fmt::Display for SeparatorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlankLine => f.write_str("blank-line"),
            Self::Separator => f.write_str("separator"),
        }
    }
}

impl FromStr for SeparatorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "blankline" | "blank" | "heuristic" => Ok(Self::BlankLine),
            "separator" | "===" => Ok(Self::Separator),
            _ => Err(format!(
                "unknown separator mode '{s}' (expected blank-line or separator)"
            )),
        }
    }
}

/// One entity's raw text as trimmed, non-empty lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatblockChunk {
    lines: Vec<String>,
}

impl StatblockChunk {
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The first line, conventionally the entity name.
    pub fn first_line(&self) -> Option<&str> {
        self.lines.first().map(String::as_str)
    }
}

// ============================================================================
// Regex Patterns
// ============================================================================

/// Adversary/environment header: "Tier 2 Bruiser", "Tier 1 Horde (5/HP)".
pub static TIER_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^Tier\s+\d+\s+\S+(?:\s*\(\d+/HP\))?$").expect("Failed to compile tier header regex")
});

/// A line holding exactly `===`.
pub static SEPARATOR_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*===[ \t]*$").expect("Failed to compile separator regex"));

/// One or more consecutive empty (or whitespace-only) lines.
pub static BLANK_LINE_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n(?:[ \t]*\n)+").expect("Failed to compile blank line regex"));

// ============================================================================
// Splitting
// ============================================================================

/// Split text into per-entity chunk texts.
///
/// Never returns an empty list: when nothing non-empty is detected the
/// original text comes back as the single chunk so the extractor can report
/// the empty block itself.
pub fn split(text: &str, mode: SeparatorMode, kind: EntityKind) -> Vec<String> {
    let chunks: Vec<String> = match mode {
        SeparatorMode::Separator => split_on(text, &SEPARATOR_LINE_RE),
        SeparatorMode::BlankLine if kind.is_actor() => split_on_tier_headers(text),
        SeparatorMode::BlankLine => split_on(text, &BLANK_LINE_RUN_RE),
    };

    let chunks: Vec<String> = chunks.into_iter().filter(|c| !c.is_empty()).collect();

    if chunks.is_empty() {
        vec![text.to_string()]
    } else {
        chunks
    }
}

fn split_on(text: &str, pattern: &Regex) -> Vec<String> {
    pattern
        .split(text)
        .map(|segment| segment.trim().to_string())
        .collect()
}

/// Indices of every tier header line.
pub fn tier_header_lines(lines: &[&str]) -> Vec<usize> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| TIER_HEADER_RE.is_match(line.trim()))
        .map(|(i, _)| i)
        .collect()
}

fn split_on_tier_headers(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    let headers = tier_header_lines(&lines);

    if headers.len() < 2 {
        return vec![text.trim().to_string()];
    }

    headers
        .iter()
        .enumerate()
        .map(|(i, &header)| {
            let start = header.saturating_sub(1);
            let end = headers
                .get(i + 1)
                .map(|&next| next.saturating_sub(1))
                .unwrap_or(lines.len());
            lines[start..end.max(start)].join("\n").trim().to_string()
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_ADVERSARIES: &str = "Acid Burrower\nTier 1 Solo\nA horse-sized insect.\nDifficulty: 14 | HP: 8\n\nBear\nTier 1 Bruiser\nA large bear.\nHP: 7";

    #[test]
    fn test_tier_header_pattern() {
        assert!(TIER_HEADER_RE.is_match("Tier 1 Solo"));
        assert!(TIER_HEADER_RE.is_match("tier 3 Horde (5/HP)"));
        assert!(TIER_HEADER_RE.is_match("Tier 2 Horde(3/HP)"));
        assert!(!TIER_HEADER_RE.is_match("Tier 1 adventurers travel far"));
        assert!(!TIER_HEADER_RE.is_match("Tier Solo"));
    }

    #[test]
    fn test_single_header_is_one_chunk() {
        let text = "Acid Burrower\nTier 1 Solo\nA horse-sized insect.";
        assert_eq!(split(text, SeparatorMode::BlankLine, EntityKind::Adversary), vec![text]);
    }

    #[test]
    fn test_split_on_tier_headers() {
        let chunks = split(TWO_ADVERSARIES, SeparatorMode::BlankLine, EntityKind::Adversary);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].starts_with("Acid Burrower\nTier 1 Solo"));
        assert!(chunks[0].ends_with("HP: 8"));
        assert!(chunks[1].starts_with("Bear\nTier 1 Bruiser"));
    }

    #[test]
    fn test_header_on_first_line_starts_at_header() {
        let text = "Tier 1 Solo\nfirst\nSecond\nTier 2 Leader\nsecond body";
        let chunks = split(text, SeparatorMode::BlankLine, EntityKind::Environment);
        assert_eq!(chunks, vec!["Tier 1 Solo\nfirst", "Second\nTier 2 Leader\nsecond body"]);
    }

    #[test]
    fn test_items_split_on_blank_lines() {
        let text = "Potion\nHeals you.\n\n \n\nRope\n50 feet long.";
        let chunks = split(text, SeparatorMode::BlankLine, EntityKind::Loot);
        assert_eq!(chunks, vec!["Potion\nHeals you.", "Rope\n50 feet long."]);
    }

    #[test]
    fn test_explicit_separator() {
        let text = "Acid Burrower\nTier 1 Solo\n===\nBear\nTier 1 Bruiser\n===\n";
        let chunks = split(text, SeparatorMode::Separator, EntityKind::Adversary);
        assert_eq!(chunks, vec!["Acid Burrower\nTier 1 Solo", "Bear\nTier 1 Bruiser"]);
    }

    #[test]
    fn test_separator_requires_exact_line() {
        let text = "Potion === of doom\nHeals.";
        let chunks = split(text, SeparatorMode::Separator, EntityKind::Consumable);
        assert_eq!(chunks, vec![text]);
    }

    #[test]
    fn test_never_empty() {
        assert_eq!(split("", SeparatorMode::Separator, EntityKind::Loot), vec![""]);
        assert_eq!(split("\n===\n", SeparatorMode::Separator, EntityKind::Loot), vec!["\n===\n"]);
    }

    #[test]
    fn test_separator_mode_from_str() {
        assert_eq!("blankLine".parse::<SeparatorMode>(), Ok(SeparatorMode::BlankLine));
        assert_eq!("blank-line".parse::<SeparatorMode>(), Ok(SeparatorMode::BlankLine));
        assert_eq!("separator".parse::<SeparatorMode>(), Ok(SeparatorMode::Separator));
        assert!("commas".parse::<SeparatorMode>().is_err());
    }

    #[test]
    fn test_chunk_lines() {
        let chunk = StatblockChunk::from_text("  Bear \n\n Tier 1 Bruiser\n");
        assert_eq!(chunk.lines(), ["Bear", "Tier 1 Bruiser"]);
        assert_eq!(chunk.first_line(), Some("Bear"));
        assert!(StatblockChunk::from_text(" \n ").is_empty());
    }
}
