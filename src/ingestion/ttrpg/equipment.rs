//! Weapon and Armor Parsing
//!
//! Equipment is pasted one table row per entity:
//!
//! ```text
//! Tier 1 Broadsword Agility Melee d8 phy One-Handed Reliable: +1 to attack rolls
//! Gambeson Armor 5/11 3 Flexible: +1 to Evasion
//! ```
//!
//! The header line has no keywords, so it is matched against a fixed anchor
//! sequence; whatever precedes the anchors is the name and whatever follows is
//! the feature clause. Lines after the header are description.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::annotator::annotate_equipment;
use super::dice_extractor::DiceFormula;
use super::entity::{
    ArmorSystem, DamagePart, DamageThresholds, DamageValue, ParsedEntity, SystemData, WeaponSystem,
};
use super::error::ParseError;
use super::splitter::StatblockChunk;
use super::stat_line::read_damage_types;
use super::vocabulary::{Burden, CharacterTrait, EntityKind, Range};

/// Token order reported when a weapon header does not match.
pub const WEAPON_EXPECTED: &str =
    "[Tier N] Name Trait Range Dice DamageType One-Handed|Two-Handed [Feature]";

/// Token order reported when an armor header does not match.
pub const ARMOR_EXPECTED: &str = "[Tier N] Name Major/Severe BaseScore [Feature]";

// ============================================================================
// Regex Patterns
// ============================================================================

pub static WEAPON_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)
        ^(?:Tier\s+(?P<tier>\d+)\s+)?
        (?P<name>.+?)\s+
        (?P<trait>Agility|Strength|Finesse|Instinct|Presence|Knowledge)\s+
        (?P<range>Melee|Very\s+Close|Close|Very\s+Far|Far)\s+
        (?P<count>\d+)?d(?P<faces>\d+)(?:\s*(?P<bonus>[+\-]\s*\d+))?\s+
        (?P<types>(?:physical|phy|magical|mag)(?:\s*/\s*(?:physical|phy|magical|mag))*)\s+
        (?P<burden>One[-\s]Handed|Two[-\s]Handed)
        (?:\s+(?P<feature>.*))?
        $",
    )
    .expect("Failed to compile weapon header regex")
});

pub static ARMOR_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)
        ^(?:Tier\s+(?P<tier>\d+)\s+)?
        (?P<name>.+?)\s+
        (?P<major>\d+)\s*/\s*(?P<severe>\d+)\s+
        (?P<base>\d+)\b
        (?:\s*(?P<feature>.*))?
        $",
    )
    .expect("Failed to compile armor header regex")
});

// ============================================================================
// Parsing
// ============================================================================

struct Header<'c> {
    caps: Captures<'c>,
    description: String,
}

impl<'c> Header<'c> {
    fn matched(
        chunk: &'c StatblockChunk,
        pattern: &Regex,
        kind: EntityKind,
        expected: &str,
    ) -> Result<Self, ParseError> {
        let (first, rest) = chunk.lines().split_first().ok_or(ParseError::EmptyChunk)?;
        let caps = pattern.captures(first).ok_or_else(|| ParseError::MissingAnchor {
            kind,
            expected: expected.to_string(),
        })?;
        Ok(Self {
            caps,
            description: rest.join(" "),
        })
    }

    fn name(&self) -> String {
        self.caps["name"].trim().to_string()
    }

    fn tier(&self) -> Option<u32> {
        self.caps.name("tier").and_then(|m| m.as_str().parse().ok())
    }

    fn number(&self, group: &str) -> u32 {
        self.caps
            .name(group)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or_default()
    }

    fn feature_clause(&self) -> Option<String> {
        self.caps
            .name("feature")
            .map(|m| m.as_str().trim().to_string())
            .filter(|f| !f.is_empty())
    }

    /// Description first, then the feature clause, each as a paragraph.
    fn body(&self) -> String {
        let mut html = String::new();
        if !self.description.is_empty() {
            html.push_str(&format!("<p>{}</p>", self.description));
        }
        if let Some(clause) = self.feature_clause() {
            html.push_str(&format!("<p>{clause}</p>"));
        }
        html
    }
}

pub fn parse_weapon(chunk: &StatblockChunk) -> Result<ParsedEntity, ParseError> {
    let header = Header::matched(chunk, &WEAPON_HEADER_RE, EntityKind::Weapon, WEAPON_EXPECTED)?;
    let caps = &header.caps;
    let missing = || ParseError::MissingAnchor {
        kind: EntityKind::Weapon,
        expected: WEAPON_EXPECTED.to_string(),
    };

    let attack_trait = CharacterTrait::from_word(&caps["trait"]).ok_or_else(missing)?;
    let range = Range::from_words(&caps["range"]).ok_or_else(missing)?;
    let burden = Burden::from_words(&caps["burden"]).ok_or_else(missing)?;
    let formula = DiceFormula::from_captures(caps).ok_or_else(missing)?;
    let types = read_damage_types(&caps["types"]);

    let annotated = annotate_equipment(&header.body());
    let system = WeaponSystem {
        tier: header.tier(),
        attack_trait,
        range,
        damage: DamagePart::new(DamageValue::Dice(formula), types),
        burden,
        feature_clause: header.feature_clause(),
        description: annotated.description,
        actions: annotated.actions,
    };

    Ok(ParsedEntity::new(header.name(), EntityKind::Weapon, SystemData::Weapon(system)))
}

pub fn parse_armor(chunk: &StatblockChunk) -> Result<ParsedEntity, ParseError> {
    let header = Header::matched(chunk, &ARMOR_HEADER_RE, EntityKind::Armor, ARMOR_EXPECTED)?;

    let annotated = annotate_equipment(&header.body());
    let system = ArmorSystem {
        tier: header.tier(),
        base_thresholds: DamageThresholds {
            major: header.number("major"),
            severe: header.number("severe"),
        },
        base_score: header.number("base"),
        feature_clause: header.feature_clause(),
        description: annotated.description,
        actions: annotated.actions,
    };

    Ok(ParsedEntity::new(header.name(), EntityKind::Armor, SystemData::Armor(system)))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::ttrpg::entity::ActionDescriptor;
    use crate::ingestion::ttrpg::vocabulary::DamageType;

    fn weapon(text: &str) -> Result<WeaponSystem, ParseError> {
        match parse_weapon(&StatblockChunk::from_text(text))?.system {
            SystemData::Weapon(system) => Ok(system),
            other => panic!("expected weapon, got {other:?}"),
        }
    }

    fn armor(text: &str) -> Result<(String, ArmorSystem), ParseError> {
        let entity = parse_armor(&StatblockChunk::from_text(text))?;
        match entity.system {
            SystemData::Armor(system) => Ok((entity.name, system)),
            other => panic!("expected armor, got {other:?}"),
        }
    }

    #[test]
    fn test_weapon_header() {
        let entity = parse_weapon(&StatblockChunk::from_text(
            "Tier 1 Broadsword Agility Melee d8 phy One-Handed Reliable: +1 to attack rolls",
        ))
        .unwrap();
        assert_eq!(entity.name, "Broadsword");

        let SystemData::Weapon(system) = entity.system else {
            panic!("expected weapon");
        };
        assert_eq!(system.tier, Some(1));
        assert_eq!(system.attack_trait, CharacterTrait::Agility);
        assert_eq!(system.range, Range::Melee);
        assert_eq!(system.burden, Burden::OneHanded);
        assert_eq!(system.damage.value, DamageValue::Dice(DiceFormula::new(1, 8, None)));
        assert_eq!(system.feature_clause.as_deref(), Some("Reliable: +1 to attack rolls"));
        assert_eq!(system.description, "<p>Reliable: +1 to attack rolls</p>");
    }

    #[test]
    fn test_weapon_multiword_range_and_mixed_types() {
        let system = weapon("Arcane Staff Knowledge Very Far 2d6+3 mag/phy Two Handed").unwrap();
        assert_eq!(system.range, Range::VeryFar);
        assert_eq!(system.burden, Burden::TwoHanded);
        assert_eq!(system.damage.value, DamageValue::Dice(DiceFormula::new(2, 6, Some(3))));
        assert_eq!(
            system.damage.types.iter().copied().collect::<Vec<_>>(),
            vec![DamageType::Physical, DamageType::Magical]
        );
        assert_eq!(system.feature_clause, None);
        assert_eq!(system.tier, None);
    }

    #[test]
    fn test_weapon_description_before_feature() {
        let system = weapon(
            "Scythe Strength Very Close d10+2 physical Two-Handed Reaping: Mark a Stress to make an attack dealing 1d6 damage.\nA cruel farming tool.",
        )
        .unwrap();
        assert_eq!(
            system.description,
            "<p>A cruel farming tool.</p><p>Reaping: Mark a Stress to make an attack dealing [[/r 1d6]] damage.</p>"
        );
        // generic attack and damage are covered by the weapon itself
        assert_eq!(system.actions.len(), 1);
        assert!(matches!(system.actions[0], ActionDescriptor::Effect { .. }));
    }

    #[test]
    fn test_weapon_missing_anchor() {
        let err = weapon("Broadsword d8 phy").unwrap_err();
        match err {
            ParseError::MissingAnchor { kind, expected } => {
                assert_eq!(kind, EntityKind::Weapon);
                assert_eq!(expected, WEAPON_EXPECTED);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_armor_header() {
        let (name, system) = armor("Tier 2 Gambeson Armor 5/11 3 Flexible: +1 to Evasion").unwrap();
        assert_eq!(name, "Gambeson Armor");
        assert_eq!(system.tier, Some(2));
        assert_eq!(system.base_thresholds, DamageThresholds { major: 5, severe: 11 });
        assert_eq!(system.base_score, 3);
        assert_eq!(system.feature_clause.as_deref(), Some("Flexible: +1 to Evasion"));
    }

    #[test]
    fn test_armor_without_feature() {
        let (name, system) = armor("Leather Armor 6 / 13 3\nWorn and supple.").unwrap();
        assert_eq!(name, "Leather Armor");
        assert_eq!(system.feature_clause, None);
        assert_eq!(system.description, "<p>Worn and supple.</p>");
    }

    #[test]
    fn test_armor_missing_anchor() {
        assert!(matches!(
            armor("Leather Armor, sturdy"),
            Err(ParseError::MissingAnchor { kind: EntityKind::Armor, .. })
        ));
        assert!(matches!(armor(""), Err(ParseError::EmptyChunk)));
    }
}
