//! Daggerheart Vocabulary Module
//!
//! Closed keyword sets recognized by the statblock parsers and the mapping
//! from their printed form ("Very Close", "phy", "Two-Handed") to canonical keys.
//!
//! Every set here is English-only and matched case-insensitively.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Entity Kinds
// ============================================================================

/// The kind of game entity a statblock describes.
///
/// Drives which extractor runs, which closed subtype set applies and which
/// default image and folder the host assigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Adversary,
    Environment,
    Weapon,
    Armor,
    Feature,
    DomainCard,
    Loot,
    Consumable,
}

impl EntityKind {
    pub const ALL: [EntityKind; 8] = [
        Self::Adversary,
        Self::Environment,
        Self::Weapon,
        Self::Armor,
        Self::Feature,
        Self::DomainCard,
        Self::Loot,
        Self::Consumable,
    ];

    /// Host document type key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Adversary => "adversary",
            Self::Environment => "environment",
            Self::Weapon => "weapon",
            Self::Armor => "armor",
            Self::Feature => "feature",
            Self::DomainCard => "domainCard",
            Self::Loot => "loot",
            Self::Consumable => "consumable",
        }
    }

    /// Human-readable label for previews.
    pub fn label(self) -> &'static str {
        match self {
            Self::Adversary => "Adversary",
            Self::Environment => "Environment",
            Self::Weapon => "Weapon",
            Self::Armor => "Armor",
            Self::Feature => "Feature",
            Self::DomainCard => "Domain Card",
            Self::Loot => "Loot",
            Self::Consumable => "Consumable",
        }
    }

    /// Adversaries and environments are actors; everything else is an item.
    pub fn is_actor(self) -> bool {
        matches!(self, Self::Adversary | Self::Environment)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_lowercase();

        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().to_lowercase() == key)
            .ok_or_else(|| {
                format!(
                    "unknown entity kind '{s}' (expected one of: {})",
                    Self::ALL.map(|k| k.as_str()).join(", ")
                )
            })
    }
}

// ============================================================================
// Ranges
// ============================================================================

/// Attack range band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Range {
    Melee,
    VeryClose,
    Close,
    Far,
    VeryFar,
}

impl Range {
    pub const ALL: [Range; 5] = [
        Self::Melee,
        Self::VeryClose,
        Self::Close,
        Self::Far,
        Self::VeryFar,
    ];

    /// Map printed range words ("Very Close") to a range. Inner whitespace is
    /// collapsed before comparing.
    pub fn from_words(words: &str) -> Option<Self> {
        let key = words.split_whitespace().collect::<Vec<_>>().join(" ");
        Self::ALL
            .into_iter()
            .find(|r| r.label().eq_ignore_ascii_case(&key))
    }

    /// Canonical key (`veryClose`).
    pub fn key(self) -> &'static str {
        match self {
            Self::Melee => "melee",
            Self::VeryClose => "veryClose",
            Self::Close => "close",
            Self::Far => "far",
            Self::VeryFar => "veryFar",
        }
    }

    /// Printed form (`Very Close`).
    pub fn label(self) -> &'static str {
        match self {
            Self::Melee => "Melee",
            Self::VeryClose => "Very Close",
            Self::Close => "Close",
            Self::Far => "Far",
            Self::VeryFar => "Very Far",
        }
    }
}

// ============================================================================
// Traits, Burden, Damage Types
// ============================================================================

/// The six character traits used for attack and reaction rolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CharacterTrait {
    Agility,
    Strength,
    Finesse,
    Instinct,
    Presence,
    Knowledge,
}

impl CharacterTrait {
    pub const ALL: [CharacterTrait; 6] = [
        Self::Agility,
        Self::Strength,
        Self::Finesse,
        Self::Instinct,
        Self::Presence,
        Self::Knowledge,
    ];

    pub fn from_word(word: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(word.trim()))
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Agility => "agility",
            Self::Strength => "strength",
            Self::Finesse => "finesse",
            Self::Instinct => "instinct",
            Self::Presence => "presence",
            Self::Knowledge => "knowledge",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Agility => "Agility",
            Self::Strength => "Strength",
            Self::Finesse => "Finesse",
            Self::Instinct => "Instinct",
            Self::Presence => "Presence",
            Self::Knowledge => "Knowledge",
        }
    }
}

/// How many hands a weapon needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Burden {
    OneHanded,
    TwoHanded,
}

impl Burden {
    /// Accepts `One-Handed`, `one handed`, `Two-Handed`...
    pub fn from_words(words: &str) -> Option<Self> {
        let key: String = words
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "onehanded" => Some(Self::OneHanded),
            "twohanded" => Some(Self::TwoHanded),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::OneHanded => "oneHanded",
            Self::TwoHanded => "twoHanded",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::OneHanded => "One-Handed",
            Self::TwoHanded => "Two-Handed",
        }
    }
}

/// Damage type. Ordered so that a set of types always lists physical first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DamageType {
    Physical,
    Magical,
}

impl DamageType {
    /// Recognize one type token (`phy`, `physical`, `mag`, `magical`).
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "phy" | "physical" => Some(Self::Physical),
            "mag" | "magical" => Some(Self::Magical),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Physical => "physical",
            Self::Magical => "magical",
        }
    }

    /// Abbreviation used on stat lines.
    pub fn short(self) -> &'static str {
        match self {
            Self::Physical => "phy",
            Self::Magical => "mag",
        }
    }
}

// ============================================================================
// Subtypes
// ============================================================================

/// Closed adversary subtype set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AdversaryType {
    Bruiser,
    Horde,
    Leader,
    Minion,
    Ranged,
    Skulk,
    Social,
    Solo,
    Standard,
    Support,
}

impl AdversaryType {
    pub const ALL: [AdversaryType; 10] = [
        Self::Bruiser,
        Self::Horde,
        Self::Leader,
        Self::Minion,
        Self::Ranged,
        Self::Skulk,
        Self::Social,
        Self::Solo,
        Self::Standard,
        Self::Support,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Bruiser => "bruiser",
            Self::Horde => "horde",
            Self::Leader => "leader",
            Self::Minion => "minion",
            Self::Ranged => "ranged",
            Self::Skulk => "skulk",
            Self::Social => "social",
            Self::Solo => "solo",
            Self::Standard => "standard",
            Self::Support => "support",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.key() == key)
    }

    pub fn valid_keys() -> String {
        Self::ALL.map(|t| t.key()).join(", ")
    }
}

/// Closed environment subtype set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EnvironmentType {
    Exploration,
    Social,
    Traversal,
    Event,
}

impl EnvironmentType {
    pub const ALL: [EnvironmentType; 4] = [
        Self::Exploration,
        Self::Social,
        Self::Traversal,
        Self::Event,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Exploration => "exploration",
            Self::Social => "social",
            Self::Traversal => "traversal",
            Self::Event => "event",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.key() == key)
    }

    pub fn valid_keys() -> String {
        Self::ALL.map(|t| t.key()).join(", ")
    }
}

// ============================================================================
// Features, Cards, Resources
// ============================================================================

/// When a feature is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeatureForm {
    #[default]
    Passive,
    Action,
    Reaction,
}

impl FeatureForm {
    pub fn from_word(word: &str) -> Option<Self> {
        match word.trim().to_lowercase().as_str() {
            "passive" => Some(Self::Passive),
            "action" => Some(Self::Action),
            "reaction" => Some(Self::Reaction),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Passive => "passive",
            Self::Action => "action",
            Self::Reaction => "reaction",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Passive => "Passive",
            Self::Action => "Action",
            Self::Reaction => "Reaction",
        }
    }
}

/// Domain card type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CardType {
    Spell,
    Ability,
    Grimoire,
}

impl CardType {
    pub fn from_word(word: &str) -> Option<Self> {
        match word.trim().to_lowercase().as_str() {
            "spell" => Some(Self::Spell),
            "ability" => Some(Self::Ability),
            "grimoire" => Some(Self::Grimoire),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Spell => "spell",
            Self::Ability => "ability",
            Self::Grimoire => "grimoire",
        }
    }
}

/// Resource spent or marked by an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKey {
    Stress,
    Fear,
    Hope,
}

impl ResourceKey {
    pub fn key(self) -> &'static str {
        match self {
            Self::Stress => "stress",
            Self::Fear => "fear",
            Self::Hope => "hope",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
