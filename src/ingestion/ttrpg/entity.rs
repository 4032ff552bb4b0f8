//! Parsed Entity Model
//!
//! The typed record each extractor produces. The kind-specific part lives in
//! [`SystemData`], a closed union with one variant per entity family, so the
//! fields an adversary carries can never leak onto a weapon.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::dice_extractor::DiceFormula;
use super::vocabulary::{
    AdversaryType, Burden, CardType, CharacterTrait, DamageType, EntityKind, EnvironmentType,
    FeatureForm, Range, ResourceKey,
};

// ============================================================================
// Entity
// ============================================================================

/// One extracted game entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedEntity {
    pub name: String,
    pub kind: EntityKind,
    pub system: SystemData,
    /// Sub-features from the FEATURES section (adversaries and environments).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<FeatureRecord>,
    /// Every potential-adversary name with its resolution, resolved or not.
    /// Diagnostic only; the persisted groups live in [`EnvironmentSystem`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub adversary_report: Vec<PotentialAdversaryGroup>,
}

impl ParsedEntity {
    pub fn new(name: impl Into<String>, kind: EntityKind, system: SystemData) -> Self {
        Self {
            name: name.into(),
            kind,
            system,
            features: Vec::new(),
            adversary_report: Vec::new(),
        }
    }

    /// Description text of the entity, whatever its kind.
    pub fn description(&self) -> Option<&str> {
        match &self.system {
            SystemData::Adversary(s) => s.description.as_deref(),
            SystemData::Environment(s) => s.description.as_deref(),
            SystemData::Weapon(s) => Some(s.description.as_str()),
            SystemData::Armor(s) => Some(s.description.as_str()),
            SystemData::Feature(s) => Some(s.description.as_str()),
            SystemData::DomainCard(s) => Some(s.description.as_str()),
            SystemData::Item(s) => Some(s.description.as_str()),
        }
        .filter(|d| !d.is_empty())
    }

    /// Actions synthesized for the entity's own description.
    pub fn actions(&self) -> &[ActionDescriptor] {
        match &self.system {
            SystemData::Weapon(s) => &s.actions,
            SystemData::Armor(s) => &s.actions,
            SystemData::Feature(s) => &s.actions,
            SystemData::DomainCard(s) => &s.actions,
            SystemData::Item(s) => &s.actions,
            SystemData::Adversary(s) => &s.actions,
            SystemData::Environment(s) => &s.actions,
        }
    }
}

/// Kind-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SystemData {
    Adversary(AdversarySystem),
    Environment(EnvironmentSystem),
    Weapon(WeaponSystem),
    Armor(ArmorSystem),
    Feature(FeatureSystem),
    DomainCard(DomainCardSystem),
    /// Loot and consumables share the same shape.
    Item(SimpleItemSystem),
}

// ============================================================================
// Actors
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdversarySystem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<u32>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<AdversaryType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horde_hp: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_thresholds: Option<DamageThresholds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hit_points: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress: Option<u32>,
    #[serde(default)]
    pub attack: AttackProfile,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub experiences: Vec<Experience>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motives_and_tactics: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionDescriptor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentSystem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<u32>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<EnvironmentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impulses: Option<String>,
    /// Raw potential-adversaries text, kept as notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Groups with at least one resolved member; only resolved ids are kept.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub potential_adversaries: Vec<AdversaryGroupRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionDescriptor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageThresholds {
    pub major: u32,
    pub severe: u32,
}

/// The adversary's standard attack.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<DamagePart>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub name: String,
    pub value: i32,
}

/// A potential-adversary group as persisted: label plus resolved ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdversaryGroupRef {
    pub label: String,
    pub adversaries: Vec<String>,
}

/// A potential-adversary group as written, with per-name resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotentialAdversaryGroup {
    pub label: String,
    pub member_names: Vec<String>,
    /// Parallel to `member_names`; `None` where the name did not resolve.
    pub resolved_refs: Vec<Option<String>>,
}

impl PotentialAdversaryGroup {
    pub fn resolved(&self) -> impl Iterator<Item = &str> {
        self.resolved_refs.iter().flatten().map(String::as_str)
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &str> {
        self.member_names
            .iter()
            .zip(&self.resolved_refs)
            .filter(|(_, id)| id.is_none())
            .map(|(name, _)| name.as_str())
    }
}

// ============================================================================
// Damage
// ============================================================================

/// A damage roll or a literal formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DamageValue {
    Dice(DiceFormula),
    Custom(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DamageTarget {
    #[default]
    HitPoints,
}

impl DamageTarget {
    pub fn key(self) -> &'static str {
        match self {
            Self::HitPoints => "hitPoints",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamagePart {
    pub types: BTreeSet<DamageType>,
    pub value: DamageValue,
    /// Alternate damage used by hordes below half HP.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_alt: Option<DamageValue>,
    #[serde(default)]
    pub applies_to: DamageTarget,
    #[serde(default)]
    pub direct: bool,
}

impl DamagePart {
    pub fn new(value: DamageValue, types: BTreeSet<DamageType>) -> Self {
        Self {
            types,
            value,
            value_alt: None,
            applies_to: DamageTarget::HitPoints,
            direct: false,
        }
    }
}

// ============================================================================
// Items
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponSystem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<u32>,
    #[serde(rename = "trait")]
    pub attack_trait: CharacterTrait,
    pub range: Range,
    pub damage: DamagePart,
    pub burden: Burden,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_clause: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArmorSystem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<u32>,
    pub base_thresholds: DamageThresholds,
    pub base_score: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_clause: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSystem {
    pub form: FeatureForm,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainCardSystem {
    pub level: u32,
    /// Lower-cased domain word(s), e.g. `arcana`.
    pub domain: String,
    pub card_type: CardType,
    pub recall_cost: u32,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionDescriptor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimpleItemSystem {
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionDescriptor>,
}

// ============================================================================
// Features and Actions
// ============================================================================

/// Where a feature body came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "origin")]
pub enum FeatureSource {
    /// Taken verbatim from a compendium entry.
    Compendium { id: String },
    /// Parsed from the pasted text.
    Authored,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRecord {
    pub name: String,
    pub form: FeatureForm,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionDescriptor>,
    pub source: FeatureSource,
}

impl FeatureRecord {
    pub fn is_compendium(&self) -> bool {
        matches!(self.source, FeatureSource::Compendium { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCost {
    pub key: ResourceKey,
    pub value: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveCheck {
    #[serde(rename = "trait")]
    pub save_trait: CharacterTrait,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u32>,
}

/// A mechanic derived from description prose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum ActionDescriptor {
    /// Marks or spends a resource.
    Effect { cost: ResourceCost },
    /// An attack; `save` is set for trait reaction rolls.
    Attack {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        save: Option<SaveCheck>,
    },
    Damage {
        formula: DiceFormula,
        #[serde(rename = "damageType")]
        damage_type: DamageType,
        direct: bool,
    },
}

impl ActionDescriptor {
    /// Display name for the host action.
    pub fn label(&self) -> String {
        match self {
            Self::Effect { cost } => match cost.key {
                ResourceKey::Stress => "Mark Stress".to_string(),
                ResourceKey::Fear => "Spend Fear".to_string(),
                ResourceKey::Hope => "Spend Hope".to_string(),
            },
            Self::Attack { save: Some(save) } => {
                format!("{} Reaction Roll", save.save_trait.label())
            }
            Self::Attack { save: None } => "Attack".to_string(),
            Self::Damage { .. } => "Damage".to_string(),
        }
    }
}
