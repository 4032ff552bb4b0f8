//! Adversary and Environment Statblock Parsing
//!
//! Parses Daggerheart adversary and environment statblocks:
//!
//! ```text
//! Acid Burrower
//! Tier 1 Solo
//! A horse-sized insect with digging claws and acidic blood.
//! Motives & Tactics: Burrow, drag away, feed, reposition
//! Difficulty: 14 | Thresholds: 8/15 | HP: 8 | Stress: 3
//! ATK: +3 | Claws: Very Close | 1d12+2 phy
//! Experience: Tremor Sense +2
//! FEATURES
//! Relentless (3) - Passive: ...
//! ```
//!
//! Pass 1 walks the lines before `FEATURES` with a small state machine
//! ([`transition`]) that buffers multi-line text sections and collects stat
//! segments. Pass 2 interprets the stat segments. The FEATURES section goes to
//! the feature-list parser.

use once_cell::sync::Lazy;
use regex::Regex;

use super::annotator::{annotate, Annotated};
use super::dice_extractor::DiceFormula;
use super::entity::{
    ActionDescriptor, AdversaryGroupRef, AdversarySystem, DamagePart, DamageThresholds, DamageValue,
    EnvironmentSystem, Experience, FeatureRecord, ParsedEntity, PotentialAdversaryGroup,
    SystemData,
};
use super::error::ParseError;
use super::feature_list::parse_features;
use super::splitter::StatblockChunk;
use super::stat_line::{
    is_stat_line, read_attack_bonus, read_damage, read_difficulty, read_experiences,
    read_hit_points, read_named_range, read_stress, read_thresholds, segments, SegmentDamage,
};
use super::vocabulary::{AdversaryType, EntityKind, EnvironmentType};
use crate::core::compendium::{AdversaryLookup, FeatureLookup};

// ============================================================================
// Regex Patterns
// ============================================================================

/// "Tier 2 Bruiser", "Tier 1 Horde (5/HP)".
pub static TIER_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^Tier\s+(\d+)\s+(.+)$").expect("Failed to compile tier regex"));

pub static HORDE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Horde\s*\((\d+)/HP\)").expect("Failed to compile horde regex"));

pub static MOTIVES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^Motives\s*(?:&|and)\s*Tactics:\s*(.*)$").expect("Failed to compile motives regex")
});

pub static IMPULSES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^Impulses:\s*(.*)$").expect("Failed to compile impulses regex"));

pub static POTENTIAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^Potential\s+Adversaries:\s*(.*)$").expect("Failed to compile potential adversaries regex")
});

pub static FEATURES_HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^FEATURES:?$").expect("Failed to compile features header regex"));

/// "Beasts (Bear, Dire Wolf)". The label stops at the first comma or parenthesis.
pub static ADVERSARY_GROUP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<label>[^(,]+)\s*\((?P<names>[^)]+)\)").expect("Failed to compile adversary group regex")
});

/// Feature name carrying the horde's alternate damage: "Horde (1d4+1)".
pub static HORDE_FEATURE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^Horde\s*\((?P<formula>[^)]+)\)$").expect("Failed to compile horde feature regex")
});

/// Label for potential adversaries listed outside any group.
pub const IMPLICIT_GROUP_LABEL: &str = "Adversaries";

// ============================================================================
// Pass 1: Line State Machine
// ============================================================================

/// Which text section free lines currently belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    None,
    Description,
    Motives,
    Impulses,
    Potential,
}

/// What one line contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emission<'a> {
    /// A tier header with its raw subtype text.
    Tier { tier: Option<u32>, subtype: &'a str },
    /// Text for one of the buffered sections.
    Text(CaptureState, &'a str),
    /// A stat line to be split into segments.
    Stats(&'a str),
    Skip,
}

fn section_start(state: CaptureState, trailing: &str) -> (CaptureState, Emission<'_>) {
    let trailing = trailing.trim();
    if trailing.is_empty() {
        (state, Emission::Skip)
    } else {
        (state, Emission::Text(state, trailing))
    }
}

/// Classify one line (never the name line).
pub fn transition(state: CaptureState, line: &str) -> (CaptureState, Emission<'_>) {
    if let Some(caps) = TIER_LINE_RE.captures(line) {
        let tier = caps[1].parse().ok();
        let subtype = caps.get(2).map_or("", |m| m.as_str().trim());
        return (CaptureState::Description, Emission::Tier { tier, subtype });
    }
    if let Some(caps) = MOTIVES_RE.captures(line) {
        return section_start(CaptureState::Motives, caps.get(1).map_or("", |m| m.as_str()));
    }
    if let Some(caps) = IMPULSES_RE.captures(line) {
        return section_start(CaptureState::Impulses, caps.get(1).map_or("", |m| m.as_str()));
    }
    if let Some(caps) = POTENTIAL_RE.captures(line) {
        return section_start(CaptureState::Potential, caps.get(1).map_or("", |m| m.as_str()));
    }
    if is_stat_line(line) {
        return (state, Emission::Stats(line));
    }
    match state {
        CaptureState::None => (state, Emission::Skip),
        _ => (state, Emission::Text(state, line)),
    }
}

#[derive(Debug, Default)]
struct Sections<'a> {
    tier: Option<u32>,
    subtype: Option<&'a str>,
    description: Vec<&'a str>,
    motives: Vec<&'a str>,
    impulses: Vec<&'a str>,
    potential: Vec<&'a str>,
    segments: Vec<&'a str>,
}

impl<'a> Sections<'a> {
    fn collect(lines: &'a [String]) -> Self {
        let mut sections = Self::default();
        let mut state = CaptureState::None;

        for line in lines {
            let (next, emission) = transition(state, line);
            state = next;
            match emission {
                Emission::Tier { tier, subtype } => {
                    sections.tier = tier;
                    sections.subtype = Some(subtype);
                }
                Emission::Text(CaptureState::Description, text) => sections.description.push(text),
                Emission::Text(CaptureState::Motives, text) => sections.motives.push(text),
                Emission::Text(CaptureState::Impulses, text) => sections.impulses.push(text),
                Emission::Text(CaptureState::Potential, text) => sections.potential.push(text),
                Emission::Stats(line) => sections.segments.extend(segments(line)),
                Emission::Text(CaptureState::None, _) | Emission::Skip => {}
            }
        }
        sections
    }
}

fn joined(lines: &[&str]) -> Option<String> {
    (!lines.is_empty()).then(|| lines.join(" "))
}

/// Annotated description text plus the actions found in it.
fn described(lines: &[&str]) -> (Option<String>, Vec<ActionDescriptor>) {
    match joined(lines) {
        Some(text) => {
            let Annotated {
                description,
                actions,
            } = annotate(&text);
            (Some(description), actions)
        }
        None => (None, Vec::new()),
    }
}

// ============================================================================
// Parser
// ============================================================================

/// Parses adversary and environment chunks against the compendium indices.
pub struct StatBlockParser<'a> {
    features: &'a dyn FeatureLookup,
    adversaries: &'a dyn AdversaryLookup,
}

impl<'a> StatBlockParser<'a> {
    pub fn new(features: &'a dyn FeatureLookup, adversaries: &'a dyn AdversaryLookup) -> Self {
        Self {
            features,
            adversaries,
        }
    }

    /// Parse one chunk as an environment when `kind` says so, otherwise as an
    /// adversary.
    pub fn parse(&self, chunk: &StatblockChunk, kind: EntityKind) -> Result<ParsedEntity, ParseError> {
        let (name, rest) = chunk.lines().split_first().ok_or(ParseError::EmptyChunk)?;

        let features_at = rest.iter().position(|l| FEATURES_HEADER_RE.is_match(l));
        let (stat_lines, feature_lines) = match features_at {
            Some(i) => (&rest[..i], &rest[i + 1..]),
            None => (rest, &rest[rest.len()..]),
        };

        let sections = Sections::collect(stat_lines);
        let features = parse_features(feature_lines, name, self.features);

        let mut entity = if kind == EntityKind::Environment {
            self.environment(name, &sections)?
        } else {
            adversary(name, &sections, &features)?
        };
        entity.features = features;
        Ok(entity)
    }

    fn environment(&self, name: &str, sections: &Sections<'_>) -> Result<ParsedEntity, ParseError> {
        let subtype = sections
            .subtype
            .map(|raw| {
                EnvironmentType::from_key(&raw.to_lowercase()).ok_or_else(|| ParseError::InvalidSubtype {
                    kind: EntityKind::Environment,
                    raw: raw.to_string(),
                    valid: EnvironmentType::valid_keys(),
                })
            })
            .transpose()?;

        let notes = joined(&sections.potential);
        let report = notes
            .as_deref()
            .map(|text| self.potential_adversaries(text))
            .unwrap_or_default();

        let (description, actions) = described(&sections.description);
        let system = EnvironmentSystem {
            tier: sections.tier,
            subtype,
            difficulty: sections.segments.iter().find_map(|s| read_difficulty(s)),
            description,
            impulses: joined(&sections.impulses),
            potential_adversaries: report
                .iter()
                .filter(|group| group.resolved().next().is_some())
                .map(|group| AdversaryGroupRef {
                    label: group.label.clone(),
                    adversaries: group.resolved().map(str::to_string).collect(),
                })
                .collect(),
            notes,
            actions,
        };

        let mut entity = ParsedEntity::new(name, EntityKind::Environment, SystemData::Environment(system));
        entity.adversary_report = report;
        Ok(entity)
    }

    /// Parse potential-adversary text into groups with per-name resolution.
    pub fn potential_adversaries(&self, text: &str) -> Vec<PotentialAdversaryGroup> {
        let mut groups = Vec::new();
        let mut remainder = String::new();
        let mut last = 0;

        for caps in ADVERSARY_GROUP_RE.captures_iter(text) {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            remainder.push_str(&text[last..whole.start]);
            last = whole.end;

            let names = caps["names"].split(',').map(str::trim).filter(|n| !n.is_empty());
            groups.push(self.group(caps["label"].trim(), names));
        }
        remainder.push_str(&text[last..]);

        let loose: Vec<&str> = remainder.split(',').map(str::trim).filter(|n| !n.is_empty()).collect();
        if !loose.is_empty() {
            groups.push(self.group(IMPLICIT_GROUP_LABEL, loose.into_iter()));
        }
        groups
    }

    fn group<'n>(&self, label: &str, names: impl Iterator<Item = &'n str>) -> PotentialAdversaryGroup {
        let member_names: Vec<String> = names.map(str::to_string).collect();
        let resolved_refs = member_names
            .iter()
            .map(|name| {
                let id = self.adversaries.find_adversary(name).map(str::to_string);
                if id.is_none() {
                    log::debug!("Potential adversary not found in compendium: {}", name);
                }
                id
            })
            .collect();

        PotentialAdversaryGroup {
            label: label.to_string(),
            member_names,
            resolved_refs,
        }
    }
}

fn adversary(
    name: &str,
    sections: &Sections<'_>,
    features: &[FeatureRecord],
) -> Result<ParsedEntity, ParseError> {
    let (description, actions) = described(&sections.description);
    let mut system = AdversarySystem {
        tier: sections.tier,
        description,
        actions,
        motives_and_tactics: joined(&sections.motives),
        ..Default::default()
    };

    if let Some(raw) = sections.subtype {
        if let Some(caps) = HORDE_RE.captures(raw) {
            system.subtype = Some(AdversaryType::Horde);
            system.horde_hp = caps[1].parse().ok();
        } else {
            system.subtype = Some(AdversaryType::from_key(&raw.to_lowercase()).ok_or_else(|| {
                ParseError::InvalidSubtype {
                    kind: EntityKind::Adversary,
                    raw: raw.to_string(),
                    valid: AdversaryType::valid_keys(),
                }
            })?);
        }
    }

    for segment in &sections.segments {
        apply_segment(&mut system, segment);
    }

    if system.subtype == Some(AdversaryType::Horde) {
        if let Some(damage) = system.attack.damage.as_mut() {
            link_horde_damage(damage, features);
        }
    }

    Ok(ParsedEntity::new(name, EntityKind::Adversary, SystemData::Adversary(system)))
}

/// Pass 2 for one segment. Every reader is tried; the keyword prefixes keep
/// them from overlapping.
fn apply_segment(system: &mut AdversarySystem, segment: &str) {
    if let Some(v) = read_difficulty(segment) {
        system.difficulty = Some(v);
    }
    if let Some((major, severe)) = read_thresholds(segment) {
        system.damage_thresholds = Some(DamageThresholds { major, severe });
    }
    if let Some(v) = read_hit_points(segment) {
        system.hit_points = Some(v);
    }
    if let Some(v) = read_stress(segment) {
        system.stress = Some(v);
    }
    if let Some(bonus) = read_attack_bonus(segment) {
        system.attack.bonus = Some(bonus);
    }
    if let Some((attack_name, range)) = read_named_range(segment) {
        system.attack.name = Some(attack_name);
        system.attack.range = Some(range);
    }
    if system.attack.damage.is_none() {
        if let Some(found) = read_damage(segment) {
            let value = match found.value {
                SegmentDamage::Dice(formula) => DamageValue::Dice(formula),
                SegmentDamage::Flat(formula) => DamageValue::Custom(formula),
            };
            system.attack.damage = Some(DamagePart::new(value, found.types));
        }
    }
    if let Some(items) = read_experiences(segment) {
        system
            .experiences
            .extend(items.into_iter().map(|(name, value)| Experience { name, value }));
    }
}

fn link_horde_damage(damage: &mut DamagePart, features: &[FeatureRecord]) {
    let alternate = features.iter().find_map(|f| {
        let caps = HORDE_FEATURE_RE.captures(f.name.trim())?;
        DiceFormula::parse(&caps["formula"])
    });
    if let Some(formula) = alternate {
        damage.value_alt = Some(DamageValue::Dice(formula));
    }
}

// ============================================================================
// Tests
// ============================================================================
