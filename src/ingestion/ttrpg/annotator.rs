//! Dice and Action Annotation
//!
//! Post-processes finished description text:
//!
//! 1. wraps dice notation in roll markers (see [`wrap_dice`]);
//! 2. scans the prose for a fixed set of mechanical triggers and synthesizes
//!    an [`ActionDescriptor`] for each one that fires.
//!
//! Triggers are independent; one sentence such as "Mark 2 Stress and make an
//! attack roll" legitimately yields several descriptors.
//!
//! # Example
//!
//! ```ignore
//! use crate::ingestion::ttrpg::annotator::annotate;
//!
//! let out = annotate("Mark a Stress to deal 1d8 magic damage.");
//! assert_eq!(out.description, "Mark a Stress to deal [[/r 1d8]] magic damage.");
//! assert_eq!(out.actions.len(), 2);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use super::dice_extractor::{find_dice, wrap_dice};
use super::entity::{ActionDescriptor, ResourceCost, SaveCheck};
use super::vocabulary::{CharacterTrait, DamageType, ResourceKey};

// ============================================================================
// Types
// ============================================================================

/// An annotated description with the actions detected in it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotated {
    pub description: String,
    pub actions: Vec<ActionDescriptor>,
}

// ============================================================================
// Regex Patterns
// ============================================================================

/// "Mark a Stress", "mark 2 stress", "Mark Stress".
pub static MARK_STRESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bmark\s+(?:(an?|\d+)\s+)?stress\b").expect("Failed to compile mark stress regex")
});

pub static SPEND_FEAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bspend\s+(?:(an?|\d+)\s+)?fear\b").expect("Failed to compile spend fear regex")
});

pub static SPEND_HOPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bspend\s+(?:(an?|\d+)\s+)?hope\b").expect("Failed to compile spend hope regex")
});

/// "Agility Reaction Roll", optionally followed by a difficulty: "(15)".
pub static REACTION_ROLL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(agility|strength|finesse|instinct|presence|knowledge)\s+reaction\s+roll(?:\s*\((\d+)\))?",
    )
    .expect("Failed to compile reaction roll regex")
});

/// "make an attack", "make a standard attack", "make an attack roll".
pub static MAKE_ATTACK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bmake\s+(?:an?\s+|a\s+standard\s+)?attack(?:\s+roll)?\b")
        .expect("Failed to compile attack regex")
});

static DIRECT_DAMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bdirect\s+damage\b").expect("Failed to compile direct damage regex"));

static DIRECT_PHYSICAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bdirect\s+physical\s+damage\b").expect("Failed to compile direct physical regex")
});

static DIRECT_MAGIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bdirect\s+magic(?:al)?\s+damage\b").expect("Failed to compile direct magic regex")
});

static MAGIC_DAMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bmagic(?:al)?\s+damage\b").expect("Failed to compile magic damage regex"));

// ============================================================================
// Annotation
// ============================================================================

/// Wrap dice and detect actions in one pass.
pub fn annotate(text: &str) -> Annotated {
    let description = wrap_dice(text);
    let actions = detect_actions(&description);
    Annotated {
        description,
        actions,
    }
}

/// Like [`annotate`], but keeps only what equipment cannot already express:
/// resource costs and reaction rolls.
pub fn annotate_equipment(text: &str) -> Annotated {
    let mut annotated = annotate(text);
    annotated.actions.retain(is_equipment_action);
    annotated
}

fn is_equipment_action(action: &ActionDescriptor) -> bool {
    matches!(
        action,
        ActionDescriptor::Effect { .. } | ActionDescriptor::Attack { save: Some(_) }
    )
}

/// Run every trigger over the text. Order of the result: stress, fear, hope,
/// reaction rolls, generic attack, damage.
pub fn detect_actions(text: &str) -> Vec<ActionDescriptor> {
    let mut actions = Vec::new();

    for (pattern, key) in [
        (&*MARK_STRESS_RE, ResourceKey::Stress),
        (&*SPEND_FEAR_RE, ResourceKey::Fear),
        (&*SPEND_HOPE_RE, ResourceKey::Hope),
    ] {
        if let Some(cost) = resource_cost(pattern, key, text) {
            actions.push(ActionDescriptor::Effect { cost });
        }
    }

    actions.extend(reaction_rolls(text));

    if MAKE_ATTACK_RE.is_match(text) {
        actions.push(ActionDescriptor::Attack { save: None });
    }

    actions.extend(damage_actions(text));
    actions
}

fn resource_cost(pattern: &Regex, key: ResourceKey, text: &str) -> Option<ResourceCost> {
    let caps = pattern.captures(text)?;
    let value = caps
        .get(1)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(1);
    Some(ResourceCost { key, value })
}

/// At most one save per trait, in trait order.
fn reaction_rolls(text: &str) -> Vec<ActionDescriptor> {
    let found: Vec<SaveCheck> = REACTION_ROLL_RE
        .captures_iter(text)
        .filter_map(|caps| {
            Some(SaveCheck {
                save_trait: CharacterTrait::from_word(&caps[1])?,
                difficulty: caps.get(2).and_then(|m| m.as_str().parse().ok()),
            })
        })
        .collect();

    CharacterTrait::ALL
        .into_iter()
        .filter_map(|t| found.iter().find(|save| save.save_trait == t).copied())
        .map(|save| ActionDescriptor::Attack { save: Some(save) })
        .collect()
}

/// Damage type and directness implied by the prose, checked in priority order.
pub fn damage_kind(text: &str) -> (DamageType, bool) {
    if DIRECT_DAMAGE_RE.is_match(text) || DIRECT_PHYSICAL_RE.is_match(text) {
        (DamageType::Physical, true)
    } else if DIRECT_MAGIC_RE.is_match(text) {
        (DamageType::Magical, true)
    } else if MAGIC_DAMAGE_RE.is_match(text) {
        (DamageType::Magical, false)
    } else {
        // "physical damage" and no hint at all both land here
        (DamageType::Physical, false)
    }
}

fn damage_actions(text: &str) -> Vec<ActionDescriptor> {
    if !text.to_lowercase().contains("damage") {
        return Vec::new();
    }

    let (damage_type, direct) = damage_kind(text);
    find_dice(text)
        .into_iter()
        .map(|formula| ActionDescriptor::Damage {
            formula,
            damage_type,
            direct,
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
