//! Statblock Exporter
//!
//! Formats an adversary or environment back into pasteable statblock text.
//! The output is in the importer's own line grammar, so exporting and
//! re-importing keeps every stat, the attack, experiences and feature
//! names and forms.

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

use super::dice_extractor::unwrap_dice;
use super::entity::{
    AdversarySystem, DamagePart, DamageValue, EnvironmentSystem, FeatureRecord, ParsedEntity,
    SystemData,
};
use super::vocabulary::{AdversaryType, DamageType};
use crate::core::compendium::AdversaryNames;

const UNKNOWN_ACTOR: &str = "Unknown Actor";

// ============================================================================
// Regex Patterns
// ============================================================================

static BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("Failed to compile line break regex"));

static PARAGRAPH_JOIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</p>\s*<p>").expect("Failed to compile paragraph join regex"));

static LIST_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<li>").expect("Failed to compile list item regex"));

static LIST_CLOSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</li>").expect("Failed to compile list item close regex"));

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("Failed to compile tag regex"));

static SELF_LOOKUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)@Lookup\[@name\]").expect("Failed to compile lookup regex"));

/// `@UUID[Compendium...]{Sylvan Soldiers}` keeps only the label.
static UUID_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@UUID\[[^\]]+\]\{([^}]+)\}").expect("Failed to compile uuid link regex"));

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile whitespace regex"));

// ============================================================================
// Text Helpers
// ============================================================================

/// Flatten stored HTML to one line of plain text with roll markers unwrapped
/// and the self-reference marker replaced by `actor_name`.
pub fn strip_html(html: &str, actor_name: &str) -> String {
    let text = BREAK_RE.replace_all(html, " ");
    let text = PARAGRAPH_JOIN_RE.replace_all(&text, " ");
    let text = LIST_OPEN_RE.replace_all(&text, "- ");
    let text = LIST_CLOSE_RE.replace_all(&text, " ");
    let text = TAG_RE.replace_all(&text, "");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">");
    let text = unwrap_dice(&text);
    let text = SELF_LOOKUP_RE.replace_all(&text, NoExpand(actor_name));
    let text = UUID_LINK_RE.replace_all(&text, "$1");
    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn signed(value: i32) -> String {
    if value >= 0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}

/// Dice without a leading `1`, custom formulas verbatim.
fn damage_value_text(value: &DamageValue) -> String {
    match value {
        DamageValue::Custom(formula) => formula.clone(),
        DamageValue::Dice(formula) => {
            let count = if formula.count > 1 {
                formula.count.to_string()
            } else {
                String::new()
            };
            let bonus = match formula.bonus {
                Some(b) if b != 0 => signed(b),
                _ => String::new(),
            };
            format!("{count}{}{bonus}", formula.die())
        }
    }
}

fn damage_text(part: &DamagePart) -> String {
    let value = damage_value_text(&part.value);
    let has = |t: DamageType| part.types.contains(&t);
    let types = match (has(DamageType::Physical), has(DamageType::Magical)) {
        (true, true) => "phy/mag",
        (true, false) => "phy",
        (false, true) => "mag",
        (false, false) => "",
    };
    if types.is_empty() {
        value
    } else {
        format!("{value} {types}")
    }
}

fn push_text(lines: &mut Vec<String>, prefix: &str, html: Option<&str>, actor_name: &str) {
    if let Some(raw) = html {
        let text = strip_html(raw, actor_name);
        if !text.is_empty() {
            lines.push(format!("{prefix}{text}"));
        }
    }
}

// ============================================================================
// Formatting
// ============================================================================

/// Statblock text for an adversary or environment; `None` for item kinds.
pub fn export_statblock(entity: &ParsedEntity, names: &dyn AdversaryNames) -> Option<String> {
    let lines = match &entity.system {
        SystemData::Adversary(s) => adversary_lines(entity, s),
        SystemData::Environment(s) => environment_lines(entity, s, names),
        _ => return None,
    };
    Some(lines.join("\n"))
}

fn adversary_lines(entity: &ParsedEntity, s: &AdversarySystem) -> Vec<String> {
    let name = entity.name.as_str();
    let mut lines = vec![name.to_uppercase()];

    let tier = s.tier.unwrap_or(1);
    match (s.subtype, s.horde_hp) {
        (Some(AdversaryType::Horde), Some(hp)) => lines.push(format!("Tier {tier} Horde ({hp}/HP)")),
        (subtype, _) => {
            let label = subtype.map_or("standard", |t| t.key());
            lines.push(format!("Tier {tier} {}", capitalize(label)));
        }
    }

    push_text(&mut lines, "", s.description.as_deref(), name);
    push_text(&mut lines, "Motives & Tactics: ", s.motives_and_tactics.as_deref(), name);

    let mut stats = Vec::new();
    if let Some(d) = s.difficulty {
        stats.push(format!("Difficulty: {d}"));
    }
    if let Some(t) = s.damage_thresholds {
        stats.push(format!("Thresholds: {}/{}", t.major, t.severe));
    }
    if let Some(hp) = s.hit_points {
        stats.push(format!("HP: {hp}"));
    }
    if let Some(stress) = s.stress {
        stats.push(format!("Stress: {stress}"));
    }
    if !stats.is_empty() {
        lines.push(stats.join(" | "));
    }

    let mut attack = Vec::new();
    if let Some(bonus) = s.attack.bonus {
        attack.push(format!("ATK: {}", signed(bonus)));
    }
    if let Some(attack_name) = &s.attack.name {
        let range = s.attack.range.map_or("", |r| r.label());
        attack.push(format!("{attack_name}: {range}"));
    }
    if let Some(damage) = &s.attack.damage {
        attack.push(damage_text(damage));
    }
    if !attack.is_empty() {
        lines.push(attack.join(" | "));
    }

    if !s.experiences.is_empty() {
        let items: Vec<String> = s
            .experiences
            .iter()
            .map(|e| format!("{} {}", e.name, signed(e.value)))
            .collect();
        lines.push(format!("Experience: {}", items.join(", ")));
    }

    let horde_alt = match (s.subtype, &s.attack.damage) {
        (Some(AdversaryType::Horde), Some(damage)) => damage.value_alt.as_ref(),
        _ => None,
    };
    feature_lines(&mut lines, &entity.features, name, horde_alt);
    lines
}

fn environment_lines(
    entity: &ParsedEntity,
    s: &EnvironmentSystem,
    names: &dyn AdversaryNames,
) -> Vec<String> {
    let name = entity.name.as_str();
    let mut lines = vec![name.to_uppercase()];

    let label = s.subtype.map_or("exploration", |t| t.key());
    lines.push(format!("Tier {} {}", s.tier.unwrap_or(1), capitalize(label)));

    push_text(&mut lines, "", s.description.as_deref(), name);
    push_text(&mut lines, "Impulses: ", s.impulses.as_deref(), name);

    if let Some(d) = s.difficulty {
        lines.push(format!("Difficulty: {d}"));
    }

    let groups: Vec<String> = s
        .potential_adversaries
        .iter()
        .filter(|g| !g.adversaries.is_empty())
        .map(|g| {
            let members: Vec<&str> = g
                .adversaries
                .iter()
                .map(|id| {
                    names.adversary_name(id).unwrap_or_else(|| {
                        log::warn!("Failed to resolve adversary id: {}", id);
                        UNKNOWN_ACTOR
                    })
                })
                .collect();
            format!("{} ({})", g.label, members.join(", "))
        })
        .collect();
    if !groups.is_empty() {
        lines.push(format!("Potential Adversaries: {}", groups.join(", ")));
    }

    feature_lines(&mut lines, &entity.features, name, None);
    lines
}

fn feature_lines(
    lines: &mut Vec<String>,
    features: &[FeatureRecord],
    actor_name: &str,
    horde_alt: Option<&DamageValue>,
) {
    if features.is_empty() {
        return;
    }
    lines.push("FEATURES".to_string());

    for feature in features {
        let name = match horde_alt {
            Some(alt) if feature.name.trim().eq_ignore_ascii_case("horde") => {
                format!("Horde ({})", damage_value_text(alt))
            }
            _ => feature.name.clone(),
        };
        let text = strip_html(&feature.description, actor_name);
        lines.push(format!("{name} - {}: {text}", feature.form.label()));
    }
}

// ============================================================================
// Tests
// ============================================================================
