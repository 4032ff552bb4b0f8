//! Validation Preview
//!
//! Plain-text rendering of an [`ImportReport`]: for each chunk, which fields
//! were found and which were not, so a paste can be checked before import.

use std::fmt::Display;

use super::entity::{
    AdversarySystem, DamagePart, DamageValue, EnvironmentSystem, ParsedEntity, SystemData,
};
use super::importer::{ChunkOutcome, ImportReport};

const NOT_FOUND: &str = "Not Found";
const DESCRIPTION_PREVIEW_CHARS: usize = 100;

/// Accumulates preview lines with a fixed indent.
struct Preview {
    out: String,
    indent: &'static str,
}

impl Preview {
    fn new(indent: &'static str) -> Self {
        Self {
            out: String::new(),
            indent,
        }
    }

    fn line(&mut self, text: impl Display) {
        self.out.push_str(&format!("{}{}\n", self.indent, text));
    }

    fn show<T: Display>(&mut self, label: &str, value: Option<T>) {
        match value {
            Some(v) => self.line(format_args!("{label}: {v}")),
            None => self.line(format_args!("{label}: {NOT_FOUND}")),
        }
    }

    fn sub(&mut self, text: impl Display) {
        self.out.push_str(&format!("{}  - {}\n", self.indent, text));
    }
}

pub fn render_preview(report: &ImportReport) -> String {
    let batch = report.is_batch();
    let mut out = String::new();

    if batch {
        out.push_str(&format!("Batch Mode: {} statblocks detected\n\n", report.total()));
    }

    for (i, outcome) in report.outcomes.iter().enumerate() {
        match outcome {
            ChunkOutcome::Failure { failure } if batch => {
                out.push_str(&format!("#{}: {}\n", i + 1, failure.first_line_excerpt));
                out.push_str(&format!("  Skipped: {}\n\n", failure.message));
            }
            ChunkOutcome::Failure { failure } => {
                out.push_str(&format!("Error: {}\n", failure.message));
            }
            ChunkOutcome::Success { entity } => {
                let mut preview = Preview::new(if batch { "  " } else { "" });
                if batch {
                    out.push_str(&format!("#{}: {}\n", i + 1, entity.name));
                }
                entity_lines(&mut preview, entity);
                out.push_str(&preview.out);
                if batch {
                    out.push('\n');
                }
            }
        }
    }
    out
}

fn entity_lines(p: &mut Preview, entity: &ParsedEntity) {
    let type_label = if entity.kind.is_actor() { "Actor Type" } else { "Item Type" };
    p.show(type_label, Some(entity.kind.label()));
    p.show("Name", Some(&entity.name));

    match &entity.system {
        SystemData::Adversary(s) => adversary_lines(p, s),
        SystemData::Environment(s) => environment_head(p, s),
        SystemData::Weapon(s) => {
            p.show("Tier", s.tier);
            p.show("Trait", Some(s.attack_trait.label()));
            p.show("Range", Some(s.range.label()));
            p.show("Damage", Some(damage_text(&s.damage)));
            p.show("Burden", Some(s.burden.label()));
            p.show("Feature", s.feature_clause.as_deref());
        }
        SystemData::Armor(s) => {
            p.show("Tier", s.tier);
            p.line(format_args!(
                "Thresholds: {} / {}",
                s.base_thresholds.major, s.base_thresholds.severe
            ));
            p.show("Base Score", Some(s.base_score));
            p.show("Feature", s.feature_clause.as_deref());
        }
        SystemData::Feature(s) => p.show("Form", Some(s.form.label())),
        SystemData::DomainCard(s) => {
            p.show("Level", Some(s.level));
            p.show("Domain", Some(&s.domain));
            p.show("Card Type", Some(s.card_type.key()));
            p.show("Recall Cost", Some(s.recall_cost));
        }
        SystemData::Item(_) => {}
    }

    match entity.description() {
        Some(text) => p.line(format_args!("Description: {}", truncate(text))),
        None => p.show::<&str>("Description", None),
    }

    match &entity.system {
        SystemData::Adversary(s) => p.show("Motives", s.motives_and_tactics.as_deref()),
        SystemData::Environment(s) => environment_tail(p, entity, s),
        _ => {}
    }

    if entity.kind.is_actor() {
        if entity.features.is_empty() {
            p.line("Features: None detected");
        } else {
            p.line(format_args!("Features: Found {}", entity.features.len()));
            for feature in &entity.features {
                let source = if feature.is_compendium() { "(Compendium)" } else { "(New)" };
                p.sub(format_args!("{} {}", feature.name, source));
            }
        }
    }

    if !entity.actions().is_empty() {
        p.line(format_args!("Actions: Found {}", entity.actions().len()));
        for action in entity.actions() {
            p.sub(action.label());
        }
    }
}

fn adversary_lines(p: &mut Preview, s: &AdversarySystem) {
    p.show("Tier", s.tier);
    p.show("Type", s.subtype.map(|t| t.key()));
    if s.horde_hp.is_some() {
        p.show("Horde HP", s.horde_hp);
    }
    p.show("Difficulty", s.difficulty);
    p.show(
        "Thresholds",
        s.damage_thresholds.map(|t| format!("{} / {}", t.major, t.severe)),
    );
    p.show("HP", s.hit_points);
    p.show("Stress", s.stress);
    p.show("Attack Name", s.attack.name.as_deref());
    p.show("Attack Range", s.attack.range.map(|r| r.label()));
    p.show("Attack Bonus", s.attack.bonus.map(signed));
    p.show("Attack Damage", s.attack.damage.as_ref().map(damage_text));

    if s.experiences.is_empty() {
        p.show::<&str>("Experiences", None);
    } else {
        p.line(format_args!("Experiences: Found {}", s.experiences.len()));
        for e in &s.experiences {
            p.sub(format_args!("{} ({})", e.name, signed(e.value)));
        }
    }
}

fn environment_head(p: &mut Preview, s: &EnvironmentSystem) {
    p.show("Tier", s.tier);
    p.show("Type", s.subtype.map(|t| t.key()));
    p.show("Difficulty", s.difficulty);
}

fn environment_tail(p: &mut Preview, entity: &ParsedEntity, s: &EnvironmentSystem) {
    p.show("Impulses", s.impulses.as_deref());

    if !entity.adversary_report.is_empty() {
        p.line("Potential Adversaries: Found groups");
        for group in &entity.adversary_report {
            let linked = group.resolved().count();
            let missing: Vec<&str> = group.unresolved().collect();
            if missing.is_empty() {
                p.sub(format_args!("{}: {} linked", group.label, linked));
            } else {
                p.sub(format_args!(
                    "{}: {} linked (not found: {})",
                    group.label,
                    linked,
                    missing.join(", ")
                ));
            }
        }
    } else if s.notes.is_some() {
        p.line("Potential Adversaries: Text found in Notes, but no groups parsed.");
    }
}

fn signed(value: i32) -> String {
    if value >= 0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}

fn damage_text(part: &DamagePart) -> String {
    let value = match &part.value {
        DamageValue::Dice(formula) => formula.to_string(),
        DamageValue::Custom(formula) => format!("{formula} (Static)"),
    };
    let types: Vec<&str> = part.types.iter().map(|t| t.key()).collect();
    let mut text = format!("{value} [{}]", types.join(", "));
    if let Some(DamageValue::Dice(alt)) = &part.value_alt {
        text.push_str(&format!(" [Horde: {alt}]"));
    }
    text
}

fn truncate(text: &str) -> String {
    if text.chars().count() > DESCRIPTION_PREVIEW_CHARS {
        let head: String = text.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================
