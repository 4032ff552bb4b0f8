//! Feature, domain card and loot/consumable extractors.
//!
//! Each is a single pass over a fixed line grammar; the final description is
//! always run through the annotator.

use once_cell::sync::Lazy;
use regex::Regex;

use super::annotator::annotate;
use super::entity::{DomainCardSystem, FeatureSystem, ParsedEntity, SimpleItemSystem, SystemData};
use super::error::ParseError;
use super::feature_list::FEATURE_HEADER_RE;
use super::splitter::StatblockChunk;
use super::vocabulary::{CardType, EntityKind, FeatureForm};

pub const LEVEL_LINE_EXPECTED: &str = "Level <N> <Domain> <Spell|Ability|Grimoire>";
pub const RECALL_LINE_EXPECTED: &str = "Recall Cost: <N>";

// ============================================================================
// Regex Patterns
// ============================================================================

/// "Level 1 Arcana Spell", "Level 4 Splendor Ability".
pub static LEVEL_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^Level\s+(?P<level>\d+)\s+(?P<domain>.+?)\s+(?P<type>Spell|Ability|Grimoire)$")
        .expect("Failed to compile domain card level regex")
});

pub static RECALL_COST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^Recall\s+Cost\s*:\s*(?P<cost>\d+)$").expect("Failed to compile recall cost regex")
});

// ============================================================================
// Extractors
// ============================================================================

/// One paragraph per line.
fn paragraphs<'a>(lines: impl IntoIterator<Item = &'a str>) -> String {
    lines
        .into_iter()
        .filter(|l| !l.is_empty())
        .map(|l| format!("<p>{l}</p>"))
        .collect()
}

/// `Name[ - Action|Reaction|Passive[: text]]`, then description lines.
pub fn parse_feature(chunk: &StatblockChunk) -> Result<ParsedEntity, ParseError> {
    let (first, rest) = chunk.lines().split_first().ok_or(ParseError::EmptyChunk)?;

    let (name, form, lead) = match FEATURE_HEADER_RE.captures(first) {
        Some(caps) => (
            caps["name"].trim().to_string(),
            FeatureForm::from_word(&caps["form"]).unwrap_or_default(),
            caps.name("text").map(|m| m.as_str().trim()),
        ),
        None => (first.clone(), FeatureForm::Passive, None),
    };

    let body = paragraphs(lead.into_iter().chain(rest.iter().map(String::as_str)));
    let annotated = annotate(&body);

    Ok(ParsedEntity::new(
        name,
        EntityKind::Feature,
        SystemData::Feature(FeatureSystem {
            form,
            description: annotated.description,
            actions: annotated.actions,
        }),
    ))
}

/// Name, `Level N Domain Type`, `Recall Cost: N`, then description lines.
pub fn parse_domain_card(chunk: &StatblockChunk) -> Result<ParsedEntity, ParseError> {
    let lines = chunk.lines();
    let name = lines.first().ok_or(ParseError::EmptyChunk)?;

    let level_line = lines.get(1).and_then(|l| LEVEL_LINE_RE.captures(l)).ok_or_else(|| {
        ParseError::DomainCardLine {
            line: 2,
            expected: LEVEL_LINE_EXPECTED.to_string(),
        }
    })?;
    let recall = lines.get(2).and_then(|l| RECALL_COST_RE.captures(l)).ok_or_else(|| {
        ParseError::DomainCardLine {
            line: 3,
            expected: RECALL_LINE_EXPECTED.to_string(),
        }
    })?;

    let level = level_line["level"].parse::<u32>().map_err(|_| ParseError::DomainCardLine {
        line: 2,
        expected: LEVEL_LINE_EXPECTED.to_string(),
    })?;
    let recall_cost = recall["cost"].parse::<u32>().map_err(|_| ParseError::DomainCardLine {
        line: 3,
        expected: RECALL_LINE_EXPECTED.to_string(),
    })?;
    let card_type = CardType::from_word(&level_line["type"]).ok_or_else(|| ParseError::DomainCardLine {
        line: 2,
        expected: LEVEL_LINE_EXPECTED.to_string(),
    })?;

    let annotated = annotate(&paragraphs(lines[3..].iter().map(String::as_str)));

    Ok(ParsedEntity::new(
        name.as_str(),
        EntityKind::DomainCard,
        SystemData::DomainCard(DomainCardSystem {
            level,
            domain: level_line["domain"].trim().to_lowercase(),
            card_type,
            recall_cost,
            description: annotated.description,
            actions: annotated.actions,
        }),
    ))
}

/// Loot and consumables: name, then description.
pub fn parse_simple_item(chunk: &StatblockChunk, kind: EntityKind) -> Result<ParsedEntity, ParseError> {
    let (name, rest) = chunk.lines().split_first().ok_or(ParseError::EmptyChunk)?;
    let annotated = annotate(&paragraphs(rest.iter().map(String::as_str)));

    Ok(ParsedEntity::new(
        name.as_str(),
        kind,
        SystemData::Item(SimpleItemSystem {
            description: annotated.description,
            actions: annotated.actions,
        }),
    ))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::ttrpg::entity::ActionDescriptor;
    use rstest::rstest;

    fn chunk(text: &str) -> StatblockChunk {
        StatblockChunk::from_text(text)
    }

    #[rstest]
    #[case("Second Wind - Action: Clear 1d4 HP.", "Second Wind", FeatureForm::Action)]
    #[case("Thick Hide - Reaction", "Thick Hide", FeatureForm::Reaction)]
    #[case("Thick Hide", "Thick Hide", FeatureForm::Passive)]
    fn test_feature_header(#[case] text: &str, #[case] name: &str, #[case] form: FeatureForm) {
        let entity = parse_feature(&chunk(text)).unwrap();
        assert_eq!(entity.name, name);
        assert_eq!(entity.kind, EntityKind::Feature);
        let SystemData::Feature(system) = entity.system else {
            panic!("expected feature");
        };
        assert_eq!(system.form, form);
    }

    #[test]
    fn test_feature_description_is_annotated() {
        let entity = parse_feature(&chunk(
            "Fireball - Action: Spend a Hope.\nTargets take 2d8 magic damage.",
        ))
        .unwrap();
        assert_eq!(
            entity.description(),
            Some("<p>Spend a Hope.</p><p>Targets take [[/r 2d8]] magic damage.</p>")
        );
        assert_eq!(entity.actions().len(), 2);
        assert!(matches!(entity.actions()[1], ActionDescriptor::Damage { .. }));
    }

    #[test]
    fn test_domain_card() {
        let entity = parse_domain_card(&chunk(
            "Rune Ward\nLevel 1 Arcana Spell\nRecall Cost: 0\nYou have a deeply personal trinket.",
        ))
        .unwrap();
        assert_eq!(entity.name, "Rune Ward");
        let SystemData::DomainCard(card) = entity.system else {
            panic!("expected domain card");
        };
        assert_eq!(card.level, 1);
        assert_eq!(card.domain, "arcana");
        assert_eq!(card.card_type, CardType::Spell);
        assert_eq!(card.recall_cost, 0);
        assert_eq!(card.description, "<p>You have a deeply personal trinket.</p>");
    }

    #[test]
    fn test_domain_card_multiword_domain() {
        let entity = parse_domain_card(&chunk("Ward\nlevel 3 Bone and Blade ability\nRecall Cost: 2")).unwrap();
        let SystemData::DomainCard(card) = entity.system else {
            panic!("expected domain card");
        };
        assert_eq!(card.domain, "bone and blade");
        assert_eq!(card.card_type, CardType::Ability);
        assert_eq!(card.description, "");
    }

    #[rstest]
    #[case("Rune Ward", 2)]
    #[case("Rune Ward\nLevel one Arcana Spell\nRecall Cost: 0", 2)]
    #[case("Rune Ward\nLevel 1 Arcana Spell", 3)]
    #[case("Rune Ward\nLevel 1 Arcana Spell\nRecall: 1", 3)]
    fn test_domain_card_line_failures(#[case] text: &str, #[case] expected_line: usize) {
        match parse_domain_card(&chunk(text)) {
            Err(ParseError::DomainCardLine { line, .. }) => assert_eq!(line, expected_line),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_simple_item() {
        let entity = parse_simple_item(
            &chunk("Minor Health Potion\nClear 1d4 HP."),
            EntityKind::Consumable,
        )
        .unwrap();
        assert_eq!(entity.name, "Minor Health Potion");
        assert_eq!(entity.kind, EntityKind::Consumable);
        assert_eq!(entity.description(), Some("<p>Clear [[/r 1d4]] HP.</p>"));
        assert!(entity.actions().is_empty());
    }

    #[test]
    fn test_empty_chunks() {
        assert_eq!(parse_feature(&chunk("")), Err(ParseError::EmptyChunk));
        assert_eq!(parse_domain_card(&chunk(" ")), Err(ParseError::EmptyChunk));
        assert_eq!(parse_simple_item(&chunk(""), EntityKind::Loot), Err(ParseError::EmptyChunk));
    }
}
