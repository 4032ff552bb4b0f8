//! End-to-end import tests: paste text in, outcomes and host documents out.
//!
//! Run with:
//!   cargo test --test batch_import

use std::io::Write;

use dh_statblock::core::compendium::CompendiumIndex;
use dh_statblock::ingestion::ttrpg::document::to_document;
use dh_statblock::ingestion::ttrpg::entity::{AdversaryGroupRef, FeatureSource};
use dh_statblock::ingestion::ttrpg::preview::render_preview;
use dh_statblock::ingestion::ttrpg::{
    import_text, ChunkOutcome, EntityKind, ImportOptions, SeparatorMode, SystemData,
};
use tempfile::TempDir;

const ADVERSARY_PASTE: &str = "\
Acid Burrower
Tier 1 Solo
A horse-sized insect with digging claws and acidic blood.
Motives & Tactics: Burrow, drag away, feed, reposition
Difficulty: 14 | Thresholds: 8/15 | HP: 8 | Stress: 3
ATK: +3 | Claws: Very Close | 1d12+2 phy
Experience: Tremor Sense +2
FEATURES
Relentless (3) - Passive: The Burrower can be spotlighted up to three times per GM turn.
Spit Acid - Action: Make an attack against all targets in front of the Acid Burrower. Targets take 2d6 physical damage.

Dragon
Tier 3 Wizard
HP: 12

Giant Rats
Tier 1 Horde (3/HP)
Difficulty: 10 | Thresholds: 4/7 | HP: 6 | Stress: 1
ATK: -4 | Claws: Melee | 1d6+1 phy
FEATURES
Horde (1d4+1) - Passive: When half or more HP are marked, the rats deal 1d4+1 instead.";

fn write_index(dir: &TempDir, name: &str, json: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("Failed to create index file");
    file.write_all(json.as_bytes()).expect("Failed to write index file");
    path
}

#[test]
fn test_two_loot_items_separated_by_blank_line() {
    let report = import_text(
        "Bag of Holding\nHolds more than it should.\n\nEverburning Torch\nNever goes out.",
        &ImportOptions::new(EntityKind::Loot),
        &CompendiumIndex::new(),
    );

    assert_eq!(report.total(), 2);
    let names: Vec<_> = report.successes().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Bag of Holding", "Everburning Torch"]);
    assert_eq!(report.summary(), "Successfully imported 2/2 items.");
}

#[test]
fn test_failing_chunk_does_not_stop_batch() {
    let report = import_text(ADVERSARY_PASTE, &ImportOptions::default(), &CompendiumIndex::new());
    assert_eq!(report.total(), 3);

    let statuses: Vec<bool> = report
        .outcomes
        .iter()
        .map(|o| matches!(o, ChunkOutcome::Success { .. }))
        .collect();
    assert_eq!(statuses, vec![true, false, true]);

    let failure = report.failures().next().unwrap();
    assert_eq!(failure.chunk_index, 2);
    assert_eq!(failure.first_line_excerpt, "Dragon");

    let rats = report.successes().nth(1).unwrap();
    let SystemData::Adversary(system) = &rats.system else {
        panic!("expected adversary");
    };
    assert_eq!(system.horde_hp, Some(3));
    assert!(system.attack.damage.as_ref().unwrap().value_alt.is_some());
}

#[test]
fn test_separator_mode_for_actors() {
    let text = "Bear\nTier 1 Bruiser\nHP: 7\n===\nWolf\nTier 1 Skulk\nHP: 4";
    let options = ImportOptions::default().with_separator(SeparatorMode::Separator);
    let report = import_text(text, &options, &CompendiumIndex::new());
    let names: Vec<_> = report.successes().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Bear", "Wolf"]);
}

#[test]
fn test_compendium_feature_precedence() {
    let dir = TempDir::new().unwrap();
    let core = write_index(
        &dir,
        "core.json",
        r#"[
            { "uuid": "Compendium.dh.features.Item.core", "name": "Relentless (3)", "type": "feature",
              "system": { "featureForm": "passive", "description": "<p>Core text.</p>" } },
            { "uuid": "Compendium.dh.adversaries.Actor.bear", "name": "Bear", "type": "adversary" }
        ]"#,
    );
    let homebrew = write_index(
        &dir,
        "homebrew.json",
        r#"[
            { "uuid": "Compendium.world.features.Item.hb", "name": "relentless (3)", "type": "feature",
              "system": { "featureForm": "passive", "description": "<p>Homebrew text.</p>" } }
        ]"#,
    );

    let index = CompendiumIndex::load(&[core.clone(), homebrew], &[core]).unwrap();
    assert_eq!(index.feature_count(), 1);
    assert_eq!(index.adversary_count(), 1);

    let report = import_text(ADVERSARY_PASTE, &ImportOptions::default(), &index);
    let burrower = report.successes().next().unwrap();

    let relentless = &burrower.features[0];
    assert_eq!(
        relentless.source,
        FeatureSource::Compendium {
            id: "Compendium.world.features.Item.hb".to_string()
        }
    );
    assert_eq!(relentless.description, "<p>Homebrew text.</p>");
    assert_eq!(burrower.features[1].source, FeatureSource::Authored);

    let document = to_document(burrower, &ImportOptions::default());
    assert_eq!(document["items"][0]["flags"]["dhImporter"]["isCompendium"], true);
    assert_eq!(
        document["items"][0]["flags"]["dhImporter"]["sourceUuid"],
        "Compendium.world.features.Item.hb"
    );
    assert_eq!(document["items"][1]["flags"]["dhImporter"]["isCompendium"], false);
}

#[test]
fn test_missing_index_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.json");
    assert!(CompendiumIndex::load(&[missing], &[]).is_err());
}

#[test]
fn test_environment_potential_adversaries() {
    let mut index = CompendiumIndex::new();
    index.insert_adversary("bear-id", "Bear");
    index.insert_adversary("wolf-id", "Dire Wolf");

    let report = import_text(
        "Abandoned Grove\nTier 1 Exploration\nA former druidic grove.\nImpulses: Draw in the curious\nDifficulty: 11\nPotential Adversaries: Beasts (Bear, Dire Wolf, Owlbear), Sylvan Soldiers (Glass Snake)",
        &ImportOptions::new(EntityKind::Environment),
        &index,
    );
    let grove = report.successes().next().unwrap();
    let SystemData::Environment(system) = &grove.system else {
        panic!("expected environment");
    };

    assert_eq!(
        system.potential_adversaries,
        vec![AdversaryGroupRef {
            label: "Beasts".to_string(),
            adversaries: vec!["bear-id".to_string(), "wolf-id".to_string()],
        }]
    );
    assert_eq!(grove.adversary_report.len(), 2);

    let preview = render_preview(&report);
    assert!(preview.contains("Beasts: 2 linked (not found: Owlbear)"));
    assert!(preview.contains("Sylvan Soldiers: 0 linked (not found: Glass Snake)"));

    let document = to_document(grove, &ImportOptions::new(EntityKind::Environment));
    assert_eq!(document["type"], "environment");
    assert_eq!(document["folder"], "🏰 Imported Environments");
    let groups = document["system"]["potentialAdversaries"].as_object().unwrap();
    assert_eq!(groups.len(), 1);
    let key = groups.keys().next().unwrap();
    assert_eq!(key.len(), 16);
}

#[test]
fn test_mixed_item_kinds_through_documents() {
    let index = CompendiumIndex::new();

    let weapons = import_text(
        "Tier 1 Broadsword Agility Melee d8 phy One-Handed Reliable: +1 to attack rolls\n\nArcane Staff Knowledge Very Far 2d6+3 mag Two-Handed",
        &ImportOptions::new(EntityKind::Weapon),
        &index,
    );
    assert_eq!(weapons.successes().count(), 2);
    let staff = to_document(weapons.successes().nth(1).unwrap(), &ImportOptions::new(EntityKind::Weapon));
    assert_eq!(staff["type"], "weapon");
    assert_eq!(staff["folder"], "📦 Imported Items");
    assert_eq!(staff["system"]["burden"], "twoHanded");
    let part = &staff["system"]["attack"]["damage"]["parts"][0];
    assert_eq!(part["value"]["multiplier"], "prof");
    assert_eq!(part["value"]["dice"], "d6");
    assert_eq!(part["value"]["bonus"], 3);

    let cards = import_text(
        "Rune Ward\nLevel 1 Arcana Spell\nRecall Cost: 0\nMark a Stress to reduce incoming damage.",
        &ImportOptions::new(EntityKind::DomainCard),
        &index,
    );
    let card = to_document(cards.successes().next().unwrap(), &ImportOptions::new(EntityKind::DomainCard));
    assert_eq!(card["system"]["domain"], "arcana");
    assert_eq!(card["system"]["recallCost"], 0);
    assert_eq!(card["system"]["actions"].as_object().unwrap().len(), 1);
}

#[test]
fn test_domain_card_line_errors_are_isolated() {
    let report = import_text(
        "Rune Ward\nLevel one Arcana\n\nBlink\nLevel 2 Arcana Spell\nRecall Cost: 1",
        &ImportOptions::new(EntityKind::DomainCard),
        &CompendiumIndex::new(),
    );
    assert_eq!(report.total(), 2);
    let failure = report.failures().next().unwrap();
    assert_eq!(failure.chunk_index, 1);
    assert_eq!(report.successes().next().unwrap().name, "Blink");
}
