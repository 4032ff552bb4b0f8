//! Host Document Conversion
//!
//! Renders a [`ParsedEntity`] as the JSON document the host's create API
//! accepts: default image per kind, configured folder, the kind-specific
//! `system` object and nested feature items. Keyed collections (experiences,
//! potential-adversary groups, actions) get fresh 16-character ids.

use serde_json::{json, Map, Value};

use super::dice_extractor::DiceFormula;
use super::entity::{
    ActionDescriptor, AdversarySystem, ArmorSystem, DamagePart, DamageValue, DomainCardSystem,
    EnvironmentSystem, FeatureRecord, FeatureSource, FeatureSystem, ParsedEntity, SimpleItemSystem,
    SystemData, WeaponSystem,
};
use super::importer::ImportOptions;
use super::vocabulary::EntityKind;

// ============================================================================
// Host Constants
// ============================================================================

pub const ADVERSARY_IMAGE: &str = "modules/dh-statblock-importer/assets/images/skull.webp";
pub const ENVIRONMENT_IMAGE: &str = "icons/environment/wilderness/cave-entrance.webp";
pub const WEAPON_IMAGE: &str = "systems/daggerheart/assets/icons/documents/items/battered-axe.svg";
pub const ARMOR_IMAGE: &str = "systems/daggerheart/assets/icons/documents/items/chest-armor.svg";
pub const FEATURE_IMAGE: &str = "systems/daggerheart/assets/icons/documents/items/stars-stack.svg";
pub const DOMAIN_CARD_IMAGE: &str = "systems/daggerheart/assets/icons/documents/items/card-play.svg";
pub const CONSUMABLE_IMAGE: &str = "systems/daggerheart/assets/icons/documents/items/round-potion.svg";
pub const LOOT_IMAGE: &str = "systems/daggerheart/assets/icons/documents/items/open-treasure-chest.svg";

/// Feature items nested in an adversary.
pub const ADVERSARY_FEATURE_IMAGE: &str = "icons/magic/symbols/star-solid-gold.webp";
pub const ADVERSARY_ATTACK_IMAGE: &str = "icons/magic/death/skull-humanoid-white-blue.webp";
pub const WEAPON_ATTACK_IMAGE: &str = "icons/skills/melee/blood-slash-foam-red.webp";

pub const ADVERSARY_FOLDER_COLOR: &str = "#430047";
pub const ENVIRONMENT_FOLDER_COLOR: &str = "#2a3d00";

pub const FLAG_SCOPE: &str = "dhImporter";

pub fn default_image(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Adversary => ADVERSARY_IMAGE,
        EntityKind::Environment => ENVIRONMENT_IMAGE,
        EntityKind::Weapon => WEAPON_IMAGE,
        EntityKind::Armor => ARMOR_IMAGE,
        EntityKind::Feature => FEATURE_IMAGE,
        EntityKind::DomainCard => DOMAIN_CARD_IMAGE,
        EntityKind::Consumable => CONSUMABLE_IMAGE,
        EntityKind::Loot => LOOT_IMAGE,
    }
}

/// Folder color for actor folders; item folders have none.
pub fn folder_color(kind: EntityKind) -> Option<&'static str> {
    match kind {
        EntityKind::Adversary => Some(ADVERSARY_FOLDER_COLOR),
        EntityKind::Environment => Some(ENVIRONMENT_FOLDER_COLOR),
        _ => None,
    }
}

/// A 16-character document id.
pub fn random_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(16);
    id
}

// ============================================================================
// Conversion
// ============================================================================

pub fn to_document(entity: &ParsedEntity, options: &ImportOptions) -> Value {
    let system = match &entity.system {
        SystemData::Adversary(s) => adversary_system(s),
        SystemData::Environment(s) => environment_system(s),
        SystemData::Weapon(s) => weapon_system(s),
        SystemData::Armor(s) => armor_system(s),
        SystemData::Feature(s) => feature_system(s),
        SystemData::DomainCard(s) => domain_card_system(s),
        SystemData::Item(s) => simple_item_system(s),
    };

    let mut document = json!({
        "name": entity.name,
        "type": entity.kind.as_str(),
        "img": default_image(entity.kind),
        "folder": options.folders.for_kind(entity.kind),
        "system": system,
        "flags": { FLAG_SCOPE: { "isCompendium": false } },
    });
    if let Some(color) = folder_color(entity.kind) {
        document["flags"][FLAG_SCOPE]["folderColor"] = color.into();
    }

    if entity.kind.is_actor() {
        let feature_image = match entity.kind {
            EntityKind::Environment => ENVIRONMENT_IMAGE,
            _ => ADVERSARY_FEATURE_IMAGE,
        };
        document["items"] = entity
            .features
            .iter()
            .map(|f| feature_item(f, feature_image))
            .collect();
    }
    document
}

fn insert_some<T: Into<Value>>(map: &mut Map<String, Value>, key: &str, value: Option<T>) {
    if let Some(v) = value {
        map.insert(key.to_string(), v.into());
    }
}

fn adversary_system(s: &AdversarySystem) -> Value {
    let mut map = Map::new();
    insert_some(&mut map, "tier", s.tier);
    insert_some(&mut map, "type", s.subtype.map(|t| t.key()));
    insert_some(&mut map, "hordeHp", s.horde_hp);
    insert_some(&mut map, "difficulty", s.difficulty);
    insert_some(
        &mut map,
        "damageThresholds",
        s.damage_thresholds
            .map(|t| json!({ "major": t.major, "severe": t.severe })),
    );
    insert_some(&mut map, "description", s.description.clone());
    insert_some(&mut map, "motivesAndTactics", s.motives_and_tactics.clone());

    let mut hit_points = json!({ "value": 0 });
    if let Some(max) = s.hit_points {
        hit_points["max"] = max.into();
    }
    let mut stress = json!({ "value": 0 });
    if let Some(max) = s.stress {
        stress["max"] = max.into();
    }
    map.insert("resources".into(), json!({ "hitPoints": hit_points, "stress": stress }));

    let mut attack = json!({
        "img": ADVERSARY_ATTACK_IMAGE,
        "roll": {},
        "damage": {
            "parts": s.attack.damage.iter().map(|d| damage_part(d, "flat")).collect::<Vec<_>>(),
            "includeBase": false,
            "direct": false,
        },
    });
    if let Some(name) = &s.attack.name {
        attack["name"] = name.as_str().into();
    }
    if let Some(range) = s.attack.range {
        attack["range"] = range.key().into();
    }
    if let Some(bonus) = s.attack.bonus {
        attack["roll"]["bonus"] = bonus.into();
    }
    map.insert("attack".into(), attack);

    let experiences: Map<String, Value> = s
        .experiences
        .iter()
        .map(|e| {
            (
                random_id(),
                json!({ "name": e.name, "value": e.value, "description": "" }),
            )
        })
        .collect();
    map.insert("experiences".into(), Value::Object(experiences));
    map.insert("actions".into(), actions_map(&s.actions));

    Value::Object(map)
}

fn environment_system(s: &EnvironmentSystem) -> Value {
    let mut map = Map::new();
    insert_some(&mut map, "tier", s.tier);
    insert_some(&mut map, "type", s.subtype.map(|t| t.key()));
    insert_some(&mut map, "difficulty", s.difficulty);
    insert_some(&mut map, "description", s.description.clone());
    insert_some(&mut map, "impulses", s.impulses.clone());
    insert_some(&mut map, "notes", s.notes.clone());

    if s.notes.is_some() {
        let groups: Map<String, Value> = s
            .potential_adversaries
            .iter()
            .map(|g| (random_id(), json!({ "label": g.label, "adversaries": g.adversaries })))
            .collect();
        map.insert("potentialAdversaries".into(), Value::Object(groups));
    }
    map.insert("actions".into(), actions_map(&s.actions));
    Value::Object(map)
}

fn weapon_system(s: &WeaponSystem) -> Value {
    json!({
        "tier": s.tier.unwrap_or(1),
        "burden": s.burden.key(),
        "description": s.description,
        "actions": actions_map(&s.actions),
        "attack": {
            "name": "Attack",
            "img": WEAPON_ATTACK_IMAGE,
            "type": "attack",
            "range": s.range.key(),
            "roll": { "trait": s.attack_trait.key(), "type": "attack" },
            "damage": {
                "parts": [damage_part(&s.damage, "prof")],
                "includeBase": false,
                "direct": s.damage.direct,
            },
        },
    })
}

fn armor_system(s: &ArmorSystem) -> Value {
    json!({
        "tier": s.tier.unwrap_or(1),
        "baseScore": s.base_score,
        "baseThresholds": { "major": s.base_thresholds.major, "severe": s.base_thresholds.severe },
        "description": s.description,
        "actions": actions_map(&s.actions),
    })
}

fn feature_system(s: &FeatureSystem) -> Value {
    json!({
        "featureForm": s.form.key(),
        "description": s.description,
        "actions": actions_map(&s.actions),
    })
}

fn domain_card_system(s: &DomainCardSystem) -> Value {
    json!({
        "level": s.level,
        "domain": s.domain,
        "type": s.card_type.key(),
        "recallCost": s.recall_cost,
        "description": s.description,
        "actions": actions_map(&s.actions),
    })
}

fn simple_item_system(s: &SimpleItemSystem) -> Value {
    json!({
        "description": s.description,
        "quantity": 1,
        "actions": actions_map(&s.actions),
    })
}

fn feature_item(feature: &FeatureRecord, img: &str) -> Value {
    let flags = match &feature.source {
        FeatureSource::Compendium { id } => json!({ "isCompendium": true, "sourceUuid": id }),
        FeatureSource::Authored => json!({ "isCompendium": false }),
    };
    json!({
        "name": feature.name,
        "type": "feature",
        "img": img,
        "system": {
            "featureForm": feature.form.key(),
            "description": feature.description,
            "actions": actions_map(&feature.actions),
        },
        "flags": { FLAG_SCOPE: flags },
    })
}

// ============================================================================
// Damage and Actions
// ============================================================================

fn dice_value(formula: &DiceFormula, multiplier: &str) -> Value {
    json!({
        "multiplier": multiplier,
        "flatMultiplier": formula.count,
        "dice": formula.die(),
        "bonus": formula.bonus,
        "custom": { "enabled": false, "formula": "" },
    })
}

fn damage_value(value: &DamageValue, multiplier: &str) -> Value {
    match value {
        DamageValue::Dice(formula) => dice_value(formula, multiplier),
        DamageValue::Custom(formula) => json!({
            "multiplier": "flat",
            "flatMultiplier": 1,
            "dice": "d6",
            "bonus": null,
            "custom": { "enabled": true, "formula": formula },
        }),
    }
}

/// One damage part. `multiplier` is `flat` for adversaries and `prof` for
/// weapons; the horde alternate is always flat.
pub fn damage_part(part: &DamagePart, multiplier: &str) -> Value {
    let mut value = json!({
        "type": part.types.iter().map(|t| t.key()).collect::<Vec<_>>(),
        "value": damage_value(&part.value, multiplier),
        "applyTo": part.applies_to.key(),
    });
    if let Some(alt) = &part.value_alt {
        value["valueAlt"] = damage_value(alt, "flat");
    }
    value
}

fn action_value(action: &ActionDescriptor) -> Value {
    let id = random_id();
    let name = action.label();
    match action {
        ActionDescriptor::Effect { cost } => json!({
            "_id": id,
            "type": "effect",
            "name": name,
            "actionType": "action",
            "cost": [{ "key": cost.key.key(), "value": cost.value }],
        }),
        ActionDescriptor::Attack { save: Some(save) } => json!({
            "_id": id,
            "type": "attack",
            "name": name,
            "actionType": "action",
            "save": {
                "trait": save.save_trait.key(),
                "difficulty": save.difficulty,
                "damageMod": "none",
            },
        }),
        ActionDescriptor::Attack { save: None } => json!({
            "_id": id,
            "type": "attack",
            "name": name,
            "actionType": "action",
            "roll": { "type": "attack" },
        }),
        ActionDescriptor::Damage {
            formula,
            damage_type,
            direct,
        } => json!({
            "_id": id,
            "type": "damage",
            "name": name,
            "actionType": "action",
            "damage": {
                "parts": [{
                    "type": [damage_type.key()],
                    "value": dice_value(formula, "flat"),
                    "applyTo": "hitPoints",
                }],
                "direct": direct,
            },
        }),
    }
}

/// Actions keyed by their own `_id`.
fn actions_map(actions: &[ActionDescriptor]) -> Value {
    let map: Map<String, Value> = actions
        .iter()
        .map(|action| {
            let value = action_value(action);
            let id = value["_id"].as_str().unwrap_or_default().to_string();
            (id, value)
        })
        .collect();
    Value::Object(map)
}

// ============================================================================
// Tests
// ============================================================================
