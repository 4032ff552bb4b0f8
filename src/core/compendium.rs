//! Compendium Name Indices
//!
//! Pre-fetched, case-insensitive name indices the parsers consult while
//! extracting: features (to reuse a published body verbatim) and adversaries
//! (to link an environment's potential adversaries).
//!
//! Index files are JSON arrays of compendium index entries:
//!
//! ```json
//! [
//!   { "uuid": "Compendium.dh.features.Item.abc", "name": "Relentless (3)", "type": "feature",
//!     "system": { "featureForm": "passive", "description": "<p>...</p>" } },
//!   { "uuid": "Compendium.dh.adversaries.Actor.xyz", "name": "Bear", "type": "adversary" }
//! ]
//! ```

use indexmap::IndexMap;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ingestion::ttrpg::vocabulary::FeatureForm;

// ============================================================================
// Lookup Traits
// ============================================================================

/// Resolves a feature by exact, case-insensitive name.
pub trait FeatureLookup {
    fn find_feature(&self, name: &str) -> Option<&CompendiumFeature>;
}

/// Resolves an adversary id by exact, case-insensitive name.
pub trait AdversaryLookup {
    fn find_adversary(&self, name: &str) -> Option<&str>;
}

/// Maps an adversary id back to its display name.
pub trait AdversaryNames {
    fn adversary_name(&self, id: &str) -> Option<&str>;
}

// ============================================================================
// Types
// ============================================================================

/// A published feature, used verbatim on a name hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompendiumFeature {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub form: FeatureForm,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CompendiumAdversary {
    id: String,
    name: String,
}

#[derive(Debug, Error, Diagnostic)]
pub enum IndexError {
    #[error("Failed to read compendium index {path}: {source}")]
    #[diagnostic(code("DH::INDEX_IO"), help("Check that the index file exists and is readable"))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse compendium index {path}: {source}")]
    #[diagnostic(
        code("DH::INDEX_FORMAT"),
        help("An index file is a JSON array of entries with uuid, name and type")
    )]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Raw index entry as exported by the host.
#[derive(Debug, Deserialize)]
struct IndexEntry {
    #[serde(default)]
    uuid: Option<String>,
    #[serde(default, alias = "_id")]
    id: Option<String>,
    name: String,
    #[serde(rename = "type")]
    entry_type: String,
    #[serde(default)]
    system: Option<IndexEntrySystem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexEntrySystem {
    #[serde(default)]
    feature_form: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

// ============================================================================
// Index
// ============================================================================

/// Feature and adversary name indices merged from any number of files.
///
/// A later feature with the same name replaces an earlier one. For
/// adversaries the first entry holding a name is kept.
#[derive(Debug, Clone, Default)]
pub struct CompendiumIndex {
    features: IndexMap<String, CompendiumFeature>,
    adversaries: IndexMap<String, CompendiumAdversary>,
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

impl CompendiumIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build both indices from the configured feature and adversary files.
    pub fn load<P: AsRef<Path>>(feature_files: &[P], adversary_files: &[P]) -> Result<Self, IndexError> {
        let mut index = Self::new();
        for path in feature_files {
            index.load_features(path.as_ref())?;
        }
        for path in adversary_files {
            index.load_adversaries(path.as_ref())?;
        }
        Ok(index)
    }

    /// Add the `feature` entries of one index file.
    pub fn load_features(&mut self, path: &Path) -> Result<usize, IndexError> {
        let entries = read_entries(path)?;
        let added = self.add_feature_entries(entries);
        log::info!("Loaded {} features from {}", added, path.display());
        Ok(added)
    }

    /// Add the `adversary` entries of one index file.
    pub fn load_adversaries(&mut self, path: &Path) -> Result<usize, IndexError> {
        let entries = read_entries(path)?;
        let added = self.add_adversary_entries(entries);
        log::info!("Loaded {} adversaries from {}", added, path.display());
        Ok(added)
    }

    /// Parse an index document held in memory; both entry types are kept.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let entries: Vec<IndexEntry> = serde_json::from_str(json)?;
        let (features, adversaries): (Vec<_>, Vec<_>) =
            entries.into_iter().partition(|e| e.entry_type == "feature");

        let mut index = Self::new();
        index.add_feature_entries(features);
        index.add_adversary_entries(adversaries);
        Ok(index)
    }

    fn add_feature_entries(&mut self, entries: Vec<IndexEntry>) -> usize {
        let mut added = 0;
        for entry in entries.into_iter().filter(|e| e.entry_type == "feature") {
            let Some(id) = entry.uuid.or(entry.id) else {
                log::warn!("Skipping feature '{}' without an id", entry.name);
                continue;
            };
            let system = entry.system.unwrap_or_default();
            self.insert_feature(CompendiumFeature {
                id,
                name: entry.name,
                form: system
                    .feature_form
                    .as_deref()
                    .and_then(FeatureForm::from_word)
                    .unwrap_or_default(),
                description: system.description.unwrap_or_default(),
            });
            added += 1;
        }
        added
    }

    fn add_adversary_entries(&mut self, entries: Vec<IndexEntry>) -> usize {
        let mut added = 0;
        for entry in entries.into_iter().filter(|e| e.entry_type == "adversary") {
            let Some(id) = entry.uuid.or(entry.id) else {
                log::warn!("Skipping adversary '{}' without an id", entry.name);
                continue;
            };
            self.insert_adversary(id, entry.name);
            added += 1;
        }
        added
    }

    pub fn insert_feature(&mut self, feature: CompendiumFeature) {
        self.features.insert(name_key(&feature.name), feature);
    }

    pub fn insert_adversary(&mut self, id: impl Into<String>, name: impl Into<String>) {
        let name = name.into();
        self.adversaries
            .entry(name_key(&name))
            .or_insert_with(|| CompendiumAdversary { id: id.into(), name });
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn adversary_count(&self) -> usize {
        self.adversaries.len()
    }
}

fn read_entries(path: &Path) -> Result<Vec<IndexEntry>, IndexError> {
    let raw = fs::read_to_string(path).map_err(|source| IndexError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| IndexError::Format {
        path: path.to_path_buf(),
        source,
    })
}

impl FeatureLookup for CompendiumIndex {
    fn find_feature(&self, name: &str) -> Option<&CompendiumFeature> {
        self.features.get(&name_key(name))
    }
}

impl AdversaryLookup for CompendiumIndex {
    fn find_adversary(&self, name: &str) -> Option<&str> {
        self.adversaries.get(&name_key(name)).map(|a| a.id.as_str())
    }
}

impl AdversaryNames for CompendiumIndex {
    fn adversary_name(&self, id: &str) -> Option<&str> {
        self.adversaries
            .values()
            .find(|a| a.id == id)
            .map(|a| a.name.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const INDEX: &str = r#"[
        { "uuid": "f-1", "name": "Relentless (3)", "type": "feature",
          "system": { "featureForm": "passive", "description": "<p>Can be spotlighted three times.</p>" } },
        { "_id": "a-1", "name": "Bear", "type": "adversary" },
        { "uuid": "a-2", "name": "Wolf", "type": "adversary" },
        { "uuid": "x-1", "name": "Torch", "type": "loot" }
    ]"#;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let index = CompendiumIndex::from_json_str(INDEX).unwrap();
        assert_eq!(index.find_adversary("bear"), Some("a-1"));
        assert_eq!(index.find_adversary(" WOLF "), Some("a-2"));
        assert_eq!(index.find_adversary("Goblin"), None);

        let feature = index.find_feature("relentless (3)").unwrap();
        assert_eq!(feature.id, "f-1");
        assert_eq!(feature.form, FeatureForm::Passive);
    }

    #[test]
    fn test_other_types_ignored() {
        let index = CompendiumIndex::from_json_str(INDEX).unwrap();
        assert_eq!(index.feature_count(), 1);
        assert_eq!(index.adversary_count(), 2);
        assert!(index.find_feature("Torch").is_none());
    }

    #[test]
    fn test_collision_rules() {
        let mut index = CompendiumIndex::new();
        index.insert_adversary("first", "Bear");
        index.insert_adversary("second", "bear");
        assert_eq!(index.find_adversary("Bear"), Some("first"));

        for id in ["old", "new"] {
            index.insert_feature(CompendiumFeature {
                id: id.to_string(),
                name: "Pack Tactics".to_string(),
                form: FeatureForm::Passive,
                description: String::new(),
            });
        }
        assert_eq!(index.find_feature("pack tactics").map(|f| f.id.as_str()), Some("new"));
    }

    #[test]
    fn test_adversary_name_by_id() {
        let index = CompendiumIndex::from_json_str(INDEX).unwrap();
        assert_eq!(index.adversary_name("a-2"), Some("Wolf"));
        assert_eq!(index.adversary_name("nope"), None);
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(INDEX.as_bytes()).unwrap();

        let index = CompendiumIndex::load(&[&path], &[&path]).unwrap();
        assert_eq!(index.feature_count(), 1);
        assert_eq!(index.adversary_count(), 2);

        let missing = CompendiumIndex::load(&[dir.path().join("missing.json")], &[]);
        assert!(matches!(missing, Err(IndexError::Io { .. })));
    }
}
