use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::ingestion::ttrpg::importer::ImportOptions;
use crate::ingestion::ttrpg::splitter::SeparatorMode;
use crate::ingestion::ttrpg::vocabulary::EntityKind;

/// Prefix for environment overrides; `__` separates nested keys
/// (`DH_STATBLOCK_IMPORT__SEPARATOR_MODE=separator`).
pub const ENV_PREFIX: &str = "DH_STATBLOCK_";

/// Top-level importer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImporterConfig {
    pub import: ImportConfig,
    pub compendium: CompendiumConfig,
    pub folders: FoldersConfig,
    /// Verbose per-chunk logging.
    pub debug: bool,
}

/// How pasted text is split and parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub separator_mode: SeparatorMode,
    pub default_kind: EntityKind,
}

/// Index files consulted for feature and adversary lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompendiumConfig {
    pub feature_indexes: Vec<PathBuf>,
    pub adversary_indexes: Vec<PathBuf>,
}

/// Folder names new documents are filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoldersConfig {
    pub adversary: String,
    pub environment: String,
    pub item: String,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            import: ImportConfig::default(),
            compendium: CompendiumConfig::default(),
            folders: FoldersConfig::default(),
            debug: false,
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            separator_mode: SeparatorMode::BlankLine,
            default_kind: EntityKind::Adversary,
        }
    }
}

impl Default for FoldersConfig {
    fn default() -> Self {
        Self {
            adversary: "💀 Imported Adversaries".to_string(),
            environment: "🏰 Imported Environments".to_string(),
            item: "📦 Imported Items".to_string(),
        }
    }
}

impl FoldersConfig {
    /// Folder for a document of the given kind.
    pub fn for_kind(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::Adversary => &self.adversary,
            EntityKind::Environment => &self.environment,
            _ => &self.item,
        }
    }
}

impl ImporterConfig {
    /// Load defaults, then `~/.config/dh-statblock/config.toml`, then
    /// `DH_STATBLOCK_*` environment variables. A missing file means defaults.
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, figment::Error> {
        if path.exists() {
            log::info!("Loading config from {}", path.display());
        } else {
            log::debug!("No config file at {}, using defaults", path.display());
        }

        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
    }

    /// Options for one import run, with an optional kind override.
    pub fn import_options(&self, kind: Option<EntityKind>) -> ImportOptions {
        ImportOptions {
            kind: kind.unwrap_or(self.import.default_kind),
            separator_mode: self.import.separator_mode,
            folders: self.folders.clone(),
        }
    }

    /// Directory for rolling log files.
    pub fn log_dir() -> PathBuf {
        dirs::data_dir()
            .map(|d| d.join("dh-statblock").join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs"))
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("dh-statblock").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
