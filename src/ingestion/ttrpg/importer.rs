//! Batch Import Pipeline
//!
//! Normalize, split and extract a whole paste. Every chunk produces exactly
//! one [`ChunkOutcome`]; a failing chunk never stops the batch.
//!
//! # Example
//!
//! ```ignore
//! use crate::ingestion::ttrpg::importer::{import_text, ImportOptions};
//!
//! let report = import_text(&pasted, &ImportOptions::default(), &index);
//! println!("{}", report.summary());
//! ```

use serde::{Deserialize, Serialize};

use super::entity::ParsedEntity;
use super::equipment::{parse_armor, parse_weapon};
use super::error::{ChunkFailure, ParseError};
use super::normalizer::normalize;
use super::simple_items::{parse_domain_card, parse_feature, parse_simple_item};
use super::splitter::{split, SeparatorMode, StatblockChunk};
use super::stat_block::StatBlockParser;
use super::vocabulary::EntityKind;
use crate::config::FoldersConfig;
use crate::core::compendium::CompendiumIndex;

// ============================================================================
// Types
// ============================================================================

/// Per-run settings handed to the pipeline. Read once, never consulted
/// mid-parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOptions {
    pub kind: EntityKind,
    pub separator_mode: SeparatorMode,
    pub folders: FoldersConfig,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            kind: EntityKind::Adversary,
            separator_mode: SeparatorMode::default(),
            folders: FoldersConfig::default(),
        }
    }
}

impl ImportOptions {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn with_separator(mut self, mode: SeparatorMode) -> Self {
        self.separator_mode = mode;
        self
    }
}

/// Result of one chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum ChunkOutcome {
    Success { entity: ParsedEntity },
    Failure { failure: ChunkFailure },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub kind: EntityKind,
    pub outcomes: Vec<ChunkOutcome>,
}

impl ImportReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_batch(&self) -> bool {
        self.outcomes.len() > 1
    }

    pub fn successes(&self) -> impl Iterator<Item = &ParsedEntity> {
        self.outcomes.iter().filter_map(|o| match o {
            ChunkOutcome::Success { entity } => Some(entity),
            ChunkOutcome::Failure { .. } => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = &ChunkFailure> {
        self.outcomes.iter().filter_map(|o| match o {
            ChunkOutcome::Failure { failure } => Some(failure),
            ChunkOutcome::Success { .. } => None,
        })
    }

    /// Import counts, one sentence per non-empty side.
    pub fn summary(&self) -> String {
        let imported = self.successes().count();
        let failed = self.failures().count();
        let noun = if self.kind.is_actor() { "actors" } else { "items" };

        let mut parts = Vec::new();
        if imported > 0 {
            parts.push(format!("Successfully imported {imported}/{} {noun}.", self.total()));
        }
        if failed > 0 {
            parts.push(format!("Failed to import {failed} statblock(s)."));
        }
        if parts.is_empty() {
            return "Nothing to import.".to_string();
        }
        parts.join(" ")
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Run the extractor for `kind` over one chunk.
pub fn parse_chunk(
    chunk: &StatblockChunk,
    kind: EntityKind,
    index: &CompendiumIndex,
) -> Result<ParsedEntity, ParseError> {
    match kind {
        EntityKind::Adversary | EntityKind::Environment => {
            StatBlockParser::new(index, index).parse(chunk, kind)
        }
        EntityKind::Weapon => parse_weapon(chunk),
        EntityKind::Armor => parse_armor(chunk),
        EntityKind::Feature => parse_feature(chunk),
        EntityKind::DomainCard => parse_domain_card(chunk),
        EntityKind::Loot | EntityKind::Consumable => parse_simple_item(chunk, kind),
    }
}

/// Import a whole paste.
pub fn import_text(text: &str, options: &ImportOptions, index: &CompendiumIndex) -> ImportReport {
    let normalized = normalize(text);
    let chunks = split(&normalized, options.separator_mode, options.kind);
    let total = chunks.len();

    log::debug!(
        "Starting import of {} statblock(s) as {}",
        total,
        options.kind
    );

    let outcomes = chunks
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let position = i + 1;
            log::debug!("Parsing block {}/{}", position, total);

            match parse_chunk(&StatblockChunk::from_text(raw), options.kind, index) {
                Ok(entity) => {
                    log::debug!(
                        "Parsed block {}: {} ({} features)",
                        position,
                        entity.name,
                        entity.features.len()
                    );
                    ChunkOutcome::Success { entity }
                }
                Err(err) => {
                    let failure = ChunkFailure::new(position, raw, &err);
                    log::warn!(
                        "Failed to import block {}: {} ({})",
                        position,
                        failure.first_line_excerpt,
                        failure.message
                    );
                    ChunkOutcome::Failure { failure }
                }
            }
        })
        .collect();

    let report = ImportReport {
        kind: options.kind,
        outcomes,
    };
    log::info!("{}", report.summary());
    report
}

// ============================================================================
// Tests
// ============================================================================
