//! Daggerheart Statblock Ingestion
//!
//! Parses statblocks pasted from Daggerheart rulebooks into structured
//! records:
//!
//! - adversaries and environments (`stat_block`, `feature_list`)
//! - weapons and armor (`equipment`)
//! - features, domain cards, loot and consumables (`simple_items`)
//!
//! A paste goes through `normalizer` and `splitter`, then one extractor per
//! chunk. `annotator` wraps dice in roll markers and derives actions from the
//! prose. `importer` drives the batch; `document`, `preview` and `export`
//! render the results.

pub mod annotator;
pub mod dice_extractor;
pub mod document;
pub mod entity;
pub mod equipment;
pub mod error;
pub mod export;
pub mod feature_list;
pub mod importer;
pub mod normalizer;
pub mod preview;
pub mod simple_items;
pub mod splitter;
pub mod stat_block;
pub mod stat_line;
pub mod vocabulary;

pub use dice_extractor::DiceFormula;
pub use entity::{ActionDescriptor, FeatureRecord, ParsedEntity, SystemData};
pub use error::{ChunkFailure, ParseError};
pub use importer::{import_text, parse_chunk, ChunkOutcome, ImportOptions, ImportReport};
pub use splitter::{SeparatorMode, StatblockChunk};
pub use vocabulary::EntityKind;
