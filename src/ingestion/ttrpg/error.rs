//! Chunk-scoped parse failures.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::vocabulary::EntityKind;

/// Why one chunk could not be turned into an entity.
///
/// Structural failures (empty chunk, missing anchors) and validation failures
/// (subtype outside its closed set) both end processing of that chunk only.
/// A field whose pattern simply does not match is never an error.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ParseError {
    #[error("Text content is empty.")]
    #[diagnostic(code("DH::EMPTY_CHUNK"), help("Paste at least a name line"))]
    EmptyChunk,

    #[error("Invalid {kind} type: \"{raw}\". Valid types are: {valid}")]
    #[diagnostic(
        code("DH::INVALID_SUBTYPE"),
        help("The word after `Tier N` must be one of the listed types")
    )]
    InvalidSubtype {
        kind: EntityKind,
        raw: String,
        valid: String,
    },

    #[error("Could not find the {kind} header. Expected: {expected}")]
    #[diagnostic(code("DH::MISSING_ANCHOR"), help("Expected token order: {expected}"))]
    MissingAnchor { kind: EntityKind, expected: String },

    #[error("Domain card line {line} is missing or malformed. Expected: {expected}")]
    #[diagnostic(code("DH::DOMAIN_CARD_LINE"), help("Expected line {line}: {expected}"))]
    DomainCardLine { line: usize, expected: String },
}

/// The caller-visible record of a skipped chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkFailure {
    /// 1-based position of the chunk in the batch.
    pub chunk_index: usize,
    /// First line of the chunk, or `"Unknown"`.
    pub first_line_excerpt: String,
    pub message: String,
}

impl ChunkFailure {
    pub fn new(chunk_index: usize, chunk_text: &str, error: &ParseError) -> Self {
        let first_line_excerpt = chunk_text
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("Unknown")
            .to_string();

        Self {
            chunk_index,
            first_line_excerpt,
            message: error.to_string(),
        }
    }
}
