/// dh-statblock - Daggerheart statblock importer
///
/// Core library turning pasted adversary, environment and item statblocks
/// into structured records and host documents.

pub mod config;
pub mod core;
pub mod ingestion;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
