//! Text ingestion: turning pasted rulebook text into structured records.

pub mod ttrpg;
