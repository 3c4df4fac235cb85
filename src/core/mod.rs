/// Declared and inferred columns and their mapping to field indexes.
pub mod column;

/// Reader options.
pub mod config;

/// Header line detection.
pub mod header;

/// The item reader contract.
pub mod item;

/// Typed rows and cell values.
pub mod row;
