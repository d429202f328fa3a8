//! Caption records, their persisted store, and the per-frame interval index.

/// Caption index with load-modify-save semantics.
pub mod index;
/// Persistence handles for the caption document.
pub mod persist;
/// Caption record and document types.
pub mod record;
/// Frame-to-text interval index.
pub mod timeline;
