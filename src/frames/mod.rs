//! Frame store: extracted frames on disk, one directory per video identity.

/// Frame file naming and listing.
pub mod naming;
/// Extraction and frame directory access.
pub mod store;
