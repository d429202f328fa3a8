//! Caption burn-in: layout, text shaping, rasterization and compositing.

/// Per-frame caption renderer.
pub mod caption;
/// Pixel compositing helpers for opaque RGB frames.
pub mod composite;
/// Font scaling, word wrapping and panel geometry.
pub mod layout;
/// Font loading and Parley line shaping.
pub mod text;
