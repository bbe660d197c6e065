//! Tile overlay: composites the visible tiles of a provider onto a drawing surface
//!
//! This module provides:
//! - Cache sizing ahead of each frame with a configurable overshoot
//! - A lazily built checkerboard placeholder for tiles still loading
//! - Pin-safe drawing of pooled tile images

pub mod capacity;
pub mod layer;
pub mod placeholder;

pub use capacity::CapacityAdvisor;
pub use layer::{FrameStats, TilesOverlay};
pub use placeholder::{PlaceholderError, PlaceholderTile};
