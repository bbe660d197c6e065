//! # maplet-compositor
//!
//! The tile-compositing core of a slippy-map renderer.
//!
//! Each frame the compositor maps the viewport onto the wrapping Web Mercator
//! tile grid, asks the tile provider to size its cache, resolves every visible
//! tile and draws it into its world-aligned slot on a [`DrawSurface`]. Tiles
//! that are not ready yet are covered by a checkerboard placeholder, and tiles
//! that live in a recycling pool are pinned for the duration of the draw.

pub mod core;
pub mod layers;
pub mod prelude;
pub mod rendering;
pub mod tiles;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    bounds::{PixelPoint, PixelRect},
    config::{CompositorOptions, CompositorProfile},
    geo::TileCoord,
    viewport::FrameProjection,
};

pub use layers::tile::{
    capacity::CapacityAdvisor,
    layer::{FrameStats, TilesOverlay},
    placeholder::{PlaceholderError, PlaceholderTile},
};

pub use rendering::{
    color::SerializableColor, context::RenderContext, raster::RasterSurface, surface::DrawSurface,
};

pub use tiles::{
    cache::TileCache,
    grid::{TilePlacement, TileRange},
    tile_image::{PinGuard, Pinnable, ReusableTile, TileImage},
    source::TileProvider,
};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error type alias for convenience
pub type Error = MapError;
