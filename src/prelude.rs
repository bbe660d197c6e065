//! Prelude module for common compositor types and traits
//!
//! Re-exports the types a rendering host needs for a frame, for easy
//! importing with `use maplet_compositor::prelude::*;`

pub use crate::core::{
    bounds::{PixelPoint, PixelRect},
    config::{CompositorOptions, CompositorProfile},
    geo::TileCoord,
    viewport::FrameProjection,
    world::{half_world, to_screen_space, to_world_space, world_size},
};

pub use crate::layers::tile::{
    capacity::CapacityAdvisor,
    layer::{FrameStats, TilesOverlay},
    placeholder::{PlaceholderError, PlaceholderTile},
};

pub use crate::rendering::{
    color::SerializableColor,
    context::{DrawCommand, RenderContext},
    raster::RasterSurface,
    surface::DrawSurface,
};

pub use crate::tiles::{
    cache::TileCache,
    grid::{TilePlacement, TilePlacements, TileRange},
    tile_image::{PinGuard, Pinnable, ReusableTile, TileImage},
    source::TileProvider,
};

pub use crate::{Error as MapError, Result};

pub use std::sync::{Arc, Mutex};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};

pub use image::RgbaImage;
