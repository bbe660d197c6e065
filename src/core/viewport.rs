use crate::core::{
    bounds::{PixelPoint, PixelRect},
    constants::{MAX_ZOOM_LEVEL, TILE_SIZE},
    world,
};
use serde::{Deserialize, Serialize};

/// The camera values a rendering host hands the compositor once per frame.
///
/// `screen_rect` is expressed in screen coordinates, where the world center sits at the
/// origin. The camera collaborator (pan, fling, pinch-zoom) owns how it is produced; the
/// compositor only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameProjection {
    /// The current integer zoom level
    pub zoom: u8,
    /// Visible area in screen pixels
    pub screen_rect: PixelRect,
    /// Tile edge length in pixels
    pub tile_size: u32,
}

impl FrameProjection {
    pub fn new(zoom: u8, screen_rect: PixelRect, tile_size: u32) -> Self {
        Self {
            zoom,
            screen_rect,
            tile_size,
        }
    }

    /// Builds the projection of a `width` × `height` view whose center is scrolled to
    /// `scroll`, the way a map view reports its scroll offset.
    pub fn centered_on(scroll: PixelPoint, width: i64, height: i64, zoom: u8) -> Self {
        let origin = scroll.offset(-width / 2, -height / 2);
        Self::new(
            zoom,
            PixelRect::from_origin_size(origin, width, height),
            TILE_SIZE,
        )
    }

    /// Same projection with a different tile edge length
    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn half_world(&self) -> i64 {
        world::half_world(self.zoom, self.tile_size)
    }

    /// The screen rectangle translated into top-left-origin world space
    pub fn world_viewport(&self) -> PixelRect {
        world::to_world_space(self.screen_rect, self.zoom, self.tile_size)
    }

    /// Whether the integer world math can represent this frame
    pub fn is_drawable(&self) -> bool {
        self.tile_size > 0 && self.zoom <= MAX_ZOOM_LEVEL
    }
}
