//! The tile overlay: draws every visible tile of a provider for one frame

use super::{CapacityAdvisor, PlaceholderError, PlaceholderTile};
use crate::{
    core::{
        bounds::{PixelPoint, PixelRect},
        config::CompositorOptions,
        constants::{DEBUG_CROSSHAIR_ARM, DEBUG_LABEL_BASELINE, MAX_ZOOM_LEVEL},
        viewport::FrameProjection,
        world,
    },
    rendering::{color::SerializableColor, surface::DrawSurface},
    tiles::{
        grid::{TilePlacement, TileRange},
        source::TileProvider,
        tile_image::{PinGuard, TileImage},
    },
    MapError, Result,
};
use image::RgbaImage;
use std::fmt::Write as _;
use std::sync::Arc;

/// What happened during one [`TilesOverlay::draw_tiles`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Capacity requested from the provider before drawing
    pub capacity_advised: usize,
    /// Tiles enumerated by the traversal
    pub visited: usize,
    /// Cells drawn with a resolved tile image
    pub drawn: usize,
    /// Cells drawn with the placeholder
    pub placeholders: usize,
    /// Cells left empty: nothing resolved and no placeholder available
    pub blank: usize,
    /// Reusable images found recycled right after pinning
    pub stale: usize,
    /// Cells whose draw call failed
    pub failed: usize,
}

enum CellFill {
    Tile,
    Placeholder,
    Blank,
}

/// Principal consumer of map tiles.
///
/// Each frame it sizes the provider's cache for the visible range, resolves every
/// visible tile and draws it at its screen position. Tiles that are not ready yet,
/// and pooled tiles recycled between lookup and pin, are covered by the placeholder.
/// Nothing a single tile does can abort the frame.
pub struct TilesOverlay {
    provider: Arc<dyn TileProvider>,
    placeholder: PlaceholderTile,
    advisor: CapacityAdvisor,
    debug: bool,
    debug_color: SerializableColor,
    /// Reused for debug labels so that drawing them does not allocate every frame
    label: String,
}

impl TilesOverlay {
    pub fn new(provider: Arc<dyn TileProvider>) -> Result<Self> {
        Self::with_options(provider, CompositorOptions::default())
    }

    pub fn with_options(provider: Arc<dyn TileProvider>, options: CompositorOptions) -> Result<Self> {
        if provider.tile_size_pixels() == 0 {
            return Err(MapError::Configuration(
                "tile provider reports a tile size of 0 px".to_string(),
            ));
        }
        if provider.min_zoom() > provider.max_zoom() {
            return Err(MapError::Configuration(format!(
                "tile provider zoom range {}..={} is empty",
                provider.min_zoom(),
                provider.max_zoom()
            )));
        }

        Ok(Self {
            provider,
            placeholder: PlaceholderTile::new(options.loading_background, options.loading_line),
            advisor: CapacityAdvisor::new(options.overshoot_tile_cache),
            debug: options.debug,
            debug_color: SerializableColor::DEBUG,
            label: String::new(),
        })
    }

    pub fn provider(&self) -> &Arc<dyn TileProvider> {
        &self.provider
    }

    /// Current settings as an options value
    pub fn options(&self) -> CompositorOptions {
        CompositorOptions {
            overshoot_tile_cache: self.advisor.overshoot(),
            loading_background: self.placeholder.background(),
            loading_line: self.placeholder.line(),
            debug: self.debug,
        }
    }

    pub fn min_zoom_level(&self) -> u8 {
        self.provider.min_zoom()
    }

    pub fn max_zoom_level(&self) -> u8 {
        self.provider.max_zoom()
    }

    /// Whether the provider may use the network connection if it's available
    pub fn use_data_connection(&self) -> bool {
        self.provider.use_data_connection()
    }

    pub fn set_use_data_connection(&self, enabled: bool) {
        self.provider.set_use_data_connection(enabled);
    }

    /// Called when the overlay is removed from its map
    pub fn detach(&self) {
        self.provider.detach();
    }

    pub fn loading_background_color(&self) -> SerializableColor {
        self.placeholder.background()
    }

    /// Set the placeholder background. [`SerializableColor::TRANSPARENT`] disables the
    /// placeholder: cells without a tile are then left empty.
    pub fn set_loading_background_color(&mut self, color: SerializableColor) {
        self.placeholder.set_background(color);
    }

    pub fn loading_line_color(&self) -> SerializableColor {
        self.placeholder.line()
    }

    pub fn set_loading_line_color(&mut self, color: SerializableColor) {
        self.placeholder.set_line(color);
    }

    pub fn overshoot_tile_cache(&self) -> usize {
        self.advisor.overshoot()
    }

    /// Extra tiles to request from the cache beyond what the viewport shows
    pub fn set_overshoot_tile_cache(&mut self, overshoot: usize) {
        self.advisor.set_overshoot(overshoot);
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// The placeholder raster for this provider's tile size, built on first use
    pub fn loading_tile(&mut self) -> std::result::Result<Option<Arc<RgbaImage>>, PlaceholderError> {
        self.placeholder.get(self.provider.tile_size_pixels())
    }

    /// Draw one frame from the camera's values
    pub fn draw(&mut self, surface: &mut dyn DrawSurface, projection: &FrameProjection) -> FrameStats {
        if !projection.is_drawable() {
            log::warn!("skipping frame with unsupported projection {:?}", projection);
            return FrameStats::default();
        }
        self.draw_tiles(
            surface,
            projection.zoom,
            projection.tile_size,
            projection.world_viewport(),
        )
    }

    /// Draw every tile intersecting `viewport`, a rectangle in top-left-origin world pixels.
    ///
    /// Tiles land on `surface` in screen coordinates (world center at the origin).
    pub fn draw_tiles(
        &mut self,
        surface: &mut dyn DrawSurface,
        zoom: u8,
        tile_size: u32,
        viewport: PixelRect,
    ) -> FrameStats {
        if tile_size == 0 || zoom > MAX_ZOOM_LEVEL {
            log::warn!(
                "not drawing tiles at zoom {} with {} px tiles",
                zoom,
                tile_size
            );
            return FrameStats::default();
        }

        let half = world::half_world(zoom, tile_size);
        let range = TileRange::covering(&viewport, zoom, tile_size);

        let mut stats = FrameStats {
            capacity_advised: self.advisor.advise(&range, self.provider.as_ref()),
            ..FrameStats::default()
        };

        for placement in range.iter() {
            self.draw_tile(surface, &placement, half, &mut stats);
        }

        if self.debug {
            let center = viewport.center().offset(-half, -half);
            self.draw_crosshair(surface, center);
        }

        stats
    }

    fn draw_tile(
        &mut self,
        surface: &mut dyn DrawSurface,
        placement: &TilePlacement,
        half: i64,
        stats: &mut FrameStats,
    ) {
        stats.visited += 1;
        let dest = placement.bounds.offset(-half, -half);

        let filled = match self.provider.resolve(&placement.coord) {
            Some(TileImage::Plain(raster)) => {
                surface.draw_raster(&raster, dest).map(|()| CellFill::Tile)
            }
            Some(TileImage::Reusable(image)) => {
                // Unpins when it goes out of scope, whichever way this arm is left
                let pin = PinGuard::pin(image.as_ref());
                if pin.is_valid() {
                    pin.draw(surface, dest).map(|()| CellFill::Tile)
                } else {
                    log::trace!("tile {} was recycled before it could be drawn", placement.coord);
                    stats.stale += 1;
                    self.draw_placeholder(surface, dest)
                }
            }
            None => self.draw_placeholder(surface, dest),
        };

        match filled {
            Ok(CellFill::Tile) => stats.drawn += 1,
            Ok(CellFill::Placeholder) => stats.placeholders += 1,
            Ok(CellFill::Blank) => stats.blank += 1,
            Err(e) => {
                log::warn!("failed to draw tile {}: {}", placement.coord, e);
                stats.failed += 1;
            }
        }

        if self.debug {
            self.draw_tile_outline(surface, placement, dest);
        }
    }

    fn draw_placeholder(&mut self, surface: &mut dyn DrawSurface, dest: PixelRect) -> Result<CellFill> {
        match self.loading_tile() {
            Ok(Some(raster)) => surface
                .draw_raster(&raster, dest)
                .map(|()| CellFill::Placeholder),
            Ok(None) => Ok(CellFill::Blank),
            Err(e) => {
                log::error!("{}", e);
                self.provider.on_memory_pressure();
                Ok(CellFill::Blank)
            }
        }
    }

    fn draw_tile_outline(&mut self, surface: &mut dyn DrawSurface, placement: &TilePlacement, dest: PixelRect) {
        self.label.clear();
        let _ = write!(self.label, "{}", placement.coord);

        let color = self.debug_color;
        let top_left = dest.top_left();
        let outcome = surface
            .draw_text(
                &self.label,
                top_left.offset(1, DEBUG_LABEL_BASELINE),
                color,
            )
            .and_then(|()| {
                surface.draw_line(top_left, PixelPoint::new(dest.right, dest.top), color)
            })
            .and_then(|()| {
                surface.draw_line(top_left, PixelPoint::new(dest.left, dest.bottom), color)
            });
        if let Err(e) = outcome {
            log::debug!("debug outline for {} not drawn: {}", placement.coord, e);
        }
    }

    fn draw_crosshair(&self, surface: &mut dyn DrawSurface, center: PixelPoint) {
        let arm = DEBUG_CROSSHAIR_ARM;
        let outcome = surface
            .draw_line(center.offset(0, -arm), center.offset(0, arm), self.debug_color)
            .and_then(|()| {
                surface.draw_line(center.offset(-arm, 0), center.offset(arm, 0), self.debug_color)
            });
        if let Err(e) = outcome {
            log::debug!("debug crosshair not drawn: {}", e);
        }
    }
}

impl std::fmt::Debug for TilesOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TilesOverlay")
            .field("placeholder", &self.placeholder)
            .field("advisor", &self.advisor)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}
