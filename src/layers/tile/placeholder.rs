use crate::core::constants::PLACEHOLDER_GRID_DIVISIONS;
use crate::rendering::color::SerializableColor;
use image::{Pixel, Rgba, RgbaImage};
use std::sync::Arc;

/// Why a placeholder could not be produced
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaceholderError {
    #[error("out of memory allocating a {size}x{size} placeholder tile")]
    Allocation { size: u32 },
}

/// Lazily built "loading" tile: a background fill crossed by a hairline grid.
///
/// One raster is cached per color pair and tile size. Changing either color drops it;
/// the next [`PlaceholderTile::get`] builds a new one. A fully transparent background
/// disables the placeholder entirely.
#[derive(Debug, Clone)]
pub struct PlaceholderTile {
    background: SerializableColor,
    line: SerializableColor,
    cached: Option<(u32, Arc<RgbaImage>)>,
}

impl PlaceholderTile {
    pub fn new(background: SerializableColor, line: SerializableColor) -> Self {
        Self {
            background,
            line,
            cached: None,
        }
    }

    pub fn background(&self) -> SerializableColor {
        self.background
    }

    pub fn line(&self) -> SerializableColor {
        self.line
    }

    /// Returns whether the cached raster was dropped
    pub fn set_background(&mut self, background: SerializableColor) -> bool {
        if self.background == background {
            return false;
        }
        self.background = background;
        self.invalidate();
        true
    }

    /// Returns whether the cached raster was dropped
    pub fn set_line(&mut self, line: SerializableColor) -> bool {
        if self.line == line {
            return false;
        }
        self.line = line;
        self.invalidate();
        true
    }

    pub fn is_cached(&self) -> bool {
        self.cached.is_some()
    }

    /// The placeholder for `tile_size` px tiles, or `None` when the background is transparent
    pub fn get(&mut self, tile_size: u32) -> Result<Option<Arc<RgbaImage>>, PlaceholderError> {
        if self.background.is_transparent() {
            return Ok(None);
        }

        match &self.cached {
            Some((size, raster)) if *size == tile_size => return Ok(Some(Arc::clone(raster))),
            Some(_) => self.invalidate(),
            None => {}
        }

        let raster = Arc::new(self.synthesize(tile_size)?);
        log::debug!("built {}px placeholder tile", tile_size);
        self.cached = Some((tile_size, Arc::clone(&raster)));
        Ok(Some(raster))
    }

    /// Drop the cached raster. Its pixel buffer is released right away unless a surface
    /// still holds the raster, in which case the last holder frees it.
    pub fn invalidate(&mut self) {
        let Some((_, raster)) = self.cached.take() else {
            return;
        };
        match Arc::try_unwrap(raster) {
            Ok(raster) => {
                log::trace!("released {} byte placeholder", raster.as_raw().len());
                drop(raster);
            }
            Err(_) => log::trace!("placeholder still shared, releasing with last holder"),
        }
    }

    fn synthesize(&self, tile_size: u32) -> Result<RgbaImage, PlaceholderError> {
        let error = PlaceholderError::Allocation { size: tile_size };
        let len = (tile_size as usize)
            .checked_mul(tile_size as usize)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or(error.clone())?;

        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(len)
            .map_err(|_| error.clone())?;

        let background: Rgba<u8> = self.background.into();
        for _ in 0..len / 4 {
            buffer.extend_from_slice(&background.0);
        }
        let mut raster = RgbaImage::from_raw(tile_size, tile_size, buffer).ok_or(error)?;

        let line: Rgba<u8> = self.line.into();
        let step = (tile_size / PLACEHOLDER_GRID_DIVISIONS).max(1) as usize;
        for a in (0..tile_size).step_by(step) {
            for b in 0..tile_size {
                raster.get_pixel_mut(b, a).blend(&line);
                raster.get_pixel_mut(a, b).blend(&line);
            }
        }
        Ok(raster)
    }
}

impl Default for PlaceholderTile {
    fn default() -> Self {
        Self::new(
            SerializableColor::loading_background(),
            SerializableColor::loading_line(),
        )
    }
}
