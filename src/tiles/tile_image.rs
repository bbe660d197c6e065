//! Renderable tile images and the pin protocol for pooled ones.
//!
//! A [`TileImage::Plain`] raster is immutable and always safe to draw. A
//! [`TileImage::Reusable`] image lives in a slot that its cache may recycle for another
//! tile at any time, so the compositor pins it with [`PinGuard`] before reading pixels and
//! re-checks [`Pinnable::is_valid`] after pinning: the cache may have evicted the entry
//! between lookup and pin.

use crate::{core::bounds::PixelRect, rendering::surface::DrawSurface, Result};
use image::RgbaImage;
use std::fmt;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// A pooled image whose storage may be reclaimed by its owner while unpinned
pub trait Pinnable: Send + Sync + fmt::Debug {
    /// Pin the image. While pinned, the owner must not recycle its storage.
    fn begin_use(&self);

    /// Release one pin taken with [`Pinnable::begin_use`]
    fn finish_use(&self);

    /// Whether the pixels still belong to the tile this image was resolved for
    fn is_valid(&self) -> bool;

    /// Pixels of the image. Only meaningful while pinned and valid.
    fn raster(&self) -> &RgbaImage;
}

/// An image resolved for one tile coordinate
#[derive(Debug, Clone)]
pub enum TileImage {
    Plain(Arc<RgbaImage>),
    Reusable(Arc<dyn Pinnable>),
}

impl TileImage {
    pub fn plain(raster: RgbaImage) -> Self {
        Self::Plain(Arc::new(raster))
    }

    pub fn is_reusable(&self) -> bool {
        matches!(self, Self::Reusable(_))
    }
}

/// RAII pin on a reusable image: pins on construction, unpins exactly once on drop,
/// including when the draw in between returns an error or unwinds.
pub struct PinGuard<'a> {
    image: &'a dyn Pinnable,
}

impl<'a> PinGuard<'a> {
    pub fn pin(image: &'a dyn Pinnable) -> Self {
        image.begin_use();
        Self { image }
    }

    pub fn is_valid(&self) -> bool {
        self.image.is_valid()
    }

    /// Draw the pinned pixels into `dest`
    pub fn draw(&self, surface: &mut dyn DrawSurface, dest: PixelRect) -> Result<()> {
        surface.draw_raster(self.image.raster(), dest)
    }
}

impl Drop for PinGuard<'_> {
    fn drop(&mut self) {
        self.image.finish_use();
    }
}

// High bit marks a recycled slot, the rest counts pins.
const RECYCLED: usize = 1 << (usize::BITS - 1);
const PIN_MASK: usize = !RECYCLED;

/// A recyclable tile slot.
///
/// Pin count and validity share one atomic word, so recycling is a single
/// compare-and-swap from "valid and unpinned": once a pin is taken the slot cannot be
/// recycled, and a slot recycled before the pin is reported invalid after it. The pixel
/// buffer is only rewritten through [`ReusableTile::refill`], which needs the slot's
/// `Arc` to be unique, so nothing can be reading it at that point.
pub struct ReusableTile {
    raster: RgbaImage,
    state: AtomicUsize,
}

impl ReusableTile {
    pub fn new(raster: RgbaImage) -> Arc<Self> {
        Arc::new(Self {
            raster,
            state: AtomicUsize::new(0),
        })
    }

    pub fn pin_count(&self) -> usize {
        self.state.load(Ordering::Acquire) & PIN_MASK
    }

    /// Mark the slot as recycled. Fails while any pin is held or if it was already recycled.
    pub fn try_recycle(&self) -> bool {
        self.state
            .compare_exchange(0, RECYCLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Refill a recycled slot with new pixels, making it valid again.
    ///
    /// Hands the raster back when someone else still holds the slot.
    pub fn refill(slot: &mut Arc<Self>, raster: RgbaImage) -> std::result::Result<(), RgbaImage> {
        match Arc::get_mut(slot) {
            Some(tile) => {
                tile.raster = raster;
                *tile.state.get_mut() = 0;
                Ok(())
            }
            None => Err(raster),
        }
    }

    /// Bytes held by the pixel buffer
    pub fn byte_len(&self) -> usize {
        self.raster.as_raw().len()
    }
}

impl Pinnable for ReusableTile {
    fn begin_use(&self) {
        self.state.fetch_add(1, Ordering::AcqRel);
    }

    fn finish_use(&self) {
        let previous = self.state.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous & PIN_MASK > 0, "unbalanced finish_use");
    }

    fn is_valid(&self) -> bool {
        self.state.load(Ordering::Acquire) & RECYCLED == 0
    }

    fn raster(&self) -> &RgbaImage {
        &self.raster
    }
}

impl fmt::Debug for ReusableTile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.load(Ordering::Relaxed);
        f.debug_struct("ReusableTile")
            .field("dimensions", &self.raster.dimensions())
            .field("pins", &(state & PIN_MASK))
            .field("valid", &(state & RECYCLED == 0))
            .finish()
    }
}
