//! Visible-tile traversal.
//!
//! [`TileRange::covering`] maps a world-space viewport onto the inclusive range of tile
//! indices it touches. The range knows its tile count up front, which is what the
//! compositor uses to size the cache before drawing, and [`TileRange::iter`] then yields
//! every tile with its world-pixel placement in row-major order without allocating.

use crate::core::{
    bounds::{PixelPoint, PixelRect},
    geo::TileCoord,
    world::tile_index,
};
use std::iter::FusedIterator;

/// A visible tile and the world-pixel cell it occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePlacement {
    pub coord: TileCoord,
    /// Cell in world pixels, relative to the top-left world origin (not wrapped)
    pub bounds: PixelRect,
}

/// Inclusive rectangle of tile indices covering a viewport at one zoom level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub zoom: u8,
    pub tile_size: u32,
    /// Column and row of the upper-left tile
    pub upper_left: (i32, i32),
    columns: u32,
    rows: u32,
}

impl TileRange {
    /// Tiles touched by `world_viewport`, whose right and bottom edges are exclusive.
    ///
    /// Indices are raw: a viewport reaching past the world edge produces columns or rows
    /// outside `0..2^zoom`, each exactly once. `tile_size` must be non-zero.
    pub fn covering(world_viewport: &PixelRect, zoom: u8, tile_size: u32) -> Self {
        if world_viewport.is_empty() {
            return Self {
                zoom,
                tile_size,
                upper_left: (0, 0),
                columns: 0,
                rows: 0,
            };
        }

        let left = tile_index(world_viewport.left, tile_size);
        let top = tile_index(world_viewport.top, tile_size);
        let right = tile_index(world_viewport.right - 1, tile_size);
        let bottom = tile_index(world_viewport.bottom - 1, tile_size);

        Self {
            zoom,
            tile_size,
            upper_left: (left, top),
            columns: span(left, right),
            rows: span(top, bottom),
        }
    }

    /// Column and row of the lower-right tile. Meaningless for an empty range.
    pub fn lower_right(&self) -> (i32, i32) {
        (
            step(self.upper_left.0, i64::from(self.columns) - 1),
            step(self.upper_left.1, i64::from(self.rows) - 1),
        )
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of tiles in the range (`rows × columns`)
    pub fn len(&self) -> usize {
        (self.columns as usize).saturating_mul(self.rows as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, coord: &TileCoord) -> bool {
        let (left, top) = self.upper_left;
        let column = i64::from(coord.x) - i64::from(left);
        let row = i64::from(coord.y) - i64::from(top);
        coord.z == self.zoom
            && (0..i64::from(self.columns)).contains(&column)
            && (0..i64::from(self.rows)).contains(&row)
    }

    /// World-pixel cell of the tile at column `x`, row `y`
    pub fn placement(&self, x: i32, y: i32) -> TilePlacement {
        let size = self.tile_size as i64;
        TilePlacement {
            coord: TileCoord::new(x, y, self.zoom),
            bounds: PixelRect::square(PixelPoint::new(x as i64 * size, y as i64 * size), size),
        }
    }

    /// Placements in row-major order: rows top to bottom, columns left to right
    pub fn iter(&self) -> TilePlacements {
        TilePlacements {
            range: *self,
            next: 0,
        }
    }
}

/// Tiles in the inclusive index span `first..=last`, saturating at `u32::MAX`
fn span(first: i32, last: i32) -> u32 {
    u32::try_from(i64::from(last) - i64::from(first) + 1).unwrap_or(u32::MAX)
}

/// `index + offset` for offsets that stay inside a range built by `span`
fn step(index: i32, offset: i64) -> i32 {
    (i64::from(index) + offset) as i32
}

impl IntoIterator for &TileRange {
    type Item = TilePlacement;
    type IntoIter = TilePlacements;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`TileRange`]; clone it to restart from the current position
#[derive(Debug, Clone)]
pub struct TilePlacements {
    range: TileRange,
    next: usize,
}

impl Iterator for TilePlacements {
    type Item = TilePlacement;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.range.len() {
            return None;
        }

        let columns = self.range.columns as usize;
        let column = (self.next % columns) as i64;
        let row = (self.next / columns) as i64;
        self.next += 1;

        let (left, top) = self.range.upper_left;
        Some(self.range.placement(step(left, column), step(top, row)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.range.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TilePlacements {}

impl FusedIterator for TilePlacements {}
