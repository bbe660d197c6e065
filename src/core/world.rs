//! Integer world-space math for the wrapping Web Mercator pixel grid.
//!
//! Screen coordinates put the world center at the origin; world coordinates put the
//! origin at the top-left corner of the map. The two differ by half a world on each
//! axis. Tile providers wrap tile indices with the same [`world_size`] definition, so
//! it must stay a plain shift of the tile size.

use crate::core::bounds::PixelRect;

/// Full width (and height) of the world in pixels at `zoom`
pub const fn world_size(zoom: u8, tile_size: u32) -> i64 {
    (tile_size as i64) << zoom
}

/// Half-world offset between screen-centered and top-left world coordinates
pub const fn half_world(zoom: u8, tile_size: u32) -> i64 {
    world_size(zoom, tile_size) >> 1
}

/// Translates a screen rectangle into world space. No scale or rotation is applied.
pub const fn to_world_space(screen_rect: PixelRect, zoom: u8, tile_size: u32) -> PixelRect {
    let half = half_world(zoom, tile_size);
    screen_rect.offset(half, half)
}

/// Translates a world rectangle back into screen space
pub const fn to_screen_space(world_rect: PixelRect, zoom: u8, tile_size: u32) -> PixelRect {
    let half = half_world(zoom, tile_size);
    world_rect.offset(-half, -half)
}

/// Index of the tile containing world pixel `pixel` (floor division).
///
/// Clamped to the `i32` range: every index inside the world fits up to
/// [`MAX_ZOOM_LEVEL`](crate::core::constants::MAX_ZOOM_LEVEL), only viewports billions
/// of tiles outside it saturate.
pub fn tile_index(pixel: i64, tile_size: u32) -> i32 {
    let index = pixel.div_euclid(tile_size as i64);
    i32::try_from(index).unwrap_or(if index < 0 { i32::MIN } else { i32::MAX })
}
