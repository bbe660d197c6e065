use crate::core::geo::TileCoord;
use crate::tiles::tile_image::TileImage;

/// Anything that can hand the compositor an image for a tile coordinate.
///
/// Fetching, decoding and eviction all happen behind this trait, on whatever threads
/// the provider likes. The compositor calls it from the drawing thread once per visible
/// tile per frame, so every method must return immediately.
pub trait TileProvider: Send + Sync {
    /// Image for `coord`, or `None` while it is pending or unknown.
    ///
    /// `coord` carries raw indices that may lie outside `0..2^z`; wrapping them into the
    /// grid is the provider's responsibility.
    fn resolve(&self, coord: &TileCoord) -> Option<TileImage>;

    /// Advisory: the next frame will touch at least `count` tiles
    fn ensure_capacity(&self, count: usize);

    /// Whether the network may be used to fetch missing tiles
    fn use_data_connection(&self) -> bool;

    fn set_use_data_connection(&self, enabled: bool);

    fn min_zoom(&self) -> u8;

    fn max_zoom(&self) -> u8;

    /// Edge length of the provider's tiles in pixels
    fn tile_size_pixels(&self) -> u32;

    /// Best-effort hint that an allocation just failed. Must not block.
    fn on_memory_pressure(&self) {}

    /// The overlay drawing from this provider is going away
    fn detach(&self) {}
}
