pub mod cache;
pub mod grid;
pub mod source;
pub mod tile_image;

// Re-exports for convenience
pub use cache::TileCache;
pub use grid::{TilePlacement, TileRange};
pub use source::TileProvider;
pub use tile_image::{PinGuard, Pinnable, ReusableTile, TileImage};
