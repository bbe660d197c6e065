//! Core constants shared by the traversal, the compositor and the placeholder factory.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Highest zoom level the integer world math supports (`256 << 30` still fits an `i64`
/// with room for viewport offsets).
pub const MAX_ZOOM_LEVEL: u8 = 30;

/// The placeholder checkerboard draws this many cells along each tile edge.
pub const PLACEHOLDER_GRID_DIVISIONS: u32 = 16;

/// Background of the loading placeholder (a light warm grey).
pub const DEFAULT_LOADING_BACKGROUND: (u8, u8, u8) = (216, 208, 208);

/// Grid lines of the loading placeholder.
pub const DEFAULT_LOADING_LINE: (u8, u8, u8) = (200, 192, 192);

/// Half the arm length of the debug crosshair, in pixels.
pub const DEBUG_CROSSHAIR_ARM: i64 = 9;

/// Baseline offset of the debug tile label below the tile's top edge.
pub const DEBUG_LABEL_BASELINE: i64 = 12;
