use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a tile coordinate in the slippy map tile system.
///
/// `x` and `y` are raw grid indices as produced by the viewport traversal. They may
/// fall outside `0..2^z` when the viewport wraps around the world; mapping them back
/// into the grid is the tile provider's job (see [`TileCoord::wrapped`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
    pub z: u8,
}

impl TileCoord {
    pub fn new(x: i32, y: i32, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Number of tiles along one axis of the world at zoom `z`
    pub fn grid_size(z: u8) -> i64 {
        1_i64 << z
    }

    /// Checks if the tile lies inside the nominal grid for its zoom level
    pub fn is_valid(&self) -> bool {
        let n = Self::grid_size(self.z);
        (0..n).contains(&(self.x as i64)) && (0..n).contains(&(self.y as i64))
    }

    /// The same tile with both indices wrapped into `0..2^z`
    pub fn wrapped(&self) -> TileCoord {
        let n = Self::grid_size(self.z);
        TileCoord::new(
            (self.x as i64).rem_euclid(n) as i32,
            (self.y as i64).rem_euclid(n) as i32,
            self.z,
        )
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}/{}", self.z, self.x, self.y)
    }
}
