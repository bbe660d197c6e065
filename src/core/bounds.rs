use serde::{Deserialize, Serialize};

/// An integer pixel position in screen or world space
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i64,
    pub y: i64,
}

impl PixelPoint {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    pub const fn offset(&self, dx: i64, dy: i64) -> PixelPoint {
        PixelPoint::new(self.x + dx, self.y + dy)
    }
}

/// An axis-aligned pixel rectangle.
///
/// `left`/`top` are inclusive and `right`/`bottom` exclusive, so a 256 px tile at the
/// origin spans `0..256` on both axes. Translating a rectangle returns a new one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl PixelRect {
    /// Creates a rectangle from its edges
    pub const fn new(left: i64, top: i64, right: i64, bottom: i64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Creates a rectangle from its top-left corner and size
    pub const fn from_origin_size(origin: PixelPoint, width: i64, height: i64) -> Self {
        Self::new(origin.x, origin.y, origin.x + width, origin.y + height)
    }

    /// Creates a square cell of `size` pixels whose top-left corner is `origin`
    pub const fn square(origin: PixelPoint, size: i64) -> Self {
        Self::from_origin_size(origin, size, size)
    }

    pub const fn width(&self) -> i64 {
        self.right - self.left
    }

    pub const fn height(&self) -> i64 {
        self.bottom - self.top
    }

    pub const fn top_left(&self) -> PixelPoint {
        PixelPoint::new(self.left, self.top)
    }

    /// Center of the rectangle, rounded towards negative infinity
    pub fn center(&self) -> PixelPoint {
        PixelPoint::new(
            (self.left + self.right).div_euclid(2),
            (self.top + self.bottom).div_euclid(2),
        )
    }

    /// A rectangle with no area covers no pixels
    pub const fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// Returns this rectangle translated by `(dx, dy)`
    pub const fn offset(&self, dx: i64, dy: i64) -> PixelRect {
        PixelRect::new(
            self.left + dx,
            self.top + dy,
            self.right + dx,
            self.bottom + dy,
        )
    }

    pub const fn contains(&self, point: PixelPoint) -> bool {
        point.x >= self.left && point.x < self.right && point.y >= self.top && point.y < self.bottom
    }

    /// Checks whether the two rectangles share at least one pixel
    pub const fn intersects(&self, other: &PixelRect) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }

    /// Gets the overlapping area of two rectangles
    pub fn intersection(&self, other: &PixelRect) -> Option<PixelRect> {
        if !self.intersects(other) {
            return None;
        }

        Some(PixelRect::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        ))
    }
}
