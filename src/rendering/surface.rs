use crate::{
    core::bounds::{PixelPoint, PixelRect},
    rendering::color::SerializableColor,
    Result,
};
use image::RgbaImage;

/// A drawing target addressed in screen coordinates.
///
/// The compositor assumes an upright, unscaled projection: a raster is drawn into
/// `dest` as is, stretched only when `dest` differs from the raster size. Any error is
/// reported back per call; the compositor logs it and carries on with the next tile.
pub trait DrawSurface {
    /// Draw `raster` so that it covers `dest`
    fn draw_raster(&mut self, raster: &RgbaImage, dest: PixelRect) -> Result<()>;

    /// Draw a hairline from `from` to `to`, both ends inclusive
    fn draw_line(&mut self, from: PixelPoint, to: PixelPoint, color: SerializableColor)
        -> Result<()>;

    /// Draw a text label whose baseline starts at `origin`
    fn draw_text(&mut self, text: &str, origin: PixelPoint, color: SerializableColor)
        -> Result<()>;
}

impl<S: DrawSurface + ?Sized> DrawSurface for &mut S {
    fn draw_raster(&mut self, raster: &RgbaImage, dest: PixelRect) -> Result<()> {
        (**self).draw_raster(raster, dest)
    }

    fn draw_line(
        &mut self,
        from: PixelPoint,
        to: PixelPoint,
        color: SerializableColor,
    ) -> Result<()> {
        (**self).draw_line(from, to, color)
    }

    fn draw_text(&mut self, text: &str, origin: PixelPoint, color: SerializableColor) -> Result<()> {
        (**self).draw_text(text, origin, color)
    }
}
