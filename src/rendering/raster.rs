use crate::{
    core::bounds::{PixelPoint, PixelRect},
    rendering::{color::SerializableColor, surface::DrawSurface},
    MapError, Result,
};
use image::{imageops, Pixel, Rgba, RgbaImage};

/// Software surface that composites directly into an `RgbaImage`.
///
/// `origin` is the screen coordinate of the image's top-left pixel, so a surface for
/// a frame is usually created with the frame's screen rectangle.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    canvas: RgbaImage,
    origin: PixelPoint,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32, origin: PixelPoint) -> Self {
        Self {
            canvas: RgbaImage::new(width, height),
            origin,
        }
    }

    /// A surface covering exactly `screen_rect`
    pub fn for_screen_rect(screen_rect: PixelRect) -> Result<Self> {
        if screen_rect.is_empty() {
            return Err(MapError::Render(format!(
                "Cannot allocate a surface for {:?}",
                screen_rect
            )));
        }
        let width = u32::try_from(screen_rect.width())
            .map_err(|_| MapError::Render("surface too wide".to_string()))?;
        let height = u32::try_from(screen_rect.height())
            .map_err(|_| MapError::Render("surface too tall".to_string()))?;
        Ok(Self::new(width, height, screen_rect.top_left()))
    }

    pub fn origin(&self) -> PixelPoint {
        self.origin
    }

    pub fn image(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn into_image(self) -> RgbaImage {
        self.canvas
    }

    /// Fill the whole surface with one color
    pub fn clear(&mut self, color: SerializableColor) {
        let pixel: Rgba<u8> = color.into();
        for p in self.canvas.pixels_mut() {
            *p = pixel;
        }
    }

    /// Pixel at a screen coordinate, if it falls on the surface
    pub fn pixel_at(&self, point: PixelPoint) -> Option<SerializableColor> {
        let (x, y) = self.to_canvas(point)?;
        Some((*self.canvas.get_pixel(x, y)).into())
    }

    fn to_canvas(&self, point: PixelPoint) -> Option<(u32, u32)> {
        let x = u32::try_from(point.x - self.origin.x).ok()?;
        let y = u32::try_from(point.y - self.origin.y).ok()?;
        (x < self.canvas.width() && y < self.canvas.height()).then_some((x, y))
    }

    fn blend_at(&mut self, point: PixelPoint, color: Rgba<u8>) {
        if let Some((x, y)) = self.to_canvas(point) {
            self.canvas.get_pixel_mut(x, y).blend(&color);
        }
    }
}

impl DrawSurface for RasterSurface {
    fn draw_raster(&mut self, raster: &RgbaImage, dest: PixelRect) -> Result<()> {
        if dest.is_empty() {
            return Err(MapError::Render(format!("Invalid tile bounds {:?}", dest)));
        }

        let x = dest.left - self.origin.x;
        let y = dest.top - self.origin.y;
        let (width, height) = (dest.width() as u32, dest.height() as u32);

        if raster.dimensions() == (width, height) {
            imageops::overlay(&mut self.canvas, raster, x, y);
        } else {
            let scaled = imageops::resize(raster, width, height, imageops::FilterType::Nearest);
            imageops::overlay(&mut self.canvas, &scaled, x, y);
        }
        Ok(())
    }

    fn draw_line(
        &mut self,
        from: PixelPoint,
        to: PixelPoint,
        color: SerializableColor,
    ) -> Result<()> {
        let color: Rgba<u8> = color.into();

        // Bresenham, both ends inclusive
        let (dx, dy) = ((to.x - from.x).abs(), -(to.y - from.y).abs());
        let (sx, sy) = ((to.x - from.x).signum(), (to.y - from.y).signum());
        let mut err = dx + dy;
        let mut point = from;
        loop {
            self.blend_at(point, color);
            if point == to {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                point.x += sx;
            }
            if e2 <= dx {
                err += dx;
                point.y += sy;
            }
        }
        Ok(())
    }

    fn draw_text(&mut self, text: &str, origin: PixelPoint, _color: SerializableColor) -> Result<()> {
        // No glyph rasteriser here; labels only show up on recording surfaces.
        log::trace!("skipping label {:?} at {:?}", text, origin);
        Ok(())
    }
}
