use crate::{
    core::bounds::{PixelPoint, PixelRect},
    rendering::{color::SerializableColor, surface::DrawSurface},
    MapError, Result,
};
use image::RgbaImage;

/// Commands recorded by a [`RenderContext`]
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Raster {
        /// Address of the drawn raster, stable for as long as the raster is alive.
        /// Lets hosts and tests tell shared rasters (the placeholder) apart.
        source: usize,
        /// Raster dimensions in pixels
        size: (u32, u32),
        /// Destination in screen coordinates, after clipping
        bounds: PixelRect,
    },
    Line {
        from: PixelPoint,
        to: PixelPoint,
        color: SerializableColor,
    },
    Text {
        text: String,
        origin: PixelPoint,
        color: SerializableColor,
    },
}

/// Surface that records draw calls instead of rasterising them.
///
/// Hosts that hand drawing to a GPU or UI toolkit replay the queue after the frame;
/// tests inspect it directly.
#[derive(Debug, Default)]
pub struct RenderContext {
    pub width: u32,
    pub height: u32,
    /// Drawing primitives queue, in submission order
    pub drawing_queue: Vec<DrawCommand>,
    /// Clipping bounds in screen coordinates
    pub clip_bounds: Option<PixelRect>,
}

impl RenderContext {
    /// Create a new render context
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            drawing_queue: Vec::new(),
            clip_bounds: None,
        }
    }

    /// Begin a frame. Keeps the queue's allocation for reuse.
    pub fn begin_frame(&mut self) {
        self.drawing_queue.clear();
    }

    /// Get the current drawing queue
    pub fn get_drawing_queue(&self) -> &[DrawCommand] {
        &self.drawing_queue
    }

    /// Raster draws of the current frame as `(source, bounds)` pairs
    pub fn rasters(&self) -> impl Iterator<Item = (usize, PixelRect)> + '_ {
        self.drawing_queue.iter().filter_map(|command| match command {
            DrawCommand::Raster { source, bounds, .. } => Some((*source, *bounds)),
            _ => None,
        })
    }

    /// Set viewport clipping bounds; rasters outside them are dropped, rasters straddling
    /// them are recorded with their visible part
    pub fn set_clip_bounds(&mut self, clip: PixelRect) {
        self.clip_bounds = Some(clip);
    }

    /// Clear clipping bounds
    pub fn clear_clip_bounds(&mut self) {
        self.clip_bounds = None;
    }

    /// Identity of a raster as recorded in [`DrawCommand::Raster::source`]
    pub fn raster_source(raster: &RgbaImage) -> usize {
        raster as *const RgbaImage as usize
    }
}

impl DrawSurface for RenderContext {
    fn draw_raster(&mut self, raster: &RgbaImage, dest: PixelRect) -> Result<()> {
        if dest.is_empty() {
            return Err(MapError::Render(format!("Invalid tile bounds {:?}", dest)));
        }

        let bounds = match self.clip_bounds {
            Some(clip) => match dest.intersection(&clip) {
                Some(visible) => visible,
                // Completely outside, don't record it
                None => return Ok(()),
            },
            None => dest,
        };

        self.drawing_queue.push(DrawCommand::Raster {
            source: Self::raster_source(raster),
            size: raster.dimensions(),
            bounds,
        });
        Ok(())
    }

    fn draw_line(
        &mut self,
        from: PixelPoint,
        to: PixelPoint,
        color: SerializableColor,
    ) -> Result<()> {
        self.drawing_queue.push(DrawCommand::Line { from, to, color });
        Ok(())
    }

    fn draw_text(&mut self, text: &str, origin: PixelPoint, color: SerializableColor) -> Result<()> {
        self.drawing_queue.push(DrawCommand::Text {
            text: text.to_owned(),
            origin,
            color,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_rasters_in_order() {
        let mut ctx = RenderContext::new(512, 512);
        let a = RgbaImage::new(256, 256);
        let b = RgbaImage::new(256, 256);

        ctx.draw_raster(&a, PixelRect::new(0, 0, 256, 256)).unwrap();
        ctx.draw_raster(&b, PixelRect::new(256, 0, 512, 256)).unwrap();

        let recorded: Vec<_> = ctx.rasters().collect();
        assert_eq!(
            recorded,
            vec![
                (RenderContext::raster_source(&a), PixelRect::new(0, 0, 256, 256)),
                (RenderContext::raster_source(&b), PixelRect::new(256, 0, 512, 256)),
            ]
        );
    }

    #[test]
    fn test_rejects_empty_destination() {
        let mut ctx = RenderContext::new(256, 256);
        let raster = RgbaImage::new(256, 256);
        assert!(ctx.draw_raster(&raster, PixelRect::new(10, 10, 10, 20)).is_err());
        assert!(ctx.get_drawing_queue().is_empty());
    }

    #[test]
    fn test_clipping() {
        let mut ctx = RenderContext::new(256, 256);
        ctx.set_clip_bounds(PixelRect::new(0, 0, 300, 300));
        let raster = RgbaImage::new(256, 256);

        ctx.draw_raster(&raster, PixelRect::new(200, 200, 456, 456)).unwrap();
        ctx.draw_raster(&raster, PixelRect::new(400, 400, 656, 656)).unwrap();

        let recorded: Vec<_> = ctx.rasters().map(|(_, bounds)| bounds).collect();
        assert_eq!(recorded, vec![PixelRect::new(200, 200, 300, 300)]);

        ctx.begin_frame();
        assert!(ctx.get_drawing_queue().is_empty());
    }
}
