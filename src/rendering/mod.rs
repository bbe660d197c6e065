pub mod color;
pub mod context;
pub mod raster;
pub mod surface;

// Re-export main types
pub use color::SerializableColor;
pub use context::{DrawCommand, RenderContext};
pub use raster::RasterSurface;
pub use surface::DrawSurface;
