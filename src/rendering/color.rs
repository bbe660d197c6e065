use crate::core::constants::{DEFAULT_LOADING_BACKGROUND, DEFAULT_LOADING_LINE};
use image::Rgba;
use serde::{Deserialize, Serialize};

#[cfg(feature = "egui")]
use egui::Color32;

/// Serializable straight-alpha RGBA color, convertible to image and egui colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    /// Fully transparent; as a placeholder background it disables the placeholder
    pub const TRANSPARENT: SerializableColor = SerializableColor::new(0, 0, 0, 0);

    pub const DEBUG: SerializableColor = SerializableColor::rgb(255, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn is_transparent(&self) -> bool {
        self.a == 0
    }

    pub fn loading_background() -> Self {
        let (r, g, b) = DEFAULT_LOADING_BACKGROUND;
        Self::rgb(r, g, b)
    }

    pub fn loading_line() -> Self {
        let (r, g, b) = DEFAULT_LOADING_LINE;
        Self::rgb(r, g, b)
    }
}

impl From<Rgba<u8>> for SerializableColor {
    fn from(color: Rgba<u8>) -> Self {
        let [r, g, b, a] = color.0;
        Self { r, g, b, a }
    }
}

impl From<SerializableColor> for Rgba<u8> {
    fn from(color: SerializableColor) -> Self {
        Rgba([color.r, color.g, color.b, color.a])
    }
}

#[cfg(feature = "egui")]
impl From<Color32> for SerializableColor {
    fn from(color: Color32) -> Self {
        let [r, g, b, a] = color.to_srgba_unmultiplied();
        Self { r, g, b, a }
    }
}

#[cfg(feature = "egui")]
impl From<SerializableColor> for Color32 {
    fn from(color: SerializableColor) -> Self {
        Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
    }
}
