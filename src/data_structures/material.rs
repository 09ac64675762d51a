//! Surface appearance of visual objects.

use std::{borrow::Cow, sync::Arc};

use anyhow::bail;

/// Decoded RGBA8 image data (sRGB encoded), ready to upload as a texture.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for ImageData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageData")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

impl ImageData {
    /// The image shrunk so neither side exceeds `max_dimension`, keeping its
    /// aspect ratio. Images that already fit are borrowed unchanged.
    ///
    /// Fails for empty images and for pixel buffers that don't match the size.
    pub fn fit_within(&self, max_dimension: u32) -> anyhow::Result<Cow<'_, ImageData>> {
        if self.width == 0 || self.height == 0 {
            bail!("image is {}x{}", self.width, self.height);
        }
        if max_dimension == 0 {
            bail!("the device allows no textures");
        }
        let Some(pixels) = image::ImageBuffer::<image::Rgba<u8>, &[u8]>::from_raw(
            self.width,
            self.height,
            self.rgba.as_slice(),
        ) else {
            bail!(
                "{} bytes of pixels do not fill a {}x{} image",
                self.rgba.len(),
                self.width,
                self.height
            );
        };
        if self.width <= max_dimension && self.height <= max_dimension {
            return Ok(Cow::Borrowed(self));
        }

        let longest = self.width.max(self.height) as f64;
        let factor = max_dimension as f64 / longest;
        let width = ((self.width as f64 * factor).round() as u32).clamp(1, max_dimension);
        let height = ((self.height as f64 * factor).round() as u32).clamp(1, max_dimension);
        let resized =
            image::imageops::resize(&pixels, width, height, image::imageops::FilterType::Triangle);
        Ok(Cow::Owned(ImageData {
            width,
            height,
            rgba: resized.into_raw(),
        }))
    }
}

/// Metal/roughness surface description.
///
/// `colour` is linear RGBA. Use [`Appearance::from_hex`] for sRGB hex colours
/// as they appear in design tools.
#[derive(Clone, Debug, PartialEq)]
pub struct Appearance {
    pub colour: [f32; 4],
    pub metalness: f32,
    pub roughness: f32,
    pub texture: Option<Arc<ImageData>>,
}

impl Appearance {
    pub fn from_hex(hex: u32) -> Self {
        Self {
            colour: hex_to_linear(hex),
            ..Default::default()
        }
    }

    pub fn with_metalness(mut self, metalness: f32) -> Self {
        self.metalness = metalness.clamp(0.0, 1.0);
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }
}

/// White, fully rough, non metallic.
impl Default for Appearance {
    fn default() -> Self {
        Self {
            colour: [1.0, 1.0, 1.0, 1.0],
            metalness: 0.0,
            roughness: 1.0,
            texture: None,
        }
    }
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// `0xRRGGBB` in sRGB to opaque linear RGBA.
pub fn hex_to_linear(hex: u32) -> [f32; 4] {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
    [channel(16), channel(8), channel(0), 1.0]
}
