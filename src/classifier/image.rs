// Decoded image handle: what the caller supplies to the pipeline.
//
// The encoded bytes are kept alongside the pixels: classification reads the
// pixels, while generation (inline image data) and upload use the bytes.

use anyhow::{Context, Result};
use image::{ImageFormat, RgbImage};

#[derive(Clone)]
pub struct DecodedImage {
    /// Original encoded file contents
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`, e.g. "image/jpeg"
    pub mime_type: String,
    pub pixels: RgbImage,
}

impl DecodedImage {
    /// Decode an encoded image (JPEG, PNG or WebP).
    pub fn decode(bytes: Vec<u8>) -> Result<Self> {
        let format = image::guess_format(&bytes).context("Unrecognized image format")?;
        let pixels = image::load_from_memory_with_format(&bytes, format)
            .context("Failed to decode image")?
            .to_rgb8();

        Ok(Self {
            mime_type: format.to_mime_type().to_string(),
            bytes,
            pixels,
        })
    }

    /// Read and decode an image file from disk.
    pub fn open(path: &std::path::Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        Self::decode(bytes).with_context(|| format!("Failed to decode {}", path.display()))
    }

    /// File extension matching the MIME type, used for storage keys.
    pub fn extension(&self) -> &'static str {
        ImageFormat::from_mime_type(&self.mime_type)
            .and_then(|f| f.extensions_str().first().copied())
            .unwrap_or("bin")
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.bytes.len())
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}
