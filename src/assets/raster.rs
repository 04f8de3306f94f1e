use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::assets::decode::{decode_image, decode_image_file, probe_dimensions, probe_file_dimensions};
use crate::foundation::error::{GifError, GifResult};

/// A decoded raster in straight (non-premultiplied) RGBA8.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    rgba: Arc<Vec<u8>>,
}

impl fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

impl RasterImage {
    /// Wrap a tightly packed, row-major RGBA8 buffer.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> GifResult<Self> {
        if width == 0 || height == 0 {
            return Err(GifError::validation("raster width/height must be non-zero"));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|px| px.checked_mul(4))
            .ok_or_else(|| GifError::validation("raster dimensions overflow"))?;
        if rgba.len() != expected {
            return Err(GifError::validation(format!(
                "raster buffer has {} bytes, expected {expected} for {width}x{height} rgba8",
                rgba.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba: Arc::new(rgba),
        })
    }

    /// Build a raster filled with one RGBA color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> GifResult<Self> {
        let px = (width as usize).saturating_mul(height as usize);
        Self::new(width, height, rgba.repeat(px))
    }

    pub(crate) fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            rgba: Arc::new(img.into_raw()),
        }
    }

    /// Copy into an `image` buffer for resampling.
    pub(crate) fn to_rgba_image(&self) -> GifResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.rgba.as_ref().clone())
            .ok_or_else(|| GifError::validation("raster buffer does not match its dimensions"))
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major RGBA8 bytes.
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }
}

/// Something a frame can be rendered from.
///
/// `load` may block (file IO, decoding); the generation controller calls it once per frame,
/// in frame order.
pub trait RasterSource: Send + Sync + fmt::Debug {
    /// Produce the decoded raster.
    fn load(&self) -> GifResult<RasterImage>;

    /// Intrinsic size of the raster. Implementations should avoid a full decode when they can.
    fn dimensions(&self) -> GifResult<(u32, u32)> {
        self.load().map(|r| (r.width, r.height))
    }
}

impl RasterSource for RasterImage {
    fn load(&self) -> GifResult<RasterImage> {
        Ok(self.clone())
    }

    fn dimensions(&self) -> GifResult<(u32, u32)> {
        Ok((self.width, self.height))
    }
}

/// An image file on disk, decoded on demand.
#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Reference the image at `path`. Nothing is read until the frame is loaded.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the referenced file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RasterSource for FileSource {
    fn load(&self) -> GifResult<RasterImage> {
        decode_image_file(&self.path)
    }

    fn dimensions(&self) -> GifResult<(u32, u32)> {
        probe_file_dimensions(&self.path)
    }
}

/// Encoded image bytes held in memory (e.g. an upload that has not been decoded yet).
#[derive(Clone)]
pub struct EncodedImageSource {
    bytes: Arc<Vec<u8>>,
}

impl fmt::Debug for EncodedImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedImageSource")
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl EncodedImageSource {
    /// Wrap encoded bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Arc::new(bytes.into()),
        }
    }
}

impl RasterSource for EncodedImageSource {
    fn load(&self) -> GifResult<RasterImage> {
        decode_image(&self.bytes)
    }

    fn dimensions(&self) -> GifResult<(u32, u32)> {
        probe_dimensions(&self.bytes)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/raster.rs"]
mod tests;
