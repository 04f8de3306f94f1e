use std::path::Path;

use crate::assets::raster::RasterImage;
use crate::foundation::error::{GifError, GifResult};

/// Decode an encoded image (PNG, JPEG, ...) into straight-alpha RGBA8.
pub fn decode_image(bytes: &[u8]) -> GifResult<RasterImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| GifError::source_decode(format!("decode image from memory: {e}")))?;
    Ok(RasterImage::from_rgba_image(dyn_img.to_rgba8()))
}

/// Decode an image file from disk, guessing the format from its contents.
pub fn decode_image_file(path: &Path) -> GifResult<RasterImage> {
    let reader = image::ImageReader::open(path)
        .map_err(|e| GifError::source_decode(format!("open '{}': {e}", path.display())))?
        .with_guessed_format()
        .map_err(|e| GifError::source_decode(format!("read '{}': {e}", path.display())))?;
    let dyn_img = reader
        .decode()
        .map_err(|e| GifError::source_decode(format!("decode '{}': {e}", path.display())))?;
    Ok(RasterImage::from_rgba_image(dyn_img.to_rgba8()))
}

/// Read only the header of an image file to learn its dimensions.
pub fn probe_file_dimensions(path: &Path) -> GifResult<(u32, u32)> {
    image::image_dimensions(path)
        .map_err(|e| GifError::source_decode(format!("probe '{}': {e}", path.display())))
}

/// Read only the header of an in-memory encoded image to learn its dimensions.
pub fn probe_dimensions(bytes: &[u8]) -> GifResult<(u32, u32)> {
    let reader = image::ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| GifError::source_decode(format!("guess image format: {e}")))?;
    reader
        .into_dimensions()
        .map_err(|e| GifError::source_decode(format!("read image header: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
