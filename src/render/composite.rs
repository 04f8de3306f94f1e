//! Fit one source raster onto the fixed output canvas.
//!
//! The source keeps its aspect ratio and is centered; the uncovered area stays fully
//! transparent after the draw. A second pass turns every fully transparent pixel into the
//! opaque [`TRANSPARENT_SENTINEL`] so transparency survives palette reduction. Partially
//! transparent pixels keep their color and are later encoded as opaque.

use crate::assets::raster::RasterImage;
use crate::foundation::core::{Rgb8, TRANSPARENT_SENTINEL};
use crate::foundation::error::{GifError, GifResult};
use crate::store::settings::CanvasSettings;

/// Where the scaled source lands on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawRect {
    /// Left edge in canvas pixels.
    pub x: u32,
    /// Top edge in canvas pixels.
    pub y: u32,
    /// Scaled source width.
    pub width: u32,
    /// Scaled source height.
    pub height: u32,
}

/// A canvas-sized RGBA8 frame whose transparency has been resolved to the sentinel color.
#[derive(Clone, Debug)]
pub struct CompositedFrame {
    /// Canvas width.
    pub width: u32,
    /// Canvas height.
    pub height: u32,
    /// Row-major RGBA8.
    pub data: Vec<u8>,
    /// Number of pixels replaced by the sentinel.
    pub sentinel_pixels: usize,
}

/// Letterbox `src_w x src_h` into `canvas_w x canvas_h`.
///
/// A zero-sized canvas or source yields an empty rect.
pub fn fit_rect(src_w: u32, src_h: u32, canvas_w: u32, canvas_h: u32) -> DrawRect {
    if src_w == 0 || src_h == 0 || canvas_w == 0 || canvas_h == 0 {
        return DrawRect {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
        };
    }
    let source_aspect = f64::from(src_w) / f64::from(src_h);
    let target_aspect = f64::from(canvas_w) / f64::from(canvas_h);

    if source_aspect > target_aspect {
        let height = ((f64::from(canvas_w) / source_aspect).round() as u32).clamp(1, canvas_h);
        DrawRect {
            x: 0,
            y: (canvas_h - height) / 2,
            width: canvas_w,
            height,
        }
    } else {
        let width = ((f64::from(canvas_h) * source_aspect).round() as u32).clamp(1, canvas_w);
        DrawRect {
            x: (canvas_w - width) / 2,
            y: 0,
            width,
            height: canvas_h,
        }
    }
}

/// Scale and center `src` onto a canvas described by `canvas`.
pub fn composite(src: &RasterImage, canvas: &CanvasSettings) -> GifResult<CompositedFrame> {
    if canvas.width == 0 || canvas.height == 0 {
        return Err(GifError::validation("canvas width/height must be non-zero"));
    }

    let rect = fit_rect(src.width(), src.height(), canvas.width, canvas.height);
    let source = src.to_rgba_image()?;
    let scaled = if (rect.width, rect.height) == (src.width(), src.height()) {
        source
    } else {
        image::imageops::resize(
            &source,
            rect.width,
            rect.height,
            canvas.smoothing_quality.filter(),
        )
    };

    let mut surface = image::RgbaImage::new(canvas.width, canvas.height);
    image::imageops::replace(&mut surface, &scaled, i64::from(rect.x), i64::from(rect.y));

    let mut data = surface.into_raw();
    let sentinel_pixels = resolve_transparency(&mut data, TRANSPARENT_SENTINEL)?;
    Ok(CompositedFrame {
        width: canvas.width,
        height: canvas.height,
        data,
        sentinel_pixels,
    })
}

/// Replace every pixel with alpha exactly 0 by `sentinel` at full opacity.
///
/// Returns how many pixels were replaced.
pub fn resolve_transparency(rgba: &mut [u8], sentinel: Rgb8) -> GifResult<usize> {
    if !rgba.len().is_multiple_of(4) {
        return Err(GifError::validation(
            "resolve_transparency expects an rgba8 buffer",
        ));
    }
    let mut replaced = 0;
    for px in rgba.chunks_exact_mut(4) {
        if px[3] == 0 {
            px[..3].copy_from_slice(&sentinel);
            px[3] = 255;
            replaced += 1;
        }
    }
    Ok(replaced)
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
