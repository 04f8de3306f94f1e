use std::collections::HashMap;

use crate::foundation::core::{Rgb8, TRANSPARENT_SENTINEL};
use crate::foundation::error::{GifError, GifResult};
use crate::palette::quantize::{Palette, PaletteFormat, QuantizeOpts, quantize};
use crate::render::composite::CompositedFrame;

/// A frame reduced to palette indices, ready for the container encoder.
#[derive(Clone, Debug)]
pub struct IndexedFrame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// One palette index per pixel, row-major.
    pub indices: Vec<u8>,
    /// Local color table.
    pub palette: Palette,
    /// Palette entry rendered as transparent, if the sentinel survived quantization.
    pub transparent_index: Option<u8>,
}

/// Locate the palette entry that exactly equals `sentinel`.
pub fn find_transparent_index(palette: &Palette, sentinel: Rgb8) -> Option<u8> {
    palette.position(sentinel)
}

/// Map every RGBA8 pixel to its nearest palette entry.
///
/// When `transparent` is set, only pixels exactly equal to `sentinel` map to it; every other
/// pixel searches the remaining entries so opaque content never turns transparent.
pub fn map_to_palette(
    rgba: &[u8],
    palette: &Palette,
    transparent: Option<u8>,
    sentinel: Rgb8,
) -> GifResult<Vec<u8>> {
    if !rgba.len().is_multiple_of(4) {
        return Err(GifError::validation("map_to_palette expects an rgba8 buffer"));
    }
    if palette.is_empty() {
        return Err(GifError::validation("cannot map pixels onto an empty palette"));
    }

    let mut cache: HashMap<Rgb8, u8> = HashMap::new();
    let mut out = Vec::with_capacity(rgba.len() / 4);
    for px in rgba.chunks_exact(4) {
        let c = [px[0], px[1], px[2]];
        if let Some(t) = transparent
            && c == sentinel
        {
            out.push(t);
            continue;
        }
        let idx = *cache
            .entry(c)
            .or_insert_with(|| nearest(palette, c, transparent));
        out.push(idx);
    }
    Ok(out)
}

fn nearest(palette: &Palette, c: Rgb8, skip: Option<u8>) -> u8 {
    let mut best = (u32::MAX, skip.unwrap_or(0));
    for (i, p) in palette.colors().iter().enumerate() {
        let i = i as u8;
        if Some(i) == skip {
            continue;
        }
        let d = distance_sq(*p, c);
        if d < best.0 {
            best = (d, i);
            if d == 0 {
                break;
            }
        }
    }
    best.1
}

fn distance_sq(a: Rgb8, b: Rgb8) -> u32 {
    (0..3)
        .map(|ch| {
            let d = i32::from(a[ch]) - i32::from(b[ch]);
            (d * d) as u32
        })
        .sum()
}

/// Quantize a composited frame and map it onto the resulting palette.
///
/// The transparency sentinel is reserved during quantization; if it still cannot be found
/// afterwards the frame is encoded fully opaque.
pub fn index_frame(frame: &CompositedFrame, format: PaletteFormat) -> GifResult<IndexedFrame> {
    let palette = quantize(
        &frame.data,
        &QuantizeOpts {
            format,
            reserved: Some(TRANSPARENT_SENTINEL),
            ..QuantizeOpts::default()
        },
    )?;

    let transparent_index = find_transparent_index(&palette, TRANSPARENT_SENTINEL);
    if transparent_index.is_none() && frame.sentinel_pixels > 0 {
        tracing::warn!(
            sentinel_pixels = frame.sentinel_pixels,
            "transparency sentinel lost in quantization; encoding frame opaque"
        );
    }

    let indices = map_to_palette(&frame.data, &palette, transparent_index, TRANSPARENT_SENTINEL)?;
    Ok(IndexedFrame {
        width: frame.width,
        height: frame.height,
        indices,
        palette,
        transparent_index,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/palette/mapper.rs"]
mod tests;
