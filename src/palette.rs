//! Palette construction and pixel-to-index mapping.

/// Nearest-color index mapping and transparency lookup.
pub mod mapper;
/// Bucketed median-cut quantizer.
pub mod quantize;

pub use mapper::{IndexedFrame, find_transparent_index, index_frame, map_to_palette};
pub use quantize::{MAX_PALETTE_LEN, Palette, PaletteFormat, QuantizeOpts, quantize};
