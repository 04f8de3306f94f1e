//! Raster inputs: decoded RGBA buffers and the sources that produce them.

/// Image decoding through the `image` crate.
pub mod decode;
/// Decoded rasters and the [`RasterSource`] seam.
pub mod raster;

pub use raster::{EncodedImageSource, FileSource, RasterImage, RasterSource};
