//! gifloom assembles still images into an animated GIF.
//!
//! The pipeline runs leaf-to-root:
//!
//! - [`FrameStore`] holds frames in playback order with per-frame delay overrides
//! - [`render::composite()`] letterboxes each source onto the fixed canvas and marks transparent
//!   pixels with [`TRANSPARENT_SENTINEL`]
//! - [`palette::quantize()`] and [`palette::index_frame`] reduce a frame to a local palette
//! - [`GifEncoder`] writes the GIF89a container
//! - [`GenerationController`] orchestrates one single-flight run and reports progress
//!
//! [`Workspace`] bundles all of it into one shareable context object with debounced
//! auto-generation.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Raster inputs.
pub mod assets;
/// GIF89a container and LZW encoding.
pub mod encode;
/// Quantization and palette mapping.
pub mod palette;
/// Canvas compositing.
pub mod render;
/// Generation orchestration.
pub mod session;
/// Frame store and settings.
pub mod store;

pub use crate::assets::{EncodedImageSource, FileSource, RasterImage, RasterSource};
pub use crate::encode::{DisposalMethod, GifEncoder};
pub use crate::foundation::core::{
    FrameId, MAX_CANVAS_HEIGHT, MAX_CANVAS_WIDTH, MAX_DELAY_MS, MIN_CANVAS_HEIGHT,
    MIN_CANVAS_WIDTH, MIN_DELAY_MS, Rgb8, TRANSPARENT_SENTINEL, clamp_canvas_size, clamp_delay_ms,
    delay_ms_to_centis,
};
pub use crate::foundation::error::{GifError, GifResult};
pub use crate::palette::{IndexedFrame, Palette, PaletteFormat};
pub use crate::render::CompositedFrame;
pub use crate::session::{
    GenerateOpts, GenerationController, GenerationState, GifOutput, RunInput, RunOutcome,
    SkipReason, Workspace,
};
pub use crate::store::{
    CanvasSettings, Frame, FrameStore, FrameUpdate, GifSettings, Repeat, SIZE_PRESETS, SizePreset,
    SmoothingQuality,
};
