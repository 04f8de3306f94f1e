//! Frame collection and the settings surface the pipeline reads.

/// Ordered frame collection with delay synchronization.
pub mod frame_store;
/// Canvas, timing, looping and palette settings.
pub mod settings;

pub use frame_store::{Frame, FrameStore, FrameUpdate};
pub use settings::{CanvasSettings, GifSettings, Repeat, SIZE_PRESETS, SizePreset, SmoothingQuality};
