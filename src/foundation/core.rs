use std::fmt;

/// 8-bit RGB triple.
pub type Rgb8 = [u8; 3];

/// Reserved color that carries "fully transparent" through quantization.
///
/// Pure magenta rarely appears as a solid region in photographic or drawn content.
pub const TRANSPARENT_SENTINEL: Rgb8 = [255, 0, 255];

/// Shortest frame delay accepted by the pipeline, in milliseconds.
pub const MIN_DELAY_MS: u32 = 50;
/// Longest frame delay accepted by the pipeline, in milliseconds.
pub const MAX_DELAY_MS: u32 = 5000;

/// Canvas width bounds (inclusive).
pub const MIN_CANVAS_WIDTH: u32 = 100;
/// Canvas width bounds (inclusive).
pub const MAX_CANVAS_WIDTH: u32 = 1920;
/// Canvas height bounds (inclusive).
pub const MIN_CANVAS_HEIGHT: u32 = 100;
/// Canvas height bounds (inclusive).
pub const MAX_CANVAS_HEIGHT: u32 = 1080;

/// Stable, never-reused frame handle handed out by the frame store.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameId(pub u64);

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame#{}", self.0)
    }
}

/// Clamp a delay to `[MIN_DELAY_MS, MAX_DELAY_MS]`.
pub fn clamp_delay_ms(ms: u32) -> u32 {
    ms.clamp(MIN_DELAY_MS, MAX_DELAY_MS)
}

/// Clamp a canvas size to the supported output bounds.
pub fn clamp_canvas_size(width: u32, height: u32) -> (u32, u32) {
    (
        width.clamp(MIN_CANVAS_WIDTH, MAX_CANVAS_WIDTH),
        height.clamp(MIN_CANVAS_HEIGHT, MAX_CANVAS_HEIGHT),
    )
}

/// Convert milliseconds to the container's hundredths-of-a-second delay field.
///
/// Truncates toward zero and saturates at `u16::MAX`.
pub fn delay_ms_to_centis(ms: u32) -> u16 {
    u16::try_from(ms / 10).unwrap_or(u16::MAX)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
