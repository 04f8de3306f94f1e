use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// A finished animation and the metadata a caller needs to offer it for download.
#[derive(Clone, Debug, PartialEq)]
pub struct GifOutput {
    /// Complete GIF89a bytes.
    pub bytes: Arc<Vec<u8>>,
    /// Suggested download name, `animated-gif-<unix-millis>.gif`.
    pub suggested_filename: String,
    /// Canvas width.
    pub width: u32,
    /// Canvas height.
    pub height: u32,
    /// Number of frame blocks in the container.
    pub frame_count: usize,
}

/// Observable generation progress.
///
/// Reset when a run starts; ends as `{false, 100, Some(_)}` on success and
/// `{false, 0, None}` on failure.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenerationState {
    /// A run currently owns the encoder.
    pub is_generating: bool,
    /// Progress in `0.0..=100.0`, non-decreasing within a run.
    pub progress_percent: f32,
    /// Output of the run that produced this state.
    pub result: Option<GifOutput>,
}

/// Why a generation request did not start a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The frame store is empty.
    EmptyInput,
    /// Another run is in flight.
    Busy,
}

/// Result of a generation request that did not fail.
#[derive(Clone, Debug, PartialEq)]
pub enum RunOutcome {
    /// A run finished and produced an animation.
    Completed(GifOutput),
    /// No run was started.
    Skipped(SkipReason),
}

impl RunOutcome {
    /// The produced output, if a run completed.
    pub fn output(&self) -> Option<&GifOutput> {
        match self {
            Self::Completed(out) => Some(out),
            Self::Skipped(_) => None,
        }
    }
}

/// File name offered for a result created now.
pub fn suggested_filename() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("animated-gif-{millis}.gif")
}
