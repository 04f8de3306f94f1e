use std::collections::HashSet;
use std::sync::Arc;

use crate::assets::raster::RasterSource;
use crate::foundation::core::{FrameId, clamp_delay_ms};
use crate::foundation::error::{GifError, GifResult};

/// One animation frame as held by the [`FrameStore`].
#[derive(Clone, Debug)]
pub struct Frame {
    /// Stable handle; never changes and is never reused.
    pub id: FrameId,
    /// Where the pixels come from.
    pub source: Arc<dyn RasterSource>,
    /// Display time in milliseconds, always within `[50, 5000]`.
    pub delay_ms: u32,
    /// When `true`, `delay_ms` tracks the store's global delay.
    pub uses_global_delay: bool,
}

/// Partial update merged into an existing frame by [`FrameStore::update_frame`].
///
/// Setting only `delay_ms` is a per-frame override and detaches the frame from the global
/// delay. Setting `uses_global_delay = Some(true)` re-synchronizes the delay.
#[derive(Clone, Debug, Default)]
pub struct FrameUpdate {
    /// Replacement source.
    pub source: Option<Arc<dyn RasterSource>>,
    /// New delay (clamped).
    pub delay_ms: Option<u32>,
    /// Attach to or detach from the global delay.
    pub uses_global_delay: Option<bool>,
}

/// Ordered frame collection; insertion order is playback order.
#[derive(Debug)]
pub struct FrameStore {
    frames: Vec<Frame>,
    global_delay_ms: u32,
    next_id: u64,
}

impl Default for FrameStore {
    fn default() -> Self {
        Self::new(500)
    }
}

impl FrameStore {
    /// Empty store with the given (clamped) global delay.
    pub fn new(global_delay_ms: u32) -> Self {
        Self {
            frames: Vec::new(),
            global_delay_ms: clamp_delay_ms(global_delay_ms),
            next_id: 1,
        }
    }

    /// Append a frame that follows the global delay and return its id.
    pub fn add_frame(&mut self, source: Arc<dyn RasterSource>) -> FrameId {
        let id = FrameId(self.next_id);
        self.next_id += 1;
        self.frames.push(Frame {
            id,
            source,
            delay_ms: self.global_delay_ms,
            uses_global_delay: true,
        });
        id
    }

    /// Merge `update` into frame `id`. Unknown ids are ignored; returns whether a frame changed.
    pub fn update_frame(&mut self, id: FrameId, update: FrameUpdate) -> bool {
        let global = self.global_delay_ms;
        let Some(frame) = self.frames.iter_mut().find(|f| f.id == id) else {
            return false;
        };

        if let Some(source) = update.source {
            frame.source = source;
        }
        match (update.delay_ms, update.uses_global_delay) {
            (_, Some(true)) => {
                frame.uses_global_delay = true;
                frame.delay_ms = global;
            }
            (Some(ms), _) => {
                frame.uses_global_delay = false;
                frame.delay_ms = clamp_delay_ms(ms);
            }
            (None, Some(false)) => frame.uses_global_delay = false,
            (None, None) => {}
        }
        true
    }

    /// Give frame `id` its own delay.
    pub fn set_custom_delay(&mut self, id: FrameId, delay_ms: u32) -> bool {
        self.update_frame(
            id,
            FrameUpdate {
                delay_ms: Some(delay_ms),
                uses_global_delay: Some(false),
                ..FrameUpdate::default()
            },
        )
    }

    /// Re-attach frame `id` to the global delay.
    pub fn reset_frame_delay(&mut self, id: FrameId) -> bool {
        self.update_frame(
            id,
            FrameUpdate {
                uses_global_delay: Some(true),
                ..FrameUpdate::default()
            },
        )
    }

    /// Remove frame `id`. Unknown ids are ignored; returns whether a frame was removed.
    pub fn remove_frame(&mut self, id: FrameId) -> bool {
        let before = self.frames.len();
        self.frames.retain(|f| f.id != id);
        self.frames.len() != before
    }

    /// Replace the playback order.
    ///
    /// `order` must be a permutation of the current ids; anything else is rejected and the
    /// store is left unchanged.
    pub fn reorder_frames(&mut self, order: &[FrameId]) -> GifResult<()> {
        if order.len() != self.frames.len() {
            return Err(GifError::validation(format!(
                "reorder must list all {} frames, got {}",
                self.frames.len(),
                order.len()
            )));
        }
        let mut seen = HashSet::with_capacity(order.len());
        for id in order {
            if !seen.insert(*id) {
                return Err(GifError::validation(format!("reorder lists {id} twice")));
            }
        }

        let mut reordered = Vec::with_capacity(order.len());
        for id in order {
            let frame = self
                .frames
                .iter()
                .find(|f| f.id == *id)
                .ok_or_else(|| GifError::validation(format!("reorder names unknown {id}")))?;
            reordered.push(frame.clone());
        }
        self.frames = reordered;
        Ok(())
    }

    /// Move the frame at `from` so that it ends up at index `to`.
    pub fn move_frame(&mut self, from: usize, to: usize) -> GifResult<()> {
        let len = self.frames.len();
        if from >= len || to >= len {
            return Err(GifError::validation(format!(
                "move_frame indices {from}->{to} out of range for {len} frames"
            )));
        }
        let mut order = self.ids();
        let moved = order.remove(from);
        order.insert(to, moved);
        self.reorder_frames(&order)
    }

    /// Set the global delay and resynchronize every frame that follows it.
    ///
    /// Returns the clamped value actually stored.
    pub fn set_global_delay(&mut self, delay_ms: u32) -> u32 {
        let delay_ms = clamp_delay_ms(delay_ms);
        self.global_delay_ms = delay_ms;
        for frame in self.frames.iter_mut().filter(|f| f.uses_global_delay) {
            frame.delay_ms = delay_ms;
        }
        delay_ms
    }

    /// Current global delay.
    pub fn global_delay_ms(&self) -> u32 {
        self.global_delay_ms
    }

    /// Frames in playback order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Ids in playback order.
    pub fn ids(&self) -> Vec<FrameId> {
        self.frames.iter().map(|f| f.id).collect()
    }

    /// Look up one frame.
    pub fn get(&self, id: FrameId) -> Option<&Frame> {
        self.frames.iter().find(|f| f.id == id)
    }

    /// Position of frame `id` in playback order.
    pub fn index_of(&self, id: FrameId) -> Option<usize> {
        self.frames.iter().position(|f| f.id == id)
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// `true` when the store holds no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/frame_store.rs"]
mod tests;
