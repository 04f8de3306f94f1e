use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use crate::assets::raster::RasterSource;
use crate::foundation::core::FrameId;
use crate::foundation::error::GifResult;
use crate::session::controller::{GenerateOpts, GenerationController, RunInput};
use crate::session::debounce::{DEFAULT_DEBOUNCE_MS, DebouncedTrigger};
use crate::session::state::{GenerationState, GifOutput, RunOutcome, SkipReason};
use crate::store::frame_store::{Frame, FrameStore, FrameUpdate};
use crate::store::settings::{CanvasSettings, GifSettings, Repeat, SizePreset};

type ProbeResult = (FrameId, GifResult<(u32, u32)>);

fn read<T>(l: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    l.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(l: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    l.write().unwrap_or_else(PoisonError::into_inner)
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Explicit context object owning every piece of shared editor state.
///
/// Mutations go through its methods. When auto-update is enabled each mutation schedules a
/// debounced run; the owner drives time by calling [`Workspace::tick`].
#[derive(Debug)]
pub struct Workspace {
    store: RwLock<FrameStore>,
    settings: RwLock<GifSettings>,
    controller: GenerationController,
    trigger: Mutex<DebouncedTrigger>,
    canvas_probe: Mutex<Option<Receiver<ProbeResult>>>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(GifSettings::default())
    }
}

impl Workspace {
    /// Workspace with sequential generation and the default quiet period.
    pub fn new(settings: GifSettings) -> Self {
        Self::with_options(settings, GenerateOpts::default(), DEFAULT_DEBOUNCE_MS)
    }

    /// Workspace with explicit generation options and debounce quiet period.
    pub fn with_options(settings: GifSettings, opts: GenerateOpts, debounce_ms: u64) -> Self {
        let settings = settings.validated();
        Self {
            store: RwLock::new(FrameStore::new(settings.global_delay_ms)),
            settings: RwLock::new(settings),
            controller: GenerationController::new(opts),
            trigger: Mutex::new(DebouncedTrigger::new(debounce_ms)),
            canvas_probe: Mutex::new(None),
        }
    }

    /// Append a frame. The first frame of an empty store also starts a background probe of its
    /// dimensions, applied to the canvas on a later [`Self::tick`].
    pub fn add_frame(&self, source: Arc<dyn RasterSource>) -> FrameId {
        let (id, first) = {
            let mut store = write(&self.store);
            let first = store.is_empty();
            (store.add_frame(Arc::clone(&source)), first)
        };
        tracing::debug!(%id, "frame added");
        if first {
            self.spawn_canvas_probe(id, source);
        }
        self.after_change();
        id
    }

    /// Merge a partial update into frame `id`.
    pub fn update_frame(&self, id: FrameId, update: FrameUpdate) -> bool {
        let changed = write(&self.store).update_frame(id, update);
        if changed {
            self.after_change();
        }
        changed
    }

    /// Give frame `id` its own delay.
    pub fn set_custom_delay(&self, id: FrameId, delay_ms: u32) -> bool {
        let changed = write(&self.store).set_custom_delay(id, delay_ms);
        if changed {
            self.after_change();
        }
        changed
    }

    /// Re-attach frame `id` to the global delay.
    pub fn reset_frame_delay(&self, id: FrameId) -> bool {
        let changed = write(&self.store).reset_frame_delay(id);
        if changed {
            self.after_change();
        }
        changed
    }

    /// Remove frame `id`.
    pub fn remove_frame(&self, id: FrameId) -> bool {
        let removed = write(&self.store).remove_frame(id);
        if removed {
            tracing::debug!(%id, "frame removed");
            self.after_change();
        }
        removed
    }

    /// Replace the playback order with a permutation of the current ids.
    pub fn reorder_frames(&self, order: &[FrameId]) -> GifResult<()> {
        write(&self.store).reorder_frames(order)?;
        self.after_change();
        Ok(())
    }

    /// Move one frame by index.
    pub fn move_frame(&self, from: usize, to: usize) -> GifResult<()> {
        write(&self.store).move_frame(from, to)?;
        self.after_change();
        Ok(())
    }

    /// Set the global delay; returns the clamped value.
    pub fn set_global_delay(&self, delay_ms: u32) -> u32 {
        let applied = {
            let mut store = write(&self.store);
            let applied = store.set_global_delay(delay_ms);
            write(&self.settings).global_delay_ms = applied;
            applied
        };
        self.after_change();
        applied
    }

    /// Frames in playback order.
    pub fn frames(&self) -> Vec<Frame> {
        read(&self.store).frames().to_vec()
    }

    /// Ids in playback order.
    pub fn frame_ids(&self) -> Vec<FrameId> {
        read(&self.store).ids()
    }

    /// One frame by id.
    pub fn frame(&self, id: FrameId) -> Option<Frame> {
        read(&self.store).get(id).cloned()
    }

    /// Number of frames.
    pub fn frame_count(&self) -> usize {
        read(&self.store).len()
    }

    /// Current settings. A finished first-frame size probe is applied first.
    pub fn settings(&self) -> GifSettings {
        self.poll_canvas_probe(Instant::now());
        *read(&self.settings)
    }

    /// Replace all settings. A changed global delay is pushed into the frame store.
    pub fn update_settings(&self, settings: GifSettings) {
        let settings = settings.validated();
        {
            let mut store = write(&self.store);
            if store.global_delay_ms() != settings.global_delay_ms {
                store.set_global_delay(settings.global_delay_ms);
            }
            *write(&self.settings) = settings;
        }
        if !settings.auto_update {
            self.cancel_auto_run();
        }
        self.after_change();
    }

    /// Replace the canvas; visible to the next run only.
    pub fn set_canvas(&self, canvas: CanvasSettings) {
        write(&self.settings).canvas = canvas.validated();
        self.after_change();
    }

    /// Resize the canvas to a preset.
    pub fn apply_preset(&self, preset: &SizePreset) {
        {
            let mut settings = write(&self.settings);
            settings.canvas = settings.canvas.apply_preset(preset);
        }
        self.after_change();
    }

    /// Change the looping behavior.
    pub fn set_repeat(&self, repeat: Repeat) {
        write(&self.settings).repeat = repeat.normalized();
        self.after_change();
    }

    /// Enable or disable auto-generation; disabling cancels a pending run.
    pub fn set_auto_update(&self, enabled: bool) {
        write(&self.settings).auto_update = enabled;
        if enabled {
            self.after_change();
        } else {
            self.cancel_auto_run();
        }
    }

    /// Generation controller shared by manual and automatic runs.
    pub fn controller(&self) -> &GenerationController {
        &self.controller
    }

    /// Snapshot of the generation state.
    pub fn generation_state(&self) -> GenerationState {
        self.controller.state()
    }

    /// Output of the most recent successful run.
    pub fn last_output(&self) -> Option<GifOutput> {
        self.controller.last_output()
    }

    /// Observe generation state changes.
    pub fn subscribe(&self) -> mpsc::Receiver<GenerationState> {
        self.controller.subscribe()
    }

    /// Run generation now against the current frames and settings.
    pub fn generate(&self) -> GifResult<RunOutcome> {
        self.poll_canvas_probe(Instant::now());
        let input = self.run_input();
        self.controller.generate(&input)
    }

    /// `true` while a debounced run waits for its quiet period.
    pub fn auto_run_pending(&self) -> bool {
        lock(&self.trigger).is_pending()
    }

    /// Apply a finished canvas probe and fire a due debounced run.
    pub fn tick(&self) -> GifResult<Option<RunOutcome>> {
        self.tick_at(Instant::now())
    }

    /// [`Self::tick`] against an explicit clock reading.
    ///
    /// A due run that finds another run in flight stays pending and fires on a later tick.
    pub fn tick_at(&self, now: Instant) -> GifResult<Option<RunOutcome>> {
        self.poll_canvas_probe(now);

        if self.controller.is_generating() {
            return Ok(None);
        }
        let Some(ticket) = lock(&self.trigger).tick_at(now) else {
            return Ok(None);
        };

        tracing::debug!(%ticket, "auto-generation firing");
        let outcome = self.generate()?;
        if outcome == RunOutcome::Skipped(SkipReason::Busy) {
            lock(&self.trigger).rearm(ticket, now);
        }
        Ok(Some(outcome))
    }

    /// Block until the first-frame canvas probe, if any, has finished and apply it.
    ///
    /// Returns `true` when the canvas was resized.
    pub fn wait_for_canvas_autosize(&self) -> bool {
        let Some(rx) = lock(&self.canvas_probe).take() else {
            return false;
        };
        match rx.recv() {
            Ok(result) => self.apply_canvas_probe(result, Instant::now()),
            Err(_) => false,
        }
    }

    fn run_input(&self) -> RunInput {
        let frames = read(&self.store).frames().to_vec();
        let settings = *read(&self.settings);
        RunInput::new(frames, &settings)
    }

    fn after_change(&self) {
        self.schedule_auto_run_at(Instant::now());
    }

    fn schedule_auto_run_at(&self, now: Instant) {
        let enabled = read(&self.settings).auto_update;
        if !enabled || read(&self.store).is_empty() {
            return;
        }
        lock(&self.trigger).schedule_at(now);
    }

    fn cancel_auto_run(&self) {
        lock(&self.trigger).cancel();
    }

    fn spawn_canvas_probe(&self, id: FrameId, source: Arc<dyn RasterSource>) {
        let (tx, rx) = mpsc::channel();
        *lock(&self.canvas_probe) = Some(rx);
        std::thread::spawn(move || {
            // The receiver may be gone if a newer probe replaced it.
            let _ = tx.send((id, source.dimensions()));
        });
    }

    fn poll_canvas_probe(&self, now: Instant) -> bool {
        let result = {
            let mut slot = lock(&self.canvas_probe);
            let Some(rx) = slot.as_ref() else {
                return false;
            };
            match rx.try_recv() {
                Ok(result) => {
                    *slot = None;
                    result
                }
                Err(TryRecvError::Empty) => return false,
                Err(TryRecvError::Disconnected) => {
                    *slot = None;
                    return false;
                }
            }
        };
        self.apply_canvas_probe(result, now)
    }

    fn apply_canvas_probe(&self, (id, dims): ProbeResult, now: Instant) -> bool {
        let (w, h) = match dims {
            Ok(dims) => dims,
            Err(e) => {
                tracing::warn!(%id, error = %e, "canvas auto-size probe failed");
                return false;
            }
        };
        if read(&self.store).get(id).is_none() {
            tracing::debug!(%id, "first frame removed before its size was known");
            return false;
        }
        let canvas = {
            let mut settings = write(&self.settings);
            settings.canvas = settings.canvas.with_size(w, h);
            settings.canvas
        };
        tracing::info!(
            %id,
            width = canvas.width,
            height = canvas.height,
            "canvas sized from first frame"
        );
        self.schedule_auto_run_at(now);
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/workspace.rs"]
mod tests;
