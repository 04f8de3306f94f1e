use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, mpsc};

use rayon::prelude::*;

use crate::assets::raster::RasterImage;
use crate::encode::container::GifEncoder;
use crate::foundation::error::{GifError, GifResult};
use crate::palette::mapper::{IndexedFrame, index_frame};
use crate::palette::quantize::PaletteFormat;
use crate::render::composite::composite;
use crate::session::state::{GenerationState, GifOutput, RunOutcome, SkipReason, suggested_filename};
use crate::store::frame_store::Frame;
use crate::store::settings::{CanvasSettings, GifSettings, Repeat};

/// Share of the progress range spent on per-frame work; the rest covers container assembly.
const FRAME_PROGRESS_SPAN: f32 = 80.0;
const FINISH_PROGRESS: f32 = 90.0;

/// Threading and chunking controls for a generation run.
#[derive(Clone, Debug)]
pub struct GenerateOpts {
    /// Composite and quantize frames of a chunk in parallel (rayon).
    pub parallel: bool,
    /// Frames per parallel chunk.
    pub chunk_size: usize,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

impl Default for GenerateOpts {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 8,
            threads: None,
        }
    }
}

/// Everything one run reads, captured when the run is requested.
#[derive(Clone, Debug)]
pub struct RunInput {
    /// Frames in playback order.
    pub frames: Vec<Frame>,
    /// Output canvas.
    pub canvas: CanvasSettings,
    /// Looping behavior.
    pub repeat: Repeat,
    /// Quantizer bucket precision.
    pub palette_format: PaletteFormat,
}

impl RunInput {
    /// Capture a run's input from frames and settings.
    pub fn new(frames: Vec<Frame>, settings: &GifSettings) -> Self {
        Self {
            frames,
            canvas: settings.canvas.validated(),
            repeat: settings.repeat,
            palette_format: settings.palette_format,
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Releases the single-flight flag even if a run unwinds.
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives FrameStore frames through compositing, quantization and container encoding.
///
/// At most one run is active at a time; a request made while a run is in flight returns
/// [`SkipReason::Busy`] without touching the running encoder.
#[derive(Debug, Default)]
pub struct GenerationController {
    opts: GenerateOpts,
    busy: AtomicBool,
    state: Mutex<GenerationState>,
    last_output: Mutex<Option<GifOutput>>,
    observers: Mutex<Vec<mpsc::Sender<GenerationState>>>,
}

impl GenerationController {
    /// Controller with the given threading options.
    pub fn new(opts: GenerateOpts) -> Self {
        Self {
            opts,
            ..Self::default()
        }
    }

    /// Snapshot of the observable state.
    pub fn state(&self) -> GenerationState {
        lock(&self.state).clone()
    }

    /// `true` while a run owns the encoder.
    pub fn is_generating(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Output of the most recent successful run; survives later failed runs.
    pub fn last_output(&self) -> Option<GifOutput> {
        lock(&self.last_output).clone()
    }

    /// Receive a state snapshot after every change.
    pub fn subscribe(&self) -> mpsc::Receiver<GenerationState> {
        let (tx, rx) = mpsc::channel();
        lock(&self.observers).push(tx);
        rx
    }

    fn notify(&self, snapshot: GenerationState) {
        lock(&self.observers).retain(|tx| tx.send(snapshot.clone()).is_ok());
    }

    fn update_state(&self, f: impl FnOnce(&mut GenerationState)) {
        let snapshot = {
            let mut s = lock(&self.state);
            f(&mut s);
            s.clone()
        };
        self.notify(snapshot);
    }

    fn set_progress(&self, percent: f32) {
        self.update_state(|s| {
            s.progress_percent = s.progress_percent.max(percent.clamp(0.0, 100.0));
        });
    }

    /// Run the whole pipeline once.
    ///
    /// Empty input and concurrent requests are skipped without changing the state. Any step
    /// failure aborts the run, resets the state to `{false, 0, None}` and is returned.
    #[tracing::instrument(skip_all, fields(frames = input.frames.len()))]
    pub fn generate(&self, input: &RunInput) -> GifResult<RunOutcome> {
        if input.frames.is_empty() {
            tracing::debug!("no frames; generation skipped");
            return Ok(RunOutcome::Skipped(SkipReason::EmptyInput));
        }
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("generation already in flight; request ignored");
            return Ok(RunOutcome::Skipped(SkipReason::Busy));
        }
        let guard = FlightGuard(&self.busy);

        self.update_state(|s| *s = GenerationState {
            is_generating: true,
            progress_percent: 0.0,
            result: None,
        });

        let outcome = self.run(input);

        // Publish the terminal state and release the flight flag under the state lock so a
        // follow-up run cannot publish before this one has finished.
        let snapshot = {
            let mut s = lock(&self.state);
            *s = match &outcome {
                Ok(out) => GenerationState {
                    is_generating: false,
                    progress_percent: 100.0,
                    result: Some(out.clone()),
                },
                Err(_) => GenerationState::default(),
            };
            drop(guard);
            s.clone()
        };
        self.notify(snapshot);

        match outcome {
            Ok(out) => {
                *lock(&self.last_output) = Some(out.clone());
                Ok(RunOutcome::Completed(out))
            }
            Err(e) => {
                tracing::warn!(error = %e, "gif generation failed");
                Err(e)
            }
        }
    }

    fn run(&self, input: &RunInput) -> GifResult<GifOutput> {
        let total = input.frames.len();
        let canvas = input.canvas;
        tracing::info!(
            frames = total,
            width = canvas.width,
            height = canvas.height,
            "gif generation started"
        );

        let mut encoder = GifEncoder::new(canvas.width, canvas.height, input.repeat)?;
        let frame_progress = |i: usize| i as f32 / total as f32 * FRAME_PROGRESS_SPAN;

        if self.opts.parallel {
            let pool = build_thread_pool(self.opts.threads)?;
            let chunk_size = self.opts.chunk_size.max(1);
            for (chunk_idx, chunk) in input.frames.chunks(chunk_size).enumerate() {
                self.set_progress(frame_progress(chunk_idx * chunk_size));
                let rasters = chunk
                    .iter()
                    .map(load_source)
                    .collect::<GifResult<Vec<_>>>()?;
                let indexed = pool.install(|| {
                    rasters
                        .par_iter()
                        .map(|r| index_raster(r, &canvas, input.palette_format))
                        .collect::<GifResult<Vec<_>>>()
                })?;
                for (frame, ix) in chunk.iter().zip(indexed) {
                    tracing::debug!(id = %frame.id, delay_ms = frame.delay_ms, "frame encoded");
                    encoder.write_frame(ix, frame.delay_ms)?;
                }
            }
        } else {
            for (i, frame) in input.frames.iter().enumerate() {
                self.set_progress(frame_progress(i));
                let raster = load_source(frame)?;
                let indexed = index_raster(&raster, &canvas, input.palette_format)?;
                encoder.write_frame(indexed, frame.delay_ms)?;
                tracing::debug!(id = %frame.id, delay_ms = frame.delay_ms, "frame encoded");
                std::thread::yield_now();
            }
        }

        self.set_progress(FINISH_PROGRESS);
        encoder.finish()?;
        let frame_count = encoder.frames_written();
        let bytes = encoder.into_bytes()?;
        tracing::info!(bytes = bytes.len(), frames = frame_count, "gif generation finished");

        Ok(GifOutput {
            bytes: Arc::new(bytes),
            suggested_filename: suggested_filename(),
            width: canvas.width,
            height: canvas.height,
            frame_count,
        })
    }
}

fn load_source(frame: &Frame) -> GifResult<RasterImage> {
    frame.source.load().map_err(|e| match e {
        GifError::SourceDecode(msg) => GifError::source_decode(format!("{}: {msg}", frame.id)),
        other => GifError::source_decode(format!("{}: {other}", frame.id)),
    })
}

fn index_raster(
    raster: &RasterImage,
    canvas: &CanvasSettings,
    format: PaletteFormat,
) -> GifResult<IndexedFrame> {
    let composited = composite(raster, canvas)?;
    index_frame(&composited, format)
}

fn build_thread_pool(threads: Option<usize>) -> GifResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(GifError::validation(
            "generation 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| GifError::generation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/session/controller.rs"]
mod tests;
