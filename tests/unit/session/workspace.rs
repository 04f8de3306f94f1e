use std::time::Duration;

use super::*;
use crate::assets::raster::RasterImage;

fn raster(w: u32, h: u32) -> Arc<dyn RasterSource> {
    Arc::new(RasterImage::solid(w, h, [40, 80, 120, 255]).unwrap())
}

fn auto_workspace() -> Workspace {
    Workspace::with_options(
        GifSettings {
            auto_update: true,
            ..GifSettings::default()
        },
        GenerateOpts::default(),
        100,
    )
}

fn later(ms: u64) -> Instant {
    Instant::now() + Duration::from_millis(ms)
}

#[derive(Debug)]
struct Gated {
    entered: mpsc::Sender<()>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl RasterSource for Gated {
    fn load(&self) -> GifResult<RasterImage> {
        let _ = self.entered.send(());
        let _ = lock(&self.release).recv();
        RasterImage::solid(10, 10, [0, 0, 0, 255])
    }

    fn dimensions(&self) -> GifResult<(u32, u32)> {
        Ok((10, 10))
    }
}

#[test]
fn first_frame_sizes_the_canvas() {
    let ws = Workspace::default();
    ws.add_frame(raster(300, 200));
    assert!(ws.wait_for_canvas_autosize());
    let canvas = ws.settings().canvas;
    assert_eq!((canvas.width, canvas.height), (300, 200));

    ws.add_frame(raster(640, 480));
    assert!(!ws.wait_for_canvas_autosize());
    assert_eq!(ws.settings().canvas.width, 300);
}

#[test]
fn autosize_is_clamped_to_canvas_bounds() {
    let ws = Workspace::default();
    ws.add_frame(raster(20, 4000));
    assert!(ws.wait_for_canvas_autosize());
    let canvas = ws.settings().canvas;
    assert_eq!((canvas.width, canvas.height), (100, 1080));
}

#[test]
fn autosize_is_dropped_when_first_frame_is_gone() {
    let ws = Workspace::default();
    let id = ws.add_frame(raster(300, 200));
    assert!(ws.remove_frame(id));
    assert!(!ws.wait_for_canvas_autosize());
    assert_eq!(ws.settings().canvas, CanvasSettings::default());
}

#[test]
fn tick_applies_a_finished_probe() {
    let ws = Workspace::default();
    ws.add_frame(raster(250, 150));
    let deadline = later(5_000);
    while read(&ws.settings).canvas.width != 250 && Instant::now() < deadline {
        ws.tick().unwrap();
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(read(&ws.settings).canvas.height, 150);
}

#[test]
fn generate_applies_a_finished_probe_without_tick() {
    let ws = Workspace::default();
    ws.add_frame(raster(300, 200));
    let deadline = later(5_000);
    let mut size = (0, 0);
    while size != (300, 200) && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
        let out = ws.generate().unwrap().output().cloned().unwrap();
        size = (out.width, out.height);
    }
    assert_eq!(size, (300, 200));
}

#[test]
fn settings_reads_apply_a_finished_probe() {
    let ws = Workspace::default();
    ws.add_frame(raster(320, 240));
    let deadline = later(5_000);
    while ws.settings().canvas.width != 320 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(ws.settings().canvas.height, 240);
    assert!(lock(&ws.canvas_probe).is_none());
}

#[test]
fn mutations_schedule_one_debounced_run() {
    let ws = auto_workspace();
    let id = ws.add_frame(raster(120, 120));
    ws.wait_for_canvas_autosize();
    ws.set_custom_delay(id, 300);
    ws.set_global_delay(700);
    assert!(ws.auto_run_pending());

    assert_eq!(ws.tick_at(Instant::now()).unwrap(), None);
    let outcome = ws.tick_at(later(1_000)).unwrap().unwrap();
    assert_eq!(outcome.output().unwrap().frame_count, 1);
    assert!(!ws.auto_run_pending());
    assert_eq!(ws.tick_at(later(2_000)).unwrap(), None);
    assert!(ws.last_output().is_some());
}

#[test]
fn auto_update_off_never_schedules() {
    let ws = Workspace::default();
    ws.add_frame(raster(120, 120));
    ws.set_global_delay(900);
    assert!(!ws.auto_run_pending());
    assert_eq!(ws.tick_at(later(5_000)).unwrap(), None);
    assert!(ws.last_output().is_none());
}

#[test]
fn disabling_auto_update_cancels_the_pending_run() {
    let ws = auto_workspace();
    ws.add_frame(raster(120, 120));
    assert!(ws.auto_run_pending());
    ws.set_auto_update(false);
    assert!(!ws.auto_run_pending());
    assert_eq!(ws.tick_at(later(5_000)).unwrap(), None);
}

#[test]
fn empty_store_does_not_schedule() {
    let ws = auto_workspace();
    ws.set_global_delay(900);
    ws.set_repeat(Repeat::Finite(2));
    assert!(!ws.auto_run_pending());
}

#[test]
fn due_run_waits_for_the_in_flight_run() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let ws = Arc::new(auto_workspace());
    ws.add_frame(Arc::new(Gated {
        entered: entered_tx,
        release: Mutex::new(release_rx),
    }));
    ws.wait_for_canvas_autosize();

    let worker = {
        let ws = Arc::clone(&ws);
        std::thread::spawn(move || ws.generate())
    };
    entered_rx.recv().unwrap();

    ws.set_global_delay(1_000);
    assert_eq!(ws.tick_at(later(10_000)).unwrap(), None);
    assert!(ws.auto_run_pending());

    release_tx.send(()).unwrap();
    assert!(worker.join().unwrap().unwrap().output().is_some());

    // The coalesced run loads the gated source again.
    release_tx.send(()).unwrap();
    let outcome = ws.tick_at(later(10_000)).unwrap().unwrap();
    assert!(outcome.output().is_some());
    assert!(!ws.auto_run_pending());
}

#[test]
fn global_delay_stays_in_sync_with_settings() {
    let ws = Workspace::default();
    let a = ws.add_frame(raster(120, 120));
    let b = ws.add_frame(raster(120, 120));
    ws.set_custom_delay(b, 2_000);

    assert_eq!(ws.set_global_delay(10), 50);
    assert_eq!(ws.settings().global_delay_ms, 50);
    assert_eq!(ws.frame(a).unwrap().delay_ms, 50);
    assert_eq!(ws.frame(b).unwrap().delay_ms, 2_000);

    ws.update_settings(GifSettings {
        global_delay_ms: 9_000,
        ..ws.settings()
    });
    assert_eq!(ws.frame(a).unwrap().delay_ms, 5_000);
    assert_eq!(ws.frame(b).unwrap().delay_ms, 2_000);

    assert!(ws.reset_frame_delay(b));
    assert_eq!(ws.frame(b).unwrap().delay_ms, 5_000);
}

#[test]
fn reorder_and_move_go_through_the_store() {
    let ws = Workspace::default();
    let ids: Vec<_> = (0..3).map(|_| ws.add_frame(raster(120, 120))).collect();
    ws.reorder_frames(&[ids[2], ids[0], ids[1]]).unwrap();
    assert_eq!(ws.frame_ids(), vec![ids[2], ids[0], ids[1]]);

    ws.move_frame(0, 2).unwrap();
    assert_eq!(ws.frame_ids(), ids);

    assert!(ws.reorder_frames(&[ids[0], ids[0], ids[1]]).is_err());
    assert_eq!(ws.frame_ids(), ids);
    assert_eq!(ws.frame_count(), 3);
}

#[test]
fn presets_and_canvas_updates_are_clamped() {
    let ws = Workspace::default();
    ws.apply_preset(&crate::store::settings::SIZE_PRESETS[3]);
    let c = ws.settings().canvas;
    assert_eq!((c.width, c.height), (800, 600));

    ws.set_canvas(CanvasSettings {
        width: 5_000,
        height: 1,
        ..c
    });
    let c = ws.settings().canvas;
    assert_eq!((c.width, c.height), (1920, 100));
}
