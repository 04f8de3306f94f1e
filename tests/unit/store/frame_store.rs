use super::*;
use crate::assets::raster::RasterImage;

fn src() -> Arc<dyn RasterSource> {
    Arc::new(RasterImage::solid(2, 2, [0, 0, 0, 255]).unwrap())
}

fn store_with(n: usize) -> (FrameStore, Vec<FrameId>) {
    let mut store = FrameStore::new(500);
    let ids = (0..n).map(|_| store.add_frame(src())).collect();
    (store, ids)
}

#[test]
fn add_frame_follows_global_delay_and_appends() {
    let (store, ids) = store_with(3);
    assert_eq!(store.ids(), ids);
    for f in store.frames() {
        assert_eq!(f.delay_ms, 500);
        assert!(f.uses_global_delay);
    }
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn ids_are_never_reused_after_removal() {
    let (mut store, ids) = store_with(2);
    assert!(store.remove_frame(ids[1]));
    let fresh = store.add_frame(src());
    assert!(!ids.contains(&fresh));
}

#[test]
fn global_delay_syncs_only_global_frames() {
    let (mut store, ids) = store_with(3);
    store.set_custom_delay(ids[1], 1200);

    assert_eq!(store.set_global_delay(20), 50);
    assert_eq!(store.get(ids[0]).unwrap().delay_ms, 50);
    assert_eq!(store.get(ids[1]).unwrap().delay_ms, 1200);
    assert_eq!(store.get(ids[2]).unwrap().delay_ms, 50);

    assert_eq!(store.set_global_delay(9000), 5000);
    assert_eq!(store.get(ids[0]).unwrap().delay_ms, 5000);
    assert_eq!(store.get(ids[1]).unwrap().delay_ms, 1200);
}

#[test]
fn delay_only_update_is_an_override() {
    let (mut store, ids) = store_with(1);
    assert!(store.update_frame(
        ids[0],
        FrameUpdate {
            delay_ms: Some(10),
            ..FrameUpdate::default()
        }
    ));
    let f = store.get(ids[0]).unwrap();
    assert_eq!(f.delay_ms, 50);
    assert!(!f.uses_global_delay);

    assert!(store.reset_frame_delay(ids[0]));
    let f = store.get(ids[0]).unwrap();
    assert_eq!(f.delay_ms, 500);
    assert!(f.uses_global_delay);
}

#[test]
fn unknown_ids_are_silent_no_ops() {
    let (mut store, _) = store_with(1);
    assert!(!store.update_frame(FrameId(999), FrameUpdate::default()));
    assert!(!store.remove_frame(FrameId(999)));
    assert_eq!(store.len(), 1);
}

#[test]
fn remove_keeps_other_frames_untouched() {
    let (mut store, ids) = store_with(3);
    store.set_custom_delay(ids[2], 700);
    store.remove_frame(ids[0]);
    assert_eq!(store.ids(), vec![ids[1], ids[2]]);
    assert_eq!(store.get(ids[2]).unwrap().delay_ms, 700);
    assert!(!store.get(ids[2]).unwrap().uses_global_delay);
}

#[test]
fn reorder_accepts_permutations_only() {
    let (mut store, ids) = store_with(3);
    store.set_custom_delay(ids[0], 900);

    store.reorder_frames(&[ids[2], ids[0], ids[1]]).unwrap();
    assert_eq!(store.ids(), vec![ids[2], ids[0], ids[1]]);
    assert_eq!(store.get(ids[0]).unwrap().delay_ms, 900);

    let before = store.ids();
    assert!(store.reorder_frames(&[ids[0], ids[1]]).is_err());
    assert!(store.reorder_frames(&[ids[0], ids[0], ids[1]]).is_err());
    assert!(store.reorder_frames(&[ids[0], ids[1], FrameId(42)]).is_err());
    assert_eq!(store.ids(), before);
}

#[test]
fn move_frame_shifts_neighbours() {
    let (mut store, ids) = store_with(4);
    store.move_frame(0, 2).unwrap();
    assert_eq!(store.ids(), vec![ids[1], ids[2], ids[0], ids[3]]);
    assert_eq!(store.index_of(ids[0]), Some(2));
    assert!(store.move_frame(0, 4).is_err());
}
