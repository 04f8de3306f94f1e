use super::*;

#[test]
fn delay_clamps_to_bounds() {
    assert_eq!(clamp_delay_ms(0), MIN_DELAY_MS);
    assert_eq!(clamp_delay_ms(49), 50);
    assert_eq!(clamp_delay_ms(200), 200);
    assert_eq!(clamp_delay_ms(5001), MAX_DELAY_MS);
}

#[test]
fn canvas_size_clamps_each_axis() {
    assert_eq!(clamp_canvas_size(50, 50), (100, 100));
    assert_eq!(clamp_canvas_size(640, 480), (640, 480));
    assert_eq!(clamp_canvas_size(4000, 4000), (1920, 1080));
}

#[test]
fn centis_truncate() {
    assert_eq!(delay_ms_to_centis(200), 20);
    assert_eq!(delay_ms_to_centis(55), 5);
    assert_eq!(delay_ms_to_centis(59), 5);
    assert_eq!(delay_ms_to_centis(u32::MAX), u16::MAX);
}

#[test]
fn frame_id_display() {
    assert_eq!(FrameId(7).to_string(), "frame#7");
}
