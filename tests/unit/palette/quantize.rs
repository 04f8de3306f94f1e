use super::*;
use crate::foundation::core::TRANSPARENT_SENTINEL;

fn rgba_from(colors: &[Rgb8]) -> Vec<u8> {
    colors.iter().flat_map(|c| [c[0], c[1], c[2], 255]).collect()
}

fn gradient(w: u32, h: u32) -> Vec<Rgb8> {
    (0..h)
        .flat_map(|y| {
            (0..w).map(move |x| [(x * 255 / w.max(1)) as u8, (y * 255 / h.max(1)) as u8, 90])
        })
        .collect()
}

#[test]
fn single_color_is_exact() {
    let rgba = rgba_from(&vec![[12, 200, 77]; 400]);
    let pal = quantize(&rgba, &QuantizeOpts::default()).unwrap();
    assert_eq!(pal.colors(), &[[12, 200, 77]]);
}

#[test]
fn few_colors_are_kept_one_per_bucket() {
    let rgba = rgba_from(&[[0, 0, 0], [255, 255, 255], [0, 0, 0], [128, 64, 32]]);
    let pal = quantize(&rgba, &QuantizeOpts::default()).unwrap();
    assert_eq!(pal.len(), 3);
    assert!(pal.position([0, 0, 0]).is_some());
    assert!(pal.position([255, 255, 255]).is_some());
    assert!(pal.position([128, 64, 32]).is_some());
}

#[test]
fn many_colors_are_bounded_and_deterministic() {
    let rgba = rgba_from(&gradient(256, 256));
    for format in [PaletteFormat::Rgb444, PaletteFormat::Rgb565] {
        let opts = QuantizeOpts {
            format,
            ..QuantizeOpts::default()
        };
        let a = quantize(&rgba, &opts).unwrap();
        let b = quantize(&rgba, &opts).unwrap();
        assert!(a.len() <= MAX_PALETTE_LEN);
        assert!(a.len() > 16);
        assert_eq!(a, b);
    }
}

#[test]
fn max_colors_is_respected() {
    let rgba = rgba_from(&gradient(64, 64));
    let pal = quantize(
        &rgba,
        &QuantizeOpts {
            max_colors: 8,
            ..QuantizeOpts::default()
        },
    )
    .unwrap();
    assert!(pal.len() <= 8);
    assert!(!pal.is_empty());
}

#[test]
fn reserved_color_survives_a_full_palette() {
    let mut colors = gradient(200, 200);
    colors.extend(std::iter::repeat_n(TRANSPARENT_SENTINEL, 500));
    let rgba = rgba_from(&colors);
    let pal = quantize(
        &rgba,
        &QuantizeOpts {
            reserved: Some(TRANSPARENT_SENTINEL),
            ..QuantizeOpts::default()
        },
    )
    .unwrap();

    assert!(pal.len() <= MAX_PALETTE_LEN);
    let idx = pal.position(TRANSPARENT_SENTINEL).unwrap();
    assert_eq!(usize::from(idx), pal.len() - 1);
    assert_eq!(
        pal.colors()
            .iter()
            .filter(|c| **c == TRANSPARENT_SENTINEL)
            .count(),
        1
    );
}

#[test]
fn reserved_color_needs_a_second_slot() {
    let rgba = rgba_from(&[[10, 200, 30], TRANSPARENT_SENTINEL]);
    for max_colors in [0, 1] {
        let err = quantize(
            &rgba,
            &QuantizeOpts {
                max_colors,
                reserved: Some(TRANSPARENT_SENTINEL),
                ..QuantizeOpts::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, GifError::Validation(_)));
    }

    let pal = quantize(
        &rgba,
        &QuantizeOpts {
            max_colors: 2,
            reserved: Some(TRANSPARENT_SENTINEL),
            ..QuantizeOpts::default()
        },
    )
    .unwrap();
    assert_eq!(pal.colors(), &[[10, 200, 30], TRANSPARENT_SENTINEL]);
}

#[test]
fn reserved_color_absent_from_input_takes_no_slot() {
    let rgba = rgba_from(&[[1, 2, 3]]);
    let pal = quantize(
        &rgba,
        &QuantizeOpts {
            reserved: Some(TRANSPARENT_SENTINEL),
            ..QuantizeOpts::default()
        },
    )
    .unwrap();
    assert_eq!(pal.colors(), &[[1, 2, 3]]);
}

#[test]
fn nudge_never_returns_its_input() {
    assert_ne!(nudge(TRANSPARENT_SENTINEL), TRANSPARENT_SENTINEL);
    assert_ne!(nudge([0, 0, 0]), [0, 0, 0]);
}

#[test]
fn table_is_padded_to_a_power_of_two() {
    let pal = Palette::new(vec![[1, 1, 1]]).unwrap();
    assert_eq!(pal.table_bits(), 1);
    assert_eq!(pal.table_bytes(), vec![1, 1, 1, 0, 0, 0]);

    let pal = Palette::new(vec![[0, 0, 0]; 3]).unwrap();
    assert_eq!(pal.table_bits(), 2);
    assert_eq!(pal.table_bytes().len(), 12);

    let pal = Palette::new(vec![[0, 0, 0]; 256]).unwrap();
    assert_eq!(pal.table_bits(), 8);
    assert!(Palette::new(vec![[0, 0, 0]; 257]).is_err());
}

#[test]
fn ragged_buffers_are_rejected() {
    assert!(quantize(&[1, 2, 3], &QuantizeOpts::default()).is_err());
}
