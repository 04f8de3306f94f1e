use std::io::Cursor;

use super::*;

fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_png_keeps_straight_alpha() {
    let buf = png_bytes(1, 1, [100, 50, 200, 128]);
    let raster = decode_image(&buf).unwrap();
    assert_eq!(raster.width(), 1);
    assert_eq!(raster.height(), 1);
    assert_eq!(raster.rgba(), &[100, 50, 200, 128]);
}

#[test]
fn probe_reads_header_only() {
    let buf = png_bytes(7, 3, [0, 0, 0, 255]);
    assert_eq!(probe_dimensions(&buf).unwrap(), (7, 3));
}

#[test]
fn garbage_is_a_source_decode_error() {
    let err = decode_image(b"definitely not an image").unwrap_err();
    assert!(matches!(err, GifError::SourceDecode(_)));

    let err = decode_image_file(Path::new("does/not/exist.png")).unwrap_err();
    assert!(matches!(err, GifError::SourceDecode(_)));
}
