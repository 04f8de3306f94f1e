use std::io::Cursor;

use super::*;

#[test]
fn new_rejects_mismatched_buffers() {
    assert!(RasterImage::new(2, 2, vec![0; 16]).is_ok());
    assert!(RasterImage::new(2, 2, vec![0; 15]).is_err());
    assert!(RasterImage::new(0, 2, vec![]).is_err());
}

#[test]
fn solid_fills_every_pixel() {
    let r = RasterImage::solid(3, 2, [1, 2, 3, 4]).unwrap();
    assert_eq!(r.rgba().len(), 24);
    assert!(r.rgba().chunks_exact(4).all(|px| px == [1, 2, 3, 4]));
}

#[test]
fn raster_is_its_own_source() {
    let r = RasterImage::solid(4, 5, [9, 9, 9, 255]).unwrap();
    assert_eq!(r.dimensions().unwrap(), (4, 5));
    assert_eq!(r.load().unwrap(), r);
}

#[test]
fn encoded_source_decodes_lazily() {
    let img = image::RgbaImage::from_pixel(6, 4, image::Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let src = EncodedImageSource::new(buf);
    assert_eq!(src.dimensions().unwrap(), (6, 4));
    let raster = src.load().unwrap();
    assert_eq!(&raster.rgba()[..4], &[10, 20, 30, 255]);

    let broken = EncodedImageSource::new(vec![1, 2, 3]);
    assert!(matches!(broken.load(), Err(GifError::SourceDecode(_))));
}

#[test]
fn file_source_missing_file_fails_to_load() {
    let src = FileSource::new("target/definitely-missing.png");
    assert!(matches!(src.load(), Err(GifError::SourceDecode(_))));
    assert!(src.dimensions().is_err());
}
