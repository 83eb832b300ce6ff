//! Fixtures shared by tests in this and dependent crates

use std::io::Cursor;

/// Encode a solid-colour RGBA PNG of the given size
pub fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([120, 40, 200, 255]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .expect("in-memory PNG encoding cannot fail");
    out.into_inner()
}
