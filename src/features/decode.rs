//! Image decoding for the feature extractor.
//!
//! Uploaded bytes (PNG/JPEG/BMP/GIF) are always decoded to 8-bit RGB:
//! grayscale is expanded to three channels and alpha is dropped, so the
//! extractor sees a single channel order regardless of the source file.

use image::RgbImage;

use crate::error::{LeafError, Result};

pub fn decode_image(bytes: &[u8]) -> Result<RgbImage> {
    let img = image::load_from_memory(bytes).map_err(LeafError::Decode)?;
    let rgb = img.to_rgb8();
    if rgb.width() == 0 || rgb.height() == 0 {
        return Err(LeafError::invalid_image("decoded image has no pixels"));
    }
    Ok(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageOutputFormat, LumaA, ImageBuffer, DynamicImage};
    use std::io::Cursor;

    #[test]
    fn grayscale_alpha_png_decodes_to_rgb() {
        let gray: ImageBuffer<LumaA<u8>, Vec<u8>> = ImageBuffer::from_pixel(3, 2, LumaA([90, 128]));
        let mut bytes = Vec::new();
        DynamicImage::ImageLumaA8(gray)
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();

        let rgb = decode_image(&bytes).unwrap();
        assert_eq!(rgb.dimensions(), (3, 2));
        assert_eq!(rgb.get_pixel(0, 0).0, [90, 90, 90]);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(decode_image(b"not an image"), Err(LeafError::Decode(_))));
    }
}
