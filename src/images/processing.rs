use std::io::Cursor;

use image::{imageops::FilterType, DynamicImage, ImageFormat, ImageReader};

/// Longest edge after normalization.
pub const MAX_EDGE: u32 = 700;
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Every stored image is re-encoded to this type.
pub const CONTENT_TYPE: &str = "image/jpeg";

/// Normalize an uploaded image: detect format from magic bytes, scale so
/// the longer edge is `MAX_EDGE` (upscaling small images too, so stored
/// sizes are uniform), and re-encode as JPEG.
pub fn process_image(data: &[u8]) -> Result<Vec<u8>, String> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("Failed to read image: {}", e))?;

    if reader.format().is_none() {
        return Err("Could not detect image format".to_string());
    }

    let img = reader
        .decode()
        .map_err(|e| format!("Failed to decode image: {}", e))?;

    // resize() preserves aspect ratio, fitting within the given dimensions
    let resized = img.resize(MAX_EDGE, MAX_EDGE, FilterType::Lanczos3);

    // JPEG has no alpha channel
    let resized = DynamicImage::ImageRgb8(resized.to_rgb8());

    let mut buf = Cursor::new(Vec::new());
    resized
        .write_to(&mut buf, ImageFormat::Jpeg)
        .map_err(|e| format!("Failed to encode image: {}", e))?;

    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 40, 255]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn resizes_long_edge_and_encodes_jpeg() {
        let out = process_image(&png_bytes(100, 50)).unwrap();
        let decoded = ImageReader::new(Cursor::new(&out))
            .with_guessed_format()
            .unwrap();
        assert_eq!(decoded.format(), Some(ImageFormat::Jpeg));
        let img = decoded.decode().unwrap();
        assert_eq!(img.width(), 700);
        assert_eq!(img.height(), 350);
    }

    #[test]
    fn portrait_images_scale_by_height() {
        let out = process_image(&png_bytes(50, 200)).unwrap();
        let img = ImageReader::new(Cursor::new(&out))
            .with_guessed_format()
            .unwrap()
            .decode()
            .unwrap();
        assert_eq!(img.height(), 700);
        assert_eq!(img.width(), 175);
    }

    #[test]
    fn rejects_non_image_data() {
        assert!(process_image(b"definitely not an image").is_err());
    }
}
