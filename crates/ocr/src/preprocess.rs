use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to load image: {0}")]
    Load(#[from] image::ImageError),
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

/// Longest edge passed to the recognizer. Receipt photos above this are
/// downscaled; OCR accuracy plateaus well below phone-camera resolution.
const MAX_EDGE: u32 = 2400;

/// Decode raw image bytes (JPEG / PNG / WEBP / …), normalize for OCR, and
/// return PNG bytes. This is the only image-touching step in the pipeline.
pub fn normalize_for_ocr(data: &[u8]) -> Result<Vec<u8>, PreprocessError> {
    let img = image::load_from_memory(data)?;
    let img = downscale(img);
    let gray = stretch_contrast(img.to_luma8());
    encode_png(DynamicImage::ImageLuma8(gray))
}

fn downscale(img: DynamicImage) -> DynamicImage {
    if img.width() > MAX_EDGE || img.height() > MAX_EDGE {
        img.resize(MAX_EDGE, MAX_EDGE, image::imageops::FilterType::Lanczos3)
    } else {
        img
    }
}

/// Linear contrast stretch to the full 0–255 range. A uniform image (no
/// range to stretch) is returned unchanged.
fn stretch_contrast(gray: GrayImage) -> GrayImage {
    let (min_px, max_px) = gray
        .pixels()
        .fold((255u8, 0u8), |(mn, mx), p| (mn.min(p[0]), mx.max(p[0])));

    if max_px <= min_px {
        return gray;
    }

    let range = (max_px - min_px) as u32;
    ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        let p = gray.get_pixel(x, y)[0];
        Luma([((p - min_px) as u32 * 255 / range) as u8])
    })
}

fn encode_png(img: DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, value: u8) -> GrayImage {
        ImageBuffer::from_fn(width, height, |_, _| Luma([value]))
    }

    fn png_bytes(img: GrayImage) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn uniform_image_passes_through_stretch() {
        let out = stretch_contrast(solid(8, 8, 128));
        assert!(out.pixels().all(|p| p[0] == 128));
    }

    #[test]
    fn gradient_stretches_to_full_range() {
        let img: GrayImage =
            ImageBuffer::from_fn(128, 1, |x, _| Luma([(64 + x) as u8]));
        let out = stretch_contrast(img);
        assert_eq!(out.pixels().map(|p| p[0]).min().unwrap(), 0);
        assert_eq!(out.pixels().map(|p| p[0]).max().unwrap(), 255);
    }

    #[test]
    fn oversized_image_is_downscaled() {
        let out = downscale(DynamicImage::ImageLuma8(solid(3000, 1500, 90)));
        assert!(out.width() <= MAX_EDGE && out.height() <= MAX_EDGE);
    }

    #[test]
    fn normalize_produces_png() {
        let out = normalize_for_ocr(&png_bytes(solid(4, 4, 77))).unwrap();
        assert_eq!(&out[..4], b"\x89PNG");
    }

    #[test]
    fn garbage_bytes_fail_to_load() {
        assert!(matches!(
            normalize_for_ocr(b"definitely not an image"),
            Err(PreprocessError::Load(_))
        ));
    }
}
