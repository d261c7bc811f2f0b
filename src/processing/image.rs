use crate::utils::KycError;
use image::imageops::{self, FilterType};
use image::GrayImage;

pub struct ImageOps;

impl ImageOps {
    // Decode raw PNG/JPEG bytes to an 8-bit grayscale image
    pub fn load_grayscale(image_data: &[u8]) -> Result<GrayImage, KycError> {
        let img = image::load_from_memory(image_data)
            .map_err(|e| KycError::ImageDecodeError(format!("Failed to load image: {}", e)))?;
        Ok(img.to_luma8())
    }

    // Crop a region out of a grayscale image, clamping to the image bounds
    pub fn crop(gray: &GrayImage, x: u32, y: u32, w: u32, h: u32) -> GrayImage {
        let (img_w, img_h) = gray.dimensions();
        let x = x.min(img_w.saturating_sub(1));
        let y = y.min(img_h.saturating_sub(1));
        let w = w.min(img_w - x).max(1);
        let h = h.min(img_h - y).max(1);
        imageops::crop_imm(gray, x, y, w, h).to_image()
    }

    pub fn resize(gray: &GrayImage, width: u32, height: u32) -> GrayImage {
        imageops::resize(gray, width, height, FilterType::Triangle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32, value: u8) -> Vec<u8> {
        let img: GrayImage = ImageBuffer::from_pixel(width, height, Luma([value]));
        let mut buffer = Vec::new();
        image::DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn test_load_grayscale() {
        let bytes = png_bytes(20, 10, 128);
        let gray = ImageOps::load_grayscale(&bytes).unwrap();
        assert_eq!(gray.dimensions(), (20, 10));
        assert_eq!(gray.get_pixel(5, 5).0[0], 128);
    }

    #[test]
    fn test_load_grayscale_rejects_garbage() {
        assert!(ImageOps::load_grayscale(&[0u8, 1, 2, 3]).is_err());
    }

    #[test]
    fn test_crop_clamps_to_bounds() {
        let gray: GrayImage = ImageBuffer::from_pixel(30, 30, Luma([10]));
        let cropped = ImageOps::crop(&gray, 20, 20, 50, 50);
        assert_eq!(cropped.dimensions(), (10, 10));
    }

    #[test]
    fn test_resize() {
        let gray: GrayImage = ImageBuffer::from_pixel(30, 40, Luma([10]));
        let resized = ImageOps::resize(&gray, 150, 150);
        assert_eq!(resized.dimensions(), (150, 150));
    }
}
