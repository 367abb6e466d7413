use std::path::Path;

use image::imageops::FilterType;
use ndarray::Array4;

use crate::config::{IMG_HEIGHT, IMG_WIDTH};
use crate::error::PredictError;

/// Decodes the downloaded file and shapes it into the batch layout the
/// model expects: `(1, 224, 224, 3)`, channel-last, f32.
///
/// The resize stretches to the target resolution regardless of source
/// aspect ratio; the network was trained without aspect-preserving padding.
pub fn tensor_from_file(path: &Path, normalize_pixels: bool) -> Result<Array4<f32>, PredictError> {
    let img = image::open(path).map_err(|e| PredictError::Decode(e.to_string()))?;
    let rgb = img.into_rgb8();
    let resized = image::imageops::resize(&rgb, IMG_WIDTH, IMG_HEIGHT, FilterType::Triangle);

    let mut batch = Array4::<f32>::zeros((1, IMG_HEIGHT as usize, IMG_WIDTH as usize, 3));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..3 {
            let mut value = f32::from(pixel[c]);
            if normalize_pixels {
                value /= 255.0;
            }
            batch[[0, y as usize, x as usize, c]] = value;
        }
    }
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_test_image(width: u32, height: u32) -> tempfile::NamedTempFile {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 90, 10]));
        let file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        image::DynamicImage::ImageRgb8(img)
            .save_with_format(file.path(), image::ImageFormat::Png)
            .unwrap();
        file
    }

    #[test]
    fn produces_single_image_batch_in_channel_last_layout() {
        let file = write_test_image(300, 300);
        let batch = tensor_from_file(file.path(), false).unwrap();
        assert_eq!(batch.dim(), (1, 224, 224, 3));
    }

    #[test]
    fn non_square_input_is_stretched_not_cropped() {
        let file = write_test_image(640, 120);
        let batch = tensor_from_file(file.path(), false).unwrap();
        assert_eq!(batch.dim(), (1, 224, 224, 3));
        // Uniform source color survives the stretch at every corner.
        assert_eq!(batch[[0, 0, 0, 0]], 200.0);
        assert_eq!(batch[[0, 223, 223, 2]], 10.0);
    }

    #[test]
    fn pixels_stay_raw_without_normalization() {
        let file = write_test_image(50, 50);
        let batch = tensor_from_file(file.path(), false).unwrap();
        assert!(batch.iter().any(|&v| v > 1.0));
        assert!(batch.iter().all(|&v| (0.0..=255.0).contains(&v)));
    }

    #[test]
    fn normalization_flag_scales_into_unit_range() {
        let file = write_test_image(50, 50);
        let batch = tensor_from_file(file.path(), true).unwrap();
        assert!(batch.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn grayscale_input_is_expanded_to_three_channels() {
        let img = image::GrayImage::from_pixel(80, 80, image::Luma([127]));
        let file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        image::DynamicImage::ImageLuma8(img)
            .save_with_format(file.path(), image::ImageFormat::Png)
            .unwrap();
        let batch = tensor_from_file(file.path(), false).unwrap();
        assert_eq!(batch.dim(), (1, 224, 224, 3));
        assert_eq!(batch[[0, 0, 0, 0]], batch[[0, 0, 0, 2]]);
    }

    #[test]
    fn non_image_bytes_are_a_decode_failure() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "definitely not an image").unwrap();
        let err = tensor_from_file(file.path(), false).unwrap_err();
        assert!(matches!(err, PredictError::Decode(_)));
    }
}
