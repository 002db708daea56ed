use image::{DynamicImage, GrayImage, RgbImage};
use ndarray::Array2;

/// ITU-R BT.601 style luma weights for R, G and B.
pub const LUMA_WEIGHTS: [f64; 3] = [0.2989, 0.5870, 0.1140];

pub fn rgb_to_luma(image: &RgbImage) -> Array2<f64> {
    let (width, height) = image.dimensions();
    let mut arr = Array2::zeros((height as usize, width as usize));

    for (x, y, pixel) in image.enumerate_pixels() {
        arr[[y as usize, x as usize]] = LUMA_WEIGHTS[0] * pixel[0] as f64
            + LUMA_WEIGHTS[1] * pixel[1] as f64
            + LUMA_WEIGHTS[2] * pixel[2] as f64;
    }

    arr
}

pub fn gray_to_array(image: &GrayImage) -> Array2<f64> {
    let (width, height) = image.dimensions();
    let mut arr = Array2::zeros((height as usize, width as usize));

    for (x, y, pixel) in image.enumerate_pixels() {
        arr[[y as usize, x as usize]] = pixel[0] as f64;
    }

    arr
}

/// Intensity map of an arbitrary decoded image on the 0-255 scale.
///
/// Single-channel buffers of any depth pass through without weighting
/// (16-bit samples are rescaled to 8 bits first). Everything else is
/// projected from RGB with [`LUMA_WEIGHTS`].
pub fn project_luma(image: &DynamicImage) -> Array2<f64> {
    match image {
        DynamicImage::ImageLuma8(gray) => gray_to_array(gray),
        DynamicImage::ImageLuma16(_) => gray_to_array(&image.to_luma8()),
        other => rgb_to_luma(&other.to_rgb8()),
    }
}

#[cfg(test)]
mod tests {
    use image::{ImageBuffer, Luma, Rgb};

    use super::*;

    #[test]
    fn test_luma_weights_applied_per_pixel() {
        let mut image = RgbImage::new(2, 1);
        image.put_pixel(0, 0, Rgb([255, 0, 0]));
        image.put_pixel(1, 0, Rgb([10, 20, 30]));

        let luma = rgb_to_luma(&image);

        assert_eq!(luma.dim(), (1, 2));
        assert!((luma[[0, 0]] - 0.2989 * 255.0).abs() < 1e-9);
        assert!((luma[[0, 1]] - (2.989 + 11.74 + 3.42)).abs() < 1e-9);
    }

    #[test]
    fn test_grayscale_passes_through() {
        let gray = GrayImage::from_fn(3, 2, |x, y| Luma([(x * 10 + y) as u8]));

        let luma = project_luma(&DynamicImage::ImageLuma8(gray));

        assert_eq!(luma.dim(), (2, 3));
        assert_eq!(luma[[1, 2]], 21.0);
    }

    #[test]
    fn test_sixteen_bit_grayscale_is_not_weighted() {
        let gray = ImageBuffer::<Luma<u16>, Vec<u16>>::from_pixel(4, 4, Luma([u16::MAX]));

        let luma = project_luma(&DynamicImage::ImageLuma16(gray));

        assert_eq!(luma.dim(), (4, 4));
        assert!(luma.iter().all(|&v| v == 255.0));
    }

    #[test]
    fn test_color_images_are_weighted() {
        let rgb = RgbImage::from_pixel(2, 2, Rgb([0, 0, 200]));

        let luma = project_luma(&DynamicImage::ImageRgb8(rgb));

        assert!((luma[[1, 1]] - 0.1140 * 200.0).abs() < 1e-9);
    }
}
