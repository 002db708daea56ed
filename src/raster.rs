use std::{fmt, path::Path};

use image::{DynamicImage, ImageFormat};
use serde::{Serialize, Serializer};

use crate::{
    error::{ForensicsError, Result},
    metadata::exif::ExifExtractor,
};

/// Color layout of a decoded image, as far as the comparison engine cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Rgb,
    Grayscale,
    Other(&'static str),
}

impl ColorMode {
    pub fn of(image: &DynamicImage) -> Self {
        match image {
            DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgb16(_) | DynamicImage::ImageRgb32F(_) => {
                ColorMode::Rgb
            }
            DynamicImage::ImageLuma8(_) | DynamicImage::ImageLuma16(_) => ColorMode::Grayscale,
            DynamicImage::ImageLumaA8(_) => ColorMode::Other("LA"),
            DynamicImage::ImageLumaA16(_) => ColorMode::Other("LA;16"),
            DynamicImage::ImageRgba8(_) => ColorMode::Other("RGBA"),
            DynamicImage::ImageRgba16(_) => ColorMode::Other("RGBA;16"),
            DynamicImage::ImageRgba32F(_) => ColorMode::Other("RGBA;F"),
            _ => ColorMode::Other("unknown"),
        }
    }

    pub fn has_intensity_stats(&self) -> bool {
        matches!(self, ColorMode::Rgb | ColorMode::Grayscale)
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorMode::Rgb => f.write_str("RGB"),
            ColorMode::Grayscale => f.write_str("L"),
            ColorMode::Other(label) => f.write_str(label),
        }
    }
}

impl Serialize for ColorMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A decoded image together with what its container told us about it.
#[derive(Debug, Clone)]
pub struct RasterImage {
    image: DynamicImage,
    format: Option<ImageFormat>,
    has_metadata: bool,
}

impl RasterImage {
    pub fn new(image: DynamicImage) -> Self {
        Self {
            image,
            format: None,
            has_metadata: false,
        }
    }

    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_metadata(mut self, has_metadata: bool) -> Self {
        self.has_metadata = has_metadata;
        self
    }

    /// Decodes an encoded image. Data that is not a recognizable image is
    /// rejected as invalid input.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(ForensicsError::InvalidInput("Image data is empty".into()));
        }

        let format = image::guess_format(bytes)
            .map_err(|e| ForensicsError::InvalidInput(format!("Not a decodable image: {}", e)))?;
        let image = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| ForensicsError::InvalidInput(format!("Not a decodable image: {}", e)))?;

        Ok(Self {
            image,
            format: Some(format),
            has_metadata: ExifExtractor::has_metadata(bytes),
        })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::decode(&bytes)
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    pub fn mode(&self) -> ColorMode {
        ColorMode::of(&self.image)
    }

    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    /// Upper-case container name such as `PNG` or `JPEG`.
    pub fn format_name(&self) -> Option<String> {
        self.format.map(|f| format!("{:?}", f).to_uppercase())
    }

    pub fn has_metadata(&self) -> bool {
        self.has_metadata
    }
}

impl From<DynamicImage> for RasterImage {
    fn from(image: DynamicImage) -> Self {
        Self::new(image)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{GrayAlphaImage, GrayImage, LumaA, Rgb, RgbImage};

    use super::*;

    #[test]
    fn test_color_mode_classification() {
        let rgb = DynamicImage::ImageRgb8(RgbImage::new(4, 4));
        let gray = DynamicImage::ImageLuma8(GrayImage::new(4, 4));
        let gray_alpha = DynamicImage::ImageLumaA8(GrayAlphaImage::from_pixel(4, 4, LumaA([1, 2])));

        assert_eq!(ColorMode::of(&rgb), ColorMode::Rgb);
        assert_eq!(ColorMode::of(&gray), ColorMode::Grayscale);
        assert_eq!(ColorMode::of(&gray_alpha), ColorMode::Other("LA"));
        assert_eq!(ColorMode::Grayscale.to_string(), "L");
        assert!(!ColorMode::Other("RGBA").has_intensity_stats());
    }

    #[test]
    fn test_decode_png_keeps_format() {
        let source = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 36, Rgb([10, 20, 30])));
        let mut encoded = Cursor::new(Vec::new());
        source.write_to(&mut encoded, ImageFormat::Png).unwrap();

        let raster = RasterImage::decode(encoded.get_ref()).unwrap();

        assert_eq!(raster.dimensions(), (40, 36));
        assert_eq!(raster.mode(), ColorMode::Rgb);
        assert_eq!(raster.format_name().as_deref(), Some("PNG"));
        assert!(!raster.has_metadata());
    }

    #[test]
    fn test_wrapped_image_carries_collaborator_tags() {
        let raster = RasterImage::new(DynamicImage::ImageLuma8(GrayImage::new(8, 8)))
            .with_format(ImageFormat::Jpeg)
            .with_metadata(true);

        assert_eq!(raster.format_name().as_deref(), Some("JPEG"));
        assert!(raster.has_metadata());
        assert_eq!(raster.mode(), ColorMode::Grayscale);
    }

    #[test]
    fn test_decode_rejects_non_image_data() {
        let err = RasterImage::decode(b"definitely not pixels").unwrap_err();
        assert!(err.is_invalid_input());

        let err = RasterImage::decode(&[]).unwrap_err();
        assert!(err.is_invalid_input());
    }
}
