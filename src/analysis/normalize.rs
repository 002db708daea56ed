use image::{RgbImage, imageops::FilterType};
use serde::{Deserialize, Serialize};

use crate::{
    ComparisonConfig,
    error::{ForensicsError, Result},
    raster::{ColorMode, RasterImage},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResampleFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResampleFilter> for FilterType {
    fn from(filter: ResampleFilter) -> Self {
        match filter {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Two RGB images of identical size, both at or above the minimum size.
#[derive(Debug, Clone)]
pub struct NormalizedPair {
    first: RgbImage,
    second: RgbImage,
}

impl NormalizedPair {
    pub fn first(&self) -> &RgbImage {
        &self.first
    }

    pub fn second(&self) -> &RgbImage {
        &self.second
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.first.dimensions()
    }
}

pub struct ImageNormalizer {
    min_width: u32,
    min_height: u32,
    filter: ResampleFilter,
}

impl ImageNormalizer {
    pub fn new(min_width: u32, min_height: u32) -> Self {
        Self {
            min_width,
            min_height,
            filter: ResampleFilter::Lanczos3,
        }
    }

    pub fn from_config(config: &ComparisonConfig) -> Self {
        Self::new(config.min_width, config.min_height).with_filter(config.resample)
    }

    pub fn with_filter(mut self, filter: ResampleFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn normalize(&self, first: &RasterImage, second: &RasterImage) -> Result<NormalizedPair> {
        let first_rgb = self.to_rgb(first, "First")?;
        let second_rgb = self.to_rgb(second, "Second")?;

        self.check_size(first_rgb.dimensions(), "First image too small")?;
        self.check_size(second_rgb.dimensions(), "Second image too small")?;

        let target_width = first_rgb.width().min(second_rgb.width());
        let target_height = first_rgb.height().min(second_rgb.height());

        self.check_size((target_width, target_height), "Images too small after resizing")?;

        log::debug!(
            "Normalizing {:?} and {:?} to {}x{}",
            first_rgb.dimensions(),
            second_rgb.dimensions(),
            target_width,
            target_height
        );

        Ok(NormalizedPair {
            first: self.resize(first_rgb, target_width, target_height),
            second: self.resize(second_rgb, target_width, target_height),
        })
    }

    fn to_rgb(&self, image: &RasterImage, label: &str) -> Result<RgbImage> {
        match image.mode() {
            ColorMode::Rgb | ColorMode::Grayscale => Ok(image.image().to_rgb8()),
            ColorMode::Other(mode) => Err(ForensicsError::InvalidInput(format!(
                "{} image has unsupported color mode {}",
                label, mode
            ))),
        }
    }

    fn check_size(&self, (width, height): (u32, u32), context: &str) -> Result<()> {
        if width < self.min_width || height < self.min_height {
            return Err(ForensicsError::InvalidInput(format!(
                "{}: {}x{}, minimum: {}x{}",
                context, width, height, self.min_width, self.min_height
            )));
        }

        Ok(())
    }

    fn resize(&self, image: RgbImage, width: u32, height: u32) -> RgbImage {
        if image.dimensions() == (width, height) {
            return image;
        }

        image::imageops::resize(&image, width, height, self.filter.into())
    }
}
