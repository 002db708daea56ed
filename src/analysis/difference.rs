use std::path::Path;

use image::{Rgb, RgbImage};

use crate::{
    ComparisonConfig, Region,
    analysis::normalize::{ImageNormalizer, NormalizedPair},
    error::Result,
    raster::RasterImage,
};

/// Amplified absolute per-channel difference of a normalized pair.
#[derive(Debug, Clone)]
pub struct DifferenceImage {
    image: RgbImage,
}

impl DifferenceImage {
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_inner(self) -> RgbImage {
        self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.image.save(path)?;
        Ok(())
    }

    /// Blocks whose mean difference exceeds `threshold`, with neighbouring
    /// blocks merged into larger regions.
    pub fn changed_regions(&self, block_size: u32, threshold: f64) -> Vec<Region> {
        let (width, height) = self.image.dimensions();
        let block_size = block_size.max(1);
        let mut regions = Vec::new();

        for by in (0..height).step_by(block_size as usize) {
            for bx in (0..width).step_by(block_size as usize) {
                let mut block_sum = 0.0;
                let mut count = 0;

                for y in by..(by + block_size).min(height) {
                    for x in bx..(bx + block_size).min(width) {
                        let p = self.image.get_pixel(x, y);
                        block_sum += (p[0] as f64 + p[1] as f64 + p[2] as f64) / 3.0;
                        count += 1;
                    }
                }

                if block_sum / count as f64 > threshold {
                    regions.push(Region {
                        x: bx,
                        y: by,
                        width: block_size.min(width - bx),
                        height: block_size.min(height - by),
                    });
                }
            }
        }

        merge_adjacent_regions(regions)
    }
}

pub struct DifferenceRenderer {
    normalizer: ImageNormalizer,
    amplification: f32,
}

impl DifferenceRenderer {
    pub fn new() -> Self {
        Self::from_config(&ComparisonConfig::default())
    }

    pub fn from_config(config: &ComparisonConfig) -> Self {
        Self {
            normalizer: ImageNormalizer::from_config(config),
            amplification: config.amplification as f32,
        }
    }

    pub fn with_amplification(mut self, amp: f32) -> Self {
        self.amplification = amp;
        self
    }

    /// Renders the difference of two images. Failures are logged and yield `None`.
    pub fn render(&self, first: &RasterImage, second: &RasterImage) -> Option<DifferenceImage> {
        match self.normalizer.normalize(first, second) {
            Ok(pair) => {
                let diff = self.render_pair(&pair);
                log::info!(
                    "Generated difference image with dimensions: {:?}",
                    diff.dimensions()
                );
                Some(diff)
            }
            Err(err) => {
                log::warn!("Difference image generation failed: {}", err);
                None
            }
        }
    }

    pub fn render_pair(&self, pair: &NormalizedPair) -> DifferenceImage {
        let (width, height) = pair.dimensions();
        let mut image = RgbImage::new(width, height);

        for (x, y, out) in image.enumerate_pixels_mut() {
            let a = pair.first().get_pixel(x, y);
            let b = pair.second().get_pixel(x, y);

            let channel = |c: usize| {
                let diff = (a[c] as f32 - b[c] as f32).abs();
                (diff * self.amplification).clamp(0.0, 255.0) as u8
            };

            *out = Rgb([channel(0), channel(1), channel(2)]);
        }

        DifferenceImage { image }
    }
}

impl Default for DifferenceRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Grows each region by absorbing every neighbour it touches until nothing
/// more is in reach. Output is ordered top to bottom, left to right.
fn merge_adjacent_regions(mut pending: Vec<Region>) -> Vec<Region> {
    let mut merged = Vec::new();

    while let Some(mut current) = pending.pop() {
        loop {
            let (touching, rest): (Vec<Region>, Vec<Region>) =
                pending.into_iter().partition(|r| current.touches(r));
            pending = rest;

            if touching.is_empty() {
                break;
            }
            current = touching.iter().fold(current, |acc, r| acc.union(r));
        }

        merged.push(current);
    }

    merged.sort_by_key(|r| (r.y, r.x));
    merged
}
