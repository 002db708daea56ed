use image::{GrayImage, Luma, Rgb, RgbImage, imageops::FilterType};
use ndarray::Array2;

use crate::{ComparisonReport, Region};

/// Blue, cyan, green, yellow, red from no change to full change.
const HEAT_STOPS: [[f32; 3]; 5] = [
    [0.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
    [0.0, 1.0, 0.0],
    [1.0, 1.0, 0.0],
    [1.0, 0.0, 0.0],
];

#[derive(Debug, Clone, Copy)]
pub enum ColorScheme {
    HeatMap,
    Grayscale,
    SingleColor(Rgb<u8>),
}

#[derive(Debug, Clone)]
pub struct VisualizationConfig {
    pub color_scheme: ColorScheme,
    pub overlay_opacity: f32,
    pub border_thickness: u32,
    pub border_color: Rgb<u8>,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            color_scheme: ColorScheme::HeatMap,
            overlay_opacity: 0.5,
            border_thickness: 2,
            border_color: Rgb([255, 0, 0]),
        }
    }
}

pub struct Visualizer {
    config: VisualizationConfig,
}

impl Visualizer {
    pub fn new() -> Self {
        Self {
            config: VisualizationConfig::default(),
        }
    }

    pub fn with_config(config: VisualizationConfig) -> Self {
        Self { config }
    }

    /// Maps a local SSIM map to `width x height`, 255 where structure was
    /// lost. The map is centred; the uncovered border stays 0.
    pub fn dissimilarity_map(&self, ssim_map: &Array2<f64>, width: u32, height: u32) -> GrayImage {
        let (map_height, map_width) = ssim_map.dim();
        let offset_x = width.saturating_sub(map_width as u32) / 2;
        let offset_y = height.saturating_sub(map_height as u32) / 2;
        let mut gray = GrayImage::new(width, height);

        for ((row, col), &value) in ssim_map.indexed_iter() {
            let x = col as u32 + offset_x;
            let y = row as u32 + offset_y;
            if x < width && y < height {
                let dissimilarity = ((1.0 - value) * 255.0).clamp(0.0, 255.0) as u8;
                gray.put_pixel(x, y, Luma([dissimilarity]));
            }
        }

        gray
    }

    pub fn create_heatmap(&self, gray: &GrayImage) -> RgbImage {
        let (width, height) = gray.dimensions();
        let mut heatmap = RgbImage::new(width, height);

        for (x, y, pixel) in gray.enumerate_pixels() {
            let intensity = pixel[0] as f32 / 255.0;
            heatmap.put_pixel(x, y, self.intensity_to_color(intensity));
        }

        heatmap
    }

    fn intensity_to_color(&self, intensity: f32) -> Rgb<u8> {
        let intensity = intensity.clamp(0.0, 1.0);

        match self.config.color_scheme {
            ColorScheme::HeatMap => {
                let scaled = intensity * (HEAT_STOPS.len() - 1) as f32;
                let stop = (scaled as usize).min(HEAT_STOPS.len() - 2);
                let t = scaled - stop as f32;
                let (from, to) = (HEAT_STOPS[stop], HEAT_STOPS[stop + 1]);

                Rgb(std::array::from_fn(|c| ((from[c] + (to[c] - from[c]) * t) * 255.0) as u8))
            }
            ColorScheme::Grayscale => Rgb([(intensity * 255.0) as u8; 3]),
            ColorScheme::SingleColor(base) => Rgb(base.0.map(|v| (v as f32 * intensity) as u8)),
        }
    }

    pub fn overlay_heatmap(&self, original: &RgbImage, heatmap: &RgbImage) -> RgbImage {
        let (width, height) = original.dimensions();
        let mut result = RgbImage::new(width, height);
        let alpha = self.config.overlay_opacity;

        for (x, y, out) in result.enumerate_pixels_mut() {
            let orig = original.get_pixel(x, y);
            let heat = heatmap.get_pixel(x.min(heatmap.width() - 1), y.min(heatmap.height() - 1));

            *out = Rgb([
                ((1.0 - alpha) * orig[0] as f32 + alpha * heat[0] as f32) as u8,
                ((1.0 - alpha) * orig[1] as f32 + alpha * heat[1] as f32) as u8,
                ((1.0 - alpha) * orig[2] as f32 + alpha * heat[2] as f32) as u8,
            ]);
        }

        result
    }

    /// Dissimilarity heatmap over `base` with the changed regions outlined.
    /// `base` is rescaled to the compared size when it differs.
    pub fn visualize_comparison(&self, base: &RgbImage, report: &ComparisonReport) -> RgbImage {
        let (width, height) = report.difference.dimensions();
        let base = if base.dimensions() == (width, height) {
            base.clone()
        } else {
            image::imageops::resize(base, width, height, FilterType::Triangle)
        };

        let dissimilarity = self.dissimilarity_map(&report.ssim_map, width, height);
        let mut vis = self.overlay_heatmap(&base, &self.create_heatmap(&dissimilarity));

        for region in &report.changed_regions {
            self.draw_region_border(&mut vis, region, self.config.border_color);
        }

        vis
    }

    pub fn draw_region_border(&self, image: &mut RgbImage, region: &Region, color: Rgb<u8>) {
        let (width, height) = image.dimensions();
        let thickness = self.config.border_thickness;

        for t in 0..thickness {
            for x in region.x.saturating_sub(t)..(region.x + region.width + t).min(width) {
                if region.y >= t {
                    image.put_pixel(x, region.y - t, color);
                }

                let y = region.y + region.height + t;
                if y < height {
                    image.put_pixel(x, y, color);
                }
            }

            for y in region.y.saturating_sub(t)..(region.y + region.height + t).min(height) {
                if region.x >= t {
                    image.put_pixel(region.x - t, y, color);
                }

                let x = region.x + region.width + t;
                if x < width {
                    image.put_pixel(x, y, color);
                }
            }
        }
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}
