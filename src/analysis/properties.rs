use statrs::statistics::Statistics;

use crate::{
    ImageProperties, IntensityStats, PropertyReport,
    error::{ForensicsError, Result},
    raster::{ColorMode, RasterImage},
};

pub struct PropertyAnalyzer;

impl PropertyAnalyzer {
    /// Describes a single image. Never fails: problems are reported as an
    /// error-only result.
    pub fn analyze(image: &RasterImage) -> ImageProperties {
        match Self::describe(image) {
            Ok(report) => ImageProperties::Report(report),
            Err(err) => {
                log::error!("Image property analysis failed: {}", err);
                ImageProperties::Failed {
                    error: err.to_string(),
                }
            }
        }
    }

    fn describe(image: &RasterImage) -> Result<PropertyReport> {
        let mode = image.mode();

        let stats = match mode {
            ColorMode::Rgb => Some(Self::intensity_stats(&image.image().to_rgb8().into_raw())?),
            ColorMode::Grayscale => Some(Self::intensity_stats(&image.image().to_luma8().into_raw())?),
            ColorMode::Other(_) => None,
        };

        Ok(PropertyReport {
            dimensions: image.dimensions(),
            mode,
            format: image.format_name(),
            has_metadata: image.has_metadata(),
            stats,
        })
    }

    fn intensity_stats(samples: &[u8]) -> Result<IntensityStats> {
        if samples.is_empty() {
            return Err(ForensicsError::RuntimeFailure(
                "Cannot compute intensity statistics of an empty image".into(),
            ));
        }

        let values = || samples.iter().map(|&v| v as f64);

        let mean_intensity = Statistics::mean(values());
        let std_intensity = Statistics::population_std_dev(values());
        let min_intensity = Statistics::min(values()) as u8;
        let max_intensity = Statistics::max(values()) as u8;

        Ok(IntensityStats {
            mean_intensity,
            std_intensity,
            min_intensity,
            max_intensity,
        })
    }
}
