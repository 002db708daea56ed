use ndarray::{Array2, Zip};

use crate::{
    ComparisonConfig,
    analysis::SimilarityMetric,
    error::{ForensicsError, Result},
};

/// Window and constants of the structural similarity computation.
///
/// The window is uniform and square, slides with stride 1 and is only
/// evaluated where it fits entirely inside the image (no padding), so a
/// `h x w` map yields `(h - window + 1) x (w - window + 1)` local values.
#[derive(Debug, Clone)]
pub struct SsimConfig {
    pub window_size: usize,
    pub k1: f64,
    pub k2: f64,
    pub dynamic_range: f64,
    /// Normalize local (co)variances by `N - 1` instead of `N`.
    pub sample_covariance: bool,
}

impl Default for SsimConfig {
    fn default() -> Self {
        Self {
            window_size: 7,
            k1: 0.01,
            k2: 0.03,
            dynamic_range: 255.0,
            sample_covariance: true,
        }
    }
}

impl From<&ComparisonConfig> for SsimConfig {
    fn from(config: &ComparisonConfig) -> Self {
        Self {
            window_size: config.window_size,
            k1: config.k1,
            k2: config.k2,
            dynamic_range: config.dynamic_range,
            sample_covariance: config.sample_covariance,
        }
    }
}

impl SsimConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_size < 3 || self.window_size % 2 == 0 {
            return Err(ForensicsError::InvalidInput(format!(
                "SSIM window size must be odd and at least 3, got {}",
                self.window_size
            )));
        }

        if !(self.dynamic_range.is_finite() && self.dynamic_range > 0.0) {
            return Err(ForensicsError::InvalidInput(format!(
                "Dynamic range must be positive, got {}",
                self.dynamic_range
            )));
        }

        Ok(())
    }

    fn c1(&self) -> f64 {
        (self.k1 * self.dynamic_range).powi(2)
    }

    fn c2(&self) -> f64 {
        (self.k2 * self.dynamic_range).powi(2)
    }
}

pub struct SsimEngine {
    config: SsimConfig,
}

impl SsimEngine {
    pub fn new() -> Self {
        Self::with_config(SsimConfig::default())
    }

    pub fn with_config(config: SsimConfig) -> Self {
        Self { config }
    }

    pub fn from_config(config: &ComparisonConfig) -> Self {
        Self::with_config(SsimConfig::from(config))
    }

    /// Local SSIM value for every valid window position.
    pub fn ssim_map(&self, first: &Array2<f64>, second: &Array2<f64>) -> Result<Array2<f64>> {
        self.config.validate()?;

        if first.dim() != second.dim() {
            return Err(ForensicsError::InvalidInput(format!(
                "Intensity maps differ in shape: {:?} vs {:?}",
                first.dim(),
                second.dim()
            )));
        }

        let window = self.config.window_size;
        let (height, width) = first.dim();
        if height < window || width < window {
            return Err(ForensicsError::InvalidInput(format!(
                "Intensity map {}x{} is smaller than the {}x{} window",
                width, height, window, window
            )));
        }

        let mean_x = self.box_mean(first);
        let mean_y = self.box_mean(second);
        let mean_xx = self.box_mean(&(first * first));
        let mean_yy = self.box_mean(&(second * second));
        let mean_xy = self.box_mean(&(first * second));

        let area = (window * window) as f64;
        let cov_norm = if self.config.sample_covariance {
            area / (area - 1.0)
        } else {
            1.0
        };
        let c1 = self.config.c1();
        let c2 = self.config.c2();

        let mut map = Array2::<f64>::zeros(mean_x.dim());
        Zip::from(&mut map)
            .and(&mean_x)
            .and(&mean_y)
            .and(&mean_xx)
            .and(&mean_yy)
            .and(&mean_xy)
            .for_each(|s, &ux, &uy, &uxx, &uyy, &uxy| {
                let vx = cov_norm * (uxx - ux * ux);
                let vy = cov_norm * (uyy - uy * uy);
                let vxy = cov_norm * (uxy - ux * uy);

                let numerator = (2.0 * ux * uy + c1) * (2.0 * vxy + c2);
                let denominator = (ux * ux + uy * uy + c1) * (vx + vy + c2);
                *s = numerator / denominator;
            });

        Ok(map)
    }

    /// Mean SSIM clamped to `[0, 1]`.
    pub fn mean_ssim(&self, first: &Array2<f64>, second: &Array2<f64>) -> Result<f64> {
        Self::summarize(&self.ssim_map(first, second)?)
    }

    /// Reduces a local SSIM map to its clamped mean.
    pub fn summarize(map: &Array2<f64>) -> Result<f64> {
        if let Some(bad) = map.iter().find(|v| !v.is_finite()) {
            return Err(ForensicsError::RuntimeFailure(format!(
                "SSIM produced a non-finite local value ({})",
                bad
            )));
        }

        let mean = map
            .mean()
            .filter(|m| m.is_finite())
            .ok_or_else(|| ForensicsError::RuntimeFailure("SSIM mean is undefined".into()))?;

        Ok(mean.clamp(0.0, 1.0))
    }

    fn box_mean(&self, arr: &Array2<f64>) -> Array2<f64> {
        let window = self.config.window_size;
        let (height, width) = arr.dim();
        let out_height = height - window + 1;
        let out_width = width - window + 1;

        let mut horizontal = Array2::zeros((height, out_width));
        for y in 0..height {
            let row = arr.row(y);
            let mut sum = row.iter().take(window).sum::<f64>();
            horizontal[[y, 0]] = sum;

            for x in 1..out_width {
                sum += row[x + window - 1] - row[x - 1];
                horizontal[[y, x]] = sum;
            }
        }

        let area = (window * window) as f64;
        let mut result = Array2::zeros((out_height, out_width));
        for x in 0..out_width {
            let column = horizontal.column(x);
            let mut sum = column.iter().take(window).sum::<f64>();
            result[[0, x]] = sum / area;

            for y in 1..out_height {
                sum += column[y + window - 1] - column[y - 1];
                result[[y, x]] = sum / area;
            }
        }

        result
    }
}

impl Default for SsimEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SimilarityMetric for SsimEngine {
    fn score(&self, first: &Array2<f64>, second: &Array2<f64>) -> Result<f64> {
        self.mean_ssim(first, second)
    }

    fn name(&self) -> &str {
        "ssim"
    }
}
