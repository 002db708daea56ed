use ndarray::Array2;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::{Deserialize, Serialize};

use crate::{
    analysis::{
        SimilarityMetric,
        difference::DifferenceRenderer,
        normalize::{ImageNormalizer, NormalizedPair},
        properties::PropertyAnalyzer,
        ssim::{SsimConfig, SsimEngine},
    },
    detection::{ConfidenceLevel, ManipulationDecision, validate_threshold},
    error::{ForensicsError, Result},
    image_utils::rgb_to_luma,
};

pub mod analysis;
pub mod detection;
pub mod error;
pub mod image_utils;
pub mod metadata;
pub mod raster;
pub mod report;

pub use analysis::{difference::DifferenceImage, normalize::ResampleFilter};
pub use raster::{ColorMode, RasterImage};

pub const DEFAULT_MANIPULATION_THRESHOLD: f64 = 0.98;

/// Every tunable of a comparison, passed explicitly to each entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    pub threshold: f64,
    pub min_width: u32,
    pub min_height: u32,
    pub dynamic_range: f64,
    pub window_size: usize,
    pub k1: f64,
    pub k2: f64,
    pub sample_covariance: bool,
    pub resample: ResampleFilter,
    pub amplification: f64,
    pub region_block_size: u32,
    pub region_threshold: f64,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MANIPULATION_THRESHOLD,
            min_width: 32,
            min_height: 32,
            dynamic_range: 255.0,
            window_size: 7,
            k1: 0.01,
            k2: 0.03,
            sample_covariance: true,
            resample: ResampleFilter::Lanczos3,
            amplification: 3.0,
            region_block_size: 16,
            region_threshold: 30.0,
        }
    }
}

impl ComparisonConfig {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.threshold)?;

        if self.min_width == 0 || self.min_height == 0 {
            return Err(ForensicsError::InvalidInput(
                "Minimum image size must be at least 1x1".into(),
            ));
        }

        SsimConfig::from(self).validate()?;

        if self.window_size as u32 > self.min_width.min(self.min_height) {
            return Err(ForensicsError::InvalidInput(format!(
                "SSIM window {} does not fit the minimum image size {}x{}",
                self.window_size, self.min_width, self.min_height
            )));
        }

        if !(self.amplification.is_finite() && self.amplification >= 0.0) {
            return Err(ForensicsError::InvalidInput(format!(
                "Amplification must be non-negative, got {}",
                self.amplification
            )));
        }

        Ok(())
    }
}

pub struct ImageComparator {
    config: ComparisonConfig,
}

impl ImageComparator {
    pub fn new() -> Self {
        Self {
            config: ComparisonConfig::default(),
        }
    }

    pub fn with_config(config: ComparisonConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ComparisonConfig {
        &self.config
    }

    /// SSIM of the luma of both images after normalization, in `[0, 1]`.
    pub fn compare(&self, first: &RasterImage, second: &RasterImage) -> Result<f64> {
        self.config.validate()?;

        let pair = self.normalize(first, second)?;
        self.score_pair(&pair)
    }

    pub fn detect(&self, first: &RasterImage, second: &RasterImage) -> Result<SimilarityResult> {
        let decision = ManipulationDecision::new(self.config.threshold)?;
        let score = self.compare(first, second)?;

        Ok(decision.decide(score))
    }

    pub fn difference(&self, first: &RasterImage, second: &RasterImage) -> Option<DifferenceImage> {
        if let Err(err) = self.config.validate() {
            log::warn!("Difference image generation failed: {}", err);
            return None;
        }

        DifferenceRenderer::from_config(&self.config).render(first, second)
    }

    pub fn properties(&self, image: &RasterImage) -> ImageProperties {
        PropertyAnalyzer::analyze(image)
    }

    /// Local SSIM values of the normalized pair, one per window position.
    pub fn similarity_map(&self, first: &RasterImage, second: &RasterImage) -> Result<Array2<f64>> {
        self.config.validate()?;

        let pair = self.normalize(first, second)?;
        SsimEngine::from_config(&self.config)
            .ssim_map(&rgb_to_luma(pair.first()), &rgb_to_luma(pair.second()))
    }

    /// Runs independent pairs in parallel. Results keep the input order.
    pub fn detect_batch(&self, pairs: &[(RasterImage, RasterImage)]) -> Vec<Result<SimilarityResult>> {
        pairs
            .par_iter()
            .map(|(first, second)| self.detect(first, second))
            .collect()
    }

    pub fn full_comparison(&self, original: &RasterImage, suspect: &RasterImage) -> Result<ComparisonReport> {
        self.config.validate()?;
        let decision = ManipulationDecision::new(self.config.threshold)?;

        let pair = self.normalize(original, suspect)?;
        let first_luma = rgb_to_luma(pair.first());
        let second_luma = rgb_to_luma(pair.second());

        let engine = SsimEngine::from_config(&self.config);
        let ssim_map = engine.ssim_map(&first_luma, &second_luma)?;
        let score = SsimEngine::summarize(&ssim_map)?;
        log::info!("SSIM similarity score: {:.4}", score);

        let difference = DifferenceRenderer::from_config(&self.config).render_pair(&pair);
        let changed_regions =
            difference.changed_regions(self.config.region_block_size, self.config.region_threshold);

        Ok(ComparisonReport {
            similarity: decision.decide(score),
            difference,
            ssim_map,
            changed_regions,
            original: PropertyAnalyzer::analyze(original),
            suspect: PropertyAnalyzer::analyze(suspect),
        })
    }

    fn normalize(&self, first: &RasterImage, second: &RasterImage) -> Result<NormalizedPair> {
        ImageNormalizer::from_config(&self.config)
            .normalize(first, second)
            .inspect_err(|err| log::error!("Image comparison failed: {}", err))
    }

    fn score_pair(&self, pair: &NormalizedPair) -> Result<f64> {
        let engine = SsimEngine::from_config(&self.config);
        let score = engine
            .score(&rgb_to_luma(pair.first()), &rgb_to_luma(pair.second()))
            .inspect_err(|err| log::error!("Image comparison failed: {}", err))?;

        log::info!("SSIM similarity score: {:.4}", score);

        Ok(score)
    }
}

impl Default for ImageComparator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn compare(first: &RasterImage, second: &RasterImage, threshold: f64) -> Result<f64> {
    ImageComparator::with_config(ComparisonConfig::default().with_threshold(threshold)).compare(first, second)
}

pub fn detect(first: &RasterImage, second: &RasterImage, threshold: f64) -> Result<SimilarityResult> {
    ImageComparator::with_config(ComparisonConfig::default().with_threshold(threshold)).detect(first, second)
}

pub fn difference(first: &RasterImage, second: &RasterImage) -> Option<DifferenceImage> {
    ImageComparator::new().difference(first, second)
}

pub fn properties(image: &RasterImage) -> ImageProperties {
    PropertyAnalyzer::analyze(image)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub score: f64,
    pub manipulated: bool,
    pub message: String,
    pub confidence: f64,
    pub confidence_level: ConfidenceLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// Overlapping or separated by at most a small gap.
    pub fn touches(&self, other: &Region) -> bool {
        let gap = 8;

        !(self.x + self.width + gap < other.x
            || other.x + other.width + gap < self.x
            || self.y + self.height + gap < other.y
            || other.y + other.height + gap < self.y)
    }

    pub fn union(&self, other: &Region) -> Region {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let x2 = (self.x + self.width).max(other.x + other.width);
        let y2 = (self.y + self.height).max(other.y + other.height);

        Region {
            x,
            y,
            width: x2 - x,
            height: y2 - y,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntensityStats {
    pub mean_intensity: f64,
    pub std_intensity: f64,
    pub min_intensity: u8,
    pub max_intensity: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyReport {
    pub dimensions: (u32, u32),
    pub mode: ColorMode,
    pub format: Option<String>,
    pub has_metadata: bool,
    #[serde(flatten)]
    pub stats: Option<IntensityStats>,
}

/// Either a full description or, when analysis failed, only the error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ImageProperties {
    Report(PropertyReport),
    Failed { error: String },
}

#[derive(Debug, Clone)]
pub struct ComparisonReport {
    pub similarity: SimilarityResult,
    pub difference: DifferenceImage,
    pub ssim_map: Array2<f64>,
    pub changed_regions: Vec<Region>,
    pub original: ImageProperties,
    pub suspect: ImageProperties,
}
