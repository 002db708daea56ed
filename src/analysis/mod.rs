pub mod difference;
pub mod normalize;
pub mod properties;
pub mod ssim;

use ndarray::Array2;

use crate::error::Result;

/// A scalar similarity measure over two equally shaped intensity maps.
pub trait SimilarityMetric {
    fn score(&self, first: &Array2<f64>, second: &Array2<f64>) -> Result<f64>;

    fn name(&self) -> &str;
}
