//! Correlation kernel implementations.
//!
//! A kernel only computes the template/window dot product at one placement.
//! Window statistics come from an [`IntegralImage`] built once per target, so
//! every backend shares the same normalization and flat-region handling.

use crate::template::TemplatePlan;
use crate::util::math::clamp_score;
use crate::ImageView;

pub mod integral;
mod surface;

pub use integral::{IntegralImage, WindowStats};
pub use surface::{surface_size, CorrelationSurface};

/// Maximum distance between two flat regions' means (in intensity levels)
/// for them to count as identical.
const FLAT_MEAN_TOLERANCE: f64 = 0.5;

/// Kernel trait for dot-product evaluation.
pub trait Kernel {
    /// Computes `sum(t'(u, v) * I(x + u, y + v))` for the placement whose
    /// top-left corner is `(x, y)`. The placement must lie inside `image`.
    fn dot_at(image: ImageView<'_, u8>, plan: &TemplatePlan, x: usize, y: usize) -> f32;
}

/// Combines a dot product and window statistics into a ZNCC score in `[-1, 1]`.
///
/// Flat inputs have no defined correlation; a flat template over a flat window
/// scores 1 when the intensities agree and 0 otherwise, and a flat template or
/// flat window against a textured counterpart scores 0.
pub fn zncc_score(plan: &TemplatePlan, dot: f32, stats: WindowStats) -> f32 {
    match (plan.is_flat(), stats.is_flat()) {
        (true, true) => {
            if (stats.mean() - f64::from(plan.mean())).abs() <= FLAT_MEAN_TOLERANCE {
                1.0
            } else {
                0.0
            }
        }
        (true, false) | (false, true) => 0.0,
        (false, false) => {
            let denom = (plan.var_t() * stats.centered_sum_sq()).sqrt();
            clamp_score((f64::from(dot) / denom) as f32)
        }
    }
}

/// Scores a single placement, or `None` if the template does not fit there.
pub fn score_at<K: Kernel>(
    image: ImageView<'_, u8>,
    integral: &IntegralImage,
    plan: &TemplatePlan,
    x: usize,
    y: usize,
) -> Option<f32> {
    let stats = integral.window(x, y, plan.width(), plan.height())?;
    let dot = if plan.is_flat() {
        0.0
    } else {
        K::dot_at(image, plan, x, y)
    };
    Some(zncc_score(plan, dot, stats))
}

/// Computes the full correlation surface sequentially.
///
/// Returns `None` when the template is larger than the image in either axis.
pub fn compute_surface<K: Kernel>(
    image: ImageView<'_, u8>,
    integral: &IntegralImage,
    plan: &TemplatePlan,
) -> Option<CorrelationSurface> {
    let (width, height) =
        surface_size(image.width(), image.height(), plan.width(), plan.height())?;
    let mut scores = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            scores.push(score_at::<K>(image, integral, plan, x, y).unwrap_or(f32::NEG_INFINITY));
        }
    }
    Some(CorrelationSurface::new(width, height, scores))
}

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

#[cfg(feature = "rayon")]
pub mod rayon;

#[cfg(not(feature = "simd"))]
pub(crate) use scalar::ZnccScalar as DefaultKernel;
#[cfg(feature = "simd")]
pub(crate) use simd::ZnccSimd as DefaultKernel;
