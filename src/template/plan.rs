//! Template plan precomputation for zero-mean normalized cross-correlation.

use crate::image::ImageView;
use crate::util::{ScreenMatchError, ScreenMatchResult};

/// Precomputed statistics and zero-mean buffer for one (scaled) template.
///
/// Flat templates (every pixel equal) are accepted; their correlation is
/// resolved by comparing means instead of dividing by a zero variance.
#[derive(Clone, Debug)]
pub struct TemplatePlan {
    width: usize,
    height: usize,
    mean: f32,
    var_t: f64,
    zero_mean: Vec<f32>,
    flat: bool,
}

impl TemplatePlan {
    /// Builds a plan from a template view.
    pub fn from_view(tpl: ImageView<'_, u8>) -> ScreenMatchResult<Self> {
        let width = tpl.width();
        let height = tpl.height();
        let count = width
            .checked_mul(height)
            .ok_or(ScreenMatchError::InvalidDimensions { width, height })?;

        let mut sum = 0u64;
        let mut min = u8::MAX;
        let mut max = u8::MIN;
        for row in tpl.rows() {
            for &value in row {
                sum += u64::from(value);
                min = min.min(value);
                max = max.max(value);
            }
        }

        let mean_f64 = sum as f64 / count as f64;
        let mean = mean_f64 as f32;
        let mut zero_mean = Vec::with_capacity(count);
        let mut var_t = 0.0f64;
        for row in tpl.rows() {
            for &value in row {
                let centered = f64::from(value) - mean_f64;
                var_t += centered * centered;
                zero_mean.push(centered as f32);
            }
        }

        Ok(Self {
            width,
            height,
            mean,
            var_t,
            zero_mean,
            flat: min == max,
        })
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of template pixels.
    pub fn len(&self) -> usize {
        self.zero_mean.len()
    }

    /// Returns true if the plan has no pixels (never the case for valid views).
    pub fn is_empty(&self) -> bool {
        self.zero_mean.is_empty()
    }

    /// Returns the mean intensity of the template.
    pub fn mean(&self) -> f32 {
        self.mean
    }

    /// Returns the sum of squared deviations from the mean.
    pub fn var_t(&self) -> f64 {
        self.var_t
    }

    /// Returns the zero-mean template buffer in row-major order.
    pub fn zero_mean(&self) -> &[f32] {
        &self.zero_mean
    }

    /// Returns true if every template pixel has the same value.
    pub fn is_flat(&self) -> bool {
        self.flat
    }
}

#[cfg(test)]
mod tests {
    use super::TemplatePlan;
    use crate::image::OwnedImage;

    #[test]
    fn plan_matches_known_stats() {
        let img = OwnedImage::new(vec![0u8, 1, 2, 3], 2, 2).unwrap();
        let plan = TemplatePlan::from_view(img.view()).unwrap();

        assert_eq!((plan.width(), plan.height(), plan.len()), (2, 2, 4));
        assert!((plan.mean() - 1.5).abs() < 1e-6);
        assert!((plan.var_t() - 5.0).abs() < 1e-9);
        assert!(!plan.is_flat());
        let expected = [-1.5f32, -0.5, 0.5, 1.5];
        for (value, expected) in plan.zero_mean().iter().zip(expected.iter()) {
            assert!((value - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn flat_templates_are_accepted() {
        let img = OwnedImage::filled(3, 2, 255).unwrap();
        let plan = TemplatePlan::from_view(img.view()).unwrap();
        assert!(plan.is_flat());
        assert_eq!(plan.var_t(), 0.0);
        assert!((plan.mean() - 255.0).abs() < 1e-6);
        assert!(plan.zero_mean().iter().all(|&v| v == 0.0));
    }
}
