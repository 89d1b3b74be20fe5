//! Scale sweep generation.

use crate::util::{ScreenMatchError, ScreenMatchResult};

/// Half-open sweep of template scale factors `[min_scale, max_scale)`.
///
/// Scale `i` is `min_scale + i * step`, computed in `f64` from the index and
/// then rounded to `f32`. Scales are produced lazily, so the sweep length is
/// only bounded by `usize`. Every emitted `f32` is strictly below `max_scale`.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleSweep {
    min_scale: f32,
    max_scale: f32,
    step: f32,
    len: usize,
}

impl ScaleSweep {
    /// Creates a sweep over `[min_scale, max_scale)` with a positive step.
    ///
    /// `max_scale <= min_scale` yields an empty sweep rather than an error.
    pub fn new(min_scale: f32, max_scale: f32, step: f32) -> ScreenMatchResult<Self> {
        if !min_scale.is_finite() || !max_scale.is_finite() || !step.is_finite() {
            return Err(ScreenMatchError::InvalidInput(
                "scale sweep parameters must be finite",
            ));
        }
        if step <= 0.0 {
            return Err(ScreenMatchError::InvalidInput("scale_step must be > 0"));
        }

        let len = Self::count(min_scale, max_scale, step)?;

        Ok(Self {
            min_scale,
            max_scale,
            step,
            len,
        })
    }

    fn value(min_scale: f32, step: f32, idx: usize) -> f32 {
        (f64::from(min_scale) + idx as f64 * f64::from(step)) as f32
    }

    /// Number of leading indices whose emitted scale is below `max_scale`.
    ///
    /// The emitted value is non-decreasing in the index, so the count is the
    /// partition point of `value(i) < max_scale`, searched in `[0, upper]`
    /// where `upper` is past the real-valued estimate.
    fn count(min_scale: f32, max_scale: f32, step: f32) -> ScreenMatchResult<usize> {
        if min_scale >= max_scale {
            return Ok(0);
        }
        let estimate = ((f64::from(max_scale) - f64::from(min_scale)) / f64::from(step)).ceil();
        // Keeps `upper + 1` representable.
        if estimate >= (usize::MAX / 2) as f64 {
            return Err(ScreenMatchError::InvalidInput(
                "scale sweep length overflows usize",
            ));
        }
        let upper = estimate as usize + 2;

        let (mut lo, mut hi) = (0usize, upper);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if Self::value(min_scale, step, mid) < max_scale {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        Ok(lo)
    }

    /// Returns the number of scales in the sweep.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the sweep has no scales.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the first scale (inclusive).
    pub fn min_scale(&self) -> f32 {
        self.min_scale
    }

    /// Returns the upper bound (exclusive).
    pub fn max_scale(&self) -> f32 {
        self.max_scale
    }

    /// Returns the step between consecutive scales.
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Returns the scale at `idx`.
    pub fn scale_at(&self, idx: usize) -> f32 {
        debug_assert!(idx < self.len);
        Self::value(self.min_scale, self.step, idx)
    }

    /// Iterates over all scales in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.len).map(|idx| self.scale_at(idx))
    }
}
