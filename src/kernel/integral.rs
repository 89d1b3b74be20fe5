//! Summed-area tables for O(1) window statistics.
//!
//! Sums are kept as exact integers so flat windows are recognized without
//! floating-point cancellation.

use crate::image::ImageView;

/// Sum and sum of squares over one rectangular window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowStats {
    /// Sum of pixel values.
    pub sum: u64,
    /// Sum of squared pixel values.
    pub sum_sq: u64,
    /// Number of pixels in the window.
    pub count: u64,
}

impl WindowStats {
    /// Returns the mean intensity of the window.
    pub fn mean(&self) -> f64 {
        self.sum as f64 / self.count as f64
    }

    /// Returns `count * sum_sq - sum^2`, i.e. `count^2` times the variance.
    fn scaled_variance(&self) -> u128 {
        let n_sq = u128::from(self.count) * u128::from(self.sum_sq);
        let sq = u128::from(self.sum) * u128::from(self.sum);
        n_sq.saturating_sub(sq)
    }

    /// Returns the sum of squared deviations from the window mean.
    pub fn centered_sum_sq(&self) -> f64 {
        self.scaled_variance() as f64 / self.count as f64
    }

    /// Returns true if every pixel in the window has the same value.
    pub fn is_flat(&self) -> bool {
        self.scaled_variance() == 0
    }
}

/// Summed-area tables of pixel values and squared pixel values.
pub struct IntegralImage {
    width: usize,
    height: usize,
    sum: Vec<u64>,
    sum_sq: Vec<u64>,
}

impl IntegralImage {
    /// Builds both tables for `image` in a single pass.
    pub fn build(image: ImageView<'_, u8>) -> Self {
        let width = image.width();
        let height = image.height();
        let stride = width + 1;
        let mut sum = vec![0u64; stride * (height + 1)];
        let mut sum_sq = vec![0u64; stride * (height + 1)];

        for (y, row) in image.rows().enumerate() {
            let mut row_sum = 0u64;
            let mut row_sum_sq = 0u64;
            for (x, &value) in row.iter().enumerate() {
                let v = u64::from(value);
                row_sum += v;
                row_sum_sq += v * v;
                let idx = (y + 1) * stride + x + 1;
                sum[idx] = sum[idx - stride] + row_sum;
                sum_sq[idx] = sum_sq[idx - stride] + row_sum_sq;
            }
        }

        Self {
            width,
            height,
            sum,
            sum_sq,
        }
    }

    /// Returns the width of the source image.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the height of the source image.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns statistics for the `width x height` window at `(x, y)`.
    pub fn window(&self, x: usize, y: usize, width: usize, height: usize) -> Option<WindowStats> {
        if width == 0 || height == 0 {
            return None;
        }
        if x.checked_add(width)? > self.width || y.checked_add(height)? > self.height {
            return None;
        }
        let stride = self.width + 1;
        let a = y * stride + x;
        let b = a + width;
        let c = (y + height) * stride + x;
        let d = c + width;
        Some(WindowStats {
            sum: self.sum[d] + self.sum[a] - self.sum[b] - self.sum[c],
            sum_sq: self.sum_sq[d] + self.sum_sq[a] - self.sum_sq[b] - self.sum_sq[c],
            count: (width * height) as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::IntegralImage;
    use crate::image::OwnedImage;

    #[test]
    fn window_sums_match_direct_sums() {
        let img = OwnedImage::new((0u8..20).collect(), 5, 4).unwrap();
        let integral = IntegralImage::build(img.view());

        let stats = integral.window(1, 1, 3, 2).unwrap();
        let values = [6u64, 7, 8, 11, 12, 13];
        assert_eq!(stats.sum, values.iter().sum::<u64>());
        assert_eq!(stats.sum_sq, values.iter().map(|v| v * v).sum::<u64>());
        assert_eq!(stats.count, 6);
        assert!(!stats.is_flat());
        assert!((stats.mean() - 9.5).abs() < 1e-12);
    }

    #[test]
    fn flat_window_has_zero_variance() {
        let img = OwnedImage::filled(6, 6, 255).unwrap();
        let integral = IntegralImage::build(img.view());
        let stats = integral.window(0, 0, 6, 6).unwrap();
        assert!(stats.is_flat());
        assert_eq!(stats.centered_sum_sq(), 0.0);
    }

    #[test]
    fn out_of_bounds_window_is_none() {
        let img = OwnedImage::filled(4, 3, 1).unwrap();
        let integral = IntegralImage::build(img.view());
        assert!(integral.window(2, 0, 3, 1).is_none());
        assert!(integral.window(0, 0, 0, 1).is_none());
        assert!(integral.window(0, 0, 4, 3).is_some());
    }
}
