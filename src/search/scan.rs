//! Dense scan of one scaled template over a prepared target.

use crate::bank::ScaledTemplate;
use crate::candidate::detection::Detection;
use crate::kernel::{compute_surface, CorrelationSurface, DefaultKernel, IntegralImage};
use crate::ImageView;

/// Grayscale target with its window statistics, built once per frame.
pub struct PreparedTarget<'a> {
    view: ImageView<'a, u8>,
    integral: IntegralImage,
}

impl<'a> PreparedTarget<'a> {
    /// Builds the summed-area tables for `view`.
    pub fn new(view: ImageView<'a, u8>) -> Self {
        Self {
            integral: IntegralImage::build(view),
            view,
        }
    }

    /// Returns the target view.
    pub fn view(&self) -> ImageView<'a, u8> {
        self.view
    }

    /// Returns the target width in pixels.
    pub fn width(&self) -> usize {
        self.view.width()
    }

    /// Returns the target height in pixels.
    pub fn height(&self) -> usize {
        self.view.height()
    }

    /// Returns the summed-area tables of the target.
    pub fn integral(&self) -> &IntegralImage {
        &self.integral
    }
}

/// Computes the correlation surface of one scaled template.
///
/// Returns `None` when the scaled template does not fit inside the target.
/// `parallel` has no effect without the `rayon` feature.
pub fn surface_for(
    target: &PreparedTarget<'_>,
    level: &ScaledTemplate,
    parallel: bool,
) -> Option<CorrelationSurface> {
    if !target.view().contains_extent(level.width(), level.height()) {
        return None;
    }
    #[cfg(feature = "rayon")]
    if parallel {
        return crate::kernel::rayon::compute_surface_par::<DefaultKernel>(
            target.view(),
            target.integral(),
            level.plan(),
        );
    }
    #[cfg(not(feature = "rayon"))]
    let _ = parallel;
    compute_surface::<DefaultKernel>(target.view(), target.integral(), level.plan())
}

/// Emits a detection for every surface cell strictly above `threshold`.
pub(crate) fn threshold_surface(
    surface: &CorrelationSurface,
    level: &ScaledTemplate,
    threshold: f32,
    template_idx: usize,
    out: &mut Vec<Detection>,
) {
    let width = level.width();
    let height = level.height();
    out.extend(
        surface
            .cells_above(threshold)
            .map(|(x, y, score)| Detection {
                x0: x,
                y0: y,
                x1: x + width,
                y1: y + height,
                score,
                scale: level.scale(),
                template_idx,
            }),
    );
}
