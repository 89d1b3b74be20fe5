//! Detection boxes produced by the matcher.

use std::cmp::Ordering;

/// Axis-aligned box where a template was judged present.
///
/// `(x0, y0)` is the top-left placement and `(x1, y1) = (x0 + w, y0 + h)` for
/// the scaled template size `w x h`, so `x1`/`y1` are exclusive pixel bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    /// Left edge (inclusive).
    pub x0: usize,
    /// Top edge (inclusive).
    pub y0: usize,
    /// Right edge (exclusive).
    pub x1: usize,
    /// Bottom edge (exclusive).
    pub y1: usize,
    /// Correlation score at the placement, in `[-1, 1]`.
    pub score: f32,
    /// Scale applied to the template.
    pub scale: f32,
    /// Index of the template in the aggregator's template list.
    pub template_idx: usize,
}

impl Detection {
    /// Returns the box width.
    pub fn width(&self) -> usize {
        self.x1 - self.x0
    }

    /// Returns the box height.
    pub fn height(&self) -> usize {
        self.y1 - self.y0
    }

    /// Returns the box area in pixels.
    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    /// Returns the top-left and bottom-right corners.
    pub fn corners(&self) -> ((usize, usize), (usize, usize)) {
        ((self.x0, self.y0), (self.x1, self.y1))
    }

    /// Returns the intersection-over-union of two boxes, in `[0, 1]`.
    pub fn iou(&self, other: &Detection) -> f32 {
        let ix0 = self.x0.max(other.x0);
        let iy0 = self.y0.max(other.y0);
        let ix1 = self.x1.min(other.x1);
        let iy1 = self.y1.min(other.y1);
        if ix1 <= ix0 || iy1 <= iy0 {
            return 0.0;
        }
        let inter = (ix1 - ix0) * (iy1 - iy0);
        let union = self.area() + other.area() - inter;
        if union == 0 {
            return 0.0;
        }
        inter as f32 / union as f32
    }
}

fn detection_cmp_desc(a: &Detection, b: &Detection) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.template_idx.cmp(&b.template_idx))
        .then_with(|| a.scale.total_cmp(&b.scale))
        .then_with(|| a.y0.cmp(&b.y0))
        .then_with(|| a.x0.cmp(&b.x0))
}

/// Sorts detections by descending score with deterministic tie-breaking.
pub(crate) fn sort_detections_desc(detections: &mut [Detection]) {
    detections.sort_by(detection_cmp_desc);
}
