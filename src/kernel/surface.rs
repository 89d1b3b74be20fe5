//! Dense correlation surfaces.

/// Returns the surface size for a template placed fully inside an image,
/// or `None` when the template exceeds the image in either axis.
pub fn surface_size(
    img_width: usize,
    img_height: usize,
    tpl_width: usize,
    tpl_height: usize,
) -> Option<(usize, usize)> {
    if tpl_width == 0 || tpl_height == 0 || tpl_width > img_width || tpl_height > img_height {
        return None;
    }
    Some((img_width - tpl_width + 1, img_height - tpl_height + 1))
}

/// Row-major grid of correlation scores, one per top-left placement.
#[derive(Clone, Debug, PartialEq)]
pub struct CorrelationSurface {
    width: usize,
    height: usize,
    scores: Vec<f32>,
}

impl CorrelationSurface {
    pub(crate) fn new(width: usize, height: usize, scores: Vec<f32>) -> Self {
        debug_assert_eq!(scores.len(), width * height);
        Self {
            width,
            height,
            scores,
        }
    }

    /// Returns the number of placement columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of placement rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns all scores in row-major order.
    pub fn scores(&self) -> &[f32] {
        &self.scores
    }

    /// Returns the score for the placement at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.scores.get(y * self.width + x).copied()
    }

    /// Iterates over placements whose score strictly exceeds `threshold`,
    /// in row-major order, as `(x, y, score)`.
    pub fn cells_above(&self, threshold: f32) -> impl Iterator<Item = (usize, usize, f32)> + '_ {
        let width = self.width;
        self.scores
            .iter()
            .enumerate()
            .filter(move |&(_, &score)| score > threshold)
            .map(move |(idx, &score)| (idx % width, idx / width, score))
    }

    /// Returns the best placement, preferring the first in row-major order on ties.
    pub fn peak(&self) -> Option<(usize, usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        for (idx, &score) in self.scores.iter().enumerate() {
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((idx, score)),
            }
        }
        best.map(|(idx, score)| (idx % self.width, idx / self.width, score))
    }
}
