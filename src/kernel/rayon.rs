//! Rayon-parallel surface computation (feature-gated).
//!
//! Parallelizes over placement rows; each task scores every column of its
//! row with the same kernel used by the sequential path.

use crate::kernel::{score_at, surface_size, CorrelationSurface, IntegralImage, Kernel};
use crate::template::TemplatePlan;
use crate::ImageView;
use rayon::prelude::*;

/// Row-parallel equivalent of [`compute_surface`](crate::kernel::compute_surface).
pub fn compute_surface_par<K: Kernel>(
    image: ImageView<'_, u8>,
    integral: &IntegralImage,
    plan: &TemplatePlan,
) -> Option<CorrelationSurface> {
    let (width, height) =
        surface_size(image.width(), image.height(), plan.width(), plan.height())?;

    let mut scores = vec![0.0f32; width * height];
    scores
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, score) in row.iter_mut().enumerate() {
                *score =
                    score_at::<K>(image, integral, plan, x, y).unwrap_or(f32::NEG_INFINITY);
            }
        });

    Some(CorrelationSurface::new(width, height, scores))
}

#[cfg(test)]
mod tests {
    use super::compute_surface_par;
    use crate::kernel::scalar::ZnccScalar;
    use crate::kernel::{compute_surface, IntegralImage};
    use crate::template::TemplatePlan;
    use crate::ImageView;

    #[test]
    fn parallel_surface_is_identical_to_sequential() {
        let img_width = 30;
        let img_height = 20;
        let image: Vec<u8> = (0..img_width * img_height)
            .map(|i| ((i * 13) ^ (i / 7)) as u8)
            .collect();
        let tpl: Vec<u8> = (0..6 * 4).map(|i| (i * 9) as u8).collect();

        let image_view = ImageView::from_slice(&image, img_width, img_height).unwrap();
        let plan = TemplatePlan::from_view(ImageView::from_slice(&tpl, 6, 4).unwrap()).unwrap();
        let integral = IntegralImage::build(image_view);

        let seq = compute_surface::<ZnccScalar>(image_view, &integral, &plan).unwrap();
        let par = compute_surface_par::<ZnccScalar>(image_view, &integral, &plan).unwrap();
        assert_eq!(seq, par);
    }
}
