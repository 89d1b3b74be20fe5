//! Scalar reference kernel.

use crate::kernel::Kernel;
use crate::template::TemplatePlan;
use crate::ImageView;

/// Scalar ZNCC dot-product kernel.
pub struct ZnccScalar;

impl Kernel for ZnccScalar {
    fn dot_at(image: ImageView<'_, u8>, plan: &TemplatePlan, x: usize, y: usize) -> f32 {
        let tpl_width = plan.width();
        let t_prime = plan.zero_mean();
        let mut dot = 0.0f32;
        for (ty, tpl_row) in t_prime.chunks_exact(tpl_width).enumerate() {
            let Some(img_row) = image.row(y + ty) else {
                return 0.0;
            };
            let window = &img_row[x..x + tpl_width];
            for (&t, &value) in tpl_row.iter().zip(window) {
                dot += t * value as f32;
            }
        }
        dot
    }
}

#[cfg(test)]
mod tests {
    use super::ZnccScalar;
    use crate::kernel::{compute_surface, IntegralImage};
    use crate::template::TemplatePlan;
    use crate::ImageView;

    #[test]
    fn scalar_surface_matches_bruteforce() {
        let img_width = 9;
        let img_height = 7;
        let mut image = Vec::with_capacity(img_width * img_height);
        for y in 0..img_height {
            for x in 0..img_width {
                image.push(((x * 17 + y * 9 + x * y) & 0xFF) as u8);
            }
        }
        let tpl_width = 3;
        let tpl_height = 2;
        let mut tpl = Vec::with_capacity(tpl_width * tpl_height);
        for y in 0..tpl_height {
            for x in 0..tpl_width {
                tpl.push(((x * 5 + y * 11 + x * y) & 0xFF) as u8);
            }
        }

        let image_view = ImageView::from_slice(&image, img_width, img_height).unwrap();
        let tpl_view = ImageView::from_slice(&tpl, tpl_width, tpl_height).unwrap();
        let plan = TemplatePlan::from_view(tpl_view).unwrap();
        let integral = IntegralImage::build(image_view);
        let surface = compute_surface::<ZnccScalar>(image_view, &integral, &plan).unwrap();
        assert_eq!(surface.width(), img_width - tpl_width + 1);
        assert_eq!(surface.height(), img_height - tpl_height + 1);

        let n = (tpl_width * tpl_height) as f64;
        let t_mean = tpl.iter().map(|&v| v as f64).sum::<f64>() / n;
        for y in 0..surface.height() {
            for x in 0..surface.width() {
                let mut i_vals = Vec::with_capacity(tpl.len());
                for ty in 0..tpl_height {
                    let row = image_view.row(y + ty).unwrap();
                    i_vals.extend(row[x..x + tpl_width].iter().map(|&v| v as f64));
                }
                let i_mean = i_vals.iter().sum::<f64>() / n;
                let mut num = 0.0f64;
                let mut var_t = 0.0f64;
                let mut var_i = 0.0f64;
                for (&t, &i) in tpl.iter().zip(i_vals.iter()) {
                    let dt = t as f64 - t_mean;
                    let di = i - i_mean;
                    num += dt * di;
                    var_t += dt * dt;
                    var_i += di * di;
                }
                let expected = if var_i == 0.0 {
                    0.0
                } else {
                    num / (var_t * var_i).sqrt()
                };
                let got = surface.get(x, y).unwrap();
                assert!(
                    (got as f64 - expected).abs() < 1e-4,
                    "({x}, {y}): got {got}, expected {expected}"
                );
            }
        }
    }
}
