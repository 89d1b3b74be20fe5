//! SIMD dot-product kernel using the `wide` crate.
//!
//! The inner template row loop processes 8 pixels at a time as `f32x8`;
//! row tails fall back to scalar arithmetic.

use crate::kernel::Kernel;
use crate::template::TemplatePlan;
use crate::ImageView;
use wide::f32x8;

const LANES: usize = 8;

#[inline]
fn load_u8x8_as_f32x8(slice: &[u8]) -> f32x8 {
    f32x8::from([
        slice[0] as f32,
        slice[1] as f32,
        slice[2] as f32,
        slice[3] as f32,
        slice[4] as f32,
        slice[5] as f32,
        slice[6] as f32,
        slice[7] as f32,
    ])
}

#[inline]
fn load_f32x8(slice: &[f32]) -> f32x8 {
    f32x8::from([
        slice[0], slice[1], slice[2], slice[3], slice[4], slice[5], slice[6], slice[7],
    ])
}

#[inline]
fn hsum(v: f32x8) -> f32 {
    v.to_array().iter().sum()
}

/// SIMD-accelerated ZNCC dot-product kernel.
pub struct ZnccSimd;

impl Kernel for ZnccSimd {
    fn dot_at(image: ImageView<'_, u8>, plan: &TemplatePlan, x: usize, y: usize) -> f32 {
        let tpl_width = plan.width();
        let t_prime = plan.zero_mean();
        let simd_end = tpl_width / LANES * LANES;

        let mut dot_vec = f32x8::ZERO;
        let mut dot_s = 0.0f32;
        for (ty, tpl_row) in t_prime.chunks_exact(tpl_width).enumerate() {
            let Some(img_row) = image.row(y + ty) else {
                return 0.0;
            };
            let window = &img_row[x..x + tpl_width];

            let mut tx = 0;
            while tx < simd_end {
                let img_vals = load_u8x8_as_f32x8(&window[tx..]);
                let tpl_vals = load_f32x8(&tpl_row[tx..]);
                dot_vec += tpl_vals * img_vals;
                tx += LANES;
            }
            for (&t, &value) in tpl_row[simd_end..].iter().zip(&window[simd_end..]) {
                dot_s += t * value as f32;
            }
        }

        hsum(dot_vec) + dot_s
    }
}
