//! Uniform template rescaling.

use crate::image::{ImageView, OwnedImage};
use crate::util::math::scaled_len;
use crate::util::{ScreenMatchError, ScreenMatchResult};

/// Returns the `(width, height)` a `width x height` image has after scaling by `scale`.
///
/// Each side is `round(len * scale)`; either side may be 0 for tiny scales.
pub fn scaled_size(width: usize, height: usize, scale: f32) -> (usize, usize) {
    (scaled_len(width, scale), scaled_len(height, scale))
}

/// Resizes a grayscale image by `scale` in both axes using bilinear sampling.
///
/// Destination pixel centres map back to the source with the half-pixel
/// convention `src = (dst + 0.5) / s - 0.5`, where `s` is the exact per-axis
/// ratio between output and input sizes. Source coordinates are clamped to
/// the image, so edges replicate. Values are rounded to the nearest integer.
///
/// Returns `InvalidDimensions` when the scaled size is zero in either axis.
pub fn resize_u8_bilinear(src: ImageView<'_, u8>, scale: f32) -> ScreenMatchResult<OwnedImage> {
    let (dst_width, dst_height) = scaled_size(src.width(), src.height(), scale);
    if dst_width == 0 || dst_height == 0 {
        return Err(ScreenMatchError::InvalidDimensions {
            width: dst_width,
            height: dst_height,
        });
    }
    resize_u8_bilinear_to(src, dst_width, dst_height)
}

/// Resizes a grayscale image to an explicit `dst_width x dst_height`.
pub fn resize_u8_bilinear_to(
    src: ImageView<'_, u8>,
    dst_width: usize,
    dst_height: usize,
) -> ScreenMatchResult<OwnedImage> {
    if dst_width == 0 || dst_height == 0 {
        return Err(ScreenMatchError::InvalidDimensions {
            width: dst_width,
            height: dst_height,
        });
    }
    let len = dst_width
        .checked_mul(dst_height)
        .ok_or(ScreenMatchError::InvalidDimensions {
            width: dst_width,
            height: dst_height,
        })?;
    let width = src.width();
    let height = src.height();
    if dst_width == width && dst_height == height {
        return OwnedImage::from_view(src);
    }

    let ratio_x = width as f32 / dst_width as f32;
    let ratio_y = height as f32 / dst_height as f32;
    let max_x = (width - 1) as f32;
    let max_y = (height - 1) as f32;

    let xs: Vec<(usize, usize, f32)> = (0..dst_width)
        .map(|x| sample_coord((x as f32 + 0.5) * ratio_x - 0.5, max_x, width))
        .collect();

    let mut out = Vec::with_capacity(len);
    for y in 0..dst_height {
        let (y0, y1, fy) = sample_coord((y as f32 + 0.5) * ratio_y - 0.5, max_y, height);
        let (row0, row1) = match (src.row(y0), src.row(y1)) {
            (Some(r0), Some(r1)) => (r0, r1),
            _ => {
                return Err(ScreenMatchError::BufferTooSmall {
                    needed: (y1 + 1) * src.stride(),
                    got: src.as_slice().len(),
                })
            }
        };
        for &(x0, x1, fx) in &xs {
            let a = row0[x0] as f32;
            let b = row0[x1] as f32;
            let c = row1[x0] as f32;
            let d = row1[x1] as f32;

            let top = a + (b - a) * fx;
            let bottom = c + (d - c) * fx;
            let value = top + (bottom - top) * fy;
            out.push(value.round().clamp(0.0, 255.0) as u8);
        }
    }

    OwnedImage::new(out, dst_width, dst_height)
}

/// Splits a continuous source coordinate into neighbour indices and a weight.
fn sample_coord(pos: f32, max: f32, len: usize) -> (usize, usize, f32) {
    let pos = pos.clamp(0.0, max);
    let i0 = pos.floor() as usize;
    let i1 = (i0 + 1).min(len - 1);
    (i0, i1, pos - i0 as f32)
}

#[cfg(test)]
mod tests {
    use super::{resize_u8_bilinear, resize_u8_bilinear_to, scaled_size};
    use crate::image::OwnedImage;
    use crate::util::ScreenMatchError;

    #[test]
    fn identity_scale_copies_pixels() {
        let src = OwnedImage::new((0u8..12).collect(), 4, 3).unwrap();
        let out = resize_u8_bilinear(src.view(), 1.0).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn constant_image_stays_constant() {
        let src = OwnedImage::filled(6, 4, 200).unwrap();
        for scale in [0.5f32, 1.5, 2.0] {
            let out = resize_u8_bilinear(src.view(), scale).unwrap();
            assert_eq!(
                (out.width(), out.height()),
                scaled_size(6, 4, scale),
                "scale {scale}"
            );
            assert!(out.data().iter().all(|&v| v == 200));
        }
    }

    #[test]
    fn downscale_by_two_averages_blocks() {
        let src = OwnedImage::new(vec![0, 100, 0, 100, 0, 100, 0, 100], 4, 2).unwrap();
        let out = resize_u8_bilinear(src.view(), 0.5).unwrap();
        assert_eq!((out.width(), out.height()), (2, 1));
        assert_eq!(out.data(), &[50, 50]);
    }

    #[test]
    fn vanishing_scale_is_rejected() {
        let src = OwnedImage::filled(3, 3, 1).unwrap();
        let err = resize_u8_bilinear(src.view(), 0.1).unwrap_err();
        assert_eq!(
            err,
            ScreenMatchError::InvalidDimensions {
                width: 0,
                height: 0
            }
        );
    }

    #[test]
    fn overflowing_size_is_rejected_before_allocating() {
        let src = OwnedImage::filled(3, 3, 1).unwrap();
        let err = resize_u8_bilinear_to(src.view(), usize::MAX, 2).unwrap_err();
        assert_eq!(
            err,
            ScreenMatchError::InvalidDimensions {
                width: usize::MAX,
                height: 2
            }
        );
    }
}
