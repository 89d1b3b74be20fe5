//! Drawing detections onto color frames.
//!
//! Available when the `image-io` feature is enabled.

use crate::candidate::detection::Detection;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

/// Default box color (red).
pub const DEFAULT_BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Default box outline thickness in pixels.
pub const DEFAULT_BOX_THICKNESS: u32 = 2;

/// Outline style for detection boxes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoxStyle {
    /// Outline color.
    pub color: Rgb<u8>,
    /// Outline thickness, drawn inward from the box edge.
    pub thickness: u32,
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_BOX_COLOR,
            thickness: DEFAULT_BOX_THICKNESS,
        }
    }
}

/// Draws every detection as a hollow rectangle on `frame`.
///
/// Pixels outside the frame are clipped.
pub fn draw_detections(frame: &mut RgbImage, detections: &[Detection], style: BoxStyle) {
    for det in detections {
        for inset in 0..style.thickness.max(1) {
            let inset_px = inset as usize;
            let width = det.width().saturating_sub(2 * inset_px);
            let height = det.height().saturating_sub(2 * inset_px);
            if width == 0 || height == 0 {
                break;
            }
            let rect = Rect::at((det.x0 + inset_px) as i32, (det.y0 + inset_px) as i32)
                .of_size(width as u32, height as u32);
            draw_hollow_rect_mut(frame, rect, style.color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{draw_detections, BoxStyle, DEFAULT_BOX_COLOR};
    use crate::candidate::detection::Detection;
    use image::{Rgb, RgbImage};

    fn det(x0: usize, y0: usize, w: usize, h: usize) -> Detection {
        Detection {
            x0,
            y0,
            x1: x0 + w,
            y1: y0 + h,
            score: 0.9,
            scale: 1.0,
            template_idx: 0,
        }
    }

    #[test]
    fn draws_two_pixel_outline_and_keeps_interior() {
        let mut frame = RgbImage::from_pixel(20, 20, Rgb([0, 0, 0]));
        draw_detections(&mut frame, &[det(2, 3, 10, 8)], BoxStyle::default());

        assert_eq!(*frame.get_pixel(2, 3), DEFAULT_BOX_COLOR);
        assert_eq!(*frame.get_pixel(3, 4), DEFAULT_BOX_COLOR);
        assert_eq!(*frame.get_pixel(11, 10), DEFAULT_BOX_COLOR);
        assert_eq!(*frame.get_pixel(6, 7), Rgb([0, 0, 0]));
        assert_eq!(*frame.get_pixel(12, 3), Rgb([0, 0, 0]));
    }

    #[test]
    fn boxes_touching_the_border_are_clipped() {
        let mut frame = RgbImage::from_pixel(10, 10, Rgb([0, 0, 0]));
        draw_detections(&mut frame, &[det(0, 0, 10, 10)], BoxStyle::default());
        assert_eq!(*frame.get_pixel(9, 9), DEFAULT_BOX_COLOR);
        assert_eq!(*frame.get_pixel(5, 5), Rgb([0, 0, 0]));
    }
}
