//! Conversions between the `image` crate and screenmatch buffers.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::{ImageView, OwnedImage};
use crate::util::{ScreenMatchError, ScreenMatchResult};
use image::{DynamicImage, GrayImage, RgbImage};
use std::path::Path;

/// Creates a borrowed view from a grayscale image buffer.
pub fn view_from_gray_image(img: &GrayImage) -> ScreenMatchResult<ImageView<'_, u8>> {
    ImageView::from_slice(img.as_raw(), img.width() as usize, img.height() as usize)
}

/// Creates an owned image by taking over a grayscale image buffer.
pub fn owned_from_gray_image(img: GrayImage) -> ScreenMatchResult<OwnedImage> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    OwnedImage::new(img.into_raw(), width, height)
}

/// Converts any decoded image to an owned grayscale (luma) image.
pub fn owned_from_dynamic_image(img: &DynamicImage) -> ScreenMatchResult<OwnedImage> {
    owned_from_gray_image(img.to_luma8())
}

/// Converts a color frame to grayscale for matching.
pub fn gray_from_rgb(frame: &RgbImage) -> ScreenMatchResult<OwnedImage> {
    owned_from_gray_image(image::imageops::grayscale(frame))
}

/// Loads an image from disk and converts it to a grayscale owned image.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> ScreenMatchResult<OwnedImage> {
    let img = image::open(path).map_err(|err| ScreenMatchError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_from_dynamic_image(&img)
}

/// Loads an image from disk as an RGB color frame.
pub fn load_rgb_image<P: AsRef<Path>>(path: P) -> ScreenMatchResult<RgbImage> {
    let img = image::open(path).map_err(|err| ScreenMatchError::ImageIo {
        reason: err.to_string(),
    })?;
    Ok(img.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::{gray_from_rgb, load_gray_image, view_from_gray_image};
    use crate::util::ScreenMatchError;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn gray_view_borrows_buffer() {
        let img = GrayImage::from_fn(3, 2, |x, y| Luma([(x + 3 * y) as u8]));
        let view = view_from_gray_image(&img).unwrap();
        assert_eq!((view.width(), view.height()), (3, 2));
        assert_eq!(view.row(1).unwrap(), &[3, 4, 5]);
    }

    #[test]
    fn equal_channels_keep_their_intensity() {
        let frame = RgbImage::from_fn(4, 4, |x, _| {
            let v = (x * 60) as u8;
            Rgb([v, v, v])
        });
        let gray = gray_from_rgb(&frame).unwrap();
        assert_eq!(gray.view().row(2).unwrap(), &[0, 60, 120, 180]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_gray_image("/nonexistent/template.png").unwrap_err();
        assert!(matches!(err, ScreenMatchError::ImageIo { .. }));
    }
}
