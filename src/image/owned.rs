//! Owned contiguous grayscale buffers.

use crate::image::ImageView;
use crate::util::{ScreenMatchError, ScreenMatchResult};

/// Owned contiguous grayscale image buffer (`stride == width`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnedImage {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl OwnedImage {
    /// Wraps a row-major buffer whose length is exactly `width * height`.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> ScreenMatchResult<Self> {
        if width == 0 || height == 0 {
            return Err(ScreenMatchError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .ok_or(ScreenMatchError::InvalidDimensions { width, height })?;
        if data.len() < needed {
            return Err(ScreenMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(ScreenMatchError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Creates an image with every pixel set to `value`.
    pub fn filled(width: usize, height: usize, value: u8) -> ScreenMatchResult<Self> {
        let len = width
            .checked_mul(height)
            .ok_or(ScreenMatchError::InvalidDimensions { width, height })?;
        Self::new(vec![value; len], width, height)
    }

    /// Copies a (possibly strided) view into a contiguous buffer.
    pub fn from_view(view: ImageView<'_, u8>) -> ScreenMatchResult<Self> {
        let mut data = Vec::with_capacity(view.width() * view.height());
        for row in view.rows() {
            data.extend_from_slice(row);
        }
        Self::new(data, view.width(), view.height())
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> ImageView<'_, u8> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the row-major pixel buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the image and returns its pixel buffer.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}
