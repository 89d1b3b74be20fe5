//! Error types for screenmatch.

use thiserror::Error;

/// Result alias for screenmatch operations.
pub type ScreenMatchResult<T> = std::result::Result<T, ScreenMatchError>;

/// Errors that can occur while loading, matching or running the live loop.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ScreenMatchError {
    /// Image dimensions are zero or overflow.
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// The backing buffer is shorter than the dimensions require.
    #[error("buffer too small: needed {needed} elements, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// The row stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Decoding or converting an image through the `image` crate failed.
    #[error("image io: {reason}")]
    ImageIo { reason: String },
    /// No executable location is available to resolve the template directory.
    #[error("cannot resolve template directory: {reason}")]
    NoBasePath { reason: String },
    /// The frame source could not produce a frame.
    #[error("frame source: {reason}")]
    FrameSource { reason: String },
    /// The display surface rejected a frame.
    #[error("display: {reason}")]
    Display { reason: String },
}
