//! Frame source replaying a single still image.

use crate::image::io::load_rgb_image;
use crate::pipeline::FrameSource;
use crate::util::ScreenMatchResult;
use image::imageops::{resize, FilterType};
use image::RgbImage;
use std::path::Path;

/// Returns the same frame on every call, useful for offline runs and tests.
#[derive(Clone, Debug)]
pub struct StillFrameSource {
    frame: RgbImage,
}

impl StillFrameSource {
    /// Replays `frame` unchanged.
    pub fn new(frame: RgbImage) -> Self {
        Self { frame }
    }

    /// Replays `frame` downsampled to `width x height`.
    pub fn resized(frame: &RgbImage, width: u32, height: u32) -> Self {
        Self::new(resize(frame, width, height, FilterType::Triangle))
    }

    /// Loads an image file and downsamples it to `width x height`.
    pub fn open<P: AsRef<Path>>(path: P, width: u32, height: u32) -> ScreenMatchResult<Self> {
        let frame = load_rgb_image(path)?;
        Ok(Self::resized(&frame, width, height))
    }

    /// Returns the replayed frame.
    pub fn frame(&self) -> &RgbImage {
        &self.frame
    }
}

impl FrameSource for StillFrameSource {
    fn next_frame(&mut self) -> ScreenMatchResult<RgbImage> {
        Ok(self.frame.clone())
    }
}
