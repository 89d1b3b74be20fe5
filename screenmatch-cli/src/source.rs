//! Primary-monitor screen capture.

use image::imageops::{resize, FilterType};
use image::{DynamicImage, RgbImage};
use screenmatch::{FrameSource, ScreenMatchError, ScreenMatchResult};

fn capture_error(err: impl std::fmt::Display) -> ScreenMatchError {
    ScreenMatchError::FrameSource {
        reason: err.to_string(),
    }
}

/// Grabs the primary monitor and downsamples it for matching.
pub struct ScreenCapture {
    monitor: xcap::Monitor,
    width: u32,
    height: u32,
}

impl ScreenCapture {
    /// Picks the primary monitor, falling back to the first one found.
    pub fn primary(width: u32, height: u32) -> ScreenMatchResult<Self> {
        let mut monitors = xcap::Monitor::all().map_err(capture_error)?;
        let idx = monitors.iter().position(|m| m.is_primary()).unwrap_or(0);
        if monitors.is_empty() {
            return Err(capture_error("no monitors found"));
        }
        let monitor = monitors.swap_remove(idx);
        tracing::info!(
            monitor = monitor.name(),
            width = monitor.width(),
            height = monitor.height(),
            "capturing screen"
        );
        Ok(Self {
            monitor,
            width,
            height,
        })
    }
}

impl FrameSource for ScreenCapture {
    fn next_frame(&mut self) -> ScreenMatchResult<RgbImage> {
        let rgba = self.monitor.capture_image().map_err(capture_error)?;
        let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();
        Ok(resize(&rgb, self.width, self.height, FilterType::Triangle))
    }
}
