//! Live capture → match → annotate → display loop.
//!
//! Frame acquisition and presentation are collaborators behind the
//! [`FrameSource`] and [`DisplaySurface`] traits; the loop itself is
//! single-threaded and paced by the display's bounded quit poll.
//!
//! Available when the `image-io` feature is enabled.

mod driver;
mod still;

pub use driver::LiveLoop;
pub use still::StillFrameSource;

use crate::annotate::BoxStyle;
use crate::candidate::detection::Detection;
use crate::util::ScreenMatchResult;
use image::RgbImage;
use std::time::Duration;

/// Default capture downsample width.
pub const DEFAULT_OUTPUT_WIDTH: u32 = 400;

/// Default capture downsample height.
pub const DEFAULT_OUTPUT_HEIGHT: u32 = 300;

/// Produces one color frame per loop iteration.
pub trait FrameSource {
    /// Acquires the next frame.
    fn next_frame(&mut self) -> ScreenMatchResult<RgbImage>;
}

/// Sink for annotated frames that also delivers the quit signal.
pub trait DisplaySurface {
    /// Shows an annotated frame. `detections` are the boxes already drawn.
    fn present(&mut self, frame: &RgbImage, detections: &[Detection]) -> ScreenMatchResult<()>;

    /// Waits at most `wait` for the quit signal and reports whether it arrived.
    fn poll_quit(&mut self, wait: Duration) -> bool;

    /// Releases display resources once the loop has stopped.
    fn close(&mut self) {}
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn next_frame(&mut self) -> ScreenMatchResult<RgbImage> {
        (**self).next_frame()
    }
}

impl<T: DisplaySurface + ?Sized> DisplaySurface for Box<T> {
    fn present(&mut self, frame: &RgbImage, detections: &[Detection]) -> ScreenMatchResult<()> {
        (**self).present(frame, detections)
    }

    fn poll_quit(&mut self, wait: Duration) -> bool {
        (**self).poll_quit(wait)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Loop state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// Iterations keep running.
    Running,
    /// Quit was requested; terminal.
    Stopped,
}

/// Loop tunables.
#[derive(Clone, Debug, PartialEq)]
pub struct LoopConfig {
    /// Bounded wait for the quit signal at the end of every iteration.
    pub poll_wait: Duration,
    /// Stop with an error after this many failed frames in a row.
    pub max_consecutive_failures: Option<u32>,
    /// Box outline style.
    pub box_style: BoxStyle,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            poll_wait: Duration::from_millis(2),
            max_consecutive_failures: None,
            box_style: BoxStyle::default(),
        }
    }
}

/// Counters accumulated over a loop run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoopSummary {
    /// Iterations started, including those with a failed frame.
    pub iterations: u64,
    /// Frames that were matched and presented.
    pub frames_processed: u64,
    /// Frames the source failed to deliver.
    pub failed_frames: u64,
    /// Detections drawn over all frames.
    pub detections: u64,
}
