//! The loop driver.

use crate::annotate::draw_detections;
use crate::detect::Detector;
use crate::image::io::gray_from_rgb;
use crate::pipeline::{DisplaySurface, FrameSource, LoopConfig, LoopState, LoopSummary};
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::{ScreenMatchError, ScreenMatchResult};

/// Drives capture → grayscale → detect → draw → present → poll until quit.
///
/// The detector is borrowed read-only for the whole run; nothing else is
/// shared between iterations.
pub struct LiveLoop<'a, S, D> {
    source: S,
    display: D,
    detector: &'a Detector,
    cfg: LoopConfig,
    state: LoopState,
    summary: LoopSummary,
    consecutive_failures: u32,
}

impl<'a, S: FrameSource, D: DisplaySurface> LiveLoop<'a, S, D> {
    /// Creates a loop in the `Running` state.
    pub fn new(source: S, display: D, detector: &'a Detector, cfg: LoopConfig) -> Self {
        Self {
            source,
            display,
            detector,
            cfg,
            state: LoopState::Running,
            summary: LoopSummary::default(),
            consecutive_failures: 0,
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Returns the counters accumulated so far.
    pub fn summary(&self) -> &LoopSummary {
        &self.summary
    }

    /// Returns the frame source and display, e.g. to inspect them after a run.
    pub fn into_parts(self) -> (S, D) {
        (self.source, self.display)
    }

    /// Runs one iteration and returns the resulting state.
    ///
    /// A failed frame is logged and skipped, and the quit signal is still
    /// polled. Display errors and exceeding `max_consecutive_failures` stop
    /// the loop with an error.
    pub fn step(&mut self) -> ScreenMatchResult<LoopState> {
        if self.state == LoopState::Stopped {
            return Ok(LoopState::Stopped);
        }
        let _span = trace_span!("iteration", index = self.summary.iterations).entered();
        self.summary.iterations += 1;

        match self.source.next_frame() {
            Ok(mut frame) => {
                self.consecutive_failures = 0;
                let detections = match gray_from_rgb(&frame) {
                    Ok(gray) => self.detector.detect(gray.view()),
                    Err(err) => {
                        trace_warn!("frame conversion failed: {}", err);
                        Vec::new()
                    }
                };
                draw_detections(&mut frame, &detections, self.cfg.box_style);
                if let Err(err) = self.display.present(&frame, &detections) {
                    self.stop();
                    return Err(err);
                }
                self.summary.frames_processed += 1;
                self.summary.detections += detections.len() as u64;
                trace_event!("frame_presented", detections = detections.len());
            }
            Err(err) => {
                self.summary.failed_frames += 1;
                self.consecutive_failures += 1;
                trace_warn!("frame acquisition failed, retrying: {}", err);
                if let Some(max) = self.cfg.max_consecutive_failures {
                    if self.consecutive_failures >= max {
                        self.stop();
                        return Err(ScreenMatchError::FrameSource {
                            reason: format!("{max} consecutive frames failed, last error: {err}"),
                        });
                    }
                }
            }
        }

        if self.display.poll_quit(self.cfg.poll_wait) {
            self.stop();
        }
        Ok(self.state)
    }

    /// Iterates until the quit signal and returns the run's counters.
    pub fn run(&mut self) -> ScreenMatchResult<LoopSummary> {
        while self.step()? == LoopState::Running {}
        Ok(self.summary.clone())
    }

    fn stop(&mut self) {
        if self.state == LoopState::Running {
            self.state = LoopState::Stopped;
            self.display.close();
        }
    }
}
