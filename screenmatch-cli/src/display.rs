//! Display surfaces for the live loop.

use image::RgbImage;
use screenmatch::{Detection, DisplaySurface, ScreenMatchResult};
use std::thread;
use std::time::Duration;

fn budget_spent(presented: u64, max_frames: Option<u64>) -> bool {
    max_frames.is_some_and(|max| presented >= max)
}

/// Logs a one-line summary per frame; quits once the frame budget is spent.
pub struct HeadlessDisplay {
    presented: u64,
    max_frames: Option<u64>,
}

impl HeadlessDisplay {
    /// Creates a display that quits after `max_frames` frames, or never.
    pub fn new(max_frames: Option<u64>) -> Self {
        Self {
            presented: 0,
            max_frames,
        }
    }
}

impl DisplaySurface for HeadlessDisplay {
    fn present(&mut self, frame: &RgbImage, detections: &[Detection]) -> ScreenMatchResult<()> {
        self.presented += 1;
        let best = detections.iter().map(|d| d.score).fold(None, |acc: Option<f32>, s| {
            Some(acc.map_or(s, |a| a.max(s)))
        });
        tracing::info!(
            frame = self.presented,
            width = frame.width(),
            height = frame.height(),
            detections = detections.len(),
            best_score = ?best,
            "frame"
        );
        Ok(())
    }

    fn poll_quit(&mut self, wait: Duration) -> bool {
        if budget_spent(self.presented, self.max_frames) {
            return true;
        }
        thread::sleep(wait);
        false
    }
}

#[cfg(feature = "window")]
pub use window::WindowDisplay;

#[cfg(feature = "window")]
mod window {
    use super::budget_spent;
    use image::RgbImage;
    use minifb::{Key, Window, WindowOptions};
    use screenmatch::{Detection, DisplaySurface, ScreenMatchError, ScreenMatchResult};
    use std::thread;
    use std::time::Duration;

    fn display_error(err: minifb::Error) -> ScreenMatchError {
        ScreenMatchError::Display {
            reason: err.to_string(),
        }
    }

    /// Resizable window showing annotated frames; Escape or closing it quits.
    pub struct WindowDisplay {
        window: Option<Window>,
        buffer: Vec<u32>,
        presented: u64,
        max_frames: Option<u64>,
    }

    impl WindowDisplay {
        /// Opens a `width x height` window; `max_frames` bounds the run like
        /// the headless display.
        pub fn open(width: usize, height: usize, max_frames: Option<u64>) -> ScreenMatchResult<Self> {
            let window = Window::new(
                "screenmatch",
                width,
                height,
                WindowOptions {
                    resize: true,
                    ..WindowOptions::default()
                },
            )
            .map_err(display_error)?;
            Ok(Self {
                window: Some(window),
                buffer: Vec::new(),
                presented: 0,
                max_frames,
            })
        }
    }

    impl DisplaySurface for WindowDisplay {
        fn present(&mut self, frame: &RgbImage, _detections: &[Detection]) -> ScreenMatchResult<()> {
            let window = self.window.as_mut().ok_or_else(|| ScreenMatchError::Display {
                reason: "window already closed".to_string(),
            })?;
            // 0RGB, one u32 per pixel.
            self.buffer.clear();
            self.buffer.extend(frame.pixels().map(|px| {
                let [r, g, b] = px.0;
                (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
            }));
            window
                .update_with_buffer(&self.buffer, frame.width() as usize, frame.height() as usize)
                .map_err(display_error)?;
            self.presented += 1;
            Ok(())
        }

        fn poll_quit(&mut self, wait: Duration) -> bool {
            let Some(window) = self.window.as_mut() else {
                return true;
            };
            thread::sleep(wait);
            window.update();
            !window.is_open()
                || window.is_key_down(Key::Escape)
                || budget_spent(self.presented, self.max_frames)
        }

        fn close(&mut self) {
            self.window = None;
        }
    }
}
