#![cfg(feature = "image-io")]

use image::{Rgb, RgbImage};
use screenmatch::{
    Detection, Detector, DisplaySurface, FrameSource, LiveLoop, LoopConfig, LoopState,
    MatchConfig, OwnedImage, ScreenMatchError, ScreenMatchResult, StillFrameSource, Template,
};
use std::collections::VecDeque;
use std::time::Duration;

/// Display that records what it was shown and quits after a fixed number of polls.
#[derive(Default)]
struct RecordingDisplay {
    presented: Vec<(RgbImage, usize)>,
    polls: usize,
    quit_after_polls: usize,
    fail_present: bool,
    closed: usize,
}

impl RecordingDisplay {
    fn quitting_after(polls: usize) -> Self {
        Self {
            quit_after_polls: polls,
            ..Self::default()
        }
    }
}

impl DisplaySurface for RecordingDisplay {
    fn present(&mut self, frame: &RgbImage, detections: &[Detection]) -> ScreenMatchResult<()> {
        if self.fail_present {
            return Err(ScreenMatchError::Display {
                reason: "window gone".into(),
            });
        }
        self.presented.push((frame.clone(), detections.len()));
        Ok(())
    }

    fn poll_quit(&mut self, _wait: Duration) -> bool {
        self.polls += 1;
        self.polls >= self.quit_after_polls
    }

    fn close(&mut self) {
        self.closed += 1;
    }
}

/// Source that replays a scripted sequence, failing where the script says so.
struct ScriptedSource {
    script: VecDeque<Option<RgbImage>>,
}

impl FrameSource for ScriptedSource {
    fn next_frame(&mut self) -> ScreenMatchResult<RgbImage> {
        match self.script.pop_front().flatten() {
            Some(frame) => Ok(frame),
            None => Err(ScreenMatchError::FrameSource {
                reason: "capture failed".into(),
            }),
        }
    }
}

/// Gray frame with a bright 8x8 block at (20, 10) on a dark 4x4 checker.
fn frame_with_block() -> RgbImage {
    RgbImage::from_fn(64, 48, |x, y| {
        if (20..28).contains(&x) && (10..18).contains(&y) {
            let v = if (x + y) % 2 == 0 { 250 } else { 180 };
            Rgb([v, v, v])
        } else {
            let v = if (x / 4 + y / 4) % 2 == 0 { 30 } else { 60 };
            Rgb([v, v, v])
        }
    })
}

fn block_template() -> Template {
    let data = (0..64)
        .map(|i| {
            let (x, y) = (i % 8, i / 8);
            if (x + y) % 2 == 0 {
                250
            } else {
                180
            }
        })
        .collect();
    Template::from_image(OwnedImage::new(data, 8, 8).unwrap(), "block")
}

fn single_scale(threshold: f32) -> MatchConfig {
    MatchConfig {
        threshold,
        min_scale: 1.0,
        max_scale: 1.5,
        scale_step: 1.0,
        ..MatchConfig::default()
    }
}

#[test]
fn stops_when_display_requests_quit() {
    let detector = Detector::new(&[block_template()], single_scale(0.99)).unwrap();
    let source = StillFrameSource::new(frame_with_block());
    let display = RecordingDisplay::quitting_after(3);
    let mut live = LiveLoop::new(source, display, &detector, LoopConfig::default());

    let summary = live.run().unwrap();
    assert_eq!(live.state(), LoopState::Stopped);
    assert_eq!(summary.iterations, 3);
    assert_eq!(summary.frames_processed, 3);
    assert_eq!(summary.failed_frames, 0);
    assert_eq!(summary.detections, 3);

    let (_, display) = live.into_parts();
    assert_eq!(display.presented.len(), 3);
    assert_eq!(display.closed, 1);
}

#[test]
fn presented_frame_carries_red_box_at_match() {
    let detector = Detector::new(&[block_template()], single_scale(0.99)).unwrap();
    let source = StillFrameSource::new(frame_with_block());
    let mut live = LiveLoop::new(
        source,
        RecordingDisplay::quitting_after(1),
        &detector,
        LoopConfig::default(),
    );
    live.run().unwrap();

    let (_, display) = live.into_parts();
    let (frame, count) = &display.presented[0];
    assert_eq!(*count, 1);
    let red = Rgb([255, 0, 0]);
    assert_eq!(*frame.get_pixel(20, 10), red);
    assert_eq!(*frame.get_pixel(27, 17), red);
    assert_eq!(*frame.get_pixel(21, 14), red);
    assert_ne!(*frame.get_pixel(23, 13), red);
    assert_ne!(*frame.get_pixel(19, 10), red);
}

#[test]
fn failed_frames_are_skipped_and_retried() {
    let detector = Detector::new(&[block_template()], single_scale(0.99)).unwrap();
    let source = ScriptedSource {
        script: VecDeque::from(vec![None, Some(frame_with_block()), None]),
    };
    let mut live = LiveLoop::new(
        source,
        RecordingDisplay::quitting_after(3),
        &detector,
        LoopConfig::default(),
    );

    assert_eq!(live.step().unwrap(), LoopState::Running);
    assert_eq!(live.summary().failed_frames, 1);
    let summary = live.run().unwrap();
    assert_eq!(summary.iterations, 3);
    assert_eq!(summary.frames_processed, 1);
    assert_eq!(summary.failed_frames, 2);

    let (_, display) = live.into_parts();
    assert_eq!(display.polls, 3);
    assert_eq!(display.presented.len(), 1);
}

#[test]
fn consecutive_failure_limit_stops_with_error() {
    let detector = Detector::new(&[], single_scale(0.9)).unwrap();
    let source = ScriptedSource {
        script: VecDeque::new(),
    };
    let cfg = LoopConfig {
        max_consecutive_failures: Some(4),
        ..LoopConfig::default()
    };
    let mut live = LiveLoop::new(source, RecordingDisplay::quitting_after(100), &detector, cfg);

    let err = live.run().unwrap_err();
    assert!(matches!(err, ScreenMatchError::FrameSource { .. }));
    assert_eq!(live.state(), LoopState::Stopped);
    assert_eq!(live.summary().failed_frames, 4);
    assert_eq!(live.step().unwrap(), LoopState::Stopped);
    assert_eq!(live.summary().iterations, 4);
}

#[test]
fn display_error_stops_and_closes() {
    let detector = Detector::new(&[block_template()], single_scale(0.99)).unwrap();
    let display = RecordingDisplay {
        fail_present: true,
        quit_after_polls: 100,
        ..RecordingDisplay::default()
    };
    let mut live = LiveLoop::new(
        StillFrameSource::new(frame_with_block()),
        display,
        &detector,
        LoopConfig {
            poll_wait: Duration::ZERO,
            ..LoopConfig::default()
        },
    );

    let err = live.run().unwrap_err();
    assert!(matches!(err, ScreenMatchError::Display { .. }));
    assert_eq!(live.state(), LoopState::Stopped);
    let (_, display) = live.into_parts();
    assert_eq!(display.closed, 1);
    assert_eq!(display.polls, 0);
}

#[test]
fn empty_template_set_still_presents_frames() {
    let detector = Detector::new(&[], MatchConfig::default()).unwrap();
    let frame = frame_with_block();
    let mut live = LiveLoop::new(
        StillFrameSource::new(frame.clone()),
        RecordingDisplay::quitting_after(2),
        &detector,
        LoopConfig::default(),
    );
    let summary = live.run().unwrap();
    assert_eq!(summary.frames_processed, 2);
    assert_eq!(summary.detections, 0);

    let (_, display) = live.into_parts();
    assert_eq!(display.presented[0].0, frame);
}

#[test]
fn still_source_downsamples_to_output_size() {
    let source = StillFrameSource::resized(&frame_with_block(), 32, 24);
    assert_eq!(source.frame().dimensions(), (32, 24));
}
