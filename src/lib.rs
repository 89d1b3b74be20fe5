//! screenmatch finds reference templates in live screen frames.
//!
//! The core is a multi-scale matcher: each template is resized over a scale
//! sweep, correlated against a grayscale frame with zero-mean normalized
//! cross-correlation, and every placement above a threshold is reported as a
//! [`Detection`]. Around it sit a template store, an optional non-maximum
//! suppression stage, a box annotator and a single-threaded live loop whose
//! frame source and display are supplied by the caller.
//!
//! Enable `rayon` for row-parallel surfaces, `simd` for an `f32x8` kernel and
//! `tracing` for spans and events. `image-io` (default) adds file loading,
//! annotation and the live loop.

pub mod bank;
mod candidate;
pub mod detect;
pub mod image;
pub mod kernel;
pub mod lowlevel;
pub mod search;
pub mod template;
mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub mod annotate;
#[cfg(feature = "image-io")]
pub mod pipeline;
#[cfg(feature = "image-io")]
pub mod store;

#[cfg(feature = "image-io")]
pub use crate::image::io;

pub use bank::{ScaleSweep, ScaledTemplateBank};
pub use candidate::detection::Detection;
pub use candidate::nms::suppress_overlaps;
pub use detect::{detect_all, Detector, PostProcess};
pub use crate::image::{ImageView, OwnedImage};
pub use kernel::CorrelationSurface;
pub use search::{match_template, MatchConfig, MultiScaleMatcher};
pub use template::Template;
pub use util::{ScreenMatchError, ScreenMatchResult};

#[cfg(feature = "image-io")]
pub use pipeline::{
    DisplaySurface, FrameSource, LiveLoop, LoopConfig, LoopState, LoopSummary, StillFrameSource,
};
#[cfg(feature = "image-io")]
pub use store::{LoadLimit, LoadReport, TemplateStore};
