//! Multi-scale template matching.
//!
//! For every scale of the sweep the template is resized, correlated against
//! the whole target with zero-mean normalized cross-correlation, and every
//! placement scoring strictly above the threshold becomes a [`Detection`].
//! No suppression happens here; see [`crate::detect::PostProcess`].

pub(crate) mod scan;

pub use scan::{surface_for, PreparedTarget};

use crate::bank::{ScaleSweep, ScaledTemplateBank};
use crate::candidate::detection::Detection;
use crate::template::Template;
use crate::trace::{trace_event, trace_span};
use crate::util::{ScreenMatchError, ScreenMatchResult};
use crate::ImageView;

/// Threshold and scale sweep used for every template.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchConfig {
    /// Scores must strictly exceed this value to produce a detection.
    pub threshold: f32,
    /// First scale of the sweep (inclusive).
    pub min_scale: f32,
    /// End of the sweep (exclusive).
    pub max_scale: f32,
    /// Distance between consecutive scales; must be positive.
    pub scale_step: f32,
    /// Compute each surface with row parallelism (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: 0.75,
            min_scale: 0.5,
            max_scale: 2.0,
            scale_step: 0.5,
            parallel: false,
        }
    }
}

impl MatchConfig {
    /// Checks the configuration and returns its scale sweep.
    pub fn validate(&self) -> ScreenMatchResult<ScaleSweep> {
        if !self.threshold.is_finite() {
            return Err(ScreenMatchError::InvalidInput("threshold must be finite"));
        }
        if self.parallel && !cfg!(feature = "rayon") {
            return Err(ScreenMatchError::InvalidInput(
                "parallel matching requires the `rayon` feature",
            ));
        }
        ScaleSweep::new(self.min_scale, self.max_scale, self.scale_step)
    }
}

/// Matcher holding a validated configuration.
#[derive(Clone, Debug)]
pub struct MultiScaleMatcher {
    cfg: MatchConfig,
    sweep: ScaleSweep,
}

impl MultiScaleMatcher {
    /// Validates `cfg` and builds the scale sweep.
    pub fn new(cfg: MatchConfig) -> ScreenMatchResult<Self> {
        let sweep = cfg.validate()?;
        Ok(Self { cfg, sweep })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Returns the scale sweep.
    pub fn sweep(&self) -> &ScaleSweep {
        &self.sweep
    }

    /// Resizes `tpl` to every scale of the sweep that fits a
    /// `target_width x target_height` image.
    pub fn compile(
        &self,
        tpl: &Template,
        target_width: usize,
        target_height: usize,
    ) -> ScreenMatchResult<ScaledTemplateBank> {
        ScaledTemplateBank::compile(tpl, &self.sweep, target_width, target_height)
    }

    /// Matches a compiled template against a prepared target.
    ///
    /// Detections are ordered by ascending scale, then row-major placement,
    /// and tagged with `template_idx`.
    pub fn match_compiled(
        &self,
        target: &PreparedTarget<'_>,
        bank: &ScaledTemplateBank,
        template_idx: usize,
    ) -> Vec<Detection> {
        let _span = trace_span!("match_template", template = template_idx).entered();
        let mut out = Vec::new();
        let mut scanned = 0usize;
        for level in bank.levels() {
            let Some(surface) = scan::surface_for(target, level, self.cfg.parallel) else {
                continue;
            };
            scanned += 1;
            scan::threshold_surface(&surface, level, self.cfg.threshold, template_idx, &mut out);
        }
        trace_event!("scales_scanned", scanned = scanned, detections = out.len());
        out
    }

    /// Matches one template against one target, compiling it on the fly.
    pub fn match_template(
        &self,
        target: ImageView<'_, u8>,
        tpl: &Template,
    ) -> ScreenMatchResult<Vec<Detection>> {
        let bank = self.compile(tpl, target.width(), target.height())?;
        let prepared = PreparedTarget::new(target);
        Ok(self.match_compiled(&prepared, &bank, 0))
    }
}

/// Finds every placement of `tpl` in `target` across the configured scales.
///
/// An empty sweep (`min_scale >= max_scale`) returns no detections; an invalid
/// step or non-finite parameter is an error.
pub fn match_template(
    target: ImageView<'_, u8>,
    tpl: &Template,
    cfg: &MatchConfig,
) -> ScreenMatchResult<Vec<Detection>> {
    MultiScaleMatcher::new(cfg.clone())?.match_template(target, tpl)
}
