//! Detection aggregation over a set of templates.

use crate::bank::ScaledTemplateBank;
use crate::candidate::detection::Detection;
use crate::candidate::nms::suppress_overlaps;
use crate::search::{MatchConfig, MultiScaleMatcher, PreparedTarget};
use crate::template::Template;
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::{ScreenMatchError, ScreenMatchResult};
use crate::ImageView;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Optional stage applied to the concatenated raw detections.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum PostProcess {
    /// Report every raw detection.
    #[default]
    None,
    /// Greedy non-maximum suppression by intersection-over-union.
    Nms {
        /// Boxes overlapping a better box by more than this IoU are dropped.
        iou_threshold: f32,
    },
}

impl PostProcess {
    /// Applies the stage to `detections`.
    pub fn apply(&self, mut detections: Vec<Detection>) -> Vec<Detection> {
        match *self {
            PostProcess::None => detections,
            PostProcess::Nms { iou_threshold } => suppress_overlaps(&mut detections, iou_threshold),
        }
    }

    fn validate(&self) -> ScreenMatchResult<()> {
        match *self {
            PostProcess::Nms { iou_threshold } if !(0.0..=1.0).contains(&iou_threshold) => Err(
                ScreenMatchError::InvalidInput("iou_threshold must be within [0, 1]"),
            ),
            _ => Ok(()),
        }
    }
}

/// Scaled banks of every template, valid for one target size.
struct CompiledBanks {
    target_size: (usize, usize),
    banks: Vec<(usize, ScaledTemplateBank)>,
}

/// Runs the multi-scale matcher for every template with one configuration.
///
/// Templates are compiled lazily against the size of the target, since scales
/// that cannot fit are never resized. The compiled banks are cached and reused
/// until a target of a different size arrives, which in the live loop means
/// they are built once.
pub struct Detector {
    matcher: MultiScaleMatcher,
    templates: Vec<Template>,
    compiled: Mutex<Option<CompiledBanks>>,
    post: PostProcess,
}

impl Detector {
    /// Validates `cfg` and keeps a copy of `templates`.
    pub fn new(templates: &[Template], cfg: MatchConfig) -> ScreenMatchResult<Self> {
        let matcher = MultiScaleMatcher::new(cfg)?;
        Ok(Self {
            matcher,
            templates: templates.to_vec(),
            compiled: Mutex::new(None),
            post: PostProcess::None,
        })
    }

    /// Sets the post-processing stage.
    pub fn with_post_process(mut self, post: PostProcess) -> ScreenMatchResult<Self> {
        post.validate()?;
        self.post = post;
        Ok(self)
    }

    /// Returns the match configuration.
    pub fn config(&self) -> &MatchConfig {
        self.matcher.config()
    }

    /// Returns the post-processing stage.
    pub fn post_process(&self) -> PostProcess {
        self.post
    }

    /// Returns the number of templates.
    pub fn num_templates(&self) -> usize {
        self.templates.len()
    }

    /// Returns the source name of template `idx`.
    pub fn template_source(&self, idx: usize) -> Option<&str> {
        self.templates.get(idx).map(|tpl| tpl.source())
    }

    /// Compiles the templates for `width x height` targets ahead of the first frame.
    pub fn prepare(&self, width: usize, height: usize) {
        let mut compiled = self.lock_compiled();
        self.ensure_compiled(&mut compiled, (width, height));
    }

    /// Returns the number of usable scales per template for the cached target
    /// size, or `None` before anything was compiled.
    pub fn compiled_scales(&self) -> Option<Vec<usize>> {
        let compiled = self.lock_compiled();
        compiled.as_ref().map(|c| {
            let mut counts = vec![0; self.templates.len()];
            for (idx, bank) in &c.banks {
                counts[*idx] = bank.len();
            }
            counts
        })
    }

    /// Returns raw detections of every template, concatenated in template order.
    pub fn detect_raw(&self, target: ImageView<'_, u8>) -> Vec<Detection> {
        let _span = trace_span!("detect_all", templates = self.templates.len()).entered();
        if self.templates.is_empty() {
            return Vec::new();
        }
        let mut compiled = self.lock_compiled();
        let banks = self.ensure_compiled(&mut compiled, (target.width(), target.height()));

        let prepared = PreparedTarget::new(target);
        let mut out = Vec::new();
        for (idx, bank) in banks {
            out.extend(self.matcher.match_compiled(&prepared, bank, *idx));
        }
        trace_event!("raw_detections", count = out.len());
        out
    }

    /// Returns detections after the post-processing stage.
    pub fn detect(&self, target: ImageView<'_, u8>) -> Vec<Detection> {
        self.post.apply(self.detect_raw(target))
    }

    fn lock_compiled(&self) -> MutexGuard<'_, Option<CompiledBanks>> {
        self.compiled.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_compiled<'g>(
        &self,
        compiled: &'g mut Option<CompiledBanks>,
        target_size: (usize, usize),
    ) -> &'g [(usize, ScaledTemplateBank)] {
        let stale = compiled
            .as_ref()
            .map_or(true, |c| c.target_size != target_size);
        if stale {
            let (width, height) = target_size;
            let mut banks = Vec::with_capacity(self.templates.len());
            for (idx, tpl) in self.templates.iter().enumerate() {
                match self.matcher.compile(tpl, width, height) {
                    Ok(bank) => banks.push((idx, bank)),
                    Err(err) => {
                        trace_warn!("template {} skipped: {}", tpl.source(), err);
                    }
                }
            }
            trace_event!("templates_compiled", width = width, height = height);
            *compiled = Some(CompiledBanks { target_size, banks });
        }
        compiled.as_ref().map_or(&[][..], |c| c.banks.as_slice())
    }
}

/// Matches every template against `target` and concatenates the results.
pub fn detect_all(
    target: ImageView<'_, u8>,
    templates: &[Template],
    cfg: &MatchConfig,
) -> ScreenMatchResult<Vec<Detection>> {
    Ok(Detector::new(templates, cfg.clone())?.detect_raw(target))
}

#[cfg(test)]
mod tests {
    use super::{detect_all, Detector, PostProcess};
    use crate::image::OwnedImage;
    use crate::search::MatchConfig;
    use crate::template::Template;

    fn single_scale() -> MatchConfig {
        MatchConfig {
            threshold: 0.9,
            min_scale: 1.0,
            max_scale: 1.5,
            scale_step: 1.0,
            ..MatchConfig::default()
        }
    }

    #[test]
    fn zero_templates_yield_nothing() {
        let target = OwnedImage::filled(20, 20, 255).unwrap();
        let dets = detect_all(target.view(), &[], &MatchConfig::default()).unwrap();
        assert!(dets.is_empty());
    }

    #[test]
    fn nms_collapses_flat_matches() {
        let target = OwnedImage::filled(12, 12, 7).unwrap();
        let tpl = Template::from_image(OwnedImage::filled(4, 4, 7).unwrap(), "flat");
        let detector = Detector::new(&[tpl], single_scale()).unwrap();

        let raw = detector.detect_raw(target.view());
        assert_eq!(raw.len(), 9 * 9);

        let detector = detector
            .with_post_process(PostProcess::Nms { iou_threshold: 0.0 })
            .unwrap();
        let kept = detector.detect(target.view());
        assert!(kept.len() < raw.len());
        for (i, a) in kept.iter().enumerate() {
            for b in &kept[i + 1..] {
                assert_eq!(a.iou(b), 0.0);
            }
        }
    }

    #[test]
    fn rejects_out_of_range_iou() {
        let detector = Detector::new(&[], single_scale()).unwrap();
        assert!(detector
            .with_post_process(PostProcess::Nms { iou_threshold: 1.5 })
            .is_err());
    }

    #[test]
    fn banks_follow_the_target_size() {
        let tpl = Template::from_image(OwnedImage::filled(10, 10, 50).unwrap(), "flat");
        let cfg = MatchConfig {
            threshold: 0.5,
            min_scale: 1.0,
            max_scale: 2.5,
            scale_step: 0.5,
            ..MatchConfig::default()
        };
        let detector = Detector::new(&[tpl], cfg).unwrap();
        assert_eq!(detector.compiled_scales(), None);

        detector.prepare(20, 20);
        assert_eq!(detector.compiled_scales(), Some(vec![3]));

        let small = OwnedImage::filled(12, 12, 50).unwrap();
        let dets = detector.detect_raw(small.view());
        assert_eq!(detector.compiled_scales(), Some(vec![1]));
        assert_eq!(dets.len(), 3 * 3);
        assert!(dets.iter().all(|d| d.scale == 1.0));
    }

    #[test]
    fn huge_scales_yield_no_detections() {
        let target = OwnedImage::filled(100, 100, 255).unwrap();
        let tpl = Template::from_image(OwnedImage::filled(10, 10, 255).unwrap(), "flat");
        let cfg = MatchConfig {
            threshold: 0.5,
            min_scale: 1e5,
            max_scale: 1.5e5,
            scale_step: 1e5,
            ..MatchConfig::default()
        };
        let detector = Detector::new(&[tpl], cfg).unwrap();
        assert!(detector.detect(target.view()).is_empty());
        assert_eq!(detector.compiled_scales(), Some(vec![0]));
    }
}
