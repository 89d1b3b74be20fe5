//! Precompiled scaled templates.
//!
//! Resizing a template and computing its plan is done once per scale and
//! reused for every frame, so the per-frame cost is only the surface scan.

mod scales;

pub use scales::ScaleSweep;

use crate::image::resize::{resize_u8_bilinear, scaled_size};
use crate::image::{ImageView, OwnedImage};
use crate::template::{Template, TemplatePlan};
use crate::trace::trace_event;
use crate::util::ScreenMatchResult;

/// One template resized to one scale of the sweep.
pub struct ScaledTemplate {
    scale: f32,
    img: OwnedImage,
    plan: TemplatePlan,
}

impl ScaledTemplate {
    /// Returns the scale factor applied to the source template.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Returns the resized width in pixels.
    pub fn width(&self) -> usize {
        self.img.width()
    }

    /// Returns the resized height in pixels.
    pub fn height(&self) -> usize {
        self.img.height()
    }

    /// Returns a view of the resized pixels.
    pub fn view(&self) -> ImageView<'_, u8> {
        self.img.view()
    }

    /// Returns the correlation plan for the resized pixels.
    pub fn plan(&self) -> &TemplatePlan {
        &self.plan
    }
}

/// Scaled variants of a single template, in ascending scale order.
pub struct ScaledTemplateBank {
    source: String,
    base_size: (usize, usize),
    target_size: (usize, usize),
    levels: Vec<ScaledTemplate>,
}

impl ScaledTemplateBank {
    /// Resizes `tpl` to every scale of `sweep` that fits a
    /// `target_width x target_height` image.
    ///
    /// Scales that shrink the template to zero pixels in either axis are
    /// dropped, as are scales whose resized template would exceed the target;
    /// neither can produce a placement. Sizes are checked before resizing, and
    /// since they grow with the scale the sweep stops at the first oversized one.
    pub fn compile(
        tpl: &Template,
        sweep: &ScaleSweep,
        target_width: usize,
        target_height: usize,
    ) -> ScreenMatchResult<Self> {
        let mut levels = Vec::new();
        for scale in sweep.iter() {
            let (width, height) = scaled_size(tpl.width(), tpl.height(), scale);
            if width > target_width || height > target_height {
                break;
            }
            if width == 0 || height == 0 {
                continue;
            }
            let img = resize_u8_bilinear(tpl.view(), scale)?;
            let plan = TemplatePlan::from_view(img.view())?;
            levels.push(ScaledTemplate { scale, img, plan });
        }
        trace_event!("template_compiled", scales = levels.len());
        Ok(Self {
            source: tpl.source().to_owned(),
            base_size: (tpl.width(), tpl.height()),
            target_size: (target_width, target_height),
            levels,
        })
    }

    /// Returns the source name of the compiled template.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the unscaled template `(width, height)`.
    pub fn base_size(&self) -> (usize, usize) {
        self.base_size
    }

    /// Returns the target `(width, height)` the bank was compiled for.
    pub fn target_size(&self) -> (usize, usize) {
        self.target_size
    }

    /// Returns the scaled variants in ascending scale order.
    pub fn levels(&self) -> &[ScaledTemplate] {
        &self.levels
    }

    /// Returns the number of usable scales.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Returns true if no scale produced a usable template.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
