//! Template storage and planning utilities.

use crate::image::{ImageView, OwnedImage};
use crate::util::ScreenMatchResult;

mod plan;

pub use plan::TemplatePlan;

/// Owned grayscale template together with the name of its source.
#[derive(Clone, Debug)]
pub struct Template {
    img: OwnedImage,
    source: String,
}

impl Template {
    /// Creates a template from a contiguous grayscale buffer.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> ScreenMatchResult<Self> {
        let img = OwnedImage::new(data, width, height)?;
        Ok(Self::from_image(img, "memory"))
    }

    /// Wraps an already decoded grayscale image.
    pub fn from_image(img: OwnedImage, source: impl Into<String>) -> Self {
        Self {
            img,
            source: source.into(),
        }
    }

    /// Replaces the source name (file path or label).
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Returns a borrowed view of the template data.
    pub fn view(&self) -> ImageView<'_, u8> {
        self.img.view()
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.img.width()
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.img.height()
    }

    /// Returns where the template came from.
    pub fn source(&self) -> &str {
        &self.source
    }
}
