//! Low-level building blocks for custom matching pipelines.
//!
//! Exposes template plans, kernels, window statistics and surface helpers for
//! callers that want raw correlation surfaces instead of detections. Most
//! users should prefer [`Detector`](crate::Detector) or
//! [`match_template`](crate::match_template).

pub use crate::bank::ScaledTemplate;
pub use crate::image::resize::{resize_u8_bilinear, resize_u8_bilinear_to, scaled_size};
pub use crate::kernel::scalar::ZnccScalar;
pub use crate::kernel::{
    compute_surface, score_at, surface_size, zncc_score, IntegralImage, Kernel, WindowStats,
};
pub use crate::search::{surface_for, PreparedTarget};
pub use crate::template::TemplatePlan;

#[cfg(feature = "rayon")]
pub use crate::kernel::rayon::compute_surface_par;
#[cfg(feature = "simd")]
pub use crate::kernel::simd::ZnccSimd;
