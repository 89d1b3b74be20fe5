//! Numeric helpers for scaling and scoring.

/// Returns `round(len * scale)`, or 0 when the product is not a positive finite value.
pub(crate) fn scaled_len(len: usize, scale: f32) -> usize {
    let scaled = (len as f64) * f64::from(scale);
    if !scaled.is_finite() || scaled <= 0.0 {
        return 0;
    }
    scaled.round() as usize
}

/// Clamps a correlation score to `[-1, 1]`, mapping non-finite values to 0.
pub(crate) fn clamp_score(score: f32) -> f32 {
    if score.is_finite() {
        score.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
