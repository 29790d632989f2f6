//! Inclusive-pixel area and IoU.
//!
//! Widths and heights count both end pixels: a box from `x1` to `x2` is
//! `x2 - x1 + 1` wide. Reference detection pipelines compute overlap this
//! way and results must match them exactly.

/// Area of a corner-form box `(x1, y1, x2, y2)` under the inclusive convention.
#[inline]
pub fn inclusive_area(b: [f32; 4]) -> f32 {
    (b[2] - b[0] + 1.0) * (b[3] - b[1] + 1.0)
}

/// Intersection over union of two corner-form boxes with precomputed areas.
///
/// A union that is not strictly positive yields 0 instead of NaN or a
/// negative ratio.
#[inline]
pub fn inclusive_iou(a: [f32; 4], area_a: f32, b: [f32; 4], area_b: f32) -> f32 {
    let xx1 = a[0].max(b[0]);
    let yy1 = a[1].max(b[1]);
    let xx2 = a[2].min(b[2]);
    let yy2 = a[3].min(b[3]);

    let w = (xx2 - xx1 + 1.0).max(0.0);
    let h = (yy2 - yy1 + 1.0).max(0.0);
    let inter = w * h;
    let union = area_a + area_b - inter;
    if union > 0.0 {
        inter / union
    } else {
        0.0
    }
}
