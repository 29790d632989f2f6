//! Approximate duplicate removal by anchor-grid hashing.
//!
//! Each `(x, y, w, h)` box is mapped to a bucket made of two size ranks
//! (how many `alpha`-scalings separate its width and height from the base
//! size `(w0, h0)`) and two position bins on a grid whose pitch shrinks or
//! grows with the rank. Only the best-scoring box of every bucket survives.
//! The pass is linear in the number of boxes, against the quadratic pairwise
//! overlap test of greedy NMS.

pub(crate) mod multi;
mod quantize;
mod reduce;

pub use multi::MultiHashNms;
pub use quantize::{hash_boxes, quantize, QuantCode};
pub use reduce::best_per_key;

use crate::geometry::{check_scores, BoxesView};
use crate::trace::{trace_event, trace_span};
use crate::util::{NmsError, NmsResult};

/// Bucket key used by the reduction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyMode {
    /// Key on the full `(qx, qy, i, j)` tuple. Distinct buckets never merge.
    #[default]
    Exact,
    /// Key on [`QuantCode::packed`], reproducing the decimal-radix encoding
    /// of reference implementations, collisions included.
    LegacyPacked,
}

/// Parameters of the anchor grid the quantizer assumes.
#[derive(Clone, Debug, PartialEq)]
pub struct HashParams {
    /// Base anchor width.
    pub w0: f32,
    /// Base anchor height.
    pub h0: f32,
    /// Ratio between consecutive anchor sizes. Must be positive and not 1.
    pub alpha: f32,
    /// Horizontal grid offset, in cells.
    pub bx: f32,
    /// Vertical grid offset, in cells.
    pub by: f32,
    /// Bucket key encoding.
    pub key_mode: KeyMode,
    /// Quantize on the rayon pool (only with the `rayon` feature).
    pub parallel: bool,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            w0: 1.0,
            h0: 1.0,
            alpha: 0.7,
            bx: 0.5,
            by: 0.5,
            key_mode: KeyMode::Exact,
            parallel: false,
        }
    }
}

impl HashParams {
    /// Creates parameters with exact keys and sequential quantization.
    pub fn new(w0: f32, h0: f32, alpha: f32, bx: f32, by: f32) -> Self {
        Self {
            w0,
            h0,
            alpha,
            bx,
            by,
            ..Self::default()
        }
    }

    /// Selects the bucket key encoding.
    pub fn with_key_mode(mut self, key_mode: KeyMode) -> Self {
        self.key_mode = key_mode;
        self
    }

    /// Enables or disables parallel quantization.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Checks that the grid parameters define a usable quantizer.
    pub fn validate(&self) -> NmsResult<()> {
        validate_base("w0", self.w0)?;
        validate_base("h0", self.h0)?;
        validate_alpha(self.alpha)
    }
}

fn validate_base(param: &'static str, value: f32) -> NmsResult<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(NmsError::Domain {
            param,
            value,
            reason: "base size must be finite and positive",
        });
    }
    Ok(())
}

pub(crate) fn validate_alpha(alpha: f32) -> NmsResult<()> {
    if !(alpha.is_finite() && alpha > 0.0) {
        return Err(NmsError::Domain {
            param: "alpha",
            value: alpha,
            reason: "scale ratio must be finite and positive",
        });
    }
    if alpha == 1.0 {
        return Err(NmsError::Domain {
            param: "alpha",
            value: alpha,
            reason: "scale ratio of 1 leaves size ranks undefined",
        });
    }
    Ok(())
}

/// Hashed NMS over `(x, y, w, h)` boxes.
///
/// Returns one index per occupied bucket, ordered by bucket key rather than by
/// index. Empty input returns an empty result without validating `params`.
pub fn hashed_nms(
    boxes: BoxesView<'_>,
    scores: &[f32],
    params: &HashParams,
) -> NmsResult<Vec<usize>> {
    check_scores(&boxes, scores)?;
    if boxes.is_empty() {
        return Ok(Vec::new());
    }
    params.validate()?;

    let _span = trace_span!("hashed_nms", n = boxes.len(), alpha = params.alpha).entered();

    let codes = hash_boxes(boxes, params);
    let keep = match params.key_mode {
        KeyMode::Exact => best_per_key(&codes, scores),
        KeyMode::LegacyPacked => {
            let packed: Vec<i64> = codes.iter().map(QuantCode::packed).collect();
            best_per_key(&packed, scores)
        }
    };
    trace_event!("hashed_nms_done", buckets = keep.len(), n = boxes.len());
    Ok(keep)
}

/// Hashed NMS over a flat `N x 4` buffer of `(x, y, w, h)` boxes.
#[allow(clippy::too_many_arguments)]
pub fn hnms(
    boxes: &[f32],
    scores: &[f32],
    w0: f32,
    h0: f32,
    alpha: f32,
    bx: f32,
    by: f32,
) -> NmsResult<Vec<usize>> {
    let params = HashParams::new(w0, h0, alpha, bx, by);
    hashed_nms(BoxesView::from_flat(boxes)?, scores, &params)
}

#[cfg(test)]
mod tests {
    use super::{hnms, HashParams, KeyMode};
    use crate::util::NmsError;

    #[test]
    fn validate_rejects_unit_alpha() {
        let err = HashParams::new(16.0, 16.0, 1.0, 0.5, 0.5)
            .validate()
            .unwrap_err();
        assert!(err.is_domain());
        assert!(matches!(err, NmsError::Domain { param: "alpha", .. }));
    }

    #[test]
    fn validate_rejects_non_positive_inputs() {
        assert!(HashParams::new(0.0, 16.0, 0.5, 0.5, 0.5).validate().is_err());
        assert!(HashParams::new(16.0, -1.0, 0.5, 0.5, 0.5).validate().is_err());
        assert!(HashParams::new(16.0, 16.0, 0.0, 0.5, 0.5).validate().is_err());
        assert!(HashParams::new(16.0, 16.0, f32::NAN, 0.5, 0.5).validate().is_err());
        assert!(HashParams::default().validate().is_ok());
    }

    #[test]
    fn empty_input_skips_parameter_checks() {
        assert_eq!(hnms(&[], &[], 16.0, 16.0, 1.0, 0.0, 0.0).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn unit_alpha_is_rejected_on_non_empty_input() {
        let err = hnms(&[0.0, 0.0, 8.0, 8.0], &[0.5], 16.0, 16.0, 1.0, 0.0, 0.0).unwrap_err();
        assert!(err.is_domain());
    }

    #[test]
    fn builders_set_fields() {
        let p = HashParams::default()
            .with_key_mode(KeyMode::LegacyPacked)
            .with_parallel(true);
        assert_eq!(p.key_mode, KeyMode::LegacyPacked);
        assert!(p.parallel);
    }
}
