//! Multi-pass hashed NMS with staggered grids.
//!
//! A single hash grid splits near-duplicates that straddle a bucket boundary.
//! Running several passes whose size and position grids are shifted by a
//! fraction of a cell catches most of those pairs: pass `k` of `num` scales
//! the base size by `alpha^(-k/num)` and offsets the position grid by `k/num`
//! cells. Every pass runs on the survivors of the previous one.

use crate::geometry::{check_scores, BoxesView};
use crate::hashed::{hashed_nms, validate_alpha, HashParams, KeyMode};
use crate::trace::{trace_event, trace_span};
use crate::util::{NmsError, NmsResult};

/// Chain of hashed NMS passes applied in order.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiHashNms {
    passes: Vec<HashParams>,
}

impl MultiHashNms {
    /// Builds `num` evenly staggered passes over a unit base size.
    pub fn new(num: usize, alpha: f32) -> NmsResult<Self> {
        if num == 0 {
            return Err(NmsError::Domain {
                param: "num",
                value: 0.0,
                reason: "at least one hashing pass is required",
            });
        }
        validate_alpha(alpha)?;

        let neg_log_alpha = -(alpha as f64).ln();
        let passes = (0..num)
            .map(|k| {
                let t = k as f64 / num as f64;
                let base = (t * neg_log_alpha).exp() as f32;
                HashParams::new(base, base, alpha, t as f32, t as f32)
            })
            .collect();
        Ok(Self { passes })
    }

    /// Uses explicit passes, validating each one.
    pub fn from_passes(passes: Vec<HashParams>) -> NmsResult<Self> {
        if passes.is_empty() {
            return Err(NmsError::InvalidInput("multi-hash NMS needs at least one pass"));
        }
        for pass in &passes {
            pass.validate()?;
        }
        Ok(Self { passes })
    }

    /// Returns the configured passes.
    pub fn passes(&self) -> &[HashParams] {
        &self.passes
    }

    /// Sets the bucket key encoding of every pass.
    pub fn with_key_mode(mut self, key_mode: KeyMode) -> Self {
        for pass in &mut self.passes {
            pass.key_mode = key_mode;
        }
        self
    }

    /// Enables or disables parallel quantization in every pass.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        for pass in &mut self.passes {
            pass.parallel = parallel;
        }
        self
    }

    /// Runs all passes and returns surviving indices into the original set.
    ///
    /// The order of the result is the bucket order of the last pass.
    pub fn apply(&self, boxes: BoxesView<'_>, scores: &[f32]) -> NmsResult<Vec<usize>> {
        check_scores(&boxes, scores)?;
        if boxes.is_empty() {
            return Ok(Vec::new());
        }

        let _span =
            trace_span!("multi_hash_nms", n = boxes.len(), passes = self.passes.len()).entered();

        let (first, rest) = self
            .passes
            .split_first()
            .ok_or(NmsError::InvalidInput("multi-hash NMS needs at least one pass"))?;
        let mut keep = hashed_nms(boxes, scores, first)?;

        for pass in rest {
            let sub_boxes = boxes.gather(&keep)?;
            let sub_scores: Vec<f32> = keep.iter().map(|&idx| scores[idx]).collect();
            let local = hashed_nms(BoxesView::from_rows(&sub_boxes), &sub_scores, pass)?;
            keep = local.into_iter().map(|idx| keep[idx]).collect();
        }

        trace_event!("multi_hash_nms_done", kept = keep.len());
        Ok(keep)
    }
}

#[cfg(test)]
mod tests {
    use super::MultiHashNms;
    use crate::geometry::BoxesView;

    #[test]
    fn passes_are_staggered() {
        let multi = MultiHashNms::new(2, 0.25).unwrap();
        let passes = multi.passes();
        assert_eq!(passes.len(), 2);
        assert!((passes[0].w0 - 1.0).abs() < 1e-6);
        assert_eq!(passes[0].bx, 0.0);
        // exp(0.5 * ln 4) = 2
        assert!((passes[1].w0 - 2.0).abs() < 1e-5);
        assert!((passes[1].by - 0.5).abs() < 1e-6);
    }

    #[test]
    fn zero_passes_is_a_domain_error() {
        assert!(MultiHashNms::new(0, 0.5).unwrap_err().is_domain());
        assert!(MultiHashNms::from_passes(Vec::new()).unwrap_err().is_invalid_input());
    }

    #[test]
    fn result_indexes_original_set() {
        let rows = [
            [100.0, 100.0, 20.0, 20.0],
            [100.5, 100.0, 20.0, 20.0],
            [400.0, 400.0, 20.0, 20.0],
        ];
        let scores = [0.4, 0.9, 0.3];
        let multi = MultiHashNms::new(3, 0.5).unwrap();
        let mut keep = multi.apply(BoxesView::from_rows(&rows), &scores).unwrap();
        keep.sort_unstable();
        assert_eq!(keep, vec![1, 2]);
    }
}
