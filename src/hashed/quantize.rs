//! Box quantization into anchor-grid buckets.

use crate::geometry::BoxesView;
use crate::hashed::HashParams;
use crate::util::math::{round_even, to_bin};
use std::cmp::Ordering;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Discretized bucket of a box: position bins and size ranks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct QuantCode {
    /// Horizontal position bin.
    pub qx: i64,
    /// Vertical position bin.
    pub qy: i64,
    /// Width size rank.
    pub i: i64,
    /// Height size rank.
    pub j: i64,
}

impl QuantCode {
    /// Packs the four fields into the legacy decimal-radix key
    /// `qx + qy * 10^4 + i * 10^8 + j * 10^12`.
    ///
    /// Fields outside `(-10^4, 10^4)` bleed into their neighbours, so distinct
    /// codes can share a packed key.
    pub fn packed(&self) -> i64 {
        self.qx
            .wrapping_add(self.qy.wrapping_mul(10_000))
            .wrapping_add(self.i.wrapping_mul(100_000_000))
            .wrapping_add(self.j.wrapping_mul(1_000_000_000_000))
    }
}

// Most significant packed field first, so ascending order agrees with
// ascending packed keys whenever nothing overflows.
impl Ord for QuantCode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.j
            .cmp(&other.j)
            .then_with(|| self.i.cmp(&other.i))
            .then_with(|| self.qy.cmp(&other.qy))
            .then_with(|| self.qx.cmp(&other.qx))
    }
}

impl PartialOrd for QuantCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Per-call constants derived from `HashParams`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Quantizer {
    log_w0: f32,
    log_h0: f32,
    log_alpha: f32,
    alpha: f32,
    w0_pitch: f32,
    h0_pitch: f32,
    bx: f32,
    by: f32,
}

impl Quantizer {
    pub(crate) fn new(params: &HashParams) -> Self {
        let ratio = (1.0 - params.alpha as f64) / (1.0 + params.alpha as f64);
        Self {
            log_w0: params.w0.ln(),
            log_h0: params.h0.ln(),
            log_alpha: params.alpha.ln(),
            alpha: params.alpha,
            w0_pitch: (params.w0 as f64 * ratio) as f32,
            h0_pitch: (params.h0 as f64 * ratio) as f32,
            bx: params.bx,
            by: params.by,
        }
    }

    /// Maps one `(x, y, w, h)` box to its bucket.
    pub(crate) fn code(&self, b: [f32; 4]) -> QuantCode {
        let [x, y, w, h] = b;
        let i = round_even((self.log_w0 - w.ln()) / self.log_alpha);
        let j = round_even((self.log_h0 - h.ln()) / self.log_alpha);

        let di = self.w0_pitch / self.alpha.powf(i);
        let dj = self.h0_pitch / self.alpha.powf(j);

        QuantCode {
            qx: to_bin(x / di - self.bx),
            qy: to_bin(y / dj - self.by),
            i: i as i64,
            j: j as i64,
        }
    }
}

/// Quantizes a single `(x, y, w, h)` box.
///
/// `params` is assumed valid; see [`HashParams::validate`].
pub fn quantize(b: [f32; 4], params: &HashParams) -> QuantCode {
    Quantizer::new(params).code(b)
}

/// Quantizes every box in `boxes`, preserving index order.
///
/// With the `rayon` feature and `params.parallel` set, boxes are quantized on
/// the rayon pool; the codes are identical either way.
pub fn hash_boxes(boxes: BoxesView<'_>, params: &HashParams) -> Vec<QuantCode> {
    let quantizer = Quantizer::new(params);
    #[cfg(feature = "rayon")]
    {
        if params.parallel {
            return boxes
                .as_flat()
                .par_chunks_exact(4)
                .map(|row| quantizer.code([row[0], row[1], row[2], row[3]]))
                .collect();
        }
    }
    boxes.iter().map(|b| quantizer.code(b)).collect()
}
