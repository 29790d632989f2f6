//! Exact greedy non-maximum suppression.
//!
//! Boxes are visited in descending score order. Each surviving box suppresses
//! every lower-ranked, still-live box whose inclusive IoU with it reaches the
//! threshold. Survivors are reported in ascending original index order.

use crate::geometry::{check_scores, inclusive_area, inclusive_iou, BoxesView};
use crate::trace::{trace_event, trace_span};
use crate::util::NmsResult;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Box count above which areas are computed on the rayon pool.
#[cfg(feature = "rayon")]
const PAR_AREA_MIN_LEN: usize = 4096;

/// Returns indices ordered by descending score.
///
/// The sort is stable, so equal scores keep their input order. Scores are
/// compared with `f32::total_cmp`; NaN scores get a fixed position instead of
/// poisoning the comparison.
pub fn score_order(scores: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    order
}

#[cfg(not(feature = "rayon"))]
fn areas(boxes: &BoxesView<'_>) -> Vec<f32> {
    boxes.iter().map(inclusive_area).collect()
}

#[cfg(feature = "rayon")]
fn areas(boxes: &BoxesView<'_>) -> Vec<f32> {
    if boxes.len() < PAR_AREA_MIN_LEN {
        return boxes.iter().map(inclusive_area).collect();
    }
    boxes
        .as_flat()
        .par_chunks_exact(4)
        .map(|row| inclusive_area([row[0], row[1], row[2], row[3]]))
        .collect()
}

/// Greedy NMS over corner-form boxes `(x1, y1, x2, y2)`.
///
/// Returns the indices of kept boxes in ascending order. A lower-ranked box is
/// suppressed when its IoU with a kept box is `>= iou_threshold`.
pub fn greedy_nms(
    boxes: BoxesView<'_>,
    scores: &[f32],
    iou_threshold: f32,
) -> NmsResult<Vec<usize>> {
    check_scores(&boxes, scores)?;
    let n = boxes.len();
    if n == 0 {
        return Ok(Vec::new());
    }

    let _span = trace_span!("greedy_nms", n = n, iou_threshold = iou_threshold).entered();

    let rows: Vec<[f32; 4]> = boxes.iter().collect();
    let areas = areas(&boxes);
    let order = score_order(scores);
    let mut suppressed = vec![false; n];

    for (rank, &i) in order.iter().enumerate() {
        if suppressed[i] {
            continue;
        }
        let bi = rows[i];
        let area_i = areas[i];
        for &j in &order[rank + 1..] {
            if suppressed[j] {
                continue;
            }
            if inclusive_iou(bi, area_i, rows[j], areas[j]) >= iou_threshold {
                suppressed[j] = true;
            }
        }
    }

    let keep: Vec<usize> = suppressed
        .iter()
        .enumerate()
        .filter_map(|(idx, &s)| (!s).then_some(idx))
        .collect();
    trace_event!("greedy_nms_done", kept = keep.len(), suppressed = n - keep.len());
    Ok(keep)
}

/// Greedy NMS over a flat `N x 4` coordinate buffer.
///
/// Fails with `MalformedBoxes` or `LengthMismatch` before doing any work.
pub fn nms(boxes: &[f32], scores: &[f32], iou_threshold: f32) -> NmsResult<Vec<usize>> {
    greedy_nms(BoxesView::from_flat(boxes)?, scores, iou_threshold)
}

#[cfg(test)]
mod tests {
    use super::{nms, score_order};

    #[test]
    fn score_order_is_stable_on_ties() {
        let order = score_order(&[0.5, 0.9, 0.5, 0.9, 0.1]);
        assert_eq!(order, vec![1, 3, 0, 2, 4]);
    }

    #[test]
    fn score_order_tolerates_nan() {
        let order = score_order(&[0.2, f32::NAN, 0.8]);
        assert_eq!(order.len(), 3);
        assert_eq!(order, score_order(&[0.2, f32::NAN, 0.8]));
    }

    #[test]
    fn suppressed_box_does_not_suppress_others() {
        // B overlaps A and C, but A and C barely overlap. Once A removes B,
        // B must not remove C.
        let boxes = [
            0.0, 0.0, 9.0, 9.0, // A
            3.0, 0.0, 12.0, 9.0, // B
            6.0, 0.0, 15.0, 9.0, // C
        ];
        let keep = nms(&boxes, &[0.9, 0.8, 0.7], 0.5).unwrap();
        assert_eq!(keep, vec![0, 2]);
    }

    #[test]
    fn result_is_ascending_regardless_of_scores() {
        let boxes = [
            0.0, 0.0, 5.0, 5.0, //
            50.0, 50.0, 55.0, 55.0, //
            100.0, 100.0, 105.0, 105.0,
        ];
        let keep = nms(&boxes, &[0.1, 0.9, 0.5], 0.3).unwrap();
        assert_eq!(keep, vec![0, 1, 2]);
    }
}
