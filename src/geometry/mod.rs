//! Box buffers and inclusive-pixel overlap geometry.
//!
//! `BoxesView` is a borrowed view over `N` boxes stored as a flat row-major
//! buffer of `4 * N` coordinates. The four values of a row are interpreted by
//! the algorithm consuming the view: greedy NMS reads corners
//! `(x1, y1, x2, y2)`, hashed NMS reads `(x, y, w, h)`. The view never
//! reinterprets one layout as the other.

use crate::util::{NmsError, NmsResult};

mod overlap;

pub use overlap::{inclusive_area, inclusive_iou};

/// Borrowed view over a set of 4-coordinate boxes.
#[derive(Copy, Clone, Debug)]
pub struct BoxesView<'a> {
    data: &'a [f32],
}

impl<'a> BoxesView<'a> {
    /// Creates a view over a flat `N x 4` row-major buffer.
    pub fn from_flat(data: &'a [f32]) -> NmsResult<Self> {
        if data.len() % 4 != 0 {
            return Err(NmsError::MalformedBoxes { len: data.len() });
        }
        Ok(Self { data })
    }

    /// Creates a view over rows of four coordinates.
    pub fn from_rows(rows: &'a [[f32; 4]]) -> Self {
        Self {
            data: rows.as_flattened(),
        }
    }

    /// Returns the number of boxes.
    pub fn len(&self) -> usize {
        self.data.len() / 4
    }

    /// Returns true when the view holds no boxes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the backing flat buffer.
    pub fn as_flat(&self) -> &'a [f32] {
        self.data
    }

    /// Returns box `index` if it is within bounds.
    pub fn get(&self, index: usize) -> Option<[f32; 4]> {
        let start = index.checked_mul(4)?;
        let row = self.data.get(start..start.checked_add(4)?)?;
        Some([row[0], row[1], row[2], row[3]])
    }

    /// Iterates over the boxes in index order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = [f32; 4]> + 'a {
        self.data
            .chunks_exact(4)
            .map(|row| [row[0], row[1], row[2], row[3]])
    }

    /// Copies the boxes named by `indices`, in the order given.
    pub fn gather(&self, indices: &[usize]) -> NmsResult<Vec<[f32; 4]>> {
        indices
            .iter()
            .map(|&index| {
                self.get(index).ok_or(NmsError::IndexOutOfBounds {
                    index,
                    len: self.len(),
                })
            })
            .collect()
    }
}

/// Checks that every box has exactly one score.
pub(crate) fn check_scores(boxes: &BoxesView<'_>, scores: &[f32]) -> NmsResult<()> {
    if boxes.len() != scores.len() {
        return Err(NmsError::LengthMismatch {
            boxes: boxes.len(),
            scores: scores.len(),
        });
    }
    Ok(())
}
