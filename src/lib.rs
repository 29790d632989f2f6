//! hashnms removes duplicate detections from object-detector output.
//!
//! Two algorithms are provided. [`greedy_nms`] is exact greedy non-maximum
//! suppression on inclusive-pixel IoU. [`hashed_nms`] is a linear-time
//! approximation that buckets boxes on an anchor grid and keeps the best box
//! per bucket; [`MultiHashNms`] chains several staggered hashing passes.
//! Optional features: `rayon` (parallel precompute) and `tracing` (spans and
//! events).

pub mod backend;
pub mod geometry;
pub mod greedy;
pub mod hashed;
mod trace;
pub mod util;

pub use backend::{CpuBackend, Device, Dispatcher, SuppressionBackend};
pub use geometry::{inclusive_area, inclusive_iou, BoxesView};
pub use greedy::{greedy_nms, nms, score_order};
pub use hashed::{
    best_per_key, hash_boxes, hashed_nms, hnms, quantize, HashParams, KeyMode, MultiHashNms,
    QuantCode,
};
pub use util::{NmsError, NmsResult};
