//! Best-score-per-bucket reduction.

use std::collections::BTreeMap;

/// Keeps the highest-scoring index for every distinct key.
///
/// Keys are scanned in index order. A later index replaces the stored one only
/// when its score is strictly greater, so the first-seen index wins ties.
/// Kept indices are returned in ascending key order.
///
/// `keys` and `scores` must have the same length.
pub fn best_per_key<K: Ord + Copy>(keys: &[K], scores: &[f32]) -> Vec<usize> {
    debug_assert_eq!(keys.len(), scores.len());
    let mut best: BTreeMap<K, usize> = BTreeMap::new();
    for (idx, key) in keys.iter().enumerate() {
        best.entry(*key)
            .and_modify(|prev| {
                if scores[*prev] < scores[idx] {
                    *prev = idx;
                }
            })
            .or_insert(idx);
    }
    best.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::best_per_key;

    #[test]
    fn keeps_highest_score_per_key() {
        let keys = [7, 3, 7, 3, 9];
        let scores = [0.2, 0.5, 0.8, 0.4, 0.1];
        assert_eq!(best_per_key(&keys, &scores), vec![1, 2, 4]);
    }

    #[test]
    fn first_seen_wins_ties() {
        let keys = [1, 1, 1];
        let scores = [0.5, 0.5, 0.5];
        assert_eq!(best_per_key(&keys, &scores), vec![0]);
    }

    #[test]
    fn output_follows_key_order_not_index_order() {
        let keys = [30, 10, 20];
        let scores = [1.0, 1.0, 1.0];
        assert_eq!(best_per_key(&keys, &scores), vec![1, 2, 0]);
    }

    #[test]
    fn nan_scores_never_replace() {
        let keys = [4, 4];
        assert_eq!(best_per_key(&keys, &[0.3, f32::NAN]), vec![0]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        let keys: [u8; 0] = [];
        assert!(best_per_key(&keys, &[]).is_empty());
    }
}
