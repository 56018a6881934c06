//! Assignment of work to worker partitions.

use common::ShuffleGroup;

/// Deal `items` round-robin into `buckets` partitions: item `i` goes to
/// partition `i % buckets`, and each partition keeps input order.
pub fn round_robin<T>(items: Vec<T>, buckets: usize) -> Vec<Vec<T>> {
    let mut dist: Vec<Vec<T>> = (0..buckets).map(|_| Vec::new()).collect();
    if buckets == 0 {
        return dist;
    }

    for (i, item) in items.into_iter().enumerate() {
        dist[i % buckets].push(item);
    }
    dist
}

/// Split a shuffle group into reducer partitions. Keys are dealt round-robin
/// in ascending order, so each key lands in exactly one partition.
pub fn distribute(group: ShuffleGroup, buckets: usize) -> Vec<ShuffleGroup> {
    round_robin(group.into_iter().collect(), buckets)
        .into_iter()
        .map(|entries| entries.into_iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_robin_is_index_mod_n() {
        for len in 0..12 {
            for n in 1..5 {
                let dist = round_robin((0..len).collect::<Vec<usize>>(), n);
                assert_eq!(dist.len(), n);

                let mut seen = Vec::new();
                for (bucket, items) in dist.iter().enumerate() {
                    assert!(items.windows(2).all(|w| w[0] < w[1]));
                    for &i in items {
                        assert_eq!(i % n, bucket);
                        seen.push(i);
                    }
                }
                seen.sort_unstable();
                assert_eq!(seen, (0..len).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn test_more_buckets_than_items() {
        let dist = round_robin(vec!["a"], 3);
        assert_eq!(dist, vec![vec!["a"], vec![], vec![]]);
    }

    #[test]
    fn test_distribute_deals_sorted_keys() {
        let group = ShuffleGroup::from([
            ("sat".to_string(), vec![1]),
            ("cat".to_string(), vec![1, 1]),
            ("the".to_string(), vec![2, 1]),
            ("mat".to_string(), vec![1]),
            ("on".to_string(), vec![1]),
        ]);

        let parts = distribute(group, 2);
        let keys = |p: &ShuffleGroup| p.keys().cloned().collect::<Vec<_>>();

        // Sorted: cat, mat, on, sat, the.
        assert_eq!(keys(&parts[0]), vec!["cat", "on", "the"]);
        assert_eq!(keys(&parts[1]), vec!["mat", "sat"]);
        assert_eq!(parts[0]["the"], vec![2, 1]);
    }
}
