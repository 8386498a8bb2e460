//! Splitting identifier lists into write-sized batches

/// Separator between identifiers inside one batch
pub const BATCH_SEPARATOR: &str = ",";

/// Split `items` into consecutive groups of at most `max_size`, each joined with commas
///
/// Order is preserved. An empty input gives no groups, and a `max_size` of
/// zero is treated as one.
///
/// ```
/// use playlist_bridge::chunk::chunk;
///
/// assert_eq!(chunk(&["a", "b", "c"], 2), vec!["a,b", "c"]);
/// assert!(chunk::<&str>(&[], 50).is_empty());
/// ```
pub fn chunk<S: AsRef<str>>(items: &[S], max_size: usize) -> Vec<String> {
    items
        .chunks(max_size.max(1))
        .map(|group| {
            group
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join(BATCH_SEPARATOR)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("spotify:track:{i}")).collect()
    }

    #[test]
    fn reference_cases() {
        assert!(chunk::<&str>(&[], 50).is_empty());
        assert_eq!(chunk(&["a"], 50), vec!["a"]);
        assert_eq!(chunk(&["a", "b", "c"], 2), vec!["a,b", "c"]);
    }

    #[test]
    fn exact_multiple_has_no_trailing_group() {
        let groups = chunk(&ids(100), 50);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.split(',').count() == 50));
    }

    #[test]
    fn group_count_and_sizes_match_ceiling_division() {
        for len in 0..=23 {
            for max_size in 1..=7 {
                let items = ids(len);
                let groups = chunk(&items, max_size);

                assert_eq!(groups.len(), len.div_ceil(max_size), "len={len} max={max_size}");
                for (i, group) in groups.iter().enumerate() {
                    let size = group.split(',').count();
                    assert!(size <= max_size);
                    if i + 1 < groups.len() {
                        assert_eq!(size, max_size, "only the last group may be short");
                    }
                }

                let rejoined: Vec<String> = groups
                    .iter()
                    .flat_map(|g| g.split(',').map(str::to_string))
                    .collect();
                assert_eq!(rejoined, items);
            }
        }
    }

    #[test]
    fn zero_max_size_behaves_like_one() {
        assert_eq!(chunk(&["a", "b"], 0), vec!["a", "b"]);
    }
}
