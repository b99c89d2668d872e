/// Splits `items` into exactly `group_count` contiguous slices of
/// `ceil(len / group_count)` elements. The last slice takes whatever is left
/// and may be empty (10 items into 6 groups gives sizes 2,2,2,2,2,0).
///
/// A `group_count` of zero is treated as one.
pub fn partition<T>(items: &[T], group_count: usize) -> Vec<&[T]> {
    let groups = group_count.max(1);
    let len = items.len();
    let size = len.div_ceil(groups);

    (0..groups)
        .map(|i| {
            let start = (i * size).min(len);
            let end = if i + 1 == groups {
                len
            } else {
                ((i + 1) * size).min(len)
            };
            &items[start..end]
        })
        .collect()
}
