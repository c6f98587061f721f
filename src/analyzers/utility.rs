/// Computes the arithmetic mean of a slice of values. Returns `None` for empty input.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Returns the key with the largest value, skipping groups without a value.
///
/// Ties go to the first key in iteration order, so callers pass groups in
/// key order to get the smallest key on a tie.
pub fn argmax<K>(groups: impl IntoIterator<Item = (K, Option<f64>)>) -> Option<K> {
    let mut best: Option<(K, f64)> = None;

    for (key, value) in groups {
        let Some(value) = value else {
            continue;
        };
        if best.as_ref().is_none_or(|(_, top)| value > *top) {
            best = Some((key, value));
        }
    }

    best.map(|(key, _)| key)
}

/// Percentage of `part` in `total`. Returns 0.0 when `total` is zero.
pub fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}
