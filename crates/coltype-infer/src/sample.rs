//! Deterministic systematic sampling of column values.

/// Every `max(1, n / size)`-th present value, at most `size` of them.
/// `None` keeps them all.
///
/// The same values always yield the same sample.
pub fn sample_values<'a>(present: &[&'a str], size: Option<usize>) -> Vec<&'a str> {
    match size {
        None => present.to_vec(),
        Some(size) => present
            .iter()
            .step_by(stride(present.len(), size))
            .take(size)
            .copied()
            .collect(),
    }
}

/// Every `max(1, n / divisor)`-th present value, without a size limit.
pub fn strided_values<'a>(present: &[&'a str], divisor: usize) -> Vec<&'a str> {
    present
        .iter()
        .step_by(stride(present.len(), divisor))
        .copied()
        .collect()
}

fn stride(len: usize, size: usize) -> usize {
    if size == 0 {
        return 1;
    }
    (len / size).max(1)
}
