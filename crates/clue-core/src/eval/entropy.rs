//! Information measures over a partition of candidate solutions.

/// Entropy in bits of the feedback distribution: `Σ (n/total) · log2(total/n)`.
///
/// This is what a guess is expected to reveal; a 1/1 split of two solutions scores
/// 1.0 and a 2/0 split scores 0.0.
pub fn partition_entropy(group_sizes: &[usize]) -> f64 {
    let total: usize = group_sizes.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    group_sizes
        .iter()
        .filter(|n| **n > 0)
        .map(|&n| {
            let p = n as f64 / total;
            p * (total / n as f64).log2()
        })
        .sum()
}

/// Expected bits of uncertainty left after the guess: `Σ (n/total) · log2(n)`.
///
/// Equals `log2(total) - partition_entropy`; minimizing it picks the most
/// informative guess.
pub fn expected_remaining_entropy(group_sizes: &[usize]) -> f64 {
    let total: usize = group_sizes.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    group_sizes
        .iter()
        .filter(|n| **n > 0)
        .map(|&n| (n as f64 / total) * (n as f64).log2())
        .sum()
}
