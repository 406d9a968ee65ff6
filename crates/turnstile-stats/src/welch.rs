//! Welch's graphical warm-up detection.

/// Estimates the warm-up truncation index from replicated output series.
///
/// Procedure: each replication's series is smoothed with a centered-start
/// moving average of `window` points, the smoothed series are averaged
/// across replications, and the reported index is where the variance of a
/// `window`-long sliding window over that averaged series is minimal,
/// the point where the transient has flattened out.
///
/// Series longer than the shortest replication are truncated to the
/// common length. Returns `None` when there are no replications or the
/// common length cannot fit a single window.
pub fn welch_warmup_index(replications: &[Vec<f64>], window: usize) -> Option<usize> {
    let window = window.max(1);
    let length = replications.iter().map(Vec::len).min()?;
    if length == 0 || replications.is_empty() {
        return None;
    }

    // Per-replication moving average over the trailing `window` points.
    let smoothed: Vec<Vec<f64>> = replications
        .iter()
        .map(|series| {
            (0..length)
                .map(|i| {
                    let start = i.saturating_sub(window - 1);
                    let slice = &series[start..=i];
                    slice.iter().sum::<f64>() / slice.len() as f64
                })
                .collect()
        })
        .collect();

    // Cross-replication average at each index.
    let averaged: Vec<f64> = (0..length)
        .map(|i| smoothed.iter().map(|s| s[i]).sum::<f64>() / smoothed.len() as f64)
        .collect();

    if averaged.len() < window {
        return None;
    }

    // Sliding-window variance; the flattest window marks the warm-up end.
    let mut best_index = 0;
    let mut best_variance = f64::INFINITY;
    for start in 0..=(averaged.len() - window) {
        let slice = &averaged[start..start + window];
        let mean = slice.iter().sum::<f64>() / window as f64;
        let variance = slice.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / window as f64;
        if variance < best_variance {
            best_variance = variance;
            best_index = start;
        }
    }
    Some(best_index)
}

// ============================================================================
// Tests
// ============================================================================
