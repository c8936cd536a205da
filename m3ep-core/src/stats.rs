//! Moment and order statistics used to derive tier boundaries.

/// Quantile `q` of ascending `sorted`, interpolating linearly between the
/// two order statistics around position `q * (n - 1)`.
///
/// # Panics
///
/// If `sorted` is empty.
pub fn quantile_linear(sorted: &[f64], q: f64) -> f64 {
    assert!(!sorted.is_empty(), "quantile of an empty sample");
    let last = sorted.len() - 1;
    let position = last as f64 * q;
    let below = position.floor() as usize;
    let above = (below + 1).min(last);
    let fraction = position - position.floor();
    sorted[below] + fraction * (sorted[above] - sorted[below])
}

/// Middle value of ascending `sorted`; the mean of the two middle values
/// when the length is even.
///
/// # Panics
///
/// If `sorted` is empty.
pub fn median(sorted: &[f64]) -> f64 {
    assert!(!sorted.is_empty(), "median of an empty sample");
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Sample standard deviation (divides by `n - 1`). Zero for fewer than two values.
pub fn sample_std(data: &[f64]) -> f64 {
    let n = data.len();
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let mean = data.iter().sum::<f64>() / nf;
    let variance = data.iter().map(|&x| (x - mean) * (x - mean)).sum::<f64>() / (nf - 1.0);
    variance.sqrt()
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Sort a copy of `values` ascending.
pub fn sorted(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = values.into_iter().collect();
    out.sort_by(|a, b| a.total_cmp(b));
    out
}
