use crate::plot::data::CandlePoint;

/// Linearly interpolated quantile over an ascending sample, evaluated at
/// index `(n - 1) * q` (the estimator R calls type 7).
pub fn percentile_sorted(sorted: &[f32], q: f32) -> f32 {
    debug_assert!(!sorted.is_empty());
    if sorted.len() == 1 {
        return sorted[0];
    }
    let pos = (sorted.len() - 1) as f32 * q;
    let below = pos.floor() as usize;
    let above = (below + 1).min(sorted.len() - 1);
    let frac = pos - below as f32;
    sorted[below] + (sorted[above] - sorted[below]) * frac
}

/// Reduce a finite sample to its five-number summary at x-coordinate `x`.
///
/// Values beyond 1.5 IQR of the quartiles are outliers; the whiskers stop at
/// the extreme values still inside that fence. Outliers are appended both to
/// the returned point and to the caller's scratch list. An empty sample
/// yields `None`.
pub fn candle_stick(values: &mut [f32], x: f32, outliers: &mut Vec<f32>) -> Option<CandlePoint> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable_by(f32::total_cmp);
    let p25 = percentile_sorted(values, 0.25);
    let p50 = percentile_sorted(values, 0.5);
    let p75 = percentile_sorted(values, 0.75);
    let iqr = p75 - p25;
    let lower_fence = p25 - 1.5 * iqr;
    let upper_fence = p75 + 1.5 * iqr;

    let mut lower_whisker = f32::MAX;
    let mut upper_whisker = f32::MIN;
    let mut point_outliers = Vec::new();
    for &v in values.iter() {
        if v < lower_fence || v > upper_fence {
            point_outliers.push(v);
        } else {
            lower_whisker = lower_whisker.min(v);
            upper_whisker = upper_whisker.max(v);
        }
    }
    outliers.extend_from_slice(&point_outliers);
    Some(CandlePoint::with_attrs(
        x,
        p25,
        p50,
        p75,
        lower_whisker,
        upper_whisker,
        point_outliers,
    ))
}
