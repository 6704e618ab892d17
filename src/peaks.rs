//! Local maxima detection for seeding multi-peak models.

use ndarray::ArrayView1;

use crate::stats::min2;

/// Find local maxima that stand out from their surroundings by more than `tolerance`.
///
/// A maximum (or the middle of a flat-topped maximum) is kept when its prominence,
/// the drop to the higher of the two lowest points separating it from a higher
/// sample or from the array end, exceeds `tolerance`. Maxima on the array edges
/// are allowed and are measured against their only side. A constant array has no
/// maximum. NaN samples never form a maximum.
///
/// Indices are returned in order of decreasing height; callers that need positional
/// order must sort them.
pub fn find_maxima(y: ArrayView1<f64>, tolerance: f64) -> Vec<usize> {
    let n = y.len();
    let mut maxima = Vec::new();

    let mut start = 0;
    while start < n {
        let value = y[start];
        let mut end = start;
        while end + 1 < n && y[end + 1] == value {
            end += 1;
        }

        let rises = start == 0 || y[start - 1] < value;
        let falls = end == n - 1 || y[end + 1] < value;
        let whole_array = start == 0 && end == n - 1;
        if !value.is_nan() && rises && falls && !whole_array {
            let left = (start > 0).then(|| side_minimum(y, value, (0..start).rev()));
            let right = (end + 1 < n).then(|| side_minimum(y, value, end + 1..n));
            let base = match (left, right) {
                (Some(l), Some(r)) => l.max(r),
                (Some(l), None) => l,
                (None, Some(r)) => r,
                (None, None) => value,
            };
            if value - base > tolerance {
                maxima.push((start + end) / 2);
            }
        }

        start = end + 1;
    }

    maxima.sort_by(|&a, &b| y[b].total_cmp(&y[a]).then(a.cmp(&b)));
    maxima
}

/// Lowest sample met walking away from a maximum before reaching a higher one.
fn side_minimum(y: ArrayView1<f64>, peak: f64, indices: impl Iterator<Item = usize>) -> f64 {
    let mut lowest = peak;
    for k in indices {
        if y[k] > peak {
            break;
        }
        lowest = min2(lowest, y[k]);
    }
    lowest
}
