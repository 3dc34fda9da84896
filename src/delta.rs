//! First-difference transform and its inverse.

use num::traits::{WrappingAdd, WrappingSub};

/// Replace `values` with the first value followed by successive differences.
///
/// Differences wrap on overflow so that [`prefix_sum`] restores any input.
///
/// ```
/// use trajpack::to_deltas;
///
/// assert_eq!(to_deltas(&[100, 102, 101, 101, 150]), [100, 2, -1, 0, 49]);
/// ```
pub fn to_deltas<T: Copy + WrappingSub>(values: &[T]) -> Vec<T> {
    let mut deltas = Vec::with_capacity(values.len());
    if let Some(&first) = values.first() {
        deltas.push(first);
        deltas.extend(values.windows(2).map(|w| w[1].wrapping_sub(&w[0])));
    }
    deltas
}

/// Running sum of `deltas`; the inverse of [`to_deltas`].
pub fn prefix_sum<T: Copy + WrappingAdd>(deltas: &[T]) -> Vec<T> {
    deltas
        .iter()
        .scan(None, |acc: &mut Option<T>, &d| {
            let next = acc.map_or(d, |prev| prev.wrapping_add(&d));
            *acc = Some(next);
            Some(next)
        })
        .collect()
}
