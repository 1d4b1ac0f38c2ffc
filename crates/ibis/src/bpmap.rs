//! Proportional span allocation along one axis.
//!
//! Every category receives a slot of at least `min` thickness plus `pad` on both sides. Categories
//! whose proportional share would fall below `min` are "floored" to exactly `min`; the remaining
//! range is distributed among the rest in proportion to their values.

use serde::{Deserialize, Serialize};

/// Totals below this are treated as zero (no meaningful proportions).
pub const NEGLIGIBLE_TOTAL: f64 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: f64,
    pub end: f64,
    /// Share of the group total (`0` when the total is negligible).
    pub percent: f64,
}

impl Span {
    pub fn thickness(&self) -> f64 {
        self.end - self.start
    }

    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// Allocates one span per value over `[range_start, range_end]`, in input order.
///
/// With enough room (`range - 2·n·pad >= n·min`) the slots tile the range exactly and every span
/// is at least `min` thick. A group whose total is negligible gets a scale factor of zero, so all
/// of its spans are exactly `min` thick.
pub fn bpmap(values: &[f64], pad: f64, min: f64, range_start: f64, range_end: f64) -> Vec<Span> {
    if values.is_empty() {
        return Vec::new();
    }

    let available = range_end - range_start - 2.0 * values.len() as f64 * pad;
    let total: f64 = values.iter().sum();
    let scale = scale_factor(values, total, available, min);

    let mut cursor = range_start;
    values
        .iter()
        .map(|&value| {
            let thickness = (value * scale).max(min);
            let start = cursor + pad;
            cursor += 2.0 * pad + thickness;
            Span {
                start,
                end: start + thickness,
                percent: if total < NEGLIGIBLE_TOTAL {
                    0.0
                } else {
                    value / total
                },
            }
        })
        .collect()
}

/// Scale applied to the values of non-floored categories.
///
/// The first partition uses the cut-off ratio `min / available`. A category just above that
/// cut-off can still scale below `min` once the floored ones have taken their share, so the
/// partition is repeated until no scaled category falls below `min`. The factor only shrinks
/// between rounds, so previously floored categories stay below `min`.
fn scale_factor(values: &[f64], total: f64, available: f64, min: f64) -> f64 {
    if total < NEGLIGIBLE_TOTAL {
        return 0.0;
    }

    let ratio = if available > 0.0 {
        min / available
    } else {
        f64::INFINITY
    };
    let mut floored: Vec<bool> = values.iter().map(|&v| v < ratio * total).collect();

    loop {
        let mut floor_count = 0usize;
        let mut floor_sum = 0.0;
        for (v, is_floored) in values.iter().zip(&floored) {
            if *is_floored {
                floor_count += 1;
                floor_sum += v;
            }
        }

        let rest = total - floor_sum;
        if rest < NEGLIGIBLE_TOTAL {
            return 0.0;
        }
        let scale = (available - floor_count as f64 * min) / rest;
        if scale <= 0.0 {
            return 0.0;
        }

        let mut changed = false;
        for (v, is_floored) in values.iter().zip(floored.iter_mut()) {
            if !*is_floored && v * scale < min {
                *is_floored = true;
                changed = true;
            }
        }
        if !changed {
            return scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn proportional_without_floor() {
        let spans = bpmap(&[1.0, 3.0], 0.0, 0.0, 0.0, 100.0);
        assert_close(spans[0].start, 0.0);
        assert_close(spans[0].end, 25.0);
        assert_close(spans[1].start, 25.0);
        assert_close(spans[1].end, 100.0);
        assert_close(spans[0].percent, 0.25);
        assert_close(spans[1].percent, 0.75);
    }

    #[test]
    fn padding_is_applied_on_both_sides() {
        let spans = bpmap(&[1.0, 1.0], 2.0, 0.0, 0.0, 100.0);
        assert_close(spans[0].start, 2.0);
        assert_close(spans[0].end, 48.0);
        assert_close(spans[1].start, 52.0);
        assert_close(spans[1].end, 98.0);
    }

    #[test]
    fn small_values_are_floored_to_min() {
        let spans = bpmap(&[1.0, 1.0, 100.0], 0.0, 2.0, 0.0, 10.0);
        assert_close(spans[0].thickness(), 2.0);
        assert_close(spans[1].thickness(), 2.0);
        assert_close(spans[2].thickness(), 6.0);
    }

    #[test]
    fn second_round_floors_categories_pushed_below_min() {
        // 3 is above the first cut-off (0.25 * 10) but 3 * 1.2 < 4 once `0` is floored.
        let spans = bpmap(&[0.0, 3.0, 7.0], 0.0, 4.0, 0.0, 16.0);
        assert_close(spans[0].thickness(), 4.0);
        assert_close(spans[1].thickness(), 4.0);
        assert_close(spans[2].thickness(), 8.0);
        assert_close(spans[2].end, 16.0);
    }

    #[test]
    fn negligible_total_yields_min_slots() {
        let spans = bpmap(&[0.0, 0.0], 1.0, 3.0, 0.0, 100.0);
        assert_close(spans[0].thickness(), 3.0);
        assert_close(spans[1].start, 1.0 + 3.0 + 1.0 + 1.0);
        assert_close(spans[1].thickness(), 3.0);
        assert_close(spans[0].percent, 0.0);
    }

    #[test]
    fn empty_input() {
        assert!(bpmap(&[], 1.0, 1.0, 0.0, 10.0).is_empty());
    }
}
