// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Rate and hours aggregation.
//!
//! A dot's `total_rate`, `avg_rate`, and `total_shift_hours` are derived
//! from its assignments and must never be stale relative to them. The
//! aggregator is a pure function over the assignment figures that survive
//! a mutation (assignments marked for deletion are excluded by the caller)
//! plus the explicit window set remaining after the mutation, so bulk
//! operations can compute one result and reuse it across many dots.

use std::collections::HashSet;

use crate::shift_window::ShiftWindow;
use crate::types::{AssignmentFigures, DotTotals};

/// Rounds a currency value to two decimal places.
#[must_use]
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Computes a dot's derived totals from its surviving assignments and
/// shift windows.
///
/// - `total_rate` is Σ(rate × staff).
/// - `avg_rate` is `total_rate` divided by total staff, rounded to two
///   decimals; zero total staff yields 0, never NaN.
/// - `total_shift_hours` sums the lengths of the *distinct* windows in
///   `windows`; duplicates are counted once.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compute_totals(figures: &[AssignmentFigures], windows: &[ShiftWindow]) -> DotTotals {
    let total_rate: f64 = figures.iter().map(|f| f.rate * f64::from(f.staff)).sum();
    let total_staff: i64 = figures.iter().map(|f| i64::from(f.staff)).sum();

    let avg_rate = if total_staff == 0 {
        0.0
    } else {
        round_to_cents(total_rate / total_staff as f64)
    };

    let mut seen: HashSet<ShiftWindow> = HashSet::new();
    let total_shift_hours: f64 = windows
        .iter()
        .filter(|w| seen.insert(**w))
        .map(ShiftWindow::duration_hours)
        .sum();

    DotTotals {
        total_rate: round_to_cents(total_rate),
        avg_rate,
        total_shift_hours,
    }
}
