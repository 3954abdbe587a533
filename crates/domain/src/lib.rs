// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod aggregate;
mod error;
mod pos_id;
mod shift_window;
mod types;
mod validation;

pub use aggregate::{compute_totals, round_to_cents};
pub use error::DomainError;
pub use pos_id::{CLONE_TAG, CloneSequencer, base_prefix, clone_suffix};
pub use shift_window::{
    ShiftWindow, parse_timezone, project_onto_date, project_times_onto_date, to_naive_date,
};

// Re-export public types
pub use types::{AssignmentFigures, Dot, DotFlags, DotTotals, GeoPoint, PosId};
pub use validation::{
    validate_assignment, validate_pos_id, validate_pos_ids_unique, validate_quantity,
};
