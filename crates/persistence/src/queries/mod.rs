// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries against the deployment tables.
//!
//! All queries use Diesel DSL; the only raw SQL in this crate lives in
//! the `backend` module.

pub mod dots;
pub mod shifts;

pub use dots::{
    clone_pos_ids, dots_by_ids, dots_by_ids_unscoped, existing_pos_ids, list_event_dots,
    placed_dot_ids,
};
pub use shifts::{
    assignments_for_dots, referenced_shift_ids, shift_defs_for_event, shift_ids_of_dots,
};
