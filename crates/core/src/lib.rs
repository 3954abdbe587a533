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

mod command;
mod error;
mod plan;
mod state;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use command::{Command, FieldChanges, Reschedule, ShiftTemplate, UploadRow, UploadShift};
pub use error::CoreError;
pub use plan::plan;
pub use state::{
    AssignmentInsert, DeploymentSnapshot, DotUpdate, ExistingAssignment, ExistingShift,
    MutationPlan, PlannedAssignment, PlannedDot, ShiftRef, SourceDot, StaffIncrement,
    VendorReassign,
};
