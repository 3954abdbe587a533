// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for the persistence layer.
//!
//! All tests run against isolated in-memory `SQLite` databases. Plans
//! are produced by the real planning engine so the tests exercise the
//! full snapshot → plan → execute path.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::float_cmp)]

mod update_tests;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use dotplan::{Command, UploadRow, UploadShift};
use dotplan_domain::{DotFlags, PosId, ShiftWindow};

use crate::Persistence;

pub const EVENT: i64 = 7;
pub const TZ_NAME: &str = "Europe/London";

pub fn test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to initialize in-memory database")
}

pub fn tz() -> Tz {
    TZ_NAME.parse().expect("Valid timezone")
}

pub fn window(start: &str, end: &str) -> ShiftWindow {
    let start: DateTime<Utc> = start.parse().expect("Valid start timestamp");
    let end: DateTime<Utc> = end.parse().expect("Valid end timestamp");
    ShiftWindow::new(start, end).expect("Valid window")
}

pub fn upload_row(pos_id: &str, vendor_id: i64, shifts: Vec<UploadShift>) -> UploadRow {
    UploadRow {
        pos_id: PosId::new(pos_id),
        vendor_id: Some(vendor_id),
        area_id: Some(1),
        position_id: None,
        position_name_id: None,
        flags: DotFlags::default(),
        shifts,
    }
}

pub fn upload_shift(start: &str, end: &str, rate: f64, staff: i32) -> UploadShift {
    UploadShift {
        window: window(start, end),
        rate,
        staff,
    }
}

/// Plans and executes an upload, returning the new dot ids.
pub fn seed_upload(persistence: &mut Persistence, rows: Vec<UploadRow>) -> Vec<i64> {
    let snapshot = persistence
        .deployment_snapshot(EVENT, TZ_NAME, &[])
        .expect("Failed to build snapshot");
    let plan = dotplan::plan(&snapshot, Command::Upload { rows }).expect("Failed to plan upload");
    persistence
        .execute_plan(EVENT, tz(), &plan)
        .expect("Failed to execute upload")
        .dot_ids
}
