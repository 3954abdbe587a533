// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::{DateTime, Utc};
use dotplan_domain::{Dot, DotFlags, PosId, ShiftWindow};

use crate::state::{DeploymentSnapshot, ExistingAssignment, ExistingShift, SourceDot};

pub const EVENT_ID: i64 = 7;

pub fn window(start: &str, end: &str) -> ShiftWindow {
    let start: DateTime<Utc> = start.parse().expect("valid start timestamp");
    let end: DateTime<Utc> = end.parse().expect("valid end timestamp");
    ShiftWindow::new(start, end).expect("valid window")
}

pub fn date(year: i32, month: time::Month, day: u8) -> time::Date {
    time::Date::from_calendar_date(year, month, day).expect("valid date")
}

pub fn snapshot() -> DeploymentSnapshot {
    DeploymentSnapshot::new(EVENT_ID, String::from("UTC"))
}

pub fn existing_shift(shift_id: i64, start: &str, end: &str) -> ExistingShift {
    ExistingShift {
        shift_id,
        window: window(start, end),
    }
}

pub fn source_dot(
    dot_id: i64,
    pos_id: &str,
    assignments: Vec<ExistingAssignment>,
) -> SourceDot {
    let mut dot = Dot::new(EVENT_ID, PosId::new(pos_id));
    dot.dot_id = Some(dot_id);
    dot.vendor_id = Some(1);
    dot.flags = DotFlags {
        placed: true,
        ..DotFlags::default()
    };
    SourceDot { dot, assignments }
}

pub fn assignment(
    dot_id: i64,
    shift: ExistingShift,
    rate: f64,
    staff: i32,
) -> ExistingAssignment {
    ExistingAssignment {
        dot_id,
        shift_id: shift.shift_id,
        window: shift.window,
        rate,
        staff,
    }
}
