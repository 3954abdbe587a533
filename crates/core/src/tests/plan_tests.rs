// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use dotplan_domain::{DomainError, DotFlags, PosId};

use crate::command::{Command, FieldChanges, Reschedule, ShiftTemplate, UploadRow, UploadShift};
use crate::error::CoreError;
use crate::plan::plan;
use crate::state::ShiftRef;
use crate::tests::helpers::{
    EVENT_ID, assignment, date, existing_shift, snapshot, source_dot, window,
};

fn upload_row(pos_id: &str, shifts: Vec<UploadShift>) -> UploadRow {
    UploadRow {
        pos_id: PosId::new(pos_id),
        vendor_id: Some(1),
        area_id: Some(2),
        position_id: None,
        position_name_id: None,
        flags: DotFlags::default(),
        shifts,
    }
}

fn shift(start: &str, end: &str, rate: f64, staff: i32) -> UploadShift {
    UploadShift {
        window: window(start, end),
        rate,
        staff,
    }
}

// ============================================================================
// Upload
// ============================================================================

#[test]
fn test_upload_shares_window_across_rows_and_creates_it_once() {
    let rows = vec![
        upload_row(
            "GATE-01",
            vec![shift("2024-08-22T07:00:00Z", "2024-08-22T15:00:00Z", 60.0, 1)],
        ),
        upload_row(
            "GATE-02",
            vec![shift("2024-08-22T07:00:00Z", "2024-08-22T15:00:00Z", 45.0, 2)],
        ),
    ];

    let result = plan(&snapshot(), Command::Upload { rows }).unwrap();

    assert_eq!(result.shifts_to_create.len(), 1);
    assert_eq!(result.new_dots.len(), 2);
    assert_eq!(result.new_dots[0].dot.event_id, EVENT_ID);
}

#[test]
fn test_upload_reuses_existing_definition() {
    let mut snap = snapshot();
    snap.shifts
        .push(existing_shift(11, "2024-08-22T07:00:00Z", "2024-08-22T15:00:00Z"));

    let rows = vec![upload_row(
        "GATE-01",
        vec![shift("2024-08-22T07:00:00Z", "2024-08-22T15:00:00Z", 60.0, 1)],
    )];

    let result = plan(&snap, Command::Upload { rows }).unwrap();

    assert!(result.shifts_to_create.is_empty());
    assert_eq!(
        result.new_dots[0].assignments[0].shift,
        ShiftRef::Existing(11)
    );
}

#[test]
fn test_upload_accumulates_repeated_window_rate_demands() {
    let rows = vec![upload_row(
        "GATE-01",
        vec![
            shift("2024-08-22T07:00:00Z", "2024-08-22T15:00:00Z", 60.0, 1),
            shift("2024-08-22T07:00:00Z", "2024-08-22T15:00:00Z", 60.0, 2),
        ],
    )];

    let result = plan(&snapshot(), Command::Upload { rows }).unwrap();

    let planned = &result.new_dots[0];
    assert_eq!(planned.assignments.len(), 1);
    assert_eq!(planned.assignments[0].staff, 3);
    assert_eq!(planned.dot.totals.total_rate, 180.0);
    assert_eq!(planned.dot.totals.avg_rate, 60.0);
    assert_eq!(planned.dot.totals.total_shift_hours, 8.0);
}

#[test]
fn test_upload_rejects_duplicate_pos_ids_in_batch() {
    let rows = vec![
        upload_row("GATE-01", Vec::new()),
        upload_row("GATE-01", Vec::new()),
    ];

    let result = plan(&snapshot(), Command::Upload { rows });

    assert_eq!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::DuplicatePosId {
            pos_id: String::from("GATE-01")
        })
    );
}

// ============================================================================
// Clone
// ============================================================================

#[test]
fn test_clone_produces_quantity_copies_per_source() {
    let s1 = existing_shift(11, "2024-08-22T07:00:00Z", "2024-08-22T15:00:00Z");
    let mut snap = snapshot();
    snap.source_dots = vec![
        source_dot(1, "GATE-01", vec![assignment(1, s1, 60.0, 1)]),
        source_dot(2, "GATE-02", vec![assignment(2, s1, 45.0, 2)]),
    ];

    let result = plan(
        &snap,
        Command::Clone {
            dot_ids: vec![1, 2],
            quantity: 3,
        },
    )
    .unwrap();

    assert_eq!(result.new_dots.len(), 6);
    // Each copy carries its source's assignments verbatim.
    for planned in &result.new_dots[..3] {
        assert_eq!(planned.assignments.len(), 1);
        assert_eq!(planned.assignments[0].shift, ShiftRef::Existing(11));
        assert_eq!(planned.assignments[0].staff, 1);
        assert!(!planned.dot.flags.placed);
        assert_eq!(planned.dot.location, None);
    }
    assert_eq!(result.new_dots[0].dot.pos_id.value(), "GATE-01-CL-001");
    assert_eq!(result.new_dots[2].dot.pos_id.value(), "GATE-01-CL-003");
    assert_eq!(result.new_dots[3].dot.pos_id.value(), "GATE-02-CL-001");
}

#[test]
fn test_clone_sources_sharing_a_prefix_never_overlap() {
    // Both sources are prior clones of GATE-01; their generated ranges
    // must continue one shared sequence.
    let mut snap = snapshot();
    snap.source_dots = vec![
        source_dot(1, "GATE-01-CL-001", Vec::new()),
        source_dot(2, "GATE-01-CL-002", Vec::new()),
    ];
    snap.clone_pos_ids = vec![
        String::from("GATE-01-CL-001"),
        String::from("GATE-01-CL-002"),
    ];

    let result = plan(
        &snap,
        Command::Clone {
            dot_ids: vec![1, 2],
            quantity: 2,
        },
    )
    .unwrap();

    let ids: Vec<&str> = result
        .new_dots
        .iter()
        .map(|p| p.dot.pos_id.value())
        .collect();
    assert_eq!(
        ids,
        vec![
            "GATE-01-CL-003",
            "GATE-01-CL-004",
            "GATE-01-CL-005",
            "GATE-01-CL-006",
        ]
    );
}

#[test]
fn test_clone_rejects_zero_quantity() {
    let result = plan(
        &snapshot(),
        Command::Clone {
            dot_ids: Vec::new(),
            quantity: 0,
        },
    );
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::InvalidQuantity {
            quantity: 0
        }))
    ));
}

#[test]
fn test_clone_requires_every_source_in_snapshot() {
    let result = plan(
        &snapshot(),
        Command::Clone {
            dot_ids: vec![99],
            quantity: 1,
        },
    );
    assert!(matches!(result, Err(CoreError::Internal(_))));
}

// ============================================================================
// Copy
// ============================================================================

#[test]
fn test_copy_projects_onto_each_date_and_creates_missing_definitions() {
    let s1 = existing_shift(11, "2024-08-01T07:00:00Z", "2024-08-01T15:00:00Z");
    let mut snap = snapshot();
    snap.shifts = vec![s1];
    snap.source_dots = vec![source_dot(1, "GATE-01", vec![assignment(1, s1, 60.0, 1)])];

    let result = plan(
        &snap,
        Command::Copy {
            dot_ids: vec![1],
            dates: vec![
                date(2024, time::Month::August, 22),
                date(2024, time::Month::August, 23),
            ],
        },
    )
    .unwrap();

    assert_eq!(result.shifts_to_create.len(), 2);
    assert_eq!(result.assignment_inserts.len(), 2);
    assert!(result.staff_increments.is_empty());

    // Totals reflect the merged post-state: 1 existing + 2 new assignments.
    let totals = result.dot_updates[0].totals.unwrap();
    assert_eq!(totals.total_rate, 180.0);
    assert_eq!(totals.avg_rate, 60.0);
    assert_eq!(totals.total_shift_hours, 24.0);
}

#[test]
fn test_copy_requested_twice_increments_staff_instead_of_duplicating() {
    // Second request: the projected windows and their assignments already
    // exist, so the plan contains increments only.
    let s1 = existing_shift(11, "2024-08-01T07:00:00Z", "2024-08-01T15:00:00Z");
    let s22 = existing_shift(21, "2024-08-22T07:00:00Z", "2024-08-22T15:00:00Z");
    let s23 = existing_shift(22, "2024-08-23T07:00:00Z", "2024-08-23T15:00:00Z");
    let mut snap = snapshot();
    snap.shifts = vec![s1, s22, s23];
    snap.source_dots = vec![source_dot(
        1,
        "GATE-01",
        vec![
            assignment(1, s1, 60.0, 1),
            assignment(1, s22, 60.0, 1),
            assignment(1, s23, 60.0, 1),
        ],
    )];

    let result = plan(
        &snap,
        Command::Copy {
            dot_ids: vec![1],
            dates: vec![
                date(2024, time::Month::August, 22),
                date(2024, time::Month::August, 23),
            ],
        },
    )
    .unwrap();

    assert!(result.shifts_to_create.is_empty());
    assert!(result.assignment_inserts.is_empty());
    // Three source windows each project onto both dates; after per-dot
    // dedup the 22nd and 23rd windows receive increments once per
    // surviving candidate.
    assert!(!result.staff_increments.is_empty());
    for increment in &result.staff_increments {
        assert_eq!(increment.dot_id, 1);
        assert_eq!(increment.staff, 1);
    }
}

#[test]
fn test_copy_deduplicates_candidates_per_dot() {
    // Two assignments on the same window (different rates) collapse to a
    // single candidate per target date; the first occurrence wins.
    let s1 = existing_shift(11, "2024-08-01T07:00:00Z", "2024-08-01T15:00:00Z");
    let mut snap = snapshot();
    snap.shifts = vec![s1];
    snap.source_dots = vec![source_dot(
        1,
        "GATE-01",
        vec![assignment(1, s1, 60.0, 1), assignment(1, s1, 45.0, 2)],
    )];

    let result = plan(
        &snap,
        Command::Copy {
            dot_ids: vec![1],
            dates: vec![date(2024, time::Month::August, 22)],
        },
    )
    .unwrap();

    assert_eq!(result.shifts_to_create.len(), 1);
    assert_eq!(result.assignment_inserts.len(), 1);
    assert_eq!(result.assignment_inserts[0].rate, 60.0);
}

// ============================================================================
// Swap
// ============================================================================

#[test]
fn test_swap_reassigns_replaced_vendor_to_uploaded_vendor() {
    let mut row = upload_row(
        "GATE-10",
        vec![shift("2024-08-22T07:00:00Z", "2024-08-22T15:00:00Z", 50.0, 1)],
    );
    row.vendor_id = Some(9);

    let result = plan(
        &snapshot(),
        Command::Swap {
            replace_vendor_id: 4,
            rows: vec![row],
        },
    )
    .unwrap();

    let reassign = result.vendor_reassign.unwrap();
    assert_eq!(reassign.from_vendor_id, 4);
    assert_eq!(reassign.to_vendor_id, 9);
    assert_eq!(result.new_dots.len(), 1);
}

#[test]
fn test_swap_rejects_mixed_vendor_rows() {
    let mut first = upload_row("GATE-10", Vec::new());
    first.vendor_id = Some(9);
    let mut second = upload_row("GATE-11", Vec::new());
    second.vendor_id = Some(10);

    let result = plan(
        &snapshot(),
        Command::Swap {
            replace_vendor_id: 4,
            rows: vec![first, second],
        },
    );

    assert_eq!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::MixedVendorUpload)
    );
}

// ============================================================================
// Bulk update
// ============================================================================

#[test]
fn test_bulk_update_with_reschedule_shares_totals_across_dots() {
    let mut snap = snapshot();
    snap.source_dots = vec![
        source_dot(1, "GATE-01", Vec::new()),
        source_dot(2, "GATE-02", Vec::new()),
    ];

    let reschedule = Reschedule {
        templates: vec![
            ShiftTemplate {
                start_time: chrono::NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
                end_time: chrono::NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
                rate: 60.0,
                staff: 1,
            },
            ShiftTemplate {
                start_time: chrono::NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
                end_time: chrono::NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
                rate: 60.0,
                staff: 1,
            },
        ],
        dates: vec![date(2024, time::Month::August, 22)],
    };

    let result = plan(
        &snap,
        Command::BulkUpdate {
            dot_ids: vec![1, 2],
            changes: FieldChanges::default(),
            reschedule: Some(reschedule),
        },
    )
    .unwrap();

    assert_eq!(result.clear_assignments_of, vec![1, 2]);
    assert_eq!(result.shifts_to_create.len(), 2);
    // Two windows for each of the two dots.
    assert_eq!(result.assignment_inserts.len(), 4);

    let totals = result.shared_totals().unwrap();
    assert_eq!(totals.total_rate, 120.0);
    assert_eq!(totals.avg_rate, 60.0);
    assert_eq!(totals.total_shift_hours, 16.0);
}

#[test]
fn test_bulk_update_without_dates_only_changes_fields() {
    let result = plan(
        &snapshot(),
        Command::BulkUpdate {
            dot_ids: vec![1, 2],
            changes: FieldChanges {
                vendor_id: Some(5),
                ..FieldChanges::default()
            },
            reschedule: None,
        },
    )
    .unwrap();

    assert!(result.shifts_to_create.is_empty());
    assert!(result.assignment_inserts.is_empty());
    assert!(result.clear_assignments_of.is_empty());
    assert_eq!(result.dot_updates.len(), 2);
    assert_eq!(result.dot_updates[0].changes.vendor_id, Some(5));
    assert_eq!(result.dot_updates[0].totals, None);
}

#[test]
fn test_bulk_update_deduplicates_shared_windows_first_wins() {
    let mut snap = snapshot();
    snap.source_dots = vec![source_dot(1, "GATE-01", Vec::new())];

    // Both templates resolve to the same (start, end) pair; the first
    // occurrence (rate 60) wins.
    let reschedule = Reschedule {
        templates: vec![
            ShiftTemplate {
                start_time: chrono::NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
                end_time: chrono::NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
                rate: 60.0,
                staff: 1,
            },
            ShiftTemplate {
                start_time: chrono::NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
                end_time: chrono::NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
                rate: 45.0,
                staff: 2,
            },
        ],
        dates: vec![date(2024, time::Month::August, 22)],
    };

    let result = plan(
        &snap,
        Command::BulkUpdate {
            dot_ids: vec![1],
            changes: FieldChanges::default(),
            reschedule: Some(reschedule),
        },
    )
    .unwrap();

    assert_eq!(result.assignment_inserts.len(), 1);
    assert_eq!(result.assignment_inserts[0].rate, 60.0);
}
