// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Single-dot update and deletion tests.

use dotplan_domain::GeoPoint;

use crate::tests::{
    EVENT, seed_upload, test_persistence, tz, upload_row, upload_shift, window,
};
use crate::{AssignmentUpsert, DotEdit, PersistenceError};

#[test]
fn test_update_recomputes_totals_over_surviving_assignments() {
    let mut persistence = test_persistence();
    let dot_ids = seed_upload(
        &mut persistence,
        vec![upload_row(
            "GATE-01",
            1,
            vec![
                upload_shift("2024-08-22T06:00:00Z", "2024-08-22T14:00:00Z", 60.0, 1),
                upload_shift("2024-08-22T14:00:00Z", "2024-08-22T22:00:00Z", 45.0, 2),
            ],
        )],
    );
    let dot_id = dot_ids[0];

    // Destroy the 45.0 assignment; only the 60.0 one survives.
    let assignments = persistence.dot_assignments(dot_id).expect("rows");
    let removed = assignments
        .iter()
        .find(|a| (a.rate - 45.0).abs() < f64::EPSILON)
        .expect("45.0 assignment")
        .dot_shift_id;

    let edit = DotEdit {
        remove_assignment_ids: vec![removed],
        ..DotEdit::default()
    };
    persistence
        .update_dot(EVENT, tz(), dot_id, &edit)
        .expect("update");

    let dot = persistence.get_dot(dot_id).expect("dot");
    assert_eq!(dot.totals.total_rate, 60.0);
    assert_eq!(dot.totals.avg_rate, 60.0);
    assert_eq!(dot.totals.total_shift_hours, 8.0);
    assert_eq!(persistence.dot_assignments(dot_id).expect("rows").len(), 1);
}

#[test]
fn test_update_upsert_sets_staff_or_inserts() {
    let mut persistence = test_persistence();
    let dot_ids = seed_upload(
        &mut persistence,
        vec![upload_row(
            "GATE-01",
            1,
            vec![upload_shift(
                "2024-08-22T06:00:00Z",
                "2024-08-22T14:00:00Z",
                60.0,
                1,
            )],
        )],
    );
    let dot_id = dot_ids[0];

    // Same window and rate: the explicit edit replaces the staff count.
    let edit = DotEdit {
        upserts: vec![AssignmentUpsert {
            window: window("2024-08-22T06:00:00Z", "2024-08-22T14:00:00Z"),
            rate: 60.0,
            staff: 4,
        }],
        ..DotEdit::default()
    };
    persistence
        .update_dot(EVENT, tz(), dot_id, &edit)
        .expect("update");

    let assignments = persistence.dot_assignments(dot_id).expect("rows");
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].staff, 4);
    let dot = persistence.get_dot(dot_id).expect("dot");
    assert_eq!(dot.totals.total_rate, 240.0);

    // A new window creates its definition lazily and inserts a row.
    let edit = DotEdit {
        upserts: vec![AssignmentUpsert {
            window: window("2024-08-23T06:00:00Z", "2024-08-23T14:00:00Z"),
            rate: 50.0,
            staff: 1,
        }],
        ..DotEdit::default()
    };
    persistence
        .update_dot(EVENT, tz(), dot_id, &edit)
        .expect("update");

    assert_eq!(persistence.dot_assignments(dot_id).expect("rows").len(), 2);
    assert_eq!(persistence.shift_definitions(EVENT).expect("defs").len(), 2);
}

#[test]
fn test_setting_location_marks_dot_placed() {
    let mut persistence = test_persistence();
    let dot_ids = seed_upload(
        &mut persistence,
        vec![upload_row("GATE-01", 1, Vec::new())],
    );
    let dot_id = dot_ids[0];

    let edit = DotEdit {
        location: Some(GeoPoint {
            latitude: 51.5,
            longitude: -0.12,
        }),
        ..DotEdit::default()
    };
    persistence
        .update_dot(EVENT, tz(), dot_id, &edit)
        .expect("update");

    let dot = persistence.get_dot(dot_id).expect("dot");
    assert!(dot.flags.placed);
    assert!(dot.location.is_some());
}

#[test]
fn test_update_missing_dot_returns_not_found() {
    let mut persistence = test_persistence();

    let result = persistence.update_dot(EVENT, tz(), 999, &DotEdit::default());

    assert!(matches!(result, Err(PersistenceError::NotFound(_))));
}

#[test]
fn test_delete_keeps_shift_definitions_shared_with_other_dots() {
    let mut persistence = test_persistence();
    let dot_ids = seed_upload(
        &mut persistence,
        vec![
            upload_row(
                "GATE-01",
                1,
                vec![upload_shift(
                    "2024-08-22T06:00:00Z",
                    "2024-08-22T14:00:00Z",
                    60.0,
                    1,
                )],
            ),
            upload_row(
                "GATE-02",
                1,
                vec![upload_shift(
                    "2024-08-22T06:00:00Z",
                    "2024-08-22T14:00:00Z",
                    45.0,
                    1,
                )],
            ),
        ],
    );

    persistence
        .delete_dots(EVENT, &dot_ids[..1])
        .expect("delete");

    // The surviving dot still references the shared definition.
    assert_eq!(persistence.list_dots(EVENT, None).expect("dots").len(), 1);
    assert_eq!(persistence.shift_definitions(EVENT).expect("defs").len(), 1);
    assert_eq!(persistence.dot_assignments(dot_ids[1]).expect("rows").len(), 1);
}

#[test]
fn test_delete_rejects_missing_dots_without_partial_deletion() {
    let mut persistence = test_persistence();
    let dot_ids = seed_upload(
        &mut persistence,
        vec![upload_row("GATE-01", 1, Vec::new())],
    );

    let result = persistence.delete_dots(EVENT, &[dot_ids[0], 999]);

    assert!(matches!(result, Err(PersistenceError::NotFound(_))));
    // The existing dot was not deleted.
    assert_eq!(persistence.list_dots(EVENT, None).expect("dots").len(), 1);
}
