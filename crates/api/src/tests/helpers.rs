// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Fake collaborators for orchestrator tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use dotplan_persistence::Persistence;

use crate::collab::{
    EventScope, LookupError, LookupKind, LookupResolver, Notifier, NotifyError, ScopeError,
    ScopeResolver,
};
use crate::deployments::Deployments;
use crate::request_response::{DotUploadRequest, DotUploadRow, ShiftUpload};

pub const EVENT: i64 = 7;
pub const USER: &str = "dispatcher";

/// Grants every user access to every event, in the London timezone.
pub struct AllowAll;

impl ScopeResolver for AllowAll {
    fn resolve(&mut self, _user: &str, _event_id: i64) -> Result<EventScope, ScopeError> {
        Ok(EventScope {
            company_id: 1,
            subcompany_ids: vec![2, 3],
            timezone: String::from("Europe/London"),
        })
    }
}

/// Refuses every user.
pub struct DenyAll;

impl ScopeResolver for DenyAll {
    fn resolve(&mut self, user: &str, event_id: i64) -> Result<EventScope, ScopeError> {
        Err(ScopeError {
            user: user.to_string(),
            event_id,
        })
    }
}

/// Assigns sequential ids to names, idempotently.
#[derive(Default)]
pub struct SequentialLookups {
    next_id: i64,
    assigned: HashMap<(LookupKind, String), i64>,
}

impl LookupResolver for SequentialLookups {
    fn resolve_or_create(
        &mut self,
        kind: LookupKind,
        _company_id: i64,
        names: &[String],
    ) -> Result<HashMap<String, i64>, LookupError> {
        let next_id = &mut self.next_id;
        let mut resolved = HashMap::new();
        for name in names {
            let id = *self.assigned.entry((kind, name.clone())).or_insert_with(|| {
                *next_id += 1;
                *next_id
            });
            resolved.insert(name.clone(), id);
        }
        Ok(resolved)
    }
}

/// Records every notification; optionally fails after recording.
pub struct RecordingNotifier {
    pub sent: Rc<RefCell<Vec<(i64, String)>>>,
    pub fail: bool,
}

impl Notifier for RecordingNotifier {
    fn notify(
        &mut self,
        event_id: i64,
        operation: &str,
        _payload: &serde_json::Value,
    ) -> Result<(), NotifyError> {
        self.sent.borrow_mut().push((event_id, operation.to_string()));
        if self.fail {
            return Err(NotifyError::ChannelUnavailable(String::from(
                "socket closed",
            )));
        }
        Ok(())
    }
}

pub type TestDeployments = Deployments<AllowAll, SequentialLookups, RecordingNotifier>;

/// Builds an orchestrator over fakes plus a handle onto the sent
/// notifications.
pub fn test_deployments() -> (TestDeployments, Rc<RefCell<Vec<(i64, String)>>>) {
    test_deployments_with_failing_notifier(false)
}

pub fn test_deployments_with_failing_notifier(
    fail: bool,
) -> (TestDeployments, Rc<RefCell<Vec<(i64, String)>>>) {
    let sent = Rc::new(RefCell::new(Vec::new()));
    let deployments = Deployments::new(
        AllowAll,
        SequentialLookups::default(),
        RecordingNotifier {
            sent: Rc::clone(&sent),
            fail,
        },
    );
    (deployments, sent)
}

pub fn test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to initialize in-memory database")
}

pub fn upload_row(pos_id: &str, vendor: &str, shifts: Vec<ShiftUpload>) -> DotUploadRow {
    DotUploadRow {
        pos_id: pos_id.to_string(),
        vendor: Some(vendor.to_string()),
        area: Some(String::from("North Concourse")),
        position: None,
        position_name: None,
        priority: false,
        base: false,
        addition: false,
        shifts,
    }
}

pub fn shift(start: &str, end: &str, rate: f64, staff: i32) -> ShiftUpload {
    ShiftUpload {
        start: start.to_string(),
        end: end.to_string(),
        rate,
        staff,
    }
}

pub fn upload_request(rows: Vec<DotUploadRow>) -> DotUploadRequest {
    DotUploadRequest { rows }
}
